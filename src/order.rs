//! # Fragment Ordering
//!
//! Establishes the one deterministic total order over all fragments of a
//! given kind, across all sources. Downstream, part order is merge order:
//! reordering parts changes what the merge-aware consumer produces, so the
//! ordering here must be reproducible run to run.
//!
//! ## Policy
//!
//! 1. Sources are taken in ascending rank (lowest-precedence profile first,
//!    instance last).
//! 2. Within one source the base fragment, if present, comes first; its
//!    extras follow, sorted by label and then by namespace (`cloud-init.`
//!    before `user.`, matching the raw key order) so two same-label extras
//!    from different namespaces still order deterministically.
//! 3. Pure accrual: no cross-source deduplication or suppression. A later
//!    source never removes an earlier source's fragment — accrual is the
//!    whole point of this pipeline over the platform's native overwrite.

use crate::fragment::{Fragment, Kind, Role};

/// All fragments of one kind, in final composition order.
#[derive(Debug, Clone)]
pub struct FragmentSet {
    pub kind: Kind,
    /// Fragments in source-rank-then-label order.
    pub fragments: Vec<Fragment>,
}

impl FragmentSet {
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }
}

/// Select the fragments of `kind` and arrange them into their deterministic
/// total order.
///
/// The sort key is `(rank, role, label, namespace)` with base fragments
/// ordering before extras. The sort is stable and total: identical inputs
/// always produce the identical sequence.
pub fn order_fragments(fragments: &[Fragment], kind: Kind) -> FragmentSet {
    let mut selected: Vec<Fragment> = fragments
        .iter()
        .filter(|f| f.kind == kind)
        .cloned()
        .collect();

    selected.sort_by(|a, b| {
        let role_ord = |r: Role| match r {
            Role::Base => 0u8,
            Role::Extra => 1u8,
        };
        a.rank
            .cmp(&b.rank)
            .then_with(|| role_ord(a.role).cmp(&role_ord(b.role)))
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.namespace.cmp(&b.namespace))
    });

    FragmentSet {
        kind,
        fragments: selected,
    }
}
