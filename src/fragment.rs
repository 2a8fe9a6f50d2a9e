//! # Fragment Extraction
//!
//! Incus surfaces cloud-init content through flat configuration keys. Two
//! namespaces are recognized (`cloud-init.` is the platform namespace,
//! `user.` the legacy user namespace), and within each namespace two key
//! families per document kind:
//!
//! - **Base keys** — the canonical whole-document key, e.g.
//!   `cloud-init.user-data` or `user.vendor-data`.
//! - **Extra keys** — auxiliary fragments with a free-form label suffix, e.g.
//!   `user.user-data.ssh-setup`. Labels may themselves contain dots.
//!
//! Classification is a closed-set parser built on exact and prefix matching:
//! every key lands in exactly one of `Base`, `Extra`, `Malformed` (a
//! kind-prefixed key with an empty label) or `Unrecognized` (everything
//! else — `limits.cpu`, `user.meta-data`, ... — which belongs to other
//! subsystems and is ignored here).
//!
//! A malformed key is never fatal: partial configuration must not block boot.
//! It is skipped, logged, and recorded as a [`Diagnostic`] on the pipeline
//! output. Likewise, when both namespaces supply a base value for the same
//! kind in one source, the `cloud-init.` value wins and the shadowed `user.`
//! key is recorded as a diagnostic, preserving the at-most-one-base-per-kind
//! invariant for each source.

use std::fmt;

use log::warn;
use serde::Serialize;

use crate::source::{ConfigMap, SourceId};

/// The two logical documents tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Vendor-supplied initialization data.
    Vendor,
    /// User-supplied initialization data.
    User,
}

impl Kind {
    /// The key-suffix discriminator for this kind.
    pub fn discriminator(&self) -> &'static str {
        match self {
            Kind::Vendor => "vendor-data",
            Kind::User => "user-data",
        }
    }

    pub const ALL: [Kind; 2] = [Kind::Vendor, Kind::User];
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.discriminator())
    }
}

/// The key namespace a fragment was found under.
///
/// Variant order matters: `CloudInit` sorts before `User`, matching the
/// lexicographic order of the raw key prefixes, so it doubles as the
/// tiebreak when two extras carry the same label in different namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Namespace {
    CloudInit,
    User,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::CloudInit => "cloud-init",
            Namespace::User => "user",
        }
    }

    const ALL: [Namespace; 2] = [Namespace::CloudInit, Namespace::User];
}

/// Whether a fragment is the whole-document key or a named auxiliary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The canonical whole-document key for its kind.
    Base,
    /// A user-named auxiliary key carrying an additional fragment.
    Extra,
}

/// Outcome of classifying a single configuration key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyClass {
    /// A canonical base key for `kind` in `namespace`.
    Base(Kind, Namespace),
    /// An extra key for `kind` in `namespace` with the given label.
    Extra(Kind, Namespace, String),
    /// A kind-prefixed key with broken extra-key syntax (empty label).
    Malformed(Kind, Namespace),
    /// A key that belongs to some other subsystem; not ours to interpret.
    Unrecognized,
}

/// Classify one configuration key against the recognized key families.
pub fn classify_key(key: &str) -> KeyClass {
    for ns in Namespace::ALL {
        for kind in Kind::ALL {
            let base = format!("{}.{}", ns.prefix(), kind.discriminator());
            if key == base {
                return KeyClass::Base(kind, ns);
            }
            if let Some(label) = key.strip_prefix(&format!("{}.", base)) {
                if label.is_empty() {
                    return KeyClass::Malformed(kind, ns);
                }
                return KeyClass::Extra(kind, ns, label.to_string());
            }
        }
    }
    KeyClass::Unrecognized
}

/// One extracted piece of configuration content, addressed to one document
/// kind, from one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub kind: Kind,
    pub role: Role,
    /// Extra-key label; `None` for base fragments.
    pub label: Option<String>,
    /// Namespace the originating key was found under.
    pub namespace: Namespace,
    /// The originating configuration key, kept for part attribution.
    pub key: String,
    /// Opaque payload. Never parsed; templating markers are preserved verbatim.
    pub body: String,
    pub source: SourceId,
    pub rank: usize,
}

/// A non-fatal extraction problem, recorded and carried on the pipeline
/// output rather than aborting the fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Diagnostic {
    /// A kind-prefixed key with broken extra-key syntax was skipped.
    MalformedKey { key: String, source: String },
    /// A `user.` base key was ignored because the `cloud-init.` base key for
    /// the same kind is present in the same source.
    ShadowedBaseKey {
        key: String,
        shadowed_by: String,
        source: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedKey { key, source } => {
                write!(f, "skipping malformed key '{}' from {}", key, source)
            }
            Diagnostic::ShadowedBaseKey {
                key,
                shadowed_by,
                source,
            } => write!(
                f,
                "ignoring '{}' from {} in favor of '{}'",
                key, source, shadowed_by
            ),
        }
    }
}

/// Extract all fragments from one configuration source.
///
/// Keys are walked in the map's sorted order, so `cloud-init.*` keys are seen
/// before `user.*` keys. For base keys that ordering is what gives the
/// `cloud-init.` namespace precedence: the first base fragment per kind is
/// kept and any later one is dropped with a [`Diagnostic::ShadowedBaseKey`].
///
/// Returns the extracted fragments together with any diagnostics. Never
/// fails: unclassifiable keys are ignored and malformed keys are skipped.
pub fn extract(map: &ConfigMap) -> (Vec<Fragment>, Vec<Diagnostic>) {
    let mut fragments: Vec<Fragment> = Vec::new();
    let mut diagnostics = Vec::new();

    for (key, value) in &map.entries {
        match classify_key(key) {
            KeyClass::Base(kind, namespace) => {
                if let Some(existing) = fragments
                    .iter()
                    .find(|f| f.kind == kind && f.role == Role::Base)
                {
                    let diag = Diagnostic::ShadowedBaseKey {
                        key: key.clone(),
                        shadowed_by: existing.key.clone(),
                        source: map.source.to_string(),
                    };
                    warn!("{}", diag);
                    diagnostics.push(diag);
                    continue;
                }
                fragments.push(Fragment {
                    kind,
                    role: Role::Base,
                    label: None,
                    namespace,
                    key: key.clone(),
                    body: value.clone(),
                    source: map.source.clone(),
                    rank: map.rank,
                });
            }
            KeyClass::Extra(kind, namespace, label) => {
                fragments.push(Fragment {
                    kind,
                    role: Role::Extra,
                    label: Some(label),
                    namespace,
                    key: key.clone(),
                    body: value.clone(),
                    source: map.source.clone(),
                    rank: map.rank,
                });
            }
            KeyClass::Malformed(_, _) => {
                let diag = Diagnostic::MalformedKey {
                    key: key.clone(),
                    source: map.source.to_string(),
                };
                warn!("{}", diag);
                diagnostics.push(diag);
            }
            KeyClass::Unrecognized => {}
        }
    }

    (fragments, diagnostics)
}
