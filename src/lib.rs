//! # Incus Seed Library
//!
//! This library composes the cloud-init "user data" and "vendor data"
//! documents for an Incus instance from the configuration fragments spread
//! across the instance and its inherited profiles. It is designed to be used
//! by the `incus-seed` command-line tool but can also back a datasource
//! plugin directly.
//!
//! Incus's native config expansion is mutually-exclusive overwrite: the last
//! source to define a key wins and every earlier source's value is discarded.
//! This library instead *accrues* every fragment addressed to the same
//! logical document, in a deterministic order, and composes them into a
//! single MIME multipart container that cloud-init's merge-aware consumer can
//! fold together field by field.
//!
//! ## Quick Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use incus_seed::pipeline::Pipeline;
//!
//! let mut instance = BTreeMap::new();
//! instance.insert(
//!     "cloud-init.user-data".to_string(),
//!     "#cloud-config\nhostname: web01\n".to_string(),
//! );
//!
//! let seed = Pipeline::default().fetch(vec![], Some(instance)).unwrap();
//! // A single fragment stays a flat document, no container overhead.
//! assert_eq!(seed.user_data.as_deref(), Some("#cloud-config\nhostname: web01\n"));
//! assert_eq!(seed.vendor_data, None);
//! ```
//!
//! ## Execution Flow
//!
//! One fetch cycle runs five stages, leaves first, with no branching back:
//!
//! 1. **Sources (`source`)**: wrap the raw profile and instance maps with
//!    explicit source identity and precedence rank (instance always last).
//! 2. **Extraction (`fragment`)**: classify every configuration key against
//!    the recognized base/extra key families and pull out typed fragments;
//!    malformed keys become diagnostics, not failures.
//! 3. **Ordering (`order`)**: arrange each kind's fragments into the one
//!    deterministic total order (source rank, then base before extras, then
//!    label).
//! 4. **Composition (`multipart`)**: render zero fragments as no document,
//!    one as the flat body, two or more as a `multipart/mixed` container with
//!    per-part content types and `Merge-Type` annotations.
//! 5. **Assembly (`pipeline`)**: hand back both documents and the collected
//!    diagnostics as a [`pipeline::SeedData`].
//!
//! The whole pipeline is a pure function of its inputs: no caching, no shared
//! state, byte-identical output for identical input.

pub mod error;
pub mod fragment;
pub mod input;
pub mod multipart;
pub mod order;
pub mod pipeline;
pub mod source;

#[cfg(test)]
mod pipeline_proptest;
