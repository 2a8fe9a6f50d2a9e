//! # Error Handling
//!
//! Centralized error handling for `incus-seed`, built on `thiserror`.
//!
//! The composition pipeline distinguishes two failure classes:
//!
//! - **Fatal input errors** — the instance configuration map is missing, or a
//!   seed-input document cannot be parsed. These abort the fetch and are
//!   modeled as `Error` variants.
//! - **Diagnostics** — malformed or shadowed configuration keys. These never
//!   abort a fetch (partial configuration must not block boot) and are *not*
//!   errors; they are accumulated as [`crate::fragment::Diagnostic`] values on
//!   the pipeline output instead.
//!
//! The `Result<T>` alias is used throughout to keep signatures short.

use thiserror::Error;

/// Main error type for incus-seed operations
#[derive(Error, Debug)]
pub enum Error {
    /// The instance-level configuration map is absent.
    ///
    /// Profiles are optional, but the instance map is the one input a fetch
    /// cannot proceed without.
    #[error("Instance configuration is missing: {message}")]
    MissingInstanceConfig { message: String },

    /// A YAML parsing error in the seed-input document, wrapped from
    /// `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
