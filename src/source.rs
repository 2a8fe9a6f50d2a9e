//! # Configuration Sources
//!
//! An Incus instance receives its configuration from an ordered set of
//! sources: zero or more inherited profiles (in the order the instance
//! declares them) followed by the instance's own local configuration. The
//! platform's native expansion collapses these with last-wins overwrite; this
//! module instead preserves every source as a distinct [`ConfigMap`] so later
//! stages can accrue fragments from all of them.
//!
//! Each map is tagged with a [`SourceId`] and a rank: its position in the
//! applied-order sequence, lowest precedence first. The instance map is
//! always applied last and therefore always carries the highest rank.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Error, Result};

/// Identifies where a configuration map came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceId {
    /// The instance's own local configuration.
    Instance,
    /// An inherited profile, identified by its name.
    Profile(String),
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Instance => write!(f, "instance"),
            SourceId::Profile(name) => write!(f, "profile[{}]", name),
        }
    }
}

/// One configuration source: a flat key→value mapping with its identity and
/// precedence rank.
///
/// Keys are held in a `BTreeMap` so iteration order is defined, which keeps
/// the whole pipeline deterministic for identical inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMap {
    /// Where this map came from.
    pub source: SourceId,
    /// Position in the applied-order sequence; instance is always highest.
    pub rank: usize,
    /// The raw configuration entries.
    pub entries: BTreeMap<String, String>,
}

impl ConfigMap {
    pub fn new(source: SourceId, rank: usize, entries: BTreeMap<String, String>) -> Self {
        Self {
            source,
            rank,
            entries,
        }
    }
}

/// Wrap the raw profile and instance mappings into ranked [`ConfigMap`]s.
///
/// Profiles are taken in declared order and ranked `0..n`; the instance map
/// is ranked last. An absent profile map (`None`) is treated as empty — a
/// profile with no configuration is normal, not an error. An absent instance
/// map is fatal: it is the one input a fetch cannot proceed without.
///
/// # Errors
///
/// Returns [`Error::MissingInstanceConfig`] when `instance` is `None`.
pub fn read_sources(
    profiles: Vec<(String, Option<BTreeMap<String, String>>)>,
    instance: Option<BTreeMap<String, String>>,
) -> Result<Vec<ConfigMap>> {
    let instance = instance.ok_or_else(|| Error::MissingInstanceConfig {
        message: "no instance configuration map was supplied".to_string(),
    })?;

    let mut sources = Vec::with_capacity(profiles.len() + 1);
    for (rank, (name, entries)) in profiles.into_iter().enumerate() {
        sources.push(ConfigMap::new(
            SourceId::Profile(name),
            rank,
            entries.unwrap_or_default(),
        ));
    }
    let instance_rank = sources.len();
    sources.push(ConfigMap::new(SourceId::Instance, instance_rank, instance));
    Ok(sources)
}
