//! # Composition Pipeline
//!
//! Ties the stages together: read sources, extract fragments, order them per
//! kind, compose each kind's document, and hand both documents back. One
//! fetch cycle is one call — the pipeline holds no state between calls and
//! every entity is built fresh from the current configuration, so repeated
//! invocations on identical input yield byte-identical output.
//!
//! There is exactly one pipeline variant, so it is a plain struct with
//! [`Pipeline::fetch`] as its sole public contract rather than an extension
//! point. The pure transformation core is [`compose_sources`]; `fetch`
//! wraps it behind input validation.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::fragment::{self, Diagnostic, Kind};
use crate::multipart::{self, MergeDirective};
use crate::order::order_fragments;
use crate::source::{read_sources, ConfigMap};

/// The two composed documents plus any extraction diagnostics.
///
/// A `None` document means no fragment of that kind existed anywhere — the
/// consumer gets nothing rather than an empty container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedData {
    #[serde(rename = "user-data")]
    pub user_data: Option<String>,
    #[serde(rename = "vendor-data")]
    pub vendor_data: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// The fragment composition pipeline.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    directive: MergeDirective,
}

impl Pipeline {
    pub fn new(directive: MergeDirective) -> Self {
        Self { directive }
    }

    /// Run one fetch cycle over the given raw configuration maps.
    ///
    /// `profiles` are taken in declared order, lowest precedence first; the
    /// instance map is applied last. Vendor and user documents are composed
    /// independently and never interact.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::Error::MissingInstanceConfig`] when the
    /// instance map is absent. Malformed keys are never errors; they surface
    /// as [`Diagnostic`]s on the returned [`SeedData`].
    pub fn fetch(
        &self,
        profiles: Vec<(String, Option<BTreeMap<String, String>>)>,
        instance: Option<BTreeMap<String, String>>,
    ) -> Result<SeedData> {
        let sources = read_sources(profiles, instance)?;
        Ok(compose_sources(&sources, &self.directive))
    }
}

/// Pure transformation core: ordered config maps in, seed documents out.
pub fn compose_sources(sources: &[ConfigMap], directive: &MergeDirective) -> SeedData {
    let mut fragments = Vec::new();
    let mut diagnostics = Vec::new();
    for source in sources {
        let (mut frags, mut diags) = fragment::extract(source);
        fragments.append(&mut frags);
        diagnostics.append(&mut diags);
    }

    let user_data = multipart::compose(&order_fragments(&fragments, Kind::User), directive);
    let vendor_data = multipart::compose(&order_fragments(&fragments, Kind::Vendor), directive);

    SeedData {
        user_data,
        vendor_data,
        diagnostics,
    }
}
