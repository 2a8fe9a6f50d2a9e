//! # Seed Input Parsing
//!
//! Parses the YAML description of an instance's raw configuration used by the
//! CLI (and by anything else that wants to drive the pipeline from a file
//! rather than from live platform data).
//!
//! The schema mirrors the pipeline's input boundary directly:
//!
//! ```yaml
//! profiles:            # optional, declared order = precedence order
//!   - name: default
//!     config:          # optional, a missing map means an empty profile
//!       user.user-data.hardening: "#cloud-config\n..."
//! instance:            # the instance's own configuration map
//!   cloud-init.user-data: "#cloud-config\n..."
//! merge-directive:     # optional, defaults to recurse + append
//!   lists: append
//!   strings: append
//! ```
//!
//! Whether `instance` may be absent is not this module's call: the pipeline
//! itself rejects a missing instance map, so the field is optional here and
//! validated at fetch time.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::Result;
use crate::multipart::MergeDirective;

/// Parsed pipeline input: raw sources plus the merge directive to stamp on
/// composed parts.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedInput {
    /// Inherited profiles in declared order, lowest precedence first.
    #[serde(default)]
    pub profiles: Vec<ProfileInput>,
    /// The instance's own configuration map.
    pub instance: Option<BTreeMap<String, String>>,
    /// Merge strategy for every composed part.
    #[serde(default, rename = "merge-directive")]
    pub merge_directive: MergeDirective,
}

/// One named profile and its (possibly absent) configuration map.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileInput {
    pub name: String,
    #[serde(default)]
    pub config: Option<BTreeMap<String, String>>,
}

impl SeedInput {
    /// The profiles in the shape [`crate::pipeline::Pipeline::fetch`] takes.
    pub fn into_profiles(self) -> Vec<(String, Option<BTreeMap<String, String>>)> {
        self.profiles
            .into_iter()
            .map(|p| (p.name, p.config))
            .collect()
    }
}

/// Parse a YAML seed-input document.
///
/// # Errors
///
/// Returns [`crate::error::Error::Yaml`] when the document is not valid YAML
/// or does not match the schema.
pub fn parse(yaml: &str) -> Result<SeedInput> {
    Ok(serde_yaml::from_str(yaml)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_parse_full_input() {
        let input = parse(
            r##"
profiles:
  - name: default
    config:
      user.user-data.hardening: "#cloud-config\nssh_pwauth: false\n"
  - name: empty
instance:
  cloud-init.user-data: "#cloud-config\nhostname: web01\n"
"##,
        )
        .unwrap();
        assert_eq!(input.profiles.len(), 2);
        assert_eq!(input.profiles[0].name, "default");
        assert!(input.profiles[1].config.is_none());
        assert!(input.instance.is_some());
        assert_eq!(
            input.merge_directive.expression(),
            "dict(recurse_array,recurse_str)+list(append)+str(append)"
        );
    }

    #[test]
    fn test_parse_instance_only() {
        let input = parse("instance:\n  user.user-data: hi\n").unwrap();
        assert!(input.profiles.is_empty());
    }

    #[test]
    fn test_parse_custom_merge_directive() {
        let input = parse(
            r#"
instance: {}
merge-directive:
  recurse-arrays: false
  lists: replace
"#,
        )
        .unwrap();
        assert_eq!(
            input.merge_directive.expression(),
            "dict(recurse_str)+list(replace)+str(append)"
        );
    }

    #[test]
    fn test_parse_rejects_unknown_fields() {
        let result = parse("instance: {}\nbogus: 1\n");
        assert!(matches!(result, Err(Error::Yaml(_))));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(matches!(parse("instance: [unclosed"), Err(Error::Yaml(_))));
    }

    #[test]
    fn test_into_profiles_preserves_declared_order() {
        let input = parse(
            r#"
profiles:
  - name: zeta
  - name: alpha
instance: {}
"#,
        )
        .unwrap();
        let profiles = input.into_profiles();
        assert_eq!(profiles[0].0, "zeta");
        assert_eq!(profiles[1].0, "alpha");
    }
}
