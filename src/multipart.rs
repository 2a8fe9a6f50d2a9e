//! # Multipart Composition
//!
//! Renders an ordered [`FragmentSet`] into the document handed to cloud-init:
//!
//! - zero fragments → no document at all (absent, not an empty container);
//! - one fragment → that fragment's body verbatim, so consumers expecting a
//!   single flat document keep working;
//! - two or more → a MIME `multipart/mixed` container with one part per
//!   fragment, in exactly the orderer's sequence.
//!
//! Each part carries the content type sniffed from the body's declared format
//! marker (`#cloud-config`, `#!`, ...), the originating configuration key as
//! its attachment filename, and a `Merge-Type` header telling cloud-init's
//! merge stage how to fold the part into the others instead of replacing
//! them.
//!
//! The container boundary is chosen deterministically (and re-chosen if a
//! part body happens to contain it), so identical inputs always produce
//! byte-identical documents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fragment::Fragment;
use crate::order::FragmentSet;

/// How the consumer should merge list values across parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListMergePolicy {
    Append,
    Prepend,
    Replace,
}

impl ListMergePolicy {
    fn as_str(&self) -> &'static str {
        match self {
            ListMergePolicy::Append => "append",
            ListMergePolicy::Prepend => "prepend",
            ListMergePolicy::Replace => "replace",
        }
    }
}

/// How the consumer should merge string values across parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StringMergePolicy {
    Append,
    Replace,
}

impl StringMergePolicy {
    fn as_str(&self) -> &'static str {
        match self {
            StringMergePolicy::Append => "append",
            StringMergePolicy::Replace => "replace",
        }
    }
}

/// The merge strategy stamped on every composed part.
///
/// This is an explicit configuration value injected into the composer, not an
/// ambient string constant. The default is the strategy cloud-init documents
/// for accrued fragments: recurse into nested mappings (including their
/// arrays and strings), append list values, append string values. A
/// per-fragment override is a known extension point and is not implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MergeDirective {
    /// Recurse into arrays nested under mappings.
    pub recurse_arrays: bool,
    /// Recurse into strings nested under mappings.
    pub recurse_strings: bool,
    pub lists: ListMergePolicy,
    pub strings: StringMergePolicy,
}

impl Default for MergeDirective {
    fn default() -> Self {
        Self {
            recurse_arrays: true,
            recurse_strings: true,
            lists: ListMergePolicy::Append,
            strings: StringMergePolicy::Append,
        }
    }
}

impl MergeDirective {
    /// Render the directive as the `Merge-Type` header expression understood
    /// by cloud-init's merger, e.g.
    /// `dict(recurse_array,recurse_str)+list(append)+str(append)`.
    pub fn expression(&self) -> String {
        let mut dict_opts = Vec::new();
        if self.recurse_arrays {
            dict_opts.push("recurse_array");
        }
        if self.recurse_strings {
            dict_opts.push("recurse_str");
        }
        format!(
            "dict({})+list({})+str({})",
            dict_opts.join(","),
            self.lists.as_str(),
            self.strings.as_str()
        )
    }
}

impl fmt::Display for MergeDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression())
    }
}

/// Content type used when a body declares no recognized format marker.
pub const DEFAULT_CONTENT_TYPE: &str = "text/cloud-config";

/// Recognized format markers, longest-prefix first so `#include-once` is not
/// mistaken for `#include`.
const FORMAT_MARKERS: [(&str, &str); 8] = [
    ("#cloud-config-archive", "text/cloud-config-archive"),
    ("#cloud-config-jsonp", "text/cloud-config-jsonp"),
    ("#cloud-config", "text/cloud-config"),
    ("#cloud-boothook", "text/cloud-boothook"),
    ("#part-handler", "text/part-handler"),
    ("#include-once", "text/x-include-once-url"),
    ("#include", "text/x-include-url"),
    ("#!", "text/x-shellscript"),
];

/// Prefix of the template-engine header line that may precede the format
/// marker. The line is skipped for sniffing only; the emitted body is never
/// altered.
const TEMPLATE_HEADER: &str = "## template:";

/// Infer a part's content type from its body's declared format marker.
///
/// A leading `## template:` line is skipped before matching. Bodies with no
/// recognized marker get [`DEFAULT_CONTENT_TYPE`].
pub fn sniff_content_type(body: &str) -> &'static str {
    let mut lines = body.lines();
    let mut first = lines.next().unwrap_or("");
    if first.trim_start().starts_with(TEMPLATE_HEADER) {
        first = lines.next().unwrap_or("");
    }
    let first = first.trim_start();
    for (marker, content_type) in FORMAT_MARKERS {
        if first.starts_with(marker) {
            return content_type;
        }
    }
    DEFAULT_CONTENT_TYPE
}

/// One rendered part of a multipart container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub content_type: String,
    /// The `Merge-Type` expression for this part.
    pub merge_directive: String,
    /// Attachment filename: the originating configuration key.
    pub filename: String,
    pub body: String,
}

impl Part {
    fn from_fragment(fragment: &Fragment, directive: &MergeDirective) -> Self {
        Self {
            content_type: sniff_content_type(&fragment.body).to_string(),
            merge_directive: directive.expression(),
            filename: fragment.key.clone(),
            body: fragment.body.clone(),
        }
    }
}

/// Compose an ordered fragment set into its final document form.
///
/// Returns `None` for an empty set, the single body verbatim for a set of
/// one, and a rendered `multipart/mixed` container otherwise. Parts appear
/// in exactly the input order; reordering them would change downstream merge
/// results.
pub fn compose(set: &FragmentSet, directive: &MergeDirective) -> Option<String> {
    match set.fragments.as_slice() {
        [] => None,
        [single] => Some(single.body.clone()),
        fragments => {
            let parts: Vec<Part> = fragments
                .iter()
                .map(|f| Part::from_fragment(f, directive))
                .collect();
            Some(render_multipart(&parts))
        }
    }
}

/// Pick a boundary no part body contains.
///
/// Starts from a fixed candidate and extends it deterministically on
/// collision, so boundary choice never introduces nondeterminism.
fn select_boundary(parts: &[Part]) -> String {
    let mut n = 0usize;
    loop {
        let candidate = if n == 0 {
            "===============incus-seed===============".to_string()
        } else {
            format!("===============incus-seed-{:04}===============", n)
        };
        if !parts.iter().any(|p| p.body.contains(&candidate)) {
            return candidate;
        }
        n += 1;
    }
}

/// Render parts as a MIME `multipart/mixed` message.
///
/// Bodies are emitted unencoded between the part headers and the next
/// boundary line; a newline is inserted before the boundary only when the
/// body does not already end with one.
fn render_multipart(parts: &[Part]) -> String {
    let boundary = select_boundary(parts);
    let mut out = String::new();
    out.push_str(&format!(
        "Content-Type: multipart/mixed; boundary=\"{}\"\n",
        boundary
    ));
    out.push_str("MIME-Version: 1.0\n");
    for part in parts {
        out.push('\n');
        out.push_str(&format!("--{}\n", boundary));
        out.push_str(&format!(
            "Content-Type: {}; charset=\"utf-8\"\n",
            part.content_type
        ));
        out.push_str("MIME-Version: 1.0\n");
        out.push_str(&format!(
            "Content-Disposition: attachment; filename=\"{}\"\n",
            part.filename
        ));
        out.push_str(&format!("Merge-Type: {}\n", part.merge_directive));
        out.push('\n');
        out.push_str(&part.body);
        if !part.body.ends_with('\n') {
            out.push('\n');
        }
    }
    out.push_str(&format!("--{}--\n", boundary));
    out
}
