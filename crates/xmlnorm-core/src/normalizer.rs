//! Normalization pipeline: converts XML to deterministic canonical form
//!
//! # Pipeline
//!
//! `XML text → precheck → parse → whitespace → canonicalize → namespaces → serialize`
//!
//! # Guarantees
//!
//! - **Idempotent**: `normalize_all(normalize_all(x)) == normalize_all(x)`
//! - **Deterministic**: same input always produces same output
//! - **All-or-nothing**: a failing stage never yields a partial result
//! - **Stateless**: nothing outlives a call except the caller's options

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::LabeledError;
use crate::options::NormalizeOptions;
use crate::parser::{self, precheck};
use crate::tree::Document;
use crate::whitespace::is_xml_space;
use crate::{canonical, namespace, serializer, whitespace};
use crate::{Error, Result};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Start,
    StructuralPrecheck,
    Parse,
    WhitespaceNormalize,
    Canonicalize,
    NamespaceNormalize,
    Serialize,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Stage::Start => "start",
            Stage::StructuralPrecheck => "structural-precheck",
            Stage::Parse => "parse",
            Stage::WhitespaceNormalize => "whitespace-normalize",
            Stage::Canonicalize => "canonicalize",
            Stage::NamespaceNormalize => "namespace-normalize",
            Stage::Serialize => "serialize",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

// ── Public API ─────────────────────────────────────────────

/// Normalize XML text to canonical form
///
/// # Errors
/// - `InvalidInput` for empty input
/// - `MalformedXml` for anything that is not well-formed, including entity
///   references other than the predefined and numeric ones
/// - `ResourceExhausted` when the document is too deep or the output
///   cannot be allocated
///
/// # Example
/// ```
/// use xmlnorm_core::{normalize_all, NormalizeOptions};
///
/// let opts = NormalizeOptions::default();
/// let a = normalize_all("<root><b>2</b><a>1</a></root>", &opts).unwrap();
/// let b = normalize_all("<root>\n  <a>1</a>\n  <b>2</b>\n</root>", &opts).unwrap();
/// assert_eq!(a, b);
/// ```
pub fn normalize_all(xml: &str, options: &NormalizeOptions) -> Result<String> {
    let mut stage = Stage::Start;
    let result = run(xml, options, &mut stage);
    if let Err(ref e) = result {
        debug!(stage = %stage, kind = %e.kind(), error = %e, "normalization failed");
    }
    result
}

fn run(xml: &str, options: &NormalizeOptions, stage: &mut Stage) -> Result<String> {
    enter(stage, Stage::StructuralPrecheck);
    precheck::check(xml)?;

    enter(stage, Stage::Parse);
    let mut doc = parser::parse(xml)?;

    enter(stage, Stage::WhitespaceNormalize);
    whitespace::normalize(&mut doc, options);

    enter(stage, Stage::Canonicalize);
    canonical::canonicalize(&mut doc, options);

    enter(stage, Stage::NamespaceNormalize);
    namespace::normalize_namespaces(&mut doc);

    enter(stage, Stage::Serialize);
    let serialized = serializer::serialize(&doc, options);
    let output = if !options.pretty_print_output && options.ignore_insignificant_whitespace {
        strip_inter_tag_whitespace(&serialized)?
    } else {
        serialized
    };

    enter(stage, Stage::Done);
    Ok(output.trim().to_string())
}

fn enter(stage: &mut Stage, next: Stage) {
    debug!(from = %stage, to = %next, "stage");
    *stage = next;
}

/// Run the three tree transforms on an already parsed document
///
/// Whitespace, then attribute/child order, then namespace hoisting.
pub fn normalize_document(mut doc: Document, options: &NormalizeOptions) -> Document {
    whitespace::normalize(&mut doc, options);
    canonical::canonicalize(&mut doc, options);
    namespace::normalize_namespaces(&mut doc);
    doc
}

/// SHA-256 of the canonical form, lowercase hex
///
/// Equivalent documents have equal hashes.
pub fn semantic_hash(xml: &str, options: &NormalizeOptions) -> Result<String> {
    let canonical = normalize_all(xml, options)?;
    Ok(canonical_hash(&canonical))
}

/// SHA-256 of text that is already canonical
pub fn canonical_hash(canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Labelled input text, e.g. `selection` or `clipboard`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input<'a> {
    pub label: &'a str,
    pub text: &'a str,
}

impl<'a> Input<'a> {
    pub fn new(label: &'a str, text: &'a str) -> Self {
        Input { label, text }
    }
}

/// Canonical forms of two inputs, ready for an external diff viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedPair {
    pub left: String,
    pub right: String,
}

impl NormalizedPair {
    /// Byte-identical canonical forms
    pub fn is_equivalent(&self) -> bool {
        self.left == self.right
    }

    pub fn left_hash(&self) -> String {
        canonical_hash(&self.left)
    }

    pub fn right_hash(&self) -> String {
        canonical_hash(&self.right)
    }
}

/// Normalize two inputs with the same options
///
/// # Errors
/// The first failure, tagged with the label of the input that caused it.
/// The left input is processed first.
pub fn normalize_pair(
    left: Input<'_>,
    right: Input<'_>,
    options: &NormalizeOptions,
) -> std::result::Result<NormalizedPair, LabeledError> {
    let left_out =
        normalize_all(left.text, options).map_err(|e| LabeledError::new(left.label, e))?;
    let right_out =
        normalize_all(right.text, options).map_err(|e| LabeledError::new(right.label, e))?;
    Ok(NormalizedPair {
        left: left_out,
        right: right_out,
    })
}

// ── Final pass ─────────────────────────────────────────────

/// Drop whitespace runs lying strictly between a `>` and the next `<`
///
/// A run between a start tag and its own end tag is the whole content of a
/// leaf element and is kept.
///
/// Serialized text escapes `<` and `>`, so every literal `>` ends a tag and
/// every literal `<` starts one.
fn strip_inter_tag_whitespace(text: &str) -> Result<String> {
    let mut out = String::new();
    out.try_reserve(text.len()).map_err(|e| {
        Error::ResourceExhausted(format!(
            "cannot allocate {} bytes for output: {}; reduce the input size",
            text.len(),
            e
        ))
    })?;

    let bytes = text.as_bytes();
    let mut copied = 0;
    let mut i = 0;
    let mut after_start_tag = false;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                after_start_tag = bytes.get(i + 1) != Some(&b'/');
                i += 1;
                continue;
            }
            b'>' => {}
            _ => {
                i += 1;
                continue;
            }
        }
        let gap_start = i + 1;
        let mut gap_end = gap_start;
        while gap_end < bytes.len() && is_xml_space(bytes[gap_end] as char) {
            gap_end += 1;
        }
        let leaf_content = after_start_tag && bytes.get(gap_end + 1) == Some(&b'/');
        if gap_end > gap_start && bytes.get(gap_end) == Some(&b'<') && !leaf_content {
            out.push_str(&text[copied..gap_start]);
            copied = gap_end;
        }
        i = gap_end;
    }
    out.push_str(&text[copied..]);
    Ok(out)
}
