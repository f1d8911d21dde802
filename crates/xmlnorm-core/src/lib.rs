//! xmlnorm Core - semantic normalization of XML for text-diff comparison
//!
//! This is the single implementation of the normalization rules.
//! The CLI and the language bindings (Python, Go) all call into this crate.
//!
//! # Architecture
//!
//! ```text
//! XML Text → Precheck → Parser → Document → Whitespace → Canonical → Namespace
//!                                                                       ↓
//!                                                  Canonical Text ← Serializer
//! ```
//!
//! # Guarantees
//!
//! - **Deterministic**: Same input and options always produce identical output
//! - **Idempotent**: Normalizing canonical text returns it unchanged
//! - **Order-insensitive**: Attribute order and sibling order of differently
//!   named elements do not affect the output
//! - **Content-sensitive**: Differences in text content always survive

pub mod canonical;
pub mod error;
pub mod namespace;
pub mod normalizer;
pub mod options;
pub mod parser;
pub mod serializer;
pub mod tree;
pub mod whitespace;

/// Crate version, reported by the CLI and the bindings
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{Error, ErrorKind, LabeledError, Location, Result};
pub use normalizer::{
    canonical_hash, normalize_all, normalize_document, normalize_pair, semantic_hash, Input,
    NormalizedPair, Stage,
};
pub use options::NormalizeOptions;
pub use tree::{Attribute, Document, Element, Node};
