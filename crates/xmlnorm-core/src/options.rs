//! Normalization options
//!
//! The options record is owned by the caller and threaded by shared
//! reference through every stage. Settings records deserialize with
//! camelCase keys; any missing key takes its default.

use serde::{Deserialize, Serialize};

/// Default indentation used by the pretty printer
pub const DEFAULT_INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NormalizeOptions {
    /// Drop whitespace-only gaps between tags
    pub ignore_insignificant_whitespace: bool,
    /// Keep leading/trailing whitespace of text nodes and attribute values
    pub preserve_leading_trailing_whitespace_in_text: bool,
    /// Collapse runs of whitespace inside text to a single space
    pub normalize_whitespace_in_text_nodes: bool,
    pub pretty_print_output: bool,
    pub indentation_string: String,
    pub sort_attributes: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        NormalizeOptions {
            ignore_insignificant_whitespace: true,
            preserve_leading_trailing_whitespace_in_text: false,
            normalize_whitespace_in_text_nodes: true,
            pretty_print_output: true,
            indentation_string: DEFAULT_INDENT.to_string(),
            sort_attributes: true,
        }
    }
}

impl NormalizeOptions {
    /// Parse a JSON settings record. Unknown keys are ignored.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> String {
        // A struct of bools and a string always serializes
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Options for single-line output
    pub fn compact() -> Self {
        NormalizeOptions {
            pretty_print_output: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = NormalizeOptions::default();
        assert!(opts.ignore_insignificant_whitespace);
        assert!(!opts.preserve_leading_trailing_whitespace_in_text);
        assert!(opts.normalize_whitespace_in_text_nodes);
        assert!(opts.pretty_print_output);
        assert_eq!(opts.indentation_string, "  ");
        assert!(opts.sort_attributes);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let opts = NormalizeOptions::from_json(r#"{"prettyPrintOutput": false}"#).unwrap();
        assert_eq!(opts, NormalizeOptions::compact());

        let empty = NormalizeOptions::from_json("{}").unwrap();
        assert_eq!(empty, NormalizeOptions::default());
    }

    #[test]
    fn test_camel_case_keys_and_unknown_keys() {
        let json = r#"{
            "ignoreInsignificantWhitespace": false,
            "preserveLeadingTrailingWhitespaceInText": true,
            "normalizeWhitespaceInTextNodes": false,
            "indentationString": "\t",
            "sortAttributes": false,
            "someFutureSetting": 42
        }"#;
        let opts = NormalizeOptions::from_json(json).unwrap();
        assert!(!opts.ignore_insignificant_whitespace);
        assert!(opts.preserve_leading_trailing_whitespace_in_text);
        assert!(!opts.normalize_whitespace_in_text_nodes);
        assert!(opts.pretty_print_output);
        assert_eq!(opts.indentation_string, "\t");
        assert!(!opts.sort_attributes);
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        assert!(NormalizeOptions::from_json(r#"{"sortAttributes": "yes"}"#).is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let opts = NormalizeOptions::compact();
        let back = NormalizeOptions::from_json(&opts.to_json()).unwrap();
        assert_eq!(opts, back);
    }
}
