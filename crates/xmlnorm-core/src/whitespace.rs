//! Whitespace normalizer
//!
//! Rewrites text nodes and attribute values according to the whitespace
//! policy in [`NormalizeOptions`]. Element structure (tags, attribute
//! names, element order) is never touched.

use crate::options::NormalizeOptions;
use crate::tree::{Document, Element, Node};

/// XML whitespace: space, tab, newline, carriage return
pub fn is_xml_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

pub fn is_whitespace_only(text: &str) -> bool {
    text.chars().all(is_xml_space)
}

/// Normalize whitespace throughout the tree
///
/// Order of operations per element:
/// 1. attribute values (except namespace declarations) get the text rules
/// 2. whitespace-only gaps between element children are dropped when
///    `ignore_insignificant_whitespace` is set
/// 3. every remaining text node gets the text rules; nodes left empty
///    are removed
pub fn normalize(doc: &mut Document, options: &NormalizeOptions) {
    normalize_element(&mut doc.root, options);
}

fn normalize_element(el: &mut Element, options: &NormalizeOptions) {
    for attr in el
        .attributes
        .iter_mut()
        .filter(|a| !a.is_namespace_declaration())
    {
        attr.value = normalize_text(&attr.value, options);
    }

    let has_elements = el.children.iter().any(Node::is_element);
    if options.ignore_insignificant_whitespace && has_elements {
        el.children.retain(|child| match child {
            Node::Text(text) => !is_whitespace_only(text),
            Node::Element(_) => true,
        });
    }

    el.children.retain_mut(|child| match child {
        Node::Text(text) => {
            *text = normalize_text(text, options);
            !text.is_empty()
        }
        Node::Element(_) => true,
    });

    for child in el.children.iter_mut() {
        if let Node::Element(child) = child {
            normalize_element(child, options);
        }
    }
}

/// Apply the text rules to one string
///
/// - `normalize_whitespace_in_text_nodes`: each run of whitespace becomes
///   one space
/// - unless `preserve_leading_trailing_whitespace_in_text`: strip both ends
pub fn normalize_text(text: &str, options: &NormalizeOptions) -> String {
    let collapsed = if options.normalize_whitespace_in_text_nodes {
        collapse_whitespace(text)
    } else {
        text.to_string()
    };
    if options.preserve_leading_trailing_whitespace_in_text {
        collapsed
    } else {
        collapsed.trim_matches(is_xml_space).to_string()
    }
}

/// Replace every maximal whitespace run with a single space
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for ch in text.chars() {
        if is_xml_space(ch) {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Attribute;

    fn opts() -> NormalizeOptions {
        NormalizeOptions::default()
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a \t\r\n b"), "a b");
        assert_eq!(collapse_whitespace("  a  "), " a ");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace("60Hz"), "60Hz");
    }

    #[test]
    fn test_normalize_text_default() {
        assert_eq!(normalize_text("\n  preserved   spaces \n", &opts()), "preserved spaces");
    }

    #[test]
    fn test_normalize_text_preserve_edges() {
        let o = NormalizeOptions {
            preserve_leading_trailing_whitespace_in_text: true,
            ..opts()
        };
        assert_eq!(normalize_text("\n  a   b \n", &o), " a b ");
    }

    #[test]
    fn test_normalize_text_no_collapse() {
        let o = NormalizeOptions {
            normalize_whitespace_in_text_nodes: false,
            ..opts()
        };
        assert_eq!(normalize_text("  preserved  spaces  ", &o), "preserved  spaces");
    }

    #[test]
    fn test_non_xml_whitespace_is_content() {
        // no-break space is character data, not XML whitespace
        assert_eq!(normalize_text("\u{a0}a\u{a0}", &opts()), "\u{a0}a\u{a0}");
    }

    #[test]
    fn test_gaps_between_elements_dropped() {
        let mut doc = Document::new(
            Element::new("root")
                .with_text("\n  ")
                .with_child(Node::Element(Element::new("a").with_text("1")))
                .with_text("\n  ")
                .with_child(Node::Element(Element::new("b").with_text("2")))
                .with_text("\n"),
        );
        normalize(&mut doc, &opts());
        assert_eq!(doc.root.children.len(), 2);
        assert!(doc.root.children.iter().all(Node::is_element));
    }

    #[test]
    fn test_gaps_kept_when_not_ignored_and_edges_preserved() {
        let o = NormalizeOptions {
            ignore_insignificant_whitespace: false,
            preserve_leading_trailing_whitespace_in_text: true,
            ..opts()
        };
        let mut doc = Document::new(
            Element::new("root")
                .with_text("\n  ")
                .with_child(Node::Element(Element::new("a"))),
        );
        normalize(&mut doc, &o);
        assert_eq!(doc.root.children[0], Node::Text(" ".into()));
    }

    #[test]
    fn test_attribute_values_normalized() {
        let mut doc = Document::new(
            Element::new("item")
                .with_attribute("label", "  two   words ")
                .with_attribute("xmlns:a", " urn:x "),
        );
        normalize(&mut doc, &opts());
        assert_eq!(doc.root.attributes[0], Attribute::new("label", "two words"));
        assert_eq!(doc.root.attributes[1], Attribute::new("xmlns:a", " urn:x "));
    }

    #[test]
    fn test_structure_untouched() {
        let mut doc = Document::new(
            Element::new("r")
                .with_attribute("z", "1")
                .with_attribute("a", "2")
                .with_child(Node::Element(Element::new("y")))
                .with_child(Node::Element(Element::new("x"))),
        );
        let before = doc.clone();
        normalize(&mut doc, &opts());
        assert_eq!(doc, before);
    }

    #[test]
    fn test_whitespace_only_text_in_leaf_becomes_empty_element() {
        let mut doc = Document::new(Element::new("r").with_text("   "));
        normalize(&mut doc, &opts());
        assert!(doc.root.children.is_empty());
    }
}
