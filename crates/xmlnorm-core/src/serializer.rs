//! Canonical serializer: [`Document`] → XML text
//!
//! Produces deterministic output with:
//! - no XML declaration, comments or processing instructions
//! - empty elements always written as `<tag></tag>`
//! - attributes in tree order, double-quoted
//! - pretty mode: one element per line, `indentation_string` per level;
//!   elements holding any text are written inline so text is never
//!   altered by indentation
//! - compact mode: no whitespace inserted at all
//!
//! Pretty mode applies only when insignificant whitespace is ignored. With
//! whitespace kept, the inserted line breaks would read back as text nodes,
//! so output falls back to compact.

use crate::options::NormalizeOptions;
use crate::tree::{Document, Element, Node};

/// Serialize a document tree. Always succeeds.
pub fn serialize(doc: &Document, options: &NormalizeOptions) -> String {
    let mut out = String::new();
    if options.pretty_print_output && options.ignore_insignificant_whitespace {
        write_pretty(&mut out, &doc.root, 0, &options.indentation_string);
    } else {
        write_compact(&mut out, &doc.root);
    }
    out
}

fn write_pretty(out: &mut String, el: &Element, depth: usize, indent: &str) {
    write_indent(out, depth, indent);
    if el.children.is_empty() || el.has_text_children() {
        write_compact(out, el);
    } else {
        write_start_tag(out, el);
        out.push('\n');
        for child in el.child_elements() {
            write_pretty(out, child, depth + 1, indent);
        }
        write_indent(out, depth, indent);
        write_end_tag(out, el);
    }
    out.push('\n');
}

fn write_compact(out: &mut String, el: &Element) {
    write_start_tag(out, el);
    for child in &el.children {
        match child {
            Node::Element(child) => write_compact(out, child),
            Node::Text(text) => escape_text_into(out, text),
        }
    }
    write_end_tag(out, el);
}

// ── Helpers ────────────────────────────────────────────────

fn write_indent(out: &mut String, depth: usize, indent: &str) {
    for _ in 0..depth {
        out.push_str(indent);
    }
}

fn write_start_tag(out: &mut String, el: &Element) {
    out.push('<');
    out.push_str(&el.tag);
    for attr in &el.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        escape_attr_into(out, &attr.value);
        out.push('"');
    }
    out.push('>');
}

fn write_end_tag(out: &mut String, el: &Element) {
    out.push_str("</");
    out.push_str(&el.tag);
    out.push('>');
}

fn escape_text_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}

/// Tab, newline and CR are written as character references so that a
/// re-parse yields the same value.
fn escape_attr_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(
            Element::new("root")
                .with_attribute("id", "1")
                .with_child(Node::Element(Element::new("a").with_text("1")))
                .with_child(Node::Element(
                    Element::new("b").with_child(Node::Element(Element::new("empty"))),
                )),
        )
    }

    #[test]
    fn test_pretty_output() {
        let out = serialize(&sample(), &NormalizeOptions::default());
        assert_eq!(
            out,
            "<root id=\"1\">\n  <a>1</a>\n  <b>\n    <empty></empty>\n  </b>\n</root>\n"
        );
    }

    #[test]
    fn test_compact_output() {
        let out = serialize(&sample(), &NormalizeOptions::compact());
        assert_eq!(out, "<root id=\"1\"><a>1</a><b><empty></empty></b></root>");
    }

    #[test]
    fn test_pretty_falls_back_to_compact_when_whitespace_kept() {
        let opts = NormalizeOptions {
            ignore_insignificant_whitespace: false,
            ..NormalizeOptions::default()
        };
        assert!(opts.pretty_print_output);
        let out = serialize(&sample(), &opts);
        assert_eq!(out, "<root id=\"1\"><a>1</a><b><empty></empty></b></root>");
    }

    #[test]
    fn test_custom_indentation() {
        let opts = NormalizeOptions {
            indentation_string: "\t".into(),
            ..NormalizeOptions::default()
        };
        let out = serialize(&sample(), &opts);
        assert!(out.contains("\n\t<a>1</a>\n"), "{}", out);
        assert!(out.contains("\n\t\t<empty></empty>\n"), "{}", out);
    }

    #[test]
    fn test_mixed_content_inline() {
        let doc = Document::new(
            Element::new("root").with_child(Node::Element(
                Element::new("p")
                    .with_text("Hello ")
                    .with_child(Node::Element(Element::new("b").with_text("world")))
                    .with_text("!"),
            )),
        );
        let out = serialize(&doc, &NormalizeOptions::default());
        assert_eq!(out, "<root>\n  <p>Hello <b>world</b>!</p>\n</root>\n");
    }

    #[test]
    fn test_escaping() {
        let doc = Document::new(
            Element::new("t")
                .with_attribute("q", "a\"b<c>&\n\t")
                .with_text("1 < 2 && 3 > 2 'ok' \"ok\""),
        );
        let out = serialize(&doc, &NormalizeOptions::compact());
        assert_eq!(
            out,
            "<t q=\"a&quot;b&lt;c&gt;&amp;&#10;&#9;\">1 &lt; 2 &amp;&amp; 3 &gt; 2 'ok' \"ok\"</t>"
        );
    }

    #[test]
    fn test_serialized_output_reparses_to_same_tree() {
        let doc = Document::new(
            Element::new("t")
                .with_attribute("q", "line1\nline2\r\t\"&<>")
                .with_text("x < y & z"),
        );
        for opts in [NormalizeOptions::default(), NormalizeOptions::compact()] {
            let text = serialize(&doc, &opts);
            assert_eq!(crate::parser::parse(&text).unwrap(), doc);
        }
    }
}
