//! Node/attribute canonicalizer
//!
//! Imposes the canonical order on a tree:
//! 1. attributes sorted by name (byte-wise, case-sensitive) when enabled
//! 2. element children grouped by tag name
//! 3. recurse into every child element
//!
//! Sibling elements are reordered only among themselves: text nodes are
//! fixed barriers, so mixed content keeps its text/element interleaving.
//! Within a segment the sort is stable, so elements sharing a tag name keep
//! their document order (a list of `<item>`s stays in list order).

use std::cmp::Ordering;

use crate::options::NormalizeOptions;
use crate::tree::{Document, Element, Node};

/// Canonicalize attribute and child order throughout the tree
pub fn canonicalize(doc: &mut Document, options: &NormalizeOptions) {
    canonicalize_element(&mut doc.root, options);
}

fn canonicalize_element(el: &mut Element, options: &NormalizeOptions) {
    if options.sort_attributes {
        el.attributes.sort_by(|a, b| a.name.cmp(&b.name));
    }

    sort_element_segments(&mut el.children);

    for child in el.children.iter_mut() {
        if let Node::Element(child) = child {
            canonicalize_element(child, options);
        }
    }
}

/// Stable-sort each maximal run of consecutive element children by tag name
pub fn sort_element_segments(children: &mut [Node]) {
    for segment in children.split_mut(|node| !node.is_element()) {
        segment.sort_by(compare_tags);
    }
}

fn compare_tags(a: &Node, b: &Node) -> Ordering {
    match (a, b) {
        (Node::Element(a), Node::Element(b)) => a.tag.as_bytes().cmp(b.tag.as_bytes()),
        // segments never contain text
        _ => Ordering::Equal,
    }
}
