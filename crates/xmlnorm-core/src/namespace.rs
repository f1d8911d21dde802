//! Namespace canonicalizer: hoists declarations to the root
//!
//! Every `xmlns` / `xmlns:<prefix>` attribute is collected (document order,
//! last declaration wins), removed from where it was, and re-declared on
//! the root element ahead of its other attributes, in key order.
//!
//! Prefixes on element and attribute names are not rewritten: two
//! documents binding different prefixes to the same URI stay different.

use std::collections::BTreeMap;

use tracing::debug;

use crate::tree::{Attribute, Document, Element, Node};

/// Declaration key (`xmlns`, `xmlns:a`) → namespace URI
pub type NamespaceMap = BTreeMap<String, String>;

/// Collect all namespace declarations without modifying the tree
pub fn collect_namespaces(doc: &Document) -> NamespaceMap {
    let mut map = NamespaceMap::new();
    collect_into(&doc.root, &mut map);
    map
}

fn collect_into(el: &Element, map: &mut NamespaceMap) {
    for attr in el.attributes.iter().filter(|a| a.is_namespace_declaration()) {
        if let Some(previous) = map.insert(attr.name.clone(), attr.value.clone()) {
            if previous != attr.value {
                debug!(
                    declaration = %attr.name,
                    previous = %previous,
                    uri = %attr.value,
                    element = %el.tag,
                    "namespace rebound, last declaration wins"
                );
            }
        }
    }
    for child in el.child_elements() {
        collect_into(child, map);
    }
}

/// Move every namespace declaration to the root element
///
/// Returns the map now declared on the root.
pub fn normalize_namespaces(doc: &mut Document) -> NamespaceMap {
    let map = collect_namespaces(doc);
    strip_declarations(&mut doc.root);

    let declarations = map
        .iter()
        .map(|(name, uri)| Attribute::new(name.as_str(), uri.as_str()));
    doc.root.attributes.splice(0..0, declarations);

    map
}

fn strip_declarations(el: &mut Element) {
    el.attributes.retain(|a| !a.is_namespace_declaration());
    for child in el.children.iter_mut() {
        if let Node::Element(child) = child {
            strip_declarations(child);
        }
    }
}
