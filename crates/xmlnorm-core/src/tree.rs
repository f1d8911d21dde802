//! XML document tree
//!
//! A node is either an element or a run of character data. The tree is
//! built fresh for every normalization call, owned by that call, and
//! mutated in place by the pipeline stages.

/// A single attribute. Names are unique within an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            name: name.into(),
            value: value.into(),
        }
    }

    /// `xmlns` or `xmlns:<prefix>`
    pub fn is_namespace_declaration(&self) -> bool {
        self.name == "xmlns" || self.name.starts_with("xmlns:")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Attributes in document order until canonicalization reorders them
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Element {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute insertion, replacing an existing value
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set an attribute, keeping its position if it already exists
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    pub fn has_text_children(&self) -> bool {
        self.children.iter().any(|c| !c.is_element())
    }

    /// Concatenated text of the direct text children
    pub fn text(&self) -> String {
        self.children.iter().filter_map(Node::as_text).collect()
    }
}

/// A parsed document: exactly one root element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub root: Element,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Document { root }
    }

    /// Nesting depth of the deepest element; the root alone is depth 1
    pub fn depth(&self) -> usize {
        fn walk(el: &Element) -> usize {
            1 + el.child_elements().map(walk).max().unwrap_or(0)
        }
        walk(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut el = Element::new("item")
            .with_attribute("b", "1")
            .with_attribute("a", "2");
        el.set_attribute("b", "3");
        assert_eq!(el.attributes[0], Attribute::new("b", "3"));
        assert_eq!(el.attribute("a"), Some("2"));
        assert_eq!(el.attribute("c"), None);
    }

    #[test]
    fn test_namespace_declaration_detection() {
        assert!(Attribute::new("xmlns", "urn:a").is_namespace_declaration());
        assert!(Attribute::new("xmlns:x", "urn:a").is_namespace_declaration());
        assert!(!Attribute::new("xmlnsfoo", "urn:a").is_namespace_declaration());
        assert!(!Attribute::new("x:xmlns", "urn:a").is_namespace_declaration());
    }

    #[test]
    fn test_text_and_children() {
        let el = Element::new("p")
            .with_text("a")
            .with_child(Node::Element(Element::new("b")))
            .with_text("c");
        assert_eq!(el.text(), "ac");
        assert!(el.has_text_children());
        assert_eq!(el.child_elements().count(), 1);
    }

    #[test]
    fn test_depth() {
        let doc = Document::new(
            Element::new("a").with_child(Node::Element(
                Element::new("b").with_child(Node::Element(Element::new("c"))),
            )),
        );
        assert_eq!(doc.depth(), 3);
    }
}
