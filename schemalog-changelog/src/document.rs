//! Changelog document tree and its XML rendering.
//!
//! The tree is deliberately small: elements with ordered attributes,
//! comments and text. Rendering follows the pretty-printed layout the
//! changelog tooling expects:
//!
//! ```text
//! <?xml version="1.0"?>
//! <databaseChangeLog>
//!   <changeSet author="schemalog" id="create-table-users">
//!     <createTable tableName="users">
//!       <column name="id" type="int"/>
//!     </createTable>
//!   </changeSet>
//! </databaseChangeLog>
//! ```

use std::fmt;

use indexmap::IndexMap;
use smol_str::SmolStr;

/// XML declaration emitted at the top of every document.
pub const XML_DECLARATION: &str = "<?xml version=\"1.0\"?>";

const INDENT: &str = "  ";

/// A node of the changelog tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// A comment, rendered between `<!--` and `-->`. Runs of `-` are
    /// split with spaces so the output stays well-formed.
    Comment(String),
    /// Character data.
    Text(String),
}

impl Node {
    /// Create a comment node.
    pub fn comment(text: impl Into<String>) -> Self {
        Self::Comment(text.into())
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }

    /// The comment text, if this node is a comment.
    pub fn as_comment(&self) -> Option<&str> {
        match self {
            Self::Comment(text) => Some(text),
            _ => None,
        }
    }

    /// Render the node at the given depth into `out`.
    pub(crate) fn render(&self, out: &mut String, depth: usize) {
        indent(out, depth);
        match self {
            Self::Element(element) => element.render(out, depth),
            other => other.render_inline(out),
        }
    }

    fn render_inline(&self, out: &mut String) {
        match self {
            Self::Element(element) => element.render_inline(out),
            Self::Comment(text) => {
                out.push_str("<!--");
                escape_comment(text, out);
                out.push_str("-->");
            }
            Self::Text(text) => escape_text(text, out),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(element)
    }
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: SmolStr,
    attributes: IndexMap<SmolStr, String>,
    children: Vec<Node>,
}

impl Element {
    /// Create an empty element.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute, builder style.
    pub fn attr(mut self, name: impl Into<SmolStr>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set an attribute only when a value is present, builder style.
    pub fn attr_opt(self, name: impl Into<SmolStr>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Append a child, builder style.
    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.push(node);
        self
    }

    /// Set an attribute. Setting an existing attribute keeps its position.
    pub fn set_attribute(&mut self, name: impl Into<SmolStr>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Append a child node.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.children.push(node.into());
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements, skipping comments and text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Child elements with the given name.
    pub fn elements_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    /// Comments directly under this element.
    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.children.iter().filter_map(Node::as_comment)
    }

    /// Concatenated text of the direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Whether the element has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Render with layout at the given depth. The caller has already
    /// written the indentation for the opening tag.
    pub(crate) fn render(&self, out: &mut String, depth: usize) {
        self.open_tag(out);

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        // Mixed content is rendered without layout.
        if self.children.iter().any(|c| matches!(c, Node::Text(_))) {
            out.push('>');
            for child in &self.children {
                child.render_inline(out);
            }
            self.close_tag(out);
            return;
        }

        out.push('>');
        for child in &self.children {
            out.push('\n');
            child.render(out, depth + 1);
        }
        out.push('\n');
        indent(out, depth);
        self.close_tag(out);
    }

    fn render_inline(&self, out: &mut String) {
        self.open_tag(out);
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.render_inline(out);
        }
        self.close_tag(out);
    }

    /// Write `<name attr="value" ...` without the closing bracket.
    pub(crate) fn open_tag(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (name, value) in &self.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            escape_attribute(value, out);
            out.push('"');
        }
    }

    fn close_tag(&self, out: &mut String) {
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// A complete changelog document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level node.
    pub fn push(&mut self, node: impl Into<Node>) {
        self.nodes.push(node.into());
    }

    /// Top-level nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// The root element, once the document has been finalized.
    pub fn root(&self) -> Option<&Element> {
        self.nodes.iter().find_map(Node::as_element)
    }

    /// Whether nothing has been attached yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Render the document as pretty-printed XML.
    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(256);
        out.push_str(XML_DECLARATION);
        out.push('\n');
        for node in &self.nodes {
            node.render(&mut out, 0);
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_xml())
    }
}

fn indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}

fn escape_attribute(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
}

fn escape_text(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            c => out.push(c),
        }
    }
}

fn escape_comment(value: &str, out: &mut String) {
    let mut previous = None;
    for c in value.chars() {
        if c == '-' && previous == Some('-') {
            out.push(' ');
        }
        out.push(c);
        previous = Some(c);
    }
    if previous == Some('-') {
        out.push(' ');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document() {
        assert_eq!(Document::new().to_xml(), "<?xml version=\"1.0\"?>\n");
    }

    #[test]
    fn test_empty_root_self_closes() {
        let mut doc = Document::new();
        doc.push(Element::new("databaseChangeLog"));
        assert_eq!(
            doc.to_xml(),
            "<?xml version=\"1.0\"?>\n<databaseChangeLog/>\n"
        );
    }

    #[test]
    fn test_nested_layout() {
        let root = Element::new("databaseChangeLog").child(
            Element::new("changeSet")
                .attr("author", "me")
                .attr("id", "create-table-t")
                .child(
                    Element::new("createTable").attr("tableName", "t").child(
                        Element::new("column")
                            .attr("name", "id")
                            .attr("type", "int")
                            .child(
                                Element::new("constraints")
                                    .attr("primaryKey", "true")
                                    .attr("nullable", "false"),
                            ),
                    ),
                ),
        );
        let mut doc = Document::new();
        doc.push(root);

        let expected = r#"<?xml version="1.0"?>
<databaseChangeLog>
  <changeSet author="me" id="create-table-t">
    <createTable tableName="t">
      <column name="id" type="int">
        <constraints primaryKey="true" nullable="false"/>
      </column>
    </createTable>
  </changeSet>
</databaseChangeLog>
"#;
        assert_eq!(doc.to_xml(), expected);
    }

    #[test]
    fn test_text_stays_inline_and_is_escaped() {
        let root = Element::new("databaseChangeLog")
            .child(Element::new("sql").child(Node::text("SELECT 1 < 2 & 3 > 0")));
        let mut doc = Document::new();
        doc.push(root);

        assert_eq!(
            doc.to_xml(),
            "<?xml version=\"1.0\"?>\n<databaseChangeLog>\n  <sql>SELECT 1 &lt; 2 &amp; 3 &gt; 0</sql>\n</databaseChangeLog>\n"
        );
    }

    #[test]
    fn test_comment_rendering() {
        let root = Element::new("databaseChangeLog")
            .child(Node::comment(" alterSequence is not supported (sequence: myseq)"));
        let mut doc = Document::new();
        doc.push(root);

        assert!(
            doc.to_xml()
                .contains("  <!-- alterSequence is not supported (sequence: myseq)-->\n")
        );
    }

    #[test]
    fn test_comment_dashes_are_split() {
        let root = Element::new("databaseChangeLog")
            .child(Node::comment(" index changes are not supported (index: idx--a---b-"));
        let mut doc = Document::new();
        doc.push(root);

        assert_eq!(
            doc.to_xml(),
            "<?xml version=\"1.0\"?>\n<databaseChangeLog>\n  <!-- index changes are not supported (index: idx- -a- - -b- -->\n</databaseChangeLog>\n"
        );
    }

    #[test]
    fn test_attribute_escaping() {
        let element = Element::new("column").attr("defaultValue", "a \"b\" <c> & d");
        let mut out = String::new();
        element.render(&mut out, 0);
        assert_eq!(
            out,
            r#"<column defaultValue="a &quot;b&quot; &lt;c&gt; &amp; d"/>"#
        );
    }

    #[test]
    fn test_set_attribute_keeps_position() {
        let mut element = Element::new("e").attr("a", "1").attr("b", "2");
        element.set_attribute("a", "3");
        let attrs: Vec<_> = element.attributes().collect();
        assert_eq!(attrs, [("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_queries() {
        let root = Element::new("root")
            .child(Element::new("a").attr("x", "1"))
            .child(Node::comment("note"))
            .child(Element::new("b"))
            .child(Element::new("a").attr("x", "2"));

        assert_eq!(root.elements().count(), 3);
        assert_eq!(root.elements_named("a").count(), 2);
        assert_eq!(root.comments().collect::<Vec<_>>(), ["note"]);
    }
}
