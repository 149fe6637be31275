//! Introspection Document Model
//!
//! An owned element tree decoded from introspection XML. Only elements and
//! their attributes are kept: text, comments, processing instructions and
//! the `<!DOCTYPE>` declaration carry nothing the cache needs.

use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

/// Errors that can occur while decoding an introspection document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The XML reader rejected the input
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    /// An attribute could not be read
    #[error("malformed attribute at byte {position}: {source}")]
    Attribute {
        position: u64,
        #[source]
        source: AttrError,
    },

    /// The input ended while elements were still open
    #[error("unexpected end of document: element <{tag}> is not closed")]
    Unclosed { tag: String },

    /// A second top-level element followed the document element
    #[error("unexpected top-level element <{tag}> after the document element")]
    MultipleRoots { tag: String },
}

/// A single element: tag name, attributes in document order, child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    /// Create an element with no attributes or children
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add an attribute (builder style)
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Add a child element (builder style)
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Look up an attribute value by name
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Child elements in document order
    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

/// A parsed introspection document.
///
/// A document without a root element is valid and describes an object with
/// no children and no interfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    root: Option<Element>,
}

impl Document {
    /// Create an empty document
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a document from an already built root element
    pub fn from_root(root: Element) -> Self {
        Self { root: Some(root) }
    }

    /// The document element, if any
    pub fn document_element(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    /// Decode introspection XML.
    ///
    /// # Examples
    /// ```
    /// use busview_core::Document;
    ///
    /// let doc = Document::from_xml(r#"<node><node name="child"/></node>"#).unwrap();
    /// let root = doc.document_element().unwrap();
    /// assert_eq!(root.children()[0].attribute("name"), Some("child"));
    /// ```
    pub fn from_xml(xml: &str) -> Result<Self, DocumentError> {
        let mut reader = Reader::from_str(xml);
        let mut open: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let position = reader.buffer_position() as u64;
            let event = reader
                .read_event()
                .map_err(|source| DocumentError::Xml { position, source })?;

            match event {
                Event::Start(start) => {
                    open.push(element_from(&start, position)?);
                }
                Event::Empty(start) => {
                    let element = element_from(&start, position)?;
                    attach(&mut open, &mut root, element)?;
                }
                Event::End(_) => {
                    // The reader verifies end tag names, so the stack cannot underflow
                    if let Some(element) = open.pop() {
                        attach(&mut open, &mut root, element)?;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(unclosed) = open.pop() {
            return Err(DocumentError::Unclosed { tag: unclosed.tag });
        }

        Ok(Self { root })
    }
}

/// Build an element (without children) from a start tag
fn element_from(start: &BytesStart<'_>, position: u64) -> Result<Element, DocumentError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|source| DocumentError::Attribute { position, source })?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|source| DocumentError::Xml { position, source })?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Attach a finished element to its parent, or make it the document element
fn attach(
    open: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), DocumentError> {
    if let Some(parent) = open.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(DocumentError::MultipleRoots { tag: element.tag });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCTYPE_XML: &str = r#"<!DOCTYPE node PUBLIC "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN"
 "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd">
<node>
  <!-- exported objects -->
  <interface name="org.example.Echo">
    <method name="Echo">
      <arg name="text" type="s" direction="in"/>
      <arg name="reply" type="s" direction="out"/>
    </method>
  </interface>
  <node name="child"/>
</node>
"#;

    #[test]
    fn test_decode_with_doctype_and_comments() {
        let doc = Document::from_xml(DOCTYPE_XML).unwrap();
        let root = doc.document_element().unwrap();
        assert_eq!(root.tag(), "node");
        assert_eq!(root.children().len(), 2);

        let iface = &root.children()[0];
        assert_eq!(iface.tag(), "interface");
        assert_eq!(iface.attribute("name"), Some("org.example.Echo"));

        let method = &iface.children()[0];
        assert_eq!(method.children().len(), 2);
        assert_eq!(method.children()[1].attribute("direction"), Some("out"));
    }

    #[test]
    fn test_decode_unescapes_attributes() {
        let doc = Document::from_xml(r#"<node><node name="a&amp;b"/></node>"#).unwrap();
        let child = &doc.document_element().unwrap().children()[0];
        assert_eq!(child.attribute("name"), Some("a&b"));
    }

    #[test]
    fn test_empty_input_is_empty_document() {
        let doc = Document::from_xml("").unwrap();
        assert!(doc.document_element().is_none());

        let doc = Document::from_xml("   \n").unwrap();
        assert_eq!(doc, Document::empty());
    }

    #[test]
    fn test_unclosed_element() {
        let err = Document::from_xml("<node><interface name=\"x\">").unwrap_err();
        assert!(matches!(err, DocumentError::Unclosed { .. }));
    }

    #[test]
    fn test_mismatched_end_tag() {
        let err = Document::from_xml("<node><interface></node>").unwrap_err();
        assert!(matches!(err, DocumentError::Xml { .. }));
    }

    #[test]
    fn test_multiple_roots() {
        let err = Document::from_xml("<node/><node/>").unwrap_err();
        assert!(matches!(err, DocumentError::MultipleRoots { .. }));
    }

    #[test]
    fn test_builder() {
        let doc = Document::from_root(
            Element::new("node").with_child(Element::new("node").with_attr("name", "a")),
        );
        let root = doc.document_element().unwrap();
        assert_eq!(root.children()[0].attribute("name"), Some("a"));
        assert_eq!(root.attribute("missing"), None);
    }
}
