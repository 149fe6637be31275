//! Introspection document parser.
//!
//! Translates a [`Document`] into the ordered child descriptors of one object:
//! sub-path references (`<node>`) and interfaces (`<interface>`) with their
//! methods, signals and properties.
//!
//! Elements outside that schema are skipped without error, so additions to
//! the introspection format never break the cache.

use tracing::trace;

use crate::document::{Document, Element};
use crate::node::MemberKind;
use crate::path::namespace_name;

/// Argument direction contributing to a method's signature
const DIRECTION_IN: &str = "in";

/// A child produced by parsing one introspection document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildDescriptor {
    /// Sub-path reference; `name` carries exactly one trailing separator
    Namespace { name: String },
    /// Interface (with its members) or a bare member
    Member(MemberDescriptor),
}

/// An interface member, or an interface with its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor {
    pub kind: MemberKind,
    pub name: String,
    /// Concatenated input argument types for methods, `None` for other kinds
    pub extra: Option<String>,
    /// Methods, signals and properties of an interface; empty otherwise
    pub members: Vec<MemberDescriptor>,
}

impl MemberDescriptor {
    fn leaf(kind: MemberKind, name: String, extra: Option<String>) -> Self {
        Self {
            kind,
            name,
            extra,
            members: Vec::new(),
        }
    }
}

/// Recognized element tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Node,
    Interface,
    Method,
    Signal,
    Property,
    Arg,
    Unknown,
}

impl Tag {
    fn of(element: &Element) -> Self {
        match element.tag() {
            "node" => Tag::Node,
            "interface" => Tag::Interface,
            "method" => Tag::Method,
            "signal" => Tag::Signal,
            "property" => Tag::Property,
            "arg" => Tag::Arg,
            _ => Tag::Unknown,
        }
    }
}

/// Parse the children of the document element into descriptors.
///
/// Descriptor order follows document order.
pub fn parse(doc: &Document) -> Vec<ChildDescriptor> {
    let Some(root) = doc.document_element() else {
        return Vec::new();
    };

    let mut descriptors = Vec::with_capacity(root.children().len());
    for child in root.children() {
        match Tag::of(child) {
            Tag::Node => {
                let raw = child.attribute("name").unwrap_or_default();
                match namespace_name(raw) {
                    Some(name) => descriptors.push(ChildDescriptor::Namespace { name }),
                    None => trace!(name = raw, "skipping <node> without a usable name"),
                }
            }
            Tag::Interface => {
                let name = attribute_name(child);
                descriptors.push(ChildDescriptor::Member(MemberDescriptor {
                    kind: MemberKind::Interface,
                    name,
                    extra: None,
                    members: parse_members(child),
                }));
            }
            _ => trace!(tag = child.tag(), "skipping unknown top-level element"),
        }
    }
    descriptors
}

/// Parse the methods, signals and properties of an interface element
fn parse_members(iface: &Element) -> Vec<MemberDescriptor> {
    let mut members = Vec::new();
    for child in iface.children() {
        let member = match Tag::of(child) {
            Tag::Method => MemberDescriptor::leaf(
                MemberKind::Method,
                attribute_name(child),
                Some(input_signature(child)),
            ),
            Tag::Signal => MemberDescriptor::leaf(MemberKind::Signal, attribute_name(child), None),
            Tag::Property => {
                MemberDescriptor::leaf(MemberKind::Property, attribute_name(child), None)
            }
            _ => {
                trace!(tag = child.tag(), "skipping unknown interface element");
                continue;
            }
        };
        members.push(member);
    }
    members
}

/// Concatenate the types of all input arguments of a method, in document order
fn input_signature(method: &Element) -> String {
    method
        .children()
        .iter()
        .filter(|arg| Tag::of(arg) == Tag::Arg)
        .filter(|arg| arg.attribute("direction") == Some(DIRECTION_IN))
        .filter_map(|arg| arg.attribute("type"))
        .collect()
}

fn attribute_name(element: &Element) -> String {
    element.attribute("name").unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_xml(xml: &str) -> Vec<ChildDescriptor> {
        parse(&Document::from_xml(xml).unwrap())
    }

    #[test]
    fn test_nodes_get_trailing_separator() {
        let descriptors = parse_xml(r#"<node><node name="a"/><node name="b"/></node>"#);
        assert_eq!(
            descriptors,
            vec![
                ChildDescriptor::Namespace {
                    name: "a/".to_string()
                },
                ChildDescriptor::Namespace {
                    name: "b/".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_unknown_top_level_element_is_skipped() {
        let descriptors =
            parse_xml(r#"<node><interface name="org.example.Foo"/><bogus/></node>"#);
        let [ChildDescriptor::Member(iface)] = descriptors.as_slice() else {
            panic!("expected a single interface descriptor");
        };
        assert_eq!(iface.name, "org.example.Foo");
    }

    #[test]
    fn test_method_signature_uses_input_arguments_only() {
        let descriptors = parse_xml(
            r#"<node>
                 <interface name="org.example.Foo">
                   <method name="Bar">
                     <arg type="s" direction="in"/>
                     <arg type="i" direction="out"/>
                     <arg type="b" direction="in"/>
                   </method>
                 </interface>
               </node>"#,
        );
        let ChildDescriptor::Member(iface) = &descriptors[0] else {
            panic!("expected interface descriptor");
        };
        assert_eq!(iface.members.len(), 1);
        assert_eq!(iface.members[0].kind, MemberKind::Method);
        assert_eq!(iface.members[0].extra.as_deref(), Some("sb"));
    }

    #[test]
    fn test_member_kinds_and_order() {
        let descriptors = parse_xml(
            r#"<node>
                 <interface name="org.example.Foo">
                   <property name="Version" type="s" access="read"/>
                   <annotation name="org.freedesktop.DBus.Deprecated" value="true"/>
                   <signal name="Changed"><arg type="s"/></signal>
                   <method name="Ping"/>
                 </interface>
               </node>"#,
        );
        let ChildDescriptor::Member(iface) = &descriptors[0] else {
            panic!("expected interface descriptor");
        };
        let kinds: Vec<_> = iface.members.iter().map(|m| (m.kind, m.name.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (MemberKind::Property, "Version"),
                (MemberKind::Signal, "Changed"),
                (MemberKind::Method, "Ping"),
            ]
        );
        assert_eq!(iface.members[0].extra, None);
        assert_eq!(iface.members[2].extra.as_deref(), Some(""));
    }

    #[test]
    fn test_nameless_node_is_skipped() {
        let descriptors = parse_xml(r#"<node><node/><node name="ok"/></node>"#);
        assert_eq!(
            descriptors,
            vec![ChildDescriptor::Namespace {
                name: "ok/".to_string()
            }]
        );
    }

    #[test]
    fn test_multi_segment_node_name_is_skipped() {
        let descriptors = parse_xml(
            r#"<node><node name="a/b"/><node name="/c/d"/><node name="e"/></node>"#,
        );
        assert_eq!(
            descriptors,
            vec![ChildDescriptor::Namespace {
                name: "e/".to_string()
            }]
        );
    }

    #[test]
    fn test_empty_document() {
        assert!(parse(&Document::empty()).is_empty());
    }
}
