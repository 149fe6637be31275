//! Common test utilities for integration tests.
//!
//! Provides a small scripted service shaped like a typical session bus
//! object tree, plus helpers to walk a cache from the root.

#![allow(dead_code)]

use busview_core::{FixtureClient, LazyTreeCache, NodeId};

pub const SERVICE: &str = "org.example.Demo";

pub const ROOT_XML: &str = r#"<!DOCTYPE node PUBLIC "-//freedesktop//DTD D-BUS Object Introspection 1.0//EN"
 "http://www.freedesktop.org/standards/dbus/1.0/introspect.dtd">
<node>
  <interface name="org.freedesktop.DBus.Introspectable">
    <method name="Introspect">
      <arg name="xml_data" type="s" direction="out"/>
    </method>
  </interface>
  <node name="org"/>
</node>"#;

pub const ORG_XML: &str = r#"<node>
  <node name="example"/>
</node>"#;

pub const EXAMPLE_XML: &str = r#"<node>
  <node name="Demo"/>
  <node name="Other"/>
</node>"#;

pub const DEMO_XML: &str = r#"<node>
  <interface name="org.example.Demo">
    <method name="Frobnicate">
      <arg name="name" type="s" direction="in"/>
      <arg name="result" type="i" direction="out"/>
      <arg name="force" type="b" direction="in"/>
    </method>
    <signal name="Frobnicated">
      <arg name="name" type="s"/>
    </signal>
    <property name="Enabled" type="b" access="readwrite"/>
    <annotation name="org.freedesktop.DBus.Deprecated" value="false"/>
  </interface>
  <bogus/>
</node>"#;

/// Scripted client serving the demo tree
pub fn demo_client() -> FixtureClient {
    FixtureClient::new(SERVICE)
        .with_xml("/", ROOT_XML)
        .with_xml("/org", ORG_XML)
        .with_xml("/org/example", EXAMPLE_XML)
        .with_xml("/org/example/Demo", DEMO_XML)
        .with_xml("/org/example/Other", "<node/>")
}

/// Every node reachable from the root by successive `child_at` calls,
/// in depth-first order
pub fn walk(cache: &mut LazyTreeCache) -> Vec<NodeId> {
    let mut seen = Vec::new();
    let mut pending = vec![cache.root()];
    while let Some(node) = pending.pop() {
        seen.push(node);
        let count = cache.child_count(node);
        for row in (0..count).rev() {
            if let Some(child) = cache.child_at(node, row) {
                pending.push(child);
            }
        }
    }
    seen
}
