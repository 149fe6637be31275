//! Scripted in-memory client.
//!
//! Serves canned introspection XML per object path and records every call,
//! which makes population counts observable from the outside. Clones share
//! state, so a caller can keep a handle after moving a clone into a cache.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{decode_reply, IntrospectError, IntrospectionClient, UNKNOWN_OBJECT};
use crate::document::Document;

/// A scripted reply
#[derive(Debug, Clone)]
enum Reply {
    Xml(String),
    Failure { code: String, message: String },
}

#[derive(Debug, Default)]
struct FixtureState {
    /// Queued replies per path; the last reply of a queue is sticky
    replies: HashMap<String, VecDeque<Reply>>,
    /// Every path introspected, in call order
    calls: Vec<String>,
}

/// In-memory introspection client with scripted replies.
#[derive(Debug, Clone)]
pub struct FixtureClient {
    service: String,
    state: Arc<Mutex<FixtureState>>,
}

impl FixtureClient {
    /// Create a client with no scripted replies
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            state: Arc::new(Mutex::new(FixtureState::default())),
        }
    }

    /// Script an XML reply for `path` (builder style)
    pub fn with_xml(self, path: &str, xml: impl Into<String>) -> Self {
        self.push_xml(path, xml);
        self
    }

    /// Queue an XML reply for `path`.
    ///
    /// Replies are served in order; once a single reply remains it is
    /// repeated for every later call.
    pub fn push_xml(&self, path: &str, xml: impl Into<String>) {
        self.push(path, Reply::Xml(xml.into()));
    }

    /// Queue a failing reply for `path`
    pub fn push_failure(&self, path: &str, code: impl Into<String>, message: impl Into<String>) {
        self.push(
            path,
            Reply::Failure {
                code: code.into(),
                message: message.into(),
            },
        );
    }

    fn push(&self, path: &str, reply: Reply) {
        self.state
            .lock()
            .replies
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Paths introspected so far, in call order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    /// Number of calls made for `path`
    pub fn call_count(&self, path: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == path).count()
    }

    /// Total number of calls made
    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.len()
    }

    /// Forget recorded calls (scripted replies are kept)
    pub fn reset_calls(&self) {
        self.state.lock().calls.clear();
    }
}

impl IntrospectionClient for FixtureClient {
    fn introspect(&self, path: &str) -> Result<Document, IntrospectError> {
        let reply = {
            let mut state = self.state.lock();
            state.calls.push(path.to_string());
            state.replies.get_mut(path).and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            })
        };

        match reply {
            Some(Reply::Xml(xml)) => decode_reply(path, &self.service, &xml),
            Some(Reply::Failure { code, message }) => Err(IntrospectError::call_failed(
                path,
                &self.service,
                code,
                message,
            )),
            None => Err(IntrospectError::unreachable(
                path,
                &self.service,
                UNKNOWN_OBJECT,
                format!("No such object path '{}'", path),
            )),
        }
    }

    fn service(&self) -> &str {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_reply_and_call_recording() {
        let client = FixtureClient::new("org.example").with_xml("/", "<node/>");
        assert!(client.introspect("/").is_ok());
        assert!(client.introspect("/missing").is_err());
        assert_eq!(client.calls(), vec!["/", "/missing"]);
        assert_eq!(client.call_count("/"), 1);
        assert_eq!(client.total_calls(), 2);
    }

    #[test]
    fn test_queued_replies_last_is_sticky() {
        let client = FixtureClient::new("svc");
        client.push_xml("/", r#"<node><node name="a"/></node>"#);
        client.push_xml("/", r#"<node><node name="b"/></node>"#);

        let first = client.introspect("/").unwrap();
        let second = client.introspect("/").unwrap();
        let third = client.introspect("/").unwrap();

        let name = |doc: &Document| {
            doc.document_element().unwrap().children()[0]
                .attribute("name")
                .map(str::to_string)
        };
        assert_eq!(name(&first).as_deref(), Some("a"));
        assert_eq!(name(&second).as_deref(), Some("b"));
        assert_eq!(name(&third).as_deref(), Some("b"));
    }

    #[test]
    fn test_missing_path_is_unknown_object() {
        let client = FixtureClient::new("svc");
        let err = client.introspect("/nowhere").unwrap_err();
        assert_eq!(err.code(), Some(UNKNOWN_OBJECT));
    }

    #[test]
    fn test_scripted_failure() {
        let client = FixtureClient::new("svc");
        client.push_failure("/", "org.freedesktop.DBus.Error.AccessDenied", "denied");
        let err = client.introspect("/").unwrap_err();
        assert!(matches!(err, IntrospectError::CallFailed { .. }));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_clones_share_state() {
        let client = FixtureClient::new("svc").with_xml("/", "<node/>");
        let clone = client.clone();
        clone.introspect("/").unwrap();
        assert_eq!(client.total_calls(), 1);
        client.reset_calls();
        assert_eq!(clone.total_calls(), 0);
    }
}
