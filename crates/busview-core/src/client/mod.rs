//! Introspection clients.
//!
//! The cache talks to the remote side through [`IntrospectionClient`], a
//! blocking call returning a parsed [`Document`]. Implementations:
//! - [`BusctlClient`]: runs `busctl introspect` against a live bus
//! - [`XmlDirClient`]: serves a directory of saved introspection dumps
//! - [`FixtureClient`]: scripted in-memory responses with call recording

mod busctl;
mod fixture;
mod xml_dir;

pub use busctl::{BusKind, BusctlClient};
pub use fixture::FixtureClient;
pub use xml_dir::XmlDirClient;

use std::sync::Arc;

use thiserror::Error;

use crate::document::{Document, DocumentError};

/// Error name reported for object paths the remote side does not export
pub const UNKNOWN_OBJECT: &str = "org.freedesktop.DBus.Error.UnknownObject";

/// Error name reported when no service answers
pub const SERVICE_UNKNOWN: &str = "org.freedesktop.DBus.Error.ServiceUnknown";

/// Errors returned by an introspection call.
///
/// The display text is ready to be shown to a user as is.
#[derive(Debug, Error)]
pub enum IntrospectError {
    /// The object could not be reached
    #[error("Cannot introspect object {path} at {service}:\n  {code} ({message})")]
    Unreachable {
        path: String,
        service: String,
        code: String,
        message: String,
    },

    /// The introspection call itself returned an error
    #[error("Call to object {path} at {service}:\n  {code} ({message}) failed")]
    CallFailed {
        path: String,
        service: String,
        code: String,
        message: String,
    },

    /// The reply could not be decoded
    #[error("Invalid XML received from object {path} at {service}")]
    InvalidXml {
        path: String,
        service: String,
        #[source]
        source: DocumentError,
    },

    /// The transport program could not be started
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl IntrospectError {
    /// Create an Unreachable error.
    pub fn unreachable(
        path: impl Into<String>,
        service: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Unreachable {
            path: path.into(),
            service: service.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a CallFailed error.
    pub fn call_failed(
        path: impl Into<String>,
        service: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::CallFailed {
            path: path.into(),
            service: service.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create an InvalidXml error.
    pub fn invalid_xml(
        path: impl Into<String>,
        service: impl Into<String>,
        source: DocumentError,
    ) -> Self {
        Self::InvalidXml {
            path: path.into(),
            service: service.into(),
            source,
        }
    }

    /// Coarse error code from the transport, when one is available
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Unreachable { code, .. } | Self::CallFailed { code, .. } => Some(code.as_str()),
            Self::Spawn { .. } => Some("spawn"),
            Self::InvalidXml { .. } => None,
        }
    }
}

/// Decode a reply body, mapping decode failures to [`IntrospectError::InvalidXml`]
pub(crate) fn decode_reply(
    path: &str,
    service: &str,
    xml: &str,
) -> Result<Document, IntrospectError> {
    Document::from_xml(xml).map_err(|source| IntrospectError::invalid_xml(path, service, source))
}

/// Blocking introspection of one object path.
///
/// `path` is always absolute, with no trailing separator except for the
/// root itself. Implementations enforce their own timeouts; the cache never
/// retries on its own.
pub trait IntrospectionClient {
    /// Fetch and decode the introspection document of `path`
    fn introspect(&self, path: &str) -> Result<Document, IntrospectError>;

    /// Name of the service being introspected, used in diagnostics
    fn service(&self) -> &str;
}

impl<T: IntrospectionClient + ?Sized> IntrospectionClient for Box<T> {
    fn introspect(&self, path: &str) -> Result<Document, IntrospectError> {
        (**self).introspect(path)
    }

    fn service(&self) -> &str {
        (**self).service()
    }
}

impl<T: IntrospectionClient + ?Sized> IntrospectionClient for Arc<T> {
    fn introspect(&self, path: &str) -> Result<Document, IntrospectError> {
        (**self).introspect(path)
    }

    fn service(&self) -> &str {
        (**self).service()
    }
}
