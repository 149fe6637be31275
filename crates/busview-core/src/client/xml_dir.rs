//! Directory-backed client.
//!
//! Serves introspection dumps saved on disk, laid out like the object tree:
//!
//! ```text
//! <dir>/introspect.xml                  → /
//! <dir>/org/introspect.xml              → /org
//! <dir>/org/example/introspect.xml      → /org/example
//! ```

use std::path::PathBuf;

use tracing::debug;

use super::{decode_reply, IntrospectError, IntrospectionClient, UNKNOWN_OBJECT};
use crate::document::Document;
use crate::path::SEPARATOR;

/// File name holding the dump of one object
pub const DUMP_FILE_NAME: &str = "introspect.xml";

/// Error name reported for unreadable dump files
const IO_ERROR: &str = "org.freedesktop.DBus.Error.IOError";

/// Introspection client reading saved XML dumps from a directory.
#[derive(Debug, Clone)]
pub struct XmlDirClient {
    dir: PathBuf,
    service: String,
}

impl XmlDirClient {
    /// Serve dumps from `dir`, labelling diagnostics with the directory name
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let service = dir.display().to_string();
        Self { dir, service }
    }

    /// Override the service label used in diagnostics
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Dump file for an object path.
    ///
    /// Returns `None` for paths with `.` or `..` segments, which would point
    /// outside the dump directory.
    pub fn dump_path(&self, path: &str) -> Option<PathBuf> {
        let mut file = self.dir.clone();
        for segment in path.split(SEPARATOR).filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return None;
            }
            file.push(segment);
        }
        file.push(DUMP_FILE_NAME);
        Some(file)
    }
}

impl IntrospectionClient for XmlDirClient {
    fn introspect(&self, path: &str) -> Result<Document, IntrospectError> {
        let Some(file) = self.dump_path(path) else {
            return Err(IntrospectError::unreachable(
                path,
                &self.service,
                UNKNOWN_OBJECT,
                format!("Object path '{}' leaves the dump directory", path),
            ));
        };
        debug!("Reading introspection dump {:?}", file);

        match std::fs::read_to_string(&file) {
            Ok(xml) => decode_reply(path, &self.service, &xml),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(IntrospectError::unreachable(
                    path,
                    &self.service,
                    UNKNOWN_OBJECT,
                    format!("No such object path '{}'", path),
                ))
            }
            Err(e) => Err(IntrospectError::call_failed(
                path,
                &self.service,
                IO_ERROR,
                e.to_string(),
            )),
        }
    }

    fn service(&self) -> &str {
        &self.service
    }
}
