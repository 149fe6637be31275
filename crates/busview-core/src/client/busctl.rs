//! Live bus client backed by systemd's `busctl`.
//!
//! Each introspection runs `busctl introspect --xml-interface` as a blocking
//! child process. The bus call timeout is delegated to busctl itself.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use tracing::debug;

use super::{decode_reply, IntrospectError, IntrospectionClient};
use crate::document::Document;

/// Default program name
pub const DEFAULT_BUSCTL: &str = "busctl";

/// Default bus call timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Which bus to connect to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusKind {
    /// Per-user session bus (default)
    #[default]
    Session,
    /// System-wide bus
    System,
}

impl BusKind {
    fn flag(&self) -> &'static str {
        match self {
            BusKind::Session => "--user",
            BusKind::System => "--system",
        }
    }
}

/// Introspection client calling `busctl`.
#[derive(Debug, Clone)]
pub struct BusctlClient {
    program: PathBuf,
    bus: BusKind,
    service: String,
    timeout: Duration,
}

impl BusctlClient {
    /// Introspect `service` on the given bus with default settings
    pub fn new(bus: BusKind, service: impl Into<String>) -> Self {
        Self {
            program: PathBuf::from(DEFAULT_BUSCTL),
            bus,
            service: service.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Use a different busctl executable
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the bus call timeout (rounded up to whole seconds, at least one)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bus this client talks to
    pub fn bus(&self) -> BusKind {
        self.bus
    }

    /// Arguments passed to busctl for one introspection
    pub fn command_args(&self, path: &str) -> Vec<String> {
        let secs = self.timeout.as_secs() + u64::from(self.timeout.subsec_nanos() > 0);
        vec![
            self.bus.flag().to_string(),
            format!("--timeout={}", secs.max(1)),
            "introspect".to_string(),
            "--xml-interface".to_string(),
            self.service.clone(),
            path.to_string(),
        ]
    }
}

impl IntrospectionClient for BusctlClient {
    fn introspect(&self, path: &str) -> Result<Document, IntrospectError> {
        let args = self.command_args(path);
        debug!("Running {} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| IntrospectError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let code = output
                .status
                .code()
                .map(|c| format!("exit-{}", c))
                .unwrap_or_else(|| "signal".to_string());
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(IntrospectError::call_failed(
                path,
                &self.service,
                code,
                message,
            ));
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        decode_reply(path, &self.service, &xml)
    }

    fn service(&self) -> &str {
        &self.service
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_args() {
        let client = BusctlClient::new(BusKind::System, "org.freedesktop.login1")
            .with_timeout(Duration::from_millis(1500));
        assert_eq!(
            client.command_args("/org/freedesktop/login1"),
            vec![
                "--system",
                "--timeout=2",
                "introspect",
                "--xml-interface",
                "org.freedesktop.login1",
                "/org/freedesktop/login1",
            ]
        );
    }

    #[test]
    fn test_timeout_is_at_least_one_second() {
        let client = BusctlClient::new(BusKind::Session, "svc").with_timeout(Duration::ZERO);
        assert!(client.command_args("/").contains(&"--timeout=1".to_string()));
        assert_eq!(client.bus(), BusKind::Session);
    }

    #[test]
    fn test_spawn_failure() {
        let client = BusctlClient::new(BusKind::Session, "svc")
            .with_program("/nonexistent/busview-test/busctl");
        let err = client.introspect("/").unwrap_err();
        assert!(matches!(err, IntrospectError::Spawn { .. }));
        assert_eq!(err.code(), Some("spawn"));
    }
}
