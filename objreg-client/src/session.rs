//! The caller's own registration identity and liveness gate.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Fixed identity fields sent with every registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    /// Registered object name, the lookup key.
    pub name: String,
    /// Address advertised to other registry users.
    pub address: String,
    pub language: String,
    pub version: String,
    pub region: String,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            name: "rust_object".to_string(),
            address: "127.0.0.1:8000".to_string(),
            language: "Rust".to_string(),
            version: "1.0".to_string(),
            region: "PL".to_string(),
        }
    }
}

/// Shared registration state for one process.
///
/// `alive` gates the liveness monitor: false until the first
/// successful register, false again after an explicit deregister.
/// `bound_endpoint` records which replica last accepted us; it is
/// informational only and never pins subsequent calls (those stay
/// sticky via the endpoint set's own index).
#[derive(Debug)]
pub struct Session {
    identity: Identity,
    alive: AtomicBool,
    bound_endpoint: Mutex<Option<String>>,
}

impl Session {
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            alive: AtomicBool::new(false),
            bound_endpoint: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn identity(&self) -> &Identity {
        &self.identity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Record a successful register: liveness monitoring resumes.
    pub fn mark_registered(&self, endpoint_address: &str) {
        *self.bound_endpoint.lock() = Some(endpoint_address.to_string());
        self.alive.store(true, Ordering::Release);
    }

    /// Record a successful deregister: the monitor suspends until the
    /// next successful register.
    pub fn mark_deregistered(&self) {
        self.alive.store(false, Ordering::Release);
        *self.bound_endpoint.lock() = None;
    }

    /// Replica that last accepted our registration, if any.
    #[must_use]
    pub fn bound_endpoint(&self) -> Option<String> {
        self.bound_endpoint.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            name: "calculator".to_string(),
            address: "10.0.0.7:8000".to_string(),
            language: "Rust".to_string(),
            version: "1.0".to_string(),
            region: "PL".to_string(),
        }
    }

    #[test]
    fn starts_suspended() {
        let session = Session::new(identity());
        assert!(!session.is_alive());
        assert_eq!(session.bound_endpoint(), None);
    }

    #[test]
    fn register_deregister_cycle() {
        let session = Session::new(identity());

        session.mark_registered("registry-a:50051");
        assert!(session.is_alive());
        assert_eq!(
            session.bound_endpoint().as_deref(),
            Some("registry-a:50051")
        );

        session.mark_deregistered();
        assert!(!session.is_alive());
        assert_eq!(session.bound_endpoint(), None);

        session.mark_registered("registry-b:50051");
        assert!(session.is_alive());
        assert_eq!(
            session.bound_endpoint().as_deref(),
            Some("registry-b:50051")
        );
    }
}
