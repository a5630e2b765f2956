use crate::{BalanceAlgorithm, Timeout};
use std::{fmt, net::IpAddr, num::NonZeroU16};

/// Identifies a backend by the service port it forwards to.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BackendId {
    pub namespace: String,
    pub name: String,
    pub port: NonZeroU16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Backend {
    id: BackendId,
    endpoints: Vec<Endpoint>,
    pub balance_algorithm: BalanceAlgorithm,
    pub maxconn_server: u32,
    pub maxqueue_server: u32,
    pub secure: bool,
    pub mode_tcp: bool,
    pub timeout: BackendTimeout,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendTimeout {
    pub connect: Option<Timeout>,
    pub queue: Option<Timeout>,
    pub server: Option<Timeout>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoint {
    pub ip: IpAddr,
    pub port: NonZeroU16,
    /// The `namespace/name` of the pod behind this address, when known.
    pub target: String,
}

// === impl BackendId ===

impl BackendId {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, port: NonZeroU16) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            port,
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.namespace, self.name, self.port)
    }
}

// === impl Backend ===

impl Backend {
    pub(super) fn new(id: BackendId) -> Self {
        Self {
            id,
            endpoints: Vec::new(),
            balance_algorithm: BalanceAlgorithm::default(),
            maxconn_server: 0,
            maxqueue_server: 0,
            secure: false,
            mode_tcp: false,
            timeout: BackendTimeout::default(),
        }
    }

    pub fn id(&self) -> &BackendId {
        &self.id
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn add_endpoint(&mut self, ip: IpAddr, port: NonZeroU16, target: impl Into<String>) {
        self.endpoints.push(Endpoint {
            ip,
            port,
            target: target.into(),
        });
    }

    pub fn clear_endpoints(&mut self) {
        self.endpoints.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_display() {
        let id = BackendId::new("ns", "echo", NonZeroU16::new(8080).unwrap());
        assert_eq!(id.to_string(), "ns_echo_8080");
    }

    #[test]
    fn endpoints_replace() {
        let mut backend = Backend::new(BackendId::new(
            "ns",
            "echo",
            NonZeroU16::new(8080).unwrap(),
        ));
        backend.add_endpoint(
            "10.0.0.1".parse().unwrap(),
            NonZeroU16::new(8080).unwrap(),
            "ns/echo-0",
        );
        backend.clear_endpoints();
        backend.add_endpoint(
            "10.0.0.2".parse().unwrap(),
            NonZeroU16::new(8080).unwrap(),
            "ns/echo-1",
        );
        assert_eq!(
            backend.endpoints(),
            &[Endpoint {
                ip: "10.0.0.2".parse().unwrap(),
                port: NonZeroU16::new(8080).unwrap(),
                target: "ns/echo-1".to_string(),
            }]
        );
    }
}
