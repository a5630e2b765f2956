//! The proxy model: a topology store of frontends and backends. A model may be reused across
//! conversion passes; each pass clears the topology and rebuilds it from the current resources.

mod backend;
mod frontend;

pub use self::{
    backend::{Backend, BackendId, BackendTimeout, Endpoint},
    frontend::{Frontend, FrontendPath, FrontendTimeout, FrontendTls, DEFAULT_HOST},
};
use crate::Timeout;
use std::collections::BTreeMap;

/// Process-wide proxy settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Global {
    pub max_connections: u32,
    pub ssl_dh_default_max_size: u32,
    pub syslog_endpoint: String,
    pub timeout_stop: Option<Timeout>,
}

/// Frontends keyed by hostname and backends keyed by identity. Both enumerate in sorted order.
#[derive(Clone, Debug, Default)]
pub struct ProxyConfig {
    global: Global,
    frontends: BTreeMap<String, Frontend>,
    backends: BTreeMap<BackendId, Backend>,
    default_backend: Option<BackendId>,
}

// === impl ProxyConfig ===

impl ProxyConfig {
    pub fn global(&self) -> &Global {
        &self.global
    }

    pub fn global_mut(&mut self) -> &mut Global {
        &mut self.global
    }

    /// Drops every frontend and backend along with the default backend designation. The
    /// `Global` section is kept.
    pub fn clear_topology(&mut self) {
        self.frontends.clear();
        self.backends.clear();
        self.default_backend = None;
    }

    /// Returns the frontend for `hostname`, creating it if it does not exist.
    pub fn acquire_frontend(&mut self, hostname: &str) -> &mut Frontend {
        self.frontends
            .entry(hostname.to_string())
            .or_insert_with(|| Frontend::new(hostname))
    }

    pub fn acquire_default_frontend(&mut self) -> &mut Frontend {
        self.acquire_frontend(DEFAULT_HOST)
    }

    pub fn find_frontend(&self, hostname: &str) -> Option<&Frontend> {
        self.frontends.get(hostname)
    }

    pub fn find_frontend_mut(&mut self, hostname: &str) -> Option<&mut Frontend> {
        self.frontends.get_mut(hostname)
    }

    pub fn default_frontend(&self) -> Option<&Frontend> {
        self.find_frontend(DEFAULT_HOST)
    }

    /// Enumerates all frontends, including the default host, sorted by hostname.
    pub fn frontends(&self) -> impl Iterator<Item = &Frontend> {
        self.frontends.values()
    }

    /// Returns the backend for `id`, creating one without endpoints if it does not exist.
    pub fn acquire_backend(&mut self, id: BackendId) -> &mut Backend {
        self.backends
            .entry(id)
            .or_insert_with_key(|id| Backend::new(id.clone()))
    }

    pub fn find_backend(&self, id: &BackendId) -> Option<&Backend> {
        self.backends.get(id)
    }

    pub fn find_backend_mut(&mut self, id: &BackendId) -> Option<&mut Backend> {
        self.backends.get_mut(id)
    }

    /// Enumerates all backends, including the default backend, sorted by identity.
    pub fn backends(&self) -> impl Iterator<Item = &Backend> {
        self.backends.values()
    }

    /// Designates an acquired backend as the one serving requests no frontend path matches.
    pub fn set_default_backend(&mut self, id: BackendId) {
        self.default_backend = Some(id);
    }

    pub fn default_backend(&self) -> Option<&Backend> {
        self.default_backend
            .as_ref()
            .and_then(|id| self.backends.get(id))
    }
}
