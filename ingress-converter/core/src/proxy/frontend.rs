use super::BackendId;
use crate::Timeout;

/// The hostname of the frontend that serves requests matching no other host.
pub const DEFAULT_HOST: &str = "*";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frontend {
    hostname: String,
    paths: Vec<FrontendPath>,
    pub tls: FrontendTls,
    pub root_redirect: String,
    pub ssl_redirect: bool,
    pub ssl_passthrough: bool,
    pub http_passthrough_backend: Option<BackendId>,
    pub timeout: FrontendTimeout,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontendPath {
    pub path: String,
    pub backend: BackendId,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontendTls {
    pub tls_filename: Option<String>,
    pub ca_filename: Option<String>,
    pub ca_error_page: String,
    pub add_cert_header: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrontendTimeout {
    pub client: Option<Timeout>,
    pub client_fin: Option<Timeout>,
}

// === impl Frontend ===

impl Frontend {
    pub(super) fn new(hostname: &str) -> Self {
        Self {
            hostname: hostname.to_string(),
            paths: Vec::new(),
            tls: FrontendTls::default(),
            root_redirect: String::new(),
            ssl_redirect: false,
            ssl_passthrough: false,
            http_passthrough_backend: None,
            timeout: FrontendTimeout::default(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    /// Paths in reverse lexical order, so a more specific prefix precedes the shorter prefixes
    /// it extends and `/` comes last.
    pub fn paths(&self) -> &[FrontendPath] {
        &self.paths
    }

    pub fn find_path(&self, path: &str) -> Option<&FrontendPath> {
        self.paths.iter().find(|p| p.path == path)
    }

    /// Registers `path`, returning false without changes if it is already registered.
    pub fn add_path(&mut self, path: impl Into<String>, backend: BackendId) -> bool {
        let path = path.into();
        match self
            .paths
            .binary_search_by(|p| path.as_str().cmp(p.path.as_str()))
        {
            Ok(_) => false,
            Err(idx) => {
                self.paths.insert(idx, FrontendPath { path, backend });
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::num::NonZeroU16;

    fn backend(name: &str) -> BackendId {
        BackendId::new("ns", name, NonZeroU16::new(8080).unwrap())
    }

    #[test]
    fn paths_sorted_root_last() {
        let mut frontend = Frontend::new("example.com");
        assert!(frontend.add_path("/", backend("root")));
        assert!(frontend.add_path("/api", backend("api")));
        assert!(frontend.add_path("/api/v1", backend("v1")));
        assert!(frontend.add_path("/app", backend("app")));
        assert_eq!(
            frontend
                .paths()
                .iter()
                .map(|p| p.path.as_str())
                .collect::<Vec<_>>(),
            vec!["/app", "/api/v1", "/api", "/"]
        );
    }

    #[test]
    fn redeclared_path_keeps_first() {
        let mut frontend = Frontend::new("example.com");
        assert!(frontend.add_path("/", backend("first")));
        assert!(!frontend.add_path("/", backend("second")));
        assert_eq!(frontend.paths().len(), 1);
        assert_eq!(frontend.find_path("/").unwrap().backend, backend("first"));
    }
}
