use crate::{BackendConfig, FrontendConfig};
use std::fmt;

/// Identifies the resource a decoded annotation record was read from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Source {
    pub namespace: String,
    pub name: String,
    pub kind: SourceKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Ingress,
    Service,
}

/// Frontend-scoped settings decoded from one resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontendAnnotations {
    pub source: Source,
    pub config: FrontendConfig,
}

/// Backend-scoped settings decoded from one resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendAnnotations {
    pub source: Source,
    pub config: BackendConfig,
}

// === impl Source ===

impl Source {
    pub fn ingress(namespace: impl ToString, name: impl ToString) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind: SourceKind::Ingress,
        }
    }

    pub fn service(namespace: impl ToString, name: impl ToString) -> Self {
        Self {
            namespace: namespace.to_string(),
            name: name.to_string(),
            kind: SourceKind::Service,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}/{}'", self.kind, self.namespace, self.name)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingress => "ingress".fmt(f),
            Self::Service => "service".fmt(f),
        }
    }
}

// === impl FrontendAnnotations ===

impl FrontendAnnotations {
    /// Folds a later resource's settings into these, returning the contested annotation keys.
    /// The source of the first writer is kept.
    pub fn merge(&mut self, defaults: &FrontendConfig, incoming: &Self) -> Vec<&'static str> {
        self.config.merge(defaults, &incoming.config)
    }
}

// === impl BackendAnnotations ===

impl BackendAnnotations {
    /// Folds a later resource's settings into these, returning the contested annotation keys.
    /// The source of the first writer is kept.
    pub fn merge(&mut self, defaults: &BackendConfig, incoming: &Self) -> Vec<&'static str> {
        self.config.merge(defaults, &incoming.config)
    }
}
