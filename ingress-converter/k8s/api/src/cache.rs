use crate::{Endpoints, Pod, Service};
use std::sync::Arc;

/// Read access to the cluster state a conversion pass depends on.
///
/// Every name is qualified as `namespace/name`. Implementations are expected to answer from local
/// stores without blocking.
pub trait Cache {
    fn get_service(&self, name: &str) -> Result<Arc<Service>, CacheError>;

    fn get_endpoints(&self, service: &Service) -> Result<Arc<Endpoints>, CacheError>;

    fn get_pod(&self, name: &str) -> Result<Arc<Pod>, CacheError>;

    /// Returns the path of the PEM file holding the secret's certificate and key.
    fn get_tls_secret_path(&self, secret: &str) -> Result<String, CacheError>;

    /// Returns the path of the file holding the secret's CA bundle.
    fn get_ca_secret_path(&self, secret: &str) -> Result<String, CacheError>;

    fn get_secret_content(&self, secret: &str, key: &str) -> Result<Vec<u8>, CacheError>;
}

#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("service not found: '{0}'")]
    ServiceNotFound(String),

    #[error("could not find endpoints for service '{0}'")]
    EndpointsNotFound(String),

    #[error("invalid pod name: '{0}'")]
    InvalidPodName(String),

    #[error("pod not found: '{0}'")]
    PodNotFound(String),

    #[error("secret not found: '{0}'")]
    SecretNotFound(String),

    #[error("secret '{0}' does not have tls/key pair")]
    MissingKeyPair(String),

    #[error("secret '{0}' does not have ca.crt key")]
    MissingCa(String),

    #[error("secret '{secret}' does not have key '{key}'")]
    MissingKey { secret: String, key: String },
}

impl<C: Cache + ?Sized> Cache for Arc<C> {
    fn get_service(&self, name: &str) -> Result<Arc<Service>, CacheError> {
        (**self).get_service(name)
    }

    fn get_endpoints(&self, service: &Service) -> Result<Arc<Endpoints>, CacheError> {
        (**self).get_endpoints(service)
    }

    fn get_pod(&self, name: &str) -> Result<Arc<Pod>, CacheError> {
        (**self).get_pod(name)
    }

    fn get_tls_secret_path(&self, secret: &str) -> Result<String, CacheError> {
        (**self).get_tls_secret_path(secret)
    }

    fn get_ca_secret_path(&self, secret: &str) -> Result<String, CacheError> {
        (**self).get_ca_secret_path(secret)
    }

    fn get_secret_content(&self, secret: &str, key: &str) -> Result<Vec<u8>, CacheError> {
        (**self).get_secret_content(secret, key)
    }
}
