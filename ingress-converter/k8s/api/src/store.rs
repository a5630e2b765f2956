use crate::{Cache, CacheError, Endpoints, Pod, ResourceId, Secret, Service};
use ahash::AHashMap as HashMap;
use std::sync::Arc;

/// An in-memory `Cache` over services, endpoints, pods and secrets.
///
/// A TLS secret is published as a PEM file under the certificate directory once it carries both
/// `tls.crt` and `tls.key`. A secret carrying `ca.crt` is published as a CA file.
#[derive(Debug)]
pub struct Store {
    certificate_dir: String,
    services: HashMap<ResourceId, Arc<Service>>,
    endpoints: HashMap<ResourceId, Arc<Endpoints>>,
    pods: HashMap<ResourceId, Arc<Pod>>,
    secrets: HashMap<ResourceId, Secret>,
}

const TLS_CERT: &str = "tls.crt";
const TLS_KEY: &str = "tls.key";
const CA_CERT: &str = "ca.crt";

// === impl Store ===

impl Store {
    pub fn new(certificate_dir: impl Into<String>) -> Self {
        Self {
            certificate_dir: certificate_dir.into(),
            services: HashMap::default(),
            endpoints: HashMap::default(),
            pods: HashMap::default(),
            secrets: HashMap::default(),
        }
    }

    pub fn apply_service(&mut self, service: Service) {
        self.services
            .insert(ResourceId::of(&service), Arc::new(service));
    }

    pub fn delete_service(&mut self, id: &ResourceId) {
        self.services.remove(id);
    }

    pub fn apply_endpoints(&mut self, endpoints: Endpoints) {
        self.endpoints
            .insert(ResourceId::of(&endpoints), Arc::new(endpoints));
    }

    pub fn delete_endpoints(&mut self, id: &ResourceId) {
        self.endpoints.remove(id);
    }

    pub fn apply_pod(&mut self, pod: Pod) {
        self.pods.insert(ResourceId::of(&pod), Arc::new(pod));
    }

    pub fn delete_pod(&mut self, id: &ResourceId) {
        self.pods.remove(id);
    }

    pub fn apply_secret(&mut self, secret: Secret) {
        self.secrets.insert(ResourceId::of(&secret), secret);
    }

    pub fn delete_secret(&mut self, id: &ResourceId) {
        self.secrets.remove(id);
    }

    fn secret(&self, name: &str) -> Result<(ResourceId, &Secret), CacheError> {
        let id = ResourceId::parse(name).map_err(|_| CacheError::SecretNotFound(name.into()))?;
        match self.secrets.get(&id) {
            Some(secret) => Ok((id, secret)),
            None => Err(CacheError::SecretNotFound(name.to_string())),
        }
    }

    fn has_key(secret: &Secret, key: &str) -> bool {
        secret
            .data
            .as_ref()
            .and_then(|data| data.get(key))
            .is_some_and(|value| !value.0.is_empty())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new("/var/lib/ingress-converter/ssl")
    }
}

impl Cache for Store {
    fn get_service(&self, name: &str) -> Result<Arc<Service>, CacheError> {
        ResourceId::parse(name)
            .ok()
            .and_then(|id| self.services.get(&id))
            .cloned()
            .ok_or_else(|| CacheError::ServiceNotFound(name.to_string()))
    }

    fn get_endpoints(&self, service: &Service) -> Result<Arc<Endpoints>, CacheError> {
        let id = ResourceId::of(service);
        self.endpoints
            .get(&id)
            .cloned()
            .ok_or_else(|| CacheError::EndpointsNotFound(id.to_string()))
    }

    fn get_pod(&self, name: &str) -> Result<Arc<Pod>, CacheError> {
        let id = ResourceId::parse(name).map_err(|_| CacheError::InvalidPodName(name.into()))?;
        self.pods
            .get(&id)
            .cloned()
            .ok_or_else(|| CacheError::PodNotFound(name.to_string()))
    }

    fn get_tls_secret_path(&self, name: &str) -> Result<String, CacheError> {
        let (id, secret) = self.secret(name)?;
        if !Self::has_key(secret, TLS_CERT) || !Self::has_key(secret, TLS_KEY) {
            return Err(CacheError::MissingKeyPair(name.to_string()));
        }
        Ok(format!(
            "{}/{}_{}.pem",
            self.certificate_dir, id.namespace, id.name
        ))
    }

    fn get_ca_secret_path(&self, name: &str) -> Result<String, CacheError> {
        let (id, secret) = self.secret(name)?;
        if !Self::has_key(secret, CA_CERT) {
            return Err(CacheError::MissingCa(name.to_string()));
        }
        Ok(format!(
            "{}/ca/{}_{}.crt",
            self.certificate_dir, id.namespace, id.name
        ))
    }

    fn get_secret_content(&self, name: &str, key: &str) -> Result<Vec<u8>, CacheError> {
        let (_, secret) = self.secret(name)?;
        secret
            .data
            .as_ref()
            .and_then(|data| data.get(key))
            .map(|value| value.0.clone())
            .ok_or_else(|| CacheError::MissingKey {
                secret: name.to_string(),
                key: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ByteString, ObjectMeta, ResourceExt};
    use maplit::btreemap;

    fn mk_secret(ns: &str, name: &str, keys: &[&str]) -> Secret {
        Secret {
            metadata: ObjectMeta {
                namespace: Some(ns.to_string()),
                name: Some(name.to_string()),
                ..Default::default()
            },
            data: Some(
                keys.iter()
                    .map(|k| (k.to_string(), ByteString(b"data".to_vec())))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    fn mk_service(ns: &str, name: &str) -> Service {
        Service {
            metadata: ObjectMeta {
                namespace: Some(ns.to_string()),
                name: Some(name.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn services_and_endpoints() {
        let mut store = Store::default();
        store.apply_service(mk_service("ns", "echo"));

        let svc = store.get_service("ns/echo").expect("service must exist");
        assert_eq!(svc.name_any(), "echo");
        assert_eq!(
            store.get_service("ns/other"),
            Err(CacheError::ServiceNotFound("ns/other".to_string()))
        );
        assert_eq!(
            store.get_service("echo"),
            Err(CacheError::ServiceNotFound("echo".to_string()))
        );

        assert_eq!(
            store.get_endpoints(&svc),
            Err(CacheError::EndpointsNotFound("ns/echo".to_string()))
        );
        store.apply_endpoints(Endpoints {
            metadata: ObjectMeta {
                namespace: Some("ns".to_string()),
                name: Some("echo".to_string()),
                ..Default::default()
            },
            subsets: None,
        });
        assert!(store.get_endpoints(&svc).is_ok());
        store.delete_endpoints(&ResourceId::new("ns", "echo"));
        assert_eq!(
            store.get_endpoints(&svc),
            Err(CacheError::EndpointsNotFound("ns/echo".to_string()))
        );

        store.delete_service(&ResourceId::new("ns", "echo"));
        assert!(store.get_service("ns/echo").is_err());
    }

    #[test]
    fn pods() {
        let mut store = Store::default();
        store.apply_pod(Pod {
            metadata: ObjectMeta {
                namespace: Some("ns".to_string()),
                name: Some("echo-0".to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        assert!(store.get_pod("ns/echo-0").is_ok());
        assert_eq!(
            store.get_pod("echo-0"),
            Err(CacheError::InvalidPodName("echo-0".to_string()))
        );
        assert_eq!(
            store.get_pod("ns/echo-1"),
            Err(CacheError::PodNotFound("ns/echo-1".to_string()))
        );

        store.delete_pod(&ResourceId::new("ns", "echo-0"));
        assert_eq!(
            store.get_pod("ns/echo-0"),
            Err(CacheError::PodNotFound("ns/echo-0".to_string()))
        );
    }

    #[test]
    fn certificate_paths() {
        let mut store = Store::new("/ssl");
        store.apply_secret(mk_secret("ns", "tls", &["tls.crt", "tls.key"]));
        store.apply_secret(mk_secret("ns", "partial", &["tls.crt"]));
        store.apply_secret(mk_secret("ns", "ca", &["ca.crt"]));

        assert_eq!(
            store.get_tls_secret_path("ns/tls"),
            Ok("/ssl/ns_tls.pem".to_string())
        );
        assert_eq!(
            store.get_tls_secret_path("ns/partial"),
            Err(CacheError::MissingKeyPair("ns/partial".to_string()))
        );
        assert_eq!(
            store.get_tls_secret_path("ns/missing"),
            Err(CacheError::SecretNotFound("ns/missing".to_string()))
        );
        assert_eq!(
            store.get_ca_secret_path("ns/ca"),
            Ok("/ssl/ca/ns_ca.crt".to_string())
        );
        assert_eq!(
            store.get_ca_secret_path("ns/tls"),
            Err(CacheError::MissingCa("ns/tls".to_string()))
        );

        store.delete_secret(&ResourceId::new("ns", "tls"));
        assert_eq!(
            store.get_tls_secret_path("ns/tls"),
            Err(CacheError::SecretNotFound("ns/tls".to_string()))
        );
    }

    #[test]
    fn secret_content() {
        let mut store = Store::default();
        store.apply_secret(Secret {
            metadata: ObjectMeta {
                namespace: Some("ns".to_string()),
                name: Some("auth".to_string()),
                ..Default::default()
            },
            data: Some(btreemap! {
                "auth".to_string() => ByteString(b"user:pass".to_vec()),
            }),
            ..Default::default()
        });
        assert_eq!(
            store.get_secret_content("ns/auth", "auth"),
            Ok(b"user:pass".to_vec())
        );
        assert_eq!(
            store.get_secret_content("ns/auth", "other"),
            Err(CacheError::MissingKey {
                secret: "ns/auth".to_string(),
                key: "other".to_string(),
            })
        );
    }
}
