use ingress_converter_core::{
    Backend, BackendAnnotations, BackendId, FrontendAnnotations, Global, GlobalConfig, ProxyConfig,
};
use ingress_converter_k8s_api::{Cache, ResourceId};

/// Applies merged annotation records onto the proxy model.
pub(crate) struct Updater<'a, C: ?Sized> {
    cache: &'a C,
}

// === impl Updater ===

impl<'a, C> Updater<'a, C>
where
    C: Cache + ?Sized,
{
    pub(crate) fn new(cache: &'a C) -> Self {
        Self { cache }
    }

    pub(crate) fn update_global(&self, global: &mut Global, config: &GlobalConfig) {
        global.max_connections = config.global.max_connections;
        global.ssl_dh_default_max_size = config.global.ssl_dh_default_max_size;
        global.syslog_endpoint = config.global.syslog_endpoint.clone();
        global.timeout_stop = config.global.timeout_stop;
    }

    pub(crate) fn update_frontend(
        &self,
        proxy: &mut ProxyConfig,
        hostname: &str,
        ann: &FrontendAnnotations,
    ) {
        let Some(frontend) = proxy.find_frontend_mut(hostname) else {
            return;
        };
        let config = &ann.config;
        frontend.timeout.client = config.timeout_client;
        frontend.timeout.client_fin = config.timeout_client_fin;
        frontend.root_redirect = config.app_root.clone();
        frontend.ssl_redirect = config.ssl_redirect;

        if !config.auth_tls_secret.is_empty() {
            match self.ca_file(&ann.source.namespace, &config.auth_tls_secret) {
                Ok(ca_file) => {
                    frontend.tls.ca_filename = Some(ca_file);
                    frontend.tls.ca_error_page = config.auth_tls_error_page.clone();
                    frontend.tls.add_cert_header = config.auth_tls_cert_header;
                }
                Err(error) => {
                    tracing::error!(%error, source = %ann.source, %hostname, "skipping client certificate authentication");
                }
            }
        }

        if !config.ssl_passthrough {
            return;
        }
        let Some(root) = frontend.find_path("/") else {
            tracing::warn!(source = %ann.source, %hostname, "skipping SSL passthrough: root path was not configured");
            return;
        };
        let root_backend = root.backend.clone();
        for path in frontend.paths().iter().filter(|p| p.path != "/") {
            tracing::warn!(path = %path.path, source = %ann.source, "ignoring path: SSL passthrough only supports the root path");
        }
        frontend.ssl_passthrough = true;

        let http_backend = config.ssl_passthrough_http_port.map(|port| BackendId {
            port,
            ..root_backend.clone()
        });
        let http_backend = http_backend.filter(|id| proxy.find_backend(id).is_some());
        if let Some(frontend) = proxy.find_frontend_mut(hostname) {
            frontend.http_passthrough_backend = http_backend;
        }
        if let Some(backend) = proxy.find_backend_mut(&root_backend) {
            backend.mode_tcp = true;
        }
    }

    pub(crate) fn update_backend(&self, backend: &mut Backend, ann: &BackendAnnotations) {
        let config = &ann.config;
        backend.balance_algorithm = config.balance_algorithm;
        backend.maxconn_server = config.maxconn_server;
        backend.maxqueue_server = config.maxqueue_server;
        backend.secure = config.secure_backends;
        backend.timeout.connect = config.timeout_connect;
        backend.timeout.queue = config.timeout_queue;
        backend.timeout.server = config.timeout_server;
    }

    fn ca_file(&self, namespace: &str, secret: &str) -> anyhow::Result<String> {
        let id = ResourceId::parse_in(namespace, secret)?;
        Ok(self.cache.get_ca_secret_path(&id.to_string())?)
    }
}
