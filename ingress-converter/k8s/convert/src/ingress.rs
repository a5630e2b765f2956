use crate::{
    annotations, endpoints,
    metrics::{ConverterMetrics, Scope, SkipReason},
    tls,
    updater::Updater,
    ConverterOptions,
};
use ahash::AHashMap as HashMap;
use anyhow::{anyhow, bail, Result};
use ingress_converter_core::{
    proxy::DEFAULT_HOST, Annotations, BackendAnnotations, BackendId, FrontendAnnotations,
    GlobalConfig, ProxyConfig, Source,
};
use ingress_converter_k8s_api::{
    Cache, IngressBackend, Ingress, IntOrString, ResourceExt, ResourceId, Service,
};
use std::{num::NonZeroU16, sync::Arc};

/// Converts one generation of ingresses into the proxy model.
///
/// A converter holds the proxy model and the cache for the duration of a single pass. It is
/// consumed by [`IngressConverter::sync`]. Creating a converter clears the model's topology, so
/// the frontends and backends left by an earlier pass never leak into the next one.
pub struct IngressConverter<'a, C: ?Sized> {
    options: Arc<ConverterOptions>,
    proxy: &'a mut ProxyConfig,
    cache: &'a C,
    global: GlobalConfig,
    metrics: ConverterMetrics,
    frontend_annotations: HashMap<String, FrontendAnnotations>,
    backend_annotations: HashMap<BackendId, BackendAnnotations>,
}

/// How an ingress names the port of its backend service.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ServicePortRef {
    Number(NonZeroU16),
    Name(String),
    First,
}

// === impl IngressConverter ===

impl<'a, C> IngressConverter<'a, C>
where
    C: Cache + ?Sized,
{
    /// Decodes the global configuration map, clears the model's topology and installs the
    /// default backend.
    ///
    /// A default backend that cannot be read is logged; the converter is still usable. The
    /// default backend keeps its model defaults unless an ingress also references it.
    pub fn new(
        options: Arc<ConverterOptions>,
        proxy: &'a mut ProxyConfig,
        cache: &'a C,
        config: &Annotations,
    ) -> Self {
        proxy.clear_topology();
        let (global, errors) = GlobalConfig::decode(config);
        for error in errors {
            tracing::error!(%error, "ignoring global configuration");
        }

        let mut converter = Self {
            options,
            proxy,
            cache,
            global,
            metrics: ConverterMetrics::default(),
            frontend_annotations: HashMap::default(),
            backend_annotations: HashMap::default(),
        };

        if let Some(name) = converter.options.default_backend.clone() {
            let backend = ResourceId::parse(&name)
                .map_err(anyhow::Error::from)
                .and_then(|svc| converter.add_backend(&svc, &ServicePortRef::First, None));
            match backend {
                Ok(id) => {
                    converter.backend_annotations.remove(&id);
                    converter.proxy.set_default_backend(id);
                }
                Err(error) => {
                    tracing::error!(%error, service = %name, "error reading default service")
                }
            }
        }

        converter
    }

    pub fn with_metrics(mut self, metrics: ConverterMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Runs a full conversion pass: every ingress in list order, then the accumulated annotations.
    pub fn sync(mut self, ingresses: &[Ingress]) {
        for ingress in ingresses {
            self.sync_ingress(ingress);
        }
        self.sync_annotations();
        self.metrics
            .set_size(self.proxy.frontends().count(), self.proxy.backends().count());
    }

    fn sync_ingress(&mut self, ingress: &Ingress) {
        let id = ResourceId::of(ingress);
        let source = Source::ingress(&id.namespace, &id.name);
        let annotations = annotations::read(&self.options.annotation_prefix, ingress.annotations());
        let frontend_ann =
            annotations::decode_frontend(&self.global.defaults.frontend, &source, &annotations);
        let backend_ann =
            annotations::decode_backend(&self.global.defaults.backend, &source, &annotations);

        let Some(spec) = ingress.spec.as_ref() else {
            return;
        };

        if let Some(backend) = spec.default_backend.as_ref() {
            if let Err(error) =
                self.add_default_host_backend(&id.namespace, backend, &frontend_ann, &backend_ann)
            {
                tracing::warn!(%error, ingress = %id, "skipping default backend of ingress");
                self.metrics.inc_skipped(SkipReason::DefaultBackend);
            }
        }

        for rule in spec.rules.iter().flatten() {
            let Some(http) = rule.http.as_ref() else {
                continue;
            };
            let hostname = match rule.host.as_deref() {
                Some(host) if !host.is_empty() => host,
                _ => DEFAULT_HOST,
            };
            self.add_frontend(hostname, &frontend_ann);

            for path in &http.paths {
                let uri = match path.path.as_deref() {
                    Some(uri) if !uri.is_empty() => uri,
                    _ => "/",
                };
                if self
                    .proxy
                    .find_frontend(hostname)
                    .and_then(|f| f.find_path(uri))
                    .is_some()
                {
                    tracing::warn!(path = %uri, ingress = %id, "skipping redeclared path");
                    self.metrics.inc_skipped(SkipReason::RedeclaredPath);
                    continue;
                }

                let backend = service_ref(&id.namespace, &path.backend).and_then(|(svc, port)| {
                    let backend = self.add_backend(&svc, &port, Some(&backend_ann))?;
                    Ok((svc, backend))
                });
                let (svc, backend) = match backend {
                    Ok(backend) => backend,
                    Err(error) => {
                        tracing::warn!(%error, ingress = %id, "skipping backend config of ingress");
                        self.metrics.inc_skipped(SkipReason::Backend);
                        continue;
                    }
                };
                self.proxy.acquire_frontend(hostname).add_path(uri, backend);
                self.add_http_passthrough(&svc, &frontend_ann, &backend_ann);
            }

            for tls in spec.tls.iter().flatten() {
                let covers_host = tls.hosts.iter().flatten().any(|h| h == hostname);
                if covers_host {
                    let secret_name = tls.secret_name.as_deref().unwrap_or_default();
                    self.add_frontend_tls(hostname, &id, secret_name);
                }
            }
        }
    }

    fn add_default_host_backend(
        &mut self,
        namespace: &str,
        backend: &IngressBackend,
        frontend_ann: &FrontendAnnotations,
        backend_ann: &BackendAnnotations,
    ) -> Result<()> {
        let root_taken = self
            .proxy
            .default_frontend()
            .and_then(|f| f.find_path("/"))
            .is_some();
        if root_taken {
            bail!("path / was already defined on default host");
        }

        let (svc, port) = service_ref(namespace, backend)?;
        let backend = self.add_backend(&svc, &port, Some(backend_ann))?;
        self.add_frontend(DEFAULT_HOST, frontend_ann);
        self.proxy.acquire_default_frontend().add_path("/", backend);
        Ok(())
    }

    /// Acquires the frontend and folds the ingress' frontend annotations into its pending record.
    fn add_frontend(&mut self, hostname: &str, ann: &FrontendAnnotations) {
        self.proxy.acquire_frontend(hostname);
        match self.frontend_annotations.get_mut(hostname) {
            Some(pending) => {
                let skipped = pending.merge(&self.global.defaults.frontend, ann);
                if !skipped.is_empty() {
                    tracing::info!(source = %ann.source, ?skipped, "skipping frontend annotation(s) due to conflict");
                    self.metrics.inc_conflicts(Scope::Frontend, skipped.len());
                }
            }
            None => {
                self.frontend_annotations
                    .insert(hostname.to_string(), ann.clone());
            }
        }
    }

    /// Acquires the backend for a service port.
    ///
    /// The first acquisition in a pass attaches the service's endpoints and seeds the backend's
    /// pending annotations from the service's own annotations. The ingress' backend annotations
    /// are folded in afterwards.
    fn add_backend(
        &mut self,
        svc: &ResourceId,
        port: &ServicePortRef,
        ann: Option<&BackendAnnotations>,
    ) -> Result<BackendId> {
        let service = self.cache.get_service(&svc.to_string())?;
        let port = resolve_port(&service, svc, port)?;
        let id = BackendId::new(&svc.namespace, &svc.name, port);
        let backend = self.proxy.acquire_backend(id.clone());

        if !self.backend_annotations.contains_key(&id) {
            if let Err(error) = endpoints::attach(self.cache, &service, backend) {
                tracing::error!(%error, service = %svc, "error adding endpoints of service");
            }
            let source = Source::service(&svc.namespace, &svc.name);
            let service_ann = annotations::read(&self.options.annotation_prefix, service.annotations());
            let pending =
                annotations::decode_backend(&self.global.defaults.backend, &source, &service_ann);
            self.backend_annotations.insert(id.clone(), pending);
        }

        if let Some(ann) = ann {
            if let Some(pending) = self.backend_annotations.get_mut(&id) {
                let skipped = pending.merge(&self.global.defaults.backend, ann);
                if !skipped.is_empty() {
                    tracing::info!(backend = %id, source = %ann.source, ?skipped, "skipping backend annotation(s) due to conflict");
                    self.metrics.inc_conflicts(Scope::Backend, skipped.len());
                }
            }
        }

        Ok(id)
    }

    /// Acquires the plain HTTP backend of an SSL passthrough service so it can be attached to the
    /// frontend once annotations are applied.
    fn add_http_passthrough(
        &mut self,
        svc: &ResourceId,
        frontend_ann: &FrontendAnnotations,
        backend_ann: &BackendAnnotations,
    ) {
        if !frontend_ann.config.ssl_passthrough {
            return;
        }
        let Some(port) = frontend_ann.config.ssl_passthrough_http_port else {
            return;
        };
        if let Err(error) = self.add_backend(svc, &ServicePortRef::Number(port), Some(backend_ann)) {
            tracing::warn!(%error, service = %svc, %port, "skipping HTTP passthrough backend");
            self.metrics.inc_skipped(SkipReason::Backend);
        }
    }

    fn add_frontend_tls(&mut self, hostname: &str, ingress: &ResourceId, secret_name: &str) {
        let resolved = tls::resolve_certificate(
            self.cache,
            &self.options.default_ssl_secret,
            &ingress.namespace,
            secret_name,
        )
        .and_then(|path| {
            let frontend = self.proxy.acquire_frontend(hostname);
            match frontend.tls.tls_filename.as_deref() {
                None => {
                    frontend.tls.tls_filename = Some(path);
                    Ok(())
                }
                Some(assigned) if assigned == path => Ok(()),
                Some(_) => Err(anyhow!("TLS of host '{hostname}' was already assigned")),
            }
        });

        if let Err(error) = resolved {
            if secret_name.is_empty() {
                tracing::warn!(%error, %ingress, "skipping default TLS secret of ingress");
            } else {
                tracing::warn!(%error, secret = %secret_name, %ingress, "skipping TLS secret of ingress");
            }
            self.metrics.inc_skipped(SkipReason::Tls);
        }
    }

    fn sync_annotations(&mut self) {
        let updater = Updater::new(self.cache);
        updater.update_global(self.proxy.global_mut(), &self.global);

        let hostnames = self
            .proxy
            .frontends()
            .map(|f| f.hostname().to_string())
            .collect::<Vec<_>>();
        for hostname in hostnames {
            if let Some(ann) = self.frontend_annotations.get(&hostname) {
                updater.update_frontend(self.proxy, &hostname, ann);
            }
        }

        let ids = self
            .proxy
            .backends()
            .map(|b| b.id().clone())
            .collect::<Vec<_>>();
        for id in ids {
            if let (Some(ann), Some(backend)) = (
                self.backend_annotations.get(&id),
                self.proxy.find_backend_mut(&id),
            ) {
                updater.update_backend(backend, ann);
            }
        }
    }
}

/// Reads the service and port an ingress backend references.
fn service_ref(namespace: &str, backend: &IngressBackend) -> Result<(ResourceId, ServicePortRef)> {
    let Some(service) = backend.service.as_ref() else {
        bail!("backend does not reference a service");
    };
    let port = match service.port.as_ref() {
        Some(port) => match (port.number, port.name.as_deref()) {
            (Some(n), _) if n > 0 => ServicePortRef::Number(port_number(n)?),
            (_, Some(name)) if !name.is_empty() => ServicePortRef::Name(name.to_string()),
            _ => ServicePortRef::First,
        },
        None => ServicePortRef::First,
    };
    Ok((ResourceId::new(namespace, &service.name), port))
}

/// Resolves the backend port. A numbered port is used as-is; a named or omitted port resolves to
/// the target port of the matching service port, or its service port when the target is named.
fn resolve_port(service: &Service, svc: &ResourceId, port: &ServicePortRef) -> Result<NonZeroU16> {
    let ports = service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_deref())
        .unwrap_or_default();
    let svc_port = match port {
        ServicePortRef::Number(n) => return Ok(*n),
        ServicePortRef::Name(name) => ports
            .iter()
            .find(|p| p.name.as_deref() == Some(name.as_str()))
            .ok_or_else(|| anyhow!("service '{svc}' has no port named '{name}'"))?,
        ServicePortRef::First => ports
            .first()
            .ok_or_else(|| anyhow!("service '{svc}' does not declare any port"))?,
    };
    match svc_port.target_port.as_ref() {
        Some(IntOrString::Int(target)) if *target > 0 => port_number(*target),
        _ => port_number(svc_port.port),
    }
}

fn port_number(port: i32) -> Result<NonZeroU16> {
    u16::try_from(port)
        .ok()
        .and_then(NonZeroU16::new)
        .ok_or_else(|| anyhow!("invalid port number {port}"))
}
