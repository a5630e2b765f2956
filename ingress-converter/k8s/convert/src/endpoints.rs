use ingress_converter_core::Backend;
use ingress_converter_k8s_api::{Cache, CacheError, Service};
use std::net::IpAddr;

/// Replaces the backend's endpoints with the service's ready addresses on the backend's port.
///
/// Only TCP ports are considered; a port without a protocol is TCP.
pub(crate) fn attach<C>(cache: &C, service: &Service, backend: &mut Backend) -> Result<(), CacheError>
where
    C: Cache + ?Sized,
{
    let endpoints = cache.get_endpoints(service)?;
    backend.clear_endpoints();

    let port = backend.id().port;
    for subset in endpoints.subsets.iter().flatten() {
        let matched = subset.ports.iter().flatten().any(|p| {
            p.port == i32::from(port.get())
                && p.protocol.as_deref().map_or(true, |proto| proto == "TCP")
        });
        if !matched {
            continue;
        }

        for addr in subset.addresses.iter().flatten() {
            let ip = match addr.ip.parse::<IpAddr>() {
                Ok(ip) => ip,
                Err(error) => {
                    tracing::warn!(%error, ip = %addr.ip, backend = %backend.id(), "skipping endpoint address");
                    continue;
                }
            };
            let target = addr
                .target_ref
                .as_ref()
                .map(|r| {
                    format!(
                        "{}/{}",
                        r.namespace.as_deref().unwrap_or_default(),
                        r.name.as_deref().unwrap_or_default()
                    )
                })
                .unwrap_or_default();
            backend.add_endpoint(ip, port, target);
        }
    }

    tracing::debug!(backend = %backend.id(), endpoints = backend.endpoints().len(), "attached endpoints");
    Ok(())
}
