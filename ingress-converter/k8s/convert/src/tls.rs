use anyhow::{anyhow, Result};
use ingress_converter_k8s_api::Cache;

/// Resolves the certificate file for an ingress' TLS section.
///
/// An empty `secret_name` selects the default secret. A named secret that cannot be read falls
/// back to the default secret; if that fails too, both errors are reported together.
pub(crate) fn resolve_certificate<C>(
    cache: &C,
    default_secret: &str,
    namespace: &str,
    secret_name: &str,
) -> Result<String>
where
    C: Cache + ?Sized,
{
    let secret = if secret_name.is_empty() {
        default_secret.to_string()
    } else {
        format!("{namespace}/{secret_name}")
    };

    let custom_error = match cache.get_tls_secret_path(&secret) {
        Ok(path) => return Ok(path),
        Err(error) if secret == default_secret => return Err(error.into()),
        Err(error) => error,
    };

    match cache.get_tls_secret_path(default_secret) {
        Ok(path) => {
            tracing::warn!(error = %custom_error, %secret, "using default certificate due to an error reading secret");
            Ok(path)
        }
        Err(default_error) => Err(anyhow!(
            "failed to use custom and default certificate. custom: {custom_error}; default: {default_error}"
        )),
    }
}
