use crate::{convert::ConverterOptions, core::Annotations, k8s::ResourceId};
use anyhow::{bail, Result};

/// Conversion settings, meant to be flattened into a controller's own arguments.
#[derive(Clone, Debug, clap::Args)]
pub struct ConverterArgs {
    /// Only annotations named `<prefix>/<key>` configure frontends and backends.
    #[clap(
        long,
        default_value = "ingress.kubernetes.io",
        env = "INGRESS_CONVERTER_ANNOTATION_PREFIX"
    )]
    annotation_prefix: String,

    /// The `namespace/name` of the service handling requests that match no ingress.
    #[clap(long, env = "INGRESS_CONVERTER_DEFAULT_BACKEND_SERVICE")]
    default_backend_service: Option<String>,

    /// The `namespace/name` of the TLS secret used when an ingress does not name a readable one.
    #[clap(long, env = "INGRESS_CONVERTER_DEFAULT_SSL_CERTIFICATE")]
    default_ssl_certificate: Option<String>,

    /// Global configuration as `key=value`. May be repeated.
    #[clap(long = "config", value_parser = parse_config_entry)]
    config: Vec<(String, String)>,
}

// === impl ConverterArgs ===

impl ConverterArgs {
    /// Validates qualified names and splits the arguments into converter options and the global
    /// configuration map.
    pub fn into_parts(self) -> Result<(ConverterOptions, Annotations)> {
        let Self {
            annotation_prefix,
            default_backend_service,
            default_ssl_certificate,
            config,
        } = self;

        if annotation_prefix.is_empty() || annotation_prefix.ends_with('/') {
            bail!("invalid annotation prefix {annotation_prefix:?}");
        }
        if let Some(name) = default_backend_service.as_deref() {
            ResourceId::parse(name)?;
        }
        if let Some(name) = default_ssl_certificate.as_deref() {
            ResourceId::parse(name)?;
        }

        let options = ConverterOptions {
            annotation_prefix,
            default_backend: default_backend_service,
            default_ssl_secret: default_ssl_certificate.unwrap_or_default(),
        };
        Ok((options, config.into_iter().collect()))
    }
}

fn parse_config_entry(s: &str) -> Result<(String, String)> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => bail!("expected key=value, got {s:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestArgs {
        #[clap(flatten)]
        converter: ConverterArgs,
    }

    fn parse(args: &[&str]) -> Result<(ConverterOptions, Annotations)> {
        let args = TestArgs::try_parse_from(std::iter::once("test").chain(args.iter().copied()))?;
        args.converter.into_parts()
    }

    #[test]
    fn defaults() {
        let (options, config) = parse(&[]).unwrap();
        assert_eq!(options.annotation_prefix, "ingress.kubernetes.io");
        assert_eq!(options.default_backend, None);
        assert_eq!(options.default_ssl_secret, "");
        assert!(config.is_empty());
    }

    #[test]
    fn explicit() {
        let (options, config) = parse(&[
            "--annotation-prefix=haproxy.example.com",
            "--default-backend-service=system/default-backend",
            "--default-ssl-certificate=system/default-tls",
            "--config=timeout-client=1m",
            "--config",
            "balance-algorithm=leastconn",
            "--config=syslog-endpoint=",
        ])
        .unwrap();
        assert_eq!(options.annotation_prefix, "haproxy.example.com");
        assert_eq!(
            options.default_backend.as_deref(),
            Some("system/default-backend")
        );
        assert_eq!(options.default_ssl_secret, "system/default-tls");
        assert_eq!(
            config,
            maplit::btreemap! {
                "balance-algorithm".to_string() => "leastconn".to_string(),
                "syslog-endpoint".to_string() => String::new(),
                "timeout-client".to_string() => "1m".to_string(),
            }
        );
    }

    #[test]
    fn rejects_invalid_names() {
        assert!(parse(&["--default-backend-service=default-backend"]).is_err());
        assert!(parse(&["--default-ssl-certificate=/tls"]).is_err());
        assert!(parse(&["--config=novalue"]).is_err());
        assert!(parse(&["--annotation-prefix="]).is_err());
    }
}
