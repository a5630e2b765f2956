/// Controller-wide settings for a conversion pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterOptions {
    /// Only annotations named `<prefix>/<key>` are read, with the prefix stripped.
    pub annotation_prefix: String,

    /// The `namespace/name` of the service that handles requests no frontend path matches.
    pub default_backend: Option<String>,

    /// The `namespace/name` of the secret used when an ingress' TLS section names no secret, or
    /// names one that cannot be read.
    pub default_ssl_secret: String,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            annotation_prefix: "ingress.kubernetes.io".to_string(),
            default_backend: None,
            default_ssl_secret: String::new(),
        }
    }
}
