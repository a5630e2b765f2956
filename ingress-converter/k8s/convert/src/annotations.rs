use ingress_converter_core::{
    Annotations, BackendAnnotations, BackendConfig, FrontendAnnotations, FrontendConfig, Source,
};
use std::collections::BTreeMap;

/// Selects the annotations named `<prefix>/<key>`, keyed by `<key>`.
pub(crate) fn read(prefix: &str, annotations: &BTreeMap<String, String>) -> Annotations {
    annotations
        .iter()
        .filter_map(|(name, value)| {
            let key = name.strip_prefix(prefix)?.strip_prefix('/')?;
            Some((key.to_string(), value.clone()))
        })
        .collect()
}

pub(crate) fn decode_frontend(
    defaults: &FrontendConfig,
    source: &Source,
    annotations: &Annotations,
) -> FrontendAnnotations {
    let mut config = defaults.clone();
    for error in config.decode(annotations) {
        tracing::error!(%error, %source, "ignoring frontend annotation");
    }
    FrontendAnnotations {
        source: source.clone(),
        config,
    }
}

pub(crate) fn decode_backend(
    defaults: &BackendConfig,
    source: &Source,
    annotations: &Annotations,
) -> BackendAnnotations {
    let mut config = defaults.clone();
    for error in config.decode(annotations) {
        tracing::error!(%error, %source, "ignoring backend annotation");
    }
    BackendAnnotations {
        source: source.clone(),
        config,
    }
}
