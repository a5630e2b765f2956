//! Typed configuration records decoded from string-keyed annotations.
//!
//! Every record enumerates its fields twice: once in `decode`, which overlays annotation values
//! onto a record that already holds the defaults, and once in `merge`, which folds one decoded
//! record into another. Merging is first-writer-wins: a field is only written when the
//! accumulated record still holds the default value, and a field where two records disagree
//! (both differing from the default) is reported by its annotation key and left untouched.

use crate::{BalanceAlgorithm, Timeout};
use std::{collections::BTreeMap, fmt, num::NonZeroU16, str::FromStr};

/// Annotation keys mapped to their raw values, with any prefix already stripped.
pub type Annotations = BTreeMap<String, String>;

/// Settings scoped to a single frontend (virtual host).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrontendConfig {
    pub app_root: String,
    pub auth_tls_cert_header: bool,
    pub auth_tls_error_page: String,
    pub auth_tls_secret: String,
    pub ssl_passthrough: bool,
    pub ssl_passthrough_http_port: Option<NonZeroU16>,
    pub ssl_redirect: bool,
    pub timeout_client: Option<Timeout>,
    pub timeout_client_fin: Option<Timeout>,
}

/// Settings scoped to a single backend (service port).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendConfig {
    pub balance_algorithm: BalanceAlgorithm,
    pub maxconn_server: u32,
    pub maxqueue_server: u32,
    pub secure_backends: bool,
    pub timeout_connect: Option<Timeout>,
    pub timeout_queue: Option<Timeout>,
    pub timeout_server: Option<Timeout>,
}

/// Process-wide proxy settings. These are only read from the global configuration map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalSettings {
    pub max_connections: u32,
    pub ssl_dh_default_max_size: u32,
    pub syslog_endpoint: String,
    pub timeout_stop: Option<Timeout>,
}

/// The values every frontend and backend record starts from, and against which conflicts are
/// judged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigDefaults {
    pub frontend: FrontendConfig,
    pub backend: BackendConfig,
}

/// The controller-wide configuration: built-in defaults overlaid with the global configuration
/// map.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    pub defaults: ConfigDefaults,
    pub global: GlobalSettings,
}

/// An annotation value that could not be decoded onto its field. The field keeps its previous
/// value.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid value {value:?} for {key}: {reason}")]
pub struct DecodeError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

struct Decoder<'a> {
    annotations: &'a Annotations,
    errors: Vec<DecodeError>,
}

#[derive(Default)]
struct Merger {
    skipped: Vec<&'static str>,
}

// === impl FrontendConfig ===

impl FrontendConfig {
    pub const APP_ROOT: &'static str = "app-root";
    pub const AUTH_TLS_CERT_HEADER: &'static str = "auth-tls-cert-header";
    pub const AUTH_TLS_ERROR_PAGE: &'static str = "auth-tls-error-page";
    pub const AUTH_TLS_SECRET: &'static str = "auth-tls-secret";
    pub const SSL_PASSTHROUGH: &'static str = "ssl-passthrough";
    pub const SSL_PASSTHROUGH_HTTP_PORT: &'static str = "ssl-passthrough-http-port";
    pub const SSL_REDIRECT: &'static str = "ssl-redirect";
    pub const TIMEOUT_CLIENT: &'static str = "timeout-client";
    pub const TIMEOUT_CLIENT_FIN: &'static str = "timeout-client-fin";

    /// Overlays `annotations` onto this record. Unknown keys are ignored.
    pub fn decode(&mut self, annotations: &Annotations) -> Vec<DecodeError> {
        let mut d = Decoder::new(annotations);
        d.field(Self::APP_ROOT, &mut self.app_root);
        d.field(Self::AUTH_TLS_CERT_HEADER, &mut self.auth_tls_cert_header);
        d.field(Self::AUTH_TLS_ERROR_PAGE, &mut self.auth_tls_error_page);
        d.field(Self::AUTH_TLS_SECRET, &mut self.auth_tls_secret);
        d.field(Self::SSL_PASSTHROUGH, &mut self.ssl_passthrough);
        d.port(
            Self::SSL_PASSTHROUGH_HTTP_PORT,
            &mut self.ssl_passthrough_http_port,
        );
        d.field(Self::SSL_REDIRECT, &mut self.ssl_redirect);
        d.optional(Self::TIMEOUT_CLIENT, &mut self.timeout_client);
        d.optional(Self::TIMEOUT_CLIENT_FIN, &mut self.timeout_client_fin);
        d.errors
    }

    /// Folds `incoming` into this record, returning the keys of contested fields.
    pub fn merge(&mut self, defaults: &Self, incoming: &Self) -> Vec<&'static str> {
        let mut m = Merger::default();
        m.field(
            Self::APP_ROOT,
            &defaults.app_root,
            &incoming.app_root,
            &mut self.app_root,
        );
        m.field(
            Self::AUTH_TLS_CERT_HEADER,
            &defaults.auth_tls_cert_header,
            &incoming.auth_tls_cert_header,
            &mut self.auth_tls_cert_header,
        );
        m.field(
            Self::AUTH_TLS_ERROR_PAGE,
            &defaults.auth_tls_error_page,
            &incoming.auth_tls_error_page,
            &mut self.auth_tls_error_page,
        );
        m.field(
            Self::AUTH_TLS_SECRET,
            &defaults.auth_tls_secret,
            &incoming.auth_tls_secret,
            &mut self.auth_tls_secret,
        );
        m.field(
            Self::SSL_PASSTHROUGH,
            &defaults.ssl_passthrough,
            &incoming.ssl_passthrough,
            &mut self.ssl_passthrough,
        );
        m.field(
            Self::SSL_PASSTHROUGH_HTTP_PORT,
            &defaults.ssl_passthrough_http_port,
            &incoming.ssl_passthrough_http_port,
            &mut self.ssl_passthrough_http_port,
        );
        m.field(
            Self::SSL_REDIRECT,
            &defaults.ssl_redirect,
            &incoming.ssl_redirect,
            &mut self.ssl_redirect,
        );
        m.field(
            Self::TIMEOUT_CLIENT,
            &defaults.timeout_client,
            &incoming.timeout_client,
            &mut self.timeout_client,
        );
        m.field(
            Self::TIMEOUT_CLIENT_FIN,
            &defaults.timeout_client_fin,
            &incoming.timeout_client_fin,
            &mut self.timeout_client_fin,
        );
        m.skipped
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            app_root: String::new(),
            auth_tls_cert_header: false,
            auth_tls_error_page: String::new(),
            auth_tls_secret: String::new(),
            ssl_passthrough: false,
            ssl_passthrough_http_port: None,
            ssl_redirect: true,
            timeout_client: Some(Timeout::from_secs(50)),
            timeout_client_fin: Some(Timeout::from_secs(50)),
        }
    }
}

// === impl BackendConfig ===

impl BackendConfig {
    pub const BALANCE_ALGORITHM: &'static str = "balance-algorithm";
    pub const MAXCONN_SERVER: &'static str = "maxconn-server";
    pub const MAXQUEUE_SERVER: &'static str = "maxqueue-server";
    pub const SECURE_BACKENDS: &'static str = "secure-backends";
    pub const TIMEOUT_CONNECT: &'static str = "timeout-connect";
    pub const TIMEOUT_QUEUE: &'static str = "timeout-queue";
    pub const TIMEOUT_SERVER: &'static str = "timeout-server";

    /// Overlays `annotations` onto this record. Unknown keys are ignored.
    pub fn decode(&mut self, annotations: &Annotations) -> Vec<DecodeError> {
        let mut d = Decoder::new(annotations);
        d.field(Self::BALANCE_ALGORITHM, &mut self.balance_algorithm);
        d.field(Self::MAXCONN_SERVER, &mut self.maxconn_server);
        d.field(Self::MAXQUEUE_SERVER, &mut self.maxqueue_server);
        d.field(Self::SECURE_BACKENDS, &mut self.secure_backends);
        d.optional(Self::TIMEOUT_CONNECT, &mut self.timeout_connect);
        d.optional(Self::TIMEOUT_QUEUE, &mut self.timeout_queue);
        d.optional(Self::TIMEOUT_SERVER, &mut self.timeout_server);
        d.errors
    }

    /// Folds `incoming` into this record, returning the keys of contested fields.
    pub fn merge(&mut self, defaults: &Self, incoming: &Self) -> Vec<&'static str> {
        let mut m = Merger::default();
        m.field(
            Self::BALANCE_ALGORITHM,
            &defaults.balance_algorithm,
            &incoming.balance_algorithm,
            &mut self.balance_algorithm,
        );
        m.field(
            Self::MAXCONN_SERVER,
            &defaults.maxconn_server,
            &incoming.maxconn_server,
            &mut self.maxconn_server,
        );
        m.field(
            Self::MAXQUEUE_SERVER,
            &defaults.maxqueue_server,
            &incoming.maxqueue_server,
            &mut self.maxqueue_server,
        );
        m.field(
            Self::SECURE_BACKENDS,
            &defaults.secure_backends,
            &incoming.secure_backends,
            &mut self.secure_backends,
        );
        m.field(
            Self::TIMEOUT_CONNECT,
            &defaults.timeout_connect,
            &incoming.timeout_connect,
            &mut self.timeout_connect,
        );
        m.field(
            Self::TIMEOUT_QUEUE,
            &defaults.timeout_queue,
            &incoming.timeout_queue,
            &mut self.timeout_queue,
        );
        m.field(
            Self::TIMEOUT_SERVER,
            &defaults.timeout_server,
            &incoming.timeout_server,
            &mut self.timeout_server,
        );
        m.skipped
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            balance_algorithm: BalanceAlgorithm::RoundRobin,
            maxconn_server: 0,
            maxqueue_server: 0,
            secure_backends: false,
            timeout_connect: Some(Timeout::from_secs(5)),
            timeout_queue: Some(Timeout::from_secs(5)),
            timeout_server: Some(Timeout::from_secs(50)),
        }
    }
}

// === impl GlobalSettings ===

impl GlobalSettings {
    pub const MAX_CONNECTIONS: &'static str = "max-connections";
    pub const SSL_DH_DEFAULT_MAX_SIZE: &'static str = "ssl-dh-default-max-size";
    pub const SYSLOG_ENDPOINT: &'static str = "syslog-endpoint";
    pub const TIMEOUT_STOP: &'static str = "timeout-stop";

    pub fn decode(&mut self, annotations: &Annotations) -> Vec<DecodeError> {
        let mut d = Decoder::new(annotations);
        d.field(Self::MAX_CONNECTIONS, &mut self.max_connections);
        d.field(
            Self::SSL_DH_DEFAULT_MAX_SIZE,
            &mut self.ssl_dh_default_max_size,
        );
        d.field(Self::SYSLOG_ENDPOINT, &mut self.syslog_endpoint);
        d.optional(Self::TIMEOUT_STOP, &mut self.timeout_stop);
        d.errors
    }
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            max_connections: 2000,
            ssl_dh_default_max_size: 1024,
            syslog_endpoint: String::new(),
            timeout_stop: None,
        }
    }
}

// === impl GlobalConfig ===

impl GlobalConfig {
    /// Builds the controller-wide configuration from the built-in defaults and the global
    /// configuration map. Frontend and backend keys found in the map become the defaults of every
    /// record decoded from annotations.
    pub fn decode(config: &Annotations) -> (Self, Vec<DecodeError>) {
        let mut global = Self::default();
        let mut errors = global.defaults.frontend.decode(config);
        errors.extend(global.defaults.backend.decode(config));
        errors.extend(global.global.decode(config));
        (global, errors)
    }
}

// === impl Decoder ===

impl<'a> Decoder<'a> {
    fn new(annotations: &'a Annotations) -> Self {
        Self {
            annotations,
            errors: Vec::new(),
        }
    }

    fn field<T>(&mut self, key: &'static str, field: &mut T)
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        if let Some(value) = self.annotations.get(key) {
            match value.trim().parse() {
                Ok(v) => *field = v,
                Err(error) => self.invalid(key, value, error),
            }
        }
    }

    /// Decodes a field that is unset by default. An empty value clears it.
    fn optional<T>(&mut self, key: &'static str, field: &mut Option<T>)
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        if let Some(value) = self.annotations.get(key) {
            let value_trimmed = value.trim();
            if value_trimmed.is_empty() {
                *field = None;
                return;
            }
            match value_trimmed.parse() {
                Ok(v) => *field = Some(v),
                Err(error) => self.invalid(key, value, error),
            }
        }
    }

    /// Decodes an optional port number. Zero and the empty value both leave the port unset.
    fn port(&mut self, key: &'static str, field: &mut Option<NonZeroU16>) {
        if let Some(value) = self.annotations.get(key) {
            let value_trimmed = value.trim();
            if value_trimmed.is_empty() {
                *field = None;
                return;
            }
            match value_trimmed.parse::<u16>() {
                Ok(port) => *field = NonZeroU16::new(port),
                Err(error) => self.invalid(key, value, error),
            }
        }
    }

    fn invalid(&mut self, key: &'static str, value: &str, error: impl fmt::Display) {
        self.errors.push(DecodeError {
            key,
            value: value.to_string(),
            reason: error.to_string(),
        });
    }
}

// === impl Merger ===

impl Merger {
    fn field<T>(&mut self, key: &'static str, default: &T, incoming: &T, accumulated: &mut T)
    where
        T: Clone + PartialEq,
    {
        if incoming == default {
            return;
        }
        if *accumulated == *default {
            *accumulated = incoming.clone();
        } else if accumulated != incoming {
            self.skipped.push(key);
        }
    }
}
