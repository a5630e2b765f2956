//! Ingress converter core
//!
//! The proxy model that the conversion engine writes into, and the typed configuration records
//! that per-resource annotations decode onto:
//!
//! - A `Frontend` is a virtual host. It maps paths to backends and carries TLS, redirect and
//!   timeout settings. The frontend named `*` is the default host.
//! - A `Backend` is a service port. It holds the endpoints that traffic is balanced over.
//! - `FrontendConfig` and `BackendConfig` are decoded from annotations and merged across every
//!   resource that targets the same frontend or backend. The first resource to set a field wins;
//!   later disagreeing values are reported as conflicts.
//!
//! ```text
//! [ Ingress ] -> [ Frontend ] -> [ path ] -> [ Backend ] -> [ Endpoint ]
//! ```

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod annotations;
mod balance;
pub mod config;
mod duration;
pub mod proxy;

pub use self::{
    annotations::{BackendAnnotations, FrontendAnnotations, Source, SourceKind},
    balance::{BalanceAlgorithm, InvalidBalanceAlgorithm},
    config::{
        Annotations, BackendConfig, ConfigDefaults, DecodeError, FrontendConfig, GlobalConfig,
        GlobalSettings,
    },
    duration::{ParseError, Timeout},
    proxy::{Backend, BackendId, Endpoint, Frontend, FrontendPath, Global, ProxyConfig},
};
