//! Ingress conversion
//!
//! Translates the cluster's `Ingress` resources into the proxy model. A conversion pass runs in
//! two phases:
//!
//! 1. Every ingress is visited in list order. Its rules acquire frontends (one per hostname) and
//!    backends (one per service port), register paths, and assign TLS certificates. The first
//!    ingress to claim a path or a certificate keeps it. Annotations are decoded but not applied;
//!    they accumulate per frontend and per backend.
//! 2. Once every ingress has been visited, the accumulated annotations are applied onto the
//!    frontends and backends they target.
//!
//! The first ingress to acquire a backend in a pass also populates its endpoints and seeds its
//! annotations from the service's own annotations, which therefore take precedence over every
//! ingress.

#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

mod annotations;
mod endpoints;
mod ingress;
mod metrics;
mod options;
mod tls;
mod updater;


pub use self::{
    ingress::IngressConverter,
    metrics::{ConverterMetrics, Scope, SkipReason},
    options::ConverterOptions,
};
