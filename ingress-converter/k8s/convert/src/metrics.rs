use prometheus_client::{
    encoding::{EncodeLabelSet, EncodeLabelValue},
    metrics::{counter::Counter, family::Family, gauge::Gauge},
    registry::Registry,
};

/// Conversion pass metrics. The default instance is not registered anywhere.
#[derive(Clone, Debug, Default)]
pub struct ConverterMetrics {
    skipped: Family<SkipLabels, Counter>,
    conflicts: Family<ConflictLabels, Counter>,
    frontends: Gauge,
    backends: Gauge,
}

/// Why a unit of work was skipped.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum SkipReason {
    RedeclaredPath,
    DefaultBackend,
    Backend,
    Tls,
}

/// What a contested annotation targeted.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, EncodeLabelValue)]
pub enum Scope {
    Frontend,
    Backend,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct SkipLabels {
    reason: SkipReason,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct ConflictLabels {
    scope: Scope,
}

// === impl ConverterMetrics ===

impl ConverterMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let metrics = Self::default();
        prom.register(
            "skipped",
            "Count of ingress paths, backends and TLS sections skipped during conversion",
            metrics.skipped.clone(),
        );
        prom.register(
            "annotation_conflicts",
            "Count of annotations ignored because an earlier resource set a different value",
            metrics.conflicts.clone(),
        );
        prom.register(
            "frontends",
            "Gauge of the number of frontends after the last conversion",
            metrics.frontends.clone(),
        );
        prom.register(
            "backends",
            "Gauge of the number of backends after the last conversion",
            metrics.backends.clone(),
        );
        metrics
    }

    pub fn skipped(&self, reason: SkipReason) -> u64 {
        self.skipped.get_or_create(&SkipLabels { reason }).get()
    }

    pub fn conflicts(&self, scope: Scope) -> u64 {
        self.conflicts.get_or_create(&ConflictLabels { scope }).get()
    }

    pub(crate) fn inc_skipped(&self, reason: SkipReason) {
        self.skipped.get_or_create(&SkipLabels { reason }).inc();
    }

    pub(crate) fn inc_conflicts(&self, scope: Scope, fields: usize) {
        self.conflicts
            .get_or_create(&ConflictLabels { scope })
            .inc_by(fields as u64);
    }

    pub(crate) fn set_size(&self, frontends: usize, backends: usize) {
        self.frontends.set(frontends as i64);
        self.backends.set(backends as i64);
    }
}
