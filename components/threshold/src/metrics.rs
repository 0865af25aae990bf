//! Metrics for the threshold signature service.

use std::time::Duration;

use vise::{Buckets, Counter, EncodeLabelValue, Histogram, LabeledFamily, Metrics, Unit};

/// Outcome of a verification or an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue)]
#[metrics(rename_all = "snake_case")]
pub(crate) enum ResultLabel {
    Ok,
    Err,
}

impl From<bool> for ResultLabel {
    fn from(ok: bool) -> Self {
        if ok {
            Self::Ok
        } else {
            Self::Err
        }
    }
}

/// Metrics defined by the threshold signature service.
#[derive(Debug, Metrics)]
#[metrics(prefix = "threshold")]
pub(crate) struct ThresholdMetrics {
    /// Verifications of single partial signatures against the roster.
    #[metrics(labels = ["result"])]
    pub(crate) partial_verifications: LabeledFamily<ResultLabel, Counter>,
    /// Requests to assemble a threshold signature.
    #[metrics(labels = ["result"])]
    pub(crate) aggregations: LabeledFamily<ResultLabel, Counter>,
    /// Verifications of threshold signatures.
    #[metrics(labels = ["result"])]
    pub(crate) threshold_verifications: LabeledFamily<ResultLabel, Counter>,
    /// Partial signatures skipped during aggregation as duplicates or of a wrong type.
    pub(crate) skipped_partials: Counter,
    /// Partial signature verifications abandoned at the verification deadline.
    pub(crate) timed_out_verifications: Counter,
    /// Latency of verifying all partials of a threshold signature.
    #[metrics(buckets = Buckets::LATENCIES, unit = Unit::Seconds)]
    pub(crate) threshold_verification_latency: Histogram<Duration>,
    /// Verifications answered from the signature cache.
    pub(crate) cache_hits: Counter,
    /// Verifications passed on to the inner verifier by the signature cache.
    pub(crate) cache_misses: Counter,
}

/// Global instance of [`ThresholdMetrics`].
#[vise::register]
pub(crate) static METRICS: vise::Global<ThresholdMetrics> = vise::Global::new();
