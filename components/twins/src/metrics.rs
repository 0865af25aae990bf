//! Metrics of the twins network.

use hotstuff_roles::replica::ConsensusMsg;
use vise::{Counter, EncodeLabelValue, Gauge, LabeledFamily, Metrics};

/// Kind of a routed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue)]
#[metrics(rename_all = "snake_case")]
pub(crate) enum MsgKindLabel {
    Propose,
    Timeout,
    Vote,
    NewView,
}

impl From<&ConsensusMsg> for MsgKindLabel {
    fn from(msg: &ConsensusMsg) -> Self {
        match msg {
            ConsensusMsg::Propose(_) => Self::Propose,
            ConsensusMsg::Timeout(_) => Self::Timeout,
            ConsensusMsg::Vote(_) => Self::Vote,
            ConsensusMsg::NewView(_) => Self::NewView,
        }
    }
}

/// Outcome of a block fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EncodeLabelValue)]
#[metrics(rename_all = "snake_case")]
pub(crate) enum FetchLabel {
    Found,
    NotFound,
}

#[derive(Debug, Metrics)]
#[metrics(prefix = "twins")]
pub(crate) struct TwinsMetrics {
    /// Messages enqueued at their recipient.
    #[metrics(labels = ["kind"])]
    pub(crate) delivered_messages: LabeledFamily<MsgKindLabel, Counter>,
    /// Messages dropped by the partition schedule.
    #[metrics(labels = ["kind"])]
    pub(crate) dropped_messages: LabeledFamily<MsgKindLabel, Counter>,
    /// Block fetches.
    #[metrics(labels = ["result"])]
    pub(crate) fetches: LabeledFamily<FetchLabel, Counter>,
    /// Nodes that timed out twice in the same view.
    pub(crate) hung_nodes: Gauge<usize>,
}

#[vise::register]
pub(crate) static METRICS: vise::Global<TwinsMetrics> = vise::Global::new();
