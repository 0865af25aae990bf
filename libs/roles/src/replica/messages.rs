//! Messages exchanged by replicas, as far as the network layer needs to know them.
use std::fmt;

use hotstuff_crypto::{keccak256::Keccak256, ByteFmt, Text, TextFmt};
use hotstuff_utils::enum_util::{BadVariantError, Variant};

use super::{PartialSignature, ReplicaId, ThresholdSignature};

/// Hash of a block or of any other signed message.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hash(pub(crate) Keccak256);

impl Hash {
    /// Hashes arbitrary bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Self(Keccak256::new(bytes))
    }

    /// Raw digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }
}

impl ByteFmt for Hash {
    fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        ByteFmt::decode(bytes).map(Self)
    }

    fn encode(&self) -> Vec<u8> {
        ByteFmt::encode(&self.0)
    }
}

impl TextFmt for Hash {
    fn decode(text: Text) -> anyhow::Result<Self> {
        text.strip("hash:keccak256:")?.decode_hex().map(Self)
    }

    fn encode(&self) -> String {
        format!("hash:keccak256:{}", hex::encode(ByteFmt::encode(&self.0)))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str(&TextFmt::encode(self))
    }
}

/// Round of the protocol. Views start at 1; view 0 is the genesis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct View(pub u64);

impl View {
    /// The view after this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The view before this one, if any.
    pub fn prev(self) -> Option<Self> {
        self.0.checked_sub(1).map(Self)
    }
}

impl fmt::Display for View {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

/// Certificate that a quorum voted for a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuorumCert {
    /// Votes of the quorum; `None` only for the genesis certificate.
    pub signature: Option<ThresholdSignature>,
    /// View in which the votes were cast.
    pub view: View,
    /// Block that was voted for.
    pub block_hash: Hash,
}

impl QuorumCert {
    /// Certificate of the genesis block, which nobody has to sign.
    pub fn genesis(block_hash: Hash) -> Self {
        Self {
            signature: None,
            view: View(0),
            block_hash,
        }
    }
}

/// Certificate that a quorum timed out in a view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeoutCert {
    /// Timeout signatures of the quorum.
    pub signature: ThresholdSignature,
    /// View that timed out.
    pub view: View,
}

/// A single vote for a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartialCert {
    /// Signature of the voter over `block_hash`.
    pub signature: PartialSignature,
    /// Block voted for.
    pub block_hash: Hash,
}

/// Highest certificates known to a replica, sent along to let others catch up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncInfo {
    /// Highest quorum certificate.
    pub qc: Option<QuorumCert>,
    /// Highest timeout certificate.
    pub tc: Option<TimeoutCert>,
}

/// A block of the chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    /// Hash of the parent block.
    pub parent: Hash,
    /// Certificate justifying the proposal.
    pub qc: QuorumCert,
    /// Replica that proposed the block.
    pub proposer: ReplicaId,
    /// View the block was proposed in.
    pub view: View,
    /// Opaque commands.
    pub payload: Vec<u8>,
}

impl Block {
    /// Hash of the block. Covers every field except the certificate's signature,
    /// which is implied by the certified block hash.
    pub fn hash(&self) -> Hash {
        let parts: [&[u8]; 6] = [
            self.parent.as_bytes(),
            self.qc.block_hash.as_bytes(),
            &self.qc.view.0.to_be_bytes(),
            &self.proposer.0.to_be_bytes(),
            &self.view.0.to_be_bytes(),
            &self.payload,
        ];
        Hash(Keccak256::concat(parts))
    }
}

/// A leader's proposal for a view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposeMsg {
    /// Proposer.
    pub id: ReplicaId,
    /// Proposed block.
    pub block: Block,
}

/// Announcement that the sender gave up on a view.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeoutMsg {
    /// Sender.
    pub id: ReplicaId,
    /// View that timed out.
    pub view: View,
    /// Sender's signature over the view.
    pub view_signature: PartialSignature,
    /// Highest certificates known to the sender.
    pub sync_info: SyncInfo,
}

/// A vote, sent to the next leader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteMsg {
    /// Voter.
    pub id: ReplicaId,
    /// The vote itself.
    pub partial_cert: PartialCert,
}

/// Certificates sent to the next leader on view change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewViewMsg {
    /// Sender.
    pub id: ReplicaId,
    /// Highest certificates known to the sender.
    pub sync_info: SyncInfo,
}

/// Any message that the network delivers to a replica's event queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsensusMsg {
    /// See [`ProposeMsg`].
    Propose(ProposeMsg),
    /// See [`TimeoutMsg`].
    Timeout(TimeoutMsg),
    /// See [`VoteMsg`].
    Vote(VoteMsg),
    /// See [`NewViewMsg`].
    NewView(NewViewMsg),
}

impl ConsensusMsg {
    /// Short name of the message kind, for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Propose(_) => "propose",
            Self::Timeout(_) => "timeout",
            Self::Vote(_) => "vote",
            Self::NewView(_) => "new_view",
        }
    }

    /// Replica that sent the message.
    pub fn sender(&self) -> ReplicaId {
        match self {
            Self::Propose(m) => m.id,
            Self::Timeout(m) => m.id,
            Self::Vote(m) => m.id,
            Self::NewView(m) => m.id,
        }
    }
}

macro_rules! impl_variant {
    ($msg:ident, $variant:ident, $name:literal) => {
        impl Variant<ConsensusMsg> for $msg {
            fn insert(self) -> ConsensusMsg {
                ConsensusMsg::$variant(self)
            }

            fn extract(msg: ConsensusMsg) -> Result<Self, BadVariantError> {
                let ConsensusMsg::$variant(this) = msg else {
                    return Err(BadVariantError { expected: $name });
                };
                Ok(this)
            }
        }
    };
}

impl_variant!(ProposeMsg, Propose, "propose");
impl_variant!(TimeoutMsg, Timeout, "timeout");
impl_variant!(VoteMsg, Vote, "vote");
impl_variant!(NewViewMsg, NewView, "new_view");
