use hotstuff_roles::replica::ReplicaId;

/// Errors returned by the threshold signature service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The signer already contributed an accepted partial signature.
    #[error("duplicate partial signature of {0:?}")]
    PartialDuplicate(ReplicaId),
    /// A signature of another kind was supplied where a partial one was expected.
    #[error("expected a partial signature, got a {0} one")]
    WrongType(&'static str),
    /// Too few valid partial signatures from distinct signers.
    #[error("not a quorum: {accepted} valid partial signatures, {quorum} required")]
    NotAQuorum {
        /// Number of partial signatures that were accepted.
        accepted: usize,
        /// Required quorum size.
        quorum: usize,
        /// Duplicate and wrong-type errors encountered along the way.
        errors: Vec<Error>,
    },
    /// Signing failed, e.g. because the entropy source did.
    #[error("signing failed")]
    Sign(#[source] anyhow::Error),
}
