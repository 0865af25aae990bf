//! The threshold signature service.
use std::{collections::BTreeMap, sync::Arc};

use hotstuff_roles::replica::{
    Hash, PartialSignature, ReplicaId, SecretKey, Signature, ThresholdSignature,
};
use tokio::{task::JoinSet, time::Instant};

use crate::{
    metrics::{self, ResultLabel},
    Config, Error, Roster, Verifier,
};

/// Signs, verifies and aggregates signatures of the local replica's committee.
///
/// All collaborators are passed in at construction; the service keeps no
/// state besides them.
#[derive(Debug)]
pub struct ThresholdCrypto {
    id: ReplicaId,
    secret_key: SecretKey,
    roster: Arc<dyn Roster>,
    verifier: Arc<dyn Verifier>,
    config: Config,
}

impl ThresholdCrypto {
    /// Creates the service of replica `id`.
    ///
    /// `verifier` is the registered verifier: every single signature check,
    /// including the ones made while aggregating, goes through it.
    pub fn new(
        id: ReplicaId,
        secret_key: SecretKey,
        roster: Arc<dyn Roster>,
        verifier: Arc<dyn Verifier>,
        config: Config,
    ) -> Self {
        Self {
            id,
            secret_key,
            roster,
            verifier,
            config,
        }
    }

    /// Replica on whose behalf the service signs.
    pub fn id(&self) -> ReplicaId {
        self.id
    }

    /// Configuration of the service.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Signs `hash` with the local key. Signing is randomized.
    pub fn sign(&self, hash: &Hash) -> Result<PartialSignature, Error> {
        self.secret_key.sign_hash(self.id, hash).map_err(Error::Sign)
    }

    /// Verifies a single signature through the registered verifier.
    pub fn verify(&self, sig: &Signature, hash: &Hash) -> bool {
        self.verifier.verify(sig, hash)
    }

    /// Assembles a threshold signature out of partial signatures over `hash`.
    ///
    /// Inputs are processed in order. A signer that already has an accepted
    /// partial yields [`Error::PartialDuplicate`] and a non-partial signature
    /// yields [`Error::WrongType`]; both are skipped. Partials failing
    /// verification are dropped without an error. Fails with
    /// [`Error::NotAQuorum`], carrying the skipped inputs' errors, if fewer
    /// than a quorum of partials were accepted.
    pub fn create_threshold_signature(
        &self,
        partials: impl IntoIterator<Item = Signature>,
        hash: &Hash,
    ) -> Result<ThresholdSignature, Error> {
        let mut accepted = BTreeMap::new();
        let mut errors = vec![];
        for sig in partials {
            let partial = match &sig {
                Signature::Partial(partial) => partial,
                other => {
                    errors.push(Error::WrongType(other.kind()));
                    continue;
                }
            };
            let signer = partial.signer();
            if accepted.contains_key(&signer) {
                errors.push(Error::PartialDuplicate(signer));
                continue;
            }
            if !self.verify(&sig, hash) {
                tracing::debug!("dropping invalid partial signature of {signer:?}");
                continue;
            }
            accepted.insert(signer, partial.clone());
        }
        metrics::METRICS.skipped_partials.inc_by(errors.len() as u64);

        let quorum = self.roster.quorum_size();
        let ok = accepted.len() >= quorum;
        metrics::METRICS.aggregations[&ResultLabel::from(ok)].inc();
        if !ok {
            return Err(Error::NotAQuorum {
                accepted: accepted.len(),
                quorum,
                errors,
            });
        }
        if !errors.is_empty() {
            tracing::debug!(
                "threshold signature assembled, {} inputs skipped",
                errors.len()
            );
        }
        Ok(ThresholdSignature::restore(accepted.into_values()))
    }

    /// Checks that at least a quorum of the partials of `sig` are valid over `hash`.
    ///
    /// Below quorum size this is `false` right away. Otherwise every partial
    /// is verified on its own blocking task and all of them are awaited,
    /// bounded by [`Config::verification_timeout`]: whatever hasn't finished
    /// by then is abandoned and counted as invalid, same as a panicked task.
    pub async fn verify_threshold_signature(&self, sig: &ThresholdSignature, hash: &Hash) -> bool {
        let quorum = self.roster.quorum_size();
        if sig.len() < quorum {
            metrics::METRICS.threshold_verifications[&ResultLabel::Err].inc();
            return false;
        }

        let latency = metrics::METRICS.threshold_verification_latency.start();
        let deadline = self.config.verification_timeout.map(|t| Instant::now() + t);
        let mut tasks = JoinSet::new();
        for partial in sig.partials() {
            let verifier = self.verifier.clone();
            let sig = Signature::Partial(partial.clone());
            let hash = *hash;
            tasks.spawn_blocking(move || verifier.verify(&sig, &hash));
        }

        let mut verified = 0;
        loop {
            let next = match deadline {
                None => tasks.join_next().await,
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, tasks.join_next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            tracing::warn!(
                                "{} partial signature verifications did not finish in time",
                                tasks.len()
                            );
                            metrics::METRICS
                                .timed_out_verifications
                                .inc_by(tasks.len() as u64);
                            tasks.abort_all();
                            break;
                        }
                    }
                }
            };
            match next {
                None => break,
                Some(Ok(true)) => verified += 1,
                Some(Ok(false)) => {}
                Some(Err(err)) => tracing::warn!("partial signature verification failed: {err}"),
            }
        }
        latency.observe();

        let ok = verified >= quorum;
        metrics::METRICS.threshold_verifications[&ResultLabel::from(ok)].inc();
        ok
    }
}
