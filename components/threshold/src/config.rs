use std::time::Duration;

/// Configuration of the threshold signature service.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Upper bound on verifying all partials of a threshold signature.
    /// Verifications still running at the deadline count as failed.
    /// `None` waits for every verification, however long it takes.
    pub verification_timeout: Option<Duration>,
    /// Maximal number of verification results kept by a [`crate::SignatureCache`].
    pub cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verification_timeout: Some(Duration::from_secs(10)),
            cache_capacity: 4096,
        }
    }
}
