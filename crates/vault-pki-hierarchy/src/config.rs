use std::time::Duration;

/// Tuning for one hierarchy resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum certificate fetches in flight at once
    pub concurrency: usize,

    /// Overall budget for fetching certificates, after the listing
    pub deadline: Duration,

    /// Check the mount table before listing
    pub verify_mount: bool,

    /// Attribute certificates that name no issuer to the mount's default issuer
    pub use_default_issuer: bool,

    /// Fetch at most this many serials
    pub limit: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrency: Self::DEFAULT_CONCURRENCY,
            deadline: Self::DEFAULT_DEADLINE,
            verify_mount: true,
            use_default_issuer: true,
            limit: None,
        }
    }
}

impl ResolverConfig {
    /// Default fetch concurrency
    pub const DEFAULT_CONCURRENCY: usize = 10;

    /// Default overall deadline
    pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(120);

    /// Set the fetch concurrency (at least one)
    #[must_use]
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Set the overall deadline
    #[must_use]
    pub const fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Enable or disable mount verification
    #[must_use]
    pub const fn verify_mount(mut self, verify: bool) -> Self {
        self.verify_mount = verify;
        self
    }

    /// Enable or disable the default issuer fallback
    #[must_use]
    pub const fn use_default_issuer(mut self, enabled: bool) -> Self {
        self.use_default_issuer = enabled;
        self
    }

    /// Cap the number of certificates fetched
    #[must_use]
    pub const fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}
