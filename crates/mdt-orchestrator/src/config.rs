//! Orchestrator configuration.

use std::time::Duration;

use mdt_embedding::RetryPolicy;

/// Tuning knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Upper bound for one agent invocation (including summarization).
    pub agent_timeout: Duration,
    /// Upper bound for one embedding call.
    pub embedding_timeout: Duration,
    /// Retry schedule for transient embedding failures.
    pub embedding_retry: RetryPolicy,
    /// Retry schedule for the validate-and-route stage.
    pub retry: RetryPolicy,
    /// Run the selected agents concurrently.
    pub parallel: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            agent_timeout: Duration::from_secs(60),
            embedding_timeout: Duration::from_secs(30),
            embedding_retry: RetryPolicy::default(),
            retry: RetryPolicy::default(),
            parallel: true,
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-agent timeout.
    pub fn with_agent_timeout(mut self, timeout: Duration) -> Self {
        self.agent_timeout = timeout;
        self
    }

    /// Set the embedding timeout and retry schedule.
    pub fn with_embedding(mut self, timeout: Duration, retry: RetryPolicy) -> Self {
        self.embedding_timeout = timeout;
        self.embedding_retry = retry;
        self
    }

    /// Set the retry schedule.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Run selected agents one after another.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = OrchestratorConfig::new()
            .with_agent_timeout(Duration::from_secs(5))
            .with_retry(RetryPolicy::once())
            .sequential();
        assert_eq!(config.agent_timeout, Duration::from_secs(5));
        assert_eq!(config.retry.attempts, 1);
        assert!(!config.parallel);
        assert_eq!(config.embedding_timeout, Duration::from_secs(30));
        assert_eq!(config.embedding_retry, RetryPolicy::default());
    }
}
