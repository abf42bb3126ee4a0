//! Delivery retry state machine
//!
//! Drives one item through PENDING → ATTEMPTING → {DELIVERED | RETRY_WAIT →
//! ATTEMPTING | EXHAUSTED}. Every transport error is treated as retryable up
//! to the bound; backoff between attempts is exponential with no jitter.
//! Recording the delivery is the caller's job — EXHAUSTED must never touch
//! the delivery record.

use crate::types::{ChannelTransport, TrackMetadata, UploadOutcome};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry bounds for one delivery
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per item, including the first
    pub max_attempts: u32,
    /// Backoff before retry n is `backoff_base_secs ^ n` seconds
    pub backoff_base_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_secs: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before the next attempt, after `failed_attempts` failures
    fn backoff(&self, failed_attempts: u32) -> Duration {
        Duration::from_secs(self.backoff_base_secs.saturating_pow(failed_attempts))
    }
}

/// Uploader: bounded-retry delivery over a channel transport
pub struct Uploader {
    transport: Box<dyn ChannelTransport>,
    policy: RetryPolicy,
}

impl Uploader {
    pub fn new(transport: Box<dyn ChannelTransport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    /// Deliver one file, retrying on any transport error until the attempt
    /// bound is reached. Always returns a terminal outcome; never an error.
    pub async fn deliver(
        &self,
        file_path: &Path,
        metadata: &TrackMetadata,
        caption: &str,
    ) -> UploadOutcome {
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            debug!(
                file = %file_path.display(),
                attempt = attempts,
                max_attempts = self.policy.max_attempts,
                transport = self.transport.name(),
                "Attempting delivery"
            );

            match self.transport.send_audio(file_path, metadata, caption).await {
                Ok(()) => {
                    return UploadOutcome::Delivered { attempts };
                }
                Err(e) => {
                    warn!(
                        file = %file_path.display(),
                        attempt = attempts,
                        error = %e,
                        "Delivery attempt failed"
                    );

                    if attempts >= self.policy.max_attempts {
                        return UploadOutcome::Exhausted { attempts };
                    }

                    let delay = self.policy.backoff(attempts);
                    debug!(
                        file = %file_path.display(),
                        delay_secs = delay.as_secs(),
                        "Backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransportError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// Transport stub failing the first `failures` calls, succeeding after.
    /// Clones share the call counter.
    #[derive(Clone)]
    struct FlakyTransport {
        failures: u32,
        calls: Arc<AtomicU32>,
    }

    impl FlakyTransport {
        fn new(failures: u32) -> Self {
            Self {
                failures,
                calls: Arc::new(AtomicU32::new(0)),
            }
        }

        fn call_count(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChannelTransport for FlakyTransport {
        fn name(&self) -> &'static str {
            "flaky-stub"
        }

        async fn send_audio(
            &self,
            _file_path: &Path,
            _metadata: &TrackMetadata,
            _caption: &str,
        ) -> Result<(), TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(TransportError::Network("simulated failure".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn metadata() -> TrackMetadata {
        TrackMetadata {
            title: "Echo".to_string(),
            artist: "Nova".to_string(),
        }
    }

    // Zero backoff base keeps retry tests instant
    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            backoff_base_secs: 0,
        }
    }

    #[tokio::test]
    async fn test_delivers_first_attempt() {
        let uploader = Uploader::new(Box::new(FlakyTransport::new(0)), policy(3));
        let outcome = uploader
            .deliver(Path::new("/music/song1.mp3"), &metadata(), "")
            .await;
        assert_eq!(outcome, UploadOutcome::Delivered { attempts: 1 });
    }

    #[tokio::test]
    async fn test_delivers_on_third_attempt_with_no_extra_calls() {
        let transport = FlakyTransport::new(2);
        let uploader = Uploader::new(Box::new(transport.clone()), policy(3));

        let outcome = uploader
            .deliver(Path::new("/music/song1.mp3"), &metadata(), "")
            .await;

        assert_eq!(outcome, UploadOutcome::Delivered { attempts: 3 });
        // Exactly three transport calls: no call after success
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_exhausts_after_bound() {
        let uploader = Uploader::new(Box::new(FlakyTransport::new(u32::MAX)), policy(3));
        let outcome = uploader
            .deliver(Path::new("/music/song1.mp3"), &metadata(), "")
            .await;
        assert_eq!(outcome, UploadOutcome::Exhausted { attempts: 3 });
    }

    #[tokio::test]
    async fn test_single_attempt_policy() {
        let uploader = Uploader::new(Box::new(FlakyTransport::new(1)), policy(1));
        let outcome = uploader
            .deliver(Path::new("/music/song1.mp3"), &metadata(), "")
            .await;
        assert_eq!(outcome, UploadOutcome::Exhausted { attempts: 1 });
    }

    #[test]
    fn test_backoff_is_exponential() {
        let policy = RetryPolicy {
            max_attempts: 4,
            backoff_base_secs: 2,
        };
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
        assert_eq!(policy.backoff(3), Duration::from_secs(8));
    }
}
