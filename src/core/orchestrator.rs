//! Points & fact orchestration for the Processing step
//!
//! Runs the fact call and the floor timer side by side and resolves only
//! when both are done: duration = max(fact latency, floor). The fact call
//! cannot fail the join; any error or panic becomes an empty fact.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::core::fact::{clean_fact, FactGenerator, FactRequest};

/// What the Success step shows besides the points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessResult {
    /// Possibly empty
    pub fact_text: String,
}

/// Runs the confirm sequence
#[derive(Clone)]
pub struct Orchestrator {
    facts: Arc<dyn FactGenerator>,
    floor: Duration,
}

impl Orchestrator {
    pub fn new(facts: Arc<dyn FactGenerator>, floor: Duration) -> Self {
        Self { facts, floor }
    }

    /// Fetch the fact and wait out the floor, whichever takes longer
    pub async fn confirm(&self, request: FactRequest) -> SuccessResult {
        let started = Instant::now();

        // Own task so a panicking collaborator cannot take the join down
        let facts = Arc::clone(&self.facts);
        let fetch = tokio::spawn(async move { facts.generate_fact(request).await });

        let (fetched, ()) = tokio::join!(fetch, sleep(self.floor));

        let fact_text = match fetched {
            Ok(Ok(text)) => clean_fact(&text),
            Ok(Err(e)) => {
                warn!(error = %e, "fact generation failed, continuing without fact");
                String::new()
            }
            Err(e) => {
                warn!(error = %e, "fact task did not complete, continuing without fact");
                String::new()
            }
        };

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            has_fact = !fact_text.is_empty(),
            "processing finished"
        );

        SuccessResult { fact_text }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("floor", &self.floor)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactError;
    use crate::types::{Language, Material};
    use async_trait::async_trait;

    const FLOOR: Duration = Duration::from_millis(2000);

    enum Behavior {
        Reply(&'static str, Duration),
        Fail,
        Panic,
    }

    struct ScriptedFacts(Behavior);

    #[async_trait]
    impl FactGenerator for ScriptedFacts {
        async fn generate_fact(&self, _request: FactRequest) -> Result<String, FactError> {
            match &self.0 {
                Behavior::Reply(text, delay) => {
                    sleep(*delay).await;
                    Ok(text.to_string())
                }
                Behavior::Fail => Err(FactError::Upstream { status: 503 }),
                Behavior::Panic => panic!("collaborator blew up"),
            }
        }
    }

    fn orchestrator(behavior: Behavior) -> Orchestrator {
        Orchestrator::new(Arc::new(ScriptedFacts(behavior)), FLOOR)
    }

    fn request() -> FactRequest {
        FactRequest {
            count: 3,
            material: Material::Plastic,
            language: Language::Eng,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_fact_still_waits_for_floor() {
        let started = Instant::now();
        let result = orchestrator(Behavior::Reply("Great job!", Duration::ZERO))
            .confirm(request())
            .await;
        assert!(started.elapsed() >= FLOOR);
        assert_eq!(result.fact_text, "Great job!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fact_is_awaited_not_raced() {
        let latency = Duration::from_millis(3500);
        let started = Instant::now();
        let result = orchestrator(Behavior::Reply("Slow but shown", latency))
            .confirm(request())
            .await;
        assert!(started.elapsed() >= latency);
        assert_eq!(result.fact_text, "Slow but shown");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_resolves_to_empty_fact() {
        let started = Instant::now();
        let result = orchestrator(Behavior::Fail).confirm(request()).await;
        assert!(started.elapsed() >= FLOOR);
        assert_eq!(result.fact_text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_collaborator_resolves_to_empty_fact() {
        let result = orchestrator(Behavior::Panic).confirm(request()).await;
        assert_eq!(result.fact_text, "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_reply_is_empty_fact() {
        let result = orchestrator(Behavior::Reply("  \n ", Duration::ZERO))
            .confirm(request())
            .await;
        assert_eq!(result.fact_text, "");
    }
}
