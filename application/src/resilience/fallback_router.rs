//! Model fallback chains
//!
//! [`FallbackRouter`] walks a persona's model chain until one model
//! answers. Each candidate gets the full retry treatment of
//! [`ModelCaller`]; only when every candidate has failed does the router
//! give up with [`RouterError::AllModelsExhausted`].

use super::model_caller::{CallError, ModelCaller};
use crate::ports::completion_gateway::{CompletionGateway, CompletionRequest, CompletionResponse};
use boardroom_domain::{
    ErrorCategory, Message, Model, ModelCandidate, ModelHealth, Persona, PersonaId,
    order_candidates,
};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// One candidate that did not produce an answer
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFailure {
    pub model: Model,
    pub error: CallError,
}

impl std::fmt::Display for ModelFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.model, self.error)
    }
}

fn describe(failures: &[ModelFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Terminal router failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    #[error("All models exhausted for {persona}: {}", describe(.failures))]
    AllModelsExhausted {
        persona: PersonaId,
        failures: Vec<ModelFailure>,
    },
}

impl RouterError {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::AllModelsExhausted
    }

    pub fn failures(&self) -> &[ModelFailure] {
        match self {
            RouterError::AllModelsExhausted { failures, .. } => failures,
        }
    }
}

/// A successful routed call
#[derive(Debug, Clone)]
pub struct Invocation {
    pub response: CompletionResponse,
    /// Model that actually answered
    pub model: Model,
    /// Head of the configured chain
    pub primary: Model,
    /// Candidates that failed before `model` answered, in order tried
    pub failures: Vec<ModelFailure>,
    /// Wall time from the first attempt to the answer
    pub latency: Duration,
}

impl Invocation {
    pub fn used_fallback(&self) -> bool {
        self.model != self.primary
    }
}

/// Walks fallback chains and keeps an advisory health board.
///
/// Health only reorders candidates: a model that failed recently is tried
/// after its healthy peers, but it is still tried.
pub struct FallbackRouter<G: CompletionGateway + 'static> {
    caller: ModelCaller<G>,
    health: Mutex<HashMap<Model, ModelHealth>>,
}

impl<G: CompletionGateway + 'static> FallbackRouter<G> {
    pub fn new(caller: ModelCaller<G>) -> Self {
        Self {
            caller,
            health: Mutex::new(HashMap::new()),
        }
    }

    pub fn caller(&self) -> &ModelCaller<G> {
        &self.caller
    }

    /// Last-known health of `model`; unknown models count as healthy
    pub fn health_of(&self, model: &Model) -> ModelHealth {
        self.health
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(model)
            .copied()
            .unwrap_or_default()
    }

    fn mark(&self, model: &Model, health: ModelHealth) {
        self.health
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(model.clone(), health);
    }

    /// Order in which `persona`'s chain will be tried next
    pub fn candidates(&self, persona: &Persona) -> Vec<ModelCandidate> {
        if self.caller.settings().reorder_by_health {
            return order_candidates(&persona.models, |m| self.health_of(m));
        }
        persona
            .models
            .iter()
            .enumerate()
            .map(|(rank, model)| ModelCandidate {
                model: model.clone(),
                rank,
                health: self.health_of(model),
            })
            .collect()
    }

    /// Get an answer for `persona` from the first model in its chain that
    /// responds.
    pub async fn invoke(
        &self,
        persona: &Persona,
        messages: &[Message],
    ) -> Result<Invocation, RouterError> {
        let started = tokio::time::Instant::now();
        let settings = self.caller.settings();
        let primary = persona.primary_model().cloned().unwrap_or_default();
        let candidates = self.candidates(persona);
        let mut failures: Vec<ModelFailure> = Vec::new();
        let base = CompletionRequest::new(primary.clone(), messages.to_vec())
            .with_max_tokens(settings.max_tokens)
            .with_temperature(settings.temperature);

        for (i, candidate) in candidates.iter().enumerate() {
            if i > 0 && !settings.candidate_pause().is_zero() {
                tokio::time::sleep(settings.candidate_pause()).await;
            }

            let request = base.for_model(candidate.model.clone());

            match self.caller.call(&request).await {
                Ok(outcome) => {
                    self.mark(&candidate.model, ModelHealth::Healthy);
                    if candidate.model != primary {
                        info!(
                            persona = %persona.id,
                            model = %candidate.model,
                            primary = %primary,
                            "Answered by fallback model"
                        );
                    }
                    return Ok(Invocation {
                        response: outcome.response,
                        model: candidate.model.clone(),
                        primary,
                        failures,
                        latency: started.elapsed(),
                    });
                }
                Err(error) => {
                    let health = if error.is_transient() {
                        ModelHealth::Degraded
                    } else {
                        ModelHealth::Unavailable
                    };
                    self.mark(&candidate.model, health);
                    warn!(
                        persona = %persona.id,
                        model = %candidate.model,
                        health = %health,
                        error = %error,
                        "Model failed, trying next candidate"
                    );
                    failures.push(ModelFailure {
                        model: candidate.model.clone(),
                        error,
                    });
                }
            }
        }

        Err(RouterError::AllModelsExhausted {
            persona: persona.id.clone(),
            failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CallerSettings;
    use crate::resilience::rate_limiter::RateLimiter;
    use crate::test_support::{MockGateway, server_error, status};
    use boardroom_domain::RetryPolicy;
    use std::sync::Arc;

    fn persona() -> Persona {
        Persona::new("ceo", "Alexandra Stone", "CEO").with_models([
            Model::Gpt4,
            Model::Gpt4Turbo,
            Model::Gpt35Turbo,
        ])
    }

    fn router(gateway: Arc<MockGateway>, max_retries: u32) -> FallbackRouter<MockGateway> {
        let settings = CallerSettings::default().with_retry(RetryPolicy {
            max_retries,
            base_delay_ms: 100,
            max_delay_ms: 1_000,
            jitter_ratio: 0.0,
        });
        FallbackRouter::new(ModelCaller::new(
            gateway,
            Arc::new(RateLimiter::unlimited()),
            settings,
        ))
    }

    fn messages() -> Vec<Message> {
        vec![Message::user("Should we hire more developers?")]
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_answers() {
        let gateway = Arc::new(MockGateway::new());
        let inv = router(Arc::clone(&gateway), 2)
            .invoke(&persona(), &messages())
            .await
            .unwrap();
        assert_eq!(inv.model, Model::Gpt4);
        assert!(!inv.used_fallback());
        assert_eq!(gateway.total_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_falls_through_to_third_candidate() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_always(Model::Gpt4, server_error());
        gateway.fail_always(Model::Gpt4Turbo, server_error());

        let inv = router(Arc::clone(&gateway), 2)
            .invoke(&persona(), &messages())
            .await
            .unwrap();

        assert_eq!(inv.model, Model::Gpt35Turbo);
        assert_eq!(inv.primary, Model::Gpt4);
        assert!(inv.used_fallback());
        assert_eq!(inv.response.served_model, Some(Model::Gpt35Turbo));
        let failed: Vec<_> = inv.failures.iter().map(|f| f.model.clone()).collect();
        assert_eq!(failed, vec![Model::Gpt4, Model::Gpt4Turbo]);
        // Each failing candidate used its full retry budget
        assert_eq!(gateway.calls_for(&Model::Gpt4), 3);
        assert_eq!(gateway.calls_for(&Model::Gpt4Turbo), 3);
        assert_eq!(gateway.calls_for(&Model::Gpt35Turbo), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_request_keeps_prompt_and_sampling() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_always(Model::Gpt4, status(401, "invalid key"));

        let mut settings = CallerSettings::default().with_retry(RetryPolicy::none());
        settings.max_tokens = 120;
        settings.temperature = 0.2;
        let router = FallbackRouter::new(ModelCaller::new(
            Arc::clone(&gateway),
            Arc::new(RateLimiter::unlimited()),
            settings,
        ));
        router.invoke(&persona(), &messages()).await.unwrap();

        let requests = gateway.requests();
        let models: Vec<_> = requests.iter().map(|r| r.model.clone()).collect();
        assert_eq!(models, vec![Model::Gpt4, Model::Gpt4Turbo]);
        for request in &requests {
            assert_eq!(request.messages, messages());
            assert_eq!(request.max_tokens, 120);
            assert_eq!(request.temperature, 0.2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_moves_on_without_retry() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_always(Model::Gpt4, status(401, "invalid key"));

        let inv = router(Arc::clone(&gateway), 2)
            .invoke(&persona(), &messages())
            .await
            .unwrap();
        assert_eq!(inv.model, Model::Gpt4Turbo);
        assert_eq!(gateway.calls_for(&Model::Gpt4), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_candidates_fail() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_always(Model::Gpt4, server_error());
        gateway.fail_always(Model::Gpt4Turbo, status(400, "bad request"));
        gateway.fail_always(Model::Gpt35Turbo, server_error());

        let err = router(Arc::clone(&gateway), 1)
            .invoke(&persona(), &messages())
            .await
            .unwrap_err();

        assert_eq!(err.category(), ErrorCategory::AllModelsExhausted);
        assert_eq!(err.failures().len(), 3);
        let RouterError::AllModelsExhausted { persona, .. } = &err;
        assert_eq!(persona.as_str(), "ceo");
        assert!(err.to_string().contains("openai/gpt-4-turbo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_health_reorders_but_never_skips() {
        let gateway = Arc::new(MockGateway::new());
        gateway.script(Model::Gpt4, [Err(status(403, "forbidden"))]);
        let router = router(Arc::clone(&gateway), 0);

        let first = router.invoke(&persona(), &messages()).await.unwrap();
        assert_eq!(first.model, Model::Gpt4Turbo);
        assert_eq!(router.health_of(&Model::Gpt4), ModelHealth::Unavailable);

        let order: Vec<_> = router
            .candidates(&persona())
            .into_iter()
            .map(|c| c.model)
            .collect();
        assert_eq!(order, vec![Model::Gpt4Turbo, Model::Gpt35Turbo, Model::Gpt4]);

        // Healthy candidates fail this time; the demoted primary still answers
        gateway.script(Model::Gpt4Turbo, [Err(status(400, "bad"))]);
        gateway.script(Model::Gpt35Turbo, [Err(status(400, "bad"))]);
        let second = router.invoke(&persona(), &messages()).await.unwrap();
        assert_eq!(second.model, Model::Gpt4);
        assert_eq!(router.health_of(&Model::Gpt4), ModelHealth::Healthy);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reordering_can_be_disabled() {
        let gateway = Arc::new(MockGateway::new());
        gateway.script(Model::Gpt4, [Err(status(403, "forbidden"))]);
        let settings = CallerSettings {
            reorder_by_health: false,
            ..CallerSettings::default()
        }
        .with_retry(RetryPolicy::none());
        let router = FallbackRouter::new(ModelCaller::new(
            Arc::clone(&gateway),
            Arc::new(RateLimiter::unlimited()),
            settings,
        ));

        router.invoke(&persona(), &messages()).await.unwrap();
        let order: Vec<_> = router
            .candidates(&persona())
            .into_iter()
            .map(|c| (c.model, c.health))
            .collect();
        assert_eq!(order[0], (Model::Gpt4, ModelHealth::Unavailable));
        assert_eq!(order[1].0, Model::Gpt4Turbo);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_between_candidates() {
        let gateway = Arc::new(MockGateway::new());
        gateway.fail_always(Model::Gpt4, status(401, "invalid key"));
        let router = router(Arc::clone(&gateway), 0);

        let start = tokio::time::Instant::now();
        router.invoke(&persona(), &messages()).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
