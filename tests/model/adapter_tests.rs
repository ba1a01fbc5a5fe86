// Retry, rotation and validation behaviour of the shared model adapter.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use storyjudge_core::model::{
    GenerativeModel, KeyRotation, ModelAdapter, ModelError, ProviderClient, ProviderError,
    ProviderKind, RetryPolicy,
};
use storyjudge_core::{AppConfig, ChatMessage, Conversation, ModelFactory};

/// Provider fake whose outcome depends on the API key used.
///
/// Keys listed in `rate_limited` always answer 429; every other key
/// consumes the shared `outcomes` queue.
#[derive(Clone, Default)]
struct FakeProvider {
    outcomes: Arc<Mutex<VecDeque<Result<String, ProviderError>>>>,
    rate_limited: Vec<String>,
    keys_used: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    fn scripted(outcomes: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(outcomes.into())),
            ..Self::default()
        }
    }

    fn rate_limiting(mut self, key: &str) -> Self {
        self.rate_limited.push(key.to_string());
        self
    }

    fn attempts(&self) -> usize {
        self.keys_used.lock().expect("lock").len()
    }

    fn keys_used(&self) -> Vec<String> {
        self.keys_used.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ProviderClient for FakeProvider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn build_payload(&self, model: &str, conversation: &Conversation) -> Result<Value, ModelError> {
        Ok(json!({ "model": model, "turns": conversation.len() }))
    }

    async fn send(
        &self,
        _model: &str,
        _payload: &Value,
        api_key: &str,
    ) -> Result<String, ProviderError> {
        self.keys_used.lock().expect("lock").push(api_key.to_string());
        if self.rate_limited.iter().any(|k| k == api_key) {
            return Err(ProviderError::rate_limited(
                ProviderKind::Gemini,
                "HTTP 429: RESOURCE_EXHAUSTED",
            ));
        }
        self.outcomes
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Ok("5".into()))
    }
}

fn transient() -> Result<String, ProviderError> {
    Err(ProviderError::transient(ProviderKind::Gemini, "HTTP 503"))
}

fn judging() -> Conversation {
    Conversation::new(vec![
        ChatMessage::system("Rate the story from 1 to 5."),
        ChatMessage::user("The dragon slept."),
    ])
}

fn keys(csv: &str) -> KeyRotation {
    KeyRotation::from_csv(csv).expect("keys")
}

#[tokio::test(start_paused = true)]
async fn k_transient_failures_take_k_plus_one_attempts() {
    for k in 0..RetryPolicy::default().max_attempts as usize {
        let mut outcomes: Vec<_> = (0..k).map(|_| transient()).collect();
        outcomes.push(Ok(" 4 ".into()));
        let provider = FakeProvider::scripted(outcomes);
        let model = ModelAdapter::new(provider.clone(), "gemini-2.5-pro", keys("k0"));

        let reply = model.generate(&judging()).await.expect("recovers");

        assert_eq!(reply, "4");
        assert_eq!(provider.attempts(), k + 1, "k = {k}");
    }
}

#[tokio::test(start_paused = true)]
async fn persistent_failure_stops_at_default_cap() {
    let provider = FakeProvider::scripted((0..10).map(|_| transient()).collect());
    let model = ModelAdapter::new(provider.clone(), "gemini-2.5-pro", keys("k0"));

    let err = model.generate(&judging()).await.expect_err("exhausted");

    match err {
        ModelError::TransientFailureExhausted {
            provider: kind,
            attempts,
            last_error,
        } => {
            assert_eq!(kind, ProviderKind::Gemini);
            assert_eq!(attempts, 5);
            assert!(last_error.message.contains("503"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(provider.attempts(), 5);
}

#[tokio::test(start_paused = true)]
async fn rate_limited_key_is_rotated_away_and_stays_rotated() {
    let provider = FakeProvider::default().rate_limiting("k0");
    let model = ModelAdapter::new(provider.clone(), "gemini-2.5-pro", keys("k0,k1"));

    assert_eq!(model.generate(&judging()).await.expect("first"), "5");
    assert_eq!(model.keys().index(), 1);

    model.generate(&judging()).await.expect("second");
    assert_eq!(provider.keys_used(), ["k0", "k1", "k1"]);
}

#[tokio::test(start_paused = true)]
async fn rotation_wraps_around_the_pool() {
    let provider = FakeProvider::default().rate_limiting("k1").rate_limiting("k2");
    let rotation = keys("k0,k1,k2");
    rotation.advance();
    let model = ModelAdapter::new(provider.clone(), "gemini-2.5-pro", rotation);

    model.generate(&judging()).await.expect("wraps to k0");

    assert_eq!(provider.keys_used(), ["k1", "k2", "k0"]);
    assert_eq!(model.keys().index(), 0);
}

#[tokio::test(start_paused = true)]
async fn every_key_rate_limited_exhausts_attempts() {
    let provider = FakeProvider::default()
        .rate_limiting("k0")
        .rate_limiting("k1");
    let model = ModelAdapter::new(provider.clone(), "gemini-2.5-pro", keys("k0,k1"));

    let err = model.generate(&judging()).await.expect_err("all limited");

    assert!(matches!(
        err,
        ModelError::TransientFailureExhausted { attempts: 5, .. }
    ));
    assert_eq!(provider.keys_used(), ["k0", "k1", "k0", "k1", "k0"]);
}

fn offline_config(max_attempts: u32) -> AppConfig {
    let mut config = AppConfig::default();
    config.endpoints.gemini = "http://127.0.0.1:9".into();
    config.retry.max_attempts = max_attempts;
    config.request_timeout_secs = 2;
    config
}

fn gemini_credentials() -> Arc<HashMap<String, String>> {
    Arc::new(HashMap::from([(
        "GOOGLE_API_KEY".to_string(),
        "g0,g1".to_string(),
    )]))
}

#[tokio::test]
async fn resolved_model_rejects_trailing_assistant_turn() {
    let model = ModelFactory::new(offline_config(5), gemini_credentials())
        .resolve("gemini-2.5-pro")
        .expect("resolves");
    let convo = judging().with(ChatMessage::assistant("Score:"));

    let err = model.generate(&convo).await.expect_err("malformed");

    assert!(matches!(err, ModelError::MalformedConversation { .. }));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transient_failure() {
    let model = ModelFactory::new(offline_config(1), gemini_credentials())
        .resolve("gemini-2.5-pro")
        .expect("resolves");

    let err = model.generate(&judging()).await.expect_err("unreachable");

    assert!(matches!(
        err,
        ModelError::TransientFailureExhausted { attempts: 1, .. }
    ));
}
