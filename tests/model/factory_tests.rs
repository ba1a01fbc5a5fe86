// Model name resolution and credential handling in the factory.

use std::collections::HashMap;
use std::sync::Arc;
use storyjudge_core::model::factory::{credential_env, infer_provider};
use storyjudge_core::model::ProviderKind;
use storyjudge_core::{AppConfig, FactoryError, ModelFactory};

fn factory_with(vars: &[(&str, &str)]) -> ModelFactory {
    let env: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ModelFactory::new(AppConfig::default(), Arc::new(env))
}

#[test]
fn provider_prefixes_are_case_insensitive() {
    for (name, provider, model) in [
        ("Google/gemini-1.5-flash", ProviderKind::Gemini, "gemini-1.5-flash"),
        ("ANTHROPIC/claude-3-haiku", ProviderKind::Anthropic, "claude-3-haiku"),
        ("claude/claude-opus-4", ProviderKind::Anthropic, "claude-opus-4"),
        ("OpenAI/gpt-4.1", ProviderKind::OpenAI, "gpt-4.1"),
    ] {
        let (resolved, wire) = infer_provider(name).expect(name);
        assert_eq!(resolved, provider, "{name}");
        assert_eq!(wire, model, "{name}");
    }
}

#[test]
fn family_names_keep_their_spelling() {
    let (provider, wire) = infer_provider("  Gemini-2.5-Pro ").expect("gemini");
    assert_eq!(provider, ProviderKind::Gemini);
    assert_eq!(wire, "Gemini-2.5-Pro");

    assert_eq!(
        infer_provider("chatgpt-4o-latest").expect("chatgpt").0,
        ProviderKind::OpenAI
    );
}

#[test]
fn credential_variables_per_provider() {
    assert_eq!(credential_env(ProviderKind::Gemini), "GOOGLE_API_KEY");
    assert_eq!(credential_env(ProviderKind::Anthropic), "ANTHROPIC_API_KEY");
    assert_eq!(credential_env(ProviderKind::OpenAI), "OPENAI_API_KEY");
}

#[test]
fn unknown_model_fails_before_credentials_are_read() {
    let err = factory_with(&[]).resolve("llama-3-70b").err().expect("unknown");
    match err {
        FactoryError::UnknownModel { name } => assert_eq!(name, "llama-3-70b"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_openai_key_names_the_variable() {
    let err = factory_with(&[("GOOGLE_API_KEY", "g0")])
        .resolve("gpt-4o")
        .err()
        .expect("missing key");
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}

#[test]
fn prefixed_name_resolves_to_stripped_model() {
    let model = factory_with(&[("ANTHROPIC_API_KEY", "a0")])
        .resolve("anthropic/claude-sonnet-4")
        .expect("resolves");
    assert_eq!(model.provider(), ProviderKind::Anthropic);
    assert_eq!(model.model_name(), "claude-sonnet-4");
}
