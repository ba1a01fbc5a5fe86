//! Credential lookup. Production reads the process environment; tests pass
//! a map.

use std::collections::HashMap;
use std::env;

pub trait CredentialSource: Send + Sync {
    /// Raw value of `name`, or `None` when unset or blank.
    fn get(&self, name: &str) -> Option<String>;
}

/// Reads credentials from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl CredentialSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.trim().is_empty())
    }
}

impl CredentialSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}
