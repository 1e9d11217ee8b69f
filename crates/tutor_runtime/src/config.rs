//! Runtime configuration for the tutor relay

use std::time::Duration;

use serde::Serialize;

use crate::error::{Result, RuntimeError};

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const MODEL_ENV: &str = "TUTOR_MODEL";
pub const TEMPERATURE_ENV: &str = "TUTOR_TEMPERATURE";
pub const REQUEST_TIMEOUT_ENV: &str = "TUTOR_REQUEST_TIMEOUT_SECS";
pub const INTERPRETER_ENV: &str = "TUTOR_INTERPRETER";
pub const CAPTURE_TIMEOUT_ENV: &str = "TUTOR_CAPTURE_TIMEOUT_SECS";

/// Value left in freshly generated settings; treated as unset.
pub const API_KEY_PLACEHOLDER: &str = "<API_KEY>";

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_INTERPRETER: &str = "python";

/// Runtime configuration
#[derive(Clone, Serialize)]
pub struct RuntimeConfig {
    #[serde(skip)]
    pub api_key: String,
    /// Provider endpoint override (OpenAI-compatible)
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f32,
    /// Limit for one provider call
    pub request_timeout: Duration,
    /// Program used to run the learner's file
    pub interpreter: String,
    /// Limit for the one-off capture run (None = unlimited)
    pub capture_timeout: Option<Duration>,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("api_key", &mask_key(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("request_timeout", &self.request_timeout)
            .field("interpreter", &self.interpreter)
            .field("capture_timeout", &self.capture_timeout)
            .finish()
    }
}

impl RuntimeConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            interpreter: DEFAULT_INTERPRETER.to_string(),
            capture_timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn with_capture_timeout(mut self, timeout: Duration) -> Self {
        self.capture_timeout = Some(timeout);
        self
    }

    /// Load configuration from environment variables
    ///
    /// Fails with `ConfigurationMissing` when `OPENAI_API_KEY` is unset, blank
    /// or still the `<API_KEY>` placeholder.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = configured_key(&lookup).ok_or_else(|| {
            RuntimeError::ConfigurationMissing(format!(
                "{} is not set (run `tutor config api` or export it)",
                API_KEY_ENV
            ))
        })?;
        Self::new(api_key).apply_vars(&lookup)
    }

    /// For commands that never call the provider: the credential is picked
    /// up when configured but not required. `api_key` is empty otherwise.
    pub fn from_env_without_key() -> Result<Self> {
        Self::from_vars_without_key(|key| std::env::var(key).ok())
    }

    pub fn from_vars_without_key(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::new(configured_key(&lookup).unwrap_or_default()).apply_vars(&lookup)
    }

    fn apply_vars(mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(base_url) = non_empty(lookup, BASE_URL_ENV) {
            self.base_url = Some(base_url);
        }

        if let Some(model) = non_empty(lookup, MODEL_ENV) {
            self.model = model;
        }

        if let Some(temperature) = non_empty(lookup, TEMPERATURE_ENV) {
            self.temperature = parse_number(TEMPERATURE_ENV, &temperature)?;
        }

        if let Some(secs) = non_empty(lookup, REQUEST_TIMEOUT_ENV) {
            self.request_timeout = parse_secs(REQUEST_TIMEOUT_ENV, &secs)?;
        }

        if let Some(interpreter) = non_empty(lookup, INTERPRETER_ENV) {
            self.interpreter = interpreter;
        }

        if let Some(secs) = non_empty(lookup, CAPTURE_TIMEOUT_ENV) {
            self.capture_timeout = Some(parse_secs(CAPTURE_TIMEOUT_ENV, &secs)?);
        }

        Ok(self)
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn masked_api_key(&self) -> String {
        mask_key(&self.api_key)
    }
}

/// Key unless blank or still the placeholder.
fn configured_key(lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
    non_empty(lookup, API_KEY_ENV).filter(|key| key != API_KEY_PLACEHOLDER)
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| RuntimeError::ConfigInvalid(format!("{}={:?} is not a valid number", key, value)))
}

/// Whole seconds, at least one.
fn parse_secs(key: &str, value: &str) -> Result<Duration> {
    match parse_number::<u64>(key, value)? {
        0 => Err(RuntimeError::ConfigInvalid(format!(
            "{}=0 would time out immediately; use at least 1",
            key
        ))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/// First and last four characters only.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}
