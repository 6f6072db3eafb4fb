use crate::analysis::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};
use url::Url;

pub const DEFAULT_STT_URL: &str = "http://localhost:5001/inference";
pub const DEFAULT_TTS_URL: &str = "http://localhost:5003/api/tts";
pub const DEFAULT_LANGUAGE: &str = "nl";
pub const DEFAULT_SPEAKER_ID: &str = "p225";
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const ENV_GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const ENV_STT_URL: &str = "BASSBOT_STT_URL";
pub const ENV_TTS_URL: &str = "BASSBOT_TTS_URL";

/// Standing instructions prepended to every chat prompt. The replies are
/// rendered through TTS, so no markup.
pub const PERSONA_INSTRUCTIONS: &str = "\
You are a helpful, English-speaking assistant.
Answer the user's question briefly, clearly, and concisely.
Don't use markdown or special formatting.
Your answers are meant to be rendered via speech.
You are also a fish.
You are friendly, but also a bit sarcastic and humorous.
You can also be a bit silly, but not too much.";

/// A validated absolute URL for one of the local speech services.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceUrl(Url);

impl ServiceUrl {
    pub fn new<S: AsRef<str>>(value: S) -> Result<Self, ConfigError> {
        Ok(Self(Url::parse(value.as_ref())?))
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ConfigError> {
        let v = value.into();
        if v.trim().is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(v))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(**redacted**)")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub stt_url: ServiceUrl,
    pub tts_url: ServiceUrl,
    pub google_api_key: Option<ApiKey>,
    pub language: String,
    pub speaker_id: String,
    pub output_dir: PathBuf,
    pub analyzer: AnalyzerConfig,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("api key must not be empty")]
    EmptyApiKey,
    #[error("invalid service url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub trait Env {
    fn var(&self, key: &str) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct StdEnv;

impl Env for StdEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

#[derive(Clone, Debug, Default)]
pub struct MapEnv {
    vars: std::collections::BTreeMap<String, String>,
}

impl MapEnv {
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl Env for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

pub fn resolve_api_key(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
) -> Result<Option<ApiKey>, ConfigError> {
    match cli_value {
        Some(v) => Ok(Some(ApiKey::new(v)?)),
        None => match env.var(env_key) {
            Some(v) => Ok(Some(ApiKey::new(v)?)),
            None => Ok(None),
        },
    }
}

pub fn resolve_string_with_default(
    cli_value: Option<String>,
    env_key: &str,
    env: &impl Env,
    default: &str,
) -> String {
    match cli_value {
        Some(v) => v,
        None => env.var(env_key).unwrap_or_else(|| default.to_owned()),
    }
}
