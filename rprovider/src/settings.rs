//! User-owned routing configuration: provider preference, credential lists,
//! and the custom endpoint triple.
//!
//! ```rust
//! use rprovider::{ProviderPreference, Settings};
//!
//! let settings = Settings::from_json_str(
//!     r#"{"provider":"openrouter","openRouterApiKeys":["k1","k2"],"openRouterKeyIndex":7}"#,
//! )
//! .expect("settings should parse");
//!
//! assert_eq!(settings.provider, ProviderPreference::OpenRouter);
//! assert_eq!(settings.open_router.current_index(), 1);
//! assert!(!settings.custom.is_configured());
//! ```

use serde::Deserialize;

use crate::{CredentialList, ProviderError, ProviderKind, SecretString};

pub const DEFAULT_CUSTOM_API_KEY: &str = "dummy-key";
pub const DEFAULT_CUSTOM_MODEL: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPreference {
    #[default]
    Auto,
    Gemini,
    OpenRouter,
    HuggingFace,
    Hybrid,
    Custom,
}

impl ProviderPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Gemini => "gemini",
            Self::OpenRouter => "openrouter",
            Self::HuggingFace => "huggingface",
            Self::Hybrid => "hybrid",
            Self::Custom => "custom",
        }
    }

    /// The single provider this preference pins, if any.
    pub fn pinned_provider(self) -> Option<ProviderKind> {
        match self {
            Self::Gemini => Some(ProviderKind::Gemini),
            Self::OpenRouter => Some(ProviderKind::OpenRouter),
            Self::HuggingFace => Some(ProviderKind::HuggingFace),
            Self::Custom => Some(ProviderKind::Custom),
            Self::Auto | Self::Hybrid => None,
        }
    }
}

impl std::str::FromStr for ProviderPreference {
    type Err = ProviderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "gemini" => Ok(Self::Gemini),
            "openrouter" => Ok(Self::OpenRouter),
            "huggingface" => Ok(Self::HuggingFace),
            "hybrid" => Ok(Self::Hybrid),
            "custom" => Ok(Self::Custom),
            other => Err(ProviderError::invalid_request(format!(
                "unknown provider preference '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for ProviderPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user-supplied OpenAI-compatible endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomEndpoint {
    pub base_url: Option<String>,
    pub api_key: Option<SecretString>,
    pub model_name: Option<String>,
}

impl CustomEndpoint {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::new(api_key));
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn is_configured(&self) -> bool {
        self.base_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// `{base_url}/chat/completions` with any trailing slashes removed first.
    pub fn completions_url(&self) -> Option<String> {
        let base = self.base_url.as_deref()?.trim();
        if base.is_empty() {
            return None;
        }

        Some(format!("{}/chat/completions", base.trim_end_matches('/')))
    }

    pub fn api_key_or_default(&self) -> SecretString {
        match &self.api_key {
            Some(key) if !key.expose().trim().is_empty() => key.clone(),
            _ => SecretString::new(DEFAULT_CUSTOM_API_KEY),
        }
    }

    pub fn model_or_default(&self) -> &str {
        match self.model_name.as_deref() {
            Some(model) if !model.trim().is_empty() => model,
            _ => DEFAULT_CUSTOM_MODEL,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "SettingsRecord")]
pub struct Settings {
    pub provider: ProviderPreference,
    pub open_router: CredentialList,
    pub hugging_face: CredentialList,
    pub custom: CustomEndpoint,
    pub deep_reasoning: bool,
}

impl Settings {
    pub fn new(provider: ProviderPreference) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Parses the persisted camelCase settings document, clamping rotation indices.
    pub fn from_json_str(input: &str) -> Result<Self, ProviderError> {
        serde_json::from_str(input)
            .map_err(|err| ProviderError::invalid_request(format!("invalid settings: {err}")))
    }

    pub fn with_provider(mut self, provider: ProviderPreference) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_open_router(mut self, keys: CredentialList) -> Self {
        self.open_router = keys;
        self
    }

    pub fn with_hugging_face(mut self, keys: CredentialList) -> Self {
        self.hugging_face = keys;
        self
    }

    pub fn with_custom_endpoint(mut self, custom: CustomEndpoint) -> Self {
        self.custom = custom;
        self
    }

    pub fn enable_deep_reasoning(mut self) -> Self {
        self.deep_reasoning = true;
        self
    }

    pub fn credentials_for(&self, provider: ProviderKind) -> Option<&CredentialList> {
        match provider {
            ProviderKind::OpenRouter => Some(&self.open_router),
            ProviderKind::HuggingFace => Some(&self.hugging_face),
            ProviderKind::Gemini | ProviderKind::Custom => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SettingsRecord {
    provider: ProviderPreference,
    open_router_api_keys: Vec<String>,
    open_router_key_index: usize,
    hugging_face_api_keys: Vec<String>,
    hugging_face_key_index: usize,
    custom_base_url: Option<String>,
    custom_api_key: Option<String>,
    custom_model_name: Option<String>,
    is_complex_task_mode: bool,
}

impl From<SettingsRecord> for Settings {
    fn from(record: SettingsRecord) -> Self {
        Self {
            provider: record.provider,
            open_router: CredentialList::new(record.open_router_api_keys)
                .with_current_index(record.open_router_key_index),
            hugging_face: CredentialList::new(record.hugging_face_api_keys)
                .with_current_index(record.hugging_face_key_index),
            custom: CustomEndpoint {
                base_url: non_blank(record.custom_base_url),
                api_key: non_blank(record.custom_api_key).map(SecretString::new),
                model_name: non_blank(record.custom_model_name),
            },
            deep_reasoning: record.is_complex_task_mode,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
