#[cfg(feature = "openai-compat")]
pub mod openai;

#[cfg(feature = "provider-openrouter")]
pub mod openrouter;

#[cfg(feature = "provider-custom")]
pub mod custom;

#[cfg(feature = "provider-gemini")]
pub mod gemini;

#[cfg(feature = "provider-huggingface")]
pub mod huggingface;
