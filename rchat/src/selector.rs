//! Ordered provider attempt lists derived from settings.
//!
//! ```rust
//! use rchat::{ProviderPlan, SelectorInput, plan_providers};
//! use rprovider::{ProviderKind, ProviderPreference};
//!
//! let plan = plan_providers(SelectorInput::new(ProviderPreference::OpenRouter).with_custom_configured(true));
//! assert_eq!(
//!     plan,
//!     ProviderPlan::Sequence(vec![ProviderKind::OpenRouter, ProviderKind::Gemini, ProviderKind::Custom])
//! );
//! ```

use rcommon::dedupe_preserving_order;
use rprovider::{ProviderKind, ProviderPreference, Settings};

/// What the executor should do for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderPlan {
    /// Run the hybrid synthesizer instead of a sequential walk.
    Hybrid,
    /// Try each provider in order; never empty.
    Sequence(Vec<ProviderKind>),
}

impl ProviderPlan {
    pub fn providers(&self) -> &[ProviderKind] {
        match self {
            Self::Hybrid => &[],
            Self::Sequence(providers) => providers,
        }
    }
}

/// The configuration facts the selector reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorInput {
    pub preference: ProviderPreference,
    pub custom_configured: bool,
    pub marketplace_keyed: bool,
    pub low_resource_keyed: bool,
}

impl SelectorInput {
    pub fn new(preference: ProviderPreference) -> Self {
        Self {
            preference,
            custom_configured: false,
            marketplace_keyed: false,
            low_resource_keyed: false,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            preference: settings.provider,
            custom_configured: settings.custom.is_configured(),
            marketplace_keyed: !settings.open_router.is_empty(),
            low_resource_keyed: !settings.hugging_face.is_empty(),
        }
    }

    pub fn with_custom_configured(mut self, configured: bool) -> Self {
        self.custom_configured = configured;
        self
    }

    pub fn with_marketplace_keyed(mut self, keyed: bool) -> Self {
        self.marketplace_keyed = keyed;
        self
    }

    pub fn with_low_resource_keyed(mut self, keyed: bool) -> Self {
        self.low_resource_keyed = keyed;
        self
    }
}

pub fn plan_providers(input: SelectorInput) -> ProviderPlan {
    let mut providers = Vec::with_capacity(4);

    match input.preference {
        ProviderPreference::Hybrid => return ProviderPlan::Hybrid,
        ProviderPreference::Auto => {
            if input.custom_configured {
                providers.push(ProviderKind::Custom);
            }
            providers.push(ProviderKind::Gemini);
            if input.marketplace_keyed {
                providers.push(ProviderKind::OpenRouter);
            }
            if input.low_resource_keyed {
                providers.push(ProviderKind::HuggingFace);
            }
        }
        pinned => {
            if let Some(provider) = pinned.pinned_provider() {
                providers.push(provider);
            }
            providers.push(ProviderKind::Gemini);
            if input.custom_configured {
                providers.push(ProviderKind::Custom);
            }
        }
    }

    ProviderPlan::Sequence(dedupe_preserving_order(providers))
}

pub fn plan_for_settings(settings: &Settings) -> ProviderPlan {
    plan_providers(SelectorInput::from_settings(settings))
}
