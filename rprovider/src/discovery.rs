//! Time-bounded cache of free model ids for the marketplace and
//! low-resource providers.
//!
//! Neither catalog is ever empty: fetch or parse failures degrade to a
//! hardcoded safety list.
//!
//! ```rust
//! use rprovider::discovery::{rank_marketplace_catalog, score_model};
//!
//! let body = r#"{"data":[
//!     {"id":"acme/paid","pricing":{"prompt":"0.001","completion":"0.002"}},
//!     {"id":"meta-llama/llama-3.1-8b-instruct:free","pricing":{"prompt":"0","completion":"0"}},
//!     {"id":"deepseek/deepseek-r1:free","pricing":{"prompt":"0","completion":"0"}}
//! ]}"#;
//!
//! let ranked = rank_marketplace_catalog(body).expect("catalog should parse");
//! assert_eq!(ranked, vec![
//!     "deepseek/deepseek-r1:free".to_string(),
//!     "meta-llama/llama-3.1-8b-instruct:free".to_string(),
//! ]);
//! assert_eq!(score_model("deepseek/deepseek-r1:free"), 16);
//! ```

use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::{HttpRequest, HttpTransport, ProviderError, ReqwestTransport};

pub const MARKETPLACE_SAFETY_MODELS: [&str; 5] = [
    "deepseek/deepseek-r1:free",
    "google/gemini-2.0-flash-lite-preview-02-05:free",
    "meta-llama/llama-3.3-70b-instruct:free",
    "mistralai/mistral-7b-instruct:free",
    "microsoft/phi-3-medium-128k-instruct:free",
];

pub const LOW_RESOURCE_SAFETY_MODELS: [&str; 2] = [
    "HuggingFaceH4/zephyr-7b-beta",
    "mistralai/Mistral-7B-Instruct-v0.3",
];

pub const DEFAULT_MARKETPLACE_CATALOG_URL: &str = "https://openrouter.ai/api/v1/models";
pub const DEFAULT_LOW_RESOURCE_CATALOG_URL: &str = "https://huggingface.co/api/models?pipeline_tag=text-generation&sort=downloads&direction=-1&limit=20";
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_DISCOVERY_DEADLINE: Duration = Duration::from_secs(15);

const EXCLUDED_LOW_RESOURCE_MARKER: &str = "gemma-7b";

const SCORE_KEYWORDS: [(&str, i32); 5] = [
    ("deepseek-r1", 15),
    ("llama-3", 10),
    ("mistral", 8),
    ("gemini", 8),
    ("free", 1),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    /// Both unit prices parsed as exactly zero.
    pub zero_cost: bool,
    pub score: i32,
}

/// Keyword bonus for known strong free-model families.
pub fn score_model(id: &str) -> i32 {
    let id = id.to_ascii_lowercase();
    SCORE_KEYWORDS
        .iter()
        .filter(|(keyword, _)| id.contains(keyword))
        .map(|(_, bonus)| bonus)
        .sum()
}

#[derive(Deserialize)]
struct MarketplaceCatalog {
    #[serde(default)]
    data: Vec<MarketplaceModel>,
}

#[derive(Deserialize)]
struct MarketplaceModel {
    id: String,
    #[serde(default)]
    pricing: Option<MarketplacePricing>,
}

#[derive(Deserialize)]
struct MarketplacePricing {
    #[serde(default)]
    prompt: Option<Value>,
    #[serde(default)]
    completion: Option<Value>,
}

fn is_zero_price(price: Option<&Value>) -> bool {
    let parsed = match price {
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(Value::Number(number)) => number.as_f64(),
        _ => None,
    };
    parsed == Some(0.0)
}

pub fn parse_marketplace_catalog(body: &str) -> Result<Vec<CatalogEntry>, ProviderError> {
    let catalog = serde_json::from_str::<MarketplaceCatalog>(body)?;
    Ok(catalog
        .data
        .into_iter()
        .map(|model| {
            let zero_cost = model.pricing.as_ref().is_some_and(|pricing| {
                is_zero_price(pricing.prompt.as_ref()) && is_zero_price(pricing.completion.as_ref())
            });
            CatalogEntry {
                score: score_model(&model.id),
                id: model.id,
                zero_cost,
            }
        })
        .collect())
}

/// Zero-cost ids, best score first. Ties keep catalog order.
pub fn rank_marketplace_catalog(body: &str) -> Result<Vec<String>, ProviderError> {
    let mut entries = parse_marketplace_catalog(body)?
        .into_iter()
        .filter(|entry| entry.zero_cost)
        .collect::<Vec<_>>();
    entries.sort_by(|left, right| right.score.cmp(&left.score));
    Ok(entries.into_iter().map(|entry| entry.id).collect())
}

#[derive(Deserialize)]
struct LowResourceModel {
    #[serde(default, rename = "modelId", alias = "id")]
    model_id: Option<String>,
}

/// Safety list first, then trending ids minus the known-incompatible one.
pub fn merge_low_resource_catalog(body: &str) -> Result<Vec<String>, ProviderError> {
    let trending = serde_json::from_str::<Vec<LowResourceModel>>(body)?
        .into_iter()
        .filter_map(|model| model.model_id)
        .filter(|id| {
            !id.to_ascii_lowercase()
                .contains(EXCLUDED_LOW_RESOURCE_MARKER)
        });

    let merged = LOW_RESOURCE_SAFETY_MODELS
        .iter()
        .map(|id| id.to_string())
        .chain(trending);
    Ok(rcommon::dedupe_preserving_order(merged))
}

fn safety_list(models: &[&str]) -> Vec<String> {
    models.iter().map(|id| id.to_string()).collect()
}

fn or_safety_list(models: Vec<String>, safety: &[&str]) -> Vec<String> {
    if models.is_empty() {
        safety_list(safety)
    } else {
        models
    }
}

#[derive(Debug, Default)]
struct CatalogSnapshot {
    marketplace: Vec<String>,
    low_resource: Vec<String>,
    refreshed_at: Option<Instant>,
}

/// Process-wide model catalogs with a fixed TTL.
///
/// Concurrent refreshes are not serialized. Each one writes a complete
/// snapshot, so the last writer wins.
pub struct DiscoveryCache {
    state: RwLock<CatalogSnapshot>,
    ttl: Duration,
    deadline: Duration,
    transport: Arc<dyn HttpTransport>,
    marketplace_url: String,
    low_resource_url: String,
}

impl DiscoveryCache {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            state: RwLock::new(CatalogSnapshot::default()),
            ttl: DEFAULT_CACHE_TTL,
            deadline: DEFAULT_DISCOVERY_DEADLINE,
            transport,
            marketplace_url: DEFAULT_MARKETPLACE_CATALOG_URL.to_string(),
            low_resource_url: DEFAULT_LOW_RESOURCE_CATALOG_URL.to_string(),
        }
    }

    /// A cache that already holds fresh catalogs.
    pub fn seeded(
        transport: Arc<dyn HttpTransport>,
        marketplace: Vec<String>,
        low_resource: Vec<String>,
    ) -> Self {
        let cache = Self::new(transport);
        cache.store(marketplace, low_resource);
        cache
    }

    /// Lazily created shared instance backed by [`ReqwestTransport`].
    pub fn global() -> Arc<DiscoveryCache> {
        static GLOBAL: OnceLock<Arc<DiscoveryCache>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| {
            Arc::new(DiscoveryCache::new(Arc::new(ReqwestTransport::default())))
        }))
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_marketplace_url(mut self, url: impl Into<String>) -> Self {
        self.marketplace_url = url.into();
        self
    }

    pub fn with_low_resource_url(mut self, url: impl Into<String>) -> Self {
        self.low_resource_url = url.into();
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn last_refreshed(&self) -> Option<Instant> {
        self.read(|snapshot| snapshot.refreshed_at)
    }

    pub fn is_stale(&self) -> bool {
        self.read(|snapshot| {
            let empty = snapshot.marketplace.is_empty() || snapshot.low_resource.is_empty();
            match snapshot.refreshed_at {
                Some(refreshed_at) => empty || refreshed_at.elapsed() >= self.ttl,
                None => true,
            }
        })
    }

    /// Refreshes both catalogs when empty or older than the TTL. Never fails.
    pub async fn ensure_fresh(&self) {
        if !self.is_stale() {
            return;
        }
        self.refresh().await;
    }

    /// Unconditionally refetches both catalogs concurrently.
    pub async fn refresh(&self) {
        let (marketplace, low_resource) = futures_util::future::join(
            self.fetch_marketplace(),
            self.fetch_low_resource(),
        )
        .await;
        debug!(
            marketplace = marketplace.len(),
            low_resource = low_resource.len(),
            "model catalogs refreshed"
        );
        self.store(marketplace, low_resource);
    }

    /// Ranked marketplace ids; the safety list when nothing was discovered.
    pub fn marketplace_models(&self) -> Vec<String> {
        let models = self.read(|snapshot| snapshot.marketplace.clone());
        or_safety_list(models, &MARKETPLACE_SAFETY_MODELS)
    }

    pub fn low_resource_models(&self) -> Vec<String> {
        let models = self.read(|snapshot| snapshot.low_resource.clone());
        or_safety_list(models, &LOW_RESOURCE_SAFETY_MODELS)
    }

    async fn fetch_marketplace(&self) -> Vec<String> {
        let result = self
            .fetch_body(&self.marketplace_url)
            .await
            .and_then(|body| rank_marketplace_catalog(&body));
        match result {
            Ok(models) if !models.is_empty() => models,
            Ok(_) => {
                warn!(url = %self.marketplace_url, "marketplace catalog has no free models; using safety list");
                safety_list(&MARKETPLACE_SAFETY_MODELS)
            }
            Err(error) => {
                warn!(url = %self.marketplace_url, error = %error, "marketplace catalog fetch failed; using safety list");
                safety_list(&MARKETPLACE_SAFETY_MODELS)
            }
        }
    }

    async fn fetch_low_resource(&self) -> Vec<String> {
        let result = self
            .fetch_body(&self.low_resource_url)
            .await
            .and_then(|body| merge_low_resource_catalog(&body));
        match result {
            Ok(models) => models,
            Err(error) => {
                warn!(url = %self.low_resource_url, error = %error, "low-resource catalog fetch failed; using safety list");
                safety_list(&LOW_RESOURCE_SAFETY_MODELS)
            }
        }
    }

    async fn fetch_body(&self, url: &str) -> Result<String, ProviderError> {
        let response = self
            .transport
            .send(HttpRequest::get(url), self.deadline)
            .await?;
        if !response.is_success() {
            let status = response.status;
            return Err(ProviderError::permanent(format!("catalog request returned {status}"))
                .with_status(status));
        }
        response.text().await
    }

    fn store(&self, marketplace: Vec<String>, low_resource: Vec<String>) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = CatalogSnapshot {
            marketplace,
            low_resource,
            refreshed_at: Some(Instant::now()),
        };
    }

    fn read<T>(&self, view: impl FnOnce(&CatalogSnapshot) -> T) -> T {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        view(&state)
    }
}

impl std::fmt::Debug for DiscoveryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryCache")
            .field("ttl", &self.ttl)
            .field("marketplace_url", &self.marketplace_url)
            .field("low_resource_url", &self.low_resource_url)
            .field("last_refreshed", &self.last_refreshed())
            .finish_non_exhaustive()
    }
}
