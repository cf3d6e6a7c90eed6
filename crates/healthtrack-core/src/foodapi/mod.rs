//! Open Food Facts client.
//!
//! Barcode lookups and name searches with an in-memory TTL cache. Requests
//! use a fixed timeout and are never retried.

mod cache;
mod product;

pub use cache::TtlCache;
pub use product::{nutrient_value, parse_product};

use std::sync::Mutex;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::{ApiError, ConfigError, Result};
use crate::nutrition::{nutrition_grade, FoodItem, Grade};
use crate::storage::FoodApiConfig;

const SERVICE: &str = "openfoodfacts";

#[derive(Debug, Clone)]
enum Cached {
    Product(FoodItem),
    Search(Vec<FoodItem>),
}

pub struct FoodApiClient {
    http: Client,
    base: Url,
    page_size: u32,
    cache: Mutex<TtlCache<Cached>>,
}

impl FoodApiClient {
    pub fn new(config: &FoodApiConfig) -> Result<Self> {
        let base = parse_base(&config.base_url)?;
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::from)?;
        Ok(Self {
            http,
            base,
            page_size: config.search_page_size,
            cache: Mutex::new(TtlCache::new(config.cache_ttl())),
        })
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn endpoint(&self, path: &str) -> std::result::Result<Url, ApiError> {
        self.base.join(path).map_err(|e| ApiError::BadResponse {
            service: SERVICE,
            message: format!("bad endpoint '{path}': {e}"),
        })
    }

    fn cached(&self, key: &str) -> Option<Cached> {
        self.cache.lock().ok()?.get(key)
    }

    fn remember(&self, key: String, value: Cached) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, value);
        }
    }

    /// Look up a product by barcode. `Ok(None)` when the database does not
    /// know it.
    pub async fn lookup_barcode(&self, barcode: &str) -> std::result::Result<Option<FoodItem>, ApiError> {
        let barcode = barcode.trim();
        let key = format!("barcode_{barcode}");
        if let Some(Cached::Product(item)) = self.cached(&key) {
            debug!(barcode, "barcode cache hit");
            return Ok(Some(item));
        }

        let url = self.endpoint(&format!("api/v0/product/{}.json", urlencoding::encode(barcode)))?;
        let body = self.get_json(url, &[]).await?;

        if body.get("status").and_then(Value::as_i64) != Some(1) {
            info!(barcode, "product not found");
            return Ok(None);
        }
        let product = body.get("product").unwrap_or(&Value::Null);
        let item = parse_product(product);
        self.remember(key, Cached::Product(item.clone()));
        Ok(Some(item))
    }

    /// Search products by name, at most `limit` results.
    pub async fn search(&self, query: &str, limit: u32) -> std::result::Result<Vec<FoodItem>, ApiError> {
        let key = format!("search_{query}_{limit}");
        if let Some(Cached::Search(items)) = self.cached(&key) {
            debug!(query, "search cache hit");
            return Ok(items);
        }

        let url = self.endpoint("cgi/search.pl")?;
        let limit_str = limit.to_string();
        let params = [
            ("search_terms", query),
            ("json", "1"),
            ("page_size", limit_str.as_str()),
            ("fields", product::SEARCH_FIELDS),
        ];
        let body = self.get_json(url, &params).await?;

        let items: Vec<FoodItem> = body
            .get("products")
            .and_then(Value::as_array)
            .map(|products| products.iter().take(limit as usize).map(parse_product).collect())
            .unwrap_or_default();
        info!(query, results = items.len(), "food search");
        self.remember(key, Cached::Search(items.clone()));
        Ok(items)
    }

    async fn get_json(&self, url: Url, params: &[(&str, &str)]) -> std::result::Result<Value, ApiError> {
        let resp = self.http.get(url).query(params).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }
        resp.json().await.map_err(|e| ApiError::BadResponse {
            service: SERVICE,
            message: e.to_string(),
        })
    }

    pub fn grade(item: &FoodItem) -> Grade {
        nutrition_grade(&item.per_100g)
    }

    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

/// Base URL with a trailing slash so relative joins keep its path.
fn parse_base(raw: &str) -> Result<Url> {
    let mut normalized = raw.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Url::parse(&normalized).map_err(|e| {
        ConfigError::InvalidValue {
            key: "food_api.base_url".into(),
            message: e.to_string(),
        }
        .into()
    })
}
