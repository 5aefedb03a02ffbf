//! Engine configuration

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use charbldr_domain::BucketMap;

const DEFAULT_CATALOG_PATH: &str = "crates/domain/src/catalog/sample_catalog.json";
const DEFAULT_LOG_FILTER: &str = "charbldr_engine=info,charbldr_domain=info";

/// Engine configuration loaded from environment
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Rules catalog JSON document
    pub catalog_path: PathBuf,
    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
    /// Editions that read another edition's equipment table
    pub equipment_buckets: BucketMap,
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let equipment_buckets = match env::var("CHARBLDR_EQUIPMENT_BUCKETS") {
            Ok(raw) => parse_bucket_map(&raw)
                .context("CHARBLDR_EQUIPMENT_BUCKETS must be a list of edition=bucket pairs")?,
            Err(_) => BucketMap::new(),
        };

        Ok(Self {
            catalog_path: env::var("CHARBLDR_CATALOG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CATALOG_PATH)),
            log_filter: env::var("CHARBLDR_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string()),
            equipment_buckets,
        })
    }
}

/// Parse `"odnd=basic, basic=basic"` into a bucket map. Blank entries are skipped.
pub fn parse_bucket_map(raw: &str) -> Result<BucketMap> {
    let mut map = BucketMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let Some((edition, bucket)) = entry.split_once('=') else {
            bail!("missing '=' in {entry:?}");
        };
        let (edition, bucket) = (edition.trim(), bucket.trim());
        if edition.is_empty() || bucket.is_empty() {
            bail!("empty edition or bucket in {entry:?}");
        }
        map = map.with(edition, bucket);
    }
    Ok(map)
}
