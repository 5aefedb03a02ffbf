//! Loads the rules catalog from a JSON document on disk.

use std::path::Path;

use charbldr_domain::{CatalogData, CatalogError, RulesCatalog};

#[derive(Debug, thiserror::Error)]
pub enum CatalogLoadError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Read and validate a catalog document.
pub async fn load_catalog(path: impl AsRef<Path>) -> Result<RulesCatalog, CatalogLoadError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path).await?;
    let data: CatalogData = serde_json::from_str(&json)?;
    let catalog = RulesCatalog::from_data(data).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Catalog rejected");
        e
    })?;

    tracing::info!(
        path = %path.display(),
        editions = catalog.editions().len(),
        classes = catalog.classes().len(),
        races = catalog.races().len(),
        spells = catalog.spells().len(),
        equipment = catalog.equipment_items().len(),
        "Rules catalog loaded"
    );
    Ok(catalog)
}
