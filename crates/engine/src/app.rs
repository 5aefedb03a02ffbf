//! Application state and composition.

use std::sync::Arc;

use charbldr_domain::{
    BuilderMode, BuilderOverrides, CharacterBuilder, DomainError, EquipmentEditionResolver,
    RuleSet, RulesCatalog,
};

use crate::infrastructure::ports::CharacterStore;
use crate::use_cases::BuilderSession;

/// Main application state.
///
/// Catalog and rule set are shared read-only by every session.
pub struct App {
    pub catalog: Arc<RulesCatalog>,
    pub rules: Arc<RuleSet>,
    pub equipment_editions: Arc<dyn EquipmentEditionResolver>,
    pub store: Arc<dyn CharacterStore>,
}

impl App {
    pub fn new(
        catalog: RulesCatalog,
        equipment_editions: Arc<dyn EquipmentEditionResolver>,
        store: Arc<dyn CharacterStore>,
    ) -> Self {
        let rules = RuleSet::standard();
        tracing::debug!(rules = rules.len(), "Invalidation rules registered");
        Self {
            catalog: Arc::new(catalog),
            rules: Arc::new(rules),
            equipment_editions,
            store,
        }
    }

    /// Start a character build.
    pub fn open_session(
        &self,
        mode: BuilderMode,
        overrides: BuilderOverrides,
    ) -> Result<BuilderSession, DomainError> {
        let builder = CharacterBuilder::open(
            self.catalog.clone(),
            self.rules.clone(),
            self.equipment_editions.clone(),
            mode,
            overrides,
        )?;
        Ok(BuilderSession::new(builder, self.store.clone()))
    }

    /// One line per edition: races, classes and level cap.
    pub fn catalog_summary(&self) -> Vec<String> {
        self.catalog
            .editions()
            .iter()
            .map(|edition| {
                format!(
                    "{} ({}): {} races, {} classes, max level {}, {} class(es) per character",
                    edition.name,
                    edition.id,
                    edition.races.len(),
                    edition.classes.len(),
                    edition.max_level,
                    edition.multiclassing.max_classes()
                )
            })
            .collect()
    }
}
