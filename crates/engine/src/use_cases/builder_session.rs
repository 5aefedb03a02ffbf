//! Builder session use case - drives one character build and hands the
//! finished character to persistence.

use std::sync::Arc;

use charbldr_domain::{CharacterBuilder, CharacterId, DomainError};

use crate::infrastructure::ports::{CharacterStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Failed to store character: {0}")]
    Store(#[from] StoreError),
}

/// A character build in progress.
///
/// All edits go through [`CharacterBuilder`]; the session only adds the
/// asynchronous hand-off to the store.
pub struct BuilderSession {
    builder: CharacterBuilder,
    store: Arc<dyn CharacterStore>,
}

impl BuilderSession {
    pub fn new(builder: CharacterBuilder, store: Arc<dyn CharacterStore>) -> Self {
        Self { builder, store }
    }

    pub fn builder(&self) -> &CharacterBuilder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut CharacterBuilder {
        &mut self.builder
    }

    /// Finish the build and persist it.
    ///
    /// Fails without touching the store if the build is incomplete, is not at
    /// the confirmation step, or has an unconfirmed change.
    pub async fn generate(&self) -> Result<CharacterId, SessionError> {
        let character = self.builder.finish()?;
        let id = self.store.save(&character).await.map_err(|e| {
            tracing::error!(character_id = %character.id, error = %e, "Failed to store character");
            e
        })?;
        tracing::info!(
            character_id = %id,
            name = %character.name,
            edition = %character.edition,
            level = character.total_level,
            "Character generated"
        );
        Ok(id)
    }
}
