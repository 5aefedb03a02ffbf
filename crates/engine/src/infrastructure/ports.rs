//! Port traits for infrastructure boundaries.
//!
//! Persistence is the only external collaborator: the builder produces a
//! finished character and hands it to a store.

use async_trait::async_trait;
use charbldr_domain::{CharacterId, CompletedCharacter};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Not found")]
    NotFound,
    #[error("Storage error: {0}")]
    Storage(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Insert or replace a character, keyed by its id.
    async fn save(&self, character: &CompletedCharacter) -> Result<CharacterId, StoreError>;
    async fn get(&self, id: CharacterId) -> Result<Option<CompletedCharacter>, StoreError>;
}
