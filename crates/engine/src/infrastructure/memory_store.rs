//! In-process character store.

use std::collections::HashMap;

use async_trait::async_trait;
use charbldr_domain::{CharacterId, CompletedCharacter};
use tokio::sync::RwLock;

use super::ports::{CharacterStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryCharacterStore {
    characters: RwLock<HashMap<CharacterId, CompletedCharacter>>,
}

impl InMemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.characters.read().await.len()
    }
}

#[async_trait]
impl CharacterStore for InMemoryCharacterStore {
    async fn save(&self, character: &CompletedCharacter) -> Result<CharacterId, StoreError> {
        let replaced = self
            .characters
            .write()
            .await
            .insert(character.id, character.clone())
            .is_some();
        tracing::debug!(character_id = %character.id, replaced, "Character stored");
        Ok(character.id)
    }

    async fn get(&self, id: CharacterId) -> Result<Option<CompletedCharacter>, StoreError> {
        Ok(self.characters.read().await.get(&id).cloned())
    }
}
