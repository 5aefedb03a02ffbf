use serde::{Deserialize, Serialize};

use crate::ids::RaceId;

/// A playable race. Which editions offer it is decided by the edition allow-lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: RaceId,
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub speed: Option<u32>,
}
