use serde::{Deserialize, Serialize};

use crate::domain::ItemDraft;

pub const ITEMS_PATH: &str = "/api/items";

/// Body of `POST /api/items` and `PUT /api/items/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub name: String,
    pub description: String,
}

impl From<&ItemDraft> for ItemPayload {
    fn from(draft: &ItemDraft) -> Self {
        Self {
            name: draft.name.clone(),
            description: draft.description.clone(),
        }
    }
}
