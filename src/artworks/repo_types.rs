use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Artwork post. `user_id` is the owner; it is not a storage-level foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewArtwork {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ArtworkPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl ArtworkPatch {
    pub(crate) fn apply(self, artwork: &mut Artwork) {
        if let Some(v) = self.title {
            artwork.title = v;
        }
        if let Some(v) = self.description {
            artwork.description = v;
        }
        if let Some(v) = self.image_url {
            artwork.image_url = v;
        }
        if let Some(v) = self.tags {
            artwork.tags = v;
        }
    }
}
