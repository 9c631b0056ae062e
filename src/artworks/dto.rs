use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo_types::Artwork,
    tags::{display_tags, CardTags},
};
use crate::{
    comments::dto::CommentView,
    gallery::TagChip,
    users::dto::{AuthorSummary, SessionView},
};

/// Artwork as shown in a gallery or listing grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkCard {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub tags: CardTags,
    pub author: Option<AuthorSummary>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl ArtworkCard {
    pub fn new(artwork: &Artwork, author: Option<AuthorSummary>) -> Self {
        Self {
            id: artwork.id,
            title: artwork.title.clone(),
            description: artwork.description.clone(),
            image_url: artwork.image_url.clone(),
            tags: display_tags(&artwork.tags),
            author,
            created_at: artwork.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    #[serde(default)]
    pub tag: Vec<String>,
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryPage {
    #[serde(flatten)]
    pub session: SessionView,
    pub active_tags: Vec<String>,
    pub tag_query: String,
    pub chips: Vec<TagChip>,
    pub artworks: Vec<ArtworkCard>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkPage {
    #[serde(flatten)]
    pub session: SessionView,
    pub artwork: Artwork,
    pub author: Option<AuthorSummary>,
    pub comments: Vec<CommentView>,
    pub is_own_artwork: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddArtworkPage {
    #[serde(flatten)]
    pub session: SessionView,
    pub description_max: usize,
    pub max_tags: usize,
    pub max_tag_chars: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOption {
    #[default]
    Date,
    Title,
}

#[derive(Debug, Deserialize)]
pub struct ManageQuery {
    #[serde(default)]
    pub sort: SortOption,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagePage {
    #[serde(flatten)]
    pub session: SessionView,
    pub sort: SortOption,
    pub artworks: Vec<Artwork>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateArtworkRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArtworkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<Vec<String>>,
}
