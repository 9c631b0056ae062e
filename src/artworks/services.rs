use super::{dto::SortOption, repo_types::Artwork};
use crate::{
    error::{AppError, AppResult},
    users::repo_types::User,
};

/// Owner controls are shown only when the viewer created the artwork. Roles play no part.
pub fn is_own_artwork(viewer: Option<&User>, artwork: &Artwork) -> bool {
    viewer.is_some_and(|u| u.id == artwork.user_id)
}

pub fn ensure_owner(user: &User, artwork: &Artwork) -> AppResult<()> {
    if is_own_artwork(Some(user), artwork) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

pub fn sort_artworks(list: &mut [Artwork], sort: SortOption) {
    match sort {
        SortOption::Date => list.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::Title => list.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then_with(|| a.title.cmp(&b.title))
        }),
    }
}
