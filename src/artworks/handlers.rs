use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, patch, post},
    Json, Router,
};
use axum_extra::extract::Query as MultiQuery;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{
        AddArtworkPage, ArtworkCard, ArtworkPage, CreateArtworkRequest, GalleryPage, GalleryQuery,
        ManagePage, ManageQuery, UpdateArtworkRequest,
    },
    repo_types::{Artwork, ArtworkPatch, NewArtwork},
    services::{ensure_owner, is_own_artwork, sort_artworks},
    tags::{collect_tags, TagForm, MAX_TAGS, MAX_TAG_CHARS},
};
use crate::{
    auth::session::{CurrentUser, MaybeUser},
    comments::services::comment_views,
    error::{AppError, AppResult},
    gallery::{apply_filter, dedup_selection, tag_chips},
    state::AppState,
    users::{
        dto::{AuthorSummary, SessionView},
        services::author_index,
    },
    validation::{require_fields, validate_description, TEXT_MAX},
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(gallery_page))
        .route("/artworks/:id", get(artwork_page))
        .route("/add-artwork", get(add_artwork_page))
        .route("/manage-artworks", get(manage_page))
}

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/api/artworks", post(create_artwork))
        .route(
            "/api/artworks/:id",
            patch(update_artwork).delete(delete_artwork),
        )
}

#[instrument(skip(state, viewer))]
pub async fn gallery_page(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    MultiQuery(q): MultiQuery<GalleryQuery>,
) -> AppResult<Json<GalleryPage>> {
    let all = state.artworks.list_all().await?;
    let active = dedup_selection(q.tag);

    let visible = apply_filter(&all, &active);
    let owner_ids: Vec<Uuid> = visible.iter().map(|a| a.user_id).collect();
    let authors = author_index(state.users.as_ref(), &owner_ids).await?;
    let artworks = visible
        .iter()
        .map(|a| ArtworkCard::new(a, authors.get(&a.user_id).cloned()))
        .collect();

    Ok(Json(GalleryPage {
        session: SessionView::new(viewer.as_ref()),
        chips: tag_chips(&all, &active, &q.q),
        active_tags: active,
        tag_query: q.q,
        artworks,
    }))
}

#[instrument(skip(state, viewer))]
pub async fn artwork_page(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ArtworkPage>> {
    let artwork = state
        .artworks
        .get(id)
        .await?
        .ok_or(AppError::NotFound("artwork"))?;

    let author = state.users.get(artwork.user_id).await?;
    let comments = state.comments.list_by_artwork(id).await?;
    let comments = comment_views(state.users.as_ref(), comments, viewer.as_ref()).await?;

    Ok(Json(ArtworkPage {
        session: SessionView::new(viewer.as_ref()),
        is_own_artwork: is_own_artwork(viewer.as_ref(), &artwork),
        author: author.as_ref().map(AuthorSummary::from),
        artwork,
        comments,
    }))
}

#[instrument(skip(viewer))]
pub async fn add_artwork_page(MaybeUser(viewer): MaybeUser) -> Response {
    let Some(user) = viewer else {
        return Redirect::to("/").into_response();
    };
    Json(AddArtworkPage {
        session: SessionView::new(Some(&user)),
        description_max: TEXT_MAX,
        max_tags: MAX_TAGS,
        max_tag_chars: MAX_TAG_CHARS,
    })
    .into_response()
}

#[instrument(skip(state, viewer))]
pub async fn manage_page(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(q): Query<ManageQuery>,
) -> AppResult<Json<ManagePage>> {
    let mut artworks = match &viewer {
        Some(user) => state.artworks.list_by_owner(user.id).await?,
        None => Vec::new(),
    };
    sort_artworks(&mut artworks, q.sort);

    Ok(Json(ManagePage {
        session: SessionView::new(viewer.as_ref()),
        sort: q.sort,
        artworks,
    }))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_artwork(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<CreateArtworkRequest>,
) -> AppResult<Response> {
    let title = payload.title.trim().to_string();
    let image_url = payload.image_url.trim().to_string();
    require_fields(&[&title, &payload.description, &image_url])
        .map_err(|_| AppError::validation("Please fill in all required fields"))?;
    validate_description(&payload.description)?;

    let new = NewArtwork {
        user_id: user.id,
        title,
        description: payload.description,
        image_url,
        tags: collect_tags(&payload.tags, TagForm::Submission),
    };
    let artwork = state.artworks.insert(new).await?;

    info!(artwork_id = %artwork.id, tags = artwork.tags.len(), "artwork created");
    let location = format!("/artworks/{}", artwork.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(artwork),
    )
        .into_response())
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_artwork(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateArtworkRequest>,
) -> AppResult<Json<Artwork>> {
    let artwork = state
        .artworks
        .get(id)
        .await?
        .ok_or(AppError::NotFound("artwork"))?;
    ensure_owner(&user, &artwork)?;

    let patch = edit_patch(payload)?;
    let updated = state
        .artworks
        .update(id, patch)
        .await?
        .ok_or(AppError::NotFound("artwork"))?;

    info!(artwork_id = %id, "artwork updated");
    Ok(Json(updated))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_artwork(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let artwork = state
        .artworks
        .get(id)
        .await?
        .ok_or(AppError::NotFound("artwork"))?;
    ensure_owner(&user, &artwork)?;

    state.artworks.delete(id).await?;
    info!(artwork_id = %id, "artwork deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn edit_patch(payload: UpdateArtworkRequest) -> AppResult<ArtworkPatch> {
    let title = payload.title.map(|t| t.trim().to_string());
    let image_url = payload.image_url.map(|u| u.trim().to_string());
    let blank = |v: Option<&str>| v.is_some_and(|v| v.trim().is_empty());
    if blank(title.as_deref())
        || blank(image_url.as_deref())
        || blank(payload.description.as_deref())
    {
        return Err(AppError::validation("Please fill in all required fields"));
    }
    if let Some(description) = &payload.description {
        validate_description(description)?;
    }

    Ok(ArtworkPatch {
        title,
        description: payload.description,
        image_url,
        tags: payload.tags.map(|t| collect_tags(&t, TagForm::Edit)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send>(_: &T) {}

    #[test]
    fn page_handler_futures_are_send() {
        let state = AppState::fake();
        let gallery = gallery_page(
            State(state.clone()),
            MaybeUser(None),
            MultiQuery(GalleryQuery {
                tag: vec!["oil".into()],
                q: String::new(),
            }),
        );
        assert_send(&gallery);
        let page = artwork_page(State(state), MaybeUser(None), Path(Uuid::new_v4()));
        assert_send(&page);
    }

    #[test]
    fn edit_patch_keeps_absent_fields_and_replays_tags() {
        let patch = edit_patch(UpdateArtworkRequest {
            title: Some("  Dusk ".into()),
            tags: Some(vec!["Oil".into(), "oil".into(), "Oil".into()]),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.title.as_deref(), Some("Dusk"));
        assert!(patch.description.is_none());
        assert!(patch.image_url.is_none());
        assert_eq!(patch.tags, Some(vec!["Oil".to_string(), "oil".to_string()]));
    }

    #[test]
    fn edit_patch_rejects_blank_required_fields() {
        let blank_title = UpdateArtworkRequest {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(edit_patch(blank_title), Err(AppError::Validation(_))));

        let blank_description = UpdateArtworkRequest {
            description: Some(" ".into()),
            ..Default::default()
        };
        assert!(matches!(edit_patch(blank_description), Err(AppError::Validation(_))));

        let long = UpdateArtworkRequest {
            description: Some("x".repeat(TEXT_MAX + 1)),
            ..Default::default()
        };
        assert!(matches!(edit_patch(long), Err(AppError::Validation(_))));
    }
}
