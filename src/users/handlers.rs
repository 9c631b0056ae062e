use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        AuthorSummary, ChangePasswordRequest, ProfilePage, ProfileQuery, PublicUser,
        SessionView, SettingsPage, UpdateProfileRequest,
    },
    repo_types::UserPatch,
};
use crate::{
    artworks::dto::ArtworkCard,
    auth::{
        password::{hash_password, verify_password},
        session::{CurrentUser, MaybeUser},
    },
    error::{AppError, AppResult},
    state::AppState,
    validation::{self, validate_bio, validate_password, validate_username},
};

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile_page))
        .route("/settings", get(settings_page))
}

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/api/settings/profile", put(update_profile))
        .route("/api/settings/password", put(change_password))
        .route("/api/settings/avatar", delete(remove_avatar))
}

#[instrument(skip(state, viewer))]
pub async fn profile_page(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(q): Query<ProfileQuery>,
) -> AppResult<Json<ProfilePage>> {
    let owner_id = q.user_id.as_deref().and_then(|s| Uuid::parse_str(s).ok());

    let profile_owner = match owner_id {
        Some(id) => state.users.get(id).await?,
        None => None,
    };

    let artworks = match &profile_owner {
        Some(owner) => {
            let author = AuthorSummary::from(owner);
            state
                .artworks
                .list_by_owner(owner.id)
                .await?
                .iter()
                .map(|a| ArtworkCard::new(a, Some(author.clone())))
                .collect()
        }
        None => Vec::new(),
    };

    let is_own_profile = matches!(
        (&viewer, &profile_owner),
        (Some(v), Some(o)) if v.id == o.id
    );

    Ok(Json(ProfilePage {
        session: SessionView::new(viewer.as_ref()),
        profile_owner: profile_owner.as_ref().map(PublicUser::from),
        is_own_profile,
        artworks,
    }))
}

#[instrument(skip(viewer))]
pub async fn settings_page(MaybeUser(viewer): MaybeUser) -> Response {
    let Some(user) = viewer else {
        return Redirect::to("/").into_response();
    };
    Json(SettingsPage {
        username: user.username.clone(),
        avatar_url: user.avatar_url.clone(),
        bio: user.bio.clone(),
        bio_max: validation::TEXT_MAX,
        session: SessionView::new(Some(&user)),
    })
    .into_response()
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<PublicUser>> {
    let username = payload.username.trim().to_string();
    validate_username(&username)?;
    validate_bio(&payload.bio)?;

    let avatar_url = match payload.avatar_url.trim() {
        "" => state.config.default_avatar_url.clone(),
        url => url.to_string(),
    };

    let patch = UserPatch {
        username: Some(username),
        avatar_url: Some(avatar_url),
        bio: Some(payload.bio),
        ..Default::default()
    };
    let updated = state
        .users
        .update(user.id, patch)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    info!("profile updated");
    Ok(Json(PublicUser::from(&updated)))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    validate_password(&payload.new_password)?;

    if !verify_password(&payload.current_password, &user.password_hash)? {
        warn!("password change with wrong current password");
        return Err(AppError::validation("Current password is incorrect"));
    }

    let patch = UserPatch {
        password_hash: Some(hash_password(&payload.new_password)?),
        ..Default::default()
    };
    state
        .users
        .update(user.id, patch)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    info!("password changed");
    Ok(Json(serde_json::json!({ "message": "Password changed" })))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<PublicUser>> {
    let patch = UserPatch {
        avatar_url: Some(state.config.default_avatar_url.clone()),
        ..Default::default()
    };
    let updated = state
        .users
        .update(user.id, patch)
        .await?
        .ok_or(AppError::NotFound("user"))?;

    info!("avatar reset to default");
    Ok(Json(PublicUser::from(&updated)))
}
