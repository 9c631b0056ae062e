use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CommentView, CreateCommentRequest},
    repo_types::NewComment,
    services::{comment_views, ensure_author, single_view},
};
use crate::{
    auth::session::{CurrentUser, MaybeUser},
    error::{AppError, AppResult},
    state::AppState,
    validation::validate_comment,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/artworks/:id/comments",
            get(list_comments).post(add_comment),
        )
        .route("/api/comments/:id", delete(delete_comment))
}

#[instrument(skip(state, viewer))]
pub async fn list_comments(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(artwork_id): Path<Uuid>,
) -> AppResult<Json<Vec<CommentView>>> {
    let comments = state.comments.list_by_artwork(artwork_id).await?;
    let views = comment_views(state.users.as_ref(), comments, viewer.as_ref()).await?;
    Ok(Json(views))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(artwork_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> AppResult<(StatusCode, Json<CommentView>)> {
    validate_comment(&payload.content)?;

    if state.artworks.get(artwork_id).await?.is_none() {
        return Err(AppError::NotFound("artwork"));
    }

    let comment = state
        .comments
        .insert(NewComment {
            artwork_id,
            user_id: user.id,
            content: payload.content,
        })
        .await?;

    info!(comment_id = %comment.id, %artwork_id, "comment added");
    Ok((StatusCode::CREATED, Json(single_view(comment, &user))))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let comment = state
        .comments
        .get(id)
        .await?
        .ok_or(AppError::NotFound("comment"))?;
    ensure_author(&user, &comment)?;

    state.comments.delete(id).await?;
    info!(comment_id = %id, "comment deleted");
    Ok(StatusCode::NO_CONTENT)
}
