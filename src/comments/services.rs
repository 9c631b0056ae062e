use uuid::Uuid;

use super::{dto::CommentView, repo_types::Comment};
use crate::{
    error::{AppError, AppResult},
    users::{repo::UserRepo, repo_types::User, services::author_index},
};

pub fn is_own_comment(viewer: Option<&User>, comment: &Comment) -> bool {
    viewer.is_some_and(|u| u.id == comment.user_id)
}

pub fn ensure_author(user: &User, comment: &Comment) -> AppResult<()> {
    if is_own_comment(Some(user), comment) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// Attaches author summaries, looking each author up once per call.
pub async fn comment_views(
    users: &dyn UserRepo,
    comments: Vec<Comment>,
    viewer: Option<&User>,
) -> anyhow::Result<Vec<CommentView>> {
    let author_ids: Vec<Uuid> = comments.iter().map(|c| c.user_id).collect();
    let authors = author_index(users, &author_ids).await?;
    Ok(comments
        .into_iter()
        .map(|c| CommentView {
            is_own_comment: is_own_comment(viewer, &c),
            author: authors.get(&c.user_id).cloned(),
            id: c.id,
            artwork_id: c.artwork_id,
            content: c.content,
            created_at: c.created_at,
        })
        .collect())
}

pub fn single_view(comment: Comment, author: &User) -> CommentView {
    CommentView {
        id: comment.id,
        artwork_id: comment.artwork_id,
        content: comment.content,
        author: Some(author.into()),
        is_own_comment: comment.user_id == author.id,
        created_at: comment.created_at,
    }
}
