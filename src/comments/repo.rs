use std::sync::RwLock;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Comment, NewComment};
use crate::db::poisoned;

#[async_trait]
pub trait CommentRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Comment>>;
    /// Newest first.
    async fn list_by_artwork(&self, artwork_id: Uuid) -> anyhow::Result<Vec<Comment>>;
    async fn insert(&self, new: NewComment) -> anyhow::Result<Comment>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const COMMENT_COLUMNS: &str = "id, artwork_id, user_id, content, created_at";

#[derive(Clone)]
pub struct PgComments {
    db: PgPool,
}

impl PgComments {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CommentRepo for PgComments {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Comment>> {
        let row = sqlx::query_as::<_, Comment>(&format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get comment")?;
        Ok(row)
    }

    async fn list_by_artwork(&self, artwork_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let rows = sqlx::query_as::<_, Comment>(&format!(
            r#"
            SELECT {COMMENT_COLUMNS}
              FROM comments
             WHERE artwork_id = $1
             ORDER BY created_at DESC, id
            "#
        ))
        .bind(artwork_id)
        .fetch_all(&self.db)
        .await
        .context("list comments")?;
        Ok(rows)
    }

    async fn insert(&self, new: NewComment) -> anyhow::Result<Comment> {
        let row = sqlx::query_as::<_, Comment>(&format!(
            r#"
            INSERT INTO comments (id, artwork_id, user_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING {COMMENT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.artwork_id)
        .bind(new.user_id)
        .bind(&new.content)
        .fetch_one(&self.db)
        .await
        .context("insert comment")?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete comment")?;
        Ok(res.rows_affected() > 0)
    }
}

#[derive(Default)]
pub struct MemoryComments {
    docs: RwLock<Vec<Comment>>,
}

#[async_trait]
impl CommentRepo for MemoryComments {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Comment>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.iter().find(|c| c.id == id).cloned())
    }

    async fn list_by_artwork(&self, artwork_id: Uuid) -> anyhow::Result<Vec<Comment>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs
            .iter()
            .rev()
            .filter(|c| c.artwork_id == artwork_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, new: NewComment) -> anyhow::Result<Comment> {
        let comment = Comment {
            id: Uuid::new_v4(),
            artwork_id: new.artwork_id,
            user_id: new.user_id,
            content: new.content,
            created_at: OffsetDateTime::now_utc(),
        };
        self.docs.write().map_err(poisoned)?.push(comment.clone());
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        let before = docs.len();
        docs.retain(|c| c.id != id);
        Ok(docs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_per_artwork_newest_first() {
        let repo = MemoryComments::default();
        let artwork = Uuid::new_v4();
        let other = Uuid::new_v4();
        let author = Uuid::new_v4();
        for (target, content) in [(artwork, "first"), (other, "elsewhere"), (artwork, "second")] {
            repo.insert(NewComment {
                artwork_id: target,
                user_id: author,
                content: content.into(),
            })
            .await
            .unwrap();
        }

        let contents: Vec<String> = repo
            .list_by_artwork(artwork)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.content)
            .collect();
        assert_eq!(contents, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn delete_removes_once() {
        let repo = MemoryComments::default();
        let c = repo
            .insert(NewComment {
                artwork_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                content: "hi".into(),
            })
            .await
            .unwrap();
        assert!(repo.delete(c.id).await.unwrap());
        assert!(!repo.delete(c.id).await.unwrap());
        assert!(repo.get(c.id).await.unwrap().is_none());
    }
}
