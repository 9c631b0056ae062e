use std::sync::RwLock;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{Artwork, ArtworkPatch, NewArtwork};
use crate::db::poisoned;

/// Listings come back newest first.
#[async_trait]
pub trait ArtworkRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Artwork>>;
    async fn list_all(&self) -> anyhow::Result<Vec<Artwork>>;
    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Artwork>>;
    async fn insert(&self, new: NewArtwork) -> anyhow::Result<Artwork>;
    async fn update(&self, id: Uuid, patch: ArtworkPatch) -> anyhow::Result<Option<Artwork>>;
    /// Returns whether a record was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}

const ARTWORK_COLUMNS: &str = "id, user_id, title, description, image_url, tags, created_at";

#[derive(Clone)]
pub struct PgArtworks {
    db: PgPool,
}

impl PgArtworks {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ArtworkRepo for PgArtworks {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Artwork>> {
        let row = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get artwork")?;
        Ok(row)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Artwork>> {
        let rows = sqlx::query_as::<_, Artwork>(&format!(
            "SELECT {ARTWORK_COLUMNS} FROM artworks ORDER BY created_at DESC, id"
        ))
        .fetch_all(&self.db)
        .await
        .context("list artworks")?;
        Ok(rows)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Artwork>> {
        let rows = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            SELECT {ARTWORK_COLUMNS}
              FROM artworks
             WHERE user_id = $1
             ORDER BY created_at DESC, id
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list artworks by owner")?;
        Ok(rows)
    }

    async fn insert(&self, new: NewArtwork) -> anyhow::Result<Artwork> {
        let row = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            INSERT INTO artworks (id, user_id, title, description, image_url, tags)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {ARTWORK_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.image_url)
        .bind(&new.tags)
        .fetch_one(&self.db)
        .await
        .context("insert artwork")?;
        Ok(row)
    }

    async fn update(&self, id: Uuid, patch: ArtworkPatch) -> anyhow::Result<Option<Artwork>> {
        let row = sqlx::query_as::<_, Artwork>(&format!(
            r#"
            UPDATE artworks
               SET title       = COALESCE($2, title),
                   description = COALESCE($3, description),
                   image_url   = COALESCE($4, image_url),
                   tags        = COALESCE($5, tags)
             WHERE id = $1
            RETURNING {ARTWORK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.title)
        .bind(patch.description)
        .bind(patch.image_url)
        .bind(patch.tags)
        .fetch_optional(&self.db)
        .await
        .context("update artwork")?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM artworks WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete artwork")?;
        Ok(res.rows_affected() > 0)
    }
}

/// Insertion-ordered store; listings reverse it so the newest comes first.
#[derive(Default)]
pub struct MemoryArtworks {
    docs: RwLock<Vec<Artwork>>,
}

#[async_trait]
impl ArtworkRepo for MemoryArtworks {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<Artwork>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.iter().find(|a| a.id == id).cloned())
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Artwork>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.iter().rev().cloned().collect())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> anyhow::Result<Vec<Artwork>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn insert(&self, new: NewArtwork) -> anyhow::Result<Artwork> {
        let artwork = Artwork {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            title: new.title,
            description: new.description,
            image_url: new.image_url,
            tags: new.tags,
            created_at: OffsetDateTime::now_utc(),
        };
        self.docs.write().map_err(poisoned)?.push(artwork.clone());
        Ok(artwork)
    }

    async fn update(&self, id: Uuid, patch: ArtworkPatch) -> anyhow::Result<Option<Artwork>> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        Ok(docs.iter_mut().find(|a| a.id == id).map(|artwork| {
            patch.apply(artwork);
            artwork.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        let before = docs.len();
        docs.retain(|a| a.id != id);
        Ok(docs.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_artwork(owner: Uuid, title: &str) -> NewArtwork {
        NewArtwork {
            user_id: owner,
            title: title.into(),
            description: "desc".into(),
            image_url: "https://img.example.com/x.png".into(),
            tags: vec!["ink".into()],
        }
    }

    #[tokio::test]
    async fn listings_are_newest_first_and_scoped_by_owner() {
        let repo = MemoryArtworks::default();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        repo.insert(new_artwork(alice, "first")).await.unwrap();
        repo.insert(new_artwork(bob, "second")).await.unwrap();
        repo.insert(new_artwork(alice, "third")).await.unwrap();

        let all: Vec<String> = repo.list_all().await.unwrap().into_iter().map(|a| a.title).collect();
        assert_eq!(all, vec!["third", "second", "first"]);

        let mine: Vec<String> = repo
            .list_by_owner(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.title)
            .collect();
        assert_eq!(mine, vec!["third", "first"]);
    }

    #[tokio::test]
    async fn update_is_a_partial_merge() {
        let repo = MemoryArtworks::default();
        let art = repo.insert(new_artwork(Uuid::new_v4(), "draft")).await.unwrap();
        let patch = ArtworkPatch {
            title: Some("final".into()),
            ..Default::default()
        };
        let updated = repo.update(art.id, patch).await.unwrap().unwrap();
        assert_eq!(updated.title, "final");
        assert_eq!(updated.description, "desc");
        assert_eq!(updated.tags, vec!["ink".to_string()]);
        assert_eq!(updated.user_id, art.user_id);

        assert!(repo
            .update(Uuid::new_v4(), ArtworkPatch::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let repo = MemoryArtworks::default();
        let art = repo.insert(new_artwork(Uuid::new_v4(), "gone")).await.unwrap();
        assert!(repo.delete(art.id).await.unwrap());
        assert!(!repo.delete(art.id).await.unwrap());
        assert!(repo.get(art.id).await.unwrap().is_none());
    }
}
