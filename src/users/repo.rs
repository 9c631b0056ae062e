use std::{collections::HashMap, sync::RwLock};

use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserPatch};
use crate::db::poisoned;

/// Raised by [`UserRepo::insert`] when the email is already taken.
#[derive(Debug, Error)]
#[error("email already registered")]
pub struct DuplicateEmail;

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn insert(&self, new: NewUser) -> anyhow::Result<User>;
    async fn update(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<Option<User>>;
}

const USER_COLUMNS: &str =
    "id, email, password_hash, username, avatar_url, bio, roles, created_at, updated_at";

#[derive(Clone)]
pub struct PgUsers {
    db: PgPool,
}

impl PgUsers {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepo for PgUsers {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get user")?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn insert(&self, new: NewUser) -> anyhow::Result<User> {
        let res = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, password_hash, username, avatar_url, bio, roles)
            VALUES ($1, $2, $3, $4, $5, '', ARRAY['user'])
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.username)
        .bind(&new.avatar_url)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(DuplicateEmail.into()),
            Err(e) => Err(anyhow::Error::new(e).context("insert user")),
        }
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET username      = COALESCE($2, username),
                   avatar_url    = COALESCE($3, avatar_url),
                   bio           = COALESCE($4, bio),
                   password_hash = COALESCE($5, password_hash),
                   updated_at    = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.username)
        .bind(patch.avatar_url)
        .bind(patch.bio)
        .bind(patch.password_hash)
        .fetch_optional(&self.db)
        .await
        .context("update user")?;
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    docs: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserRepo for MemoryUsers {
    async fn get(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let docs = self.docs.read().map_err(poisoned)?;
        Ok(docs.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, new: NewUser) -> anyhow::Result<User> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        if docs.values().any(|u| u.email == new.email) {
            return Err(DuplicateEmail.into());
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            username: new.username,
            avatar_url: new.avatar_url,
            bio: String::new(),
            roles: vec!["user".to_string()],
            created_at: now,
            updated_at: now,
        };
        docs.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, id: Uuid, patch: UserPatch) -> anyhow::Result<Option<User>> {
        let mut docs = self.docs.write().map_err(poisoned)?;
        Ok(docs.get_mut(&id).map(|user| {
            patch.apply(user, OffsetDateTime::now_utc());
            user.clone()
        }))
    }
}
