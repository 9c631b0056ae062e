use std::collections::HashMap;

use uuid::Uuid;

use super::{dto::AuthorSummary, repo::UserRepo};

/// Looks each distinct author up once. Ids with no matching user are left out,
/// so callers render them as an unknown author.
pub async fn author_index(
    users: &dyn UserRepo,
    ids: &[Uuid],
) -> anyhow::Result<HashMap<Uuid, AuthorSummary>> {
    let mut index = HashMap::new();
    let mut missing = Vec::new();
    for &id in ids {
        if index.contains_key(&id) || missing.contains(&id) {
            continue;
        }
        match users.get(id).await? {
            Some(user) => {
                index.insert(id, AuthorSummary::from(&user));
            }
            None => missing.push(id),
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::{repo::MemoryUsers, repo_types::NewUser};

    #[tokio::test]
    async fn resolves_known_authors_and_skips_unknown() {
        let users = MemoryUsers::default();
        let ada = users
            .insert(NewUser {
                email: "ada@example.com".into(),
                password_hash: "x".into(),
                username: "adalove".into(),
                avatar_url: "https://img.example.com/a.png".into(),
            })
            .await
            .unwrap();
        let ghost = Uuid::new_v4();

        let index = author_index(&users, &[ada.id, ghost, ada.id]).await.unwrap();
        assert_eq!(index.len(), 1);
        assert_eq!(index[&ada.id].username, "adalove");
        assert!(!index.contains_key(&ghost));
    }
}
