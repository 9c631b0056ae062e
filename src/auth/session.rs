use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::jwt::TokenService;
use crate::{
    config::AppConfig,
    error::AppError,
    state::AppState,
    users::{repo::UserRepo, repo_types::User},
};

pub const SESSION_COOKIE: &str = "authToken";

/// Reads the raw session token from the request cookies.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_owned())
        .filter(|v| !v.is_empty())
}

pub fn session_cookie(token: String, config: &AppConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure_cookies)
        .max_age(config.session_max_age())
        .build()
}

pub fn expired_session_cookie(config: &AppConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(config.secure_cookies)
        .max_age(time::Duration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Resolves "who is asking" for a request. The only path from a cookie to a user.
#[derive(Clone)]
pub struct SessionGate {
    tokens: TokenService,
    users: Arc<dyn UserRepo>,
}

impl FromRef<AppState> for SessionGate {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.tokens.clone(), state.users.clone())
    }
}

impl SessionGate {
    pub fn new(tokens: TokenService, users: Arc<dyn UserRepo>) -> Self {
        Self { tokens, users }
    }

    /// Missing, invalid and expired tokens all resolve to anonymous.
    pub async fn resolve_identity(&self, headers: &HeaderMap) -> anyhow::Result<Option<User>> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };
        let Some(claims) = self.tokens.verify(&token) else {
            debug!("invalid or expired session token; treating visitor as anonymous");
            return Ok(None);
        };
        let user = self.users.get(claims.user_id).await?;
        if user.is_none() {
            warn!(user_id = %claims.user_id, "session token for unknown user");
        }
        Ok(user)
    }
}

/// Visitor identity for pages; anonymous is not an error.
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
    SessionGate: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = SessionGate::from_ref(state);
        let user = gate.resolve_identity(&parts.headers).await?;
        Ok(MaybeUser(user))
    }
}

/// Authenticated user for mutations; anonymous requests get 401.
pub struct CurrentUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
    SessionGate: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;
        user.map(CurrentUser).ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::JwtConfig,
        users::{
            repo::MemoryUsers,
            repo_types::NewUser,
        },
    };
    use axum::http::{header::COOKIE, HeaderValue};
    use time::Duration as TimeDuration;
    use uuid::Uuid;

    fn tokens() -> TokenService {
        TokenService::from_config(&JwtConfig {
            secret: "gate-secret".into(),
            ttl_minutes: 60,
        })
    }

    fn headers_with_cookie(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(cookie).unwrap());
        headers
    }

    async fn gate_with_user() -> (SessionGate, User) {
        let users = Arc::new(MemoryUsers::default());
        let user = users
            .insert(NewUser {
                email: "gate@example.com".into(),
                password_hash: "hash".into(),
                username: "gatekeeper".into(),
                avatar_url: "https://example.com/a.png".into(),
            })
            .await
            .unwrap();
        (SessionGate::new(tokens(), users), user)
    }

    #[test]
    fn extracts_named_cookie_among_others() {
        let headers = headers_with_cookie("theme=dark; authToken=abc.def.ghi; lang=en");
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
        assert!(session_token(&headers_with_cookie("theme=dark")).is_none());
        assert!(session_token(&headers_with_cookie("authToken=")).is_none());
        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[tokio::test]
    async fn resolves_valid_token_to_user() {
        let (gate, user) = gate_with_user().await;
        let token = tokens().issue(user.id).unwrap();
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}={token}"));
        let resolved = gate.resolve_identity(&headers).await.unwrap();
        assert_eq!(resolved.map(|u| u.id), Some(user.id));
    }

    #[tokio::test]
    async fn no_cookie_is_anonymous() {
        let (gate, _) = gate_with_user().await;
        assert!(gate.resolve_identity(&HeaderMap::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_token_degrades_to_anonymous() {
        let (gate, user) = gate_with_user().await;
        let issued = OffsetDateTime::now_utc() - TimeDuration::hours(3);
        let token = tokens().issue_at(user.id, issued).unwrap();
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}={token}"));
        assert!(gate.resolve_identity(&headers).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn garbage_token_degrades_to_anonymous() {
        let (gate, _) = gate_with_user().await;
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}=eyJhbGciOiJIUzI1NiJ9.e30.xx"));
        assert!(gate.resolve_identity(&headers).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn token_for_missing_user_is_anonymous() {
        let (gate, _) = gate_with_user().await;
        let token = tokens().issue(Uuid::new_v4()).unwrap();
        let headers = headers_with_cookie(&format!("{SESSION_COOKIE}={token}"));
        assert!(gate.resolve_identity(&headers).await.unwrap().is_none());
    }

    #[test]
    fn session_cookie_attributes() {
        let config = crate::state::test_config();
        let cookie = session_cookie("tok".into(), &config);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.max_age(), Some(TimeDuration::hours(1)));
        assert_eq!(cookie.path(), Some("/"));

        let cleared = expired_session_cookie(&config);
        assert_eq!(cleared.value(), "");
        assert_eq!(cleared.max_age(), Some(TimeDuration::ZERO));
    }
}
