use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{error, info, instrument, warn};

use super::{
    dto::{AuthPage, LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
    password::{hash_password, verify_password},
    session::{expired_session_cookie, session_cookie, CurrentUser, MaybeUser},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{dto::PublicUser, repo::DuplicateEmail, repo_types::NewUser},
    validation::{
        self, require_fields, validate_email, validate_password, validate_username,
    },
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
}

pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/auth", get(auth_page))
        .route("/logout", get(logout_page))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/api/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<MessageResponse>)> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();

    require_fields(&[&payload.username, &payload.email, &payload.password])?;
    validate_email(&payload.email)?;
    validate_username(&payload.username)?;
    validate_password(&payload.password)?;

    if state.users.find_by_email(&payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(AppError::validation("User already exists"));
    }

    let password_hash = hash_password(&payload.password)?;
    let new_user = NewUser {
        email: payload.email,
        password_hash,
        username: payload.username,
        avatar_url: state.config.default_avatar_url.clone(),
    };

    let user = match state.users.insert(new_user).await {
        Ok(u) => u,
        Err(e) if e.downcast_ref::<DuplicateEmail>().is_some() => {
            warn!("email registered concurrently");
            return Err(AppError::validation("User already exists"));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err(e.into());
        }
    };

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User registered successfully",
        }),
    ))
}

/// Unknown email and wrong password get different messages, matching the
/// behavior clients of this API already rely on.
#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(mut payload): Json<LoginRequest>,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    payload.email = payload.email.trim().to_lowercase();
    require_fields(&[&payload.email, &payload.password])?;

    let user = match state.users.find_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(AppError::InvalidCredentials("Invalid email address"));
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials("Invalid password"));
    }

    let token = state.tokens.issue(user.id)?;
    let jar = jar.add(session_cookie(token, &state.config));

    info!(user_id = %user.id, "user logged in");
    Ok((
        jar,
        Json(LoginResponse {
            message: "Logged in successfully",
            user_id: user.id,
        }),
    ))
}

/// Discards the client copy of the token; the token itself stays valid until expiry.
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.add(expired_session_cookie(&state.config));
    (
        jar,
        Json(MessageResponse {
            message: "Logged out",
        }),
    )
}

#[instrument(skip(state, jar))]
pub async fn logout_page(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (jar.add(expired_session_cookie(&state.config)), Redirect::to("/"))
}

#[instrument(skip(user))]
pub async fn auth_page(MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }
    Json(AuthPage {
        username_min: validation::USERNAME_MIN,
        username_max: validation::USERNAME_MAX,
        password_min: validation::PASSWORD_MIN,
        password_max: validation::PASSWORD_MAX,
    })
    .into_response()
}

#[instrument(skip(user))]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_serialization() {
        let response = LoginResponse {
            message: "Logged in successfully",
            user_id: uuid::Uuid::nil(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"userId\""));
        assert!(json.contains("Logged in successfully"));
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let req: LoginRequest = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert!(req.password.is_empty());
        assert!(require_fields(&[&req.email, &req.password]).is_err());
    }
}
