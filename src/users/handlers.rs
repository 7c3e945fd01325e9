use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderMap},
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::auth::extractors::{AuthUser, PRIVATE_COOKIE, PUBLIC_COOKIE};
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::error::ApiError;
use crate::state::AppState;
use crate::users::dto::{
    is_valid_email, JoinRequest, LoginRequest, LoginResponse, MessageResponse, RegisterRequest,
};
use crate::users::repo;
use crate::users::repo_types::{NewAccount, UserWithProfile};

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(profile))
        .route("/login", post(login))
        .route("/register", post(register))
}

pub fn project_routes() -> Router<AppState> {
    Router::new().route("/join", post(join))
}

fn login_cookie(name: &str, token: &str, http_only: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; SameSite=Lax", name, token);
    if http_only {
        cookie.push_str("; HttpOnly");
    }
    cookie
}

/// Load the caller's joined users + user_profile row. Responds with `null`
/// when the join yields no row; the client treats missing fields as
/// not-found.
#[instrument(skip(state))]
pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Option<UserWithProfile>>, ApiError> {
    let row = repo::find_profile_by_user_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = user_id, "profile query failed");
            ApiError::Internal("Database error".into())
        })?;
    Ok(Json(row))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let (email, password) = payload
        .validate()
        .map_err(|msg| ApiError::BadRequest(msg.into()))?;

    let known = repo::email_exists(&state.db, &email).await.map_err(|e| {
        error!(error = %e, "users lookup failed");
        ApiError::BadRequest("Database is not available, please try again later".into())
    })?;
    if !known {
        warn!(email = %email, "login with unknown email");
        return Err(ApiError::BadRequest(
            "Provided incorrect login details".into(),
        ));
    }

    let credentials = repo::find_login_by_email(&state.db, &email)
        .await
        .map_err(|e| {
            error!(error = %e, "user_login lookup failed");
            ApiError::BadRequest("A problem occured when trying to load your account".into())
        })?;

    // A users row without its user_login row counts as bad credentials.
    let matched = match &credentials {
        Some(row) => {
            row.email == email
                && verify_password(&password, &row.hashpass).map_err(|e| {
                    error!(error = %e, "password verification failed");
                    ApiError::BadRequest(
                        "A problem occured when trying to load your account".into(),
                    )
                })?
        }
        None => false,
    };
    if !matched {
        warn!(email = %email, "login with wrong credentials");
        return Err(ApiError::BadRequest(
            "Provided incorrect login details".into(),
        ));
    }

    let user = repo::find_profile_by_email(&state.db, &email)
        .await
        .map_err(|e| {
            error!(error = %e, "profile lookup failed");
            ApiError::BadRequest("A problem occured when trying to load your account".into())
        })?
        .ok_or_else(|| ApiError::BadRequest("Provided incorrect login details".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let pair = keys.generate_pair(user.user_id).map_err(|e| {
        error!(error = %e, "jwt sign failed");
        ApiError::Internal(e.to_string())
    })?;

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        login_cookie(PUBLIC_COOKIE, &pair.public_token, false)
            .parse()
            .unwrap(),
    );
    headers.append(
        SET_COOKIE,
        login_cookie(PRIVATE_COOKIE, &pair.private_token, true)
            .parse()
            .unwrap(),
    );

    info!(user_id = user.user_id, "user logged in");
    Ok((
        headers,
        Json(LoginResponse {
            user,
            message: "Login successful".into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let form = payload
        .validate()
        .map_err(|msg| ApiError::BadRequest(msg.into()))?;

    if !is_valid_email(&form.email) {
        warn!(email = %form.email, "invalid email format");
        return Err(ApiError::BadRequest(
            "Incorrect email format has been given.".into(),
        ));
    }

    let hashpass = hash_password(&form.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Internal(e.to_string())
    })?;

    let taken = repo::email_exists(&state.db, &form.email)
        .await
        .map_err(|e| {
            error!(error = %e, "users lookup failed");
            ApiError::BadRequest("Incorrect details entered.".into())
        })?;
    if taken {
        warn!(email = %form.email, "email already registered");
        return Err(ApiError::BadRequest("Email already exist".into()));
    }

    let account = NewAccount {
        email: form.email,
        first_name: form.first_name,
        last_name: form.last_name,
        github: form.github,
        role: form.role,
        hashpass,
    };
    repo::create_account(&state.db, &account).await.map_err(|e| {
        error!(error = %e, email = %account.email, "registration transaction failed");
        ApiError::Internal("Database error".into())
    })?;

    info!(email = %account.email, "user registered");
    Ok(Json(MessageResponse {
        message: "Registration successful".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn join(
    State(state): State<AppState>,
    AuthUser(caller_id): AuthUser,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let (user, project) = payload
        .validate()
        .map_err(|msg| ApiError::BadRequest(msg.into()))?;

    let already = repo::contribution_exists(&state.db, user, project)
        .await
        .map_err(|e| {
            error!(error = %e, "contribution lookup failed");
            ApiError::BadRequest("Server is not available".into())
        })?;
    if already {
        warn!(user_id = user, project_id = project, "duplicate membership");
        return Err(ApiError::BadRequest(
            "User already joined to the Project".into(),
        ));
    }

    repo::add_contribution(&state.db, user, project)
        .await
        .map_err(|e| {
            error!(error = %e, "contribution insert failed");
            ApiError::Internal("Cannot add new project".into())
        })?;

    info!(
        caller = caller_id,
        user_id = user,
        project_id = project,
        "user joined project"
    );
    Ok(Json(MessageResponse {
        message: "User successfully added to the project".into(),
    }))
}

#[cfg(test)]
mod cookie_tests {
    use super::*;

    #[test]
    fn private_cookie_is_http_only() {
        let cookie = login_cookie(PRIVATE_COOKIE, "tok.en", true);
        assert!(cookie.starts_with("teambuildPrivate=tok.en"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
    }

    #[test]
    fn public_cookie_is_script_readable() {
        let cookie = login_cookie(PUBLIC_COOKIE, "tok.en", false);
        assert!(cookie.starts_with("teambuildPublic=tok.en"));
        assert!(!cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
    }
}
