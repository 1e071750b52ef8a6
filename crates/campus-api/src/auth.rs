//! Handlers for session and profile endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: [`Credentials`]; members only |
//! | `POST` | `/auth/admin-login` | Body: [`Credentials`]; administrators only |
//! | `POST` | `/auth/register` | Body: [`RegisterBody`]; returns 201 and signs in |
//! | `POST` | `/auth/logout` | Always 204 |
//! | `GET`  | `/auth/session` | 404 when nobody is signed in |
//! | `PATCH`| `/profile` | Body: [`ProfileUpdate`] |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use campus_core::{
  account::{Account, ProfileUpdate},
  mailer::Mailer,
  storage::KeyValueStore,
};
use serde::Deserialize;

use crate::{SharedCampus, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct Credentials {
  pub email:    String,
  pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub name:     String,
  pub email:    String,
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Json(body): Json<Credentials>,
) -> Result<Json<Account>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let account = campus.lock().await.login(&body.email, &body.password)?;
  Ok(Json(account))
}

/// `POST /auth/admin-login`
pub async fn admin_login<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Json(body): Json<Credentials>,
) -> Result<Json<Account>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let account = campus.lock().await.admin_login(&body.email, &body.password)?;
  Ok(Json(account))
}

/// `POST /auth/register`: returns 201 + the new account.
pub async fn register<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let account = campus.lock().await.register(&body.name, &body.email, &body.password)?;
  Ok((StatusCode::CREATED, Json(account)))
}

/// `POST /auth/logout`
pub async fn logout<K, M>(State(campus): State<SharedCampus<K, M>>) -> StatusCode
where
  K: KeyValueStore,
  M: Mailer,
{
  campus.lock().await.logout();
  StatusCode::NO_CONTENT
}

/// `GET /auth/session`
pub async fn session<K, M>(
  State(campus): State<SharedCampus<K, M>>,
) -> Result<Json<Account>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let campus = campus.lock().await;
  let account = campus
    .current_user()
    .cloned()
    .ok_or_else(|| ApiError::NotFound("no active session".into()))?;
  Ok(Json(account))
}

/// `PATCH /profile`
pub async fn update_profile<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Json(body): Json<ProfileUpdate>,
) -> Result<Json<Account>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let account = campus.lock().await.update_profile(body)?;
  Ok(Json(account))
}
