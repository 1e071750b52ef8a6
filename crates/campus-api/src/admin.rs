//! Handlers for the administrator views. Both require an admin session.

use axum::{
  Json,
  extract::{Path, Query, State},
};
use campus_core::{
  campus::MemberSummary,
  event::{CatalogStats, Event},
  id::AccountId,
  mailer::Mailer,
  storage::KeyValueStore,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{SharedCampus, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct UsersParams {
  /// Case-insensitive substring of name or email.
  pub search: Option<String>,
}

/// `GET /admin/users[?search=...]`
pub async fn users<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Query(params): Query<UsersParams>,
) -> Result<Json<Vec<MemberSummary>>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let members = campus.lock().await.members(params.search.as_deref())?;
  Ok(Json(members))
}

/// `GET /admin/users/{id}/events`
pub async fn member_events<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(id): Path<AccountId>,
) -> Result<Json<Vec<Event>>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let campus = campus.lock().await;
  let events = campus.member_events(&id)?.into_iter().cloned().collect();
  Ok(Json(events))
}

/// `GET /admin/stats`. Upcoming counts are relative to today (UTC).
pub async fn stats<K, M>(
  State(campus): State<SharedCampus<K, M>>,
) -> Result<Json<CatalogStats>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let stats = campus.lock().await.stats(Utc::now().date_naive())?;
  Ok(Json(stats))
}
