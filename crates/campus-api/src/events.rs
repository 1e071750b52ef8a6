//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`    | `/events` | Optional `?text=...&category=...` |
//! | `POST`   | `/events` | Body: [`EventDraft`]; returns 201, broadcasts |
//! | `GET`    | `/events/categories` | Distinct categories |
//! | `GET`    | `/events/mine` | Events the signed-in account attends |
//! | `GET`    | `/events/on/{date}` | Calendar day, `YYYY-MM-DD` |
//! | `GET`    | `/events/{id}` | 404 if not found |
//! | `PATCH`  | `/events/{id}` | Body: [`EventPatch`]; broadcasts |
//! | `DELETE` | `/events/{id}` | 204, broadcasts |
//! | `POST`   | `/events/{id}/attendees` | Register the signed-in account |
//! | `DELETE` | `/events/{id}/attendees` | Unregister the signed-in account |

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use campus_core::{
  broadcast::Dispatch,
  event::{Event, EventDraft, EventPatch, EventQuery},
  id::EventId,
  mailer::Mailer,
  storage::KeyValueStore,
};
use chrono::NaiveDate;

use crate::{SharedCampus, error::ApiError};

/// Log what the broadcast wrote, then send its email on a separate task so
/// the response does not wait on the mail provider.
fn send_broadcast<M: Mailer + 'static>(event: &Event, dispatch: Dispatch<M>) {
  let report = dispatch.report();
  tracing::debug!(
    event = %event.id,
    notified = report.notifications.len(),
    failed_writes = report.failed_writes,
    "broadcast notifications written"
  );
  tokio::spawn(dispatch.send());
}

// ─── Reads ────────────────────────────────────────────────────────────────────

/// `GET /events[?text=...][&category=...]`
pub async fn list<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Query(query): Query<EventQuery>,
) -> Json<Vec<Event>>
where
  K: KeyValueStore,
  M: Mailer,
{
  let campus = campus.lock().await;
  Json(campus.list_events(&query).into_iter().cloned().collect())
}

/// `GET /events/categories`
pub async fn categories<K, M>(State(campus): State<SharedCampus<K, M>>) -> Json<Vec<String>>
where
  K: KeyValueStore,
  M: Mailer,
{
  let campus = campus.lock().await;
  Json(campus.categories().into_iter().map(str::to_owned).collect())
}

/// `GET /events/mine`
pub async fn mine<K, M>(State(campus): State<SharedCampus<K, M>>) -> Json<Vec<Event>>
where
  K: KeyValueStore,
  M: Mailer,
{
  let campus = campus.lock().await;
  Json(campus.my_events().into_iter().cloned().collect())
}

/// `GET /events/on/{date}`
pub async fn on_date<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(date): Path<NaiveDate>,
) -> Json<Vec<Event>>
where
  K: KeyValueStore,
  M: Mailer,
{
  let campus = campus.lock().await;
  Json(campus.events_on(date).into_iter().cloned().collect())
}

/// `GET /events/{id}`
pub async fn get_one<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(id): Path<EventId>,
) -> Result<Json<Event>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let campus = campus.lock().await;
  let event = campus
    .get_event(&id)
    .cloned()
    .ok_or_else(|| ApiError::NotFound(format!("event {id} not found")))?;
  Ok(Json(event))
}

// ─── Lifecycle ────────────────────────────────────────────────────────────────

/// `POST /events`: returns 201 + the stored event.
pub async fn create<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  K: KeyValueStore,
  M: Mailer + 'static,
{
  let (event, mail) = campus.lock().await.add_event(draft)?;
  send_broadcast(&event, mail);
  Ok((StatusCode::CREATED, Json(event)))
}

/// `PATCH /events/{id}`
pub async fn update<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(id): Path<EventId>,
  Json(patch): Json<EventPatch>,
) -> Result<Json<Event>, ApiError>
where
  K: KeyValueStore,
  M: Mailer + 'static,
{
  let (event, mail) = campus.lock().await.update_event(&id, patch)?;
  send_broadcast(&event, mail);
  Ok(Json(event))
}

/// `DELETE /events/{id}`
pub async fn delete<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(id): Path<EventId>,
) -> Result<StatusCode, ApiError>
where
  K: KeyValueStore,
  M: Mailer + 'static,
{
  let (event, mail) = campus.lock().await.delete_event(&id)?;
  send_broadcast(&event, mail);
  Ok(StatusCode::NO_CONTENT)
}

// ─── Attendance ───────────────────────────────────────────────────────────────

/// `POST /events/{id}/attendees`
pub async fn register<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(id): Path<EventId>,
) -> Result<Json<Event>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let event = campus.lock().await.register_for_event(&id)?;
  Ok(Json(event))
}

/// `DELETE /events/{id}/attendees`
pub async fn unregister<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(id): Path<EventId>,
) -> Result<Json<Event>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let event = campus.lock().await.unregister_from_event(&id)?;
  Ok(Json(event))
}
