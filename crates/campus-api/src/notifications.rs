//! Handlers for `/notifications` endpoints. All of them act on the signed-in
//! account's notifications.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use campus_core::{
  id::NotificationId,
  mailer::Mailer,
  notification::{NewNotification, Notification},
  storage::KeyValueStore,
};
use serde::Serialize;

use crate::{SharedCampus, error::ApiError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
  pub notifications: Vec<Notification>,
  pub unread_count:  usize,
}

/// `GET /notifications`
pub async fn list<K, M>(
  State(campus): State<SharedCampus<K, M>>,
) -> Result<Json<NotificationList>, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let campus = campus.lock().await;
  let notifications = campus.notifications()?.into_iter().cloned().collect();
  let unread_count = campus.unread_count()?;
  Ok(Json(NotificationList { notifications, unread_count }))
}

/// `POST /notifications` with a [`NewNotification`] body; returns 201.
pub async fn create<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Json(body): Json<NewNotification>,
) -> Result<impl IntoResponse, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  let notification = campus.lock().await.add_notification(body)?;
  Ok((StatusCode::CREATED, Json(notification)))
}

/// `POST /notifications/{id}/read`
pub async fn mark_read<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  campus.lock().await.mark_as_read(&id)?;
  Ok(StatusCode::NO_CONTENT)
}

/// `POST /notifications/read-all`
pub async fn mark_all_read<K, M>(
  State(campus): State<SharedCampus<K, M>>,
) -> Result<StatusCode, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  campus.lock().await.mark_all_as_read()?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /notifications/{id}`
pub async fn delete<K, M>(
  State(campus): State<SharedCampus<K, M>>,
  Path(id): Path<NotificationId>,
) -> Result<StatusCode, ApiError>
where
  K: KeyValueStore,
  M: Mailer,
{
  campus.lock().await.delete_notification(&id)?;
  Ok(StatusCode::NO_CONTENT)
}
