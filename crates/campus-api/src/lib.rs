//! JSON REST API for the campus events application.
//!
//! Exposes an axum [`Router`] over a shared [`Campus`]. There is one session
//! per process, so requests are serialised through a mutex: the server plays
//! the part of a single browser tab. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", campus_api::api_router(campus.clone()))
//! ```

pub mod admin;
pub mod auth;
pub mod error;
pub mod events;
pub mod notifications;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, patch, post},
};
use campus_core::{Campus, mailer::Mailer, storage::KeyValueStore};
use tokio::sync::Mutex;

pub use error::ApiError;

/// The application context shared by every handler.
pub type SharedCampus<K, M> = Arc<Mutex<Campus<K, M>>>;

/// Build a fully-materialised API router for `campus`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<K, M>(campus: SharedCampus<K, M>) -> Router<()>
where
  K: KeyValueStore + 'static,
  M: Mailer + 'static,
{
  Router::new()
    // Session
    .route("/auth/login", post(auth::login::<K, M>))
    .route("/auth/admin-login", post(auth::admin_login::<K, M>))
    .route("/auth/register", post(auth::register::<K, M>))
    .route("/auth/logout", post(auth::logout::<K, M>))
    .route("/auth/session", get(auth::session::<K, M>))
    .route("/profile", patch(auth::update_profile::<K, M>))
    // Events
    .route("/events", get(events::list::<K, M>).post(events::create::<K, M>))
    .route("/events/categories", get(events::categories::<K, M>))
    .route("/events/mine", get(events::mine::<K, M>))
    .route("/events/on/{date}", get(events::on_date::<K, M>))
    .route(
      "/events/{id}",
      get(events::get_one::<K, M>)
        .patch(events::update::<K, M>)
        .delete(events::delete::<K, M>),
    )
    .route(
      "/events/{id}/attendees",
      post(events::register::<K, M>).delete(events::unregister::<K, M>),
    )
    // Notifications
    .route(
      "/notifications",
      get(notifications::list::<K, M>).post(notifications::create::<K, M>),
    )
    .route("/notifications/read-all", post(notifications::mark_all_read::<K, M>))
    .route("/notifications/{id}/read", post(notifications::mark_read::<K, M>))
    .route("/notifications/{id}", axum::routing::delete(notifications::delete::<K, M>))
    // Administration
    .route("/admin/users", get(admin::users::<K, M>))
    .route("/admin/users/{id}/events", get(admin::member_events::<K, M>))
    .route("/admin/stats", get(admin::stats::<K, M>))
    .with_state(campus)
}
