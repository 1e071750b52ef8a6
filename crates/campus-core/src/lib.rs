//! Core types and stores for the campus events application.
//!
//! Three stores own the persisted collections: [`directory::UserDirectory`]
//! (accounts and the session), [`catalog::EventCatalog`] (events and their
//! attendees) and [`feed::NotificationFeed`] (per-user notifications). The
//! [`campus::Campus`] facade wires them together and runs the broadcast
//! fan-out whenever an event is created, updated or deleted.
//!
//! This crate is free of HTTP and database dependencies. Storage backends
//! implement [`storage::KeyValueStore`]; mail transports implement
//! [`mailer::Mailer`].

// Native `async fn` in traits; the returned futures are bounded explicitly.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod broadcast;
pub mod campus;
pub mod catalog;
pub mod directory;
pub mod error;
pub mod event;
pub mod feed;
pub mod id;
pub mod mailer;
pub mod notification;
pub mod storage;

pub use campus::Campus;
pub use error::{Error, Result};
