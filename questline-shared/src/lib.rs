//! # Questline Shared Library
//!
//! Core of the Questline user-account and gamified-task service: the data
//! model, the token service, the storage capabilities, and the two
//! business engines. The HTTP adapter (`questline-api`) calls into this
//! crate through [`service::AuthService`] and [`service::ScoringService`]
//! and nothing else.
//!
//! ## Module Organization
//!
//! - `models`: database models and data structures
//! - `auth`: password hashing and token issuance/validation
//! - `store`: storage capabilities (Postgres impl + in-memory fake)
//! - `service`: the auth and scoring engines
//! - `db`: connection pool and migrations
//! - `config`: explicit core configuration
//! - `error`: the core error taxonomy

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

/// Current version of the Questline shared library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
