//! # Rolodex Core
//!
//! Core library for the Rolodex account service: the role-gated user
//! resource and the value-marshalling layer underneath it.
//!
//! ## Overview
//!
//! - [`codec`]: backend-aware conversion of UUIDs and enumerated choices
//!   between their external string form and their storage representation
//! - [`field_map`]: the static alias table that maps flat external attribute
//!   names onto the nested [`Identity`](rolodex_model::Identity) graph
//! - [`policy`]: the single place that decides whether a caller may perform
//!   an operation against a target identity
//! - [`controller`]: list/detail/create/update orchestration
//! - [`database`]: persistence ports with PostgreSQL, SQLite and in-memory
//!   adapters
//!
//! ## Data flow
//!
//! request payload -> [`controller::ResourceController`] ->
//! [`policy::GrantPolicy`] -> [`field_map::FieldMap`] -> store ->
//! [`codec::ValueCodec`] -> storage row.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

/// Shared API envelope types
pub mod api_types;

/// Application services composed from the persistence ports
pub mod application;

/// Credential sealing and bearer-token digests
pub mod auth;

/// Backend-aware value codecs
pub mod codec;

/// The user resource controller
pub mod controller;

/// Persistence ports and adapters
pub mod database;

/// Error types and error handling utilities
pub mod error;

/// External attribute aliasing onto the entity graph
pub mod field_map;

/// Parsed request payloads
pub mod payload;

/// Role-based authorization decisions
pub mod policy;

/// Embedded SQL migrations for the PostgreSQL adapter.
pub static POSTGRES_MIGRATOR: sqlx::migrate::Migrator =
    sqlx::migrate!("./migrations/postgres");

/// Embedded SQL migrations for the SQLite adapter.
pub static SQLITE_MIGRATOR: sqlx::migrate::Migrator =
    sqlx::migrate!("./migrations/sqlite");

pub use error::{Result, RolodexError};
