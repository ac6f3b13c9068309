//! # API Shared
//!
//! Shared definitions for the ZahaniFlow HTTP API.
//!
//! Contains:
//! - Request/response bodies (`dto` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//! - API-key authentication
//!
//! Used by `api-rest` and the `zahaniflow-run` server binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{validate_api_key, AuthError, API_KEY_HEADER};
pub use dto::*;
pub use health::HealthService;
