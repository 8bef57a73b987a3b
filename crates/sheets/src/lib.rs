//! Google Sheets infrastructure adapter.
//!
//! Implements the [`schedule::SpreadsheetService`] trait over the Sheets v4
//! REST API, authenticated as a service account.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** OAuth token exchange, request encoding, response
//! parsing, and retry with back-off live here. The [`schedule`] crate sees
//! only [`schedule::SpreadsheetService`].
//!
//! ## Credentials
//!
//! [`ServiceAccountKey::from_env`] reads the JSON key named by
//! `GOOGLE_APPLICATION_CREDENTIALS`, or falls back to individual variables:
//!
//! | Variable | Required |
//! |----------|----------|
//! | `GOOGLE_CLIENT_EMAIL` | yes |
//! | `GOOGLE_PRIVATE_KEY` | yes |
//! | `GOOGLE_PRIVATE_KEY_ID` | no |
//! | `GOOGLE_PROJECT_ID` | no |
//! | `GOOGLE_CLIENT_ID` | no |
//! | `GOOGLE_TOKEN_URI` | no |

pub mod auth;
mod client;
pub mod wire;

pub use auth::{CredentialsError, ServiceAccountKey, TokenProvider};
pub use client::{RetryConfig, SheetsClient, SheetsConfig, DEFAULT_BASE_URL};
