//! `crossutil` is a small library backing the `crossutil` CLI binary.
//!
//! It provides three stateless helpers that never fail:
//! - Random identifiers with a best-effort source cascade and a timestamp fallback
//! - Human-readable messages from arbitrary error-like values
//! - Locale keys from language tags

/// Random identifier generation (hex / UUID, with a timestamp fallback).
pub mod id;
/// Error message normalization.
pub mod error;
/// Language tag to locale key resolution.
pub mod locale;

pub use error::normalize_error;
pub use id::generate_id;
pub use locale::{resolve_locale_key, LocaleKey};
