//! Field-level validation accumulator.
//!
//! Request validation reports every failing field at once. Value-object
//! constructors return their own error enums; callers feed those results
//! through [`FieldErrors::check`] and convert the accumulated failures into a
//! single [`Error`] with `details.errors = { field: [messages] }`.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde_json::json;

use super::Error;

/// Collected validation failures keyed by wire field name.
///
/// # Examples
/// ```
/// use portfolio_backend::domain::{ErrorCode, FieldErrors};
///
/// let mut errors = FieldErrors::new();
/// errors.push("title", "the title field is required");
/// errors.push("status", "the selected status is invalid");
/// let err = errors.into_result().unwrap_err();
/// assert_eq!(err.code(), ErrorCode::ValidationFailed);
/// assert!(err.details().unwrap()["errors"]["status"].is_array());
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    /// Start an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Unwrap `result`, recording its error against `field` on failure.
    pub fn check<T, E: Display>(&mut self, field: &str, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(field, err.to_string());
                None
            }
        }
    }

    /// Whether no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether `field` has at least one recorded failure.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// `Ok(())` when empty, otherwise a validation error listing every field.
    pub fn into_result(self) -> Result<(), Error> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    /// Convert into a validation error regardless of content.
    #[must_use]
    pub fn into_error(self) -> Error {
        let message = self
            .errors
            .values()
            .flatten()
            .next()
            .cloned()
            .unwrap_or_else(|| "the given data was invalid".to_owned());
        Error::validation_failed(message).with_details(json!({ "errors": self.errors }))
    }
}
