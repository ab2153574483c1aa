//! Validating JSON extractor
//!
//! Deserialises like `axum::Json<T>`, then runs `Validate`. Every rejection,
//! malformed JSON included, is answered through `api_error` as an
//! `AccessError::Validation`, so request-shape failures look exactly like
//! the service's own validation errors (`400`, `code = "validation_error"`).

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use super::api_error;
use crate::domain::AccessError;

/// Request body that has passed `Validate`.
///
/// ```ignore
/// async fn login(ValidatedJson(request): ValidatedJson<LoginRequest>) { /* ... */ }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Invalid(ValidationErrors),
}

impl ValidatedJsonRejection {
    fn into_access_error(self) -> AccessError {
        match self {
            Self::Json(rejection) => {
                AccessError::Validation(format!("Invalid JSON: {}", rejection.body_text()))
            }
            Self::Invalid(errors) => {
                let mut messages = Vec::new();
                describe(&errors, "", &mut messages);
                messages.sort();
                if messages.is_empty() {
                    AccessError::Validation("Validation failed".into())
                } else {
                    AccessError::Validation(messages.join("; "))
                }
            }
        }
    }
}

/// Flatten nested validation errors into `path: message` lines, e.g.
/// `loginTimeRestriction.start_time: startTime must be HH:MM`.
fn describe(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(list) => {
                for e in list {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    out.push(format!("{}: {}", path, message));
                }
            }
            ValidationErrorsKind::Struct(inner) => describe(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    describe(inner, &format!("{}[{}]", path, index), out);
                }
            }
        }
    }
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        api_error(self.into_access_error()).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(ValidatedJsonRejection::Invalid)?;
        Ok(ValidatedJson(value))
    }
}
