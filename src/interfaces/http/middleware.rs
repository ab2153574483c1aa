//! Bearer-token middleware for Axum
//!
//! Every protected request is re-verified against the store through
//! `AccessService::check`, so a deactivated or deleted account loses access
//! on its very next call.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::common::api_error;
use crate::application::identity::AccessService;
use crate::domain::{AccessError, User};

/// Middleware state
#[derive(Clone)]
pub struct AuthState {
    pub access: Arc<AccessService>,
}

/// Resolved caller, injected as a request extension.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user: User,
    pub session_id: String,
    pub token: String,
}

/// Token from an `Authorization: Bearer <token>` header, if present.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_string) else {
        return api_error(AccessError::SessionRevoked).into_response();
    };

    match state.access.check(&token).await {
        Ok(verified) => {
            request.extensions_mut().insert(AuthenticatedUser {
                user: verified.user,
                session_id: verified.session_id,
                token,
            });
            next.run(request).await
        }
        Err(e) => api_error(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }
}
