//! Bearer-token extractor for the admin routes.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use sage_core::{admin::AdminSession, store::Store};

use crate::{AppState, error::ApiError};

/// Present in a handler means the request carried a live admin session.
pub struct Admin(pub AdminSession);

/// Pull the token out of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
  let token = value.strip_prefix("Bearer ")?.trim();
  (!token.is_empty()).then_some(token)
}

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: Store + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let session = state.auth.authenticate(token).await?;
    Ok(Admin(session))
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut map = HeaderMap::new();
    map.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    map
  }

  #[test]
  fn extracts_bearer_token() {
    assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
  }

  #[test]
  fn rejects_other_schemes_and_blank_tokens() {
    assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
    assert_eq!(bearer_token(&headers("Bearer   ")), None);
    assert_eq!(bearer_token(&HeaderMap::new()), None);
  }
}
