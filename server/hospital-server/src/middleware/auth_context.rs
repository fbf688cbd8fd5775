//! Authentication context extraction
//!
//! Every protected handler takes an [`AuthContext`]. Extraction runs the
//! auth gate on the request's HTTP Basic credentials and `X-Role` header;
//! the handler then states which roles it admits with
//! [`AuthContext::require_any`].

use async_trait::async_trait;
use auth_identity::{Credentials, Principal, Role};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::HospitalServer;

/// Header carrying the role claim.
pub const ROLE_HEADER: &str = "x-role";

/// Role sets used by the endpoint table.
pub mod roles {
    use auth_identity::Role;

    pub const ANY: &[Role] = &Role::ALL;
    pub const STAFF: &[Role] = &[Role::Doctor, Role::Nurse];
    pub const DOCTOR: &[Role] = &[Role::Doctor];
    pub const NURSE: &[Role] = &[Role::Nurse];
    pub const PATIENT: &[Role] = &[Role::Patient];
}

/// The authenticated principal of one request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub principal: Principal,
    pub request_id: String,
}

impl AuthContext {
    #[must_use]
    pub fn identifier(&self) -> &str {
        self.principal.identifier()
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.principal.role()
    }

    /// # Errors
    ///
    /// 403 when the principal's role is not in `allowed`.
    pub fn require_any(&self, allowed: &[Role]) -> Result<(), ApiError> {
        self.principal.require_any(allowed).map_err(|e| {
            debug!(
                request_id = %self.request_id,
                role = %self.role(),
                "Role not allowed on this endpoint"
            );
            e.into()
        })
    }
}

/// Decode `Authorization: Basic base64(username:secret)`.
///
/// Anything missing or malformed yields `None`, which the gate reports as
/// missing credentials.
#[must_use]
pub fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, secret) = decoded.split_once(':')?;
    Some(Credentials::new(username, secret))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    HospitalServer: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let server = HospitalServer::from_ref(state);
        let credentials = basic_credentials(&parts.headers);
        let role_claim = parts
            .headers
            .get(ROLE_HEADER)
            .and_then(|value| value.to_str().ok());

        let principal = server
            .gate
            .authenticate(role_claim, credentials.as_ref())
            .await?;

        Ok(Self {
            principal,
            request_id: Uuid::new_v4().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(authorization: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(authorization).unwrap());
        headers
    }

    #[test]
    fn decodes_basic_credentials() {
        let encoded = STANDARD.encode("ana:s3cret:with:colons");
        let creds = basic_credentials(&headers(&format!("Basic {encoded}"))).unwrap();
        assert_eq!(creds.username, "ana");
        assert_eq!(creds.secret, "s3cret:with:colons");
    }

    #[test]
    fn rejects_other_schemes_and_garbage() {
        assert!(basic_credentials(&HeaderMap::new()).is_none());
        assert!(basic_credentials(&headers("Bearer abc.def")).is_none());
        assert!(basic_credentials(&headers("Basic %%%")).is_none());
        let no_colon = STANDARD.encode("anonymous");
        assert!(basic_credentials(&headers(&format!("Basic {no_colon}"))).is_none());
    }

    #[test]
    fn role_sets_follow_the_endpoint_table() {
        let nurse = AuthContext {
            principal: Principal::for_tests("n1", Role::Nurse),
            request_id: "r1".into(),
        };
        assert!(nurse.require_any(roles::STAFF).is_ok());
        assert!(nurse.require_any(roles::ANY).is_ok());
        assert!(nurse.require_any(roles::DOCTOR).is_err());
        assert!(nurse.require_any(roles::PATIENT).is_err());
    }
}
