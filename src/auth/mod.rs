// Authorization gate: decides whether a call may reach the filter.
//
// Disabled: every call passes (local development only).
// Enabled:  the call must carry `Authorization: Bearer <token>` and the token
//           must validate against the cached context. Validation is an
//           in-memory check; the network is only used by the refresh task.

use std::sync::Arc;

use crate::error::AuthError;

pub mod backend;
pub mod context;
pub mod validator;

pub use backend::{IamValidationBackend, ValidationBackend};
pub use context::{RevocationList, RevokedUser, TokenClaims, ValidationContext};
pub use validator::TokenValidator;

#[derive(Clone)]
pub enum AuthGate {
    Disabled,
    Enabled(Arc<TokenValidator>),
}

impl AuthGate {
    pub fn is_enabled(&self) -> bool {
        matches!(self, AuthGate::Enabled(_))
    }

    /// Check the raw `Authorization` header value of a call.
    ///
    /// Returns the validated claims, or `None` when the gate is disabled.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<Option<TokenClaims>, AuthError> {
        match self {
            AuthGate::Disabled => Ok(None),
            AuthGate::Enabled(validator) => {
                let token = bearer_token(authorization)?;
                validator.validate(token).map(Some)
            }
        }
    }
}

/// Extract the credential from a `Bearer <token>` header value.
/// The scheme is matched case-insensitively.
pub fn bearer_token(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.ok_or(AuthError::MissingCredential)?.trim();
    let (scheme, token) = value.split_once(' ').ok_or_else(|| {
        AuthError::InvalidCredential("authorization header is not a bearer credential".to_string())
    })?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidCredential(format!(
            "unsupported authorization scheme {scheme}"
        )));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredential);
    }
    Ok(token)
}
