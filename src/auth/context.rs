// Validation context: the cached material a bearer credential is checked against.
//
// A context is an immutable snapshot: signing keys by key id plus the
// revocation list, as of `fetched_at`. Refreshing builds a new snapshot;
// nothing here is ever mutated after construction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use jsonwebtoken::jwk::{Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::warn;

use crate::error::AuthError;

/// Claims read from a validated credential.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

/// A user whose credentials issued at or before `revoked_at` are no longer valid.
#[derive(Debug, Clone, Deserialize)]
pub struct RevokedUser {
    pub id: String,
    pub revoked_at: DateTime<Utc>,
}

/// Revocation list as served by the IAM backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RevocationList {
    #[serde(default)]
    pub revoked_users: Vec<RevokedUser>,
}

/// A decoding key plus the algorithm its JWK declares, if any.
struct SigningKey {
    key: DecodingKey,
    alg: Option<Algorithm>,
}

pub struct ValidationContext {
    keys: HashMap<String, SigningKey>,
    revoked_users: HashMap<String, DateTime<Utc>>,
    fetched_at: DateTime<Utc>,
}

impl ValidationContext {
    /// Build a snapshot from a JWKS document and a revocation list.
    ///
    /// Keys without a `kid`, or that cannot be turned into a decoding key,
    /// are skipped with a warning rather than failing the whole refresh.
    pub fn new(jwks: &JwkSet, revocations: RevocationList) -> Self {
        let mut keys = HashMap::new();
        for jwk in &jwks.keys {
            let Some(kid) = jwk.common.key_id.clone() else {
                warn!("Skipping signing key without kid");
                continue;
            };
            let alg = match declared_algorithm(jwk) {
                Ok(alg) => alg,
                Err(declared) => {
                    warn!(kid = %kid, alg = ?declared, "Skipping key not meant for signatures");
                    continue;
                }
            };
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => {
                    keys.insert(kid, SigningKey { key, alg });
                }
                Err(e) => warn!(kid = %kid, error = %e, "Skipping unusable signing key"),
            }
        }

        let mut revoked_users: HashMap<String, DateTime<Utc>> = HashMap::new();
        for user in revocations.revoked_users {
            let entry = revoked_users.entry(user.id).or_insert(user.revoked_at);
            *entry = (*entry).max(user.revoked_at);
        }

        Self {
            keys,
            revoked_users,
            fetched_at: Utc::now(),
        }
    }

    /// Check a raw bearer credential against this snapshot.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let header = decode_header(token)?;
        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| AuthError::InvalidCredential("token has no kid".to_string()))?;
        let signing = self
            .keys
            .get(kid)
            .ok_or_else(|| AuthError::InvalidCredential(format!("unknown signing key {kid}")))?;

        // A key that declares its algorithm only verifies that algorithm.
        // Otherwise the header decides, within the key's family.
        let alg = match signing.alg {
            Some(alg) if alg != header.alg => {
                return Err(AuthError::InvalidCredential(format!(
                    "key {kid} signs with {alg:?}, token claims {:?}",
                    header.alg
                )));
            }
            Some(alg) => alg,
            None => header.alg,
        };
        let mut validation = Validation::new(alg);
        validation.validate_aud = false;

        let claims = decode::<TokenClaims>(token, &signing.key, &validation)?.claims;

        if let Some(sub) = claims.sub.as_deref() {
            if let Some(revoked_at) = self.revoked_users.get(sub) {
                if claims.iat <= revoked_at.timestamp() {
                    return Err(AuthError::Revoked);
                }
            }
        }

        Ok(claims)
    }

    pub fn has_key(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// The signature algorithm a JWK declares. `Err` carries a declared
/// algorithm that is not a signature algorithm at all.
fn declared_algorithm(jwk: &Jwk) -> Result<Option<Algorithm>, KeyAlgorithm> {
    let Some(declared) = jwk.common.key_algorithm else {
        return Ok(None);
    };
    let alg = match declared {
        KeyAlgorithm::HS256 => Algorithm::HS256,
        KeyAlgorithm::HS384 => Algorithm::HS384,
        KeyAlgorithm::HS512 => Algorithm::HS512,
        KeyAlgorithm::ES256 => Algorithm::ES256,
        KeyAlgorithm::ES384 => Algorithm::ES384,
        KeyAlgorithm::RS256 => Algorithm::RS256,
        KeyAlgorithm::RS384 => Algorithm::RS384,
        KeyAlgorithm::RS512 => Algorithm::RS512,
        KeyAlgorithm::PS256 => Algorithm::PS256,
        KeyAlgorithm::PS384 => Algorithm::PS384,
        KeyAlgorithm::PS512 => Algorithm::PS512,
        KeyAlgorithm::EdDSA => Algorithm::EdDSA,
        other => return Err(other),
    };
    Ok(Some(alg))
}

impl std::fmt::Debug for ValidationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kids: Vec<&String> = self.keys.keys().collect();
        kids.sort();
        f.debug_struct("ValidationContext")
            .field("key_ids", &kids)
            .field("revoked_users", &self.revoked_users.len())
            .field("fetched_at", &self.fetched_at)
            .finish()
    }
}
