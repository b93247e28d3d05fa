use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::config::{SecurityConfig, MAX_JWT_EXPIRY_HOURS};
use crate::database::models::Role;

/// Verified token payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        let expiry = Some(expiry_hours)
            .filter(|hours| (1..=MAX_JWT_EXPIRY_HOURS).contains(hours))
            .and_then(|hours| i64::try_from(hours).ok())
            .and_then(Duration::try_hours)
            .ok_or_else(|| AuthError::TokenGeneration(format!("token expiry of {} hours is out of range", expiry_hours)))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    pub fn claims_for(&self, user_id: Uuid, tenant_id: Uuid, role: Role) -> Claims {
        let now = Utc::now();
        Claims {
            user_id,
            tenant_id,
            role,
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        }
    }

    pub fn issue(&self, user_id: Uuid, tenant_id: Uuid, role: Role) -> Result<String, AuthError> {
        self.sign(&self.claims_for(user_id, tenant_id, role))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-unit-test-secret-0001";

    #[test]
    fn issues_and_verifies() {
        let keys = TokenKeys::new(SECRET, 24).unwrap();
        let user = Uuid::new_v4();
        let tenant = Uuid::new_v4();
        let token = keys.issue(user, tenant, Role::Manager).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id, user);
        assert_eq!(claims.tenant_id, tenant);
        assert_eq!(claims.role, Role::Manager);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn rejects_expired_tokens() {
        let keys = TokenKeys::new(SECRET, 24).unwrap();
        let mut claims = keys.claims_for(Uuid::new_v4(), Uuid::new_v4(), Role::Sales);
        claims.iat -= 3 * 24 * 3600;
        claims.exp = claims.iat + 3600;
        let token = keys.sign(&claims).unwrap();
        assert!(matches!(keys.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn rejects_foreign_signatures() {
        let ours = TokenKeys::new(SECRET, 24).unwrap();
        let theirs = TokenKeys::new("another-secret-another-secret-0002", 24).unwrap();
        let token = theirs.issue(Uuid::new_v4(), Uuid::new_v4(), Role::Admin).unwrap();
        assert!(matches!(ours.verify(&token), Err(AuthError::TokenInvalid(_))));
        assert!(matches!(ours.verify("not.a.token"), Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn rejects_unrepresentable_expiry() {
        assert!(matches!(TokenKeys::new(SECRET, 0), Err(AuthError::TokenGeneration(_))));
        assert!(TokenKeys::new(SECRET, 10_000_000_000_000_000).is_err());
        assert!(TokenKeys::new(SECRET, u64::MAX).is_err());
    }

    #[test]
    fn claims_use_camel_case() {
        let keys = TokenKeys::new(SECRET, 1).unwrap();
        let claims = keys.claims_for(Uuid::new_v4(), Uuid::new_v4(), Role::Admin);
        let value = serde_json::to_value(&claims).unwrap();
        assert!(value.get("userId").is_some());
        assert!(value.get("tenantId").is_some());
        assert_eq!(value["role"], "admin");
    }
}
