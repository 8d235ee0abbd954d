//! Authentication middleware
//!
//! Decodes the bearer JWT issued by the identity service into the caller
//! context and computes the caller's store access scope once per request.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use shared::{AccessScope, CallerContext, UserRole};
use uuid::Uuid;

use crate::error::AppError;
use crate::AppState;

/// Authenticated caller with its precomputed access scope
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub caller: CallerContext,
    pub scope: AccessScope,
}

impl CurrentUser {
    pub fn new(caller: CallerContext) -> Self {
        let scope = AccessScope::from(&caller);
        Self { caller, scope }
    }

    /// Fail with `InsufficientPermissions` unless the store is in scope
    pub fn require_store(&self, store_id: Uuid) -> Result<(), AppError> {
        if self.scope.allows(store_id) {
            Ok(())
        } else {
            Err(AppError::InsufficientPermissions)
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: UserRole,
    #[serde(default)]
    pub store_ids: Vec<Uuid>,
    pub exp: i64,
    pub iat: i64,
}

impl From<Claims> for CallerContext {
    fn from(claims: Claims) -> Self {
        CallerContext {
            user_id: claims.sub,
            role: claims.role,
            accessible_store_ids: claims.store_ids,
        }
    }
}

/// Decode and validate JWT token
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    use jsonwebtoken::{decode, DecodingKey, Validation};

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => {
            return AppError::Unauthorized("Missing or invalid Authorization header".to_string())
                .into_response();
        }
    };

    let claims = match decode_jwt(token, &state.config.jwt.secret) {
        Ok(claims) => claims,
        Err(err) => return err.into_response(),
    };

    request
        .extensions_mut()
        .insert(CurrentUser::new(claims.into()));

    next.run(request).await
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims(role: UserRole, store_ids: Vec<Uuid>) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: Uuid::new_v4(),
            role,
            store_ids,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_decode_builds_scoped_caller() {
        let store = Uuid::new_v4();
        let c = claims(UserRole::Seller, vec![store]);
        let user_id = c.sub;
        let decoded = decode_jwt(&token(&c, "secret"), "secret").unwrap();
        let user = CurrentUser::new(decoded.into());

        assert_eq!(user.caller.user_id, user_id);
        assert!(user.require_store(store).is_ok());
        assert!(matches!(
            user.require_store(Uuid::new_v4()),
            Err(AppError::InsufficientPermissions)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let c = claims(UserRole::Admin, vec![]);
        assert!(matches!(
            decode_jwt(&token(&c, "secret"), "other"),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut c = claims(UserRole::Admin, vec![]);
        c.exp = chrono::Utc::now().timestamp() - 3600;
        assert!(decode_jwt(&token(&c, "secret"), "secret").is_err());
    }
}
