//! User model and related types

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Capability gating every staff-only operation (author/book management,
/// copy cataloguing, the borrowed listing and loan renewal).
pub const CAN_MARK_RETURNED: &str = "can_mark_returned";

/// Account type slug (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Member,
    Librarian,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Member => "member",
            AccountType::Librarian => "librarian",
        }
    }

    /// Named capabilities held by this account type
    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            AccountType::Member => &[],
            AccountType::Librarian => &[CAN_MARK_RETURNED],
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AccountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "member" => Ok(AccountType::Member),
            "librarian" => Ok(AccountType::Librarian),
            _ => Err(format!("Invalid account type slug: {}", s)),
        }
    }
}

// SQLx conversion for AccountType
impl sqlx::Type<Postgres> for AccountType {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for AccountType {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for AccountType {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub login: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub account_type: AccountType,
    pub created_at: Option<DateTime<Utc>>,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    /// Login (username) - required and unique, used for authentication
    #[validate(length(min = 3, message = "Login must be at least 3 characters"))]
    pub login: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub account_type: Option<AccountType>,
}

/// JWT claims for an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Login of the authenticated user
    pub sub: String,
    pub user_id: i32,
    pub account_type: AccountType,
    pub capabilities: Vec<String>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Encode the claims into a signed JWT
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Decode and validate a JWT into claims
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let data = decode::<UserClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }

    pub fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.iter().any(|c| c == capability)
    }

    /// Require a named capability, rejecting the request otherwise
    pub fn require_capability(&self, capability: &str) -> AppResult<()> {
        if self.has_capability(capability) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing capability: {}",
                capability
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(account_type: AccountType) -> UserClaims {
        UserClaims {
            sub: "someone".to_string(),
            user_id: 1,
            account_type,
            capabilities: account_type
                .capabilities()
                .iter()
                .map(|c| c.to_string())
                .collect(),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn librarian_holds_mark_returned_capability() {
        assert!(claims(AccountType::Librarian).has_capability(CAN_MARK_RETURNED));
        assert!(claims(AccountType::Librarian)
            .require_capability(CAN_MARK_RETURNED)
            .is_ok());
    }

    #[test]
    fn member_is_denied_mark_returned_capability() {
        let result = claims(AccountType::Member).require_capability(CAN_MARK_RETURNED);
        assert!(matches!(result, Err(AppError::Authorization(_))));
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let original = UserClaims {
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
            ..claims(AccountType::Librarian)
        };
        let token = original.create_token("test-secret").unwrap();
        let decoded = UserClaims::from_token(&token, "test-secret").unwrap();
        assert_eq!(decoded.user_id, original.user_id);
        assert_eq!(decoded.account_type, AccountType::Librarian);
    }
}
