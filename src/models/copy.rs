//! Book copy (physical instance) model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;
use uuid::Uuid;

/// Circulation status of a physical copy.
///
/// Stored in the database as the historical one-letter codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CopyStatus {
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl CopyStatus {
    pub fn code(&self) -> &'static str {
        match self {
            CopyStatus::Maintenance => "m",
            CopyStatus::OnLoan => "o",
            CopyStatus::Available => "a",
            CopyStatus::Reserved => "r",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CopyStatus::Maintenance => "Maintenance",
            CopyStatus::OnLoan => "On loan",
            CopyStatus::Available => "Available",
            CopyStatus::Reserved => "Reserved",
        }
    }
}

impl Default for CopyStatus {
    fn default() -> Self {
        CopyStatus::Maintenance
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for CopyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(CopyStatus::Maintenance),
            "o" => Ok(CopyStatus::OnLoan),
            "a" => Ok(CopyStatus::Available),
            "r" => Ok(CopyStatus::Reserved),
            _ => Err(format!("Invalid copy status code: {}", s)),
        }
    }
}

// SQLx conversion for CopyStatus
impl sqlx::Type<Postgres> for CopyStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for CopyStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CopyStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.code().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Book copy model from database
///
/// Invariant: `due_back` is set iff `status` is OnLoan; `borrower_id` is set
/// only when `status` is OnLoan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookCopy {
    pub id: Uuid,
    pub book_id: i32,
    /// Edition description, fixed at cataloguing time
    pub imprint: String,
    pub status: CopyStatus,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
}

/// Copy with book and borrower context for circulation listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CopyDetails {
    pub id: Uuid,
    pub book_id: i32,
    pub title: String,
    pub imprint: String,
    pub status: CopyStatus,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
    pub borrower_name: Option<String>,
    pub is_overdue: bool,
}

/// Create copy request (staff cataloguing a physical copy)
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCopy {
    pub imprint: String,
    /// Defaults to maintenance when omitted
    pub status: Option<CopyStatus>,
    pub due_back: Option<NaiveDate>,
    pub borrower_id: Option<i32>,
}
