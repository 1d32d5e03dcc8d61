//! Circulation service: borrowed listings and the loan-renewal workflow

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::copy::{CopyDetails, CopyStatus},
    repository::Repository,
};

/// Route signalled to the caller after a successful renewal
pub const ALL_BORROWED_ROUTE: &str = "/api/v1/loans/borrowed";

/// Result of running the renewal workflow for one copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// No date was submitted; offer this default back for confirmation
    Proposal { renewal_date: NaiveDate },
    /// The due date was updated
    Renewed { due_back: NaiveDate },
    /// The submitted date was rejected; re-present the form
    Rejected {
        /// The offending submitted value
        value: NaiveDate,
        error_message: String,
        /// Fresh default proposal for the re-displayed field
        renewal_date: NaiveDate,
    },
}

/// Default due date offered when the form is first displayed
pub fn proposed_renewal_date(today: NaiveDate, proposal_weeks: i64) -> NaiveDate {
    today + Duration::weeks(proposal_weeks)
}

/// Validate a submitted renewal date against the allowed window
/// `[today, today + window_weeks]`.
pub fn validate_renewal_date(
    today: NaiveDate,
    proposed: NaiveDate,
    window_weeks: i64,
) -> Result<NaiveDate, String> {
    if proposed < today {
        return Err("Invalid date - renewal in past".to_string());
    }
    if proposed > today + Duration::weeks(window_weeks) {
        return Err(format!(
            "Invalid date - renewal more than {} weeks ahead",
            window_weeks
        ));
    }
    Ok(proposed)
}

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    policy: CirculationConfig,
}

impl CirculationService {
    pub fn new(repository: Repository, policy: CirculationConfig) -> Self {
        Self { repository, policy }
    }

    /// Copies on loan to one user, ordered by due date
    pub async fn borrowed_by_user(
        &self,
        user_id: i32,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<CopyDetails>, i64)> {
        self.repository
            .copies
            .borrowed_by_user(user_id, page, per_page)
            .await
    }

    /// All copies currently on loan
    pub async fn all_borrowed(&self, page: i64, per_page: i64) -> AppResult<(Vec<CopyDetails>, i64)> {
        self.repository.copies.all_borrowed(page, per_page).await
    }

    /// Copy details plus the default renewal proposal, for the form display
    pub async fn renewal_form(&self, copy_id: Uuid) -> AppResult<(CopyDetails, NaiveDate)> {
        let copy = self.repository.copies.get_details(copy_id).await?;
        let today = Utc::now().date_naive();
        Ok((
            copy,
            proposed_renewal_date(today, self.policy.renewal_proposal_weeks),
        ))
    }

    /// Run the renewal workflow for one copy.
    ///
    /// Validates the proposed date against the renewal window and, on
    /// acceptance, updates the copy's due date. Status and borrower are
    /// never touched here; a copy that is not on loan cannot be renewed.
    pub async fn renew(
        &self,
        copy_id: Uuid,
        proposed: Option<NaiveDate>,
    ) -> AppResult<RenewalOutcome> {
        let copy = self.repository.copies.get_by_id(copy_id).await?;

        if copy.status != CopyStatus::OnLoan {
            return Err(AppError::BusinessRule(format!(
                "Copy {} is not on loan",
                copy_id
            )));
        }

        let today = Utc::now().date_naive();
        let default_proposal = proposed_renewal_date(today, self.policy.renewal_proposal_weeks);

        let Some(date) = proposed else {
            return Ok(RenewalOutcome::Proposal {
                renewal_date: default_proposal,
            });
        };

        match validate_renewal_date(today, date, self.policy.renewal_window_weeks) {
            Ok(accepted) => {
                self.repository.copies.set_due_back(copy_id, accepted).await?;
                tracing::info!("Renewed copy {} until {}", copy_id, accepted);
                Ok(RenewalOutcome::Renewed { due_back: accepted })
            }
            Err(error_message) => Ok(RenewalOutcome::Rejected {
                value: date,
                error_message,
                renewal_date: default_proposal,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 1, 1)
    }

    #[test]
    fn default_proposal_is_three_weeks_out() {
        assert_eq!(proposed_renewal_date(today(), 3), date(2024, 1, 22));
    }

    #[test]
    fn every_date_inside_the_window_is_accepted() {
        let today = today();
        for offset in 0..=28 {
            let d = today + Duration::days(offset);
            assert_eq!(validate_renewal_date(today, d, 4), Ok(d));
        }
    }

    #[test]
    fn dates_in_the_past_are_rejected() {
        let result = validate_renewal_date(today(), date(2023, 12, 31), 4);
        assert_eq!(result, Err("Invalid date - renewal in past".to_string()));
    }

    #[test]
    fn dates_well_in_the_past_are_rejected() {
        for offset in 1..=60 {
            let d = today() - Duration::days(offset);
            assert!(validate_renewal_date(today(), d, 4).is_err());
        }
    }

    #[test]
    fn dates_beyond_the_window_are_rejected() {
        // 31 days out, window is 28
        let result = validate_renewal_date(today(), date(2024, 2, 1), 4);
        assert_eq!(
            result,
            Err("Invalid date - renewal more than 4 weeks ahead".to_string())
        );
    }

    #[test]
    fn window_boundaries_are_inclusive() {
        assert!(validate_renewal_date(today(), today(), 4).is_ok());
        assert!(validate_renewal_date(today(), date(2024, 1, 29), 4).is_ok());
        assert!(validate_renewal_date(today(), date(2024, 1, 30), 4).is_err());
    }

    #[test]
    fn accepted_date_is_returned_unchanged() {
        assert_eq!(
            validate_renewal_date(today(), date(2024, 1, 10), 4),
            Ok(date(2024, 1, 10))
        );
    }

    #[test]
    fn window_cap_is_a_policy_constant() {
        // A two-week policy rejects what the default four-week one accepts
        let d = date(2024, 1, 20);
        assert!(validate_renewal_date(today(), d, 4).is_ok());
        assert!(validate_renewal_date(today(), d, 2).is_err());
    }
}
