//! Borrow request model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::BorrowStatus;

/// Inclusive calendar-date range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// A range is well-formed when it does not end before it starts
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Number of calendar days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Two ranges overlap when they share at least one calendar day.
    /// Back-to-back ranges (one ends on day N, the other starts on N+1) do not.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Borrow request record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequest {
    pub id: i32,
    pub device_id: i32,
    pub user_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: BorrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BorrowRequest {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Borrow request with device and borrower names, for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowRequestDetails {
    pub id: i32,
    pub device_id: i32,
    pub device_name: String,
    pub user_id: i32,
    pub user_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: BorrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Active loan whose end date has passed
    #[sqlx(skip)]
    pub is_overdue: bool,
}

impl BorrowRequestDetails {
    pub fn with_overdue(mut self, today: NaiveDate) -> Self {
        self.is_overdue = self.status == BorrowStatus::Active && self.end_date < today;
        self
    }
}

/// Create borrow request body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBorrowRequest {
    pub device_id: i32,
    /// First day of the loan (YYYY-MM-DD)
    #[schema(value_type = String, example = "2024-03-01")]
    pub start_date: NaiveDate,
    /// Last day of the loan, inclusive (YYYY-MM-DD)
    #[schema(value_type = String, example = "2024-03-05")]
    pub end_date: NaiveDate,
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

/// Status change body
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBorrowStatus {
    pub status: BorrowStatus,
}

/// Borrow request query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BorrowQuery {
    pub status: Option<BorrowStatus>,
    pub device_id: Option<i32>,
    /// Ignored for non-admin callers, who only see their own requests
    pub user_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn range(s: u32, e: u32) -> DateRange {
        DateRange::new(day(s), day(e))
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let cases = [
            (range(1, 5), range(6, 10), false),
            (range(1, 5), range(5, 10), true),
            (range(1, 5), range(4, 7), true),
            (range(1, 10), range(3, 4), true),
            (range(3, 3), range(3, 3), true),
            (range(1, 2), range(4, 5), false),
        ];
        for (a, b, expected) in cases {
            assert_eq!(a.overlaps(&b), expected, "{:?} vs {:?}", a, b);
            assert_eq!(b.overlaps(&a), expected, "{:?} vs {:?}", b, a);
        }
    }

    #[test]
    fn test_overlap_matches_shared_day() {
        for s1 in 1..=8 {
            for e1 in s1..=8 {
                for s2 in 1..=8 {
                    for e2 in s2..=8 {
                        let a = range(s1, e1);
                        let b = range(s2, e2);
                        let covers = |r: &DateRange, d: NaiveDate| r.start <= d && d <= r.end;
                        let shares_day = (1..=8).any(|d| covers(&a, day(d)) && covers(&b, day(d)));
                        assert_eq!(a.overlaps(&b), shares_day);
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_day_range() {
        let r = range(4, 4);
        assert!(r.is_ordered());
        assert_eq!(r.days(), 1);
        assert!(!range(5, 4).is_ordered());
    }

    #[test]
    fn test_overdue_only_for_active() {
        let details = BorrowRequestDetails {
            id: 1,
            device_id: 1,
            device_name: "ThinkPad".to_string(),
            user_id: 2,
            user_name: "Jane".to_string(),
            start_date: day(1),
            end_date: day(5),
            reason: None,
            status: BorrowStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            is_overdue: false,
        };
        assert!(details.clone().with_overdue(day(6)).is_overdue);
        assert!(!details.clone().with_overdue(day(5)).is_overdue);

        let approved = BorrowRequestDetails {
            status: BorrowStatus::Approved,
            ..details
        };
        assert!(!approved.with_overdue(day(6)).is_overdue);
    }
}
