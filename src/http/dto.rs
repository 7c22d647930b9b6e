//! Data Transfer Objects for the HTTP API.
//!
//! Entities and service results serialize directly; the types here cover
//! request bodies, query strings and the few responses that wrap them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{ApprovalStatus, User, UserId};
use crate::services::auth::TokenPair;
use crate::services::stats::PeriodType;

// =============================================================================
// Auth
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub tokens: TokenPair,
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

// =============================================================================
// Queries
// =============================================================================

/// `?date=YYYY-MM-DD`, defaulting to today.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<NaiveDate>,
}

/// `?date_from=..&date_to=..`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RangeQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Time entries by single date or by range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeEntriesQuery {
    pub date: Option<NaiveDate>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Required range, used by the calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredRangeQuery {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// Required date, used by the calendar.
#[derive(Debug, Clone, Deserialize)]
pub struct RequiredDateQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveOnlyQuery {
    #[serde(default = "default_true")]
    pub active_only: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsQuery {
    #[serde(default)]
    pub period: PeriodType,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeStatsQuery {
    pub user_id: UserId,
    #[serde(default)]
    pub period: PeriodType,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusFilterQuery {
    pub status: Option<ApprovalStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeRequestsQuery {
    pub status: Option<ApprovalStatus>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

// =============================================================================
// Misc bodies and responses
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct LogoRequest {
    pub logo_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowedIconsResponse {
    pub icons: Vec<String>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}
