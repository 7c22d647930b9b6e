//! Planned workplace per user and day.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{UserId, Workplace, WorkplacePlanId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkplacePlan {
    pub id: WorkplacePlanId,
    pub user_id: UserId,
    pub date: NaiveDate,
    pub workplace: Workplace,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Workplace plan as submitted by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorkplacePlanInput {
    pub date: NaiveDate,
    pub workplace: Workplace,
}
