//! Repository trait definitions for database operations.
//!
//! Persistence is split into focused traits, one per group of tables, so
//! services only name what they use and backends can be tested piece by piece.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`users`]: Accounts and employee profiles
//! - [`time_tracking`]: Time entries and workplace plans
//! - [`leave`]: Day statuses and vacations
//! - [`calendar`]: Generated calendar days
//! - [`workflow`]: Change requests and notifications
//! - [`organization`]: Departments and company settings
//!
//! # Convenience Trait Bound
//!
//! For code that needs every capability, use the [`FullRepository`] bound:
//!
//! ```ignore
//! async fn office_today<R: FullRepository + ?Sized>(repo: &R) -> RepositoryResult<usize> {
//!     let today = chrono::Local::now().date_naive();
//!     let plans = repo.list_workplace_plans(None, today, today).await?;
//!     Ok(plans.len())
//! }
//! ```

pub mod calendar;
pub mod error;
pub mod leave;
pub mod organization;
pub mod time_tracking;
pub mod users;
pub mod workflow;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

pub use calendar::CalendarRepository;
pub use leave::{DayStatusRepository, VacationRepository};
pub use organization::OrganizationRepository;
pub use time_tracking::{TimeEntryRepository, WorkplacePlanRepository};
pub use users::UserRepository;
pub use workflow::{ChangeRequestFilter, ChangeRequestRepository, NotificationRepository};

/// Composite trait bound for a complete repository implementation.
///
/// Automatically implemented for any type that implements every
/// repository trait.
pub trait FullRepository:
    UserRepository
    + TimeEntryRepository
    + WorkplacePlanRepository
    + DayStatusRepository
    + VacationRepository
    + CalendarRepository
    + ChangeRequestRepository
    + NotificationRepository
    + OrganizationRepository
{
}

impl<T> FullRepository for T where
    T: UserRepository
        + TimeEntryRepository
        + WorkplacePlanRepository
        + DayStatusRepository
        + VacationRepository
        + CalendarRepository
        + ChangeRequestRepository
        + NotificationRepository
        + OrganizationRepository
{
}
