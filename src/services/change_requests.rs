//! Change requests: employee proposals that an admin approves or rejects.
//!
//! Approving a request applies it: time entries, vacations and sick days
//! are created, edited or deleted on the employee's behalf. Admin approval
//! bypasses the employee-facing limits (edit window, weekly horizon, daily
//! maximum) but not the consistency rules (vacation overlap, day ranges).

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::day_status::{self, SickDayRange};
use super::error::{found, ServiceError, ServiceResult};
use super::mailer::EmailService;
use super::notifications;
use super::users::get_employee;
use super::vacations;
use crate::db::{ChangeRequestFilter, FullRepository};
use crate::models::{
    ApprovalStatus, ChangeRequest, ChangeRequestId, ChangeRequestInput, ChangeRequestResolution,
    ChangeRequestType, Employee, NewChangeRequest, NewTimeEntry, TimeEntryChanges, User, UserId,
    VacationChanges, VacationInput, Workplace, MAX_COMMENT_LEN,
};

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 500;

/// A request together with who filed it.
#[derive(Debug, Clone, Serialize)]
pub struct ChangeRequestView {
    #[serde(flatten)]
    pub request: ChangeRequest,
    pub employee_name: Option<String>,
    pub employee_email: Option<String>,
}

impl ChangeRequestView {
    fn new(request: ChangeRequest, employee: Option<&Employee>) -> Self {
        Self {
            request,
            employee_name: employee.and_then(|e| e.profile.as_ref()).map(|p| p.full_name()),
            employee_email: employee.map(|e| e.user.email.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeRequestList {
    pub requests: Vec<ChangeRequestView>,
    pub total: usize,
    pub pending_count: usize,
}

async fn with_employee(
    repo: &dyn FullRepository,
    request: ChangeRequest,
) -> ServiceResult<ChangeRequestView> {
    let employee = match get_employee(repo, request.user_id).await {
        Ok(employee) => Some(employee),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };
    Ok(ChangeRequestView::new(request, employee.as_ref()))
}

async fn with_employees(
    repo: &dyn FullRepository,
    requests: Vec<ChangeRequest>,
) -> ServiceResult<Vec<ChangeRequestView>> {
    let employees = super::users::list_employees(repo, false).await?;
    Ok(requests
        .into_iter()
        .map(|r| {
            let employee = employees.iter().find(|e| e.user.id == r.user_id);
            ChangeRequestView::new(r, employee)
        })
        .collect())
}

fn require<T>(value: Option<T>, field: &str, kind: ChangeRequestType) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("{} is required for {} requests", field, kind)))
}

/// Shape checks and ownership of the referenced record.
async fn check_input(
    repo: &dyn FullRepository,
    user_id: UserId,
    input: &ChangeRequestInput,
) -> ServiceResult<()> {
    if input.reason.trim().is_empty() {
        return Err(ServiceError::validation("reason is required"));
    }
    if input.comment.as_deref().map_or(0, |c| c.chars().count()) > MAX_COMMENT_LEN {
        return Err(ServiceError::validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LEN
        )));
    }
    if input.date_to.is_some_and(|to| to < input.date) {
        return Err(ServiceError::validation(
            "date_to must be after or equal to date",
        ));
    }
    if let (Some(start), Some(end)) = (input.start_time, input.end_time) {
        if end <= start {
            return Err(ServiceError::validation("end_time must be after start_time"));
        }
    }

    let kind = input.request_type;
    let owner = match kind {
        ChangeRequestType::Add => {
            require(input.start_time, "start_time", kind)?;
            require(input.end_time, "end_time", kind)?;
            None
        }
        ChangeRequestType::Edit | ChangeRequestType::Delete => {
            let id = require(input.time_entry_id, "time_entry_id", kind)?;
            Some(found(repo.get_time_entry(id).await?, "Time entry")?.user_id)
        }
        ChangeRequestType::EditVacation | ChangeRequestType::DeleteVacation => {
            let id = require(input.vacation_id, "vacation_id", kind)?;
            Some(found(repo.get_vacation(id).await?, "Vacation")?.user_id)
        }
        ChangeRequestType::EditSickDay | ChangeRequestType::DeleteSickDay => {
            let id = require(input.day_status_id, "day_status_id", kind)?;
            Some(found(repo.get_day_status(id).await?, "Day status")?.user_id)
        }
        ChangeRequestType::AddVacation | ChangeRequestType::AddSickDay => None,
    };
    if owner.is_some_and(|owner| owner != user_id) {
        return Err(ServiceError::forbidden(
            "Change requests can only target your own records",
        ));
    }
    Ok(())
}

/// Requests filed by `user_id`, newest first.
pub async fn list_mine(
    repo: &dyn FullRepository,
    user_id: UserId,
    status: Option<ApprovalStatus>,
) -> ServiceResult<Vec<ChangeRequestView>> {
    let filter = ChangeRequestFilter::for_user(user_id).with_status(status);
    let requests = repo.list_change_requests(&filter).await?;
    with_employees(repo, requests).await
}

/// File a pending request and notify the admins.
pub async fn create(
    repo: &dyn FullRepository,
    mail: &EmailService,
    user: &User,
    input: ChangeRequestInput,
) -> ServiceResult<ChangeRequestView> {
    check_input(repo, user.id, &input).await?;

    let request = repo
        .create_change_request(NewChangeRequest {
            user_id: user.id,
            input,
        })
        .await?;
    log::info!(
        "User {} filed {} request {}",
        user.id,
        request.request_type,
        request.id
    );

    let requester = get_employee(repo, user.id).await?;
    notifications::notify_admins_change_request(repo, mail, &requester, &request).await?;
    Ok(ChangeRequestView::new(request, Some(&requester)))
}

/// Withdraw an own pending request.
pub async fn delete(
    repo: &dyn FullRepository,
    user_id: UserId,
    id: ChangeRequestId,
) -> ServiceResult<()> {
    let deletable = repo
        .get_change_request(id)
        .await?
        .is_some_and(|r| r.user_id == user_id && r.is_pending());
    if !deletable {
        return Err(ServiceError::not_found(
            "Request not found or cannot be deleted",
        ));
    }
    repo.delete_change_request(id).await?;
    Ok(())
}

pub async fn pending_count(repo: &dyn FullRepository) -> ServiceResult<usize> {
    let filter = ChangeRequestFilter::default().with_status(Some(ApprovalStatus::Pending));
    Ok(repo.count_change_requests(&filter).await?)
}

/// One page of all requests with the overall and pending totals.
pub async fn list_all(
    repo: &dyn FullRepository,
    status: Option<ApprovalStatus>,
    limit: usize,
    offset: usize,
) -> ServiceResult<ChangeRequestList> {
    if limit > MAX_PAGE_SIZE {
        return Err(ServiceError::validation(format!(
            "limit must be at most {}",
            MAX_PAGE_SIZE
        )));
    }
    let filter = ChangeRequestFilter::default().with_status(status);
    let total = repo.count_change_requests(&filter).await?;
    let requests = repo
        .list_change_requests(&filter.page(limit, offset))
        .await?;

    Ok(ChangeRequestList {
        requests: with_employees(repo, requests).await?,
        total,
        pending_count: pending_count(repo).await?,
    })
}

/// Approve or reject a pending request. Approval applies the change first;
/// if that fails the request stays pending.
pub async fn resolve(
    repo: &dyn FullRepository,
    admin: &User,
    id: ChangeRequestId,
    resolution: ChangeRequestResolution,
    now: DateTime<Utc>,
) -> ServiceResult<ChangeRequestView> {
    if resolution.status == ApprovalStatus::Pending {
        return Err(ServiceError::validation(
            "status must be approved or rejected",
        ));
    }
    let mut request = repo
        .get_change_request(id)
        .await?
        .filter(ChangeRequest::is_pending)
        .ok_or_else(|| ServiceError::not_found("Request not found or already resolved"))?;

    if resolution.status == ApprovalStatus::Approved {
        apply(repo, &request).await?;
    }

    request.status = resolution.status;
    request.admin_id = Some(admin.id);
    request.admin_comment = resolution.admin_comment;
    request.resolved_at = Some(now);
    request.updated_at = now;
    let request = repo.update_change_request(request).await?;

    log::info!(
        "Admin {} {} change request {}",
        admin.id,
        request.status,
        request.id
    );
    with_employee(repo, request).await
}

/// Carry out an approved request. Missing targets are skipped.
async fn apply(repo: &dyn FullRepository, request: &ChangeRequest) -> ServiceResult<()> {
    let kind = request.request_type;
    match kind {
        ChangeRequestType::Add => {
            let entry = NewTimeEntry {
                user_id: request.user_id,
                date: request.date,
                start_time: require(request.start_time, "start_time", kind)?,
                end_time: require(request.end_time, "end_time", kind)?,
                break_minutes: request.break_minutes.unwrap_or(0),
                workplace: request.workplace.unwrap_or(Workplace::Office),
                comment: request.comment.clone(),
            };
            repo.create_time_entry(entry).await?;
        }
        ChangeRequestType::Edit => {
            let id = require(request.time_entry_id, "time_entry_id", kind)?;
            if let Some(mut entry) = repo.get_time_entry(id).await? {
                entry.apply(&TimeEntryChanges {
                    date: None,
                    start_time: request.start_time,
                    end_time: request.end_time,
                    break_minutes: request.break_minutes,
                    workplace: request.workplace,
                    comment: request.comment.clone(),
                });
                if entry.end_time <= entry.start_time {
                    return Err(ServiceError::validation("end_time must be after start_time"));
                }
                repo.update_time_entry(entry).await?;
            }
        }
        ChangeRequestType::Delete => {
            let id = require(request.time_entry_id, "time_entry_id", kind)?;
            repo.delete_time_entry(id).await?;
        }
        ChangeRequestType::AddVacation => {
            vacations::create_vacation(
                repo,
                request.user_id,
                VacationInput {
                    date_from: request.date,
                    date_to: request.end_date(),
                    note: request.comment.clone(),
                },
            )
            .await?;
        }
        ChangeRequestType::EditVacation => {
            let id = require(request.vacation_id, "vacation_id", kind)?;
            if let Some(vacation) = repo.get_vacation(id).await? {
                let changes = VacationChanges {
                    date_from: Some(request.date),
                    date_to: request.date_to,
                    status: None,
                    note: request.comment.clone(),
                };
                vacations::apply_changes(repo, vacation, changes).await?;
            }
        }
        ChangeRequestType::DeleteVacation => {
            let id = require(request.vacation_id, "vacation_id", kind)?;
            if let Some(vacation) = repo.get_vacation(id).await? {
                vacations::remove(repo, &vacation).await?;
            }
        }
        ChangeRequestType::AddSickDay => {
            day_status::set_sick_range(
                repo,
                request.user_id,
                SickDayRange {
                    start_date: request.date,
                    end_date: request.end_date(),
                    note: request.comment.clone(),
                },
            )
            .await?;
        }
        ChangeRequestType::EditSickDay => {
            let id = require(request.day_status_id, "day_status_id", kind)?;
            if let Some(mut status) = repo.get_day_status(id).await? {
                status.date = request.date;
                if request.comment.is_some() {
                    status.note = request.comment.clone();
                }
                repo.update_day_status(status).await?;
            }
        }
        ChangeRequestType::DeleteSickDay => {
            let id = require(request.day_status_id, "day_status_id", kind)?;
            repo.delete_day_status(id).await?;
        }
    }
    Ok(())
}
