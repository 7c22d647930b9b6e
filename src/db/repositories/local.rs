//! In-memory local repository implementation.
//!
//! This module provides a local implementation of all repository traits
//! suitable for unit testing and local development. All data is stored in
//! memory using `BTreeMap`s keyed by id, so iteration order is insertion
//! order and results are deterministic.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::db::repository::*;
use crate::models::*;

/// In-memory local repository.
///
/// Unique constraints of the relational schema (user email, one day status
/// and one workplace plan per user and date, department name) are enforced
/// here too.
///
/// # Example
/// ```ignore
/// use time_control::db::repositories::LocalRepository;
///
/// #[tokio::test]
/// async fn test_departments_are_seeded() {
///     let repo = LocalRepository::new();
///     let departments = repo.list_departments().await.unwrap();
///     assert_eq!(departments.len(), 6);
/// }
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    users: BTreeMap<UserId, User>,
    profiles: BTreeMap<UserId, EmployeeProfile>,
    time_entries: BTreeMap<TimeEntryId, TimeEntry>,
    day_statuses: BTreeMap<DayStatusId, DayStatus>,
    vacations: BTreeMap<VacationId, Vacation>,
    workplace_plans: BTreeMap<WorkplacePlanId, WorkplacePlan>,
    calendar: BTreeMap<NaiveDate, CalendarDay>,
    change_requests: BTreeMap<ChangeRequestId, ChangeRequest>,
    departments: BTreeMap<DepartmentId, Department>,
    notifications: BTreeMap<NotificationId, Notification>,
    notification_settings: BTreeMap<UserId, NotificationSettings>,
    company_settings: BTreeMap<String, CompanySetting>,

    // Shared id sequence for every table
    next_id: i64,

    // Connection health
    is_healthy: bool,
}

impl LocalData {
    fn next_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            profiles: BTreeMap::new(),
            time_entries: BTreeMap::new(),
            day_statuses: BTreeMap::new(),
            vacations: BTreeMap::new(),
            workplace_plans: BTreeMap::new(),
            calendar: BTreeMap::new(),
            change_requests: BTreeMap::new(),
            departments: BTreeMap::new(),
            notifications: BTreeMap::new(),
            notification_settings: BTreeMap::new(),
            company_settings: BTreeMap::new(),
            next_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a repository holding only the default departments.
    pub fn new() -> Self {
        let mut data = LocalData::default();
        let now = Utc::now();
        for name in DEFAULT_DEPARTMENTS {
            let id = DepartmentId::new(data.next_id());
            data.departments.insert(
                id,
                Department {
                    id,
                    name: name.to_string(),
                    is_default: true,
                    created_at: now,
                },
            );
        }
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Number of stored users.
    pub fn user_count(&self) -> usize {
        self.data.read().users.len()
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::unavailable("Database is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn in_range(date: NaiveDate, from: NaiveDate, to: NaiveDate) -> bool {
    from <= date && date <= to
}

fn owned_by(user_id: Option<UserId>, owner: UserId) -> bool {
    user_id.map_or(true, |id| id == owner)
}

fn duplicate(message: &str, operation: &str) -> RepositoryError {
    RepositoryError::duplicate(message).with_operation(operation)
}

#[async_trait]
impl UserRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        self.check_health()?;
        let mut data = self.data.write();
        if data
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(duplicate("Email already registered", "create_user"));
        }

        let now = Utc::now();
        let id = UserId::new(data.next_id());
        let stored = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
        };
        data.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        self.check_health()?;
        Ok(self.data.read().users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&self, active_only: bool) -> RepositoryResult<Vec<User>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .users
            .values()
            .filter(|u| !active_only || u.is_active)
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> RepositoryResult<User> {
        self.check_health()?;
        let mut data = self.data.write();
        if let Some(ref email) = changes.email {
            if data
                .users
                .values()
                .any(|u| u.id != id && u.email.eq_ignore_ascii_case(email))
            {
                return Err(duplicate("Email already registered", "update_user"));
            }
        }

        let user = data
            .users
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::missing("user", id))?;
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(active) = changes.is_active {
            user.is_active = active;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.users.remove(&id).is_none() {
            return Ok(false);
        }
        data.profiles.remove(&id);
        data.time_entries.retain(|_, e| e.user_id != id);
        data.day_statuses.retain(|_, s| s.user_id != id);
        data.vacations.retain(|_, v| v.user_id != id);
        data.workplace_plans.retain(|_, p| p.user_id != id);
        data.change_requests.retain(|_, r| r.user_id != id);
        data.notifications.retain(|_, n| n.user_id != id);
        data.notification_settings.remove(&id);
        for request in data.change_requests.values_mut() {
            if request.admin_id == Some(id) {
                request.admin_id = None;
            }
        }
        for notification in data.notifications.values_mut() {
            if notification.related_user_id == Some(id) {
                notification.related_user_id = None;
            }
        }
        Ok(true)
    }

    async fn get_profile(&self, user_id: UserId) -> RepositoryResult<Option<EmployeeProfile>> {
        self.check_health()?;
        Ok(self.data.read().profiles.get(&user_id).cloned())
    }

    async fn save_profile(&self, profile: EmployeeProfile) -> RepositoryResult<EmployeeProfile> {
        self.check_health()?;
        let mut data = self.data.write();
        if !data.users.contains_key(&profile.user_id) {
            return Err(RepositoryError::missing("user", profile.user_id));
        }
        data.profiles.insert(profile.user_id, profile.clone());
        Ok(profile)
    }

    async fn list_profiles(&self) -> RepositoryResult<Vec<EmployeeProfile>> {
        self.check_health()?;
        Ok(self.data.read().profiles.values().cloned().collect())
    }
}

#[async_trait]
impl TimeEntryRepository for LocalRepository {
    async fn create_time_entry(&self, entry: NewTimeEntry) -> RepositoryResult<TimeEntry> {
        self.check_health()?;
        let mut data = self.data.write();
        let now = Utc::now();
        let id = TimeEntryId::new(data.next_id());
        let stored = TimeEntry {
            id,
            user_id: entry.user_id,
            date: entry.date,
            start_time: entry.start_time,
            end_time: entry.end_time,
            break_minutes: entry.break_minutes,
            workplace: entry.workplace,
            comment: entry.comment,
            created_at: now,
            updated_at: now,
        };
        data.time_entries.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_time_entry(&self, id: TimeEntryId) -> RepositoryResult<Option<TimeEntry>> {
        self.check_health()?;
        Ok(self.data.read().time_entries.get(&id).cloned())
    }

    async fn list_time_entries(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<TimeEntry>> {
        self.check_health()?;
        let mut entries: Vec<TimeEntry> = self
            .data
            .read()
            .time_entries
            .values()
            .filter(|e| owned_by(user_id, e.user_id) && in_range(e.date, from, to))
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.date, e.start_time, e.id));
        Ok(entries)
    }

    async fn update_time_entry(&self, entry: TimeEntry) -> RepositoryResult<TimeEntry> {
        self.check_health()?;
        let mut data = self.data.write();
        let stored = data
            .time_entries
            .get_mut(&entry.id)
            .ok_or_else(|| RepositoryError::missing("time_entry", entry.id))?;
        *stored = entry;
        Ok(stored.clone())
    }

    async fn delete_time_entry(&self, id: TimeEntryId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.write().time_entries.remove(&id).is_some())
    }
}

#[async_trait]
impl WorkplacePlanRepository for LocalRepository {
    async fn upsert_workplace_plan(
        &self,
        user_id: UserId,
        date: NaiveDate,
        workplace: Workplace,
    ) -> RepositoryResult<WorkplacePlan> {
        self.check_health()?;
        let mut data = self.data.write();
        let now = Utc::now();
        if let Some(plan) = data
            .workplace_plans
            .values_mut()
            .find(|p| p.user_id == user_id && p.date == date)
        {
            plan.workplace = workplace;
            plan.updated_at = now;
            return Ok(plan.clone());
        }

        let id = WorkplacePlanId::new(data.next_id());
        let plan = WorkplacePlan {
            id,
            user_id,
            date,
            workplace,
            created_at: now,
            updated_at: now,
        };
        data.workplace_plans.insert(id, plan.clone());
        Ok(plan)
    }

    async fn get_workplace_plan(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<WorkplacePlan>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .workplace_plans
            .values()
            .find(|p| p.user_id == user_id && p.date == date)
            .cloned())
    }

    async fn list_workplace_plans(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<WorkplacePlan>> {
        self.check_health()?;
        let mut plans: Vec<WorkplacePlan> = self
            .data
            .read()
            .workplace_plans
            .values()
            .filter(|p| owned_by(user_id, p.user_id) && in_range(p.date, from, to))
            .cloned()
            .collect();
        plans.sort_by_key(|p| (p.date, p.user_id));
        Ok(plans)
    }

    async fn delete_workplace_plan(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        let before = data.workplace_plans.len();
        data.workplace_plans
            .retain(|_, p| !(p.user_id == user_id && p.date == date));
        Ok(data.workplace_plans.len() < before)
    }
}

#[async_trait]
impl DayStatusRepository for LocalRepository {
    async fn upsert_day_status(
        &self,
        user_id: UserId,
        date: NaiveDate,
        status: StatusType,
        note: Option<String>,
    ) -> RepositoryResult<DayStatus> {
        self.check_health()?;
        let mut data = self.data.write();
        let now = Utc::now();
        if let Some(existing) = data
            .day_statuses
            .values_mut()
            .find(|s| s.user_id == user_id && s.date == date)
        {
            existing.status = status;
            existing.note = note;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let id = DayStatusId::new(data.next_id());
        let stored = DayStatus {
            id,
            user_id,
            date,
            status,
            note,
            created_at: now,
            updated_at: now,
        };
        data.day_statuses.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_day_status(&self, id: DayStatusId) -> RepositoryResult<Option<DayStatus>> {
        self.check_health()?;
        Ok(self.data.read().day_statuses.get(&id).cloned())
    }

    async fn get_day_status_for_date(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DayStatus>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .day_statuses
            .values()
            .find(|s| s.user_id == user_id && s.date == date)
            .cloned())
    }

    async fn list_day_statuses(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<DayStatus>> {
        self.check_health()?;
        let mut statuses: Vec<DayStatus> = self
            .data
            .read()
            .day_statuses
            .values()
            .filter(|s| owned_by(user_id, s.user_id) && in_range(s.date, from, to))
            .cloned()
            .collect();
        statuses.sort_by_key(|s| (s.date, s.user_id));
        Ok(statuses)
    }

    async fn list_day_statuses_of_type(
        &self,
        user_id: UserId,
        status: StatusType,
    ) -> RepositoryResult<Vec<DayStatus>> {
        self.check_health()?;
        let mut statuses: Vec<DayStatus> = self
            .data
            .read()
            .day_statuses
            .values()
            .filter(|s| s.user_id == user_id && s.status == status)
            .cloned()
            .collect();
        statuses.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(statuses)
    }

    async fn update_day_status(&self, status: DayStatus) -> RepositoryResult<DayStatus> {
        self.check_health()?;
        let mut data = self.data.write();
        if data
            .day_statuses
            .values()
            .any(|s| s.id != status.id && s.user_id == status.user_id && s.date == status.date)
        {
            return Err(duplicate(
                "Day status already exists for this date",
                "update_day_status",
            ));
        }
        let stored = data
            .day_statuses
            .get_mut(&status.id)
            .ok_or_else(|| RepositoryError::missing("day_status", status.id))?;
        *stored = status;
        Ok(stored.clone())
    }

    async fn delete_day_status(&self, id: DayStatusId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.write().day_statuses.remove(&id).is_some())
    }

    async fn delete_day_statuses_in_range(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
        status: StatusType,
    ) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let before = data.day_statuses.len();
        data.day_statuses.retain(|_, s| {
            !(s.user_id == user_id && s.status == status && in_range(s.date, from, to))
        });
        Ok(before - data.day_statuses.len())
    }
}

#[async_trait]
impl VacationRepository for LocalRepository {
    async fn create_vacation(&self, vacation: NewVacation) -> RepositoryResult<Vacation> {
        self.check_health()?;
        let mut data = self.data.write();
        let now = Utc::now();
        let id = VacationId::new(data.next_id());
        let stored = Vacation {
            id,
            user_id: vacation.user_id,
            date_from: vacation.date_from,
            date_to: vacation.date_to,
            status: vacation.status,
            note: vacation.note,
            created_at: now,
            updated_at: now,
        };
        data.vacations.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_vacation(&self, id: VacationId) -> RepositoryResult<Option<Vacation>> {
        self.check_health()?;
        Ok(self.data.read().vacations.get(&id).cloned())
    }

    async fn list_vacations(&self, user_id: UserId) -> RepositoryResult<Vec<Vacation>> {
        self.check_health()?;
        let mut vacations: Vec<Vacation> = self
            .data
            .read()
            .vacations
            .values()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect();
        vacations.sort_by(|a, b| b.date_from.cmp(&a.date_from));
        Ok(vacations)
    }

    async fn list_vacations_overlapping(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<Vacation>> {
        self.check_health()?;
        let mut vacations: Vec<Vacation> = self
            .data
            .read()
            .vacations
            .values()
            .filter(|v| owned_by(user_id, v.user_id) && v.overlaps(from, to))
            .cloned()
            .collect();
        vacations.sort_by_key(|v| (v.date_from, v.id));
        Ok(vacations)
    }

    async fn update_vacation(&self, vacation: Vacation) -> RepositoryResult<Vacation> {
        self.check_health()?;
        let mut data = self.data.write();
        let stored = data
            .vacations
            .get_mut(&vacation.id)
            .ok_or_else(|| RepositoryError::missing("vacation", vacation.id))?;
        *stored = vacation;
        Ok(stored.clone())
    }

    async fn delete_vacation(&self, id: VacationId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.write().vacations.remove(&id).is_some())
    }
}

#[async_trait]
impl CalendarRepository for LocalRepository {
    async fn insert_calendar_days(&self, days: Vec<CalendarDay>) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let mut inserted = 0;
        for day in days {
            if !data.calendar.contains_key(&day.date) {
                data.calendar.insert(day.date, day);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn get_calendar_day(&self, date: NaiveDate) -> RepositoryResult<Option<CalendarDay>> {
        self.check_health()?;
        Ok(self.data.read().calendar.get(&date).cloned())
    }

    async fn list_calendar_days(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<CalendarDay>> {
        self.check_health()?;
        if from > to {
            return Ok(Vec::new());
        }
        Ok(self
            .data
            .read()
            .calendar
            .range(from..=to)
            .map(|(_, day)| day.clone())
            .collect())
    }
}

fn matches_filter(request: &ChangeRequest, filter: &ChangeRequestFilter) -> bool {
    owned_by(filter.user_id, request.user_id)
        && filter.status.map_or(true, |status| request.status == status)
}

#[async_trait]
impl ChangeRequestRepository for LocalRepository {
    async fn create_change_request(
        &self,
        request: NewChangeRequest,
    ) -> RepositoryResult<ChangeRequest> {
        self.check_health()?;
        let mut data = self.data.write();
        let now = Utc::now();
        let id = ChangeRequestId::new(data.next_id());
        let input = request.input;
        let stored = ChangeRequest {
            id,
            user_id: request.user_id,
            request_type: input.request_type,
            time_entry_id: input.time_entry_id,
            vacation_id: input.vacation_id,
            day_status_id: input.day_status_id,
            date: input.date,
            date_to: input.date_to,
            start_time: input.start_time,
            end_time: input.end_time,
            break_minutes: input.break_minutes,
            workplace: input.workplace,
            comment: input.comment,
            reason: input.reason,
            status: ApprovalStatus::Pending,
            admin_id: None,
            admin_comment: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };
        data.change_requests.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_change_request(
        &self,
        id: ChangeRequestId,
    ) -> RepositoryResult<Option<ChangeRequest>> {
        self.check_health()?;
        Ok(self.data.read().change_requests.get(&id).cloned())
    }

    async fn list_change_requests(
        &self,
        filter: &ChangeRequestFilter,
    ) -> RepositoryResult<Vec<ChangeRequest>> {
        self.check_health()?;
        let data = self.data.read();
        // Newest first; ids break ties between requests created in the same instant.
        let matching = data
            .change_requests
            .values()
            .rev()
            .filter(|r| matches_filter(r, filter))
            .skip(filter.offset);
        let requests = match filter.limit {
            Some(limit) => matching.take(limit).cloned().collect(),
            None => matching.cloned().collect(),
        };
        Ok(requests)
    }

    async fn count_change_requests(&self, filter: &ChangeRequestFilter) -> RepositoryResult<usize> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .change_requests
            .values()
            .filter(|r| matches_filter(r, filter))
            .count())
    }

    async fn update_change_request(
        &self,
        request: ChangeRequest,
    ) -> RepositoryResult<ChangeRequest> {
        self.check_health()?;
        let mut data = self.data.write();
        let stored = data
            .change_requests
            .get_mut(&request.id)
            .ok_or_else(|| RepositoryError::missing("change_request", request.id))?;
        *stored = request;
        Ok(stored.clone())
    }

    async fn delete_change_request(&self, id: ChangeRequestId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.write().change_requests.remove(&id).is_some())
    }
}

#[async_trait]
impl NotificationRepository for LocalRepository {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> RepositoryResult<Notification> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = NotificationId::new(data.next_id());
        let stored = Notification {
            id,
            user_id: notification.user_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            is_read: false,
            related_user_id: notification.related_user_id,
            related_request_id: notification.related_request_id,
            created_at: Utc::now(),
        };
        data.notifications.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
        limit: usize,
    ) -> RepositoryResult<Vec<Notification>> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .notifications
            .values()
            .rev()
            .filter(|n| n.user_id == user_id && (!unread_only || !n.is_read))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count_unread_notifications(&self, user_id: UserId) -> RepositoryResult<usize> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count())
    }

    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        let mut data = self.data.write();
        match data.notifications.get_mut(&id) {
            Some(n) if n.user_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let mut updated = 0;
        for n in data
            .notifications
            .values_mut()
            .filter(|n| n.user_id == user_id && !n.is_read)
        {
            n.is_read = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn notification_exists(
        &self,
        user_id: UserId,
        kind: NotificationType,
        related_user_id: Option<UserId>,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.read().notifications.values().any(|n| {
            n.user_id == user_id
                && n.kind == kind
                && n.created_at >= since
                && n.created_at < until
                && related_user_id.map_or(true, |id| n.related_user_id == Some(id))
        }))
    }

    async fn get_notification_settings(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<NotificationSettings>> {
        self.check_health()?;
        Ok(self.data.read().notification_settings.get(&user_id).cloned())
    }

    async fn save_notification_settings(
        &self,
        settings: NotificationSettings,
    ) -> RepositoryResult<NotificationSettings> {
        self.check_health()?;
        self.data
            .write()
            .notification_settings
            .insert(settings.user_id, settings.clone());
        Ok(settings)
    }
}

#[async_trait]
impl OrganizationRepository for LocalRepository {
    async fn list_departments(&self) -> RepositoryResult<Vec<Department>> {
        self.check_health()?;
        let mut departments: Vec<Department> =
            self.data.read().departments.values().cloned().collect();
        departments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(departments)
    }

    async fn get_department(&self, id: DepartmentId) -> RepositoryResult<Option<Department>> {
        self.check_health()?;
        Ok(self.data.read().departments.get(&id).cloned())
    }

    async fn create_department(
        &self,
        name: &str,
        is_default: bool,
    ) -> RepositoryResult<Department> {
        self.check_health()?;
        let mut data = self.data.write();
        if data.departments.values().any(|d| d.name == name) {
            return Err(duplicate(
                "Department with this name already exists",
                "create_department",
            ));
        }
        let id = DepartmentId::new(data.next_id());
        let department = Department {
            id,
            name: name.to_string(),
            is_default,
            created_at: Utc::now(),
        };
        data.departments.insert(id, department.clone());
        Ok(department)
    }

    async fn delete_department(&self, id: DepartmentId) -> RepositoryResult<bool> {
        self.check_health()?;
        Ok(self.data.write().departments.remove(&id).is_some())
    }

    async fn list_company_settings(&self) -> RepositoryResult<Vec<CompanySetting>> {
        self.check_health()?;
        Ok(self.data.read().company_settings.values().cloned().collect())
    }

    async fn set_company_setting(
        &self,
        key: &str,
        value: Option<String>,
    ) -> RepositoryResult<CompanySetting> {
        self.check_health()?;
        let setting = CompanySetting {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        };
        self.data
            .write()
            .company_settings
            .insert(key.to_string(), setting.clone());
        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Employee,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_health_check_follows_flag() {
        let repo = LocalRepository::new();
        assert!(repo.health_check().await.unwrap());
        repo.set_healthy(false);
        assert!(!repo.health_check().await.unwrap());
        assert!(repo.list_users(false).await.is_err());
    }

    #[tokio::test]
    async fn test_email_uniqueness_ignores_case() {
        let repo = LocalRepository::new();
        repo.create_user(new_user("anna@hitexis.com")).await.unwrap();
        let err = repo
            .create_user(new_user("Anna@Hitexis.com"))
            .await
            .unwrap_err();
        assert!(err.is_duplicate());

        let found = repo.get_user_by_email("ANNA@hitexis.com").await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_day_status_upsert_keeps_one_row_per_date() {
        let repo = LocalRepository::new();
        let user = repo.create_user(new_user("a@b.lv")).await.unwrap();
        let first = repo
            .upsert_day_status(user.id, d(2025, 5, 5), StatusType::Sick, None)
            .await
            .unwrap();
        let second = repo
            .upsert_day_status(user.id, d(2025, 5, 5), StatusType::Excused, Some("doctor".into()))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.status, StatusType::Excused);
        let all = repo
            .list_day_statuses(Some(user.id), d(2025, 5, 1), d(2025, 5, 31))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_user_cascades() {
        let repo = LocalRepository::new();
        let user = repo.create_user(new_user("a@b.lv")).await.unwrap();
        repo.save_profile(EmployeeProfile::new(user.id, "A", "B"))
            .await
            .unwrap();
        repo.upsert_workplace_plan(user.id, d(2025, 5, 5), Workplace::Remote)
            .await
            .unwrap();
        repo.create_vacation(NewVacation {
            user_id: user.id,
            date_from: d(2025, 7, 1),
            date_to: d(2025, 7, 3),
            status: ApprovalStatus::Approved,
            note: None,
        })
        .await
        .unwrap();

        assert!(repo.delete_user(user.id).await.unwrap());
        assert!(repo.get_profile(user.id).await.unwrap().is_none());
        assert!(repo.list_vacations(user.id).await.unwrap().is_empty());
        assert!(repo
            .list_workplace_plans(Some(user.id), d(2025, 1, 1), d(2025, 12, 31))
            .await
            .unwrap()
            .is_empty());
        assert!(!repo.delete_user(user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_change_request_paging_newest_first() {
        let repo = LocalRepository::new();
        let user = repo.create_user(new_user("a@b.lv")).await.unwrap();
        for day in 1..=3 {
            repo.create_change_request(NewChangeRequest {
                user_id: user.id,
                input: ChangeRequestInput {
                    request_type: ChangeRequestType::Add,
                    time_entry_id: None,
                    vacation_id: None,
                    day_status_id: None,
                    date: d(2025, 5, day),
                    date_to: None,
                    start_time: None,
                    end_time: None,
                    break_minutes: None,
                    workplace: None,
                    comment: None,
                    reason: "forgot".into(),
                },
            })
            .await
            .unwrap();
        }

        let filter = ChangeRequestFilter::default().page(2, 0);
        let page = repo.list_change_requests(&filter).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].date, d(2025, 5, 3));
        assert_eq!(repo.count_change_requests(&filter).await.unwrap(), 3);

        let pending = ChangeRequestFilter::default().with_status(Some(ApprovalStatus::Approved));
        assert_eq!(repo.count_change_requests(&pending).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_default_departments_seeded_and_sorted() {
        let repo = LocalRepository::new();
        let names: Vec<String> = repo
            .list_departments()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["Backend", "Design", "Frontend", "Management", "Marketing", "SEO"]
        );
        assert!(repo.create_department("SEO", false).await.is_err());
    }
}
