//! Postgres backend built on Diesel.
//!
//! Queries run on an r2d2 pool inside `spawn_blocking`. The schema is created
//! by the embedded migrations under `migrations/` when the repository starts.
//! Connection errors and serialization failures are retried with a doubling
//! delay, up to [`PostgresConfig::max_retries`] extra attempts.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::db::repo_config::PostgresConfig;
use crate::db::repository::{
    CalendarRepository, ChangeRequestFilter, ChangeRequestRepository, DayStatusRepository,
    NotificationRepository, OrganizationRepository, RepositoryError, RepositoryResult,
    TimeEntryRepository, UserRepository, VacationRepository, WorkplacePlanRepository,
};
use crate::models::*;

mod models;
mod schema;

use models::*;
use schema::*;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Delay before the first retry; doubles on each further attempt.
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    max_retries: u32,
}

impl PostgresRepository {
    /// Build the pool and apply pending migrations. Blocks.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);
        let pool = Pool::builder()
            .max_size(config.max_connections)
            .connection_timeout(Duration::from_secs(config.connect_timeout_secs))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::unavailable(e.to_string())
                    .with_operation("create_pool")
                    .with_details(format!("max_size={}", config.max_connections))
            })?;

        let mut conn = pool
            .get()
            .map_err(|e| RepositoryError::from(e).with_operation("run_migrations"))?;
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal(format!("Migration failed: {}", e))
                .with_operation("run_migrations")
        })?;

        Ok(Self {
            pool,
            max_retries: config.max_retries,
        })
    }

    /// Run `f` on a pooled connection, retrying transient failures.
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.max_retries;

        task::spawn_blocking(move || {
            let mut delay = RETRY_DELAY;
            let mut attempt = 0;
            loop {
                let result = pool
                    .get()
                    .map_err(RepositoryError::from)
                    .and_then(|mut conn| f.clone()(&mut conn));
                match result {
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        attempt += 1;
                        log::warn!("Retrying database operation (attempt {}): {}", attempt, e);
                        std::thread::sleep(delay);
                        delay *= 2;
                    }
                    other => return other,
                }
            }
        })
        .await
        .map_err(|e| RepositoryError::internal(format!("Task join error: {}", e)))?
    }
}

diesel::define_sql_function!(fn lower(x: Text) -> Text);

fn map_diesel_error(err: diesel::result::Error) -> RepositoryError {
    RepositoryError::from(err)
}

fn missing_or<T>(value: Option<T>, entity: &str, id: i64) -> RepositoryResult<T> {
    value.ok_or_else(|| RepositoryError::missing(entity, id))
}

#[async_trait]
impl UserRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_user(&self, user: NewUser) -> RepositoryResult<User> {
        let row = NewUserRow::from(user);
        self.with_conn(move |conn| {
            let inserted: UserRow = diesel::insert_into(users::table)
                .values(&row)
                .returning(UserRow::as_returning())
                .get_result(conn)
                .map_err(|e| map_diesel_error(e).with_operation("create_user"))?;
            User::try_from(inserted)
        })
        .await
    }

    async fn get_user(&self, id: UserId) -> RepositoryResult<Option<User>> {
        self.with_conn(move |conn| {
            users::table
                .find(id.value())
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(User::try_from)
                .transpose()
        })
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = email.to_lowercase();
        self.with_conn(move |conn| {
            users::table
                .filter(lower(users::email).eq(&email))
                .select(UserRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(User::try_from)
                .transpose()
        })
        .await
    }

    async fn list_users(&self, active_only: bool) -> RepositoryResult<Vec<User>> {
        self.with_conn(move |conn| {
            let mut query = users::table.into_boxed();
            if active_only {
                query = query.filter(users::is_active.eq(true));
            }
            let rows = query
                .order(users::id.asc())
                .select(UserRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> RepositoryResult<User> {
        let row = UserChangesRow::from(changes);
        self.with_conn(move |conn| {
            let updated = diesel::update(users::table.find(id.value()))
                .set(&row)
                .returning(UserRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(|e| map_diesel_error(e).with_operation("update_user"))?;
            User::try_from(missing_or(updated, "user", id.value())?)
        })
        .await
    }

    async fn delete_user(&self, id: UserId) -> RepositoryResult<bool> {
        // Owned rows go with the user through ON DELETE CASCADE.
        self.with_conn(move |conn| {
            diesel::delete(users::table.find(id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_profile(&self, user_id: UserId) -> RepositoryResult<Option<EmployeeProfile>> {
        self.with_conn(move |conn| {
            employee_profiles::table
                .find(user_id.value())
                .select(ProfileRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(EmployeeProfile::try_from)
                .transpose()
        })
        .await
    }

    async fn save_profile(&self, profile: EmployeeProfile) -> RepositoryResult<EmployeeProfile> {
        let row = ProfileRow::from(profile);
        self.with_conn(move |conn| {
            let saved: ProfileRow = diesel::insert_into(employee_profiles::table)
                .values(&row)
                .on_conflict(employee_profiles::user_id)
                .do_update()
                .set(&row)
                .returning(ProfileRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            EmployeeProfile::try_from(saved)
        })
        .await
    }

    async fn list_profiles(&self) -> RepositoryResult<Vec<EmployeeProfile>> {
        self.with_conn(|conn| {
            let rows = employee_profiles::table
                .order(employee_profiles::user_id.asc())
                .select(ProfileRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }
}

#[async_trait]
impl TimeEntryRepository for PostgresRepository {
    async fn create_time_entry(&self, entry: NewTimeEntry) -> RepositoryResult<TimeEntry> {
        let values = TimeEntryValues::from(entry);
        self.with_conn(move |conn| {
            let row: TimeEntryRow = diesel::insert_into(time_entries::table)
                .values(&values)
                .returning(TimeEntryRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            TimeEntry::try_from(row)
        })
        .await
    }

    async fn get_time_entry(&self, id: TimeEntryId) -> RepositoryResult<Option<TimeEntry>> {
        self.with_conn(move |conn| {
            time_entries::table
                .find(id.value())
                .select(TimeEntryRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(TimeEntry::try_from)
                .transpose()
        })
        .await
    }

    async fn list_time_entries(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<TimeEntry>> {
        self.with_conn(move |conn| {
            let mut query = time_entries::table
                .filter(time_entries::date.between(from, to))
                .into_boxed();
            if let Some(user_id) = user_id {
                query = query.filter(time_entries::user_id.eq(user_id.value()));
            }
            let rows = query
                .order((
                    time_entries::date.asc(),
                    time_entries::start_time.asc(),
                    time_entries::id.asc(),
                ))
                .select(TimeEntryRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn update_time_entry(&self, entry: TimeEntry) -> RepositoryResult<TimeEntry> {
        self.with_conn(move |conn| {
            let values = TimeEntryValues::from(&entry);
            let row = diesel::update(time_entries::table.find(entry.id.value()))
                .set((&values, time_entries::updated_at.eq(entry.updated_at)))
                .returning(TimeEntryRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?;
            TimeEntry::try_from(missing_or(row, "time_entry", entry.id.value())?)
        })
        .await
    }

    async fn delete_time_entry(&self, id: TimeEntryId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(time_entries::table.find(id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl WorkplacePlanRepository for PostgresRepository {
    async fn upsert_workplace_plan(
        &self,
        user_id: UserId,
        date: NaiveDate,
        workplace: Workplace,
    ) -> RepositoryResult<WorkplacePlan> {
        self.with_conn(move |conn| {
            let row = NewWorkplacePlanRow {
                user_id: user_id.value(),
                date,
                workplace: workplace.as_str().to_string(),
            };
            let saved: WorkplacePlanRow = diesel::insert_into(workplace_plans::table)
                .values(&row)
                .on_conflict((workplace_plans::user_id, workplace_plans::date))
                .do_update()
                .set((
                    workplace_plans::workplace.eq(workplace.as_str()),
                    workplace_plans::updated_at.eq(Utc::now()),
                ))
                .returning(WorkplacePlanRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            WorkplacePlan::try_from(saved)
        })
        .await
    }

    async fn get_workplace_plan(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<WorkplacePlan>> {
        self.with_conn(move |conn| {
            workplace_plans::table
                .filter(workplace_plans::user_id.eq(user_id.value()))
                .filter(workplace_plans::date.eq(date))
                .select(WorkplacePlanRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(WorkplacePlan::try_from)
                .transpose()
        })
        .await
    }

    async fn list_workplace_plans(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<WorkplacePlan>> {
        self.with_conn(move |conn| {
            let mut query = workplace_plans::table
                .filter(workplace_plans::date.between(from, to))
                .into_boxed();
            if let Some(user_id) = user_id {
                query = query.filter(workplace_plans::user_id.eq(user_id.value()));
            }
            let rows = query
                .order((workplace_plans::date.asc(), workplace_plans::user_id.asc()))
                .select(WorkplacePlanRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn delete_workplace_plan(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(
                workplace_plans::table
                    .filter(workplace_plans::user_id.eq(user_id.value()))
                    .filter(workplace_plans::date.eq(date)),
            )
            .execute(conn)
            .map(|n| n > 0)
            .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl DayStatusRepository for PostgresRepository {
    async fn upsert_day_status(
        &self,
        user_id: UserId,
        date: NaiveDate,
        status: StatusType,
        note: Option<String>,
    ) -> RepositoryResult<DayStatus> {
        self.with_conn(move |conn| {
            let row = NewDayStatusRow {
                user_id: user_id.value(),
                date,
                status: status.as_str().to_string(),
                note: note.clone(),
            };
            let saved: DayStatusRow = diesel::insert_into(day_statuses::table)
                .values(&row)
                .on_conflict((day_statuses::user_id, day_statuses::date))
                .do_update()
                .set((
                    day_statuses::status.eq(status.as_str()),
                    day_statuses::note.eq(note),
                    day_statuses::updated_at.eq(Utc::now()),
                ))
                .returning(DayStatusRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            DayStatus::try_from(saved)
        })
        .await
    }

    async fn get_day_status(&self, id: DayStatusId) -> RepositoryResult<Option<DayStatus>> {
        self.with_conn(move |conn| {
            day_statuses::table
                .find(id.value())
                .select(DayStatusRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(DayStatus::try_from)
                .transpose()
        })
        .await
    }

    async fn get_day_status_for_date(
        &self,
        user_id: UserId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<DayStatus>> {
        self.with_conn(move |conn| {
            day_statuses::table
                .filter(day_statuses::user_id.eq(user_id.value()))
                .filter(day_statuses::date.eq(date))
                .select(DayStatusRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(DayStatus::try_from)
                .transpose()
        })
        .await
    }

    async fn list_day_statuses(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<DayStatus>> {
        self.with_conn(move |conn| {
            let mut query = day_statuses::table
                .filter(day_statuses::date.between(from, to))
                .into_boxed();
            if let Some(user_id) = user_id {
                query = query.filter(day_statuses::user_id.eq(user_id.value()));
            }
            let rows = query
                .order((day_statuses::date.asc(), day_statuses::user_id.asc()))
                .select(DayStatusRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn list_day_statuses_of_type(
        &self,
        user_id: UserId,
        status: StatusType,
    ) -> RepositoryResult<Vec<DayStatus>> {
        self.with_conn(move |conn| {
            let rows = day_statuses::table
                .filter(day_statuses::user_id.eq(user_id.value()))
                .filter(day_statuses::status.eq(status.as_str()))
                .order(day_statuses::date.desc())
                .select(DayStatusRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn update_day_status(&self, status: DayStatus) -> RepositoryResult<DayStatus> {
        self.with_conn(move |conn| {
            let row = diesel::update(day_statuses::table.find(status.id.value()))
                .set((
                    day_statuses::date.eq(status.date),
                    day_statuses::status.eq(status.status.as_str()),
                    day_statuses::note.eq(status.note.clone()),
                    day_statuses::updated_at.eq(status.updated_at),
                ))
                .returning(DayStatusRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(|e| map_diesel_error(e).with_operation("update_day_status"))?;
            DayStatus::try_from(missing_or(row, "day_status", status.id.value())?)
        })
        .await
    }

    async fn delete_day_status(&self, id: DayStatusId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(day_statuses::table.find(id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn delete_day_statuses_in_range(
        &self,
        user_id: UserId,
        from: NaiveDate,
        to: NaiveDate,
        status: StatusType,
    ) -> RepositoryResult<usize> {
        self.with_conn(move |conn| {
            diesel::delete(
                day_statuses::table
                    .filter(day_statuses::user_id.eq(user_id.value()))
                    .filter(day_statuses::status.eq(status.as_str()))
                    .filter(day_statuses::date.between(from, to)),
            )
            .execute(conn)
            .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl VacationRepository for PostgresRepository {
    async fn create_vacation(&self, vacation: NewVacation) -> RepositoryResult<Vacation> {
        let values = VacationValues::from(vacation);
        self.with_conn(move |conn| {
            let row: VacationRow = diesel::insert_into(vacations::table)
                .values(&values)
                .returning(VacationRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Vacation::try_from(row)
        })
        .await
    }

    async fn get_vacation(&self, id: VacationId) -> RepositoryResult<Option<Vacation>> {
        self.with_conn(move |conn| {
            vacations::table
                .find(id.value())
                .select(VacationRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(Vacation::try_from)
                .transpose()
        })
        .await
    }

    async fn list_vacations(&self, user_id: UserId) -> RepositoryResult<Vec<Vacation>> {
        self.with_conn(move |conn| {
            let rows = vacations::table
                .filter(vacations::user_id.eq(user_id.value()))
                .order((vacations::date_from.desc(), vacations::id.desc()))
                .select(VacationRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn list_vacations_overlapping(
        &self,
        user_id: Option<UserId>,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<Vacation>> {
        self.with_conn(move |conn| {
            let mut query = vacations::table
                .filter(vacations::date_from.le(to))
                .filter(vacations::date_to.ge(from))
                .into_boxed();
            if let Some(user_id) = user_id {
                query = query.filter(vacations::user_id.eq(user_id.value()));
            }
            let rows = query
                .order((vacations::date_from.asc(), vacations::id.asc()))
                .select(VacationRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn update_vacation(&self, vacation: Vacation) -> RepositoryResult<Vacation> {
        self.with_conn(move |conn| {
            let values = VacationValues::from(&vacation);
            let row = diesel::update(vacations::table.find(vacation.id.value()))
                .set((&values, vacations::updated_at.eq(vacation.updated_at)))
                .returning(VacationRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?;
            Vacation::try_from(missing_or(row, "vacation", vacation.id.value())?)
        })
        .await
    }

    async fn delete_vacation(&self, id: VacationId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(vacations::table.find(id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl CalendarRepository for PostgresRepository {
    async fn insert_calendar_days(&self, days: Vec<CalendarDay>) -> RepositoryResult<usize> {
        if days.is_empty() {
            return Ok(0);
        }
        let rows: Vec<CalendarDayRow> = days.into_iter().map(CalendarDayRow::from).collect();
        self.with_conn(move |conn| {
            let mut inserted = 0;
            // A year of days per statement keeps well under the bind parameter limit.
            for chunk in rows.chunks(400) {
                inserted += diesel::insert_into(calendar_days::table)
                    .values(chunk)
                    .on_conflict_do_nothing()
                    .execute(conn)
                    .map_err(map_diesel_error)?;
            }
            Ok(inserted)
        })
        .await
    }

    async fn get_calendar_day(&self, date: NaiveDate) -> RepositoryResult<Option<CalendarDay>> {
        self.with_conn(move |conn| {
            calendar_days::table
                .find(date)
                .select(CalendarDayRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(CalendarDay::try_from)
                .transpose()
        })
        .await
    }

    async fn list_calendar_days(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> RepositoryResult<Vec<CalendarDay>> {
        self.with_conn(move |conn| {
            let rows = calendar_days::table
                .filter(calendar_days::date.between(from, to))
                .order(calendar_days::date.asc())
                .select(CalendarDayRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }
}

fn filtered_change_requests(
    filter: &ChangeRequestFilter,
) -> change_requests::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = change_requests::table.into_boxed();
    if let Some(user_id) = filter.user_id {
        query = query.filter(change_requests::user_id.eq(user_id.value()));
    }
    if let Some(status) = filter.status {
        query = query.filter(change_requests::status.eq(status.as_str()));
    }
    query
}

#[async_trait]
impl ChangeRequestRepository for PostgresRepository {
    async fn create_change_request(
        &self,
        request: NewChangeRequest,
    ) -> RepositoryResult<ChangeRequest> {
        let row = NewChangeRequestRow::from(request);
        self.with_conn(move |conn| {
            let inserted: ChangeRequestRow = diesel::insert_into(change_requests::table)
                .values(&row)
                .returning(ChangeRequestRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            ChangeRequest::try_from(inserted)
        })
        .await
    }

    async fn get_change_request(
        &self,
        id: ChangeRequestId,
    ) -> RepositoryResult<Option<ChangeRequest>> {
        self.with_conn(move |conn| {
            change_requests::table
                .find(id.value())
                .select(ChangeRequestRow::as_select())
                .first(conn)
                .optional()
                .map_err(map_diesel_error)?
                .map(ChangeRequest::try_from)
                .transpose()
        })
        .await
    }

    async fn list_change_requests(
        &self,
        filter: &ChangeRequestFilter,
    ) -> RepositoryResult<Vec<ChangeRequest>> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            let mut query = filtered_change_requests(&filter)
                .order((change_requests::created_at.desc(), change_requests::id.desc()))
                .offset(filter.offset as i64);
            if let Some(limit) = filter.limit {
                query = query.limit(limit as i64);
            }
            let rows = query
                .select(ChangeRequestRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn count_change_requests(&self, filter: &ChangeRequestFilter) -> RepositoryResult<usize> {
        let filter = filter.clone();
        self.with_conn(move |conn| {
            filtered_change_requests(&filter)
                .count()
                .get_result::<i64>(conn)
                .map(|n| n as usize)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn update_change_request(
        &self,
        request: ChangeRequest,
    ) -> RepositoryResult<ChangeRequest> {
        self.with_conn(move |conn| {
            let changes = ChangeRequestResolutionRow::from(&request);
            let row = diesel::update(change_requests::table.find(request.id.value()))
                .set(&changes)
                .returning(ChangeRequestRow::as_returning())
                .get_result(conn)
                .optional()
                .map_err(map_diesel_error)?;
            ChangeRequest::try_from(missing_or(row, "change_request", request.id.value())?)
        })
        .await
    }

    async fn delete_change_request(&self, id: ChangeRequestId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(change_requests::table.find(id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl NotificationRepository for PostgresRepository {
    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> RepositoryResult<Notification> {
        let row = NewNotificationRow::from(notification);
        self.with_conn(move |conn| {
            let inserted: NotificationRow = diesel::insert_into(notifications::table)
                .values(&row)
                .returning(NotificationRow::as_returning())
                .get_result(conn)
                .map_err(map_diesel_error)?;
            Notification::try_from(inserted)
        })
        .await
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
        limit: usize,
    ) -> RepositoryResult<Vec<Notification>> {
        self.with_conn(move |conn| {
            let mut query = notifications::table
                .filter(notifications::user_id.eq(user_id.value()))
                .into_boxed();
            if unread_only {
                query = query.filter(notifications::is_read.eq(false));
            }
            let rows = query
                .order((notifications::created_at.desc(), notifications::id.desc()))
                .limit(limit as i64)
                .select(NotificationRow::as_select())
                .load(conn)
                .map_err(map_diesel_error)?;
            decode_all(rows)
        })
        .await
    }

    async fn count_unread_notifications(&self, user_id: UserId) -> RepositoryResult<usize> {
        self.with_conn(move |conn| {
            notifications::table
                .filter(notifications::user_id.eq(user_id.value()))
                .filter(notifications::is_read.eq(false))
                .count()
                .get_result::<i64>(conn)
                .map(|n| n as usize)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn mark_notification_read(
        &self,
        user_id: UserId,
        id: NotificationId,
    ) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::update(
                notifications::table
                    .filter(notifications::id.eq(id.value()))
                    .filter(notifications::user_id.eq(user_id.value())),
            )
            .set(notifications::is_read.eq(true))
            .execute(conn)
            .map(|n| n > 0)
            .map_err(map_diesel_error)
        })
        .await
    }

    async fn mark_all_notifications_read(&self, user_id: UserId) -> RepositoryResult<usize> {
        self.with_conn(move |conn| {
            diesel::update(
                notifications::table
                    .filter(notifications::user_id.eq(user_id.value()))
                    .filter(notifications::is_read.eq(false)),
            )
            .set(notifications::is_read.eq(true))
            .execute(conn)
            .map_err(map_diesel_error)
        })
        .await
    }

    async fn notification_exists(
        &self,
        user_id: UserId,
        kind: NotificationType,
        related_user_id: Option<UserId>,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            let mut query = notifications::table
                .filter(notifications::user_id.eq(user_id.value()))
                .filter(notifications::kind.eq(kind.as_str()))
                .filter(notifications::created_at.ge(since))
                .filter(notifications::created_at.lt(until))
                .into_boxed();
            if let Some(related) = related_user_id {
                query = query.filter(notifications::related_user_id.eq(related.value()));
            }
            query
                .select(notifications::id)
                .first::<i64>(conn)
                .optional()
                .map(|found| found.is_some())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_notification_settings(
        &self,
        user_id: UserId,
    ) -> RepositoryResult<Option<NotificationSettings>> {
        self.with_conn(move |conn| {
            notification_settings::table
                .find(user_id.value())
                .select(NotificationSettingsRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(NotificationSettings::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn save_notification_settings(
        &self,
        settings: NotificationSettings,
    ) -> RepositoryResult<NotificationSettings> {
        let row = NotificationSettingsRow::from(settings);
        self.with_conn(move |conn| {
            diesel::insert_into(notification_settings::table)
                .values(&row)
                .on_conflict(notification_settings::user_id)
                .do_update()
                .set(&row)
                .returning(NotificationSettingsRow::as_returning())
                .get_result(conn)
                .map(NotificationSettings::from)
                .map_err(map_diesel_error)
        })
        .await
    }
}

#[async_trait]
impl OrganizationRepository for PostgresRepository {
    async fn list_departments(&self) -> RepositoryResult<Vec<Department>> {
        self.with_conn(|conn| {
            departments::table
                .order(departments::name.asc())
                .select(DepartmentRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(Department::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn get_department(&self, id: DepartmentId) -> RepositoryResult<Option<Department>> {
        self.with_conn(move |conn| {
            departments::table
                .find(id.value())
                .select(DepartmentRow::as_select())
                .first(conn)
                .optional()
                .map(|row| row.map(Department::from))
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn create_department(
        &self,
        name: &str,
        is_default: bool,
    ) -> RepositoryResult<Department> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            diesel::insert_into(departments::table)
                .values((
                    departments::name.eq(&name),
                    departments::is_default.eq(is_default),
                ))
                .returning(DepartmentRow::as_returning())
                .get_result(conn)
                .map(Department::from)
                .map_err(|e| map_diesel_error(e).with_operation("create_department"))
        })
        .await
    }

    async fn delete_department(&self, id: DepartmentId) -> RepositoryResult<bool> {
        self.with_conn(move |conn| {
            diesel::delete(departments::table.find(id.value()))
                .execute(conn)
                .map(|n| n > 0)
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn list_company_settings(&self) -> RepositoryResult<Vec<CompanySetting>> {
        self.with_conn(|conn| {
            company_settings::table
                .order(company_settings::key.asc())
                .select(CompanySettingRow::as_select())
                .load(conn)
                .map(|rows| rows.into_iter().map(CompanySetting::from).collect())
                .map_err(map_diesel_error)
        })
        .await
    }

    async fn set_company_setting(
        &self,
        key: &str,
        value: Option<String>,
    ) -> RepositoryResult<CompanySetting> {
        let row = CompanySettingRow {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        };
        self.with_conn(move |conn| {
            diesel::insert_into(company_settings::table)
                .values(&row)
                .on_conflict(company_settings::key)
                .do_update()
                .set(&row)
                .returning(CompanySettingRow::as_returning())
                .get_result(conn)
                .map(CompanySetting::from)
                .map_err(map_diesel_error)
        })
        .await
    }
}
