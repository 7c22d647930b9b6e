//! Service-layer scenarios against the in-memory repository.

mod support;

use chrono::{Datelike, Duration};

use support::{admin, d, employee, mail, new_employee, repo, t};
use time_control::db::FullRepository;
use time_control::models::{
    ApprovalStatus, ChangeRequestId, ChangeRequestInput, ChangeRequestResolution,
    ChangeRequestType, DayStatus, DayStatusChanges, DayStatusInput, NewTimeEntry,
    NotificationSettingsUpdate, NotificationType, StatusType, TimeEntryChanges, TimeEntryInput,
    User, UserId, UserRole, Vacation, VacationChanges, VacationInput, Workplace,
    WorkplacePlanInput,
};
use time_control::services::day_status::{self, SickDayRange};
use time_control::services::stats::{self, PeriodType};
use time_control::services::time_entries::{self, EDIT_TIME_EXPIRED};
use time_control::services::{
    change_requests, local_today, notifications, presence, reminders, users, vacations,
    ServiceError,
};

fn entry(date: chrono::NaiveDate, start: (u32, u32), end: (u32, u32)) -> TimeEntryInput {
    TimeEntryInput {
        date,
        start_time: t(start.0, start.1),
        end_time: t(end.0, end.1),
        break_minutes: 0,
        workplace: Workplace::Office,
        comment: None,
    }
}

async fn log_day(repo: &dyn FullRepository, user_id: UserId, date: chrono::NaiveDate) {
    repo.create_time_entry(NewTimeEntry {
        user_id,
        date,
        start_time: t(9, 0),
        end_time: t(17, 0),
        break_minutes: 60,
        workplace: Workplace::Office,
        comment: None,
    })
    .await
    .unwrap();
}

fn request(kind: ChangeRequestType, date: chrono::NaiveDate) -> ChangeRequestInput {
    ChangeRequestInput {
        request_type: kind,
        time_entry_id: None,
        vacation_id: None,
        day_status_id: None,
        date,
        date_to: None,
        start_time: None,
        end_time: None,
        break_minutes: None,
        workplace: None,
        comment: None,
        reason: "Forgot to log".to_string(),
    }
}

// =============================================================================
// Time entries
// =============================================================================

#[tokio::test]
async fn test_first_entry_gets_lunch_break() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let today = d(2025, 3, 12);

    let first = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(today, (9, 0), (13, 0)), today)
        .await
        .unwrap();
    let second = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(today, (13, 30), (15, 0)), today)
        .await
        .unwrap();

    assert_eq!(first.break_minutes, 60);
    assert_eq!(second.break_minutes, 0);

    let summary = time_entries::day_summary(repo.as_ref(), anna.id, today).await.unwrap();
    assert_eq!(summary.entries.len(), 2);
    assert_eq!(summary.total_minutes, 180 + 90);
}

#[tokio::test]
async fn test_daily_maximum_and_overlap() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let today = d(2025, 3, 12);

    time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(today, (9, 0), (12, 0)), today)
        .await
        .unwrap();

    let overlap = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(today, (11, 0), (13, 0)), today)
        .await
        .unwrap_err();
    assert_eq!(overlap.to_string(), "Time entry overlaps with existing entry");

    let too_long = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(today, (12, 0), (20, 0)), today)
        .await
        .unwrap_err();
    assert_eq!(too_long.to_string(), "Maximum total work time per day is 8 hours");
}

#[tokio::test]
async fn test_entries_limited_to_current_work_week() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;
    let today = d(2025, 3, 12);
    let next_monday = d(2025, 3, 17);

    let err = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(next_monday, (9, 0), (10, 0)), today)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot create time entries beyond current week");

    // Admins skip the break and daily rules but not the week horizon
    let mut long_day = entry(d(2025, 3, 11), (7, 0), (18, 0));
    long_day.break_minutes = 30;
    let created = time_entries::create_entry(repo.as_ref(), &boss, anna.id, long_day, today)
        .await
        .unwrap();
    assert_eq!(created.user_id, anna.id);
    assert_eq!(created.break_minutes, 30);
}

#[tokio::test]
async fn test_sick_day_blocks_own_entries() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let today = d(2025, 3, 12);

    day_status::set_sick_range(
        repo.as_ref(),
        anna.id,
        SickDayRange {
            start_date: d(2025, 3, 11),
            end_date: today,
            note: None,
        },
    )
    .await
    .unwrap();

    let err = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(today, (9, 0), (10, 0)), today)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(day_status::sick_days(repo.as_ref(), anna.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_edit_window_and_ownership() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let bob = employee(repo.as_ref(), "bob@example.com", "Bob", "Kalns").await;
    let today = d(2025, 3, 12);

    let created = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(today, (9, 0), (12, 0)), today)
        .await
        .unwrap();
    let changes = TimeEntryChanges {
        end_time: Some(t(12, 30)),
        ..Default::default()
    };

    let err = time_entries::update_entry(repo.as_ref(), &bob, created.id, changes.clone(), created.created_at)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let late = created.created_at + Duration::minutes(31);
    let err = time_entries::update_entry(repo.as_ref(), &anna, created.id, changes.clone(), late)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), EDIT_TIME_EXPIRED);

    let soon = created.created_at + Duration::minutes(5);
    let updated = time_entries::update_entry(repo.as_ref(), &anna, created.id, changes, soon)
        .await
        .unwrap();
    assert_eq!(updated.end_time, t(12, 30));
}

// =============================================================================
// Vacations
// =============================================================================

#[tokio::test]
async fn test_vacation_marks_days_and_rejects_overlap() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;

    let vacation = vacations::create_vacation(
        repo.as_ref(),
        anna.id,
        VacationInput {
            date_from: d(2025, 3, 17),
            date_to: d(2025, 3, 19),
            note: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(vacation.status, ApprovalStatus::Approved);
    assert_eq!(vacation.days_count(), 3);

    let statuses = day_status::list_for_range(repo.as_ref(), anna.id, d(2025, 3, 17), d(2025, 3, 21))
        .await
        .unwrap();
    assert_eq!(statuses.len(), 3);
    assert!(statuses.iter().all(|s| s.status == StatusType::Vacation));

    let err = vacations::create_vacation(
        repo.as_ref(),
        anna.id,
        VacationInput {
            date_from: d(2025, 3, 19),
            date_to: d(2025, 3, 21),
            note: None,
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Vacation overlaps with existing vacation");

    vacations::delete_vacation(repo.as_ref(), &boss, vacation.id, d(2025, 3, 18))
        .await
        .unwrap();
    let statuses = day_status::list_for_range(repo.as_ref(), anna.id, d(2025, 3, 17), d(2025, 3, 21))
        .await
        .unwrap();
    assert!(statuses.is_empty());
}

#[tokio::test]
async fn test_started_vacation_cannot_be_deleted_by_owner() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let vacation = vacations::create_vacation(
        repo.as_ref(),
        anna.id,
        VacationInput {
            date_from: d(2025, 3, 10),
            date_to: d(2025, 3, 14),
            note: None,
        },
    )
    .await
    .unwrap();

    let err = vacations::delete_vacation(repo.as_ref(), &anna, vacation.id, d(2025, 3, 12))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

async fn book(
    repo: &dyn FullRepository,
    user_id: UserId,
    from: chrono::NaiveDate,
    to: chrono::NaiveDate,
) -> Vacation {
    vacations::create_vacation(
        repo,
        user_id,
        VacationInput {
            date_from: from,
            date_to: to,
            note: None,
        },
    )
    .await
    .unwrap()
}

async fn excuse(repo: &dyn FullRepository, user_id: UserId, date: chrono::NaiveDate) -> DayStatus {
    day_status::set_status(
        repo,
        user_id,
        DayStatusInput {
            date,
            status: StatusType::Excused,
            note: None,
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_owner_vacation_update_rules() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;
    let today = d(2025, 3, 12);

    let ended = book(repo.as_ref(), anna.id, d(2025, 3, 3), d(2025, 3, 5)).await;
    let ongoing = book(repo.as_ref(), anna.id, d(2025, 3, 10), d(2025, 3, 14)).await;
    let upcoming = book(repo.as_ref(), anna.id, d(2025, 3, 24), d(2025, 3, 26)).await;

    let cases = [
        (
            ended.id,
            VacationChanges {
                note: Some("Back early".to_string()),
                ..Default::default()
            },
            "Cannot modify a vacation that has already ended",
        ),
        (
            ongoing.id,
            VacationChanges {
                date_from: Some(d(2025, 3, 13)),
                ..Default::default()
            },
            "Cannot change start date of an ongoing vacation",
        ),
        (
            ongoing.id,
            VacationChanges {
                date_to: Some(d(2025, 3, 11)),
                ..Default::default()
            },
            "End date cannot be in the past for an ongoing vacation",
        ),
        (
            upcoming.id,
            VacationChanges {
                date_from: Some(d(2025, 3, 11)),
                ..Default::default()
            },
            "Start date cannot be in the past",
        ),
    ];
    for (id, changes, message) in cases {
        let err = vacations::update_vacation(repo.as_ref(), &anna, id, changes, today)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(err.to_string(), message);
    }

    // An ongoing vacation can still be extended
    let extended = vacations::update_vacation(
        repo.as_ref(),
        &anna,
        ongoing.id,
        VacationChanges {
            date_to: Some(d(2025, 3, 18)),
            ..Default::default()
        },
        today,
    )
    .await
    .unwrap();
    assert_eq!((extended.date_from, extended.date_to), (d(2025, 3, 10), d(2025, 3, 18)));

    // Admins are not bound by the date rules
    let corrected = vacations::update_vacation(
        repo.as_ref(),
        &boss,
        ended.id,
        VacationChanges {
            date_to: Some(d(2025, 3, 4)),
            ..Default::default()
        },
        today,
    )
    .await
    .unwrap();
    assert_eq!(corrected.date_to, d(2025, 3, 4));
    assert!(day_status::status_for_date(repo.as_ref(), anna.id, d(2025, 3, 5))
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_past_day_status_locked_for_owner() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;
    let today = d(2025, 3, 12);

    let past = excuse(repo.as_ref(), anna.id, d(2025, 3, 10)).await;
    let current = excuse(repo.as_ref(), anna.id, today).await;
    let future = excuse(repo.as_ref(), anna.id, d(2025, 3, 14)).await;

    let note = |text: &str| DayStatusChanges {
        note: Some(text.to_string()),
        ..Default::default()
    };

    let err = day_status::update_status(repo.as_ref(), &anna, past.id, note("Late"), today)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot modify day status for a past date");

    let err = day_status::delete_status(repo.as_ref(), &anna, past.id, today)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    // Today can be edited but not deleted
    day_status::update_status(repo.as_ref(), &anna, current.id, note("Dentist"), today)
        .await
        .unwrap();
    let err = day_status::delete_status(repo.as_ref(), &anna, current.id, today)
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot delete day status for today or past dates. You can only edit future dates."
    );

    let moved_back = DayStatusChanges {
        date: Some(d(2025, 3, 11)),
        ..Default::default()
    };
    let err = day_status::update_status(repo.as_ref(), &anna, future.id, moved_back, today)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "New date cannot be in the past");
    day_status::delete_status(repo.as_ref(), &anna, future.id, today)
        .await
        .unwrap();

    let fixed = day_status::update_status(repo.as_ref(), &boss, past.id, note("Approved late"), today)
        .await
        .unwrap();
    assert_eq!(fixed.note.as_deref(), Some("Approved late"));
    day_status::delete_status(repo.as_ref(), &boss, past.id, today)
        .await
        .unwrap();
    assert!(repo.get_day_status(past.id).await.unwrap().is_none());
}

// =============================================================================
// Change requests
// =============================================================================

#[tokio::test]
async fn test_change_request_approval_creates_entry() {
    let repo = repo();
    let (mail, sent) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;
    let date = d(2025, 3, 20);

    let mut input = request(ChangeRequestType::Add, date);
    input.start_time = Some(t(9, 0));
    input.end_time = Some(t(12, 0));
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, input)
        .await
        .unwrap();
    assert!(filed.request.is_pending());
    assert_eq!(filed.employee_name.as_deref(), Some("Anna Ozola"));

    assert_eq!(change_requests::pending_count(repo.as_ref()).await.unwrap(), 1);
    assert_eq!(notifications::unread_count(repo.as_ref(), boss.id).await.unwrap(), 1);
    assert!(sent.sent().iter().any(|m| m.to == "boss@example.com"));

    let resolved = change_requests::resolve(
        repo.as_ref(),
        &boss,
        filed.request.id,
        ChangeRequestResolution {
            status: ApprovalStatus::Approved,
            admin_comment: Some("ok".to_string()),
        },
        chrono::Utc::now(),
    )
    .await
    .unwrap();
    assert_eq!(resolved.request.status, ApprovalStatus::Approved);
    assert_eq!(resolved.request.admin_id, Some(boss.id));

    let entries = time_entries::list_for_date(repo.as_ref(), anna.id, date).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].start_time, t(9, 0));

    // Resolved requests cannot be resolved again
    let err = change_requests::resolve(
        repo.as_ref(),
        &boss,
        filed.request.id,
        ChangeRequestResolution {
            status: ApprovalStatus::Rejected,
            admin_comment: None,
        },
        chrono::Utc::now(),
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_rejected_sick_day_request_changes_nothing() {
    let repo = repo();
    let (mail, _) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;

    let mut input = request(ChangeRequestType::AddSickDay, d(2025, 3, 3));
    input.date_to = Some(d(2025, 3, 4));
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, input)
        .await
        .unwrap();

    change_requests::resolve(
        repo.as_ref(),
        &boss,
        filed.request.id,
        ChangeRequestResolution {
            status: ApprovalStatus::Rejected,
            admin_comment: None,
        },
        chrono::Utc::now(),
    )
    .await
    .unwrap();

    assert!(day_status::sick_days(repo.as_ref(), anna.id).await.unwrap().is_empty());
    assert_eq!(change_requests::pending_count(repo.as_ref()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_change_request_must_target_own_records() {
    let repo = repo();
    let (mail, _) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let bob = employee(repo.as_ref(), "bob@example.com", "Bob", "Kalns").await;
    let today = d(2025, 3, 12);

    let annas = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(today, (9, 0), (12, 0)), today)
        .await
        .unwrap();

    let mut input = request(ChangeRequestType::Delete, today);
    input.time_entry_id = Some(annas.id);
    let err = change_requests::create(repo.as_ref(), &mail, &bob, input)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = change_requests::create(repo.as_ref(), &mail, &bob, request(ChangeRequestType::Edit, today))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "time_entry_id is required for edit requests");
}

async fn approve(
    repo: &dyn FullRepository,
    boss: &User,
    id: ChangeRequestId,
) -> ApprovalStatus {
    change_requests::resolve(
        repo,
        boss,
        id,
        ChangeRequestResolution {
            status: ApprovalStatus::Approved,
            admin_comment: None,
        },
        chrono::Utc::now(),
    )
    .await
    .unwrap()
    .request
    .status
}

#[tokio::test]
async fn test_approved_entry_edit_and_delete() {
    let repo = repo();
    let (mail, _) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;
    let date = d(2025, 3, 12);

    let morning = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(date, (9, 0), (12, 0)), date)
        .await
        .unwrap();
    let afternoon = time_entries::create_entry(repo.as_ref(), &anna, anna.id, entry(date, (13, 0), (15, 0)), date)
        .await
        .unwrap();

    let mut edit = request(ChangeRequestType::Edit, date);
    edit.time_entry_id = Some(morning.id);
    edit.start_time = Some(t(8, 0));
    edit.end_time = Some(t(12, 30));
    edit.comment = Some("Client call".to_string());
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, edit).await.unwrap();
    assert_eq!(approve(repo.as_ref(), &boss, filed.request.id).await, ApprovalStatus::Approved);

    let edited = repo.get_time_entry(morning.id).await.unwrap().unwrap();
    assert_eq!((edited.start_time, edited.end_time), (t(8, 0), t(12, 30)));
    assert_eq!(edited.comment.as_deref(), Some("Client call"));

    let mut delete = request(ChangeRequestType::Delete, date);
    delete.time_entry_id = Some(afternoon.id);
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, delete).await.unwrap();
    approve(repo.as_ref(), &boss, filed.request.id).await;
    assert!(repo.get_time_entry(afternoon.id).await.unwrap().is_none());

    // The entry disappears while the request waits; approval skips it
    let mut late = request(ChangeRequestType::Edit, date);
    late.time_entry_id = Some(morning.id);
    late.end_time = Some(t(16, 0));
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, late).await.unwrap();
    repo.delete_time_entry(morning.id).await.unwrap();
    assert_eq!(approve(repo.as_ref(), &boss, filed.request.id).await, ApprovalStatus::Approved);
    assert!(time_entries::list_for_date(repo.as_ref(), anna.id, date).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_approved_vacation_requests() {
    let repo = repo();
    let (mail, _) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;

    let mut add = request(ChangeRequestType::AddVacation, d(2025, 4, 7));
    add.date_to = Some(d(2025, 4, 9));
    add.comment = Some("Family trip".to_string());
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, add).await.unwrap();
    approve(repo.as_ref(), &boss, filed.request.id).await;

    let vacation = vacations::list_vacations(repo.as_ref(), anna.id, None).await.unwrap();
    assert_eq!(vacation.len(), 1);
    let vacation = vacation[0].clone();
    assert_eq!((vacation.date_from, vacation.date_to), (d(2025, 4, 7), d(2025, 4, 9)));
    assert_eq!(vacation.note.as_deref(), Some("Family trip"));

    let mut edit = request(ChangeRequestType::EditVacation, d(2025, 4, 8));
    edit.vacation_id = Some(vacation.id);
    edit.date_to = Some(d(2025, 4, 11));
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, edit).await.unwrap();
    approve(repo.as_ref(), &boss, filed.request.id).await;

    let moved = repo.get_vacation(vacation.id).await.unwrap().unwrap();
    assert_eq!((moved.date_from, moved.date_to), (d(2025, 4, 8), d(2025, 4, 11)));
    let marked: Vec<_> = day_status::list_for_range(repo.as_ref(), anna.id, d(2025, 4, 7), d(2025, 4, 11))
        .await
        .unwrap()
        .iter()
        .map(|s| s.date)
        .collect();
    assert_eq!(marked, vec![d(2025, 4, 8), d(2025, 4, 9), d(2025, 4, 10), d(2025, 4, 11)]);

    let mut delete = request(ChangeRequestType::DeleteVacation, d(2025, 4, 8));
    delete.vacation_id = Some(vacation.id);
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, delete).await.unwrap();
    approve(repo.as_ref(), &boss, filed.request.id).await;
    assert!(repo.get_vacation(vacation.id).await.unwrap().is_none());
    assert!(day_status::list_for_range(repo.as_ref(), anna.id, d(2025, 4, 7), d(2025, 4, 11))
        .await
        .unwrap()
        .is_empty());

    // Removed by an admin before the request was handled
    let gone = vacations::create_vacation(
        repo.as_ref(),
        anna.id,
        VacationInput {
            date_from: d(2025, 5, 5),
            date_to: d(2025, 5, 6),
            note: None,
        },
    )
    .await
    .unwrap();
    let mut edit = request(ChangeRequestType::EditVacation, d(2025, 5, 6));
    edit.vacation_id = Some(gone.id);
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, edit).await.unwrap();
    vacations::delete_vacation(repo.as_ref(), &boss, gone.id, d(2025, 5, 1)).await.unwrap();
    assert_eq!(approve(repo.as_ref(), &boss, filed.request.id).await, ApprovalStatus::Approved);
    assert!(vacations::list_vacations(repo.as_ref(), anna.id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_approved_sick_day_requests() {
    let repo = repo();
    let (mail, _) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let boss = admin(repo.as_ref(), "boss@example.com").await;

    let mut add = request(ChangeRequestType::AddSickDay, d(2025, 3, 3));
    add.date_to = Some(d(2025, 3, 4));
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, add).await.unwrap();
    approve(repo.as_ref(), &boss, filed.request.id).await;

    let sick = day_status::sick_days(repo.as_ref(), anna.id).await.unwrap();
    assert_eq!(sick.len(), 2);
    let monday = sick.iter().find(|s| s.date == d(2025, 3, 3)).unwrap().id;
    let tuesday = sick.iter().find(|s| s.date == d(2025, 3, 4)).unwrap().id;

    let mut edit = request(ChangeRequestType::EditSickDay, d(2025, 3, 5));
    edit.day_status_id = Some(monday);
    edit.comment = Some("Doctor's note".to_string());
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, edit).await.unwrap();
    approve(repo.as_ref(), &boss, filed.request.id).await;

    let moved = repo.get_day_status(monday).await.unwrap().unwrap();
    assert_eq!(moved.date, d(2025, 3, 5));
    assert_eq!(moved.status, StatusType::Sick);
    assert_eq!(moved.note.as_deref(), Some("Doctor's note"));

    let mut delete = request(ChangeRequestType::DeleteSickDay, d(2025, 3, 4));
    delete.day_status_id = Some(tuesday);
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, delete).await.unwrap();
    approve(repo.as_ref(), &boss, filed.request.id).await;

    let left: Vec<_> = day_status::sick_days(repo.as_ref(), anna.id)
        .await
        .unwrap()
        .iter()
        .map(|s| s.date)
        .collect();
    assert_eq!(left, vec![d(2025, 3, 5)]);

    // Status deleted while the edit request was pending
    let mut edit = request(ChangeRequestType::EditSickDay, d(2025, 3, 6));
    edit.day_status_id = Some(monday);
    let filed = change_requests::create(repo.as_ref(), &mail, &anna, edit).await.unwrap();
    day_status::delete_status_of(repo.as_ref(), anna.id, monday).await.unwrap();
    assert_eq!(approve(repo.as_ref(), &boss, filed.request.id).await, ApprovalStatus::Approved);
    assert!(day_status::sick_days(repo.as_ref(), anna.id).await.unwrap().is_empty());
    assert_eq!(change_requests::pending_count(repo.as_ref()).await.unwrap(), 0);
}

// =============================================================================
// Notifications and reminders
// =============================================================================

#[tokio::test]
async fn test_birthday_announced_once_per_day() {
    let repo = repo();
    let (mail, _) = mail();
    let boss = admin(repo.as_ref(), "boss@example.com").await;
    // Deduplication looks at when notifications were stored, so run on the real date
    let today = local_today();
    let mut input = new_employee("anna@example.com", "Anna", "Ozola", UserRole::Employee);
    input.birthday = today.with_year(2000);
    users::create_employee(repo.as_ref(), input).await.unwrap();

    let report = notifications::check_events(repo.as_ref(), &mail, today).await.unwrap();
    assert_eq!(report.birthday_notifications, 1);

    let again = notifications::check_events(repo.as_ref(), &mail, today).await.unwrap();
    assert_eq!(again.total, 0);

    let inbox = notifications::list(repo.as_ref(), boss.id, true, 50).await.unwrap();
    let birthdays: Vec<_> = inbox
        .iter()
        .filter(|n| n.kind == NotificationType::Birthday)
        .collect();
    assert_eq!(birthdays.len(), 1);
    assert_eq!(birthdays[0].message, "Anna Ozola has a birthday today!");

    assert_eq!(
        notifications::mark_all_read(repo.as_ref(), boss.id).await.unwrap(),
        inbox.len()
    );
    assert_eq!(notifications::unread_count(repo.as_ref(), boss.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_entries_reminder() {
    let repo = repo();
    let (mail, sent) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let bob = employee(repo.as_ref(), "bob@example.com", "Bob", "Kalns").await;
    let carol = employee(repo.as_ref(), "carol@example.com", "Carol", "Liepa").await;
    let today = d(2025, 3, 12);

    for date in [d(2025, 3, 5), d(2025, 3, 6), d(2025, 3, 7), d(2025, 3, 10), d(2025, 3, 11)] {
        log_day(repo.as_ref(), anna.id, date).await;
    }
    log_day(repo.as_ref(), bob.id, d(2025, 3, 10)).await;
    vacations::create_vacation(
        repo.as_ref(),
        carol.id,
        VacationInput {
            date_from: today,
            date_to: d(2025, 3, 13),
            note: None,
        },
    )
    .await
    .unwrap();

    let report = reminders::check_missing_entries(repo.as_ref(), &mail, today)
        .await
        .unwrap();
    assert_eq!(report.checked_users, 3);
    assert_eq!(report.notifications_created, 1);
    assert_eq!(report.emails_sent, 1);

    let inbox = notifications::list(repo.as_ref(), bob.id, false, 50).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, NotificationType::MissingEntry);
    let message: serde_json::Value = serde_json::from_str(&inbox[0].message).unwrap();
    assert_eq!(message["count"], 4);
    assert_eq!(message["dates"], "05.03, 06.03, 07.03, 11.03");
    assert_eq!(sent.sent()[0].to, "bob@example.com");
}

#[tokio::test]
async fn test_missing_entries_reminded_once_per_day() {
    let repo = repo();
    let (mail, _) = mail();
    employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let today = local_today();

    let first = reminders::check_missing_entries(repo.as_ref(), &mail, today)
        .await
        .unwrap();
    assert_eq!(first.notifications_created, 1);

    let again = reminders::check_missing_entries(repo.as_ref(), &mail, today)
        .await
        .unwrap();
    assert_eq!(again.notifications_created, 0);
}

#[tokio::test]
async fn test_monday_reminder_mailed_once() {
    let repo = repo();
    let (mail, sent) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let bob = employee(repo.as_ref(), "bob@example.com", "Bob", "Kalns").await;
    // Deduplication looks at when notifications were stored, so stay in the real week
    let monday = presence::week_start(local_today());

    notifications::update_settings(
        repo.as_ref(),
        anna.id,
        NotificationSettingsUpdate {
            app_weekly_reminder: Some(false),
            email_weekly_reminder: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    notifications::update_settings(
        repo.as_ref(),
        bob.id,
        NotificationSettingsUpdate {
            email_weekly_reminder: Some(true),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let first = notifications::check_events(repo.as_ref(), &mail, monday).await.unwrap();
    assert_eq!(first.weekly_reminder_notifications, 1);
    for _ in 0..2 {
        let again = notifications::check_events(repo.as_ref(), &mail, monday).await.unwrap();
        assert_eq!(again.weekly_reminder_notifications, 0);
    }

    let mailed = |to: &str| sent.sent().iter().filter(|m| m.to == to).count();
    assert_eq!(mailed("anna@example.com"), 0);
    assert_eq!(mailed("bob@example.com"), 1);

    let reminders: Vec<_> = notifications::list(repo.as_ref(), bob.id, false, 50)
        .await
        .unwrap()
        .into_iter()
        .filter(|n| n.kind == NotificationType::WeeklyReminder)
        .collect();
    assert_eq!(reminders.len(), 1);
    assert!(notifications::list(repo.as_ref(), anna.id, false, 50)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_weekly_planning_skips_planned_users() {
    let repo = repo();
    let (mail, sent) = mail();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let mut input = new_employee("bob@example.com", "Bob", "Kalns", UserRole::Employee);
    input.work_email = Some("bob@work.example.com".to_string());
    users::create_employee(repo.as_ref(), input).await.unwrap();

    presence::set_plan(
        repo.as_ref(),
        anna.id,
        WorkplacePlanInput {
            date: d(2025, 3, 11),
            workplace: Workplace::Office,
        },
    )
    .await
    .unwrap();

    let report = reminders::weekly_planning(repo.as_ref(), &mail, d(2025, 3, 10))
        .await
        .unwrap();
    assert_eq!(report.emails_sent, 1);
    assert_eq!(sent.sent()[0].to, "bob@work.example.com");
}

// =============================================================================
// Presence and statistics
// =============================================================================

#[tokio::test]
async fn test_office_presence_excludes_sick_employees() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    let bob = employee(repo.as_ref(), "bob@example.com", "Bob", "Kalns").await;
    let date = d(2025, 3, 12);

    for user in [anna.id, bob.id] {
        presence::set_plan(
            repo.as_ref(),
            user,
            WorkplacePlanInput {
                date,
                workplace: Workplace::Office,
            },
        )
        .await
        .unwrap();
    }
    day_status::set_sick_range(
        repo.as_ref(),
        bob.id,
        SickDayRange {
            start_date: date,
            end_date: date,
            note: None,
        },
    )
    .await
    .unwrap();

    let day = presence::office_presence(repo.as_ref(), date).await.unwrap();
    assert_eq!(day.count, 1);
    assert_eq!(day.employees[0].user_id, anna.id);

    let overview = presence::daily_overview(repo.as_ref(), date).await.unwrap();
    let state_of = |id: UserId| {
        overview
            .employees
            .iter()
            .find(|e| e.user_id == id)
            .map(|e| e.status)
    };
    assert_eq!(state_of(anna.id), Some("office"));
    assert_eq!(state_of(bob.id), Some("sick"));

    let week = presence::week_presence(repo.as_ref(), date).await.unwrap();
    assert_eq!(week.week_start, d(2025, 3, 10));
    assert_eq!(week.days.len(), 7);
}

#[tokio::test]
async fn test_custom_period_stats() {
    let repo = repo();
    let anna = employee(repo.as_ref(), "anna@example.com", "Anna", "Ozola").await;
    log_day(repo.as_ref(), anna.id, d(2025, 3, 10)).await;

    let stats = stats::user_stats(
        repo.as_ref(),
        anna.id,
        PeriodType::Custom,
        Some(d(2025, 3, 10)),
        Some(d(2025, 3, 16)),
        d(2025, 3, 12),
    )
    .await
    .unwrap();
    assert_eq!(stats.date_from, d(2025, 3, 10));
    assert_eq!(stats.total_minutes, 420);
    assert_eq!(stats.working_days, 5);
    assert_eq!(stats.days_with_entries, 1);

    let err = stats::employee_stats(
        repo.as_ref(),
        UserId::new(999),
        PeriodType::Month,
        None,
        None,
        d(2025, 3, 12),
    )
    .await
    .unwrap_err();
    assert!(err.is_not_found());
}
