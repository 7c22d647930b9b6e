//! Storage selection and the in-memory repository behind the time-tracking services.

mod support;

use chrono::{Duration, Utc};

use support::{d, t};
use time_control::db::{
    FullRepository, RepositoryConfig, RepositoryFactory, RepositoryType,
};
use time_control::models::{
    ApprovalStatus, NewNotification, NewTimeEntry, NewUser, NewVacation, NotificationType,
    StatusType, User, UserRole, Workplace,
};

async fn user(repo: &dyn FullRepository, email: &str) -> User {
    repo.create_user(NewUser {
        email: email.to_string(),
        password_hash: "hash".to_string(),
        role: UserRole::Employee,
        is_active: true,
    })
    .await
    .unwrap()
}

fn work(user: &User, date: chrono::NaiveDate, start: u32, end: u32) -> NewTimeEntry {
    NewTimeEntry {
        user_id: user.id,
        date,
        start_time: t(start, 0),
        end_time: t(end, 0),
        break_minutes: 0,
        workplace: Workplace::Remote,
        comment: None,
    }
}

// =============================================================================
// Backend selection
// =============================================================================

#[test]
fn test_environment_without_database_is_local() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            assert_eq!(RepositoryConfig::from_env().unwrap(), RepositoryConfig::Local);
        },
    );
}

#[test]
fn test_database_url_selects_postgres_with_pool_settings() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", Some("postgres://localhost/time_control")),
            ("PG_POOL_MAX", Some("4")),
            ("PG_MAX_RETRIES", Some("not-a-number")),
        ],
        || {
            let RepositoryConfig::Postgres(pg) = RepositoryConfig::from_env().unwrap() else {
                panic!("expected postgres settings");
            };
            assert_eq!(pg.database_url, "postgres://localhost/time_control");
            assert_eq!(pg.max_connections, 4);
            assert_eq!(pg.max_retries, 3);
        },
    );
}

#[test]
fn test_explicit_postgres_needs_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("postgres")),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || {
            let err = RepositoryConfig::from_env().unwrap_err();
            assert!(err.to_string().contains("DATABASE_URL"));
        },
    );
}

#[test]
fn test_unknown_type_falls_back_to_local() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("sqlite")),
            ("DATABASE_URL", Some("postgres://localhost/time_control")),
        ],
        || {
            let config = RepositoryConfig::from_env().unwrap();
            assert_eq!(config.repository_type(), RepositoryType::Local);
        },
    );
}

// =============================================================================
// Time entries and plans
// =============================================================================

#[tokio::test]
async fn test_time_entries_filtered_by_user_and_sorted() {
    let repo = RepositoryFactory::create_local();
    let anna = user(repo.as_ref(), "anna@example.com").await;
    let bob = user(repo.as_ref(), "bob@example.com").await;

    repo.create_time_entry(work(&anna, d(2025, 3, 11), 13, 15)).await.unwrap();
    repo.create_time_entry(work(&anna, d(2025, 3, 11), 8, 12)).await.unwrap();
    repo.create_time_entry(work(&anna, d(2025, 3, 10), 9, 10)).await.unwrap();
    repo.create_time_entry(work(&anna, d(2025, 3, 14), 9, 10)).await.unwrap();
    repo.create_time_entry(work(&bob, d(2025, 3, 11), 9, 17)).await.unwrap();

    let entries = repo
        .list_time_entries(Some(anna.id), d(2025, 3, 10), d(2025, 3, 11))
        .await
        .unwrap();
    let order: Vec<_> = entries.iter().map(|e| (e.date, e.start_time)).collect();
    assert_eq!(
        order,
        vec![
            (d(2025, 3, 10), t(9, 0)),
            (d(2025, 3, 11), t(8, 0)),
            (d(2025, 3, 11), t(13, 0)),
        ]
    );

    let everyone = repo
        .list_time_entries(None, d(2025, 3, 11), d(2025, 3, 11))
        .await
        .unwrap();
    assert_eq!(everyone.len(), 3);
}

#[tokio::test]
async fn test_workplace_plan_upsert_overwrites() {
    let repo = RepositoryFactory::create_local();
    let anna = user(repo.as_ref(), "anna@example.com").await;
    let day = d(2025, 3, 12);

    let first = repo.upsert_workplace_plan(anna.id, day, Workplace::Office).await.unwrap();
    let second = repo.upsert_workplace_plan(anna.id, day, Workplace::Remote).await.unwrap();
    assert_eq!(first.id, second.id);

    let plans = repo.list_workplace_plans(None, day, day).await.unwrap();
    assert_eq!(plans.len(), 1);
    assert_eq!(plans[0].workplace, Workplace::Remote);

    assert!(repo.delete_workplace_plan(anna.id, day).await.unwrap());
    assert!(!repo.delete_workplace_plan(anna.id, day).await.unwrap());
}

// =============================================================================
// Leave
// =============================================================================

#[tokio::test]
async fn test_vacation_overlap_query() {
    let repo = RepositoryFactory::create_local();
    let anna = user(repo.as_ref(), "anna@example.com").await;

    for (from, to) in [((3, 3), (3, 7)), ((3, 17), (3, 21)), ((4, 1), (4, 2))] {
        repo.create_vacation(NewVacation {
            user_id: anna.id,
            date_from: d(2025, from.0, from.1),
            date_to: d(2025, to.0, to.1),
            status: ApprovalStatus::Approved,
            note: None,
        })
        .await
        .unwrap();
    }

    let hits = repo
        .list_vacations_overlapping(Some(anna.id), d(2025, 3, 7), d(2025, 3, 17))
        .await
        .unwrap();
    let starts: Vec<_> = hits.iter().map(|v| v.date_from).collect();
    assert_eq!(starts, vec![d(2025, 3, 3), d(2025, 3, 17)]);
}

#[tokio::test]
async fn test_delete_statuses_in_range_keeps_other_kinds() {
    let repo = RepositoryFactory::create_local();
    let anna = user(repo.as_ref(), "anna@example.com").await;

    for day in 10..=12 {
        repo.upsert_day_status(anna.id, d(2025, 3, day), StatusType::Vacation, None)
            .await
            .unwrap();
    }
    repo.upsert_day_status(anna.id, d(2025, 3, 13), StatusType::Sick, None)
        .await
        .unwrap();

    let removed = repo
        .delete_day_statuses_in_range(anna.id, d(2025, 3, 11), d(2025, 3, 13), StatusType::Vacation)
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let left = repo
        .list_day_statuses(Some(anna.id), d(2025, 3, 1), d(2025, 3, 31))
        .await
        .unwrap();
    let kinds: Vec<_> = left.iter().map(|s| (s.date, s.status)).collect();
    assert_eq!(
        kinds,
        vec![
            (d(2025, 3, 10), StatusType::Vacation),
            (d(2025, 3, 13), StatusType::Sick),
        ]
    );
}

// =============================================================================
// Notifications
// =============================================================================

#[tokio::test]
async fn test_notifications_read_state_is_per_owner() {
    let repo = RepositoryFactory::create_local();
    let anna = user(repo.as_ref(), "anna@example.com").await;
    let bob = user(repo.as_ref(), "bob@example.com").await;

    let first = repo
        .create_notification(NewNotification::new(anna.id, NotificationType::System, "One", "{}"))
        .await
        .unwrap();
    repo.create_notification(
        NewNotification::new(anna.id, NotificationType::Birthday, "Two", "{}").related_user(bob.id),
    )
    .await
    .unwrap();

    let inbox = repo.list_notifications(anna.id, false, 10).await.unwrap();
    assert_eq!(inbox.len(), 2);
    assert_eq!(inbox[0].title, "Two");

    assert!(!repo.mark_notification_read(bob.id, first.id).await.unwrap());
    assert!(repo.mark_notification_read(anna.id, first.id).await.unwrap());
    assert_eq!(repo.count_unread_notifications(anna.id).await.unwrap(), 1);

    let now = Utc::now();
    let window = (now - Duration::hours(1), now + Duration::hours(1));
    assert!(repo
        .notification_exists(anna.id, NotificationType::Birthday, Some(bob.id), window.0, window.1)
        .await
        .unwrap());
    assert!(!repo
        .notification_exists(anna.id, NotificationType::Birthday, Some(anna.id), window.0, window.1)
        .await
        .unwrap());
}
