//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveTime};

#[cfg(feature = "http-server")]
use time_control::config::AppConfig;
use time_control::db::{FullRepository, LocalRepository};
#[cfg(feature = "http-server")]
use time_control::http::AppState;
use time_control::models::{User, UserRole};
use time_control::services::mailer::{EmailService, MemoryTransport};
use time_control::services::users::{self, EmployeeCreate};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// This is panic-safe (restores variables on unwind) and also serializes access to
/// process-global env vars to avoid flaky tests when Rust runs tests in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().expect("ENV_LOCK poisoned");
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn repo() -> Arc<dyn FullRepository> {
    Arc::new(LocalRepository::new())
}

/// Email service that keeps every message in the returned transport.
pub fn mail() -> (EmailService, Arc<MemoryTransport>) {
    let transport = Arc::new(MemoryTransport::new());
    let service = EmailService::new(transport.clone(), "TimeControl", "http://localhost:3000/");
    (service, transport)
}

pub fn new_employee(email: &str, first: &str, last: &str, role: UserRole) -> EmployeeCreate {
    EmployeeCreate {
        email: email.to_string(),
        password: "password123".to_string(),
        role,
        first_name: first.to_string(),
        last_name: last.to_string(),
        phone: None,
        bank_account: None,
        position: Some("Developer".to_string()),
        department: Some("Backend".to_string()),
        work_email: None,
        employment_type: None,
        payment_type: None,
        birthday: None,
    }
}

pub async fn employee(repo: &dyn FullRepository, email: &str, first: &str, last: &str) -> User {
    users::create_employee(repo, new_employee(email, first, last, UserRole::Employee))
        .await
        .unwrap()
        .user
}

pub async fn admin(repo: &dyn FullRepository, email: &str) -> User {
    users::create_employee(repo, new_employee(email, "Admin", "User", UserRole::Admin))
        .await
        .unwrap()
        .user
}

#[cfg(feature = "http-server")]
/// Router state over a fresh repository with in-memory mail.
pub fn app_state() -> AppState {
    let (service, _) = mail();
    AppState::new(repo(), AppConfig::default(), Arc::new(service))
}

#[cfg(feature = "http-server")]
pub fn bearer(state: &AppState, user: &User) -> String {
    let pair = state.tokens.issue_pair(user).unwrap();
    format!("Bearer {}", pair.access_token)
}
