//! User accounts and employee profiles.

use chrono::NaiveDate;
use serde::Deserialize;

use super::auth::{hash_password, normalize_email, verify_password};
use super::error::{found, ServiceError, ServiceResult};
use crate::db::FullRepository;
use crate::models::{
    Employee, EmployeeProfile, EmploymentType, NewUser, PaymentType, ProfileChanges, User,
    UserChanges, UserId, UserRole,
};

pub const MIN_PASSWORD_LEN: usize = 6;
const MAX_NAME_LEN: usize = 100;

/// New employee account together with the initial profile.
#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeCreate {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bank_account: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub work_email: Option<String>,
    #[serde(default)]
    pub employment_type: Option<EmploymentType>,
    #[serde(default)]
    pub payment_type: Option<PaymentType>,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
}

/// Account-level changes made by an admin.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EmployeeUpdate {
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<UserRole>,
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}

fn check_email(email: &str) -> ServiceResult<String> {
    let email = normalize_email(email);
    if !is_plausible_email(&email) {
        return Err(ServiceError::validation("Invalid email address"));
    }
    Ok(email)
}

fn check_password(password: &str) -> ServiceResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn check_name(value: &str, field: &str) -> ServiceResult<()> {
    let len = value.trim().chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(ServiceError::validation(format!(
            "{} must be between 1 and {} characters",
            field, MAX_NAME_LEN
        )));
    }
    Ok(())
}

async fn ensure_email_free(repo: &dyn FullRepository, email: &str) -> ServiceResult<()> {
    if repo.get_user_by_email(email).await?.is_some() {
        return Err(ServiceError::validation("Email already registered"));
    }
    Ok(())
}

pub async fn get_user(repo: &dyn FullRepository, id: UserId) -> ServiceResult<User> {
    found(repo.get_user(id).await?, "Employee")
}

/// A user with its profile; `NotFound("Employee not found")` when absent.
pub async fn get_employee(repo: &dyn FullRepository, id: UserId) -> ServiceResult<Employee> {
    let user = get_user(repo, id).await?;
    let profile = repo.get_profile(id).await?;
    Ok(Employee { user, profile })
}

/// Users with their profiles, ordered by id.
pub async fn list_employees(
    repo: &dyn FullRepository,
    active_only: bool,
) -> ServiceResult<Vec<Employee>> {
    let users = repo.list_users(active_only).await?;
    let mut profiles = repo.list_profiles().await?;

    Ok(users
        .into_iter()
        .map(|user| {
            let profile = profiles
                .iter()
                .position(|p| p.user_id == user.id)
                .map(|i| profiles.swap_remove(i));
            Employee { user, profile }
        })
        .collect())
}

pub async fn create_employee(
    repo: &dyn FullRepository,
    input: EmployeeCreate,
) -> ServiceResult<Employee> {
    let email = check_email(&input.email)?;
    check_password(&input.password)?;
    check_name(&input.first_name, "First name")?;
    check_name(&input.last_name, "Last name")?;
    ensure_email_free(repo, &email).await?;

    let user = repo
        .create_user(NewUser {
            email,
            password_hash: hash_password(&input.password)?,
            role: input.role,
            is_active: true,
        })
        .await?;

    let mut profile = EmployeeProfile::new(user.id, input.first_name.trim(), input.last_name.trim());
    profile.phone = input.phone;
    profile.bank_account = input.bank_account;
    profile.position = input.position;
    profile.department = input.department;
    profile.work_email = input.work_email;
    profile.birthday = input.birthday;
    if input.employment_type.is_some() {
        profile.employment_type = input.employment_type;
    }
    if input.payment_type.is_some() {
        profile.payment_type = input.payment_type;
    }
    let profile = repo.save_profile(profile).await?;

    log::info!("Created {} account {}", user.role, user.id);
    Ok(Employee {
        user,
        profile: Some(profile),
    })
}

/// Apply account changes; a new email must be free and a new password is rehashed.
pub async fn update_employee(
    repo: &dyn FullRepository,
    id: UserId,
    update: EmployeeUpdate,
) -> ServiceResult<Employee> {
    let current = get_user(repo, id).await?;

    let email = match update.email {
        Some(email) => {
            let email = check_email(&email)?;
            if email != current.email {
                ensure_email_free(repo, &email).await?;
                Some(email)
            } else {
                None
            }
        }
        None => None,
    };
    let password_hash = match update.password {
        Some(password) => {
            check_password(&password)?;
            Some(hash_password(&password)?)
        }
        None => None,
    };

    repo.update_user(
        id,
        UserChanges {
            email,
            password_hash,
            role: update.role,
            is_active: update.is_active,
        },
    )
    .await?;
    get_employee(repo, id).await
}

pub async fn get_profile(
    repo: &dyn FullRepository,
    user_id: UserId,
) -> ServiceResult<EmployeeProfile> {
    found(repo.get_profile(user_id).await?, "Profile")
}

pub async fn update_profile(
    repo: &dyn FullRepository,
    user_id: UserId,
    changes: ProfileChanges,
) -> ServiceResult<EmployeeProfile> {
    if let Some(first) = &changes.first_name {
        check_name(first, "First name")?;
    }
    if let Some(last) = &changes.last_name {
        check_name(last, "Last name")?;
    }
    let mut profile = get_profile(repo, user_id).await?;
    profile.apply(changes);
    Ok(repo.save_profile(profile).await?)
}

pub async fn set_active(
    repo: &dyn FullRepository,
    id: UserId,
    is_active: bool,
) -> ServiceResult<User> {
    get_user(repo, id).await?;
    let user = repo
        .update_user(
            id,
            UserChanges {
                is_active: Some(is_active),
                ..Default::default()
            },
        )
        .await?;
    log::info!(
        "User {} {}",
        id,
        if is_active { "activated" } else { "deactivated" }
    );
    Ok(user)
}

/// Delete a user and everything owned by it.
pub async fn delete_employee(repo: &dyn FullRepository, id: UserId) -> ServiceResult<()> {
    if !repo.delete_user(id).await? {
        return Err(ServiceError::not_found("Employee not found"));
    }
    log::info!("Deleted user {}", id);
    Ok(())
}

pub async fn change_password(
    repo: &dyn FullRepository,
    user: &User,
    current_password: &str,
    new_password: &str,
) -> ServiceResult<()> {
    if current_password.is_empty() || new_password.is_empty() {
        return Err(ServiceError::validation(
            "Both current_password and new_password are required",
        ));
    }
    if new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::validation(
            "New password must be at least 6 characters",
        ));
    }
    if !verify_password(current_password, &user.password_hash) {
        return Err(ServiceError::validation("Current password is incorrect"));
    }
    repo.update_user(
        user.id,
        UserChanges {
            password_hash: Some(hash_password(new_password)?),
            ..Default::default()
        },
    )
    .await?;
    Ok(())
}

/// Active admins, used as recipients of workflow notifications.
pub async fn list_admins(repo: &dyn FullRepository) -> ServiceResult<Vec<Employee>> {
    Ok(list_employees(repo, true)
        .await?
        .into_iter()
        .filter(|e| e.user.is_admin())
        .collect())
}

/// What [`ensure_admin`] did.
#[derive(Debug, Clone)]
pub enum AdminSetup {
    Created(Employee),
    Promoted(User),
    AlreadyAdmin(User),
}

/// Create an admin account, or promote and reactivate an existing user
/// with the same email. The password of an existing user is left alone.
pub async fn ensure_admin(
    repo: &dyn FullRepository,
    mut input: EmployeeCreate,
) -> ServiceResult<AdminSetup> {
    let email = check_email(&input.email)?;
    let Some(existing) = repo.get_user_by_email(&email).await? else {
        input.role = UserRole::Admin;
        return Ok(AdminSetup::Created(create_employee(repo, input).await?));
    };
    if existing.is_admin() && existing.is_active {
        return Ok(AdminSetup::AlreadyAdmin(existing));
    }
    let user = repo
        .update_user(
            existing.id,
            UserChanges {
                role: Some(UserRole::Admin),
                is_active: Some(true),
                ..Default::default()
            },
        )
        .await?;
    log::info!("Promoted user {} to admin", user.id);
    Ok(AdminSetup::Promoted(user))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("anna@example.lv"));
        assert!(!is_plausible_email("anna.example.lv"));
        assert!(!is_plausible_email("@example.lv"));
        assert!(!is_plausible_email("anna@localhost"));
        assert!(!is_plausible_email("an na@example.lv"));
    }

    #[test]
    fn test_password_length() {
        assert!(check_password("12345").is_err());
        assert!(check_password("123456").is_ok());
    }

    fn admin_input(email: &str) -> EmployeeCreate {
        EmployeeCreate {
            email: email.to_string(),
            password: "secret123".to_string(),
            role: UserRole::Employee,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            phone: None,
            bank_account: None,
            position: None,
            department: None,
            work_email: None,
            employment_type: None,
            payment_type: None,
            birthday: None,
        }
    }

    #[tokio::test]
    async fn test_ensure_admin_creates_then_keeps() {
        let repo = crate::db::LocalRepository::new();
        let created = ensure_admin(&repo, admin_input("Boss@Example.lv")).await.unwrap();
        let AdminSetup::Created(employee) = created else {
            panic!("expected a new account");
        };
        assert!(employee.user.is_admin());
        assert_eq!(employee.user.email, "boss@example.lv");

        let again = ensure_admin(&repo, admin_input("boss@example.lv")).await.unwrap();
        assert!(matches!(again, AdminSetup::AlreadyAdmin(_)));
    }

    #[tokio::test]
    async fn test_ensure_admin_promotes_employee() {
        let repo = crate::db::LocalRepository::new();
        let employee = create_employee(&repo, admin_input("anna@example.lv")).await.unwrap();
        set_active(&repo, employee.user.id, false).await.unwrap();

        let setup = ensure_admin(&repo, admin_input("anna@example.lv")).await.unwrap();
        let AdminSetup::Promoted(user) = setup else {
            panic!("expected a promotion");
        };
        assert!(user.is_admin());
        assert!(user.is_active);
    }
}
