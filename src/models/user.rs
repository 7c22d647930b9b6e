//! Users and employee profiles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use super::{UserId, Workplace};

crate::define_text_enum! {
    /// Access level of a user account.
    pub enum UserRole {
        Employee => "employee",
        Admin => "admin",
    }
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Employee
    }
}

crate::define_text_enum! {
    pub enum EmploymentType {
        FullTime => "full_time",
        PartTime => "part_time",
    }
}

crate::define_text_enum! {
    pub enum PaymentType {
        /// Monthly salary
        Salary => "salary",
        /// Paid by hour
        Hourly => "hourly",
    }
}

/// A login account.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Fields required to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
}

/// Partial update of a user account. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}

/// Personal and employment details of a user (at most one per user).
#[derive(Debug, Clone, PartialEq)]
pub struct EmployeeProfile {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bank_account: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub default_workplace: Workplace,
    pub work_email: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub payment_type: Option<PaymentType>,
    pub birthday: Option<NaiveDate>,
    pub name_day: Option<NaiveDate>,
    pub contract_number: Option<String>,
    pub employment_start_date: Option<NaiveDate>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub declared_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EmployeeProfile {
    /// Create a profile with only the mandatory fields set.
    pub fn new(user_id: UserId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: None,
            avatar_url: None,
            bank_account: None,
            position: None,
            department: None,
            default_workplace: Workplace::Office,
            work_email: None,
            employment_type: Some(EmploymentType::FullTime),
            payment_type: Some(PaymentType::Salary),
            birthday: None,
            name_day: None,
            contract_number: None,
            employment_start_date: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            declared_address: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Apply a partial update in place.
    pub fn apply(&mut self, changes: ProfileChanges) {
        if let Some(v) = changes.first_name {
            self.first_name = v;
        }
        if let Some(v) = changes.last_name {
            self.last_name = v;
        }
        if changes.phone.is_some() {
            self.phone = changes.phone;
        }
        if changes.avatar_url.is_some() {
            self.avatar_url = changes.avatar_url;
        }
        if changes.bank_account.is_some() {
            self.bank_account = changes.bank_account;
        }
        if changes.position.is_some() {
            self.position = changes.position;
        }
        if changes.department.is_some() {
            self.department = changes.department;
        }
        if let Some(v) = changes.default_workplace {
            self.default_workplace = v;
        }
        if changes.work_email.is_some() {
            self.work_email = changes.work_email;
        }
        if changes.employment_type.is_some() {
            self.employment_type = changes.employment_type;
        }
        if changes.payment_type.is_some() {
            self.payment_type = changes.payment_type;
        }
        if changes.birthday.is_some() {
            self.birthday = changes.birthday;
        }
        if changes.name_day.is_some() {
            self.name_day = changes.name_day;
        }
        if changes.contract_number.is_some() {
            self.contract_number = changes.contract_number;
        }
        if changes.employment_start_date.is_some() {
            self.employment_start_date = changes.employment_start_date;
        }
        if changes.emergency_contact_name.is_some() {
            self.emergency_contact_name = changes.emergency_contact_name;
        }
        if changes.emergency_contact_phone.is_some() {
            self.emergency_contact_phone = changes.emergency_contact_phone;
        }
        if changes.declared_address.is_some() {
            self.declared_address = changes.declared_address;
        }
        self.updated_at = Utc::now();
    }
}

impl Serialize for EmployeeProfile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut state = serializer.serialize_struct("EmployeeProfile", 22)?;
        state.serialize_field("user_id", &self.user_id)?;
        state.serialize_field("first_name", &self.first_name)?;
        state.serialize_field("last_name", &self.last_name)?;
        state.serialize_field("full_name", &self.full_name())?;
        state.serialize_field("phone", &self.phone)?;
        state.serialize_field("avatar_url", &self.avatar_url)?;
        state.serialize_field("bank_account", &self.bank_account)?;
        state.serialize_field("position", &self.position)?;
        state.serialize_field("department", &self.department)?;
        state.serialize_field("default_workplace", &self.default_workplace)?;
        state.serialize_field("work_email", &self.work_email)?;
        state.serialize_field("employment_type", &self.employment_type)?;
        state.serialize_field("payment_type", &self.payment_type)?;
        state.serialize_field("birthday", &self.birthday)?;
        state.serialize_field("name_day", &self.name_day)?;
        state.serialize_field("contract_number", &self.contract_number)?;
        state.serialize_field("employment_start_date", &self.employment_start_date)?;
        state.serialize_field("emergency_contact_name", &self.emergency_contact_name)?;
        state.serialize_field("emergency_contact_phone", &self.emergency_contact_phone)?;
        state.serialize_field("declared_address", &self.declared_address)?;
        state.serialize_field("created_at", &self.created_at)?;
        state.serialize_field("updated_at", &self.updated_at)?;
        state.end()
    }
}

/// Partial update of an employee profile. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub bank_account: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub default_workplace: Option<Workplace>,
    pub work_email: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub payment_type: Option<PaymentType>,
    pub birthday: Option<NaiveDate>,
    pub name_day: Option<NaiveDate>,
    pub contract_number: Option<String>,
    pub employment_start_date: Option<NaiveDate>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub declared_address: Option<String>,
}

/// A user together with its profile, as returned by employee listings.
#[derive(Debug, Clone, Serialize)]
pub struct Employee {
    #[serde(flatten)]
    pub user: User,
    pub profile: Option<EmployeeProfile>,
}

impl Employee {
    /// Display name: full name when a profile exists, otherwise the email.
    pub fn display_name(&self) -> String {
        self.profile
            .as_ref()
            .map(EmployeeProfile::full_name)
            .unwrap_or_else(|| self.user.email.clone())
    }

    /// Address for outgoing mail: the work email when set, otherwise the login email.
    pub fn contact_email(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.work_email.as_deref())
            .filter(|e| !e.is_empty())
            .unwrap_or(&self.user.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::new(1),
            email: email.to_string(),
            password_hash: "secret".to_string(),
            role: UserRole::Employee,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let json = serde_json::to_value(user("a@b.lv")).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "employee");
    }

    #[test]
    fn test_profile_apply_keeps_unset_fields() {
        let mut profile = EmployeeProfile::new(UserId::new(1), "Anna", "Ozola");
        profile.phone = Some("+371 2000000".to_string());
        profile.apply(ProfileChanges {
            last_name: Some("Bērziņa".to_string()),
            ..Default::default()
        });
        assert_eq!(profile.full_name(), "Anna Bērziņa");
        assert_eq!(profile.phone.as_deref(), Some("+371 2000000"));
    }

    #[test]
    fn test_contact_email_prefers_work_email() {
        let mut profile = EmployeeProfile::new(UserId::new(1), "Anna", "Ozola");
        let employee = Employee {
            user: user("anna@home.lv"),
            profile: Some(profile.clone()),
        };
        assert_eq!(employee.contact_email(), "anna@home.lv");

        profile.work_email = Some("anna@company.lv".to_string());
        let employee = Employee {
            user: user("anna@home.lv"),
            profile: Some(profile),
        };
        assert_eq!(employee.contact_email(), "anna@company.lv");
        assert_eq!(employee.display_name(), "Anna Ozola");
    }
}
