//! Departments and company-wide display settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DepartmentId;

/// Departments created on first start; they cannot be deleted.
pub const DEFAULT_DEPARTMENTS: &[&str] = &["SEO", "Frontend", "Backend", "Design", "Marketing", "Management"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// One stored key/value setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySetting {
    pub key: String,
    pub value: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub const LOGO_URL_KEY: &str = "logo_url";

/// Icon keys paired with their default icon names.
pub const ICON_DEFAULTS: &[(&str, &str)] = &[
    ("icon_vacation", "Palmtree"),
    ("icon_sick", "Cross"),
    ("icon_office", "Building2"),
    ("icon_remote", "Monitor"),
    ("icon_holiday", "Gift"),
    ("icon_excused", "CircleCheckBig"),
];

/// Icon names the frontend can render.
pub const ALLOWED_ICONS: &[&str] = &[
    "Palmtree", "Cross", "Building2", "Monitor", "Gift", "CircleCheckBig",
    "Home", "Briefcase", "Coffee", "Sun", "Moon", "Star", "Heart",
    "Smile", "Frown", "ThumbsUp", "ThumbsDown", "Check", "X",
    "Calendar", "Clock", "User", "Users", "MapPin", "Plane",
    "Car", "Bike", "Train", "Ship", "Umbrella", "Cloud", "CloudRain",
    "Thermometer", "Activity", "AlertCircle", "Bell", "Bookmark",
    "Camera", "CreditCard", "File", "Folder", "Globe", "Key",
    "Lock", "Mail", "MessageCircle", "Phone", "Search", "Settings",
    "Shield", "ShoppingCart", "Tag", "Trash", "Upload", "Download",
    "Wifi", "Zap", "Award", "Flag", "Target", "Compass",
    "Bed", "TreePine", "Mountain", "Waves", "Snowflake", "Flame",
    "PartyPopper", "Cake", "Baby", "GraduationCap", "Stethoscope",
    "Pill", "Syringe", "Bandage", "Hospital", "HeartPulse",
];

pub fn is_icon_key(key: &str) -> bool {
    ICON_DEFAULTS.iter().any(|(k, _)| *k == key)
}

/// Lucide icon names from the allow list, or custom images by path or data URL.
pub fn is_valid_icon(value: &str) -> bool {
    value.starts_with("/uploads/") || value.starts_with("data:") || ALLOWED_ICONS.contains(&value)
}

/// Settings as served to clients, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanySettings {
    pub logo_url: Option<String>,
    pub icon_vacation: String,
    pub icon_sick: String,
    pub icon_office: String,
    pub icon_remote: String,
    pub icon_holiday: String,
    pub icon_excused: String,
}

impl CompanySettings {
    pub fn from_settings(settings: &[CompanySetting]) -> Self {
        let lookup = |key: &str| {
            settings
                .iter()
                .find(|s| s.key == key)
                .and_then(|s| s.value.clone())
        };
        let icon = |key: &str| {
            lookup(key).unwrap_or_else(|| {
                ICON_DEFAULTS
                    .iter()
                    .find(|(k, _)| *k == key)
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default()
            })
        };

        Self {
            logo_url: lookup(LOGO_URL_KEY),
            icon_vacation: icon("icon_vacation"),
            icon_sick: icon("icon_sick"),
            icon_office: icon("icon_office"),
            icon_remote: icon("icon_remote"),
            icon_holiday: icon("icon_holiday"),
            icon_excused: icon("icon_excused"),
        }
    }
}

/// Partial icon update; unset keys stay as they are.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct IconSettingsUpdate {
    pub icon_vacation: Option<String>,
    pub icon_sick: Option<String>,
    pub icon_office: Option<String>,
    pub icon_remote: Option<String>,
    pub icon_holiday: Option<String>,
    pub icon_excused: Option<String>,
}

impl IconSettingsUpdate {
    /// Set values keyed by setting name.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("icon_vacation", &self.icon_vacation),
            ("icon_sick", &self.icon_sick),
            ("icon_office", &self.icon_office),
            ("icon_remote", &self.icon_remote),
            ("icon_holiday", &self.icon_holiday),
            ("icon_excused", &self.icon_excused),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_validation() {
        assert!(is_valid_icon("Palmtree"));
        assert!(is_valid_icon("/uploads/icons/custom.svg"));
        assert!(is_valid_icon("data:image/svg+xml;base64,AAAA"));
        assert!(!is_valid_icon("palmtree"));
        assert!(!is_valid_icon("https://example.com/x.svg"));
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let stored = vec![CompanySetting {
            key: "icon_sick".into(),
            value: Some("Pill".into()),
            updated_at: Utc::now(),
        }];
        let settings = CompanySettings::from_settings(&stored);
        assert_eq!(settings.icon_sick, "Pill");
        assert_eq!(settings.icon_vacation, "Palmtree");
        assert_eq!(settings.logo_url, None);
    }

    #[test]
    fn test_icon_update_entries_skip_unset() {
        let update = IconSettingsUpdate {
            icon_office: Some("Briefcase".into()),
            ..Default::default()
        };
        assert_eq!(update.entries(), vec![("icon_office", "Briefcase")]);
        assert!(is_icon_key("icon_excused"));
        assert!(!is_icon_key(LOGO_URL_KEY));
    }
}
