use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::reminder::TemplateStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientCategory {
    #[default]
    Standard,
    Vip,
    Problematic,
}

impl std::fmt::Display for ClientCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ClientCategory::Standard => "standard",
            ClientCategory::Vip => "vip",
            ClientCategory::Problematic => "problematic",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Per-client settings controlling when reminders go out and in what tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPreferences {
    /// Send one reminder ahead of the due date.
    pub send_pre_due_reminder: bool,
    /// How many days before the due date the pre-due window opens.
    pub pre_due_days: u32,
    /// Days after the due date before the first overdue reminder.
    pub first_reminder_days: u32,
    /// Minimum days between consecutive post-due reminders.
    pub reminder_interval: u32,
    /// Reminders are never sent once this many have gone out.
    pub max_reminders: u32,
    pub template_style: TemplateStyle,
}

impl Default for ReminderPreferences {
    fn default() -> Self {
        Self {
            send_pre_due_reminder: false,
            pre_due_days: 3,
            first_reminder_days: 1,
            reminder_interval: 5,
            max_reminders: 3,
            template_style: TemplateStyle::Friendly,
        }
    }
}

/// A customer the user bills.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(default)]
    pub category: ClientCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_preferences: Option<ReminderPreferences>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(user_id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            name: name.into(),
            email: email.into(),
            phone: None,
            company: None,
            address: None,
            category: ClientCategory::Standard,
            notes: None,
            reminder_preferences: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The client's preferences, or the defaults when none were saved.
    pub fn preferences(&self) -> ReminderPreferences {
        self.reminder_preferences.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_preferences_fall_back_to_defaults() {
        let client = Client::new("u1", "Ada", "ada@example.com");
        let prefs = client.preferences();
        assert!(!prefs.send_pre_due_reminder);
        assert_eq!(prefs.pre_due_days, 3);
        assert_eq!(prefs.first_reminder_days, 1);
        assert_eq!(prefs.reminder_interval, 5);
        assert_eq!(prefs.max_reminders, 3);
        assert_eq!(prefs.template_style, TemplateStyle::Friendly);
    }

    #[test]
    fn explicit_zero_days_are_kept() {
        let json = r#"{
            "sendPreDueReminder": true,
            "preDueDays": 0,
            "firstReminderDays": 0,
            "reminderInterval": 1,
            "maxReminders": 0,
            "templateStyle": "formal"
        }"#;
        let prefs: ReminderPreferences = serde_json::from_str(json).unwrap();
        assert_eq!(prefs.pre_due_days, 0);
        assert_eq!(prefs.max_reminders, 0);
        assert_eq!(prefs.template_style, TemplateStyle::Formal);
    }

    #[test]
    fn category_defaults_to_standard() {
        let json = r#"{
            "id": "c1",
            "userId": "u1",
            "name": "Acme",
            "email": "billing@acme.test",
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        }"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client.category, ClientCategory::Standard);
        assert!(client.reminder_preferences.is_none());
    }
}
