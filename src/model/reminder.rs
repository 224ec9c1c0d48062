use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Escalation tier of a reminder's tone.
///
/// Variants are declared in escalation order, so the derived `Ord` gives
/// `PreDue < Due < Gentle < Firm < Assertive < Final`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReminderLevel {
    PreDue,
    Due,
    Gentle,
    Firm,
    Assertive,
    Final,
}

impl ReminderLevel {
    pub const ALL: [ReminderLevel; 6] = [
        ReminderLevel::PreDue,
        ReminderLevel::Due,
        ReminderLevel::Gentle,
        ReminderLevel::Firm,
        ReminderLevel::Assertive,
        ReminderLevel::Final,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ReminderLevel::PreDue => "pre-due",
            ReminderLevel::Due => "due",
            ReminderLevel::Gentle => "gentle",
            ReminderLevel::Firm => "firm",
            ReminderLevel::Assertive => "assertive",
            ReminderLevel::Final => "final",
        }
    }
}

impl fmt::Display for ReminderLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known reminder level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid level '{0}', must be one of: pre-due, due, gentle, firm, assertive, final")]
pub struct UnknownLevel(pub String);

impl FromStr for ReminderLevel {
    type Err = UnknownLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReminderLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownLevel(s.to_string()))
    }
}

/// Which family of wording a client's reminders use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateStyle {
    #[default]
    Friendly,
    Neutral,
    Firm,
    Formal,
}

impl TemplateStyle {
    pub const ALL: [TemplateStyle; 4] = [
        TemplateStyle::Friendly,
        TemplateStyle::Neutral,
        TemplateStyle::Firm,
        TemplateStyle::Formal,
    ];
}

impl fmt::Display for TemplateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TemplateStyle::Friendly => "friendly",
            TemplateStyle::Neutral => "neutral",
            TemplateStyle::Firm => "firm",
            TemplateStyle::Formal => "formal",
        };
        f.write_str(s)
    }
}

/// Who a template belongs to. System templates are visible to every user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TemplateOwner {
    System,
    User {
        #[serde(rename = "userId")]
        user_id: String,
    },
}

impl TemplateOwner {
    /// Whether a template with this owner may be used for `user_id`.
    pub fn visible_to(&self, user_id: &str) -> bool {
        match self {
            TemplateOwner::System => true,
            TemplateOwner::User { user_id: owner } => owner == user_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderTemplate {
    pub id: String,
    pub owner: TemplateOwner,
    pub name: String,
    pub level: ReminderLevel,
    pub style: TemplateStyle,
    /// Subject line; may contain `{placeholder}` tokens.
    pub subject: String,
    /// HTML body; may contain `{placeholder}` tokens.
    pub body: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReminderTemplate {
    pub fn new(
        owner: TemplateOwner,
        name: impl Into<String>,
        level: ReminderLevel,
        style: TemplateStyle,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            owner,
            name: name.into(),
            level,
            style,
            subject: subject.into(),
            body: body.into(),
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Opened,
    Clicked,
    Failed,
}

/// One reminder dispatch attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderHistory {
    pub id: String,
    pub invoice_id: String,
    pub template_id: String,
    pub sent_at: DateTime<Utc>,
    pub level: ReminderLevel,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub status: DeliveryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

/// When an invoice's next reminder is expected and at what tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSchedule {
    pub invoice_id: String,
    pub next_reminder_date: NaiveDate,
    pub next_reminder_level: ReminderLevel,
    pub is_active: bool,
}
