//! Reminder scheduling policy.
//!
//! Decides whether an invoice is due for a reminder today and which
//! escalation level that reminder carries. Everything here is a pure function
//! of the invoice, the client's preferences and the calendar date; time of day
//! never matters.

use chrono::{Days, NaiveDate};

use crate::model::{Invoice, ReminderLevel, ReminderPreferences, ReminderSchedule};

/// Stateless decision rules for reminder timing and tone.
pub struct ReminderPolicy;

impl ReminderPolicy {
    /// Whether a reminder should go out for `invoice` on `today`.
    ///
    /// - Before any reminder, a pre-due notice fires inside
    ///   `[due - pre_due_days, due)` when enabled, and the first overdue
    ///   notice fires from `due + first_reminder_days` on.
    /// - Nothing ever fires once `max_reminders` have gone out, including
    ///   the first reminder when `max_reminders` is zero.
    /// - Once escalation has started, nothing fires while the due date is
    ///   still ahead; otherwise a reminder fires `reminder_interval` days
    ///   after the previous one.
    /// - A sent count without a last-sent timestamp never fires.
    pub fn should_send_reminder(
        invoice: &Invoice,
        prefs: &ReminderPreferences,
        today: NaiveDate,
    ) -> bool {
        let due = invoice.due_date;

        if invoice.reminders_sent >= prefs.max_reminders {
            return false;
        }

        if invoice.reminders_sent > 0 && due > today {
            return false;
        }

        if invoice.reminders_sent == 0 {
            let pre_due_date = sub_days(due, prefs.pre_due_days);
            if prefs.send_pre_due_reminder && pre_due_date <= today && today < due {
                return true;
            }
            return today >= add_days(due, prefs.first_reminder_days);
        }

        match invoice.last_reminder_sent {
            Some(last) => today >= add_days(last.date_naive(), prefs.reminder_interval),
            None => false,
        }
    }

    /// The tone a reminder sent on `today` should use.
    pub fn reminder_level(invoice: &Invoice, today: NaiveDate) -> ReminderLevel {
        Self::level_for(invoice.due_date, invoice.reminders_sent, today)
    }

    fn level_for(due: NaiveDate, reminders_sent: u32, today: NaiveDate) -> ReminderLevel {
        if today < due {
            return ReminderLevel::PreDue;
        }
        if today == due {
            return ReminderLevel::Due;
        }
        match reminders_sent {
            0 => ReminderLevel::Gentle,
            1 => ReminderLevel::Firm,
            2 => ReminderLevel::Assertive,
            _ => ReminderLevel::Final,
        }
    }

    /// The first date on or after `today` on which
    /// [`should_send_reminder`](Self::should_send_reminder) holds, assuming the
    /// invoice is left untouched until then.
    ///
    /// Returns `None` when no reminder can fire without an outside change:
    /// the cap is reached (a zero cap included), or a sent count has no
    /// last-sent timestamp.
    pub fn next_reminder(
        invoice: &Invoice,
        prefs: &ReminderPreferences,
        today: NaiveDate,
    ) -> Option<ReminderSchedule> {
        let due = invoice.due_date;

        if invoice.reminders_sent >= prefs.max_reminders {
            return None;
        }

        let date = if invoice.reminders_sent == 0 {
            if prefs.send_pre_due_reminder && today < due {
                // An empty window (pre_due_days == 0) falls through to the
                // first overdue date.
                let window_start = sub_days(due, prefs.pre_due_days).max(today);
                if window_start < due {
                    window_start
                } else {
                    add_days(due, prefs.first_reminder_days)
                }
            } else {
                add_days(due, prefs.first_reminder_days).max(today)
            }
        } else {
            let last = invoice.last_reminder_sent?.date_naive();
            add_days(last, prefs.reminder_interval).max(due).max(today)
        };

        Some(ReminderSchedule {
            invoice_id: invoice.id.clone(),
            next_reminder_date: date,
            next_reminder_level: Self::level_for(due, invoice.reminders_sent, date),
            is_active: true,
        })
    }
}

/// Whole days between `due` and `today`, zero when not yet overdue.
pub fn days_overdue(due: NaiveDate, today: NaiveDate) -> i64 {
    (today - due).num_days().max(0)
}

fn add_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

fn sub_days(date: NaiveDate, days: u32) -> NaiveDate {
    date.checked_sub_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MIN)
}
