//! Derived display fields. Nothing here is persisted; every label is
//! recomputed for each listing from the document and the current time.
use chrono::{DateTime, Local, TimeZone, Utc};

use crate::{Document, DocumentType};

fn plural(n: i64, unit: &str) -> String {
    format!("{} {}{}", n, unit, if n == 1 { "" } else { "s" })
}

/// "Just now", "5 minutes ago", ... falling back to a date for anything a
/// week or older.
pub fn relative_age(when: DateTime<Utc>, now: DateTime<Utc>) -> String {
    relative_age_in(when, now, &Local)
}

pub fn relative_age_in<Tz: TimeZone>(when: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let elapsed = now.signed_duration_since(when);
    let seconds = elapsed.num_seconds();
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if seconds < 60 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{} ago", plural(minutes, "minute"))
    } else if hours < 24 {
        format!("{} ago", plural(hours, "hour"))
    } else if days < 7 {
        format!("{} ago", plural(days, "day"))
    } else {
        // chrono has no locale tables by default; `%x` is always `%m/%d/%y`.
        when.with_timezone(tz).format("%x").to_string()
    }
}

/// Countdown for an active deadline, by calendar day in local time.
pub fn deadline_label(deadline: DateTime<Utc>, now: DateTime<Utc>) -> String {
    deadline_label_in(deadline, now, &Local)
}

pub fn deadline_label_in<Tz: TimeZone>(deadline: DateTime<Utc>, now: DateTime<Utc>, tz: &Tz) -> String {
    let due = deadline.with_timezone(tz).date_naive();
    let today = now.with_timezone(tz).date_naive();
    let days = due.signed_duration_since(today).num_days();

    match days {
        0 => "Due today".to_string(),
        d if d < 0 => format!("{} overdue", plural(-d, "day")),
        d => format!("{} left", plural(d, "day")),
    }
}

/// The label shown next to a document in a listing.
pub fn status_label(doc: &Document, now: DateTime<Utc>) -> String {
    status_label_in(doc, now, &Local)
}

pub fn status_label_in<Tz: TimeZone>(doc: &Document, now: DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match doc.deadline {
        Some(_) if doc.completed => "Completed".to_string(),
        Some(deadline) => deadline_label_in(deadline, now, tz),
        None => relative_age_in(doc.last_modified, now, tz),
    }
}

/// Colour used to tag a document type.
pub fn type_color(doc_type: &DocumentType) -> &'static str {
    match doc_type {
        DocumentType::Document => "blue",
        DocumentType::Wiki => "green",
        DocumentType::List => "orange",
        DocumentType::Interactive => "purple",
        DocumentType::Fiction => "red",
        DocumentType::Unknown(_) => "blue",
    }
}
