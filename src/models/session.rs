// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Class sessions between a tutor and a client.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Booking lifecycle.
///
/// `pending -> confirmed -> completed | cancelled`, or `pending -> cancelled`.
/// Nothing leaves `completed` or `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum SessionStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub const ALL: [SessionStatus; 4] = [
        SessionStatus::Pending,
        SessionStatus::Confirmed,
        SessionStatus::Completed,
        SessionStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Confirmed => "confirmed",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }

    /// Whether `self -> next` is an edge of the lifecycle.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Completed) | (Confirmed, Cancelled)
        )
    }

    /// Every status with an edge into `next`.
    pub fn sources(next: SessionStatus) -> Vec<SessionStatus> {
        Self::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(next))
            .collect()
    }

    /// `completed` and `cancelled`.
    pub fn closed() -> Vec<SessionStatus> {
        Self::ALL.into_iter().filter(|s| s.is_terminal()).collect()
    }
}

/// Video platform a confirmed session is hosted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum MeetingPlatform {
    #[default]
    GoogleMeet,
    Zoom,
    Custom,
}

impl MeetingPlatform {
    /// Parse a platform selector. Unknown values yield `None`.
    pub fn parse(selector: &str) -> Option<Self> {
        match selector.trim() {
            "google_meet" => Some(MeetingPlatform::GoogleMeet),
            "zoom" => Some(MeetingPlatform::Zoom),
            "custom" => Some(MeetingPlatform::Custom),
            _ => None,
        }
    }

    /// Resolve an optional selector, falling back to `default` when it is
    /// missing, blank, or not a known platform.
    pub fn from_selector(selector: Option<&str>, default: MeetingPlatform) -> Self {
        selector.and_then(Self::parse).unwrap_or(default)
    }

    pub fn display_name(self) -> &'static str {
        match self {
            MeetingPlatform::GoogleMeet => "Google Meet",
            MeetingPlatform::Zoom => "Zoom",
            MeetingPlatform::Custom => "Custom room",
        }
    }
}

/// Allowed session lengths, in minutes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i32", into = "i32")]
#[repr(i32)]
pub enum SessionDuration {
    ThirtyMinutes = 30,
    #[default]
    OneHour = 60,
    NinetyMinutes = 90,
    TwoHours = 120,
}

impl SessionDuration {
    pub fn minutes(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for SessionDuration {
    type Error = String;

    fn try_from(minutes: i32) -> Result<Self, Self::Error> {
        match minutes {
            30 => Ok(SessionDuration::ThirtyMinutes),
            60 => Ok(SessionDuration::OneHour),
            90 => Ok(SessionDuration::NinetyMinutes),
            120 => Ok(SessionDuration::TwoHours),
            other => Err(format!("{other} is not an allowed session duration")),
        }
    }
}

impl From<SessionDuration> for i32 {
    fn from(duration: SessionDuration) -> Self {
        duration.minutes()
    }
}

/// Join details produced when a session is confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeetingDetails {
    pub meeting_url: String,
    pub host_join_url: String,
    pub meeting_id: String,
    pub meeting_password: Option<String>,
}

/// Stored session, joined with the participants' display names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClassSession {
    pub id: i64,
    pub tutor_id: i64,
    pub tutor_name: String,
    pub client_id: i64,
    pub client_name: String,
    pub subject: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub duration: SessionDuration,
    pub status: SessionStatus,
    pub meeting_platform: MeetingPlatform,
    /// Meeting fields stay null until the session is confirmed
    pub meeting_url: Option<String>,
    pub meeting_id: Option<String>,
    pub meeting_password: Option<String>,
    pub host_join_url: Option<String>,
    /// Latched the first time the tutor opens the meeting room
    pub meeting_started: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ClassSession {
    /// Local instant the session begins.
    pub fn starts_at(&self) -> NaiveDateTime {
        self.scheduled_date.and_time(self.scheduled_time)
    }

    /// Still ahead of `now` and not yet closed.
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        self.starts_at() > now
            && matches!(self.status, SessionStatus::Pending | SessionStatus::Confirmed)
    }

    pub fn is_past(&self, now: NaiveDateTime) -> bool {
        self.starts_at() < now
    }

    pub fn is_participant(&self, user_id: i64) -> bool {
        self.tutor_id == user_id || self.client_id == user_id
    }

    /// The tutor hosts the meeting.
    pub fn is_host(&self, user_id: i64) -> bool {
        self.tutor_id == user_id
    }

    /// Meeting topic, e.g. "Algebra - Ana Torres with Luis Vega".
    pub fn meeting_topic(&self) -> String {
        format!(
            "{} - {} with {}",
            self.subject, self.tutor_name, self.client_name
        )
    }

    /// The session as `user_id` may see it: only the host keeps the host link.
    pub fn for_viewer(mut self, user_id: i64) -> Self {
        if !self.is_host(user_id) {
            self.host_join_url = None;
        }
        self
    }
}

/// Fields for a new session request. Always stored as `pending`.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub tutor_id: i64,
    pub client_id: i64,
    pub subject: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration: SessionDuration,
    pub meeting_platform: MeetingPlatform,
    pub notes: Option<String>,
}
