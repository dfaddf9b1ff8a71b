// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session booking lifecycle.
//!
//! Every transition is a single conditional UPDATE on the current status, so
//! concurrent confirm/cancel calls cannot both succeed. When the write
//! matches no row the session is re-read and the conflict reported from the
//! state that won.

use crate::db::Database;
use crate::error::{AppError, Destination, Result};
use crate::models::{
    ClassSession, MeetingPlatform, NewSession, Principal, SessionDuration, SessionStatus,
};
use crate::services::meeting::{MeetingContext, MeetingService};
use crate::validation::FieldErrors;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use validator::Validate;

const ALREADY_PROCESSED: &str = "This session has already been processed.";
const ALREADY_CANCELLED: &str = "This session is already cancelled.";
const CANNOT_CANCEL_COMPLETED: &str = "You cannot cancel a completed session.";
const NOT_CONFIRMED: &str = "This session has not been confirmed yet.";

/// Session request form as submitted by a client.
///
/// The meeting platform is not part of the request; the tutor picks it when
/// confirming.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SessionRequestInput {
    #[serde(default)]
    #[validate(length(min = 1, max = 200, message = "Enter a subject (at most 200 characters)."))]
    pub subject: String,
    /// `YYYY-MM-DD`
    #[serde(default)]
    pub scheduled_date: String,
    /// `HH:MM` or `HH:MM:SS`
    #[serde(default)]
    pub scheduled_time: String,
    /// Minutes; 60 when omitted
    pub duration: Option<i32>,
    pub notes: Option<String>,
}

/// A session request that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRequest {
    pub subject: String,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub duration: SessionDuration,
    pub notes: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .ok()
}

impl SessionRequestInput {
    /// Check every field against the booking rules; `today` is the earliest
    /// allowed date.
    pub fn parse(&self, today: NaiveDate) -> std::result::Result<SessionRequest, FieldErrors> {
        let mut errors = FieldErrors::from_validator(self.validate());
        errors.require("subject", &self.subject);
        errors.require("scheduled_date", &self.scheduled_date);
        errors.require("scheduled_time", &self.scheduled_time);

        let subject = self.subject.trim().to_string();

        let scheduled_date = if errors.has("scheduled_date") {
            None
        } else {
            match NaiveDate::parse_from_str(self.scheduled_date.trim(), "%Y-%m-%d") {
                Ok(date) if date < today => {
                    errors.push("scheduled_date", "The date must be today or in the future.");
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.push("scheduled_date", "Enter a valid date.");
                    None
                }
            }
        };

        let scheduled_time = if errors.has("scheduled_time") {
            None
        } else {
            let time = parse_time(self.scheduled_time.trim());
            if time.is_none() {
                errors.push("scheduled_time", "Enter a valid time.");
            }
            time
        };

        let duration = match self.duration {
            None => Some(SessionDuration::default()),
            Some(minutes) => match SessionDuration::try_from(minutes) {
                Ok(d) => Some(d),
                Err(_) => {
                    errors.push(
                        "duration",
                        format!("Select a valid choice. {} is not one of the available choices.", minutes),
                    );
                    None
                }
            },
        };

        match (scheduled_date, scheduled_time, duration) {
            (Some(scheduled_date), Some(scheduled_time), Some(duration)) if errors.is_empty() => {
                Ok(SessionRequest {
                    subject,
                    scheduled_date,
                    scheduled_time,
                    duration,
                    notes: non_blank(self.notes.as_deref()),
                })
            }
            _ => Err(errors),
        }
    }
}

/// Tutor's confirmation form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmInput {
    /// Unknown or missing values fall back to the configured default
    pub meeting_platform: Option<String>,
    /// Replaces the session notes when present; blank clears them
    pub notes: Option<String>,
}

/// Session detail with its timing relative to the viewer's clock.
#[derive(Debug, Serialize)]
pub struct SessionDetail {
    #[serde(flatten)]
    pub session: ClassSession,
    pub is_upcoming: bool,
    pub is_past: bool,
}

/// Meeting room view for one participant.
#[derive(Debug, Serialize)]
pub struct MeetingRoom {
    pub session: ClassSession,
    pub is_host: bool,
}

/// Booking operations on behalf of a principal.
pub struct BookingService<'a> {
    db: &'a Database,
    meetings: &'a MeetingService,
    default_platform: MeetingPlatform,
}

impl<'a> BookingService<'a> {
    pub fn new(
        db: &'a Database,
        meetings: &'a MeetingService,
        default_platform: MeetingPlatform,
    ) -> Self {
        Self {
            db,
            meetings,
            default_platform,
        }
    }

    async fn load(&self, session_id: i64) -> Result<ClassSession> {
        self.db
            .get_session(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {}", session_id)))
    }

    /// Session owned by this tutor, or not found.
    async fn load_for_tutor(&self, session_id: i64, tutor_id: i64) -> Result<ClassSession> {
        match self.db.get_session(session_id).await? {
            Some(session) if session.tutor_id == tutor_id => Ok(session),
            _ => Err(AppError::NotFound(format!("Session {}", session_id))),
        }
    }

    /// Client asks a tutor for a session. Stored as `pending`.
    pub async fn request_session(
        &self,
        principal: &Principal,
        tutor_id: i64,
        input: &SessionRequestInput,
        today: NaiveDate,
    ) -> Result<ClassSession> {
        if !principal.is_client() {
            return Err(AppError::denied(
                "Only clients can request sessions.",
                Destination::Dashboard,
            ));
        }

        let tutor = self
            .db
            .get_active_tutor(tutor_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Tutor {}", tutor_id)))?;

        let request = input.parse(today)?;
        let session = self
            .db
            .insert_session(&NewSession {
                tutor_id: tutor.id,
                client_id: principal.id(),
                subject: request.subject,
                scheduled_date: request.scheduled_date,
                scheduled_time: request.scheduled_time,
                duration: request.duration,
                meeting_platform: self.default_platform,
                notes: request.notes,
            })
            .await?;

        tracing::info!(
            session_id = session.id,
            tutor_id = tutor.id,
            client_id = principal.id(),
            scheduled_date = %session.scheduled_date,
            "Session requested"
        );

        Ok(session.for_viewer(principal.id()))
    }

    /// Session detail for one of its participants, as of local time `now`.
    pub async fn session_detail(
        &self,
        principal: &Principal,
        session_id: i64,
        now: NaiveDateTime,
    ) -> Result<SessionDetail> {
        let session = self.load(session_id).await?;
        if !session.is_participant(principal.id()) {
            return Err(AppError::denied(
                "You do not have permission to view this session.",
                Destination::Dashboard,
            ));
        }
        Ok(SessionDetail {
            is_upcoming: session.is_upcoming(now),
            is_past: session.is_past(now),
            session: session.for_viewer(principal.id()),
        })
    }

    /// `pending -> confirmed`, generating the meeting link.
    pub async fn confirm_session(
        &self,
        principal: &Principal,
        session_id: i64,
        input: &ConfirmInput,
    ) -> Result<ClassSession> {
        if !principal.is_tutor() {
            return Err(AppError::denied(
                "Only tutors can confirm sessions.",
                Destination::Dashboard,
            ));
        }

        let session = self.load_for_tutor(session_id, principal.id()).await?;
        if !session.status.can_transition_to(SessionStatus::Confirmed) {
            return Err(AppError::conflict(
                ALREADY_PROCESSED,
                Destination::TutorDashboard,
            ));
        }

        let platform = MeetingPlatform::from_selector(
            input.meeting_platform.as_deref(),
            self.default_platform,
        );
        let notes = match input.notes.as_deref() {
            Some(notes) => non_blank(Some(notes)),
            None => session.notes.clone(),
        };
        let meeting = self.meetings.assign(
            platform,
            &MeetingContext {
                session_id,
                topic: session.meeting_topic(),
            },
        )?;

        let confirmed = self
            .db
            .confirm_session(session_id, principal.id(), platform, notes.as_deref(), &meeting)
            .await?;
        if !confirmed {
            tracing::info!(session_id, "Confirm lost race with another transition");
            return Err(AppError::conflict(
                ALREADY_PROCESSED,
                Destination::TutorDashboard,
            ));
        }

        tracing::info!(
            session_id,
            tutor_id = principal.id(),
            platform = platform.display_name(),
            "Session confirmed"
        );

        self.load(session_id).await
    }

    /// Either participant cancels a pending or confirmed session.
    pub async fn cancel_session(
        &self,
        principal: &Principal,
        session_id: i64,
    ) -> Result<ClassSession> {
        let session = self.load(session_id).await?;
        if !session.is_participant(principal.id()) {
            return Err(AppError::denied(
                "You do not have permission to cancel this session.",
                Destination::Dashboard,
            ));
        }
        if !session.status.can_transition_to(SessionStatus::Cancelled) {
            return Err(cancel_conflict(session.status));
        }

        let cancelled = self
            .db
            .transition_session(
                session_id,
                &SessionStatus::sources(SessionStatus::Cancelled),
                SessionStatus::Cancelled,
            )
            .await?;
        let session = self.load(session_id).await?;
        if !cancelled {
            tracing::info!(session_id, "Cancel lost race with another transition");
            return Err(cancel_conflict(session.status));
        }

        tracing::info!(session_id, user_id = principal.id(), "Session cancelled");
        Ok(session.for_viewer(principal.id()))
    }

    /// The session's tutor marks a confirmed session as held.
    pub async fn complete_session(
        &self,
        principal: &Principal,
        session_id: i64,
    ) -> Result<ClassSession> {
        if !principal.is_tutor() {
            return Err(AppError::denied(
                "Only tutors can complete sessions.",
                Destination::Dashboard,
            ));
        }

        let session = self.load_for_tutor(session_id, principal.id()).await?;
        let conflict = || {
            AppError::conflict(
                "Only confirmed sessions can be marked as completed.",
                Destination::TutorDashboard,
            )
        };
        if !session.status.can_transition_to(SessionStatus::Completed) {
            return Err(conflict());
        }

        let completed = self
            .db
            .transition_session(
                session_id,
                &SessionStatus::sources(SessionStatus::Completed),
                SessionStatus::Completed,
            )
            .await?;
        if !completed {
            return Err(conflict());
        }

        tracing::info!(session_id, tutor_id = principal.id(), "Session completed");
        self.load(session_id).await
    }

    /// Meeting room for a confirmed session. The tutor's first visit
    /// marks the meeting as started.
    pub async fn open_meeting_room(
        &self,
        principal: &Principal,
        session_id: i64,
    ) -> Result<MeetingRoom> {
        let mut session = self.load(session_id).await?;
        if !session.is_participant(principal.id()) {
            return Err(AppError::denied(
                "You do not have permission to access this meeting.",
                Destination::Dashboard,
            ));
        }
        if session.status != SessionStatus::Confirmed {
            return Err(AppError::conflict(NOT_CONFIRMED, Destination::Dashboard));
        }

        let is_host = session.is_host(principal.id());
        if is_host && !session.meeting_started {
            if self.db.mark_meeting_started(session_id).await? {
                tracing::info!(session_id, tutor_id = principal.id(), "Meeting started");
            }
            session = self.load(session_id).await?;
        }

        Ok(MeetingRoom {
            session: session.for_viewer(principal.id()),
            is_host,
        })
    }
}

/// Soft failure for a cancel that found the session in `status`.
fn cancel_conflict(status: SessionStatus) -> AppError {
    let notice = match status {
        SessionStatus::Cancelled => ALREADY_CANCELLED,
        SessionStatus::Completed => CANNOT_CANCEL_COMPLETED,
        SessionStatus::Pending | SessionStatus::Confirmed => ALREADY_PROCESSED,
    };
    AppError::conflict(notice, Destination::Dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::REQUIRED;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn input() -> SessionRequestInput {
        SessionRequestInput {
            subject: "Algebra".to_string(),
            scheduled_date: "2026-03-11".to_string(),
            scheduled_time: "14:30".to_string(),
            duration: None,
            notes: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_parse_valid_request_with_defaults() {
        let request = input().parse(today()).unwrap();
        assert_eq!(request.subject, "Algebra");
        assert_eq!(request.scheduled_time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
        assert_eq!(request.duration, SessionDuration::OneHour);
        assert_eq!(request.notes, None);
    }

    #[test]
    fn test_parse_accepts_today_and_seconds() {
        let request = SessionRequestInput {
            scheduled_date: "2026-03-10".to_string(),
            scheduled_time: "08:00:00".to_string(),
            duration: Some(120),
            ..input()
        }
        .parse(today())
        .unwrap();
        assert_eq!(request.scheduled_date, today());
        assert_eq!(request.duration, SessionDuration::TwoHours);
    }

    #[test]
    fn test_parse_rejects_past_date() {
        let errors = SessionRequestInput {
            scheduled_date: "2026-03-09".to_string(),
            ..input()
        }
        .parse(today())
        .unwrap_err();
        assert!(errors.has("scheduled_date"));
        assert_eq!(errors.iter().count(), 1);
    }

    #[test]
    fn test_parse_collects_every_field_error() {
        let errors = SessionRequestInput {
            subject: "   ".to_string(),
            scheduled_date: "next tuesday".to_string(),
            scheduled_time: "25:00".to_string(),
            duration: Some(45),
            notes: None,
        }
        .parse(today())
        .unwrap_err();

        for field in ["subject", "scheduled_date", "scheduled_time", "duration"] {
            assert!(errors.has(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_parse_missing_fields_are_required() {
        let input: SessionRequestInput =
            serde_json::from_value(serde_json::json!({ "duration": 30 })).unwrap();
        let errors = input.parse(today()).unwrap_err();

        let fields: Vec<(&str, &str)> = errors
            .iter()
            .map(|e| (e.field.as_str(), e.message.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![
                ("subject", REQUIRED),
                ("scheduled_date", REQUIRED),
                ("scheduled_time", REQUIRED),
            ]
        );
    }

    #[test]
    fn test_cancel_conflicts() {
        assert!(matches!(
            cancel_conflict(SessionStatus::Cancelled),
            AppError::Conflict { ref notice, .. } if notice == ALREADY_CANCELLED
        ));
        assert!(matches!(
            cancel_conflict(SessionStatus::Completed),
            AppError::Conflict { ref notice, .. } if notice == CANNOT_CANCEL_COMPLETED
        ));
        assert!(matches!(
            cancel_conflict(SessionStatus::Confirmed),
            AppError::Conflict { ref notice, .. } if notice == ALREADY_PROCESSED
        ));
    }
}
