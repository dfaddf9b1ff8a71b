// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SQLite store with typed operations.
//!
//! Provides high-level operations for:
//! - Users and their tutor/client profiles
//! - Class sessions (including the guarded status transitions)
//! - Tutor leads

use crate::error::AppError;
use crate::models::{
    ClassSession, ClientProfile, MeetingDetails, MeetingPlatform, NewClientProfile, NewSession,
    NewTutorLead, NewTutorProfile, NewUser, Principal, Profile, SessionStatus, TutorLead,
    TutorListing, TutorProfile, User, UserType,
};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;

const MAX_CONNECTIONS: u32 = 5;

const SESSION_SELECT: &str = "\
    SELECT s.id, s.tutor_id, t.name AS tutor_name, s.client_id, c.name AS client_name, \
           s.subject, s.scheduled_date, s.scheduled_time, s.duration, s.status, \
           s.meeting_platform, s.meeting_url, s.meeting_id, s.meeting_password, \
           s.host_join_url, s.meeting_started, s.notes, s.created_at, s.updated_at \
    FROM class_sessions s \
    JOIN users t ON t.id = s.tutor_id \
    JOIN users c ON c.id = s.client_id";

const USER_COLUMNS: &str = "id, email, name, user_type, password_hash, is_active, date_joined";

/// Which side of a session a listing is for.
#[derive(Debug, Clone, Copy)]
pub enum Party {
    Tutor(i64),
    Client(i64),
}

/// Session listing criteria.
#[derive(Debug, Clone)]
pub struct SessionQuery<'a> {
    pub party: Party,
    pub statuses: &'a [SessionStatus],
    /// Only sessions scheduled on or after this date
    pub from_date: Option<NaiveDate>,
    /// Sort by schedule descending instead of ascending
    pub newest_first: bool,
    pub limit: Option<u32>,
}

impl<'a> SessionQuery<'a> {
    pub fn new(party: Party, statuses: &'a [SessionStatus]) -> Self {
        Self {
            party,
            statuses,
            from_date: None,
            newest_first: false,
            limit: None,
        }
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Tutor joined with an optional profile (LEFT JOIN).
#[derive(sqlx::FromRow)]
struct TutorRow {
    #[sqlx(flatten)]
    user: User,
    profile_user_id: Option<i64>,
    subjects: Option<String>,
    bio: Option<String>,
    experience: Option<String>,
    city: Option<String>,
    country: Option<String>,
    profile_created_at: Option<DateTime<Utc>>,
}

impl TutorRow {
    fn into_listing(self) -> TutorListing {
        let profile = match (
            self.profile_user_id,
            self.subjects,
            self.city,
            self.country,
            self.profile_created_at,
        ) {
            (Some(user_id), Some(subjects), Some(city), Some(country), Some(created_at)) => {
                Some(TutorProfile {
                    user_id,
                    subjects,
                    bio: self.bio,
                    experience: self.experience,
                    city,
                    country,
                    created_at,
                })
            }
            _ => None,
        };
        TutorListing::new(self.user, profile)
    }
}

/// SQLite database client.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect and apply pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` is its own database, so keep exactly one alive
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(MAX_CONNECTIONS)
        };

        let pool = pool_options.connect_with(options).await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Database(format!("Migration failed: {}", e)))?;

        tracing::info!(in_memory, "Connected to database");

        Ok(Self { pool })
    }

    /// Fresh, migrated in-memory database (tests, local experiments).
    pub async fn in_memory() -> Result<Self, AppError> {
        Self::connect("sqlite::memory:").await
    }

    /// Cheap connectivity check for health probes.
    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Look up a user by login email (case-insensitive).
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = ? COLLATE NOCASE");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        Ok(self.get_user_by_email(email).await?.is_some())
    }

    /// Active tutor by id, or `None` if the id is not an active tutor.
    pub async fn get_active_tutor(&self, user_id: i64) -> Result<Option<User>, AppError> {
        Ok(self
            .get_user(user_id)
            .await?
            .filter(|u| u.user_type == UserType::Tutor && u.is_active))
    }

    /// Create a tutor account and its profile in one transaction.
    pub async fn create_tutor(
        &self,
        user: &NewUser,
        profile: &NewTutorProfile,
    ) -> Result<User, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let user_id = insert_user(&mut tx, user, UserType::Tutor, now).await?;
        sqlx::query(
            "INSERT INTO tutor_profiles \
             (user_id, subjects, bio, experience, city, country, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&profile.subjects)
        .bind(&profile.bio)
        .bind(&profile.experience)
        .bind(&profile.city)
        .bind(&profile.country)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(user_id, "Created tutor account");

        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Database(format!("User {} vanished after insert", user_id)))
    }

    /// Create a client account and its profile in one transaction.
    pub async fn create_client(
        &self,
        user: &NewUser,
        profile: &NewClientProfile,
    ) -> Result<User, AppError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let user_id = insert_user(&mut tx, user, UserType::Client, now).await?;
        sqlx::query(
            "INSERT INTO client_profiles \
             (user_id, is_minor, parent_name, city, country, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(profile.is_minor)
        .bind(&profile.parent_name)
        .bind(&profile.city)
        .bind(&profile.country)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        tracing::info!(user_id, "Created client account");

        self.get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Database(format!("User {} vanished after insert", user_id)))
    }

    pub async fn set_user_active(&self, user_id: i64, active: bool) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE users SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    // ─── Profile Operations ──────────────────────────────────────

    pub async fn get_tutor_profile(&self, user_id: i64) -> Result<Option<TutorProfile>, AppError> {
        Ok(sqlx::query_as::<_, TutorProfile>(
            "SELECT user_id, subjects, bio, experience, city, country, created_at \
             FROM tutor_profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    pub async fn get_client_profile(
        &self,
        user_id: i64,
    ) -> Result<Option<ClientProfile>, AppError> {
        Ok(sqlx::query_as::<_, ClientProfile>(
            "SELECT user_id, is_minor, parent_name, city, country, created_at \
             FROM client_profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// The profile matching the user's type, if it exists.
    pub async fn get_profile(&self, user: &User) -> Result<Option<Profile>, AppError> {
        Ok(match user.user_type {
            UserType::Tutor => self.get_tutor_profile(user.id).await?.map(Profile::Tutor),
            UserType::Client => self.get_client_profile(user.id).await?.map(Profile::Client),
        })
    }

    /// Load the acting user. Inactive or unknown users yield `None`.
    pub async fn load_principal(&self, user_id: i64) -> Result<Option<Principal>, AppError> {
        let Some(user) = self.get_user(user_id).await?.filter(|u| u.is_active) else {
            return Ok(None);
        };
        let profile = self.get_profile(&user).await?;
        Ok(Some(Principal { user, profile }))
    }

    /// All active tutors with their profiles, in id order.
    pub async fn list_active_tutors(&self) -> Result<Vec<TutorListing>, AppError> {
        let rows = sqlx::query_as::<_, TutorRow>(
            "SELECT u.id, u.email, u.name, u.user_type, u.password_hash, u.is_active, \
                    u.date_joined, p.user_id AS profile_user_id, p.subjects, p.bio, \
                    p.experience, p.city, p.country, p.created_at AS profile_created_at \
             FROM users u \
             LEFT JOIN tutor_profiles p ON p.user_id = u.id \
             WHERE u.user_type = 'tutor' AND u.is_active = 1 \
             ORDER BY u.id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(TutorRow::into_listing).collect())
    }

    // ─── Session Operations ──────────────────────────────────────

    /// Store a new session request in `pending`.
    pub async fn insert_session(&self, session: &NewSession) -> Result<ClassSession, AppError> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO class_sessions \
             (tutor_id, client_id, subject, scheduled_date, scheduled_time, duration, status, \
              meeting_platform, meeting_started, notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?)",
        )
        .bind(session.tutor_id)
        .bind(session.client_id)
        .bind(&session.subject)
        .bind(session.scheduled_date)
        .bind(session.scheduled_time)
        .bind(session.duration)
        .bind(SessionStatus::Pending)
        .bind(session.meeting_platform)
        .bind(&session.notes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        self.get_session(id)
            .await?
            .ok_or_else(|| AppError::Database(format!("Session {} vanished after insert", id)))
    }

    pub async fn get_session(&self, session_id: i64) -> Result<Option<ClassSession>, AppError> {
        let sql = format!("{SESSION_SELECT} WHERE s.id = ?");
        Ok(sqlx::query_as::<_, ClassSession>(&sql)
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Sessions for one party, filtered by status and ordered by schedule.
    pub async fn list_sessions(
        &self,
        query: &SessionQuery<'_>,
    ) -> Result<Vec<ClassSession>, AppError> {
        let mut builder: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SESSION_SELECT);

        match query.party {
            Party::Tutor(id) => builder.push(" WHERE s.tutor_id = ").push_bind(id),
            Party::Client(id) => builder.push(" WHERE s.client_id = ").push_bind(id),
        };

        if !query.statuses.is_empty() {
            builder.push(" AND s.status IN (");
            let mut statuses = builder.separated(", ");
            for status in query.statuses {
                statuses.push_bind(*status);
            }
            statuses.push_unseparated(")");
        }

        if let Some(date) = query.from_date {
            builder.push(" AND s.scheduled_date >= ").push_bind(date);
        }

        if query.newest_first {
            builder.push(" ORDER BY s.scheduled_date DESC, s.scheduled_time DESC, s.id DESC");
        } else {
            builder.push(" ORDER BY s.scheduled_date ASC, s.scheduled_time ASC, s.id ASC");
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(i64::from(limit));
        }

        Ok(builder
            .build_query_as::<ClassSession>()
            .fetch_all(&self.pool)
            .await?)
    }

    /// `pending -> confirmed` with meeting details, as one compare-and-set.
    ///
    /// Returns `false` if the session was not pending (or not this tutor's)
    /// when the write happened; nothing is modified in that case.
    pub async fn confirm_session(
        &self,
        session_id: i64,
        tutor_id: i64,
        platform: MeetingPlatform,
        notes: Option<&str>,
        meeting: &MeetingDetails,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE class_sessions \
             SET status = ?, meeting_platform = ?, notes = ?, meeting_url = ?, meeting_id = ?, \
                 meeting_password = ?, host_join_url = ?, updated_at = ? \
             WHERE id = ? AND tutor_id = ? AND status = ?",
        )
        .bind(SessionStatus::Confirmed)
        .bind(platform)
        .bind(notes)
        .bind(&meeting.meeting_url)
        .bind(&meeting.meeting_id)
        .bind(&meeting.meeting_password)
        .bind(&meeting.host_join_url)
        .bind(Utc::now())
        .bind(session_id)
        .bind(tutor_id)
        .bind(SessionStatus::Pending)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Move a session to `to` if its current status is one of `from`.
    ///
    /// Status check and write happen in a single statement, so two racing
    /// callers cannot both observe the old status and succeed.
    pub async fn transition_session(
        &self,
        session_id: i64,
        from: &[SessionStatus],
        to: SessionStatus,
    ) -> Result<bool, AppError> {
        if from.is_empty() {
            return Ok(false);
        }

        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE class_sessions SET status = ");
        builder
            .push_bind(to)
            .push(", updated_at = ")
            .push_bind(Utc::now())
            .push(" WHERE id = ")
            .push_bind(session_id)
            .push(" AND status IN (");
        let mut statuses = builder.separated(", ");
        for status in from {
            statuses.push_bind(*status);
        }
        statuses.push_unseparated(")");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.rows_affected() == 1)
    }

    /// Latch `meeting_started`. Returns `true` only for the call that flipped it.
    pub async fn mark_meeting_started(&self, session_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE class_sessions SET meeting_started = 1, updated_at = ? \
             WHERE id = ? AND meeting_started = 0",
        )
        .bind(Utc::now())
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    // ─── Lead Operations ─────────────────────────────────────────

    pub async fn insert_lead(&self, lead: &NewTutorLead) -> Result<TutorLead, AppError> {
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO tutor_leads (name, email, subject, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.subject)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(TutorLead {
            id,
            name: lead.name.clone(),
            email: lead.email.clone(),
            subject: lead.subject.clone(),
            created_at: now,
        })
    }

    /// Leads, newest first.
    pub async fn list_leads(&self) -> Result<Vec<TutorLead>, AppError> {
        Ok(sqlx::query_as::<_, TutorLead>(
            "SELECT id, name, email, subject, created_at FROM tutor_leads \
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?)
    }
}

/// Insert the account row, turning a duplicate email into a field error.
async fn insert_user(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    user: &NewUser,
    user_type: UserType,
    now: DateTime<Utc>,
) -> Result<i64, AppError> {
    let result = sqlx::query(
        "INSERT INTO users (email, name, user_type, password_hash, is_active, date_joined) \
         VALUES (?, ?, ?, ?, 1, ?)",
    )
    .bind(&user.email)
    .bind(&user.name)
    .bind(user_type)
    .bind(&user.password_hash)
    .bind(now)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(done) => Ok(done.last_insert_rowid()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            AppError::invalid_field("email", "A user with that email already exists."),
        ),
        Err(e) => Err(e.into()),
    }
}
