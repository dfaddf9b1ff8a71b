// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User accounts and their role-specific profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Default city for new profiles.
pub const DEFAULT_CITY: &str = "Quito";
/// Default country for new profiles.
pub const DEFAULT_COUNTRY: &str = "Ecuador";

/// Account role; decides which profile a user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum UserType {
    Tutor,
    Client,
}

impl UserType {
    pub fn as_str(self) -> &'static str {
        match self {
            UserType::Tutor => "tutor",
            UserType::Client => "client",
        }
    }
}

/// Stored user account. Email is the login identity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub user_type: UserType,
    #[serde(skip)]
    #[cfg_attr(feature = "binding-generation", ts(skip))]
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
}

/// Tutor profile, owned 1:1 by a tutor.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TutorProfile {
    pub user_id: i64,
    /// Free text, usually comma separated
    pub subjects: String,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

/// Client (student) profile, owned 1:1 by a client.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClientProfile {
    pub user_id: i64,
    pub is_minor: bool,
    /// Parent or legal guardian, collected for minors
    pub parent_name: Option<String>,
    pub city: String,
    pub country: String,
    pub created_at: DateTime<Utc>,
}

/// The profile a user owns, matching their [`UserType`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Profile {
    Tutor(TutorProfile),
    Client(ClientProfile),
}

impl Profile {
    pub fn location(&self) -> Location {
        match self {
            Profile::Tutor(p) => Location::new(&p.city, &p.country),
            Profile::Client(p) => Location::new(&p.city, &p.country),
        }
    }
}

/// City and country pair used for tutor prioritization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Location {
    pub fn new(city: &str, country: &str) -> Self {
        Self {
            city: city.to_string(),
            country: country.to_string(),
        }
    }
}

/// An active tutor as shown in discovery. The profile may be missing.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TutorListing {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile: Option<TutorProfile>,
}

impl TutorListing {
    pub fn new(user: User, profile: Option<TutorProfile>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            profile,
        }
    }
}

/// Fields for a new account row (password already hashed).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewTutorProfile {
    pub subjects: String,
    pub bio: Option<String>,
    pub experience: Option<String>,
    pub city: String,
    pub country: String,
}

#[derive(Debug, Clone)]
pub struct NewClientProfile {
    pub is_minor: bool,
    pub parent_name: Option<String>,
    pub city: String,
    pub country: String,
}

/// The authenticated user for the current request.
///
/// Built once per request by the auth extractor and passed explicitly into
/// every operation that needs to know who is acting.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user: User,
    /// Absent when the profile row is missing
    pub profile: Option<Profile>,
}

impl Principal {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn is_tutor(&self) -> bool {
        self.user.user_type == UserType::Tutor
    }

    pub fn is_client(&self) -> bool {
        self.user.user_type == UserType::Client
    }

    /// Location of a client, or `None` for tutors and clients without a profile.
    pub fn client_location(&self) -> Option<Location> {
        match &self.profile {
            Some(profile @ Profile::Client(_)) => Some(profile.location()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_type: UserType) -> User {
        User {
            id: 7,
            email: "ana@example.com".to_string(),
            name: "Ana Torres".to_string(),
            user_type,
            password_hash: "x".to_string(),
            is_active: true,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(user(UserType::Tutor)).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["user_type"], "tutor");
    }

    #[test]
    fn test_client_location_requires_client_profile() {
        let client = Principal {
            user: user(UserType::Client),
            profile: Some(Profile::Client(ClientProfile {
                user_id: 7,
                is_minor: false,
                parent_name: None,
                city: "Cuenca".to_string(),
                country: "Ecuador".to_string(),
                created_at: Utc::now(),
            })),
        };
        assert_eq!(
            client.client_location(),
            Some(Location::new("Cuenca", "Ecuador"))
        );

        let without_profile = Principal {
            user: user(UserType::Client),
            profile: None,
        };
        assert_eq!(without_profile.client_location(), None);
    }
}
