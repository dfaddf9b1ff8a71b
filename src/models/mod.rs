// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod lead;
pub mod session;
pub mod user;

pub use lead::{NewTutorLead, TutorLead};
pub use session::{
    ClassSession, MeetingDetails, MeetingPlatform, NewSession, SessionDuration, SessionStatus,
};
pub use user::{
    ClientProfile, Location, NewClientProfile, NewTutorProfile, NewUser, Principal, Profile,
    TutorListing, TutorProfile, User, UserType, DEFAULT_CITY, DEFAULT_COUNTRY,
};
