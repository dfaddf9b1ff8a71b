// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod booking;
pub mod leads;
pub mod meeting;
pub mod password;
pub mod ranking;

pub use booking::{
    BookingService, ConfirmInput, MeetingRoom, SessionDetail, SessionRequestInput,
};
pub use meeting::{MeetingContext, MeetingError, MeetingProvider, MeetingService};
pub use ranking::{rank_tutors, RankedTutors, TutorFilter};
