// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! TutorHub: a tutoring marketplace backend
//!
//! This crate provides the HTTP API for tutor and client accounts, tutor
//! discovery ranked by location, and the session booking lifecycle with
//! generated meeting links.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;
pub mod validation;

use config::Config;
use db::Database;
use services::{BookingService, MeetingService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub meetings: MeetingService,
}

impl AppState {
    pub fn new(config: Config, db: Database) -> Self {
        let meetings = MeetingService::new(&config.custom_meeting_base_url);
        Self {
            config,
            db,
            meetings,
        }
    }

    /// Booking operations bound to this state.
    pub fn booking(&self) -> BookingService<'_> {
        BookingService::new(
            &self.db,
            &self.meetings,
            self.config.default_meeting_platform,
        )
    }
}
