// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tutor discovery: filtering and geographic prioritization.

use crate::db::Database;
use crate::error::{AppError, Destination, Result};
use crate::models::{Location, Principal, TutorListing};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Search criteria from the tutor list query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TutorFilter {
    /// Case-insensitive substring of name or subjects
    pub search: Option<String>,
    /// Case-insensitive substring of the tutor's city
    pub city: Option<String>,
}

fn normalized(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

impl TutorFilter {
    pub fn search_query(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn city_filter(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Whether a tutor passes both filters. Blank filters match everything.
    ///
    /// A city filter only matches tutors that have a profile.
    pub fn matches(&self, tutor: &TutorListing) -> bool {
        if let Some(needle) = normalized(&self.search) {
            let in_name = tutor.name.to_lowercase().contains(&needle);
            let in_subjects = tutor
                .profile
                .as_ref()
                .is_some_and(|p| p.subjects.to_lowercase().contains(&needle));
            if !in_name && !in_subjects {
                return false;
            }
        }

        if let Some(needle) = normalized(&self.city) {
            let in_city = tutor
                .profile
                .as_ref()
                .is_some_and(|p| p.city.to_lowercase().contains(&needle));
            if !in_city {
                return false;
            }
        }

        true
    }
}

/// Tutors partitioned by proximity to the client.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RankedTutors {
    pub same_city: Vec<TutorListing>,
    pub same_country: Vec<TutorListing>,
    pub other: Vec<TutorListing>,
}

impl RankedTutors {
    /// Same city, then same country, then everyone else.
    pub fn ranked(&self) -> Vec<TutorListing> {
        self.same_city
            .iter()
            .chain(&self.same_country)
            .chain(&self.other)
            .cloned()
            .collect()
    }
}

/// Partition tutors into proximity buckets, keeping input order within each.
///
/// With no client location every tutor is "other". Tutors without a profile
/// are always "other".
pub fn rank_tutors(
    tutors: impl IntoIterator<Item = TutorListing>,
    client: Option<&Location>,
) -> RankedTutors {
    let mut ranked = RankedTutors::default();

    // A blank client city or country never matches anything
    let city = client.map(|l| l.city.trim()).filter(|c| !c.is_empty());
    let country = client.map(|l| l.country.trim()).filter(|c| !c.is_empty());

    for tutor in tutors {
        let bucket = match tutor.profile.as_ref() {
            Some(p) if city == Some(p.city.as_str()) => &mut ranked.same_city,
            Some(p) if country == Some(p.country.as_str()) => &mut ranked.same_country,
            _ => &mut ranked.other,
        };
        bucket.push(tutor);
    }

    ranked
}

/// Tutor list response for a client.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TutorSearchResult {
    pub tutors: Vec<TutorListing>,
    pub same_city_tutors: Vec<TutorListing>,
    pub same_country_tutors: Vec<TutorListing>,
    pub other_tutors: Vec<TutorListing>,
    pub client_city: Option<String>,
    pub client_country: Option<String>,
    pub search_query: Option<String>,
    pub city_filter: Option<String>,
}

/// Active tutors matching `filter`, ranked for the requesting client.
pub async fn find_tutors(
    db: &Database,
    principal: &Principal,
    filter: &TutorFilter,
) -> Result<TutorSearchResult> {
    if !principal.is_client() {
        return Err(AppError::denied(
            "Only clients can browse tutors.",
            Destination::Dashboard,
        ));
    }

    let location = principal.client_location();
    let candidates = db
        .list_active_tutors()
        .await?
        .into_iter()
        .filter(|t| filter.matches(t));
    let ranked = rank_tutors(candidates, location.as_ref());

    tracing::debug!(
        user_id = principal.id(),
        same_city = ranked.same_city.len(),
        same_country = ranked.same_country.len(),
        other = ranked.other.len(),
        "Ranked tutors"
    );

    Ok(TutorSearchResult {
        tutors: ranked.ranked(),
        client_city: location.as_ref().map(|l| l.city.clone()),
        client_country: location.map(|l| l.country),
        search_query: filter.search_query().map(str::to_string),
        city_filter: filter.city_filter().map(str::to_string),
        same_city_tutors: ranked.same_city,
        same_country_tutors: ranked.same_country,
        other_tutors: ranked.other,
    })
}

/// An active tutor, for the session request form.
pub async fn tutor_detail(
    db: &Database,
    principal: &Principal,
    tutor_id: i64,
) -> Result<TutorListing> {
    if !principal.is_client() {
        return Err(AppError::denied(
            "Only clients can request sessions.",
            Destination::Dashboard,
        ));
    }

    let tutor = db
        .get_active_tutor(tutor_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Tutor {}", tutor_id)))?;
    let profile = db.get_tutor_profile(tutor.id).await?;
    Ok(TutorListing::new(tutor, profile))
}
