// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Interest form for prospective tutors.

use crate::db::Database;
use crate::error::Result;
use crate::models::{NewTutorLead, TutorLead};
use crate::validation::FieldErrors;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeadInput {
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 200,
        message = "Please enter your full name (at most 200 characters)."
    ))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 200,
        message = "Please enter the subject you want to teach (at most 200 characters)."
    ))]
    pub subject: String,
}

impl LeadInput {
    fn parse(&self) -> std::result::Result<NewTutorLead, FieldErrors> {
        let mut errors = FieldErrors::from_validator(self.validate());
        let name = self.name.trim();
        let subject = self.subject.trim();
        if name.is_empty() && !errors.has("name") {
            errors.push("name", "Please enter your full name.");
        }
        if subject.is_empty() && !errors.has("subject") {
            errors.push("subject", "Please enter the subject you want to teach.");
        }
        errors.require("email", &self.email);
        errors.into_result(NewTutorLead {
            name: name.to_string(),
            email: self.email.trim().to_string(),
            subject: subject.to_string(),
        })
    }
}

/// Store a lead. Anyone may submit one.
pub async fn submit_lead(db: &Database, input: &LeadInput) -> Result<TutorLead> {
    let lead = db.insert_lead(&input.parse()?).await?;
    tracing::info!(lead_id = lead.id, subject = %lead.subject, "Tutor lead captured");
    Ok(lead)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_validates() {
        let lead = LeadInput {
            name: "  Marta Ruiz ".to_string(),
            email: "marta@example.com".to_string(),
            subject: " Chemistry".to_string(),
        }
        .parse()
        .unwrap();
        assert_eq!(lead.name, "Marta Ruiz");
        assert_eq!(lead.subject, "Chemistry");

        let errors = LeadInput {
            name: " ".to_string(),
            email: "marta".to_string(),
            subject: "x".repeat(201),
        }
        .parse()
        .unwrap_err();
        assert!(errors.has("name"));
        assert!(errors.has("email"));
        assert!(errors.has("subject"));
    }
}
