//! Review entity - player-authored rating of a game, map version, or mod version

use serde::{Deserialize, Serialize};

use crate::{DomainError, PlayerRef, ReviewId};

/// Lowest star rating a review may carry.
pub const MIN_REVIEW_SCORE: u8 = 1;
/// Highest star rating a review may carry.
pub const MAX_REVIEW_SCORE: u8 = 5;

/// A review written by a player.
///
/// Created locally without an `id`; the server assigns one when the review is
/// first saved. A review with an `id` is an update of an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Option<ReviewId>,
    pub text: String,
    pub score: u8,
    pub reviewer: Option<PlayerRef>,
}

impl Review {
    pub fn new(text: impl Into<String>, score: u8) -> Self {
        Self {
            id: None,
            text: text.into(),
            score,
            reviewer: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<ReviewId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_reviewer(mut self, reviewer: PlayerRef) -> Self {
        self.reviewer = Some(reviewer);
        self
    }

    /// True until the server has assigned an identifier.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Checks the review can be sent to the server.
    ///
    /// A new review also needs its reviewer; updates keep the one the server
    /// already has.
    pub fn validate_for_submission(&self) -> Result<(), DomainError> {
        if self.text.trim().is_empty() {
            return Err(DomainError::validation("Review text cannot be empty"));
        }
        if !(MIN_REVIEW_SCORE..=MAX_REVIEW_SCORE).contains(&self.score) {
            return Err(DomainError::validation(format!(
                "Review score must be between {} and {}, got {}",
                MIN_REVIEW_SCORE, MAX_REVIEW_SCORE, self.score
            )));
        }
        if self.is_new() && self.reviewer.is_none() {
            return Err(DomainError::validation("A new review needs a reviewer"));
        }
        if let Some(id) = &self.id {
            if id.is_blank() {
                return Err(DomainError::validation("Review id cannot be blank"));
            }
        }
        Ok(())
    }
}
