//! Score ingestion module
//!
//! Pure validation of per-hole score batches. Everything here runs before the
//! store is touched, except [`check_against_tournament`], which the store calls
//! inside its write transaction once it holds the tournament row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{courses, tournaments};
use crate::error::AppError;
use crate::league::rules::{is_valid_hole_number, is_valid_strokes, MAX_COURSE_HOLES};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleScore {
    pub hole_number: i32,
    pub strokes: i32,
}

/// A validated batch of hole scores for one player in one tournament.
///
/// Holes are unique and ascending. When the submitted pairs repeat a hole,
/// the later pair wins, the same outcome as writing the pairs one by one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreBatch {
    tournament_id: Uuid,
    player_id: Uuid,
    holes: Vec<HoleScore>,
}

impl ScoreBatch {
    pub fn new(
        tournament_id: Uuid,
        player_id: Uuid,
        scores: &[HoleScore],
    ) -> Result<Self, AppError> {
        if tournament_id.is_nil() {
            return Err(AppError::validation("tournament_id is required"));
        }
        if player_id.is_nil() {
            return Err(AppError::validation("player_id is required"));
        }
        if scores.is_empty() {
            return Err(AppError::validation("scores must contain at least one hole"));
        }

        let mut by_hole = BTreeMap::new();
        for score in scores {
            if !is_valid_hole_number(score.hole_number) {
                return Err(AppError::validation(format!(
                    "hole_number must be a positive integer, got {}",
                    score.hole_number
                )));
            }
            if !is_valid_strokes(score.strokes) {
                return Err(AppError::validation(format!(
                    "strokes for hole {} must be a positive integer, got {}",
                    score.hole_number, score.strokes
                )));
            }
            by_hole.insert(score.hole_number, *score);
        }

        if by_hole.len() > MAX_COURSE_HOLES as usize {
            return Err(AppError::validation(format!(
                "a round has at most {MAX_COURSE_HOLES} holes"
            )));
        }

        Ok(Self {
            tournament_id,
            player_id,
            holes: by_hole.into_values().collect(),
        })
    }

    pub fn tournament_id(&self) -> Uuid {
        self.tournament_id
    }

    pub fn player_id(&self) -> Uuid {
        self.player_id
    }

    pub fn holes(&self) -> &[HoleScore] {
        &self.holes
    }

    pub fn hole_numbers(&self) -> Vec<i32> {
        self.holes.iter().map(|h| h.hole_number).collect()
    }

    /// Highest hole in the batch; holes are kept ascending
    pub fn max_hole(&self) -> i32 {
        self.holes.last().map(|h| h.hole_number).unwrap_or(0)
    }
}

/// Checks that need the stored tournament and its course
pub fn check_against_tournament(
    batch: &ScoreBatch,
    tournament: &tournaments::Model,
    course: &courses::Model,
    allow_completed: bool,
) -> Result<(), AppError> {
    if tournament.completed && !allow_completed {
        return Err(AppError::Conflict(format!(
            "tournament {} is already completed",
            tournament.id
        )));
    }

    if batch.max_hole() > course.holes {
        return Err(AppError::validation(format!(
            "hole_number {} exceeds the {} holes of course {}",
            batch.max_hole(),
            course.holes,
            course.name
        )));
    }

    Ok(())
}
