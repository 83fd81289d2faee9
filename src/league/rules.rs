//! League rules module
//!
//! This module contains the fixed league rules (points scale, course and
//! naming limits) and the pure validation helpers built on them.

use crate::error::AppError;

/// Points awarded for a match win
pub const POINTS_PER_WIN: i32 = 3;

/// Points awarded for a match loss
pub const POINTS_PER_LOSS: i32 = 0;

/// Largest course the league supports, in holes
pub const MAX_COURSE_HOLES: i32 = 36;

/// Longest accepted team, player, course or tournament name
pub const MAX_NAME_LEN: usize = 100;

/// Calculate league points from a win/loss record
///
/// Points calculation:
/// - 3 points per win
/// - 0 points per loss
///
/// No draws exist, so every match contributes to exactly one side of the record.
pub fn calculate_points(wins: i32, losses: i32) -> i32 {
    wins * POINTS_PER_WIN + losses * POINTS_PER_LOSS
}

/// Round a statistic to one decimal place
pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn is_valid_hole_number(hole_number: i32) -> bool {
    hole_number > 0
}

pub fn is_valid_strokes(strokes: i32) -> bool {
    strokes > 0
}

pub fn is_valid_hole_count(holes: i32) -> bool {
    (1..=MAX_COURSE_HOLES).contains(&holes)
}

/// Trim a display name and check it is non-empty and within `MAX_NAME_LEN`
pub fn normalize_name(field: &str, raw: &str) -> Result<String, AppError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

/// Treat blank optional strings as absent
pub fn normalize_optional(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
