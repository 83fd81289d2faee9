use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::courses::Difficulty;
use crate::league::ingestion::HoleScore;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRequest {
    pub name: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRequest {
    pub name: String,
    pub location: Option<String>,
    pub par: i32,
    pub holes: i32,
    pub difficulty: Option<Difficulty>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TournamentRequest {
    pub name: String,
    pub course_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MatchResultRequest {
    pub winner_team_id: Uuid,
    pub loser_team_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub tournament_id: Uuid,
    pub player_id: Uuid,
    pub scores: Vec<HoleScore>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentFilter {
    #[default]
    All,
    /// Not completed, soonest first
    Upcoming,
    /// Completed, most recent first
    Past,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TournamentQuery {
    #[serde(default)]
    pub filter: TournamentFilter,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoresQuery {
    pub tournament_id: Uuid,
    pub player_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StandingsQuery {
    pub filter_type: Option<String>,
    pub sort: Option<String>,
    pub direction: Option<String>,
}
