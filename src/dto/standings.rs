use serde::{Deserialize, Serialize};

use crate::entity::tournaments;
use crate::league::aggregation::GroupingMode;
use crate::league::ranking::{RankedRow, SortState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsResponse {
    pub grouping: GroupingMode,
    pub sort: SortState,
    pub rows: Vec<RankedRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueOverview {
    pub upcoming_tournament: Option<tournaments::Model>,
    pub top_teams: Vec<RankedRow>,
}
