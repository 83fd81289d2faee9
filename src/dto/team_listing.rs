use serde::{Deserialize, Serialize};

use crate::entity::{players, teams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamListing {
    #[serde(flatten)]
    pub team: teams::Model,
    pub player_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamDetail {
    #[serde(flatten)]
    pub team: teams::Model,
    pub players: Vec<players::Model>,
}
