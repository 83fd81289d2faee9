//! Standings aggregation module
//!
//! Pure projection of a league snapshot into standings rows. Only completed
//! tournaments contribute. Rows come out sorted by entity id so that ranking
//! ties resolve the same way on every run.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{courses, match_results, players, scores, teams, tournaments};
use crate::error::AppError;
use crate::league::rules::{calculate_points, round_to_tenth};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingMode {
    /// The league table. Keyed by team, like `ByTeam`.
    Overall,
    ByTeam,
    ByPlayer,
}

impl FromStr for GroupingMode {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "overall" => Ok(GroupingMode::Overall),
            "team" | "by_team" => Ok(GroupingMode::ByTeam),
            "player" | "by_player" => Ok(GroupingMode::ByPlayer),
            other => Err(AppError::validation(format!(
                "unknown grouping mode '{other}', expected overall, by_team or by_player"
            ))),
        }
    }
}

impl fmt::Display for GroupingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GroupingMode::Overall => "overall",
            GroupingMode::ByTeam => "by_team",
            GroupingMode::ByPlayer => "by_player",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Team,
    Player,
}

/// Derived per-entity summary. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandingsRow {
    pub entity_id: Uuid,
    pub kind: EntityKind,
    pub name: String,
    pub team_id: Option<Uuid>,
    pub played: i32,
    pub wins: i32,
    pub losses: i32,
    pub points: i32,
    /// Mean strokes per completed round; `None` when nothing was played
    pub avg_score: Option<f64>,
}

/// Everything aggregation reads, captured from one consistent store read.
#[derive(Clone, Debug, Default)]
pub struct LeagueSnapshot {
    pub teams: Vec<teams::Model>,
    pub players: Vec<players::Model>,
    pub courses: Vec<courses::Model>,
    pub tournaments: Vec<tournaments::Model>,
    pub scores: Vec<scores::Model>,
    pub match_results: Vec<match_results::Model>,
}

/// Running tally of one player's scores in one tournament
#[derive(Default)]
struct RoundTally {
    holes_scored: i32,
    strokes: i64,
}

/// Completed-tournament data indexed for aggregation
struct CompletedPlay<'a> {
    /// (player, tournament) -> round total, only for rounds covering every hole
    completed_rounds: BTreeMap<(Uuid, Uuid), i64>,
    /// player -> completed tournaments with at least one score
    tournaments_by_player: HashMap<Uuid, HashSet<Uuid>>,
    matches: Vec<&'a match_results::Model>,
}

impl<'a> CompletedPlay<'a> {
    fn index(snapshot: &'a LeagueSnapshot) -> Self {
        let hole_counts: HashMap<Uuid, i32> = snapshot
            .courses
            .iter()
            .map(|course| (course.id, course.holes))
            .collect();

        // tournament -> hole count of its course, completed tournaments only
        let completed: HashMap<Uuid, i32> = snapshot
            .tournaments
            .iter()
            .filter(|t| t.completed)
            .filter_map(|t| hole_counts.get(&t.course_id).map(|holes| (t.id, *holes)))
            .collect();

        let mut tallies: BTreeMap<(Uuid, Uuid), RoundTally> = BTreeMap::new();
        let mut tournaments_by_player: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        for score in &snapshot.scores {
            let Some(holes) = completed.get(&score.tournament_id) else {
                continue;
            };
            tournaments_by_player
                .entry(score.player_id)
                .or_default()
                .insert(score.tournament_id);

            if score.hole_number <= *holes {
                let tally = tallies
                    .entry((score.player_id, score.tournament_id))
                    .or_default();
                tally.holes_scored += 1;
                tally.strokes += i64::from(score.strokes);
            }
        }

        let completed_rounds = tallies
            .into_iter()
            .filter(|((_, tournament_id), tally)| {
                completed.get(tournament_id) == Some(&tally.holes_scored)
            })
            .map(|(key, tally)| (key, tally.strokes))
            .collect();

        let matches = snapshot
            .match_results
            .iter()
            .filter(|m| completed.contains_key(&m.tournament_id))
            .collect();

        Self {
            completed_rounds,
            tournaments_by_player,
            matches,
        }
    }

    fn round_totals_for<'p>(
        &'p self,
        player_ids: &'p HashSet<Uuid>,
    ) -> impl Iterator<Item = i64> + 'p {
        self.completed_rounds
            .iter()
            .filter(move |((player_id, _), _)| player_ids.contains(player_id))
            .map(|(_, total)| *total)
    }
}

/// Mean of round totals rounded to one decimal; `None` with no rounds
pub fn average_round_score(round_totals: impl IntoIterator<Item = i64>) -> Option<f64> {
    let (sum, count) = round_totals
        .into_iter()
        .fold((0i64, 0i64), |(sum, count), total| (sum + total, count + 1));
    if count == 0 {
        None
    } else {
        Some(round_to_tenth(sum as f64 / count as f64))
    }
}

#[allow(clippy::too_many_arguments)]
fn build_row(
    entity_id: Uuid,
    kind: EntityKind,
    name: &str,
    team_id: Option<Uuid>,
    played: i32,
    wins: i32,
    losses: i32,
    avg_score: Option<f64>,
) -> StandingsRow {
    StandingsRow {
        entity_id,
        kind,
        name: name.to_string(),
        team_id,
        played,
        wins,
        losses,
        points: calculate_points(wins, losses),
        // nothing played means no average, whatever else is on record
        avg_score: if played == 0 { None } else { avg_score },
    }
}

fn team_rows(snapshot: &LeagueSnapshot, play: &CompletedPlay<'_>) -> Vec<StandingsRow> {
    snapshot
        .teams
        .iter()
        .map(|team| {
            let wins = play
                .matches
                .iter()
                .filter(|m| m.winner_team_id == team.id)
                .count() as i32;
            let losses = play
                .matches
                .iter()
                .filter(|m| m.loser_team_id == team.id)
                .count() as i32;

            let roster: HashSet<Uuid> = snapshot
                .players
                .iter()
                .filter(|p| p.team_id == team.id)
                .map(|p| p.id)
                .collect();
            let avg_score = average_round_score(play.round_totals_for(&roster));

            build_row(
                team.id,
                EntityKind::Team,
                &team.name,
                None,
                wins + losses,
                wins,
                losses,
                avg_score,
            )
        })
        .collect()
}

fn player_rows(snapshot: &LeagueSnapshot, play: &CompletedPlay<'_>) -> Vec<StandingsRow> {
    let empty = HashSet::new();
    snapshot
        .players
        .iter()
        .map(|player| {
            let entered = play
                .tournaments_by_player
                .get(&player.id)
                .unwrap_or(&empty);

            let team_matches = play
                .matches
                .iter()
                .filter(|m| entered.contains(&m.tournament_id));
            let (wins, losses) = team_matches.fold((0, 0), |(wins, losses), m| {
                if m.winner_team_id == player.team_id {
                    (wins + 1, losses)
                } else if m.loser_team_id == player.team_id {
                    (wins, losses + 1)
                } else {
                    (wins, losses)
                }
            });

            let only_player = HashSet::from([player.id]);
            let avg_score = average_round_score(play.round_totals_for(&only_player));

            build_row(
                player.id,
                EntityKind::Player,
                &player.name,
                Some(player.team_id),
                entered.len() as i32,
                wins,
                losses,
                avg_score,
            )
        })
        .collect()
}

/// Compute one standings row per registered entity of the grouping
pub fn compute_standings(snapshot: &LeagueSnapshot, mode: GroupingMode) -> Vec<StandingsRow> {
    let play = CompletedPlay::index(snapshot);

    let mut rows = match mode {
        GroupingMode::Overall | GroupingMode::ByTeam => team_rows(snapshot, &play),
        GroupingMode::ByPlayer => player_rows(snapshot, &play),
    };
    rows.sort_by_key(|row| row.entity_id);
    rows
}
