//! Standings ranking module
//!
//! Orders standings rows for presentation. Sorting is stable, so rows with
//! equal keys keep the order aggregation produced them in (entity id order).

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::league::aggregation::StandingsRow;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Played,
    Wins,
    Losses,
    Points,
    AvgScore,
    Name,
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "played" => Ok(SortField::Played),
            "wins" => Ok(SortField::Wins),
            "losses" => Ok(SortField::Losses),
            "points" => Ok(SortField::Points),
            "avg_score" => Ok(SortField::AvgScore),
            "name" | "team" => Ok(SortField::Name),
            other => Err(AppError::validation(format!("unknown sort field '{other}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::validation(format!(
                "unknown sort direction '{other}', expected asc or desc"
            ))),
        }
    }
}

/// Column-header sort state of a standings table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: SortField::Points,
            direction: SortDirection::Desc,
        }
    }
}

impl SortState {
    /// Selecting the current field flips the direction; a new field starts descending
    pub fn select(self, field: SortField) -> Self {
        if field == self.field {
            Self {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Desc,
            }
        }
    }
}

/// How equal sort keys are numbered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPolicy {
    /// 1, 2, 3, 4: ties get consecutive distinct ranks
    #[default]
    Positional,
    /// 1, 2, 2, 4: ties share the rank of the first row in the tie
    Shared,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedRow {
    pub rank: usize,
    #[serde(flatten)]
    pub row: StandingsRow,
}

/// Ascending comparison of two rows on one field.
///
/// A missing average sorts below every present one, so reversing the
/// direction reverses every strict pair.
pub fn compare_by(field: SortField, a: &StandingsRow, b: &StandingsRow) -> Ordering {
    match field {
        SortField::Played => a.played.cmp(&b.played),
        SortField::Wins => a.wins.cmp(&b.wins),
        SortField::Losses => a.losses.cmp(&b.losses),
        SortField::Points => a.points.cmp(&b.points),
        SortField::AvgScore => match (a.avg_score, b.avg_score) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
    }
}

/// Rank rows with positional ranks
pub fn rank_standings(
    rows: &[StandingsRow],
    field: SortField,
    direction: SortDirection,
) -> Vec<RankedRow> {
    rank_standings_with(rows, field, direction, RankPolicy::Positional)
}

/// Rank rows, numbering ties according to `policy`
pub fn rank_standings_with(
    rows: &[StandingsRow],
    field: SortField,
    direction: SortDirection,
    policy: RankPolicy,
) -> Vec<RankedRow> {
    let mut ordered: Vec<&StandingsRow> = rows.iter().collect();
    ordered.sort_by(|a, b| {
        let ordering = compare_by(field, a, b);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    let mut ranked: Vec<RankedRow> = Vec::with_capacity(ordered.len());
    for (index, row) in ordered.into_iter().enumerate() {
        let rank = match (policy, ranked.last()) {
            (RankPolicy::Shared, Some(previous))
                if compare_by(field, &previous.row, row) == Ordering::Equal =>
            {
                previous.rank
            }
            _ => index + 1,
        };
        ranked.push(RankedRow {
            rank,
            row: row.clone(),
        });
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::aggregation::EntityKind;
    use uuid::Uuid;

    fn row(name: &str, wins: i32, losses: i32, avg_score: Option<f64>) -> StandingsRow {
        StandingsRow {
            entity_id: Uuid::new_v4(),
            kind: EntityKind::Team,
            name: name.to_string(),
            team_id: None,
            played: wins + losses,
            wins,
            losses,
            points: wins * 3,
            avg_score,
        }
    }

    fn names(ranked: &[RankedRow]) -> Vec<&str> {
        ranked.iter().map(|r| r.row.name.as_str()).collect()
    }

    fn sample_rows() -> Vec<StandingsRow> {
        vec![
            row("Fairway Legends", 6, 4, Some(74.1)),
            row("Eagle Squadron", 8, 2, Some(72.5)),
            row("Par Breakers", 6, 4, Some(74.8)),
            row("Birdie Bandits", 7, 3, Some(73.2)),
            row("Bogey Brigade", 0, 0, None),
        ]
    }

    #[test]
    fn test_points_descending_assigns_positional_ranks() {
        let rows = sample_rows();
        let ranked = rank_standings(&rows, SortField::Points, SortDirection::Desc);

        assert_eq!(
            names(&ranked),
            vec![
                "Eagle Squadron",
                "Birdie Bandits",
                "Fairway Legends",
                "Par Breakers",
                "Bogey Brigade"
            ]
        );
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_tied_points_keep_input_order_and_consecutive_ranks() {
        let rows = sample_rows();
        let ranked = rank_standings(&rows, SortField::Points, SortDirection::Desc);

        // Fairway Legends precedes Par Breakers in the input; both have 18 points
        assert_eq!(ranked[2].row.name, "Fairway Legends");
        assert_eq!(ranked[3].row.name, "Par Breakers");
        assert_eq!((ranked[2].rank, ranked[3].rank), (3, 4));

        // Ascending keeps the same relative order for the tie
        let ascending = rank_standings(&rows, SortField::Points, SortDirection::Asc);
        let legends = ascending.iter().position(|r| r.row.name == "Fairway Legends");
        let breakers = ascending.iter().position(|r| r.row.name == "Par Breakers");
        assert!(legends < breakers);
    }

    #[test]
    fn test_shared_policy_gives_ties_the_same_rank() {
        let rows = sample_rows();
        let ranked =
            rank_standings_with(&rows, SortField::Points, SortDirection::Desc, RankPolicy::Shared);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 3, 5]);
    }

    #[test]
    fn test_ranking_is_deterministic_and_leaves_input_untouched() {
        let rows = sample_rows();
        let before = rows.clone();
        for field in [
            SortField::Played,
            SortField::Wins,
            SortField::Losses,
            SortField::Points,
            SortField::AvgScore,
            SortField::Name,
        ] {
            for direction in [SortDirection::Asc, SortDirection::Desc] {
                let first = rank_standings(&rows, field, direction);
                let second = rank_standings(&rows, field, direction);
                assert_eq!(first, second);
            }
        }
        assert_eq!(rows, before);
    }

    #[test]
    fn test_flipping_direction_reverses_strict_pairs_only() {
        let rows = sample_rows();
        for field in [
            SortField::Played,
            SortField::Wins,
            SortField::Losses,
            SortField::Points,
            SortField::AvgScore,
            SortField::Name,
        ] {
            let asc = rank_standings(&rows, field, SortDirection::Asc);
            let desc = rank_standings(&rows, field, SortDirection::Desc);
            let position = |ranked: &[RankedRow], id: Uuid| {
                ranked.iter().position(|r| r.row.entity_id == id).unwrap()
            };

            for (i, a) in rows.iter().enumerate() {
                for b in rows.iter().skip(i + 1) {
                    let (a_asc, b_asc) = (
                        position(asc.as_slice(), a.entity_id),
                        position(asc.as_slice(), b.entity_id),
                    );
                    let (a_desc, b_desc) = (
                        position(desc.as_slice(), a.entity_id),
                        position(desc.as_slice(), b.entity_id),
                    );
                    match compare_by(field, a, b) {
                        Ordering::Equal => {
                            assert!(a_asc < b_asc && a_desc < b_desc);
                        }
                        _ => {
                            assert_eq!(a_asc < b_asc, a_desc > b_desc);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_missing_average_sorts_below_present_values() {
        let rows = sample_rows();
        let desc = rank_standings(&rows, SortField::AvgScore, SortDirection::Desc);
        assert_eq!(desc.last().unwrap().row.name, "Bogey Brigade");

        let asc = rank_standings(&rows, SortField::AvgScore, SortDirection::Asc);
        assert_eq!(asc[0].row.name, "Bogey Brigade");
        assert_eq!(asc[1].row.name, "Eagle Squadron");
    }

    #[test]
    fn test_name_sort_ignores_case() {
        let rows = vec![
            row("birdie Bandits", 1, 0, None),
            row("Albatross Club", 1, 0, None),
            row("Condor Crew", 1, 0, None),
        ];
        let ranked = rank_standings(&rows, SortField::Name, SortDirection::Asc);
        assert_eq!(
            names(&ranked),
            vec!["Albatross Club", "birdie Bandits", "Condor Crew"]
        );
    }

    #[test]
    fn test_sort_state_toggle() {
        let state = SortState::default();
        assert_eq!(state.field, SortField::Points);
        assert_eq!(state.direction, SortDirection::Desc);

        let flipped = state.select(SortField::Points);
        assert_eq!(flipped.direction, SortDirection::Asc);
        assert_eq!(flipped.select(SortField::Points).direction, SortDirection::Desc);

        let new_field = flipped.select(SortField::Wins);
        assert_eq!(new_field.field, SortField::Wins);
        assert_eq!(new_field.direction, SortDirection::Desc);
    }

    #[test]
    fn test_parse_sort_arguments() {
        assert_eq!("avg_score".parse::<SortField>().unwrap(), SortField::AvgScore);
        assert_eq!("team".parse::<SortField>().unwrap(), SortField::Name);
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert!("sideways".parse::<SortDirection>().is_err());
        assert!("handicap".parse::<SortField>().is_err());
    }

    #[test]
    fn test_empty_rows_rank_to_empty() {
        assert!(rank_standings(&[], SortField::Points, SortDirection::Desc).is_empty());
    }
}
