//! Sample-league fixtures.
//!
//! Builds league snapshots in memory for aggregation and ranking tests. Nothing
//! here is reachable from a production code path.

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;

use crate::entity::{courses, match_results, players, scores, teams, tournaments};
use crate::league::aggregation::LeagueSnapshot;

#[derive(Clone, Debug, Default)]
pub struct LeagueFixture {
    snapshot: LeagueSnapshot,
}

impl LeagueFixture {
    pub fn add_team(&mut self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.teams.push(teams::Model {
            id,
            name: name.to_string(),
            logo_url: None,
            wins: 0,
            losses: 0,
            created_at: Utc::now().into(),
        });
        id
    }

    pub fn add_player(&mut self, team_id: Uuid, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.players.push(players::Model {
            id,
            team_id,
            name: name.to_string(),
            created_at: Utc::now().into(),
        });
        id
    }

    pub fn add_course(&mut self, holes: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.snapshot.courses.push(courses::Model {
            id,
            name: format!("{holes}-hole course"),
            location: None,
            par: holes * 4,
            holes,
            difficulty: Some(courses::Difficulty::Medium),
        });
        id
    }

    pub fn add_tournament(&mut self, course_id: Uuid, completed: bool) -> Uuid {
        let id = Uuid::new_v4();
        let offset = self.snapshot.tournaments.len() as i64;
        let start = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap_or(NaiveDate::MIN);
        self.snapshot.tournaments.push(tournaments::Model {
            id,
            name: format!("Week {}", offset + 1),
            course_id,
            date: start + Duration::weeks(offset),
            completed,
            completed_at: completed.then(|| Utc::now().into()),
        });
        id
    }

    /// Records a result and bumps the cached team counters like the store does
    pub fn add_match(&mut self, tournament_id: Uuid, winner: Uuid, loser: Uuid) {
        self.snapshot.match_results.push(match_results::Model {
            id: Uuid::new_v4(),
            tournament_id,
            winner_team_id: winner,
            loser_team_id: loser,
            created_at: Utc::now().into(),
        });
        for team in self.snapshot.teams.iter_mut() {
            if team.id == winner {
                team.wins += 1;
            } else if team.id == loser {
                team.losses += 1;
            }
        }
    }

    /// Scores holes 1..=n with the given strokes
    pub fn add_round(&mut self, tournament_id: Uuid, player_id: Uuid, strokes: &[i32]) {
        for (index, strokes) in strokes.iter().enumerate() {
            self.snapshot.scores.push(scores::Model {
                tournament_id,
                player_id,
                hole_number: index as i32 + 1,
                strokes: *strokes,
                updated_at: Utc::now().into(),
            });
        }
    }

    pub fn snapshot(&self) -> LeagueSnapshot {
        self.snapshot.clone()
    }

    /// Four teams over ten completed tournaments:
    /// Eagle Squadron 8-2 (24 pts), Birdie Bandits 7-3 (21),
    /// Fairway Legends 6-4 (18), Bunker Busters 0-12 (0).
    pub fn standings_league() -> Self {
        let mut fixture = Self::default();
        let eagles = fixture.add_team("Eagle Squadron");
        let birdies = fixture.add_team("Birdie Bandits");
        let legends = fixture.add_team("Fairway Legends");
        let bunkers = fixture.add_team("Bunker Busters");

        let course = fixture.add_course(18);
        let weeks: Vec<Uuid> = (0..10)
            .map(|_| fixture.add_tournament(course, true))
            .collect();

        let results = [
            (eagles, birdies),
            (eagles, birdies),
            (birdies, eagles),
            (eagles, legends),
            (eagles, legends),
            (legends, eagles),
            (birdies, legends),
            (birdies, legends),
            (legends, birdies),
        ]
        .into_iter()
        .chain((0..4).flat_map(|_| [(eagles, bunkers), (birdies, bunkers), (legends, bunkers)]));

        for (index, (winner, loser)) in results.enumerate() {
            fixture.add_match(weeks[index % weeks.len()], winner, loser);
        }

        for (team, name) in [
            (eagles, "Eagle One"),
            (birdies, "Birdie One"),
            (legends, "Legend One"),
            (bunkers, "Bunker One"),
        ] {
            fixture.add_player(team, name);
        }

        fixture
    }
}
