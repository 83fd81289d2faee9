use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dto::league_requests::{
    CourseRequest, MatchResultRequest, PlayerRequest, TeamRequest, TournamentFilter,
    TournamentRequest,
};
use crate::dto::team_listing::{TeamDetail, TeamListing};
use crate::entity::{courses, match_results, players, scores, teams, tournaments};
use crate::error::AppError;
use crate::league::aggregation::LeagueSnapshot;
use crate::league::ingestion::{check_against_tournament, ScoreBatch};
use crate::store::LeagueStore;

type ScoreKey = (Uuid, Uuid, i32);

#[derive(Default)]
struct MemoryState {
    teams: BTreeMap<Uuid, teams::Model>,
    players: BTreeMap<Uuid, players::Model>,
    courses: BTreeMap<Uuid, courses::Model>,
    tournaments: BTreeMap<Uuid, tournaments::Model>,
    scores: BTreeMap<ScoreKey, scores::Model>,
    match_results: BTreeMap<Uuid, match_results::Model>,
}

impl MemoryState {
    fn team(&self, team_id: Uuid) -> Result<&teams::Model, AppError> {
        self.teams
            .get(&team_id)
            .ok_or_else(|| AppError::not_found("team", team_id))
    }

    fn tournament(&self, tournament_id: Uuid) -> Result<&tournaments::Model, AppError> {
        self.tournaments
            .get(&tournament_id)
            .ok_or_else(|| AppError::not_found("tournament", tournament_id))
    }

    fn course(&self, course_id: Uuid) -> Result<&courses::Model, AppError> {
        self.courses
            .get(&course_id)
            .ok_or_else(|| AppError::not_found("course", course_id))
    }

    fn adjust_record(&mut self, team_id: Uuid, wins: i32, losses: i32) {
        if let Some(team) = self.teams.get_mut(&team_id) {
            team.wins += wins;
            team.losses += losses;
        }
    }
}

/// Process-local league store.
///
/// One `RwLock` guards all tables: writes are serialized and fully validated
/// before any row changes, and snapshots are taken under a single read lock.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    latency: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays every call, for exercising store timeouts
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            state: RwLock::default(),
            latency: Some(latency),
        }
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl LeagueStore for MemoryStore {
    async fn list_teams(&self) -> Result<Vec<TeamListing>, AppError> {
        self.simulate_latency().await;
        let state = self.state.read().await;

        let mut roster_sizes: HashMap<Uuid, u64> = HashMap::new();
        for player in state.players.values() {
            *roster_sizes.entry(player.team_id).or_insert(0) += 1;
        }

        let mut listings: Vec<TeamListing> = state
            .teams
            .values()
            .map(|team| TeamListing {
                team: team.clone(),
                player_count: roster_sizes.get(&team.id).copied().unwrap_or(0),
            })
            .collect();
        listings.sort_by(|a, b| a.team.name.cmp(&b.team.name).then(a.team.id.cmp(&b.team.id)));
        Ok(listings)
    }

    async fn get_team(&self, team_id: Uuid) -> Result<TeamDetail, AppError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let team = state.team(team_id)?.clone();

        let mut players: Vec<players::Model> = state
            .players
            .values()
            .filter(|p| p.team_id == team_id)
            .cloned()
            .collect();
        players.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        Ok(TeamDetail { team, players })
    }

    async fn create_team(&self, team: TeamRequest) -> Result<teams::Model, AppError> {
        self.simulate_latency().await;
        let model = teams::Model {
            id: Uuid::new_v4(),
            name: team.name,
            logo_url: team.logo_url,
            wins: 0,
            losses: 0,
            created_at: Utc::now().into(),
        };
        self.state
            .write()
            .await
            .teams
            .insert(model.id, model.clone());
        Ok(model)
    }

    async fn update_team(
        &self,
        team_id: Uuid,
        team: TeamRequest,
    ) -> Result<teams::Model, AppError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        let existing = state
            .teams
            .get_mut(&team_id)
            .ok_or_else(|| AppError::not_found("team", team_id))?;
        existing.name = team.name;
        existing.logo_url = team.logo_url;
        Ok(existing.clone())
    }

    async fn delete_team(&self, team_id: Uuid) -> Result<(), AppError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.team(team_id)?;

        let roster: Vec<Uuid> = state
            .players
            .values()
            .filter(|p| p.team_id == team_id)
            .map(|p| p.id)
            .collect();
        state
            .scores
            .retain(|(_, player_id, _), _| !roster.contains(player_id));
        state.players.retain(|_, p| p.team_id != team_id);

        let removed: Vec<match_results::Model> = state
            .match_results
            .values()
            .filter(|m| m.winner_team_id == team_id || m.loser_team_id == team_id)
            .cloned()
            .collect();
        for result in &removed {
            state.match_results.remove(&result.id);
            if result.winner_team_id == team_id {
                state.adjust_record(result.loser_team_id, 0, -1);
            } else {
                state.adjust_record(result.winner_team_id, -1, 0);
            }
        }

        state.teams.remove(&team_id);
        Ok(())
    }

    async fn create_player(
        &self,
        team_id: Uuid,
        player: PlayerRequest,
    ) -> Result<players::Model, AppError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.team(team_id)?;

        let model = players::Model {
            id: Uuid::new_v4(),
            team_id,
            name: player.name,
            created_at: Utc::now().into(),
        };
        state.players.insert(model.id, model.clone());
        Ok(model)
    }

    async fn list_courses(&self) -> Result<Vec<courses::Model>, AppError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut courses: Vec<courses::Model> = state.courses.values().cloned().collect();
        courses.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(courses)
    }

    async fn create_course(&self, course: CourseRequest) -> Result<courses::Model, AppError> {
        self.simulate_latency().await;
        let model = courses::Model {
            id: Uuid::new_v4(),
            name: course.name,
            location: course.location,
            par: course.par,
            holes: course.holes,
            difficulty: course.difficulty,
        };
        self.state
            .write()
            .await
            .courses
            .insert(model.id, model.clone());
        Ok(model)
    }

    async fn list_tournaments(
        &self,
        filter: TournamentFilter,
    ) -> Result<Vec<tournaments::Model>, AppError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        let mut tournaments: Vec<tournaments::Model> = state
            .tournaments
            .values()
            .filter(|t| match filter {
                TournamentFilter::All => true,
                TournamentFilter::Upcoming => !t.completed,
                TournamentFilter::Past => t.completed,
            })
            .cloned()
            .collect();

        tournaments.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
        if filter == TournamentFilter::Past {
            tournaments.reverse();
        }
        Ok(tournaments)
    }

    async fn create_tournament(
        &self,
        tournament: TournamentRequest,
    ) -> Result<tournaments::Model, AppError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.course(tournament.course_id)?;

        let model = tournaments::Model {
            id: Uuid::new_v4(),
            name: tournament.name,
            course_id: tournament.course_id,
            date: tournament.date,
            completed: false,
            completed_at: None,
        };
        state.tournaments.insert(model.id, model.clone());
        Ok(model)
    }

    async fn complete_tournament(
        &self,
        tournament_id: Uuid,
    ) -> Result<tournaments::Model, AppError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        let tournament = state
            .tournaments
            .get_mut(&tournament_id)
            .ok_or_else(|| AppError::not_found("tournament", tournament_id))?;

        if tournament.completed {
            return Err(AppError::Conflict(format!(
                "tournament {tournament_id} is already completed"
            )));
        }
        tournament.completed = true;
        tournament.completed_at = Some(Utc::now().into());
        Ok(tournament.clone())
    }

    async fn record_match_result(
        &self,
        tournament_id: Uuid,
        result: MatchResultRequest,
    ) -> Result<match_results::Model, AppError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;
        state.tournament(tournament_id)?;
        state.team(result.winner_team_id)?;
        state.team(result.loser_team_id)?;

        let model = match_results::Model {
            id: Uuid::new_v4(),
            tournament_id,
            winner_team_id: result.winner_team_id,
            loser_team_id: result.loser_team_id,
            created_at: Utc::now().into(),
        };
        state.match_results.insert(model.id, model.clone());
        state.adjust_record(result.winner_team_id, 1, 0);
        state.adjust_record(result.loser_team_id, 0, 1);
        Ok(model)
    }

    async fn upsert_scores(
        &self,
        batch: &ScoreBatch,
        allow_completed: bool,
    ) -> Result<Vec<scores::Model>, AppError> {
        self.simulate_latency().await;
        let mut state = self.state.write().await;

        // every check runs before the first row changes
        let tournament = state.tournament(batch.tournament_id())?;
        if !state.players.contains_key(&batch.player_id()) {
            return Err(AppError::not_found("player", batch.player_id()));
        }
        let course = state.course(tournament.course_id)?;
        check_against_tournament(batch, tournament, course, allow_completed)?;

        let now = Utc::now();
        let mut written = Vec::with_capacity(batch.holes().len());
        for hole in batch.holes() {
            let model = scores::Model {
                tournament_id: batch.tournament_id(),
                player_id: batch.player_id(),
                hole_number: hole.hole_number,
                strokes: hole.strokes,
                updated_at: now.into(),
            };
            state.scores.insert(
                (model.tournament_id, model.player_id, model.hole_number),
                model.clone(),
            );
            written.push(model);
        }
        Ok(written)
    }

    async fn list_scores(
        &self,
        tournament_id: Uuid,
        player_id: Option<Uuid>,
    ) -> Result<Vec<scores::Model>, AppError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        state.tournament(tournament_id)?;

        // keys order by (tournament, player, hole)
        Ok(state
            .scores
            .values()
            .filter(|s| s.tournament_id == tournament_id)
            .filter(|s| player_id.map_or(true, |id| s.player_id == id))
            .cloned()
            .collect())
    }

    async fn load_snapshot(&self) -> Result<LeagueSnapshot, AppError> {
        self.simulate_latency().await;
        let state = self.state.read().await;
        Ok(LeagueSnapshot {
            teams: state.teams.values().cloned().collect(),
            players: state.players.values().cloned().collect(),
            courses: state.courses.values().cloned().collect(),
            tournaments: state.tournaments.values().cloned().collect(),
            scores: state.scores.values().cloned().collect(),
            match_results: state.match_results.values().cloned().collect(),
        })
    }
}
