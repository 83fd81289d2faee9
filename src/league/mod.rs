//! League management module
//!
//! This module holds the league core: score ingestion, standings aggregation
//! and ranking, plus the admin operations around them. [`LeagueService`] is the
//! injected entry point; it owns the store handle, the league rules and the
//! store-call timeout, and every operation takes the caller explicitly.

pub mod aggregation;
pub mod handlers;
pub mod ingestion;
pub mod ranking;
pub mod rules;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::LeagueRules;
use crate::dto::league_requests::{
    CourseRequest, MatchResultRequest, PlayerRequest, ScoreSubmission, StandingsQuery,
    TeamRequest, TournamentFilter, TournamentRequest,
};
use crate::dto::standings::{LeagueOverview, StandingsResponse};
use crate::dto::team_listing::{TeamDetail, TeamListing};
use crate::entity::{courses, match_results, players, scores, teams, tournaments};
use crate::error::AppError;
use crate::store::LeagueStore;

use aggregation::{GroupingMode, StandingsRow};
use ingestion::ScoreBatch;
use ranking::{RankedRow, SortDirection, SortField, SortState};
use rules::{is_valid_hole_count, normalize_name, normalize_optional};

/// Teams shown on the league overview
pub const OVERVIEW_TOP_TEAMS: usize = 3;

/// Who is calling, as established by the authentication layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub subject: String,
    pub is_admin: bool,
}

impl CallerIdentity {
    pub fn admin(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            is_admin: true,
        }
    }

    pub fn member(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            is_admin: false,
        }
    }
}

#[derive(Clone)]
pub struct LeagueService {
    store: Arc<dyn LeagueStore>,
    rules: LeagueRules,
    store_timeout: Duration,
}

impl LeagueService {
    pub fn new(store: Arc<dyn LeagueStore>, rules: LeagueRules, store_timeout: Duration) -> Self {
        Self {
            store,
            rules,
            store_timeout,
        }
    }

    pub fn rules(&self) -> LeagueRules {
        self.rules
    }

    /// Runs one store call under the request-level timeout
    async fn call_store<T, F>(&self, operation: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                match &err {
                    AppError::Store { .. } => error!(operation, error = %err, "Store call failed"),
                    _ => warn!(operation, error = %err, "Store rejected request"),
                }
                Err(err)
            }
            Err(_) => {
                error!(
                    operation,
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "Store call timed out"
                );
                Err(AppError::Timeout { operation })
            }
        }
    }

    fn require_admin(caller: &CallerIdentity, operation: &'static str) -> Result<(), AppError> {
        if caller.is_admin {
            Ok(())
        } else {
            warn!(subject = %caller.subject, operation, "Non-admin caller rejected");
            Err(AppError::Forbidden)
        }
    }

    /// Validates and upserts a batch of hole scores for one player in one
    /// tournament. Returns the stored rows ordered by hole number.
    pub async fn ingest_scores(
        &self,
        caller: &CallerIdentity,
        submission: ScoreSubmission,
    ) -> Result<Vec<scores::Model>, AppError> {
        Self::require_admin(caller, "ingest_scores")?;

        let batch = ScoreBatch::new(
            submission.tournament_id,
            submission.player_id,
            &submission.scores,
        )
        .map_err(|err| {
            warn!(
                tournament_id = %submission.tournament_id,
                player_id = %submission.player_id,
                error = %err,
                "Score batch rejected"
            );
            err
        })?;

        let written = self
            .call_store(
                "upsert_scores",
                self.store
                    .upsert_scores(&batch, self.rules.allow_scores_after_completion),
            )
            .await?;

        info!(
            tournament_id = %batch.tournament_id(),
            player_id = %batch.player_id(),
            holes = written.len(),
            "Scores ingested"
        );
        Ok(written)
    }

    /// One standings row per registered entity of the grouping, ordered by id
    pub async fn compute_standings(
        &self,
        caller: &CallerIdentity,
        mode: GroupingMode,
    ) -> Result<Vec<StandingsRow>, AppError> {
        let snapshot = self
            .call_store("load_snapshot", self.store.load_snapshot())
            .await?;
        let rows = aggregation::compute_standings(&snapshot, mode);
        debug!(subject = %caller.subject, grouping = %mode, rows = rows.len(), "Standings computed");
        Ok(rows)
    }

    /// Ranks rows using the league's tie policy
    pub fn rank_standings(
        &self,
        rows: &[StandingsRow],
        field: SortField,
        direction: SortDirection,
    ) -> Vec<RankedRow> {
        ranking::rank_standings_with(rows, field, direction, self.rules.rank_ties)
    }

    /// Aggregates and ranks in one call, as the standings table asks for it
    pub async fn standings(
        &self,
        caller: &CallerIdentity,
        query: StandingsQuery,
    ) -> Result<StandingsResponse, AppError> {
        let grouping = match query.filter_type.as_deref() {
            Some(raw) => raw.parse()?,
            None => GroupingMode::Overall,
        };
        let defaults = SortState::default();
        let sort = SortState {
            field: match query.sort.as_deref() {
                Some(raw) => raw.parse()?,
                None => defaults.field,
            },
            direction: match query.direction.as_deref() {
                Some(raw) => raw.parse()?,
                None => defaults.direction,
            },
        };

        let rows = self.compute_standings(caller, grouping).await?;
        let rows = self.rank_standings(&rows, sort.field, sort.direction);
        Ok(StandingsResponse {
            grouping,
            sort,
            rows,
        })
    }

    /// Next upcoming tournament and the top of the league table
    pub async fn league_overview(&self, caller: &CallerIdentity) -> Result<LeagueOverview, AppError> {
        let upcoming_tournament = self
            .call_store(
                "list_tournaments",
                self.store.list_tournaments(TournamentFilter::Upcoming),
            )
            .await?
            .into_iter()
            .next();

        let rows = self.compute_standings(caller, GroupingMode::Overall).await?;
        let mut top_teams = self.rank_standings(&rows, SortField::Points, SortDirection::Desc);
        top_teams.truncate(OVERVIEW_TOP_TEAMS);

        Ok(LeagueOverview {
            upcoming_tournament,
            top_teams,
        })
    }

    pub async fn list_teams(&self) -> Result<Vec<TeamListing>, AppError> {
        self.call_store("list_teams", self.store.list_teams()).await
    }

    pub async fn get_team(&self, team_id: Uuid) -> Result<TeamDetail, AppError> {
        self.call_store("get_team", self.store.get_team(team_id))
            .await
    }

    pub async fn create_team(
        &self,
        caller: &CallerIdentity,
        request: TeamRequest,
    ) -> Result<teams::Model, AppError> {
        Self::require_admin(caller, "create_team")?;
        let request = normalize_team(request)?;

        let team = self
            .call_store("create_team", self.store.create_team(request))
            .await?;
        info!(team_id = %team.id, name = %team.name, "Team created");
        Ok(team)
    }

    pub async fn update_team(
        &self,
        caller: &CallerIdentity,
        team_id: Uuid,
        request: TeamRequest,
    ) -> Result<teams::Model, AppError> {
        Self::require_admin(caller, "update_team")?;
        let request = normalize_team(request)?;

        let team = self
            .call_store("update_team", self.store.update_team(team_id, request))
            .await?;
        info!(team_id = %team.id, "Team updated");
        Ok(team)
    }

    /// Deletes the team together with its players, their scores and its match results
    pub async fn delete_team(&self, caller: &CallerIdentity, team_id: Uuid) -> Result<(), AppError> {
        Self::require_admin(caller, "delete_team")?;
        self.call_store("delete_team", self.store.delete_team(team_id))
            .await?;
        info!(%team_id, "Team deleted");
        Ok(())
    }

    pub async fn create_player(
        &self,
        caller: &CallerIdentity,
        team_id: Uuid,
        request: PlayerRequest,
    ) -> Result<players::Model, AppError> {
        Self::require_admin(caller, "create_player")?;
        let request = PlayerRequest {
            name: normalize_name("player name", &request.name)?,
        };

        let player = self
            .call_store("create_player", self.store.create_player(team_id, request))
            .await?;
        info!(player_id = %player.id, %team_id, "Player added to team");
        Ok(player)
    }

    pub async fn list_courses(&self) -> Result<Vec<courses::Model>, AppError> {
        self.call_store("list_courses", self.store.list_courses())
            .await
    }

    pub async fn create_course(
        &self,
        caller: &CallerIdentity,
        request: CourseRequest,
    ) -> Result<courses::Model, AppError> {
        Self::require_admin(caller, "create_course")?;
        if request.par <= 0 {
            return Err(AppError::validation("par must be a positive integer"));
        }
        if !is_valid_hole_count(request.holes) {
            return Err(AppError::validation(format!(
                "holes must be between 1 and {}, got {}",
                rules::MAX_COURSE_HOLES,
                request.holes
            )));
        }
        let request = CourseRequest {
            name: normalize_name("course name", &request.name)?,
            location: normalize_optional(request.location),
            ..request
        };

        let course = self
            .call_store("create_course", self.store.create_course(request))
            .await?;
        info!(course_id = %course.id, holes = course.holes, "Course created");
        Ok(course)
    }

    pub async fn list_tournaments(
        &self,
        filter: TournamentFilter,
    ) -> Result<Vec<tournaments::Model>, AppError> {
        self.call_store("list_tournaments", self.store.list_tournaments(filter))
            .await
    }

    pub async fn create_tournament(
        &self,
        caller: &CallerIdentity,
        request: TournamentRequest,
    ) -> Result<tournaments::Model, AppError> {
        Self::require_admin(caller, "create_tournament")?;
        let request = TournamentRequest {
            name: normalize_name("tournament name", &request.name)?,
            ..request
        };

        let tournament = self
            .call_store("create_tournament", self.store.create_tournament(request))
            .await?;
        info!(tournament_id = %tournament.id, date = %tournament.date, "Tournament scheduled");
        Ok(tournament)
    }

    pub async fn complete_tournament(
        &self,
        caller: &CallerIdentity,
        tournament_id: Uuid,
    ) -> Result<tournaments::Model, AppError> {
        Self::require_admin(caller, "complete_tournament")?;
        let tournament = self
            .call_store(
                "complete_tournament",
                self.store.complete_tournament(tournament_id),
            )
            .await?;
        info!(%tournament_id, "Tournament completed");
        Ok(tournament)
    }

    pub async fn record_match_result(
        &self,
        caller: &CallerIdentity,
        tournament_id: Uuid,
        result: MatchResultRequest,
    ) -> Result<match_results::Model, AppError> {
        Self::require_admin(caller, "record_match_result")?;
        if result.winner_team_id == result.loser_team_id {
            return Err(AppError::validation(
                "winner and loser must be different teams",
            ));
        }

        let recorded = self
            .call_store(
                "record_match_result",
                self.store.record_match_result(tournament_id, result),
            )
            .await?;
        info!(
            %tournament_id,
            winner = %result.winner_team_id,
            loser = %result.loser_team_id,
            "Match result recorded"
        );
        Ok(recorded)
    }

    pub async fn list_scores(
        &self,
        tournament_id: Uuid,
        player_id: Option<Uuid>,
    ) -> Result<Vec<scores::Model>, AppError> {
        self.call_store(
            "list_scores",
            self.store.list_scores(tournament_id, player_id),
        )
        .await
    }
}

fn normalize_team(request: TeamRequest) -> Result<TeamRequest, AppError> {
    Ok(TeamRequest {
        name: normalize_name("team name", &request.name)?,
        logo_url: normalize_optional(request.logo_url),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::league::aggregation::EntityKind;
    use crate::league::ingestion::HoleScore;
    use crate::league::ranking::RankPolicy;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn service_with(store: MemoryStore, rules: LeagueRules) -> LeagueService {
        LeagueService::new(Arc::new(store), rules, Duration::from_secs(5))
    }

    fn service() -> LeagueService {
        service_with(MemoryStore::new(), LeagueRules::default())
    }

    fn admin() -> CallerIdentity {
        CallerIdentity::admin("league-admin")
    }

    fn holes(strokes: &[(i32, i32)]) -> Vec<HoleScore> {
        strokes
            .iter()
            .map(|&(hole_number, strokes)| HoleScore {
                hole_number,
                strokes,
            })
            .collect()
    }

    struct Round {
        tournament_id: Uuid,
        player_id: Uuid,
    }

    async fn seed_round(service: &LeagueService, course_holes: i32) -> Round {
        let caller = admin();
        let team = service
            .create_team(
                &caller,
                TeamRequest {
                    name: "Eagle Squadron".into(),
                    logo_url: None,
                },
            )
            .await
            .unwrap();
        let player = service
            .create_player(&caller, team.id, PlayerRequest { name: "Ada".into() })
            .await
            .unwrap();
        let course = service
            .create_course(
                &caller,
                CourseRequest {
                    name: "Pine Valley".into(),
                    location: Some("  ".into()),
                    par: course_holes * 4,
                    holes: course_holes,
                    difficulty: Some(courses::Difficulty::Hard),
                },
            )
            .await
            .unwrap();
        let tournament = service
            .create_tournament(
                &caller,
                TournamentRequest {
                    name: "Spring Open".into(),
                    course_id: course.id,
                    date: NaiveDate::from_ymd_opt(2025, 5, 4).unwrap(),
                },
            )
            .await
            .unwrap();

        Round {
            tournament_id: tournament.id,
            player_id: player.id,
        }
    }

    fn submission(round: &Round, scores: &[(i32, i32)]) -> ScoreSubmission {
        ScoreSubmission {
            tournament_id: round.tournament_id,
            player_id: round.player_id,
            scores: holes(scores),
        }
    }

    fn strokes_by_hole(rows: &[scores::Model]) -> Vec<(i32, i32)> {
        rows.iter().map(|s| (s.hole_number, s.strokes)).collect()
    }

    #[actix_web::test]
    async fn test_resubmitted_hole_overwrites_previous_strokes() {
        let service = service();
        let round = seed_round(&service, 18).await;

        service
            .ingest_scores(&admin(), submission(&round, &[(1, 4), (2, 5), (3, 3)]))
            .await
            .unwrap();
        let written = service
            .ingest_scores(&admin(), submission(&round, &[(2, 6)]))
            .await
            .unwrap();
        assert_eq!(strokes_by_hole(&written), vec![(2, 6)]);

        let stored = service
            .list_scores(round.tournament_id, Some(round.player_id))
            .await
            .unwrap();
        assert_eq!(strokes_by_hole(&stored), vec![(1, 4), (2, 6), (3, 3)]);
    }

    #[actix_web::test]
    async fn test_ingesting_same_batch_twice_is_idempotent() {
        let service = service();
        let round = seed_round(&service, 9).await;
        let batch = [(1, 4), (2, 3), (3, 5), (4, 4)];

        service
            .ingest_scores(&admin(), submission(&round, &batch))
            .await
            .unwrap();
        let first = service.list_scores(round.tournament_id, None).await.unwrap();

        service
            .ingest_scores(&admin(), submission(&round, &batch))
            .await
            .unwrap();
        let second = service.list_scores(round.tournament_id, None).await.unwrap();

        assert_eq!(strokes_by_hole(&first), strokes_by_hole(&second));
        assert_eq!(second.len(), 4);
    }

    #[actix_web::test]
    async fn test_non_positive_hole_rejected_without_writing() {
        let service = service();
        let round = seed_round(&service, 18).await;

        for bad_hole in [0, -2] {
            let err = service
                .ingest_scores(&admin(), submission(&round, &[(1, 4), (bad_hole, 5)]))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }

        let stored = service.list_scores(round.tournament_id, None).await.unwrap();
        assert!(stored.is_empty());
    }

    #[actix_web::test]
    async fn test_hole_beyond_course_rejected_without_writing() {
        let service = service();
        let round = seed_round(&service, 9).await;

        let err = service
            .ingest_scores(&admin(), submission(&round, &[(1, 4), (10, 5)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(service
            .list_scores(round.tournament_id, None)
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_tournament_or_player_is_not_found() {
        let service = service();
        let round = seed_round(&service, 18).await;

        let err = service
            .ingest_scores(
                &admin(),
                ScoreSubmission {
                    tournament_id: Uuid::new_v4(),
                    player_id: round.player_id,
                    scores: holes(&[(1, 4)]),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "tournament", .. }));

        let err = service
            .ingest_scores(
                &admin(),
                ScoreSubmission {
                    tournament_id: round.tournament_id,
                    player_id: Uuid::new_v4(),
                    scores: holes(&[(1, 4)]),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "player", .. }));
    }

    #[actix_web::test]
    async fn test_completed_tournament_guard_follows_league_rules() {
        let service = service();
        let round = seed_round(&service, 18).await;
        service
            .complete_tournament(&admin(), round.tournament_id)
            .await
            .unwrap();

        let err = service
            .ingest_scores(&admin(), submission(&round, &[(1, 4)]))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let lenient = service_with(
            MemoryStore::new(),
            LeagueRules {
                allow_scores_after_completion: true,
                rank_ties: RankPolicy::Positional,
            },
        );
        let round = seed_round(&lenient, 18).await;
        lenient
            .complete_tournament(&admin(), round.tournament_id)
            .await
            .unwrap();
        let written = lenient
            .ingest_scores(&admin(), submission(&round, &[(1, 4)]))
            .await
            .unwrap();
        assert_eq!(written.len(), 1);
    }

    #[actix_web::test]
    async fn test_completing_twice_is_a_conflict() {
        let service = service();
        let round = seed_round(&service, 18).await;

        let completed = service
            .complete_tournament(&admin(), round.tournament_id)
            .await
            .unwrap();
        assert!(completed.completed);
        assert!(completed.completed_at.is_some());

        let err = service
            .complete_tournament(&admin(), round.tournament_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[actix_web::test]
    async fn test_members_cannot_mutate() {
        let service = service();
        let member = CallerIdentity::member("spectator");

        let err = service
            .create_team(
                &member,
                TeamRequest {
                    name: "Sneaky Wedges".into(),
                    logo_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let err = service
            .ingest_scores(
                &member,
                ScoreSubmission {
                    tournament_id: Uuid::new_v4(),
                    player_id: Uuid::new_v4(),
                    scores: holes(&[(1, 4)]),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        // reads stay open to members
        assert!(service
            .compute_standings(&member, GroupingMode::Overall)
            .await
            .unwrap()
            .is_empty());
    }

    #[actix_web::test]
    async fn test_slow_store_surfaces_timeout() {
        let service = LeagueService::new(
            Arc::new(MemoryStore::with_latency(Duration::from_millis(200))),
            LeagueRules::default(),
            Duration::from_millis(20),
        );

        let err = service
            .compute_standings(&admin(), GroupingMode::ByTeam)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Timeout {
                operation: "load_snapshot"
            }
        ));
    }

    #[actix_web::test]
    async fn test_team_names_are_trimmed_and_required() {
        let service = service();

        let team = service
            .create_team(
                &admin(),
                TeamRequest {
                    name: "  Birdie Bandits ".into(),
                    logo_url: Some("".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(team.name, "Birdie Bandits");
        assert_eq!(team.logo_url, None);

        let err = service
            .update_team(
                &admin(),
                team.id,
                TeamRequest {
                    name: "   ".into(),
                    logo_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[actix_web::test]
    async fn test_match_results_drive_team_standings() {
        let service = service();
        let caller = admin();
        let round = seed_round(&service, 18).await;
        let eagles = service.list_teams().await.unwrap()[0].team.id;
        let rivals = service
            .create_team(
                &caller,
                TeamRequest {
                    name: "Fairway Legends".into(),
                    logo_url: None,
                },
            )
            .await
            .unwrap();

        let err = service
            .record_match_result(
                &caller,
                round.tournament_id,
                MatchResultRequest {
                    winner_team_id: eagles,
                    loser_team_id: eagles,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        service
            .record_match_result(
                &caller,
                round.tournament_id,
                MatchResultRequest {
                    winner_team_id: eagles,
                    loser_team_id: rivals.id,
                },
            )
            .await
            .unwrap();

        // a full 18-hole round of 4s
        let full_round: Vec<(i32, i32)> = (1..=18).map(|hole| (hole, 4)).collect();
        service
            .ingest_scores(&caller, submission(&round, &full_round))
            .await
            .unwrap();

        // Nothing counts until the tournament is completed
        let before = service
            .compute_standings(&caller, GroupingMode::ByTeam)
            .await
            .unwrap();
        assert!(before.iter().all(|row| row.played == 0 && row.avg_score.is_none()));

        service
            .complete_tournament(&caller, round.tournament_id)
            .await
            .unwrap();

        let response = service
            .standings(&caller, StandingsQuery::default())
            .await
            .unwrap();
        assert_eq!(response.grouping, GroupingMode::Overall);
        assert_eq!(response.sort, SortState::default());
        assert_eq!(response.rows[0].rank, 1);
        assert_eq!(response.rows[0].row.entity_id, eagles);
        assert_eq!(response.rows[0].row.points, 3);
        assert_eq!(response.rows[0].row.avg_score, Some(72.0));
        assert_eq!(response.rows[1].row.entity_id, rivals.id);
        assert_eq!(response.rows[1].row.losses, 1);
        assert_eq!(response.rows[1].row.avg_score, None);

        let players = service
            .standings(
                &caller,
                StandingsQuery {
                    filter_type: Some("player".into()),
                    sort: Some("avg_score".into()),
                    direction: Some("asc".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(players.rows.len(), 1);
        assert_eq!(players.rows[0].row.kind, EntityKind::Player);
        assert_eq!(players.rows[0].row.team_id, Some(eagles));
        assert_eq!(players.rows[0].row.wins, 1);
    }

    #[actix_web::test]
    async fn test_bad_standings_arguments_are_validation_errors() {
        let service = service();
        for query in [
            StandingsQuery {
                filter_type: Some("by_course".into()),
                ..StandingsQuery::default()
            },
            StandingsQuery {
                sort: Some("handicap".into()),
                ..StandingsQuery::default()
            },
            StandingsQuery {
                direction: Some("up".into()),
                ..StandingsQuery::default()
            },
        ] {
            let err = service.standings(&admin(), query).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[actix_web::test]
    async fn test_delete_team_removes_roster_and_scores() {
        let service = service();
        let round = seed_round(&service, 18).await;
        let team_id = service.list_teams().await.unwrap()[0].team.id;
        service
            .ingest_scores(&admin(), submission(&round, &[(1, 4), (2, 5)]))
            .await
            .unwrap();

        service.delete_team(&admin(), team_id).await.unwrap();

        assert!(service.list_teams().await.unwrap().is_empty());
        assert!(service
            .list_scores(round.tournament_id, None)
            .await
            .unwrap()
            .is_empty());
        let err = service.get_team(team_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { entity: "team", .. }));
        let err = service.delete_team(&admin(), team_id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[actix_web::test]
    async fn test_overview_shows_next_tournament_and_top_three() {
        let service = service();
        let caller = admin();
        let round = seed_round(&service, 18).await;
        let course_id = service.list_courses().await.unwrap()[0].id;

        let mut team_ids = vec![service.list_teams().await.unwrap()[0].team.id];
        for name in ["Birdie Bandits", "Fairway Legends", "Bunker Busters"] {
            let team = service
                .create_team(
                    &caller,
                    TeamRequest {
                        name: name.into(),
                        logo_url: None,
                    },
                )
                .await
                .unwrap();
            team_ids.push(team.id);
        }
        for (winner, loser) in [(0, 1), (0, 2), (1, 2), (0, 3), (1, 3), (2, 3)] {
            service
                .record_match_result(
                    &caller,
                    round.tournament_id,
                    MatchResultRequest {
                        winner_team_id: team_ids[winner],
                        loser_team_id: team_ids[loser],
                    },
                )
                .await
                .unwrap();
        }
        service
            .complete_tournament(&caller, round.tournament_id)
            .await
            .unwrap();

        let later = service
            .create_tournament(
                &caller,
                TournamentRequest {
                    name: "Autumn Classic".into(),
                    course_id,
                    date: NaiveDate::from_ymd_opt(2025, 10, 12).unwrap(),
                },
            )
            .await
            .unwrap();
        let sooner = service
            .create_tournament(
                &caller,
                TournamentRequest {
                    name: "Summer Scramble".into(),
                    course_id,
                    date: NaiveDate::from_ymd_opt(2025, 7, 6).unwrap(),
                },
            )
            .await
            .unwrap();

        let overview = service.league_overview(&caller).await.unwrap();
        assert_eq!(
            overview.upcoming_tournament.map(|t| t.id),
            Some(sooner.id)
        );
        let top: Vec<Uuid> = overview.top_teams.iter().map(|r| r.row.entity_id).collect();
        assert_eq!(top, team_ids[..3].to_vec());

        let upcoming = service
            .list_tournaments(TournamentFilter::Upcoming)
            .await
            .unwrap();
        assert_eq!(
            upcoming.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![sooner.id, later.id]
        );
        let past = service.list_tournaments(TournamentFilter::Past).await.unwrap();
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].id, round.tournament_id);
    }

    #[actix_web::test]
    async fn test_course_validation() {
        let service = service();
        for (par, holes) in [(0, 18), (72, 0), (72, 37)] {
            let err = service
                .create_course(
                    &admin(),
                    CourseRequest {
                        name: "Links".into(),
                        location: None,
                        par,
                        holes,
                        difficulty: None,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }
}
