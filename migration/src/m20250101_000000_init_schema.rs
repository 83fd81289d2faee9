use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create teams table
        manager
            .create_table(
                Table::create()
                    .table(Teams::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Teams::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Teams::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Teams::LogoUrl).string().null())
                    .col(ColumnDef::new(Teams::Wins).integer().not_null().default(0))
                    .col(ColumnDef::new(Teams::Losses).integer().not_null().default(0))
                    .col(ColumnDef::new(Teams::CreatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Players reference teams without ON DELETE CASCADE; team deletion removes them explicitly
        manager
            .create_table(
                Table::create()
                    .table(Players::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Players::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Players::TeamId).uuid().not_null())
                    .col(ColumnDef::new(Players::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Players::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_players_team_id")
                            .from(Players::Table, Players::TeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create courses table
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Courses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Courses::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Courses::Location).string().null())
                    .col(ColumnDef::new(Courses::Par).integer().not_null())
                    .col(ColumnDef::new(Courses::Holes).integer().not_null())
                    .col(ColumnDef::new(Courses::Difficulty).string_len(10).null())
                    .to_owned(),
            )
            .await?;

        // Create tournaments table
        manager
            .create_table(
                Table::create()
                    .table(Tournaments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tournaments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tournaments::Name).string_len(100).not_null())
                    .col(ColumnDef::new(Tournaments::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Tournaments::Date).date().not_null())
                    .col(
                        ColumnDef::new(Tournaments::Completed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Tournaments::CompletedAt).timestamp_with_time_zone().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tournaments_course_id")
                            .from(Tournaments::Table, Tournaments::CourseId)
                            .to(Courses::Table, Courses::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Scores are keyed by (tournament, player, hole); the primary key backs upsert-on-conflict
        manager
            .create_table(
                Table::create()
                    .table(Scores::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Scores::TournamentId).uuid().not_null())
                    .col(ColumnDef::new(Scores::PlayerId).uuid().not_null())
                    .col(ColumnDef::new(Scores::HoleNumber).integer().not_null())
                    .col(ColumnDef::new(Scores::Strokes).integer().not_null())
                    .col(ColumnDef::new(Scores::UpdatedAt).timestamp_with_time_zone().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_scores")
                            .col(Scores::TournamentId)
                            .col(Scores::PlayerId)
                            .col(Scores::HoleNumber),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scores_tournament_id")
                            .from(Scores::Table, Scores::TournamentId)
                            .to(Tournaments::Table, Tournaments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_scores_player_id")
                            .from(Scores::Table, Scores::PlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_scores_player_id")
                    .table(Scores::Table)
                    .col(Scores::PlayerId)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        // Create match_results table
        manager
            .create_table(
                Table::create()
                    .table(MatchResults::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MatchResults::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(MatchResults::TournamentId).uuid().not_null())
                    .col(ColumnDef::new(MatchResults::WinnerTeamId).uuid().not_null())
                    .col(ColumnDef::new(MatchResults::LoserTeamId).uuid().not_null())
                    .col(ColumnDef::new(MatchResults::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_results_tournament_id")
                            .from(MatchResults::Table, MatchResults::TournamentId)
                            .to(Tournaments::Table, Tournaments::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_results_winner_team_id")
                            .from(MatchResults::Table, MatchResults::WinnerTeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_match_results_loser_team_id")
                            .from(MatchResults::Table, MatchResults::LoserTeamId)
                            .to(Teams::Table, Teams::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(MatchResults::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Scores::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Tournaments::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Players::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Teams::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Teams {
    Table,
    Id,
    Name,
    LogoUrl,
    Wins,
    Losses,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Players {
    Table,
    Id,
    TeamId,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Courses {
    Table,
    Id,
    Name,
    Location,
    Par,
    Holes,
    Difficulty,
}

#[derive(DeriveIden)]
enum Tournaments {
    Table,
    Id,
    Name,
    CourseId,
    Date,
    Completed,
    CompletedAt,
}

#[derive(DeriveIden)]
enum Scores {
    Table,
    TournamentId,
    PlayerId,
    HoleNumber,
    Strokes,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum MatchResults {
    Table,
    Id,
    TournamentId,
    WinnerTeamId,
    LoserTeamId,
    CreatedAt,
}
