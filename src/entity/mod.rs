pub mod courses;
pub mod match_results;
pub mod players;
pub mod scores;
pub mod teams;
pub mod tournaments;

pub use courses::Entity as Courses;
pub use match_results::Entity as MatchResults;
pub use players::Entity as Players;
pub use scores::Entity as Scores;
pub use teams::Entity as Teams;
pub use tournaments::Entity as Tournaments;
