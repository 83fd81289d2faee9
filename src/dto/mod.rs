pub mod league_requests;
pub mod standings;
pub mod team_listing;
