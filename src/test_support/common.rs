use std::sync::{Arc, Once};
use std::time::Duration;

use jsonwebtoken::{encode, EncodingKey, Header};
use sea_orm::{ConnectOptions, DatabaseConnection};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::bootstrap::connect_with_options;
use crate::config::LeagueRules;
use crate::jwt::Claims;
use crate::league::LeagueService;
use crate::store::{LeagueStore, MemoryStore, SeaOrmStore};

static INIT: Once = Once::new();

/// Secret the test apps are configured with
pub const TEST_AUTH_SECRET: &str = "league-test-secret";

pub fn init_tracing_for_tests() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,actix_web=info,sea_orm=warn"));
        // another subscriber may already be installed by the harness
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_test_writer())
            .try_init();
    });
}

/// Test-only JWT helper that issues a signed JWT using the same algorithm and claims as production
pub fn test_issue_token(sub: &str, email: &str, role: Option<&str>, ttl_seconds: i64) -> String {
    let now = chrono::Utc::now();
    let iat = now.timestamp() as usize;
    let exp = (now.timestamp() + ttl_seconds) as usize;

    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        role: role.map(str::to_string),
        iat,
        exp,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_AUTH_SECRET.as_ref()),
    )
    .expect("Failed to encode JWT token for test")
}

/// `Authorization` header value for an admin caller
pub fn admin_bearer() -> String {
    let token = test_issue_token("admin-1", "admin@example.com", Some("admin"), 3600);
    format!("Bearer {token}")
}

/// `Authorization` header value for a non-admin caller
pub fn member_bearer() -> String {
    let token = test_issue_token("member-1", "member@example.com", None, 3600);
    format!("Bearer {token}")
}

/// Fresh in-memory SQLite database with the league schema applied.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn test_database() -> DatabaseConnection {
    init_tracing_for_tests();
    let mut options = ConnectOptions::new("sqlite::memory:".to_owned());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    connect_with_options(options)
        .await
        .expect("SQLite test database bootstrap failed")
}

/// League service over a fresh relational store
pub async fn test_sea_orm_service() -> (LeagueService, SeaOrmStore) {
    let store = SeaOrmStore::new(test_database().await);
    let service = service_over(Arc::new(store.clone()));
    (service, store)
}

/// League service over a fresh in-memory store
pub fn test_memory_service() -> LeagueService {
    init_tracing_for_tests();
    service_over(Arc::new(MemoryStore::new()))
}

fn service_over(store: Arc<dyn LeagueStore>) -> LeagueService {
    LeagueService::new(store, LeagueRules::default(), Duration::from_secs(5))
}
