use pg_realtime::config::{Config, ParseFailurePolicy, PostgresConfig, SubscriptionConfig};
use std::env;

/// Get test configuration from environment variables
pub fn get_test_config() -> Config {
    // Use TEST_ prefix for test environment variables
    let postgres = PostgresConfig {
        host: env::var("TEST_PG_HOST").unwrap_or_else(|_| "localhost".to_string()),
        port: env::var("TEST_PG_PORT")
            .unwrap_or_else(|_| "5432".to_string())
            .parse()
            .unwrap_or(5432),
        database: env::var("TEST_PG_DATABASE").unwrap_or_else(|_| "postgres".to_string()),
        username: env::var("TEST_PG_USERNAME").unwrap_or_else(|_| "postgres".to_string()),
        password: env::var("TEST_PG_PASSWORD").unwrap_or_else(|_| "postgres".to_string()),
        connect_timeout_secs: 30,
    };

    let subscription = SubscriptionConfig {
        slot_name: format!("test_slot_{}", std::process::id()),
        poll_interval_ms: 50,
        max_changes: None,
        create_slot: true,
        drop_slot_on_exit: true,
        on_parse_failure: ParseFailurePolicy::Abort,
        max_buffer_size: 100,
    };

    Config {
        postgres,
        subscription,
    }
}
