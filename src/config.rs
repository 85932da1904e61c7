// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Points added to the confusion score for every submitted attempt.
pub const ATTEMPT_WEIGHT: i64 = 20;

/// Elapsed time stops contributing to the confusion score after this many seconds.
pub const TIME_CAP_SECONDS: i64 = 60;

/// Upper bound of the confusion score.
pub const MAX_CONFUSION_SCORE: i64 = 100;

/// Help text and the video link are surfaced once the confusion score reaches this value.
pub const HELP_THRESHOLD: i64 = 40;

/// Base URL used to build the explanatory video link for a subject.
pub const VIDEO_SEARCH_BASE: &str = "https://www.youtube.com/results";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub seed_demo_subjects: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let cors_origins = env::var("CORS_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|_| {
                vec![
                    "http://localhost:3000".to_string(),
                    "http://127.0.0.1:3000".to_string(),
                ]
            });

        let seed_demo_subjects = env::var("SEED_DEMO_SUBJECTS")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            database_url,
            jwt_secret,
            rust_log,
            port,
            cors_origins,
            seed_demo_subjects,
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
