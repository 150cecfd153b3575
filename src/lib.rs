pub mod auditor;
pub mod config;
pub mod error;
pub mod generation;
pub mod interpret;
pub mod metrics;
pub mod prompt;

// Load env from a simple, standardized location resolution.
// This uses dotenvy::dotenv().ok() which loads .env if present and silently ignores if missing.
pub fn load_env() {
    let _ = dotenvy::dotenv();
}
