//! Contact Discovery Server binary.
//!
//! Parses the command line, opens the hash database and serves the
//! registry over HTTP. Failing to open the database is fatal.

use std::path::PathBuf;

use clap::Parser;

use contact_discovery::config::{DEFAULT_MAX_HASH_LEN, DEFAULT_MIN_PREFIX_LEN};
use contact_discovery::{AppState, ServiceConfig};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "contact-discovery", version, about = "Contact Discovery Server")]
struct Args {
    /// Password required (via HTTP Basic auth) to add or delete hashes
    #[arg(env = "DISCOVERY_API_PASSWORD", hide_env_values = true)]
    api_password: String,

    /// The filename of the database file
    #[arg(short, long, default_value = "contacts.sqlite3", env = "DISCOVERY_DATABASE")]
    database: PathBuf,

    /// The minimum prefix length to accept
    #[arg(short = 'm', long, default_value_t = DEFAULT_MIN_PREFIX_LEN, env = "DISCOVERY_MIN_PREFIX_LENGTH")]
    prefix_length: usize,

    /// The length of the hash to return
    #[arg(short = 's', long, default_value_t = DEFAULT_MAX_HASH_LEN, env = "DISCOVERY_MAX_HASH_LENGTH")]
    hash_length: usize,

    /// The port to listen to
    #[arg(short, long, default_value_t = 8080, env = "DISCOVERY_PORT")]
    port: u16,

    /// Remove every stored hash and exit without serving
    #[arg(long)]
    clear: bool,
}

impl Args {
    fn into_config(self) -> ServiceConfig {
        ServiceConfig {
            port: self.port,
            database: self.database,
            min_prefix_len: self.prefix_length,
            max_hash_len: self.hash_length,
            api_password: self.api_password,
        }
    }
}

// ── Entry Point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contact_discovery=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let clear = args.clear;
    let config = args.into_config();

    tracing::info!(config = ?config, "Loaded configuration");

    let state = match AppState::open(&config) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start without the hash store");
            std::process::exit(1);
        }
    };

    if clear {
        match state.registry.clear_all() {
            Ok(removed) => {
                tracing::info!(removed = removed, "Hash store cleared");
                return;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to clear hash store");
                std::process::exit(1);
            }
        }
    }

    let app = contact_discovery::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Contact discovery server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::try_parse_from(["contact-discovery", "secret123"]).unwrap();
        assert!(!args.clear);

        let config = args.into_config();
        assert_eq!(config.api_password, "secret123");
        assert_eq!(config.database, PathBuf::from("contacts.sqlite3"));
        assert_eq!(config.min_prefix_len, 4);
        assert_eq!(config.max_hash_len, 20);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "contact-discovery",
            "-d",
            "/tmp/hashes.sqlite3",
            "-m",
            "6",
            "-s",
            "12",
            "-p",
            "9090",
            "--clear",
            "secret123",
        ])
        .unwrap();
        assert!(args.clear);

        let config = args.into_config();
        assert_eq!(config.database, PathBuf::from("/tmp/hashes.sqlite3"));
        assert_eq!(config.min_prefix_len, 6);
        assert_eq!(config.max_hash_len, 12);
        assert_eq!(config.port, 9090);
    }

    #[test]
    fn test_rejects_non_numeric_lengths() {
        assert!(Args::try_parse_from(["contact-discovery", "-m", "four", "secret123"]).is_err());
    }
}
