//! Server configuration from environment variables.
//!
//! Everything has a default so a bare `manhunt` starts a playable
//! server. Env vars:
//!
//!   BIND_ADDR                 listen address (default 0.0.0.0:5000)
//!   SECRET_KEY                JWT HMAC secret (default: random per process)
//!   ACCESS_TOKEN_EXPIRATION   access token TTL, seconds (default 900)
//!   REFRESH_TOKEN_EXPIRATION  refresh token TTL, seconds (default 2592000)
//!   USERS                     comma-separated player names
//!   PASSWORDS                 comma-separated passwords, paired by position
//!   ELIMINATION_RADIUS_M      capture radius, meters (default 1.0)
//!   GAME_DURATION_SECS        game length, seconds (default 300)

use std::time::Duration;

use rand::Rng;

use manhunt_engine::GameConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
const DEFAULT_ACCESS_TTL_SECS: u64 = 900;
const DEFAULT_REFRESH_TTL_SECS: u64 = 2_592_000;
const DEFAULT_USERS: &str = "Elon Musk,Bill Gates,Jeff Bezos";
const DEFAULT_PASSWORDS: &str = "Tesla,Clippy,BlueHorizon";

/// Everything the binary needs to assemble a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Shared HMAC secret for signing tokens.
    pub secret_key: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Player names allowed to log in, in id order.
    pub users: Vec<String>,
    /// Passwords for `users`, paired by position.
    pub passwords: Vec<String>,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            secret_key: generate_secret(),
            access_token_ttl: Duration::from_secs(DEFAULT_ACCESS_TTL_SECS),
            refresh_token_ttl: Duration::from_secs(DEFAULT_REFRESH_TTL_SECS),
            users: split_csv(DEFAULT_USERS),
            passwords: split_csv(DEFAULT_PASSWORDS),
            game: GameConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Builds the configuration from the environment, falling back to
    /// defaults (with a warning) for anything unset or unparsable.
    pub fn from_env() -> Self {
        let secret_key = match read_var("SECRET_KEY") {
            Some(secret) => secret,
            None => {
                tracing::warn!(
                    "SECRET_KEY not set; using a random per-process \
                     secret, tokens will not survive a restart"
                );
                generate_secret()
            }
        };

        let game = GameConfig {
            elimination_radius_m: parse_or(
                "ELIMINATION_RADIUS_M",
                read_var("ELIMINATION_RADIUS_M"),
                GameConfig::default().elimination_radius_m,
            ),
            duration: Duration::from_secs(parse_or(
                "GAME_DURATION_SECS",
                read_var("GAME_DURATION_SECS"),
                GameConfig::default().duration.as_secs(),
            )),
        };

        Self {
            bind_addr: read_var("BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            secret_key,
            access_token_ttl: Duration::from_secs(ttl_or(
                "ACCESS_TOKEN_EXPIRATION",
                read_var("ACCESS_TOKEN_EXPIRATION"),
                DEFAULT_ACCESS_TTL_SECS,
            )),
            refresh_token_ttl: Duration::from_secs(ttl_or(
                "REFRESH_TOKEN_EXPIRATION",
                read_var("REFRESH_TOKEN_EXPIRATION"),
                DEFAULT_REFRESH_TTL_SECS,
            )),
            users: read_var("USERS")
                .map(|raw| split_csv(&raw))
                .unwrap_or_else(|| split_csv(DEFAULT_USERS)),
            passwords: read_var("PASSWORDS")
                .map(|raw| split_csv(&raw))
                .unwrap_or_else(|| split_csv(DEFAULT_PASSWORDS)),
            game,
        }
    }

    /// Name/password pairs in id order.
    ///
    /// Extra entries on the longer side are dropped with a warning, so
    /// a misconfigured list never yields a passwordless account.
    pub fn credentials(&self) -> Vec<(String, String)> {
        if self.users.len() != self.passwords.len() {
            tracing::warn!(
                users = self.users.len(),
                passwords = self.passwords.len(),
                "USERS and PASSWORDS differ in length; extra entries ignored"
            );
        }
        self.users
            .iter()
            .cloned()
            .zip(self.passwords.iter().cloned())
            .collect()
    }
}

fn read_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn parse_or<T: std::str::FromStr + std::fmt::Display + Copy>(
    name: &str,
    raw: Option<String>,
    default: T,
) -> T {
    match raw {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(name, %raw, %default, "unparsable value, using default");
            default
        }),
    }
}

/// Like [`parse_or`] but treats zero as unset: a zero-second token
/// lifetime would make every token dead on arrival.
fn ttl_or(name: &str, raw: Option<String>, default: u64) -> u64 {
    let secs = parse_or(name, raw, default);
    if secs == 0 {
        tracing::warn!(name, default, "zero TTL, using default");
        default
    } else {
        secs
    }
}

fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Generates a random 64-character hex secret (256 bits).
fn generate_secret() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_playable() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:5000");
        assert_eq!(config.access_token_ttl, Duration::from_secs(900));
        assert_eq!(
            config.refresh_token_ttl,
            Duration::from_secs(2_592_000)
        );
        assert_eq!(config.users.len(), 3);
        assert_eq!(config.users[0], "Elon Musk");
        assert_eq!(config.passwords[2], "BlueHorizon");
        assert_eq!(config.game.elimination_radius_m, 1.0);
        assert_eq!(config.game.duration, Duration::from_secs(300));
    }

    #[test]
    fn test_parse_or_accepts_valid_values() {
        assert_eq!(parse_or("X", Some("42".into()), 7u64), 42);
        assert_eq!(parse_or("X", Some("2.5".into()), 1.0f64), 2.5);
    }

    #[test]
    fn test_parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or("X", Some("soon".into()), 7u64), 7);
        assert_eq!(parse_or("X", None, 7u64), 7);
    }

    #[test]
    fn test_ttl_or_treats_zero_as_unset() {
        assert_eq!(ttl_or("X", Some("0".into()), 900), 900);
        assert_eq!(ttl_or("X", Some("60".into()), 900), 60);
    }

    #[test]
    fn test_split_csv_trims_and_drops_empties() {
        assert_eq!(
            split_csv("Elon Musk, Bill Gates ,,Jeff Bezos,"),
            vec!["Elon Musk", "Bill Gates", "Jeff Bezos"]
        );
    }

    #[test]
    fn test_credentials_pairs_by_position() {
        let config = ServerConfig::default();
        let creds = config.credentials();
        assert_eq!(creds.len(), 3);
        assert_eq!(creds[0], ("Elon Musk".into(), "Tesla".into()));
        assert_eq!(creds[2], ("Jeff Bezos".into(), "BlueHorizon".into()));
    }

    #[test]
    fn test_credentials_truncates_mismatched_lists() {
        let config = ServerConfig {
            users: split_csv("a,b,c"),
            passwords: split_csv("1,2"),
            ..ServerConfig::default()
        };
        assert_eq!(
            config.credentials(),
            vec![("a".into(), "1".into()), ("b".into(), "2".into())]
        );
    }

    #[test]
    fn test_generated_secrets_are_long_and_distinct() {
        let a = generate_secret();
        let b = generate_secret();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
