//! The manhunt server binary.
//!
//! Configuration comes entirely from the environment; see
//! [`ServerConfig`] for the variables and defaults. Runs one game
//! session until the process is killed.

use manhunt::prelude::*;

#[tokio::main]
async fn main() -> Result<(), ManhuntError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,manhunt=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env();

    let registry = CredentialRegistry::new(config.credentials());
    let issuer = TokenIssuer::new(
        config.secret_key.as_bytes(),
        config.access_token_ttl,
        config.refresh_token_ttl,
    );
    let auth = TokenAuthenticator::new(registry, issuer);

    let server = ManhuntServerBuilder::new()
        .config(config)
        .build(auth, MemoryStore::new())
        .await?;

    if let Ok(addr) = server.local_addr() {
        tracing::info!(%addr, "manhunt server ready");
    }
    server.run().await
}
