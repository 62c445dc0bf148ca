//! Churn authority daemon
//!
//! Serves admission decisions for the quorums listed in the membership file.

use churn_authority::{api, AuthorityConfig, ChurnAuthority, Membership, QuorumRegistry, StaticRanking};
use churn_core::KeyPair;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churn_authority=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting churn authority");

    let config = AuthorityConfig::from_env()?;

    let signing_key = match &config.signing_key_hex {
        Some(secret) => KeyPair::from_secret_hex(secret)?,
        None => {
            tracing::warn!("CHURN_SIGNING_KEY not set, using an ephemeral signing key");
            KeyPair::generate()
        }
    };

    let membership = Membership::load(&config.membership_file)?;
    let ranking = Arc::new(StaticRanking::from_membership(&membership));
    let registry = QuorumRegistry::new(membership.capacities(), ranking);
    let authority = Arc::new(ChurnAuthority::new(signing_key, registry, &config)?);

    tracing::info!("  API: http://{}", config.api_addr);
    tracing::info!("  Authority key: {}", authority.public_key());
    tracing::info!("  Quorums: {}", membership.quorums.len());
    tracing::info!("  Approval window: {:?}", config.approval_window);

    let app = api::build_router(authority);
    let listener = tokio::net::TcpListener::bind(config.api_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
