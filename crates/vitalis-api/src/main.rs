use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vitalis_api::{serve, ApiContext, ServerConfig};
use vitalis_core::seed::seed_demo_catalog;
use vitalis_core::services::AuthService;
use vitalis_core::{Database, Pbkdf2Hasher, RandomTokenIssuer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let db = Database::open(&config.database)
        .with_context(|| format!("cannot open database {}", config.database.display()))?;
    let hasher = Arc::new(Pbkdf2Hasher::new());
    let issuer = Arc::new(RandomTokenIssuer);

    if let Some((email, password)) = config.admin_credentials() {
        let created = AuthService::new(&db, hasher.as_ref(), issuer.as_ref())
            .bootstrap_admin(&config.admin_name, email, password)
            .context("cannot create administrator account")?;
        if created {
            tracing::info!(email, "Administrator account created");
        }
    }

    if config.seed_demo {
        let summary =
            seed_demo_catalog(&db, hasher.as_ref()).context("cannot seed demo catalog")?;
        tracing::info!(?summary, "Demo catalog seeded");
    }

    let ctx = ApiContext::new(db, hasher, issuer).with_token_ttl(config.token_ttl());
    serve(ctx, config.bind).await
}
