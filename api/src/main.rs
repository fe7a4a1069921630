use std::sync::Arc;

use actix_web::{web, HttpServer};
use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use fc_api::{create_app, AppState};
use fc_core::{
    CredentialStore, InMemoryCredentialStore, InMemoryRefreshTokenRepository, PasswordPolicy,
    RefreshTokenRepository, SessionService, SigningKeys, TokenCleanupConfig, TokenCleanupService,
    TokenService, TokenServiceConfig,
};
use fc_infra::{DatabasePool, PgCredentialStore, PgRefreshTokenRepository};
use fc_shared::{config::LogFormat, AppConfig, LoggingConfig};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_tracing(&config.logging);

    info!(environment = %config.environment, "Starting FitClub API server");

    let keys = SigningKeys::from_config(&config.auth.jwt).context("invalid JWT_SECRET")?;
    if config.auth.jwt.is_using_default_secret() {
        if config.environment.is_production() {
            bail!("JWT_SECRET must be set in production");
        }
        warn!("Using the default development signing secret");
    }

    if std::env::var("DATABASE_URL").is_ok() {
        let pool = DatabasePool::new(config.database.clone())
            .await
            .context("failed to connect to the database")?;
        if config.database.run_migrations {
            pool.run_migrations()
                .await
                .context("failed to run database migrations")?;
        }
        info!("{}", pool.get_statistics());

        let repository = Arc::new(PgRefreshTokenRepository::new(pool.get_pool().clone()));
        let credentials = Arc::new(PgCredentialStore::new(
            pool.get_pool().clone(),
            PasswordPolicy::from(&config.auth.password),
        ));
        serve(config, keys, repository, credentials).await
    } else {
        if config.environment.is_production() {
            bail!("DATABASE_URL must be set in production");
        }
        warn!("DATABASE_URL not set, sessions are kept in memory only");

        let repository = Arc::new(InMemoryRefreshTokenRepository::new());
        let credentials = Arc::new(
            InMemoryCredentialStore::new()
                .with_policy(PasswordPolicy::from(&config.auth.password))
                .with_cost(bcrypt::DEFAULT_COST),
        );
        serve(config, keys, repository, credentials).await
    }
}

async fn serve<R, C>(
    config: AppConfig,
    keys: SigningKeys,
    repository: Arc<R>,
    credentials: Arc<C>,
) -> anyhow::Result<()>
where
    R: RefreshTokenRepository + 'static,
    C: CredentialStore + 'static,
{
    let cleanup = Arc::new(TokenCleanupService::new(
        Arc::clone(&repository),
        TokenCleanupConfig::from(&config.auth.purge),
    ));
    let _purge_task = cleanup.start_background_task();

    let tokens = Arc::new(TokenService::new(
        repository,
        Arc::clone(&credentials),
        keys,
        TokenServiceConfig::from(&config.auth.jwt),
    ));
    let state = web::Data::new(AppState::new(SessionService::new(tokens, credentials)));

    let bind_address = config.server.bind_address();
    info!("Server will bind to: {}", bind_address);

    let server_config = config.server.clone();
    let cors_config = config.cors.clone();
    let mut server = HttpServer::new(move || {
        create_app(state.clone(), &server_config, &cors_config)
    })
    .keep_alive(std::time::Duration::from_secs(config.server.keep_alive));
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_address)
        .with_context(|| format!("failed to bind {}", bind_address))?
        .run()
        .await
        .context("server error")
}

/// `RUST_LOG` wins over the configured level
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},actix_web=info", logging.level)));

    let builder = fmt()
        .with_env_filter(filter)
        .with_file(logging.source_location)
        .with_line_number(logging.source_location);

    match logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
