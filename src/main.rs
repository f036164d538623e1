use std::{process, sync::Arc};

use participant_cache::{
    application::error::AppError,
    cache::{CacheConfig, CacheKey, ParticipantCache},
    config::{self, Command},
    domain::ParticipantId,
    infra::{
        db::{PostgresKvStore, PostgresRepositories},
        error::InfraError,
        telemetry,
    },
};
use time::format_description::well_known::Rfc3339;
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_max_level(Level::ERROR)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let repositories = init_repositories(&settings).await?;
    let store = Arc::new(repositories.kv_store());
    let cache = ParticipantCache::new(
        CacheConfig::from(&settings.cache),
        store.clone(),
        Arc::new(repositories.clone()),
    );

    match cli_args.command {
        Command::Get(args) => run_get(&cache, args.id).await,
        Command::Inspect(args) => run_inspect(&cache, &store, args.id).await,
        Command::Clear(args) => {
            cache.clear_cache(ParticipantId::new(args.id)).await;
            println!("cleared group {}", cache.group_of(ParticipantId::new(args.id)));
            Ok(())
        }
        Command::MarkStale(args) => {
            cache.is_now_stale(ParticipantId::new(args.id)).await;
            println!("marked group {} stale", cache.group_of(ParticipantId::new(args.id)));
            Ok(())
        }
        Command::Flush => {
            cache.make_all_stale().await;
            println!("all groups marked stale");
            Ok(())
        }
        Command::PurgeExpired => {
            let removed = store
                .purge_expired()
                .await
                .map_err(|err| InfraError::database(err.to_string()))?;
            info!(removed, "Expired cache entries purged");
            println!("removed {removed} expired entries");
            Ok(())
        }
        Command::Migrate => {
            PostgresRepositories::run_migrations(repositories.pool())
                .await
                .map_err(InfraError::from)?;
            println!("migrations applied");
            Ok(())
        }
    }
}

async fn init_repositories(settings: &config::Settings) -> Result<PostgresRepositories, AppError> {
    let database_url = settings.database.url.as_deref().ok_or_else(|| {
        AppError::from(InfraError::configuration(
            "database.url must be set (config file, PDB__DATABASE__URL or --database-url)",
        ))
    })?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(InfraError::from)?;

    Ok(PostgresRepositories::new(pool))
}

async fn run_get(cache: &ParticipantCache, id: i64) -> Result<(), AppError> {
    let record = cache
        .try_get_participant(ParticipantId::new(id))
        .await?
        .ok_or(AppError::NotFound)?;

    let rendered = serde_json::to_string_pretty(&record)
        .map_err(|err| AppError::unexpected(format!("failed to render record: {err}")))?;
    println!("{rendered}");
    Ok(())
}

async fn run_inspect(
    cache: &ParticipantCache,
    store: &PostgresKvStore,
    id: i64,
) -> Result<(), AppError> {
    let id = ParticipantId::new(id);
    let group = cache.group_of(id);
    let key = CacheKey::GroupSnapshot(group).render(&cache.config().key_prefix);

    let expires_at = store
        .expires_at(&key)
        .await
        .map_err(|err| InfraError::database(err.to_string()))?;

    println!("id:       {id}");
    println!("group:    {group}");
    println!("key:      {key}");
    match expires_at {
        Some(at) => {
            let formatted = at
                .format(&Rfc3339)
                .map_err(|err| AppError::unexpected(err.to_string()))?;
            println!("snapshot: cached, expires {formatted}");
        }
        None => println!("snapshot: not cached"),
    }
    Ok(())
}
