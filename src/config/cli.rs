use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the participant-cache binary.
#[derive(Debug, Parser)]
#[command(
    name = "participant-cache",
    version,
    about = "Inspect and invalidate the participant record cache"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "PDB_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print one participant record as JSON, reading through the cache.
    Get(IdArgs),
    /// Show which group an id belongs to and the state of its cache entries.
    Inspect(IdArgs),
    /// Delete the cached snapshot of the group owning an id.
    Clear(IdArgs),
    /// Flag the group owning an id as stale.
    #[command(name = "mark-stale")]
    MarkStale(IdArgs),
    /// Mark every group stale at once.
    Flush,
    /// Remove expired cache entries from the database.
    #[command(name = "purge-expired")]
    PurgeExpired,
    /// Apply pending database migrations.
    Migrate,
}

#[derive(Debug, Args, Clone)]
pub struct IdArgs {
    /// Participant id.
    #[arg(value_name = "ID", allow_negative_numbers = true)]
    pub id: i64,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL", global = true)]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT", global = true)]
    pub database_max_connections: Option<u32>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// Override the number of ids per cache group.
    #[arg(long = "group-size", value_name = "COUNT", global = true)]
    pub group_size: Option<u64>,

    /// Override the cache entry lifetime.
    #[arg(long = "ttl-seconds", value_name = "SECONDS", global = true)]
    pub ttl_seconds: Option<u64>,
}
