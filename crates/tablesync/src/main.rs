//! tablesync CLI
//!
//! Command-line tool for synchronizing a MySQL schema with a declared table
//! list.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, debug, info};
use tracing_subscriber::FmtSubscriber;

use tablesync::config::{redact_url, DEFAULT_CONFIG_FILE};
use tablesync::prelude::*;

/// Declarative table synchronization for MySQL.
#[derive(Parser)]
#[command(name = "tablesync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file, relative to the project directory.
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Project directory; the script is written under it.
    #[arg(short, long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Database URL, overriding the configuration file.
    #[arg(long, global = true, env = "TABLESYNC_DATABASE_URL")]
    url: Option<String>,

    /// Database user name, overriding the configuration file.
    #[arg(long, global = true, env = "TABLESYNC_DATABASE_USERNAME")]
    username: Option<String>,

    /// Database password, overriding the configuration file.
    #[arg(long, global = true, env = "TABLESYNC_DATABASE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the schema script and optionally apply it.
    Sync {
        /// Execute the generated statements against the database.
        #[arg(long)]
        apply: bool,
    },

    /// Print the pending statements without writing the script.
    Plan {
        /// Print the statements as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the loaded tables and type mapping.
    ShowConfig,
}

impl Cli {
    /// Applies command-line database overrides to the loaded configuration.
    fn apply_overrides(&self, config: &mut SyncConfig) {
        if let Some(url) = &self.url {
            match &mut config.database {
                Some(db) => db.url.clone_from(url),
                None => config.database = Some(DatabaseConfig::new("mysql", url.as_str())),
            }
        }
        if let Some(db) = &mut config.database {
            if let Some(username) = &self.username {
                db.username = Some(username.clone());
            }
            if let Some(password) = &self.password {
                db.password = Some(password.clone());
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.project_dir.join(&cli.config);
    debug!(path = %config_path.display(), "Loading configuration");
    let mut config = SyncConfig::load(&config_path)?;
    cli.apply_overrides(&mut config);
    config.validate()?;

    let synchronizer = Synchronizer::new(MySqlConnector::new(), MySqlDialect::new())
        .database(config.database.clone())
        .type_mapper(config.type_mapper())
        .script_writer(ScriptWriter::new(&cli.project_dir, config.script_dir()));

    match cli.command {
        Commands::Sync { apply } => {
            let outcome = synchronizer.synchronize(&config.tables, apply).await?;
            match outcome {
                SyncOutcome::Skipped => {
                    info!("Nothing to do: no database configured.");
                }
                SyncOutcome::NoChanges => {
                    info!("Database schema is up to date.");
                }
                SyncOutcome::Written { script, statements } => {
                    println!(
                        "Wrote {} statement(s) to {}",
                        statements.len(),
                        script.display()
                    );
                    if statements.iter().any(Statement::is_destructive) {
                        println!("WARNING: the script drops columns. Review it before applying.");
                    }
                }
                SyncOutcome::Applied { script, statements } => {
                    println!(
                        "Applied {} statement(s); script saved to {}",
                        statements.len(),
                        script.display()
                    );
                }
            }
        }

        Commands::Plan { json } => match synchronizer.plan(&config.tables).await? {
            None => info!("Nothing to plan: no database configured."),
            Some(statements) if json => {
                println!("{}", serde_json::to_string_pretty(&statements)?);
            }
            Some(statements) if statements.is_empty() => {
                info!("Database schema is up to date.");
            }
            Some(statements) => {
                for stmt in &statements {
                    println!("{stmt}\n");
                }
            }
        },

        Commands::ShowConfig => {
            match &config.database {
                Some(db) => println!(
                    "Database: {} {} (user: {})",
                    db.driver,
                    redact_url(&db.url),
                    db.username.as_deref().unwrap_or("-")
                ),
                None => println!("Database: not configured"),
            }
            println!("Script: {}", synchronizer.script().path().display());

            let mapper = config.type_mapper();
            println!("\nType mapping:");
            println!("{:-<60}", "");
            for (logical, db_type) in mapper.iter() {
                println!(" {logical:<20} {db_type}");
            }

            println!("\nTables:");
            println!("{:-<60}", "");
            for table in &config.tables {
                let base = if table.use_base_entity { " +base" } else { "" };
                println!(" {} ({}){}", table.table_name, table.entity_name, base);
                for column in &table.columns {
                    println!(
                        "   {:<24} {:<16} {}",
                        column.db_name(),
                        mapper.resolve(&column.logical_type),
                        column.comment
                    );
                }
            }
            println!();
        }
    }

    Ok(())
}
