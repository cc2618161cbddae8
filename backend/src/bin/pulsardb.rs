//! PulsarDB command-line tool
//!
//! Queries and updates a pulsar observation database kept in a JSON snapshot.
//!
//! # Usage
//!
//! ```bash
//! # Who else observed J0406+30 in February 2022?
//! pulsardb --snapshot db.json observations --pulsar J0406+30 \
//!     --min-time 2022-02-01 --max-time 2022-02-28 --format table
//!
//! # Record an observation (key from --key or PULSAR_API_KEY)
//! pulsardb --snapshot db.json add-observation --pulsar J0406+30 --telescope AO \
//!     --frequency "430 MHz" --project P2780 --submitter someone \
//!     --start 2022-02-01T00:00 --duration 3600
//! ```
//!
//! # Environment Variables
//!
//! - `PULSAR_API_KEY`: Default API key for mutating commands
//! - `PULSARDB_SNAPSHOT`: Snapshot file when `--snapshot` is not given
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use pulsardb::db::{FullRepository, LocalRepository, RepositoryConfig, RepositoryFactory};
use pulsardb::format::OutputFormat;
use pulsardb::models::{CatalogKind, EntityKind};
use pulsardb::query::Params;
use pulsardb::services::{Posted, PulsarDb};

#[derive(Parser)]
#[command(name = "pulsardb")]
#[command(about = "Pulsar observation database query tool", long_about = None)]
struct Cli {
    /// JSON snapshot holding the database (created on first write).
    #[arg(long, global = true, env = "PULSARDB_SNAPSHOT")]
    snapshot: Option<PathBuf>,

    /// Configuration file (default: pulsardb.toml in the usual locations).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API key for mutating commands; overrides the configured default.
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query observations.
    Observations(ObservationQuery),
    /// Query pulsars.
    Pulsars {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        name_contains: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        format: Option<String>,
    },
    /// Query telescopes.
    Telescopes {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        format: Option<String>,
    },
    /// Add a pulsar.
    AddPulsar {
        #[arg(long)]
        name: String,
        /// Right ascension in degrees.
        #[arg(long, allow_hyphen_values = true)]
        ra: f64,
        /// Declination in degrees.
        #[arg(long, allow_hyphen_values = true)]
        dec: f64,
        #[arg(long = "alias")]
        aliases: Vec<String>,
    },
    /// Add a telescope.
    AddTelescope {
        #[arg(long)]
        name: String,
        #[arg(long = "alias")]
        aliases: Vec<String>,
        #[arg(long = "receiver")]
        receivers: Vec<String>,
        #[arg(long = "backend")]
        backends: Vec<String>,
    },
    /// Add an alias to an existing pulsar or telescope.
    AddAlias {
        /// `pulsar` or `telescope`.
        #[arg(long)]
        kind: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        alias: String,
    },
    /// Record an observation.
    AddObservation(NewObservationArgs),
    /// Find the telescope hosting a receiver/backend pair.
    InferTelescope {
        #[arg(long)]
        receiver: String,
        #[arg(long)]
        backend: String,
    },
}

#[derive(Args)]
struct ObservationQuery {
    #[arg(long)]
    pulsar: Vec<String>,
    #[arg(long)]
    pulsar_contains: Option<String>,
    #[arg(long)]
    project: Vec<String>,
    #[arg(long)]
    min_time: Option<String>,
    #[arg(long)]
    max_time: Option<String>,
    #[arg(long)]
    min_frequency: Option<String>,
    #[arg(long)]
    max_frequency: Option<String>,
    #[arg(long)]
    backend: Vec<String>,
    #[arg(long)]
    receiver: Vec<String>,
    #[arg(long)]
    telescope: Vec<String>,
    #[arg(long)]
    telescopes: Vec<String>,
    #[arg(long, allow_hyphen_values = true)]
    sort: Option<String>,
    #[arg(long)]
    format: Option<String>,
}

#[derive(Args)]
struct NewObservationArgs {
    #[arg(long)]
    pulsar: String,
    #[arg(long)]
    telescope: String,
    /// Frequency, e.g. `1400`, `1400 MHz`, `1.4GHz`.
    #[arg(long)]
    frequency: String,
    #[arg(long)]
    project: String,
    #[arg(long)]
    submitter: String,
    #[arg(long)]
    start: String,
    #[arg(long)]
    stop: Option<String>,
    /// Length in seconds, used when `--stop` is omitted.
    #[arg(long)]
    duration: Option<f64>,
    #[arg(long)]
    backend: Option<String>,
    #[arg(long)]
    receiver: Option<String>,
    #[arg(long)]
    notes: Option<String>,
}

fn push_opt(params: &mut Params, key: &str, value: Option<String>) {
    if let Some(v) = value {
        params.push(key, v);
    }
}

fn push_all(params: &mut Params, key: &str, values: Vec<String>) {
    for v in values {
        params.push(key, v);
    }
}

impl ObservationQuery {
    fn into_params(self) -> (Params, Option<String>) {
        let mut params = Params::new();
        push_all(&mut params, "pulsar", self.pulsar);
        push_opt(&mut params, "pulsar_contains", self.pulsar_contains);
        push_all(&mut params, "project", self.project);
        push_opt(&mut params, "min_time", self.min_time);
        push_opt(&mut params, "max_time", self.max_time);
        push_opt(&mut params, "min_frequency", self.min_frequency);
        push_opt(&mut params, "max_frequency", self.max_frequency);
        push_all(&mut params, "backend", self.backend);
        push_all(&mut params, "receiver", self.receiver);
        push_all(&mut params, "telescope", self.telescope);
        push_all(&mut params, "telescopes", self.telescopes);
        push_opt(&mut params, "sort", self.sort);
        (params, self.format)
    }
}

impl NewObservationArgs {
    fn into_fields(self) -> Params {
        let mut fields = Params::new()
            .with("pulsar", self.pulsar)
            .with("telescope", self.telescope)
            .with("frequency", self.frequency)
            .with("project", self.project)
            .with("submitter", self.submitter)
            .with("start", self.start);
        push_opt(&mut fields, "stop", self.stop);
        if let Some(seconds) = self.duration {
            fields.push("duration", qtty::Seconds::new(seconds));
        }
        push_opt(&mut fields, "backend", self.backend);
        push_opt(&mut fields, "receiver", self.receiver);
        push_opt(&mut fields, "notes", self.notes);
        fields
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<RepositoryConfig> {
    match path {
        Some(path) => RepositoryConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(RepositoryConfig::from_default_location()
            .context("loading pulsardb.toml from the working directory")?
            .unwrap_or_default()),
    }
}

fn parse_format(raw: Option<String>, default: OutputFormat) -> anyhow::Result<OutputFormat> {
    match raw {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(default),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let default_format = config.output_format()?;
    let credentials = config.credentials()?;

    let snapshot = cli.snapshot.clone().or_else(|| config.repository.snapshot.clone());
    let local: Option<Arc<LocalRepository>> = match &snapshot {
        Some(path) => Some(RepositoryFactory::open_snapshot(path)?),
        None => None,
    };
    let repository: Arc<dyn FullRepository> = match &local {
        Some(repo) => repo.clone(),
        None => RepositoryFactory::from_repository_config(&config).await?,
    };
    let db = PulsarDb::new(repository, credentials);
    let key = cli.key.as_deref();

    let posted = match cli.cmd {
        Commands::Observations(query) => {
            let (params, format) = query.into_params();
            let format = parse_format(format, default_format)?;
            println!("{}", db.observations().get(&params, format).await?);
            None
        }
        Commands::Pulsars {
            name,
            name_contains,
            sort,
            format,
        } => {
            let mut params = Params::new();
            push_opt(&mut params, "name", name);
            push_opt(&mut params, "name_contains", name_contains);
            push_opt(&mut params, "sort", sort);
            let format = parse_format(format, default_format)?;
            println!("{}", db.pulsars().get(&params, format).await?);
            None
        }
        Commands::Telescopes { name, sort, format } => {
            let mut params = Params::new();
            push_opt(&mut params, "name", name);
            push_opt(&mut params, "sort", sort);
            let format = parse_format(format, default_format)?;
            println!("{}", db.telescopes().get(&params, format).await?);
            None
        }
        Commands::AddPulsar {
            name,
            ra,
            dec,
            aliases,
        } => {
            let mut fields = Params::new()
                .with("name", name)
                .with("ra", ra)
                .with("dec", dec);
            push_all(&mut fields, "aliases", aliases);
            Some(db.post(EntityKind::Pulsar, &fields, key).await?)
        }
        Commands::AddTelescope {
            name,
            aliases,
            receivers,
            backends,
        } => {
            let mut fields = Params::new().with("name", name);
            push_all(&mut fields, "aliases", aliases);
            push_all(&mut fields, "receivers", receivers);
            push_all(&mut fields, "backends", backends);
            Some(db.post(EntityKind::Telescope, &fields, key).await?)
        }
        Commands::AddAlias { kind, name, alias } => {
            let kind = match kind.to_ascii_lowercase().as_str() {
                "pulsar" => CatalogKind::Pulsar,
                "telescope" => CatalogKind::Telescope,
                other => anyhow::bail!("unknown kind '{}' (expected pulsar or telescope)", other),
            };
            let canonical = match kind {
                CatalogKind::Pulsar => db.pulsars().add_alias(&name, &alias, key).await?,
                CatalogKind::Telescope => db.telescopes().add_alias(&name, &alias, key).await?,
            };
            info!("{} '{}' is now also known as '{}'", kind, canonical, alias);
            save(local.as_deref(), snapshot.as_ref())?;
            None
        }
        Commands::AddObservation(args) => {
            Some(db.post(EntityKind::Observation, &args.into_fields(), key).await?)
        }
        Commands::InferTelescope { receiver, backend } => {
            match db.telescopes().infer(&receiver, &backend).await? {
                Some(telescope) => println!("{}", telescope.name),
                None => warn!("No telescope hosts {} with {}", receiver, backend),
            }
            None
        }
    };

    if let Some(posted) = posted {
        println!("{}", serde_json::to_string_pretty(&posted)?);
        save(local.as_deref(), snapshot.as_ref())?;
        if let Posted::Observation(obs) = &posted {
            info!("Observation {} stored", obs.id);
        }
    }

    Ok(())
}

fn save(local: Option<&LocalRepository>, path: Option<&PathBuf>) -> anyhow::Result<()> {
    match (local, path) {
        (Some(repo), Some(path)) => {
            repo.save_snapshot(path)
                .with_context(|| format!("saving {}", path.display()))?;
            info!("Saved snapshot {}", path.display());
        }
        _ => warn!("No snapshot configured; changes are not persisted"),
    }
    Ok(())
}
