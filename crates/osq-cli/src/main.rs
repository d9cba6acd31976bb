//! # osq
//!
//! - `osq query <resource> --where "<property> <preset> <args>"`: run a query.
//! - `osq check <name>`: run an anomaly check and file one ticket per match.
//! - `osq checks`, `osq presets`, `osq properties <resource>`: introspection.
//!
//! Queries go to the cloud endpoints in `osq.toml`, or to a JSON dump with
//! `--from-file`.

mod config;
mod openstack;
mod sink;

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use osq_core::{BoxError, Preset, ResourceType, ValueKind};
use osq_engine::{
    describe_type, dispatch, validate_checks, validate_registries, AuxiliaryLookup, Check, CheckParams,
    FilterSpec, MemoryLister, QueryRequest, QueryResults, ResourceLister, TicketSink,
};
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::Config;
use openstack::OpenStackClient;
use sink::{LogSink, ServiceDeskSink};

/// Query OpenStack resources with filter presets.
#[derive(Parser)]
#[command(name = "osq", version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, global = true, default_value = "osq.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List resources matching every filter.
    Query {
        /// Resource type (server, floating_ip, load_balancer, volume_snapshot, project, security_group_rule).
        resource: String,

        /// Filter as "<property> <preset> <args>"; args are JSON or a bare string.
        #[arg(long = "where", value_name = "FILTER")]
        filters: Vec<String>,

        /// Raw native filter passed to the listing call, as key=value.
        #[arg(long, value_name = "KEY=VALUE")]
        native: Vec<String>,

        /// Output properties, in order (default: the resource's default columns).
        #[arg(long, value_delimiter = ',')]
        select: Vec<String>,

        /// Group results by this property.
        #[arg(long)]
        group_by: Option<String>,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Evaluate every condition client-side, pushing nothing down.
        #[arg(long)]
        client_only: bool,

        /// Trust pushed-down conditions instead of re-checking them.
        #[arg(long)]
        no_recheck: bool,
    },

    /// Run an anomaly check and file one ticket per match.
    Check {
        /// Check name (see `osq checks`).
        name: String,

        /// Only look at this project.
        #[arg(long)]
        project: Option<String>,

        /// Age threshold override (minutes for deleting-servers, days otherwise).
        #[arg(long)]
        age: Option<u32>,

        /// Remote prefix a misapplied rule opens to.
        #[arg(long)]
        ip_prefix: Option<String>,

        /// Port range a misapplied rule opens.
        #[arg(long)]
        min_port: Option<u16>,
        #[arg(long)]
        max_port: Option<u16>,

        /// Log tickets instead of filing them.
        #[arg(long)]
        dry_run: bool,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// List the available checks.
    Checks,

    /// List every preset by kind.
    Presets,

    /// List a resource type's properties and the presets they accept.
    Properties { resource: String },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Boxed table style.
    #[arg(long)]
    pretty: bool,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Read resources from a JSON dump instead of the cloud.
    #[arg(long, value_name = "DUMP")]
    from_file: Option<PathBuf>,
}

// =============================================================================
// Backends
// =============================================================================

enum Backend {
    Dump(MemoryLister),
    Cloud(OpenStackClient),
}

impl Backend {
    fn open(source: &SourceArgs, config: &Config) -> Result<Self, BoxError> {
        match &source.from_file {
            Some(path) => Ok(Self::Dump(load_dump(path)?)),
            None => Ok(Self::Cloud(OpenStackClient::from_config(&config.cloud)?)),
        }
    }

    fn lister(&self) -> &dyn ResourceLister {
        match self {
            Self::Dump(m) => m,
            Self::Cloud(c) => c,
        }
    }

    fn lookup(&self) -> &dyn AuxiliaryLookup {
        match self {
            Self::Dump(m) => m,
            Self::Cloud(c) => c,
        }
    }
}

fn load_dump(path: &Path) -> Result<MemoryLister, BoxError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    let dump: Value = serde_json::from_str(&content)?;
    MemoryLister::from_dump(&dump)
}

// =============================================================================
// Argument parsing
// =============================================================================

/// JSON when it parses, otherwise the raw text as a string; empty is null.
fn parse_value(raw: &str) -> Value {
    let raw = raw.trim();
    if raw.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn parse_filter(raw: &str) -> Result<FilterSpec, String> {
    let raw = raw.trim();
    let (property, rest) = raw
        .split_once(char::is_whitespace)
        .ok_or_else(|| format!("filter '{}' must be \"<property> <preset> <args>\"", raw))?;
    let rest = rest.trim_start();
    let (preset, args) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
    Ok(FilterSpec::new(property, preset, parse_value(args)))
}

fn parse_native(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("native filter '{}' must be key=value", raw))?;
    Ok((key.trim().to_string(), parse_value(value)))
}

fn print_results(results: &QueryResults, output: &OutputArgs, config: &Config) -> Result<(), BoxError> {
    if output.json {
        println!("{}", serde_json::to_string_pretty(results)?);
    } else {
        println!("{}", results.render(output.pretty || config.query.pretty));
    }
    Ok(())
}

// =============================================================================
// Commands
// =============================================================================

fn run(cli: Cli) -> Result<(), BoxError> {
    validate_registries()?;
    validate_checks()?;
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Query {
            resource,
            filters,
            native,
            select,
            group_by,
            output,
            source,
            client_only,
            no_recheck,
        } => {
            let mut request = QueryRequest::new(resource.parse::<ResourceType>()?);
            for raw in &filters {
                request.filters.push(parse_filter(raw)?);
            }
            for raw in &native {
                let (key, value) = parse_native(raw)?;
                request.native.insert(key, value);
            }
            request.select = select;
            request.group_by = group_by;
            request.options = config.query.options();
            if client_only {
                request.options.server_side = false;
            }
            if no_recheck {
                request.options.client_side_recheck = false;
            }

            let backend = Backend::open(&source, &config)?;
            let results = request.execute(backend.lister(), backend.lookup())?;
            tracing::info!(resource = %request.resource, matched = results.len(), "query complete");
            print_results(&results, &output, &config)?;
        }

        Commands::Check {
            name,
            project,
            age,
            ip_prefix,
            min_port,
            max_port,
            dry_run,
            output,
            source,
        } => {
            let check: Check = name.parse()?;
            let params = CheckParams {
                project_id: project,
                age,
                ip_prefix,
                min_port,
                max_port,
            };
            check.validate(&params)?;

            let sink: Box<dyn TicketSink> = if dry_run {
                Box::new(LogSink)
            } else {
                Box::new(ServiceDeskSink::from_config(&config.tickets)?)
            };
            let backend = Backend::open(&source, &config)?;
            let report = check.run(
                &params,
                Utc::now(),
                config.query.options(),
                backend.lister(),
                backend.lookup(),
            )?;
            print_results(&report.results, &output, &config)?;

            let summary = dispatch(&report.tickets, sink.as_ref());
            eprintln!(
                "{}: {} matched, {} filed, {} failed",
                check,
                report.results.len(),
                summary.submitted,
                summary.failed
            );
            if summary.failed > 0 {
                return Err(format!("{} ticket(s) could not be filed", summary.failed).into());
            }
        }

        Commands::Checks => {
            for check in Check::ALL {
                println!("{:<26} {}", check.name(), check.description());
            }
        }

        Commands::Presets => {
            for kind in ValueKind::ALL {
                let names: Vec<&str> = Preset::of_kind(kind).iter().map(Preset::name).collect();
                println!("{:<9} {}", kind.to_string(), names.join(", "));
            }
        }

        Commands::Properties { resource } => {
            let resource: ResourceType = resource.parse()?;
            println!("{}", serde_json::to_string_pretty(&describe_type(resource))?);
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "osq=info,osq_engine=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
