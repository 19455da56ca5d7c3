use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use tracing::level_filters::LevelFilter;

use terraform_provider_bitrise::api::{ClientFactory, OpContext};
use terraform_provider_bitrise::config::{ProviderConfig, ProviderModel, UserDefaults};
use terraform_provider_bitrise::framework::{Diagnostics, DynDataSource, DynResource};
use terraform_provider_bitrise::provider::{self, BitriseProvider};

/// Drive the Bitrise provider's resources and data sources from the shell
///
/// Documents are JSON objects keyed by attribute name. Pass `-` to read a
/// document from stdin. Results go to stdout, diagnostics to stderr.
#[derive(Parser, Debug)]
#[command(name = "terraform-provider-bitrise", version, about, long_about = None)]
struct Args {
    /// Bitrise API endpoint
    #[arg(long, global = true, env = "BITRISE_ENDPOINT")]
    endpoint: Option<String>,

    /// Bitrise personal access token
    #[arg(long, global = true, env = "BITRISE_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Per-operation timeout in seconds (0 disables it)
    #[arg(long, global = true, default_value_t = 60)]
    timeout: u64,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the provider, resource and data-source schemas
    Schema,
    /// Validate a proposed configuration and compute the planned state
    Plan {
        type_name: String,
        #[arg(long)]
        proposed: String,
        #[arg(long)]
        prior: Option<String>,
    },
    /// Create a resource from a planned state
    Create {
        type_name: String,
        #[arg(long)]
        plan: String,
    },
    /// Refresh a resource; prints `null` when it no longer exists
    Read {
        type_name: String,
        #[arg(long)]
        state: String,
    },
    /// Update a resource in place
    Update {
        type_name: String,
        #[arg(long)]
        prior: String,
        #[arg(long)]
        plan: String,
    },
    /// Delete a resource
    Delete {
        type_name: String,
        #[arg(long)]
        state: String,
    },
    /// Seed state from an import identifier
    Import { type_name: String, id: String },
    /// Read a data source
    Data {
        type_name: String,
        #[arg(long)]
        config: String,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Schema => "schema",
            Command::Plan { .. } => "plan",
            Command::Create { .. } => "create",
            Command::Read { .. } => "read",
            Command::Update { .. } => "update",
            Command::Delete { .. } => "delete",
            Command::Import { .. } => "import",
            Command::Data { .. } => "data",
        }
    }

    /// Plan, import and schema never touch the network
    fn calls_api(&self) -> bool {
        !matches!(self, Command::Schema | Command::Plan { .. } | Command::Import { .. })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Append logs to a file; stdout carries the JSON result and stderr the diagnostics
fn setup_logging(level: LogLevel) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = LevelFilter::from(level);
    if filter == LevelFilter::OFF {
        return None;
    }

    let log_path = log_file_path();
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = match std::fs::OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: logging disabled, cannot open {}: {}", log_path.display(), e);
            return None;
        }
    };

    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    Some(guard)
}

/// `<config_dir>/terraform-provider-bitrise/provider.log`, next to the defaults file
fn log_file_path() -> PathBuf {
    UserDefaults::config_path()
        .and_then(|p| p.parent().map(|dir| dir.join("provider.log")))
        .unwrap_or_else(|| PathBuf::from("terraform-provider-bitrise.log"))
}

/// Read a JSON document from a file, or stdin for `-`
fn read_document(source: &str) -> Result<Value> {
    let raw = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read document from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read document {}", source))?
    };

    serde_json::from_str(&raw).with_context(|| format!("Document {} is not valid JSON", source))
}

/// What a command produced: an optional JSON result plus diagnostics
struct Outcome {
    output: Option<Value>,
    diagnostics: Diagnostics,
}

impl Outcome {
    fn output(value: Value) -> Self {
        Self {
            output: Some(value),
            diagnostics: Diagnostics::new(),
        }
    }

    fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            output: None,
            diagnostics,
        }
    }

    fn from_result(result: std::result::Result<Value, Diagnostics>) -> Self {
        match result {
            Ok(value) => Self::output(value),
            Err(diagnostics) => Self::failed(diagnostics),
        }
    }
}

fn resource<'a>(provider: &'a BitriseProvider, type_name: &str) -> Result<&'a dyn DynResource> {
    provider.resource(type_name).ok_or_else(|| {
        let known: Vec<_> = provider.resource_types().collect();
        anyhow!("Unknown resource type {:?}; expected one of: {}", type_name, known.join(", "))
    })
}

fn data_source<'a>(provider: &'a BitriseProvider, type_name: &str) -> Result<&'a dyn DynDataSource> {
    provider.data_source(type_name).ok_or_else(|| {
        let known: Vec<_> = provider.data_source_types().collect();
        anyhow!("Unknown data source type {:?}; expected one of: {}", type_name, known.join(", "))
    })
}

async fn run(provider: &BitriseProvider, ctx: &OpContext, command: Command) -> Result<Outcome> {
    let outcome = match command {
        Command::Schema => Outcome::output(serde_json::to_value(provider.schemas())?),
        Command::Plan {
            type_name,
            proposed,
            prior,
        } => {
            let resource = resource(provider, &type_name)?;
            let proposed = read_document(&proposed)?;
            let prior = prior.as_deref().map(read_document).transpose()?;

            let mut diagnostics = resource.validate(&proposed);
            if diagnostics.has_error() {
                return Ok(Outcome::failed(diagnostics));
            }

            match resource.plan(prior.as_ref(), proposed) {
                Ok(change) => {
                    let mut outcome = Outcome::output(serde_json::to_value(change)?);
                    outcome.diagnostics = diagnostics;
                    outcome
                }
                Err(errors) => {
                    diagnostics.extend(errors);
                    Outcome::failed(diagnostics)
                }
            }
        }
        Command::Create { type_name, plan } => {
            let resource = resource(provider, &type_name)?;
            let plan = read_document(&plan)?;
            Outcome::from_result(resource.create(ctx, plan).await)
        }
        Command::Read { type_name, state } => {
            let resource = resource(provider, &type_name)?;
            let state = read_document(&state)?;
            match resource.read(ctx, state).await {
                Ok(state) => Outcome::output(state.unwrap_or(Value::Null)),
                Err(diagnostics) => Outcome::failed(diagnostics),
            }
        }
        Command::Update {
            type_name,
            prior,
            plan,
        } => {
            let resource = resource(provider, &type_name)?;
            let prior = read_document(&prior)?;
            let plan = read_document(&plan)?;
            Outcome::from_result(resource.update(ctx, prior, plan).await)
        }
        Command::Delete { type_name, state } => {
            let resource = resource(provider, &type_name)?;
            let state = read_document(&state)?;
            match resource.delete(ctx, state).await {
                Ok(()) => Outcome {
                    output: None,
                    diagnostics: Diagnostics::new(),
                },
                Err(diagnostics) => Outcome::failed(diagnostics),
            }
        }
        Command::Import { type_name, id } => {
            let resource = resource(provider, &type_name)?;
            Outcome::from_result(resource.import_state(&id))
        }
        Command::Data { type_name, config } => {
            let data_source = data_source(provider, &type_name)?;
            let config = read_document(&config)?;

            let diagnostics = data_source.validate(&config);
            if diagnostics.has_error() {
                return Ok(Outcome::failed(diagnostics));
            }

            let mut outcome = Outcome::from_result(data_source.read(ctx, config).await);
            let mut all = diagnostics;
            all.extend(outcome.diagnostics);
            outcome.diagnostics = all;
            outcome
        }
    };

    Ok(outcome)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level);

    let timeout = (args.timeout > 0).then(|| Duration::from_secs(args.timeout));
    let model = ProviderModel {
        endpoint: args.endpoint,
        token: args.token,
    };
    let config = ProviderConfig::resolve(&model);
    tracing::info!(
        version = provider::VERSION,
        command = args.command.name(),
        endpoint = config.endpoint(),
        has_token = config.has_token(),
        timeout_secs = args.timeout,
        "starting"
    );
    if !config.has_token() && args.command.calls_api() {
        tracing::warn!("no token configured; the API will reject the request");
    }

    let factory = ClientFactory::new(config).with_timeout(timeout);
    let provider = BitriseProvider::with_factory(factory);

    let ctx = BitriseProvider::op_context(timeout);
    let cancel = ctx.cancellation_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling in-flight request");
            cancel.cancel();
        }
    });

    let outcome = run(&provider, &ctx, args.command).await?;

    for diagnostic in &outcome.diagnostics {
        eprintln!("{}\n", diagnostic);
    }

    if let Some(output) = &outcome.output {
        println!(
            "{}",
            serde_json::to_string_pretty(output).context("Failed to render output")?
        );
    }

    if outcome.diagnostics.has_error() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
