use clap::{Parser, Subcommand, ValueEnum};
use pf_network::{Direction, NetworkResult, NetworkSystemResult};
use pf_project::{LoadedConfig, NetworkConfig, SystemConfig, load_file, load_system_file};
use pf_results::{ReportFormat, present_network, present_system, render, write_report};
use pf_solver::{NetworkSolver, NetworkSystemSolver};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(
    about = "Pipeflow CLI - steady-state pressure drop through piping networks",
    long_about = None
)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a config file and check it without solving
    Validate {
        /// Path to the YAML or JSON config
        config: PathBuf,
    },
    /// Solve a network (or a system document) and print the report
    Run {
        /// Path to the YAML or JSON config
        config: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        /// Override the configured calculation direction
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
        /// Write the report here instead of stdout; format from the extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Solve networks coupled through shared nodes
    System {
        /// Path to the YAML or JSON config
        config: PathBuf,
        #[arg(long, value_enum, default_value_t = FormatArg::Json)]
        format: FormatArg,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Json,
    Yaml,
}

impl From<FormatArg> for ReportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Json => ReportFormat::Json,
            FormatArg::Yaml => ReportFormat::Yaml,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DirectionArg {
    Forward,
    Backward,
}

impl From<DirectionArg> for Direction {
    fn from(d: DirectionArg) -> Self {
        match d {
            DirectionArg::Forward => Direction::Forward,
            DirectionArg::Backward => Direction::Backward,
        }
    }
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] pf_project::ConfigurationError),

    #[error(transparent)]
    Solver(#[from] pf_solver::SolverError),

    #[error(transparent)]
    Results(#[from] pf_results::ResultsError),
}

type CliResult<T> = Result<T, CliError>;

/// Where a rendered report goes.
struct Sink<'a> {
    format: ReportFormat,
    output: Option<&'a Path>,
}

impl Sink<'_> {
    fn emit<T: Serialize>(&self, report: &T) -> CliResult<()> {
        match self.output {
            Some(path) => {
                write_report(path, report)?;
                eprintln!("✓ Report written to {}", path.display());
            }
            None => println!("{}", render(report, self.format)?),
        }
        Ok(())
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Validate { config } => cmd_validate(&config),
        Commands::Run {
            config,
            format,
            direction,
            output,
        } => cmd_run(
            &config,
            direction.map(Direction::from),
            &Sink {
                format: format.into(),
                output: output.as_deref(),
            },
        ),
        Commands::System {
            config,
            format,
            output,
        } => cmd_system(
            &config,
            &Sink {
                format: format.into(),
                output: output.as_deref(),
            },
        ),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_validate(path: &Path) -> CliResult<()> {
    eprintln!("Validating config: {}", path.display());
    match load_file(path)? {
        LoadedConfig::Network(c) => {
            eprintln!(
                "✓ Network '{}' is valid ({} sections)",
                c.network.name,
                c.network.sections.len()
            );
        }
        LoadedConfig::System(c) => {
            eprintln!(
                "✓ System is valid ({} networks, {} shared nodes)",
                c.system.bundles.len(),
                c.system.groups.len()
            );
        }
    }
    Ok(())
}

fn cmd_run(path: &Path, direction: Option<Direction>, sink: &Sink<'_>) -> CliResult<()> {
    match load_file(path)? {
        LoadedConfig::Network(mut config) => {
            if direction.is_some() {
                config.solver.direction = direction;
            }
            let result = solve_network(&config)?;
            let report = present_network(&result, &config.network.output_units)?;
            sink.emit(&report)
        }
        LoadedConfig::System(mut config) => {
            if direction.is_some() {
                config.solver.direction = direction;
            }
            let result = solve_system(&config)?;
            sink.emit(&present_system(&result, &config.system)?)
        }
    }
}

fn cmd_system(path: &Path, sink: &Sink<'_>) -> CliResult<()> {
    let config = load_system_file(path)?;
    let result = solve_system(&config)?;
    sink.emit(&present_system(&result, &config.system)?)
}

fn solve_network(config: &NetworkConfig) -> CliResult<NetworkResult> {
    let start = Instant::now();
    let result = NetworkSolver::new(config.solver.clone()).run(&config.network)?;
    info!(
        network = %result.name,
        direction = %result.direction,
        elapsed_s = start.elapsed().as_secs_f64(),
        "network solved"
    );
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(result)
}

fn solve_system(config: &SystemConfig) -> CliResult<NetworkSystemResult> {
    let start = Instant::now();
    let solver = NetworkSystemSolver::new(NetworkSolver::new(config.solver.clone()));
    let result = solver.run(&config.system)?;
    info!(
        iterations = result.iterations,
        converged = result.converged,
        elapsed_s = start.elapsed().as_secs_f64(),
        "system solved"
    );
    if !result.converged {
        eprintln!(
            "warning: system did not converge after {} iterations (max change {:.3} Pa)",
            result.iterations, result.max_delta
        );
    }
    Ok(result)
}
