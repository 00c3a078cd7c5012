use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::application::dto::OutputFormat;
use crate::resolution::domain::ResolutionMode;

/// Resolve, validate and persist the application model of an extension-based JVM project
#[derive(Parser, Debug)]
#[command(name = "app-curator")]
#[command(version)]
#[command(about = "Resolve, validate and persist the application model of an extension-based JVM project", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the project and persist its application model
    Resolve(ResolveArgs),
    /// Render a previously persisted application model
    Show(ShowArgs),
    /// Install an artifact file into the local repository
    Install(InstallArgs),
    /// Check that a deployment artifact covers its runtime artifact's extensions
    Validate(ValidateArgs),
}

/// Options shared by every command
#[derive(ClapArgs, Debug, Clone)]
pub struct ProjectArgs {
    /// Path to the project directory (defaults to current directory)
    #[arg(short, long)]
    pub path: Option<PathBuf>,

    /// Configuration file (defaults to app-curator.config.yml in the project directory)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Never reach remote repositories
    #[arg(long)]
    pub offline: bool,
}

#[derive(ClapArgs, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Resolution mode: prod, dev or test
    #[arg(short, long)]
    pub mode: Option<ResolutionMode>,

    /// Fail when platform BOMs are misaligned instead of warning
    #[arg(long)]
    pub strict_alignment: bool,

    /// Reuse the persisted model when its inputs are unchanged
    #[arg(long)]
    pub reuse: bool,

    /// Exclude artifacts matching patterns (group:artifact[:classifier[:type[:version]]], wildcards: *)
    /// Can be specified multiple times: -e "io.acme:legacy" -e "org.unused:*"
    #[arg(short, long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Directory the model is persisted under (defaults to target/quarkus-app)
    #[arg(short, long, value_name = "OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct ShowArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Output format: text or json
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory the model was persisted under (defaults to target/quarkus-app)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

#[derive(ClapArgs, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Coordinates to install under (group:artifact[:classifier[:type]]:version)
    #[arg(long, value_name = "GACTV")]
    pub coords: String,

    /// The artifact file
    #[arg(long, value_name = "PATH")]
    pub file: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Runtime artifact of the extension
    #[arg(long, value_name = "GACTV")]
    pub runtime: String,

    /// Deployment artifact of the extension
    #[arg(long, value_name = "GACTV")]
    pub deployment: String,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Command {
    pub fn project(&self) -> &ProjectArgs {
        match self {
            Command::Resolve(args) => &args.project,
            Command::Show(args) => &args.project,
            Command::Install(args) => &args.project,
            Command::Validate(args) => &args.project,
        }
    }
}
