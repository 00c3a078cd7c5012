use app_curator::adapters::outbound::console::StderrProgressReporter;
use app_curator::adapters::outbound::filesystem::FileSystemReader;
use app_curator::adapters::outbound::persistence::FileModelStore;
use app_curator::adapters::outbound::repository::{
    HttpTransport, MavenRepository, RemoteRepository, Workspace, WorkspaceModule,
};
use app_curator::application::dto::CurationRequest;
use app_curator::application::factories::{FormatterFactory, PresenterFactory, PresenterType};
use app_curator::application::use_cases::{
    CurateAppModelUseCase, InstallArtifactUseCase, ShowAppModelUseCase, ValidateExtensionUseCase,
};
use app_curator::cli::{Args, Command, InstallArgs, ProjectArgs, ResolveArgs, ShowArgs, ValidateArgs};
use app_curator::config::{self, ConfigFile};
use app_curator::resolution::domain::{ArtifactCoords, ArtifactPattern};
use app_curator::shared::error::{CuratorError, ExitCode};
use app_curator::shared::Result;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_OUTPUT_DIR: &str = "target/quarkus-app";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
const LOG_ENV_VAR: &str = "APP_CURATOR_LOG";

fn main() {
    init_tracing();
    let args = Args::parse_args();

    if let Err(e) = run(args) {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        for cause in e.chain().skip(1) {
            eprintln!("\nCaused by: {}", cause);
        }

        eprintln!();
        process::exit(ExitCode::for_error(&e).as_i32());
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Everything a command needs besides its own arguments
struct Context {
    project_path: PathBuf,
    config: ConfigFile,
}

impl Context {
    fn load(project: &ProjectArgs) -> Result<Self> {
        let project_path = project.path.clone().unwrap_or_else(|| PathBuf::from("."));
        validate_project_path(&project_path)?;

        let config = match &project.config {
            Some(path) => config::load_config_from_path(path)?,
            None => {
                let discovered = config::discover_config(&project_path)?;
                if discovered.is_some() {
                    eprintln!(
                        "📄 Auto-discovered config file: {}",
                        project_path.join(config::CONFIG_FILENAME).display()
                    );
                }
                discovered.unwrap_or_default()
            }
        };
        Ok(Self {
            project_path,
            config,
        })
    }

    /// Config paths are relative to the project directory.
    fn project_relative(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_path.join(path)
        }
    }

    fn local_repository(&self) -> PathBuf {
        self.config
            .local_repository
            .as_deref()
            .map(|p| self.project_relative(p))
            .unwrap_or_else(config::default_local_repository)
    }

    fn output_dir(&self, cli_value: Option<&Path>) -> PathBuf {
        match (cli_value, self.config.output_dir.as_deref()) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => self.project_relative(dir),
            (None, None) => self.project_path.join(DEFAULT_OUTPUT_DIR),
        }
    }

    fn workspace(&self) -> Result<Workspace> {
        let mut workspace = Workspace::discover(&self.project_path)?;
        for module in self.config.workspace_modules.iter().flatten() {
            let output_path = self.project_relative(&module.path);
            let pom = match &module.pom {
                Some(pom) => self.project_relative(pom),
                None => module_pom(&output_path),
            };
            workspace.add(WorkspaceModule {
                coords: module.coords.parse()?,
                output_path,
                pom,
            });
        }
        Ok(workspace)
    }

    fn repository(&self, offline_flag: bool) -> Result<MavenRepository> {
        let workspace = self.workspace()?;
        let local_repository = self.local_repository();
        if offline_flag || self.config.offline.unwrap_or(false) {
            return Ok(MavenRepository::offline(local_repository, workspace));
        }

        let remotes = match &self.config.remote_repositories {
            Some(repos) if !repos.is_empty() => repos
                .iter()
                .map(|r| RemoteRepository {
                    id: r.id.clone(),
                    url: r.url.clone(),
                })
                .collect(),
            _ => vec![RemoteRepository::maven_central()],
        };
        let timeout = Duration::from_secs(
            self.config
                .http_timeout_secs
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );
        Ok(MavenRepository::new(
            local_repository,
            remotes,
            Some(HttpTransport::new(timeout)?),
            workspace,
        ))
    }
}

/// Nearest pom.xml at or above a module's output path.
fn module_pom(output_path: &Path) -> PathBuf {
    output_path
        .ancestors()
        .map(|dir| dir.join("pom.xml"))
        .find(|pom| pom.is_file())
        .unwrap_or_else(|| output_path.join("pom.xml"))
}

fn run(args: Args) -> Result<()> {
    let context = Context::load(args.command.project())?;
    match args.command {
        Command::Resolve(resolve) => run_resolve(&context, resolve),
        Command::Show(show) => run_show(&context, show),
        Command::Install(install) => run_install(&context, install),
        Command::Validate(validate) => run_validate(&context, validate),
    }
}

fn run_resolve(context: &Context, args: ResolveArgs) -> Result<()> {
    // CLI flags override config values
    let mode = args
        .mode
        .or_else(|| context.config.resolution_mode())
        .unwrap_or_default();
    let mut excluded = context
        .config
        .excluded_artifacts
        .iter()
        .flatten()
        .map(|p| p.parse::<ArtifactPattern>())
        .collect::<Result<Vec<_>>>()?;
    for pattern in &args.exclude {
        excluded.push(pattern.parse().map_err(|e: anyhow::Error| {
            CuratorError::InvalidCoords {
                value: pattern.clone(),
                reason: e.to_string(),
            }
        })?);
    }
    let strict = args.strict_alignment || context.config.strict_alignment.unwrap_or(false);
    let output_dir = context.output_dir(args.output_dir.as_deref());

    let use_case = CurateAppModelUseCase::new(
        context.repository(args.project.offline)?,
        FileSystemReader::new(),
        FileModelStore::new(),
        StderrProgressReporter::new(),
    );
    let request = CurationRequest::new(context.project_path.clone(), mode, output_dir)
        .with_excluded_artifacts(excluded)
        .with_strict_alignment(strict)
        .with_reuse(args.reuse);

    let response = use_case.execute(request)?;

    let model = &response.model;
    eprintln!(
        "\n📦 {} ({} mode{})",
        model.app_artifact().coords().to_compact_string(),
        model.mode(),
        if response.reused { ", reused" } else { "" }
    );
    eprintln!("   Runtime classpath:  {}", model.runtime_dependencies().count());
    eprintln!(
        "   Deployment only:    {}",
        model.deployment_only_dependencies().count()
    );
    eprintln!("   Extensions:         {}", model.runtime_extensions().count());
    if !response.is_aligned() {
        eprintln!("   ⚠️  Platform BOMs are misaligned");
    }
    Ok(())
}

fn run_show(context: &Context, args: ShowArgs) -> Result<()> {
    let output_dir = context.output_dir(args.output_dir.as_deref());
    let colored = args.output.is_none() && std::io::stdout().is_terminal();

    eprintln!("{}", FormatterFactory::progress_message(args.format));
    let presenter_type = match args.output {
        Some(path) => PresenterType::File(path),
        None => PresenterType::Stdout,
    };
    let use_case = ShowAppModelUseCase::new(
        FileModelStore::new(),
        FormatterFactory::create(args.format, colored),
        PresenterFactory::create(presenter_type),
    );
    use_case.execute(&output_dir)
}

fn run_install(context: &Context, args: InstallArgs) -> Result<()> {
    let coords = parse_coords(&args.coords)?;
    let repository = MavenRepository::offline(context.local_repository(), Workspace::new());
    let use_case = InstallArtifactUseCase::new(repository, StderrProgressReporter::new());
    use_case.execute(&coords, &args.file)?;
    Ok(())
}

fn run_validate(context: &Context, args: ValidateArgs) -> Result<()> {
    let runtime = parse_coords(&args.runtime)?;
    let deployment = parse_coords(&args.deployment)?;
    let use_case = ValidateExtensionUseCase::new(
        context.repository(args.project.offline)?,
        FileSystemReader::new(),
        StderrProgressReporter::new(),
    );
    use_case.execute(&runtime, &deployment)
}

fn parse_coords(value: &str) -> Result<ArtifactCoords> {
    value.parse().map_err(|e: anyhow::Error| {
        CuratorError::InvalidCoords {
            value: value.to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

fn validate_project_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(CuratorError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Directory does not exist".to_string(),
        }
        .into());
    }

    // Security check: Reject symbolic links for project paths
    let metadata =
        std::fs::symlink_metadata(path).map_err(|e| CuratorError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: format!("Failed to read path metadata: {}", e),
        })?;

    if metadata.is_symlink() {
        return Err(CuratorError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Security: Project path is a symbolic link. For security reasons, symbolic links are not allowed.".to_string(),
        }
        .into());
    }

    if !path.is_dir() {
        return Err(CuratorError::InvalidProjectPath {
            path: path.to_path_buf(),
            reason: "Not a directory".to_string(),
        }
        .into());
    }

    Ok(())
}
