//! # careerkit CLI
//!
//! Front ends for the career planning crew.
//!
//! Usage:
//!   careerkit serve [--bind <addr>]
//!   careerkit run --goal <goal> --industry <industry> ... [--export-dir <dir>]
//!   careerkit templates
//!
//! Examples:
//!   careerkit serve
//!   careerkit run --goal "Cloud Architect" --industry "Cloud Computing" --hours 10
//!   careerkit -c careerkit.toml run --export-dir plans/

mod config;
mod web;

use careerkit_crew::{
    plan_exports, resolve_api_key, Crew, PipelineResult, Profile, RunState, SecretStore, Stage,
};
use careerkit_error::{Error, Result};
use careerkit_llm::OpenAIProvider;
use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "careerkit")]
#[command(author, version, about = "careerkit - personalized career development plans")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: ./careerkit.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web UI
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:8501
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Generate a plan in the terminal
    Run {
        #[command(flatten)]
        profile: ProfileArgs,

        /// Write the markdown report and quick reference here
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Print the resolved stage templates as TOML
    Templates,
}

#[derive(Args)]
struct ProfileArgs {
    /// Target position
    #[arg(long, default_value = "Senior Machine Learning Engineer")]
    goal: String,

    #[arg(long, default_value = "Technology/AI")]
    industry: String,

    /// Current skills, comma-separated
    #[arg(long, default_value = "Python, Basic ML algorithms, Data analysis, SQL")]
    skills: String,

    #[arg(long, default_value = "2 years as Junior Data Analyst")]
    experience: String,

    #[arg(long, default_value = "Bachelor's in Computer Science")]
    education: String,

    /// Hours per week available for learning
    #[arg(long, default_value_t = 15)]
    hours: u32,
}

impl ProfileArgs {
    fn into_profile(self) -> Profile {
        Profile {
            career_goal: self.goal,
            industry: self.industry,
            current_skills: self.skills,
            experience_level: self.experience,
            education: self.education,
            time_commitment: self.hours,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "careerkit=debug,tower_http=debug"
    } else {
        "careerkit=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Resolve the credential and wire the provider into a crew. Fails fast when
/// no credential is available.
fn build_crew(config: &AppConfig) -> Result<Crew<OpenAIProvider>> {
    let settings = &config.provider;
    let secrets = SecretStore::load(&settings.secrets_file)?;
    let (api_key, source) =
        resolve_api_key(&settings.api_key_name, &secrets, |name| std::env::var(name).ok())?;
    tracing::info!(credential = %settings.api_key_name, source = ?source, "credential resolved");

    let provider = OpenAIProvider::new(settings.to_provider_config()).map_err(|e| {
        Error::config_invalid("failed to build provider client")
            .with_operation("cli::build_crew")
            .set_source(e)
    })?;

    Ok(Crew::new(config.crew.clone(), provider)?.with_credential(api_key))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

async fn serve(config: &AppConfig, bind: Option<String>) -> Result<()> {
    let addr: SocketAddr = match bind {
        Some(bind) => bind.parse().map_err(|_| {
            Error::config_invalid("--bind must be an ip:port address").with_context("bind", bind)
        })?,
        None => config.server.socket_addr()?,
    };

    let crew = build_crew(config)?;
    let app = web::router(web::AppState::new(crew));

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        Error::from(e)
            .with_operation("cli::serve")
            .with_context("bind", addr.to_string())
    })?;
    tracing::info!(%addr, "serving career planner");
    println!("Career Accelerator running at http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::from(e).with_operation("cli::serve"))
}

fn print_plan(result: &PipelineResult) {
    for stage in Stage::ALL {
        println!("\n=== {} ===\n", stage.title());
        println!("{}", result.sections.display(stage));
    }
    println!(
        "\n--- {} stages, {} tokens, model {} ---",
        result.stages.len(),
        result.usage.total_tokens(),
        result.model
    );
}

async fn run_plan(config: &AppConfig, profile: Profile, export_dir: Option<PathBuf>) -> Result<()> {
    let crew = build_crew(config)?.with_state_observer(|state| {
        if let RunState::RunningStage(stage) = state {
            println!("  [{}/{}] {} ...", stage.ordinal(), Stage::ALL.len(), stage.title());
        }
    });

    println!("Generating plan for: {} in {}\n", profile.career_goal, profile.industry);
    let result = crew.run(&profile).await?;
    print_plan(&result);

    if let Some(dir) = export_dir {
        let generated_at = chrono::Local::now().naive_local();
        for export in plan_exports(&profile, &result.sections, generated_at) {
            let path = export.write_to(&dir)?;
            println!("Saved {}", path.display());
        }
    }
    Ok(())
}

fn print_templates(config: &AppConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(&config.crew.stages).map_err(|e| {
        Error::unexpected("failed to render templates")
            .with_operation("cli::templates")
            .set_source(e)
    })?;
    println!("{}", rendered);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => serve(&config, bind).await,
        Commands::Run { profile, export_dir } => {
            run_plan(&config, profile.into_profile(), export_dir).await
        }
        Commands::Templates => print_templates(&config),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("{:?}", e);
            eprintln!("Error [{}]: {}", e.category(), e.message());
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults_match_example_profile() {
        let cli = Cli::try_parse_from(["careerkit", "run", "--hours", "20"]).unwrap();
        let Commands::Run { profile, export_dir } = cli.command else {
            panic!("expected run");
        };
        let profile = profile.into_profile();
        assert!(profile.validate().is_ok());
        assert_eq!(profile.career_goal, "Senior Machine Learning Engineer");
        assert_eq!(profile.time_commitment, 20);
        assert!(export_dir.is_none());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["careerkit", "serve", "-v", "--config", "x.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Commands::Serve { bind: None }));
    }

    #[test]
    fn test_build_crew_requires_credential() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.provider.secrets_file = dir.path().join("secrets.toml");
        config.provider.api_key_name = "CAREERKIT_TEST_UNSET_KEY".into();

        let err = build_crew(&config).err().unwrap();
        assert_eq!(err.category(), careerkit_error::ErrorCategory::Configuration);

        std::fs::write(&config.provider.secrets_file, "CAREERKIT_TEST_UNSET_KEY = \"gsk-1\"\n").unwrap();
        assert!(build_crew(&config).is_ok());
    }
}
