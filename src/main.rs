use std::path::PathBuf;

use binfetch::Api;
use clap::Parser;
use log::{error, info};

/// Fetch the prebuilt binary for this platform from a GitHub release.
#[derive(Parser, Debug)]
#[command(name = "binfetch", about)]
struct Cli {
    /// GitHub repository in `owner/name` form
    #[arg(long)]
    repo: String,

    /// Binary name (defaults to the repository name)
    #[arg(long)]
    tool: Option<String>,

    /// Release tag to install
    #[arg(long, env = "BINFETCH_VERSION")]
    version: String,

    /// Directory that receives the binary
    #[arg(long, default_value = "bin")]
    dest_dir: PathBuf,

    /// Platform identifier (resolved from the host when omitted)
    #[arg(long)]
    target: Option<String>,

    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Ignore cached downloads
    #[arg(long)]
    force: bool,

    /// GitHub API base URL
    #[arg(long, default_value = binfetch::api::GITHUB_API)]
    api_base: String,

    /// Do not draw a progress bar
    #[arg(long)]
    no_progress: bool,
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    if cli.force {
        info!("--force, ignoring caches");
    }
    let tool = cli
        .tool
        .clone()
        .unwrap_or_else(|| cli.repo.rsplit('/').next().unwrap_or(&cli.repo).to_owned());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    match rt.block_on(run(cli, &tool)) {
        Ok(path) => println!("{}", path.display()),
        Err(e) => {
            error!("Downloading {tool} failed: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, tool: &str) -> binfetch::Result<PathBuf> {
    let mut api = Api::new().set_tool(tool).set_api_base(&cli.api_base);
    if cli.no_progress {
        api = api.no_progress();
    }

    let mut version = api
        .repo(&cli.repo)
        .version(&cli.version)
        .dest_dir(&cli.dest_dir)
        .force(cli.force);
    if let Some(target) = &cli.target {
        version = version.target(target);
    }
    if let Some(token) = &cli.token {
        version = version.token(token);
    }
    version.install().await
}
