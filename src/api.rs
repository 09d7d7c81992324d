use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::env::{Environment, SystemEnv, TOKEN_VAR};
use crate::error::Result;
use crate::install::{InstallRequest, Installer};
use crate::target::resolve_target;
use crate::transport::{parse_url, DownloadStrategy, Transport, MAX_REDIRECTS};

/// Default GitHub REST endpoint; its host is the only one that sees tokens.
pub const GITHUB_API: &str = "https://api.github.com";

// ──────────────────────────────────────────────────────────────────────────────
// Api
// ──────────────────────────────────────────────────────────────────────────────

/// Top-level entry-point with a chainable builder API.
///
/// # Example
/// ```rust,no_run
/// use binfetch::Api;
///
/// #[tokio::main]
/// async fn main() {
///     let bin = Api::new()
///         .set_tool("aidbox-cli")
///         .repo("octoshikari/aidbox-cli")
///         .version("v0.4.3")
///         .dest_dir("./bin")
///         .install()
///         .await
///         .unwrap();
///     println!("{}", bin.display());
/// }
/// ```
pub struct Api {
    tool: String,
    api_base: String,
    user_agent: Option<String>,
    cache_root: PathBuf,
    max_redirects: usize,
    progress: bool,
    strategy: Option<DownloadStrategy>,
    env: Arc<dyn Environment>,
}

impl Api {
    /// Create an `Api` that reads the real process environment.
    pub fn new() -> Self {
        Self::with_env(Arc::new(SystemEnv))
    }

    /// Create an `Api` backed by a custom environment provider.
    pub fn with_env(env: Arc<dyn Environment>) -> Self {
        Self {
            tool: String::new(),
            api_base: GITHUB_API.to_owned(),
            user_agent: None,
            cache_root: std::env::temp_dir(),
            max_redirects: MAX_REDIRECTS,
            progress: true,
            strategy: None,
            env,
        }
    }

    /// Binary name used for asset and installed file names (builder).
    pub fn set_tool(mut self, tool: &str) -> Self {
        self.tool = tool.to_owned();
        self
    }

    /// Point at another API host, e.g. GitHub Enterprise or a mock (builder).
    pub fn set_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_owned();
        self
    }

    /// Override the user agent, which defaults to the tool name (builder).
    pub fn set_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = Some(user_agent.to_owned());
        self
    }

    /// Directory that holds the per-version caches (builder).
    pub fn set_cache_root(mut self, root: impl AsRef<Path>) -> Self {
        self.cache_root = root.as_ref().to_path_buf();
        self
    }

    /// Maximum redirects followed per download (builder).
    pub fn set_max_redirects(mut self, max: usize) -> Self {
        self.max_redirects = max;
        self
    }

    /// Force a download strategy instead of picking one from the OS (builder).
    pub fn set_strategy(mut self, strategy: DownloadStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Disable the progress bar (builder).
    pub fn no_progress(mut self) -> Self {
        self.progress = false;
        self
    }

    /// Select a GitHub repository (`owner/name`) and return a [`RepoApi`].
    ///
    /// The tool name defaults to the repository name.
    pub fn repo(mut self, repo: &str) -> RepoApi {
        if self.tool.is_empty() {
            self.tool = repo.rsplit('/').next().unwrap_or(repo).to_owned();
        }
        RepoApi {
            api: self,
            repo: repo.to_owned(),
        }
    }

    fn installer(&self, repo: &str) -> Result<Installer> {
        let api_host = parse_url(&self.api_base)?;
        let mut transport = Transport::new(api_host, self.env.clone())
            .with_max_redirects(self.max_redirects)
            .with_progress(self.progress);
        if let Some(strategy) = self.strategy {
            transport = transport.with_strategy(strategy);
        }
        let user_agent = self.user_agent.as_deref().unwrap_or(&self.tool);
        Ok(Installer::new(
            repo,
            &self.tool,
            user_agent,
            &self.cache_root,
            transport,
            self.env.clone(),
        ))
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// RepoApi
// ──────────────────────────────────────────────────────────────────────────────

/// Intermediate builder after a repository has been specified.
pub struct RepoApi {
    api: Api,
    repo: String,
}

impl RepoApi {
    /// Target a specific release tag (e.g. `"v0.4.3"`).
    pub fn version(self, version: &str) -> VersionApi {
        VersionApi {
            api: self.api,
            repo: self.repo,
            version: version.to_owned(),
            target: None,
            dest_dir: PathBuf::from("bin"),
            force: false,
            token: None,
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// VersionApi
// ──────────────────────────────────────────────────────────────────────────────

/// Final builder: everything needed for one install.
pub struct VersionApi {
    api: Api,
    repo: String,
    version: String,
    target: Option<String>,
    dest_dir: PathBuf,
    force: bool,
    token: Option<String>,
}

impl VersionApi {
    /// Use an explicit platform identifier instead of resolving one.
    pub fn target(mut self, target: &str) -> Self {
        self.target = Some(target.to_owned());
        self
    }

    /// Directory that receives the executable.
    pub fn dest_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.dest_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Re-download even when a cached asset exists.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// API token; defaults to `GITHUB_TOKEN`.
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_owned());
        self
    }

    /// The request this builder describes, with defaults filled in from the
    /// environment.
    pub fn request(&self) -> Result<InstallRequest> {
        let target = match &self.target {
            Some(target) => target.clone(),
            None => resolve_target(self.api.env.as_ref())?,
        };
        let token = self
            .token
            .clone()
            .or_else(|| self.api.env.var(TOKEN_VAR))
            .filter(|t| !t.is_empty());
        Ok(InstallRequest {
            version: self.version.clone(),
            target,
            dest_dir: self.dest_dir.clone(),
            force: self.force,
            token,
        })
    }

    /// Download (or reuse) and install the binary, returning its path.
    pub async fn install(self) -> Result<PathBuf> {
        let request = self.request()?;
        let installer = self.api.installer(&self.repo)?;
        installer.install(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::StaticEnv;
    use crate::error::Error;

    #[test]
    fn test_request_defaults_from_env() {
        let env = StaticEnv::new("darwin", "arm64").with_var(TOKEN_VAR, "gh-token");
        let request = Api::with_env(Arc::new(env))
            .repo("octoshikari/aidbox-cli")
            .version("v0.4.3")
            .request()
            .unwrap();

        assert_eq!(request.target, "darwin-m1");
        assert_eq!(request.token.as_deref(), Some("gh-token"));
        assert_eq!(request.dest_dir, PathBuf::from("bin"));
        assert!(!request.force);
    }

    #[test]
    fn test_explicit_values_win() {
        let env = StaticEnv::new("linux", "x64").with_var(TOKEN_VAR, "from-env");
        let request = Api::with_env(Arc::new(env))
            .repo("o/r")
            .version("v1")
            .target("custom-target")
            .token("explicit")
            .force(true)
            .request()
            .unwrap();

        assert_eq!(request.target, "custom-target");
        assert_eq!(request.token.as_deref(), Some("explicit"));
        assert!(request.force);
    }

    #[test]
    fn test_unsupported_platform_fails_before_install() {
        let env = StaticEnv::new("freebsd", "x64");
        let err = Api::with_env(Arc::new(env))
            .repo("o/r")
            .version("v1")
            .request()
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedPlatform(_)));
    }

    #[test]
    fn test_tool_defaults_to_repo_name() {
        let repo = Api::with_env(Arc::new(StaticEnv::new("linux", "x64"))).repo("owner/mytool");
        assert_eq!(repo.api.tool, "mytool");
    }
}
