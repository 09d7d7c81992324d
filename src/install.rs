use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cache::{asset_name, Cache};
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::extract;
use crate::target::is_fallback_platform;
use crate::transport::{DownloadOptions, Transport};

/// One (version, target) pair to install.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallRequest {
    /// Release tag, e.g. `v0.4.3`.
    pub version: String,
    /// Platform identifier, see [`crate::target::resolve_target`].
    pub target: String,
    pub dest_dir: PathBuf,
    /// Ignore any cached download.
    pub force: bool,
    /// GitHub API token, sent only to the API host.
    pub token: Option<String>,
}

impl InstallRequest {
    /// Reject requests lacking a version or target.
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(Error::MissingField("version"));
        }
        if self.target.is_empty() {
            return Err(Error::MissingField("target"));
        }
        Ok(())
    }
}

/// Drives cache, release lookup, download, extraction and permissions for a
/// single tool.
pub struct Installer {
    repo: String,
    tool: String,
    user_agent: String,
    cache_root: PathBuf,
    transport: Transport,
    env: Arc<dyn Environment>,
}

impl Installer {
    pub fn new(
        repo: &str,
        tool: &str,
        user_agent: &str,
        cache_root: &Path,
        transport: Transport,
        env: Arc<dyn Environment>,
    ) -> Self {
        Self {
            repo: repo.to_owned(),
            tool: tool.to_owned(),
            user_agent: user_agent.to_owned(),
            cache_root: cache_root.to_path_buf(),
            transport,
            env,
        }
    }

    /// Cache used for `version`.
    pub fn cache_for(&self, version: &str) -> Cache {
        Cache::new(&self.cache_root, &self.tool, version)
    }

    /// Install the binary described by `request` and return its path.
    pub async fn install(&self, request: &InstallRequest) -> Result<PathBuf> {
        request.validate()?;

        tokio::fs::create_dir_all(&request.dest_dir)
            .await
            .map_err(|e| Error::io("error creating install directory", &request.dest_dir, e))?;

        let os = self.env.os();
        let asset = asset_name(&self.tool, &request.version, &request.target, &os);
        let cache = self.cache_for(&request.version);

        let mut options = DownloadOptions::new(&self.user_agent);
        if let Some(token) = request.token.as_deref().filter(|t| !t.is_empty()) {
            options = options.token(token);
        }

        let archive = cache
            .resolve_cached_or_download(&self.transport, &self.repo, &asset, request, &options)
            .await?;

        log::info!("unpacking to {}", request.dest_dir.display());
        match self.unpack(&archive, &request.dest_dir, &os) {
            Ok(binary) => Ok(binary),
            Err(e) => {
                log::warn!("deleting invalid download");
                cache.evict(&asset).await;
                Err(e)
            }
        }
    }

    fn unpack(&self, archive: &Path, dest: &Path, os: &str) -> Result<PathBuf> {
        extract::extract(archive, dest, &self.tool, os)?;
        let binary = extract::find_binary(dest, &self.tool)?;
        if !is_fallback_platform(os) {
            make_executable(&binary)?;
        }
        Ok(binary)
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| Error::io("error setting permissions on", path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
