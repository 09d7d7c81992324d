//! Version-scoped download cache.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::install::InstallRequest;
use crate::release::locate_asset;
use crate::target::exe_extension;
use crate::transport::{DownloadOptions, Transport};

/// `<tool>-<version>-<target><ext>`
pub fn asset_name(tool: &str, version: &str, target: &str, os: &str) -> String {
    format!("{tool}-{version}-{target}{}", exe_extension(os))
}

/// Directory holding raw downloaded assets for one version.
#[derive(Debug, Clone)]
pub struct Cache {
    dir: PathBuf,
}

impl Cache {
    /// Cache for `version` of `tool` under `root` (`<root>/<tool>-cache-<version>`).
    pub fn new(root: &Path, tool: &str, version: &str) -> Self {
        Self {
            dir: root.join(format!("{tool}-cache-{version}")),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, asset_name: &str) -> PathBuf {
        self.dir.join(asset_name)
    }

    /// Create the cache directory if it is missing.
    pub async fn ensure_dir(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| Error::io("error creating cache directory", &self.dir, e))
    }

    /// Cached asset path, unless `force` is set or nothing is cached.
    pub async fn lookup(&self, asset_name: &str, force: bool) -> Option<PathBuf> {
        if force {
            return None;
        }
        let path = self.path_for(asset_name);
        match tokio::fs::try_exists(&path).await {
            Ok(true) => Some(path),
            _ => None,
        }
    }

    /// Best-effort removal of a cached asset.
    pub async fn evict(&self, asset_name: &str) {
        let path = self.path_for(asset_name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            log::debug!("could not delete {}: {e}", path.display());
        }
    }

    /// Return the cached asset for `request`, downloading it first when it is
    /// absent or `force` is set. A failed download leaves nothing behind.
    pub async fn resolve_cached_or_download(
        &self,
        transport: &Transport,
        repo: &str,
        asset_name: &str,
        request: &InstallRequest,
        options: &DownloadOptions,
    ) -> Result<PathBuf> {
        self.ensure_dir().await?;

        if let Some(path) = self.lookup(asset_name, request.force).await {
            log::info!("using cached download: {}", path.display());
            return Ok(path);
        }

        let path = self.path_for(asset_name);
        let fetched = async {
            let asset = locate_asset(transport, repo, &request.version, asset_name, options).await?;
            log::info!("downloading from {}", asset.download_url);
            log::info!("downloading to {}", path.display());
            let options = options.clone().header("accept", "application/octet-stream");
            transport
                .download_to_file(&asset.download_url, &path, &options)
                .await
        }
        .await;

        match fetched {
            Ok(()) => Ok(path),
            Err(e) => {
                log::warn!("deleting invalid download cache");
                self.evict(asset_name).await;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_name() {
        assert_eq!(
            asset_name("tool", "v1.0.0", "linux-x86_64", "linux"),
            "tool-v1.0.0-linux-x86_64"
        );
        assert_eq!(
            asset_name("tool", "v1.0.0", "windows-x86_64", "win32"),
            "tool-v1.0.0-windows-x86_64.exe"
        );
    }

    #[test]
    fn test_cache_dir_is_version_scoped() {
        let cache = Cache::new(Path::new("/tmp"), "aidbox-cli", "v0.4.3");
        assert_eq!(cache.dir(), Path::new("/tmp/aidbox-cli-cache-v0.4.3"));
        assert_eq!(
            cache.path_for("a"),
            PathBuf::from("/tmp/aidbox-cli-cache-v0.4.3/a")
        );
    }

    #[tokio::test]
    async fn test_lookup_and_evict() {
        let root = tempfile::tempdir().unwrap();
        let cache = Cache::new(root.path(), "tool", "v1");
        cache.ensure_dir().await.unwrap();

        assert!(cache.lookup("asset", false).await.is_none());

        std::fs::write(cache.path_for("asset"), b"bin").unwrap();
        assert_eq!(cache.lookup("asset", false).await, Some(cache.path_for("asset")));
        assert!(cache.lookup("asset", true).await.is_none());

        cache.evict("asset").await;
        assert!(!cache.path_for("asset").exists());

        // evicting twice is harmless
        cache.evict("asset").await;
    }
}
