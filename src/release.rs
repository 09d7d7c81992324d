//! Release lookup against the GitHub "release by tag" endpoint.

use serde::Deserialize;
use url::Url;

use crate::error::{Error, Result};
use crate::transport::{DownloadOptions, Transport};

/// A downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetDescriptor {
    pub name: String,
    /// API URL of the asset; fetch it with `accept: application/octet-stream`.
    #[serde(rename = "url")]
    pub download_url: String,
}

#[derive(Deserialize)]
struct ReleaseDoc {
    #[serde(default)]
    assets: Option<Vec<AssetDescriptor>>,
}

/// Outcome of parsing a release response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseBody {
    Assets(Vec<AssetDescriptor>),
    /// Not JSON at all.
    Malformed(String),
    /// JSON, but without a usable `assets` list.
    MissingAssets(String),
}

impl ReleaseBody {
    pub fn parse(body: &str) -> Self {
        let value: serde_json::Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => return ReleaseBody::Malformed(e.to_string()),
        };
        match serde_json::from_value::<ReleaseDoc>(value) {
            Ok(ReleaseDoc {
                assets: Some(assets),
            }) => ReleaseBody::Assets(assets),
            _ => ReleaseBody::MissingAssets(body.to_owned()),
        }
    }

    /// Turn the parse outcome into the asset list or the matching error.
    pub fn into_assets(self) -> Result<Vec<AssetDescriptor>> {
        match self {
            ReleaseBody::Assets(assets) => Ok(assets),
            ReleaseBody::Malformed(reason) => Err(Error::MalformedResponse(reason)),
            ReleaseBody::MissingAssets(body) => Err(Error::BadResponse(body)),
        }
    }
}

/// `<api>/repos/<owner>/<repo>/releases/tags/<tag>`
pub fn release_url(api_base: &Url, repo: &str, tag: &str) -> String {
    format!(
        "{}/repos/{}/releases/tags/{}",
        api_base.as_str().trim_end_matches('/'),
        repo,
        tag
    )
}

/// Find `asset_name` among the assets of release `tag` in `repo`.
pub async fn locate_asset(
    transport: &Transport,
    repo: &str,
    tag: &str,
    asset_name: &str,
    options: &DownloadOptions,
) -> Result<AssetDescriptor> {
    log::info!("finding release for {tag}");
    let url = release_url(transport.api_host(), repo, tag);
    let options = options.clone().header("accept", "application/vnd.github+json");
    let body = transport.get_text(&url, &options).await?;

    ReleaseBody::parse(&body)
        .into_assets()?
        .into_iter()
        .find(|asset| asset.name == asset_name)
        .ok_or_else(|| Error::AssetNotFound(asset_name.to_owned()))
}
