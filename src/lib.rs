//! # binfetch
//!
//! Fetches the prebuilt executable for a release tag and platform from GitHub
//! releases, caches the raw asset per version, and installs it as a runnable
//! binary. Meant to run as a package-manager post-install hook.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use binfetch::Api;
//!
//! #[tokio::main]
//! async fn main() {
//!     Api::new()
//!         .set_tool("aidbox-cli")
//!         .repo("octoshikari/aidbox-cli")
//!         .version("v0.4.3")
//!         .dest_dir("./bin")
//!         .install()
//!         .await
//!         .unwrap();
//! }
//! ```

pub mod api;
pub mod cache;
pub mod env;
pub mod error;
pub mod extract;
pub mod install;
pub mod progress;
pub mod proxy;
pub mod release;
pub mod target;
pub mod transport;

pub use api::Api;
pub use cache::Cache;
pub use env::{Environment, StaticEnv, SystemEnv};
pub use error::{Error, Result};
pub use install::{InstallRequest, Installer};
pub use release::AssetDescriptor;
pub use target::resolve_target;
pub use transport::{DownloadOptions, DownloadStrategy, Transport};
