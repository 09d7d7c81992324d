use std::collections::HashMap;

/// Environment variable consulted before the OS-reported architecture.
pub const ARCH_OVERRIDE_VAR: &str = "npm_config_arch";

/// Environment variable holding the GitHub API credential.
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";

/// Source of the process-wide facts the installer depends on.
///
/// OS and architecture names use the npm vocabulary (`darwin`, `win32`,
/// `linux`, `x64`, `arm64`, ...) because asset names are built from it.
pub trait Environment: Send + Sync {
    fn os(&self) -> String;

    fn arch(&self) -> String;

    fn var(&self, name: &str) -> Option<String>;

    /// Architecture after applying the `npm_config_arch` override.
    fn effective_arch(&self) -> String {
        self.var(ARCH_OVERRIDE_VAR)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.arch())
    }
}

/// Reads the real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl Environment for SystemEnv {
    fn os(&self) -> String {
        match std::env::consts::OS {
            "macos" => "darwin",
            "windows" => "win32",
            other => other,
        }
        .to_owned()
    }

    fn arch(&self) -> String {
        match std::env::consts::ARCH {
            "x86_64" => "x64",
            "x86" => "ia32",
            "aarch64" => "arm64",
            "powerpc64" => "ppc64",
            other => other,
        }
        .to_owned()
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Fixed environment, for tests and for embedding callers that already know
/// the platform.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    os: String,
    arch: String,
    vars: HashMap<String, String>,
}

impl StaticEnv {
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: os.to_owned(),
            arch: arch.to_owned(),
            vars: HashMap::new(),
        }
    }

    /// Set a variable (builder).
    pub fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_owned(), value.to_owned());
        self
    }
}

impl Environment for StaticEnv {
    fn os(&self) -> String {
        self.os.clone()
    }

    fn arch(&self) -> String {
        self.arch.clone()
    }

    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}
