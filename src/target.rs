//! Platform identifiers used in asset names.

use crate::env::Environment;
use crate::error::{Error, Result};

/// True on the platform that needs the shell-delegated download and `.exe`
/// binaries.
pub fn is_fallback_platform(os: &str) -> bool {
    os == "win32"
}

/// Executable suffix for `os`.
pub fn exe_extension(os: &str) -> &'static str {
    if is_fallback_platform(os) {
        ".exe"
    } else {
        ""
    }
}

/// Map an OS name and architecture to the platform identifier used in asset
/// names.
pub fn target_for(os: &str, arch: &str) -> Result<String> {
    let target = match os {
        "darwin" if arch == "x64" => "darwin-x86_64",
        "darwin" => "darwin-m1",
        "win32" => "windows-x86_64",
        "linux" => match arch {
            "x64" => "linux-x86_64",
            "arm" => "arm-unknown-linux-gnueabihf",
            "arm64" => "aarch64-unknown-linux-gnu",
            "ppc64" => "powerpc64le-unknown-linux-gnu",
            _ => "i686-unknown-linux-musl",
        },
        other => return Err(Error::UnsupportedPlatform(other.to_owned())),
    };
    Ok(target.to_owned())
}

/// Resolve the target for the given environment, honouring the
/// architecture override.
pub fn resolve_target(env: &dyn Environment) -> Result<String> {
    target_for(&env.os(), &env.effective_arch())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{StaticEnv, ARCH_OVERRIDE_VAR};

    #[test]
    fn test_mapping_table() {
        let cases = [
            ("darwin", "x64", "darwin-x86_64"),
            ("darwin", "arm64", "darwin-m1"),
            ("darwin", "ia32", "darwin-m1"),
            ("win32", "x64", "windows-x86_64"),
            ("win32", "arm64", "windows-x86_64"),
            ("win32", "ia32", "windows-x86_64"),
            ("linux", "x64", "linux-x86_64"),
            ("linux", "arm", "arm-unknown-linux-gnueabihf"),
            ("linux", "arm64", "aarch64-unknown-linux-gnu"),
            ("linux", "ppc64", "powerpc64le-unknown-linux-gnu"),
            ("linux", "ia32", "i686-unknown-linux-musl"),
            ("linux", "s390x", "i686-unknown-linux-musl"),
        ];
        for (os, arch, expected) in cases {
            assert_eq!(target_for(os, arch).unwrap(), expected, "{os}/{arch}");
        }
    }

    #[test]
    fn test_unknown_os_is_rejected() {
        for os in ["freebsd", "openbsd", "sunos", "aix", ""] {
            match target_for(os, "x64") {
                Err(Error::UnsupportedPlatform(name)) => assert_eq!(name, os),
                other => panic!("expected UnsupportedPlatform for {os:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_resolve_target_applies_override() {
        let env = StaticEnv::new("linux", "x64").with_var(ARCH_OVERRIDE_VAR, "arm");
        assert_eq!(resolve_target(&env).unwrap(), "arm-unknown-linux-gnueabihf");
    }

    #[test]
    fn test_exe_extension() {
        assert_eq!(exe_extension("win32"), ".exe");
        assert_eq!(exe_extension("linux"), "");
        assert_eq!(exe_extension("darwin"), "");
    }
}
