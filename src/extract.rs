//! Unpacking a downloaded asset into the destination directory.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::{Error, Result};
use crate::target::exe_extension;

/// Packaging of a downloaded asset, sniffed from its first bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    TarGz,
    Zip,
    /// The asset is the executable itself.
    Raw,
}

impl ArchiveKind {
    pub fn from_magic(head: &[u8]) -> Self {
        match head {
            [0x1f, 0x8b, ..] => ArchiveKind::TarGz,
            [b'P', b'K', 0x03, 0x04, ..] => ArchiveKind::Zip,
            _ => ArchiveKind::Raw,
        }
    }

    pub fn detect(path: &Path) -> Result<Self> {
        let mut head = [0u8; 4];
        let mut file = File::open(path).map_err(|e| Error::io("error opening", path, e))?;
        let mut filled = 0;
        while filled < head.len() {
            match file.read(&mut head[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(Error::io("error reading", path, e)),
            }
        }
        Ok(Self::from_magic(&head[..filled]))
    }
}

/// Unpack `archive` into `dest`. A top-level directory shared by every
/// archive entry is stripped. Raw executables are copied to `<dest>/<tool>`
/// (with `.exe` on Windows).
pub fn extract(archive: &Path, dest: &Path, tool: &str, os: &str) -> Result<()> {
    match ArchiveKind::detect(archive)? {
        ArchiveKind::TarGz => extract_tar_gz(archive, dest),
        ArchiveKind::Zip => extract_zip(archive, dest),
        ArchiveKind::Raw => {
            let out = dest.join(format!("{tool}{}", exe_extension(os)));
            fs::copy(archive, &out).map_err(|e| Error::io("error copying binary to", &out, e))?;
            Ok(())
        }
    }
}

fn archive_error(path: &Path, e: impl ToString) -> Error {
    Error::Archive {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// `path` without `.` components.
fn normalized(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}

/// Top-level directory that every entry lives under, as in
/// `tool-v1.0.0/tool`. Flat archives have none.
fn shared_root<I>(paths: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let mut root: Option<PathBuf> = None;
    let mut nested = false;
    for path in paths {
        let path = normalized(&path);
        let mut components = path.components();
        let first = match components.next() {
            Some(Component::Normal(first)) => PathBuf::from(first),
            None => continue,
            _ => return None,
        };
        nested |= components.next().is_some();
        match &root {
            Some(existing) if *existing != first => return None,
            Some(_) => {}
            None => root = Some(first),
        }
    }
    root.filter(|_| nested)
}

/// `path` relative to `dest` after dropping `root`; `None` for the root
/// itself and for anything that would escape `dest`.
fn relative_target(path: &Path, root: Option<&Path>) -> Option<PathBuf> {
    let path = normalized(path);
    let stripped = match root {
        Some(root) => path.strip_prefix(root).ok()?,
        None => path.as_path(),
    };
    if stripped.as_os_str().is_empty()
        || !stripped.components().all(|c| matches!(c, Component::Normal(_)))
    {
        return None;
    }
    Some(stripped.to_path_buf())
}

fn extract_zip(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive_path).map_err(|e| Error::io("error opening", archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| archive_error(archive_path, e))?;
    let root = shared_root(archive.file_names().map(PathBuf::from).collect::<Vec<_>>());

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| archive_error(archive_path, e))?;
        let Some(relative) = entry
            .enclosed_name()
            .and_then(|name| relative_target(&name, root.as_deref()))
        else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.name().ends_with('/') {
            fs::create_dir_all(&outpath).map_err(|e| Error::io("error creating", &outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io("error creating", parent, e))?;
        }
        let mut out = File::create(&outpath).map_err(|e| Error::io("error creating", &outpath, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| Error::io("error writing", &outpath, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode)).ok();
            }
        }
    }
    Ok(())
}

fn tar_gz(archive_path: &Path) -> Result<tar::Archive<GzDecoder<File>>> {
    let file = File::open(archive_path).map_err(|e| Error::io("error opening", archive_path, e))?;
    Ok(tar::Archive::new(GzDecoder::new(file)))
}

fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    // first pass only reads headers to find a shared top-level directory
    let mut paths = Vec::new();
    let mut archive = tar_gz(archive_path)?;
    for entry in archive.entries().map_err(|e| archive_error(archive_path, e))? {
        let entry = entry.map_err(|e| archive_error(archive_path, e))?;
        let path = entry.path().map_err(|e| archive_error(archive_path, e))?;
        paths.push(path.into_owned());
    }
    let root = shared_root(paths);

    let mut archive = tar_gz(archive_path)?;
    for entry in archive.entries().map_err(|e| archive_error(archive_path, e))? {
        let mut entry = entry.map_err(|e| archive_error(archive_path, e))?;
        let path = entry
            .path()
            .map_err(|e| archive_error(archive_path, e))?
            .into_owned();
        let Some(relative) = relative_target(&path, root.as_deref()) else {
            continue;
        };
        let outpath = dest.join(relative);

        if let Some(parent) = outpath.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io("error creating", parent, e))?;
        }
        entry
            .unpack(&outpath)
            .map_err(|e| archive_error(archive_path, e))?;
    }
    Ok(())
}

/// Path of the extracted executable: `<dest>/<tool>` or `<dest>/<tool>.exe`.
pub fn find_binary(dest: &Path, tool: &str) -> Result<PathBuf> {
    let bare = dest.join(tool);
    if bare.is_file() {
        return Ok(bare);
    }
    let exe = dest.join(format!("{tool}.exe"));
    if exe.is_file() {
        return Ok(exe);
    }
    Err(Error::BinaryNotFound {
        name: tool.to_owned(),
        dir: dest.to_path_buf(),
    })
}
