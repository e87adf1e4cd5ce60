//! Package archive round trip
//!
//! A `.pbix` package is a ZIP archive. [`unpack`] mirrors it into a directory
//! tree; [`pack`] turns the tree back into a package, dropping
//! `SecurityBindings`, which Power BI Desktop rejects once the layout has been
//! modified.
//!
//! Packing writes members in sorted path order with fixed timestamps, so the
//! same tree always yields the same bytes. Output goes to a temporary file in
//! the destination directory and is renamed into place only once complete.

use pbixtrans_format::constants::{EXTRACT_DIR_SUFFIX, PACKAGE_EXTENSION, SECURITY_BINDINGS_MEMBER};
use pbixtrans_format::{PbixError, Result};
use serde::Serialize;
use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::result::ZipError;
use zip::write::FileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

/// Result of [`pack`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackSummary {
    /// Members written to the package
    pub members: usize,
    /// Total uncompressed size of all members
    pub uncompressed_bytes: u64,
    /// Whether a `SecurityBindings` file was removed from the tree
    pub security_bindings_removed: bool,
}

/// Check that `package` exists and carries the `.pbix` extension.
pub fn validate_package(package: &Path) -> Result<()> {
    if !package.is_file() {
        return Err(PbixError::PackageNotFound(package.to_path_buf()));
    }
    let has_extension = package
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PACKAGE_EXTENSION));
    if !has_extension {
        return Err(PbixError::UnsupportedExtension(package.to_path_buf()));
    }
    Ok(())
}

/// Extraction directory used by [`unpack`]: `<stem>_extracted` next to the package.
pub fn default_extract_dir(package: &Path) -> PathBuf {
    let stem = package
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    package.with_file_name(format!("{}{}", stem, EXTRACT_DIR_SUFFIX))
}

/// Extract `package` into [`default_extract_dir`] and return that directory.
pub fn unpack(package: &Path) -> Result<PathBuf> {
    let target = default_extract_dir(package);
    unpack_into(package, &target)?;
    Ok(target)
}

/// Extract `package` into `target`, returning the number of files written.
///
/// `target` is created if needed. Existing files are overwritten, other
/// existing content is left in place.
pub fn unpack_into(package: &Path, target: &Path) -> Result<usize> {
    validate_package(package)?;
    let mut archive = open_archive(package)?;
    info!(package = %package.display(), target = %target.display(), members = archive.len(), "unpacking package");

    fs::create_dir_all(target)?;
    let mut files = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(invalid_archive)?;
        let relative = entry
            .enclosed_name()
            .map(Path::to_path_buf)
            .ok_or_else(|| PbixError::UnsafeEntryPath(entry.name().to_string()))?;
        let destination = target.join(&relative);

        if entry.is_dir() {
            fs::create_dir_all(&destination)?;
            continue;
        }
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&destination)?;
        let written = io::copy(&mut entry, &mut out)?;
        debug!(member = entry.name(), bytes = written, "extracted");
        files += 1;
    }
    Ok(files)
}

/// Read one member of `package` without extracting it.
pub fn read_member(package: &Path, member: &str) -> Result<Vec<u8>> {
    validate_package(package)?;
    let mut archive = open_archive(package)?;
    let mut entry = match archive.by_name(member) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => {
            return Err(PbixError::MemberNotFound {
                member: member.to_string(),
                container: package.to_path_buf(),
            })
        }
        Err(err) => return Err(invalid_archive(err)),
    };
    let mut bytes = Vec::with_capacity(entry.size() as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Delete `SecurityBindings` at the root of `dir`. Returns whether it existed.
pub fn remove_security_bindings(dir: &Path) -> Result<bool> {
    match fs::remove_file(dir.join(SECURITY_BINDINGS_MEMBER)) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Archive `dir` into `output` and delete `dir`.
///
/// `SecurityBindings` is removed first. A pre-existing `output` is replaced;
/// on failure it is left as it was and `dir` is kept.
pub fn pack(dir: &Path, output: &Path) -> Result<PackSummary> {
    if !dir.is_dir() {
        return Err(PbixError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("directory not found: {}", dir.display()),
        )));
    }
    let parent = output
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if fs::canonicalize(parent)?.starts_with(fs::canonicalize(dir)?) {
        return Err(PbixError::Config(format!(
            "output {} must not be inside the directory being packed",
            output.display()
        )));
    }

    let security_bindings_removed = remove_security_bindings(dir)?;
    let files = collect_files(dir)?;
    info!(dir = %dir.display(), output = %output.display(), members = files.len(), "packing package");

    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut staged = tempfile::Builder::new()
        .prefix(".pbixtrans-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    let mut uncompressed_bytes = 0u64;
    {
        let mut writer = ZipWriter::new(staged.as_file_mut());
        for (name, path) in &files {
            let bytes = fs::read(path)?;
            writer.start_file(name.as_str(), options).map_err(write_error)?;
            writer.write_all(&bytes)?;
            uncompressed_bytes += bytes.len() as u64;
            debug!(member = %name, bytes = bytes.len(), "packed");
        }
        writer.finish().map_err(write_error)?;
    }
    staged.as_file().sync_all()?;
    staged.persist(output).map_err(|err| PbixError::Io(err.error))?;

    fs::remove_dir_all(dir)?;
    Ok(PackSummary {
        members: files.len(),
        uncompressed_bytes,
        security_bindings_removed,
    })
}

fn open_archive(package: &Path) -> Result<ZipArchive<File>> {
    let file = File::open(package)?;
    ZipArchive::new(file).map_err(invalid_archive)
}

fn invalid_archive(err: ZipError) -> PbixError {
    PbixError::InvalidArchive(err.to_string())
}

fn write_error(err: ZipError) -> PbixError {
    match err {
        ZipError::Io(err) => PbixError::Io(err),
        other => PbixError::Io(io::Error::new(io::ErrorKind::Other, other.to_string())),
    }
}

/// Every regular file under `root` as (`/`-separated member name, path), sorted by name.
fn collect_files(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() {
                let name = member_name(root, &path)?;
                files.push((name, path));
            }
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn member_name(root: &Path, path: &Path) -> Result<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| PbixError::UnsafeEntryPath(path.display().to_string()))?;
    let parts = relative
        .components()
        .map(|component| {
            component
                .as_os_str()
                .to_str()
                .ok_or_else(|| PbixError::UnsafeEntryPath(relative.display().to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbixtrans_format::ErrorKind;
    use tempfile::TempDir;

    fn tree(files: &[(&str, &[u8])]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, bytes) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, bytes).unwrap();
        }
        dir
    }

    #[test]
    fn test_default_extract_dir() {
        assert_eq!(
            default_extract_dir(Path::new("/data/report.pbix")),
            PathBuf::from("/data/report_extracted")
        );
        assert_eq!(
            default_extract_dir(Path::new("sales.v2.PBIX")),
            PathBuf::from("sales.v2_extracted")
        );
    }

    #[test]
    fn test_validate_package_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.pbix");
        assert_eq!(validate_package(&missing).unwrap_err().kind(), ErrorKind::NotFound);

        let zip = dir.path().join("report.zip");
        fs::write(&zip, b"PK").unwrap();
        assert_eq!(validate_package(&zip).unwrap_err().kind(), ErrorKind::Format);

        let upper = dir.path().join("REPORT.PBIX");
        fs::write(&upper, b"PK").unwrap();
        assert!(validate_package(&upper).is_ok());

        let folder = dir.path().join("folder.pbix");
        fs::create_dir(&folder).unwrap();
        assert_eq!(validate_package(&folder).unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_unpack_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let package = dir.path().join("broken.pbix");
        fs::write(&package, b"definitely not a zip archive").unwrap();
        let err = unpack(&package).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(package.exists());
    }

    #[test]
    fn test_member_names_sorted_with_slashes() {
        let dir = tree(&[
            ("Version", b"1"),
            ("Report/Layout", b"{}"),
            ("Report/StaticResources/a.png", b"png"),
            ("DataModel", b"dm"),
        ]);
        let names: Vec<_> = collect_files(dir.path())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(
            names,
            vec!["DataModel", "Report/Layout", "Report/StaticResources/a.png", "Version"]
        );
    }

    #[test]
    fn test_remove_security_bindings_absent_is_ok() {
        let dir = tree(&[("Version", b"1")]);
        assert!(!remove_security_bindings(dir.path()).unwrap());
        fs::write(dir.path().join("SecurityBindings"), b"x").unwrap();
        assert!(remove_security_bindings(dir.path()).unwrap());
        assert!(!dir.path().join("SecurityBindings").exists());
    }

    #[test]
    fn test_pack_summary_and_cleanup() {
        let out = tempfile::tempdir().unwrap();
        let dir = tree(&[("Version", b"12"), ("Report/Layout", b"abcd"), ("SecurityBindings", b"x")]);
        let source = dir.path().to_path_buf();
        let output = out.path().join("out.pbix");

        let summary = pack(&source, &output).unwrap();
        assert_eq!(
            summary,
            PackSummary {
                members: 2,
                uncompressed_bytes: 6,
                security_bindings_removed: true
            }
        );
        assert!(output.is_file());
        assert!(!source.exists());
        let leftovers: Vec<_> = fs::read_dir(out.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_pack_refuses_output_inside_source() {
        let dir = tree(&[("Version", b"1")]);
        let output = dir.path().join("nested.pbix");
        let err = pack(dir.path(), &output).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(dir.path().join("Version").exists());
    }

    #[test]
    fn test_pack_missing_dir_is_io() {
        let out = tempfile::tempdir().unwrap();
        let err = pack(&out.path().join("nope"), &out.path().join("x.pbix")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
