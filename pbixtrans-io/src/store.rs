//! Layout document store over an extracted package tree

use pbixtrans_format::constants::LAYOUT_MEMBER;
use pbixtrans_format::{PbixError, Result};
use pbixtrans_layout::Document;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Location of `Report/Layout` inside an extracted tree.
pub fn layout_path(dir: &Path) -> PathBuf {
    LAYOUT_MEMBER
        .split('/')
        .fold(dir.to_path_buf(), |path, part| path.join(part))
}

/// Read and parse the layout document of the tree at `dir`.
pub fn load_layout(dir: &Path) -> Result<Document> {
    let path = layout_path(dir);
    if !path.is_file() {
        return Err(PbixError::MemberNotFound {
            member: LAYOUT_MEMBER.to_string(),
            container: dir.to_path_buf(),
        });
    }
    let bytes = fs::read(&path)?;
    debug!(path = %path.display(), bytes = bytes.len(), "loading layout");
    Document::from_layout_bytes(&bytes)
}

/// Serialize `document` and write it over the layout of the tree at `dir`.
pub fn save_layout(document: &Document, dir: &Path) -> Result<()> {
    let path = layout_path(dir);
    let bytes = document.to_layout_bytes()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &bytes)?;
    debug!(path = %path.display(), bytes = bytes.len(), "saved layout");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pbixtrans_format::text::encode_utf16le;
    use pbixtrans_format::ErrorKind;

    fn write_layout(dir: &Path, bytes: &[u8]) {
        let path = layout_path(dir);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_layout_path() {
        assert_eq!(
            layout_path(Path::new("x")),
            Path::new("x").join("Report").join("Layout")
        );
    }

    #[test]
    fn test_save_writes_utf16le_compact_without_bom() {
        let dir = tempfile::tempdir().unwrap();
        write_layout(dir.path(), &encode_utf16le("{ \"sections\" : [ {\"displayName\": \"Übersicht\"} ] }"));

        let doc = load_layout(dir.path()).unwrap();
        save_layout(&doc, dir.path()).unwrap();

        let written = fs::read(layout_path(dir.path())).unwrap();
        assert_eq!(written, encode_utf16le(r#"{"sections":[{"displayName":"Übersicht"}]}"#));
        assert_ne!(&written[..2], &[0xff, 0xfe]);
    }

    #[test]
    fn test_load_missing_layout_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_layout(dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_load_errors_are_parse() {
        let dir = tempfile::tempdir().unwrap();
        write_layout(dir.path(), b"{\"a\":1}");
        assert_eq!(load_layout(dir.path()).unwrap_err().kind(), ErrorKind::Parse);

        write_layout(dir.path(), &encode_utf16le("{\"a\":"));
        assert_eq!(load_layout(dir.path()).unwrap_err().kind(), ErrorKind::Parse);
    }
}
