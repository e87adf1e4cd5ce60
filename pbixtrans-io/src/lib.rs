//! pbixtrans I/O - Package handling and the translate pipeline
//!
//! This crate provides the filesystem side of pbixtrans:
//!
//! - Unpacking and repacking `.pbix` archives
//! - Loading and saving the `Report/Layout` document of an extracted tree
//! - The end-to-end translate pipeline used by the CLI

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod archive;
pub mod store;

// Re-export commonly used types
pub use pbixtrans_format::{ErrorKind, LanguageCode, PbixError, Result, TranslationError};
pub use pbixtrans_layout::{
    Document, LayoutTranslator, RetryPolicy, RetryingTranslator, TraversalSummary, Translator,
    VisualRegistry,
};

// Re-export our own types
pub use archive::{
    default_extract_dir, pack, read_member, remove_security_bindings, unpack, unpack_into,
    validate_package, PackSummary,
};
pub use store::{layout_path, load_layout, save_layout};

use pbixtrans_format::constants::PACKAGE_EXTENSION;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Everything needed to translate one package.
pub struct TranslateRequest<T> {
    /// Source package
    pub input: PathBuf,
    /// Destination package, defaults to [`output_path_for`]
    pub output: Option<PathBuf>,
    /// Scratch directory for extraction, defaults to [`default_extract_dir`]
    pub work_dir: Option<PathBuf>,
    /// Target language
    pub language: LanguageCode,
    /// Translation provider
    pub translator: T,
    /// Visual handlers
    pub registry: VisualRegistry,
    /// Retry policy applied around `translator`
    pub retry: RetryPolicy,
}

impl<T: Translator> TranslateRequest<T> {
    /// Request with default output, work directory, handlers and retry policy.
    pub fn new(input: impl Into<PathBuf>, language: LanguageCode, translator: T) -> Self {
        Self {
            input: input.into(),
            output: None,
            work_dir: None,
            language,
            translator,
            registry: VisualRegistry::standard(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Outcome of [`execute_translate`].
#[derive(Debug, Clone, Serialize)]
pub struct TranslateSummary {
    /// Source package
    pub input: PathBuf,
    /// Package that was written
    pub output: PathBuf,
    /// Target language
    pub language: String,
    /// Layout traversal counters
    pub traversal: TraversalSummary,
    /// Archive counters
    pub pack: PackSummary,
}

/// Default output path: `<stem>_<lang>.pbix` next to `input`.
pub fn output_path_for(input: &Path, language: &LanguageCode) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{}_{}.{}", stem, language, PACKAGE_EXTENSION))
}

/// Unpack, translate the layout, save it and repack.
///
/// Nothing is written when the input is invalid. The scratch directory must
/// be missing or empty; it belongs to this run and is removed on any failure,
/// including a failed unpack, so no output package is produced and no
/// extracted member survives into a later run.
pub fn execute_translate<T: Translator>(request: TranslateRequest<T>) -> Result<TranslateSummary> {
    let TranslateRequest {
        input,
        output,
        work_dir,
        language,
        translator,
        registry,
        retry,
    } = request;

    validate_package(&input)?;
    let output = output.unwrap_or_else(|| output_path_for(&input, &language));
    let scratch = ScratchDir::claim(work_dir.unwrap_or_else(|| default_extract_dir(&input)))?;
    scratch.ensure_outside(&output)?;
    info!(input = %input.display(), output = %output.display(), language = %language, "translating package");

    unpack_into(&input, scratch.path())?;

    let engine = LayoutTranslator::new(RetryingTranslator::new(translator, retry), registry);
    let (traversal, pack) = translate_tree(&engine, scratch.path(), &output, &language)?;
    scratch.release();
    info!(output = %output.display(), members = pack.members, "package written");
    Ok(TranslateSummary {
        input,
        output,
        language: language.to_string(),
        traversal,
        pack,
    })
}

/// Extraction directory owned by one pipeline run.
///
/// Dropping it without [`ScratchDir::release`] deletes everything extracted
/// into it. A directory that existed (empty) beforehand is left empty again.
struct ScratchDir {
    path: PathBuf,
    created: bool,
    armed: bool,
}

impl ScratchDir {
    fn claim(path: PathBuf) -> Result<Self> {
        let created = match fs::read_dir(&path) {
            Ok(mut entries) => {
                if entries.next().is_some() {
                    return Err(PbixError::Config(format!(
                        "work directory {} already exists and is not empty",
                        path.display()
                    )));
                }
                false
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => true,
            Err(err) => return Err(err.into()),
        };
        fs::create_dir_all(&path)?;
        Ok(Self {
            path,
            created,
            armed: true,
        })
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// Reject an output package that would land inside the scratch tree.
    fn ensure_outside(&self, output: &Path) -> Result<()> {
        let parent = output
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        if let (Ok(parent), Ok(scratch)) = (fs::canonicalize(parent), fs::canonicalize(&self.path)) {
            if parent.starts_with(&scratch) {
                return Err(PbixError::Config(format!(
                    "output {} must not be inside the work directory {}",
                    output.display(),
                    self.path.display()
                )));
            }
        }
        Ok(())
    }

    /// Keep whatever is left; packing has already consumed the tree.
    fn release(mut self) {
        self.armed = false;
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if !self.armed || !self.path.exists() {
            return;
        }
        let cleanup = fs::remove_dir_all(&self.path).and_then(|()| {
            if self.created {
                Ok(())
            } else {
                fs::create_dir(&self.path)
            }
        });
        if let Err(err) = cleanup {
            warn!(dir = %self.path.display(), error = %err, "failed to clean up work directory");
        }
    }
}

fn translate_tree<T: Translator>(
    engine: &LayoutTranslator<T>,
    work_dir: &Path,
    output: &Path,
    language: &LanguageCode,
) -> Result<(TraversalSummary, PackSummary)> {
    let mut document = load_layout(work_dir)?;
    let traversal = engine.rewrite(&mut document, language)?;
    save_layout(&document, work_dir)?;
    let packed = pack(work_dir, output)?;
    Ok((traversal, packed))
}
