//! pbixtrans Layout - Report layout traversal engine
//!
//! This crate walks a parsed `Report/Layout` document and translates its
//! user-facing text:
//!
//! - Typed views over sections, visual containers and single visuals
//! - The visual handler registry keyed by `visualType`
//! - Built-in handlers for text boxes, shapes, action buttons and slicers
//! - The translation port and its retry wrapper
//! - The traversal engine that ties them together

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod context;
pub mod document;
pub mod engine;
pub mod nested;
pub mod port;
pub mod registry;
pub mod visuals;

// Re-export commonly used types
pub use pbixtrans_format::{ErrorKind, LanguageCode, PbixError, Result, TranslationError};

// Re-export our own types
pub use context::{FragmentStats, TranslationContext};
pub use document::{
    ConfigEncoding, Document, Section, SectionOutline, SingleVisual, VisualConfig,
    VisualContainer, VisualOutline,
};
pub use engine::{LayoutTranslator, TraversalSummary};
pub use port::{from_fn, FnTranslator, RetryPolicy, RetryingTranslator, Translator};
pub use registry::{handler_fn, FnHandler, VisualHandler, VisualKind, VisualRegistry};
