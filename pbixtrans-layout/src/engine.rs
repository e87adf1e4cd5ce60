//! Layout traversal and visual dispatch

use crate::context::TranslationContext;
use crate::document::{ConfigEncoding, Document, VisualContainer};
use crate::port::Translator;
use crate::registry::VisualRegistry;
use pbixtrans_format::{LanguageCode, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Counters describing one [`LayoutTranslator::rewrite`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraversalSummary {
    /// Sections visited
    pub sections: usize,
    /// Sections whose display name was translated
    pub sections_renamed: usize,
    /// Visual containers visited
    pub containers: usize,
    /// Containers with a handled visual kind (config re-encoded)
    pub visuals_handled: usize,
    /// Containers left as they were (unknown kind, no visual, no config)
    pub visuals_passed_through: usize,
    /// Strings translated
    pub fragments_translated: usize,
    /// Blank strings skipped
    pub fragments_skipped_blank: usize,
    /// Handled visuals per `visualType`
    pub handled_by_kind: BTreeMap<String, usize>,
}

/// Walks a layout document and translates its text.
///
/// The translator and registry are fixed at construction; one instance can
/// rewrite any number of documents.
pub struct LayoutTranslator<T> {
    translator: T,
    registry: VisualRegistry,
}

impl<T: Translator> LayoutTranslator<T> {
    /// Create a traversal engine from its collaborators.
    pub fn new(translator: T, registry: VisualRegistry) -> Self {
        Self {
            translator,
            registry,
        }
    }

    /// Engine using [`VisualRegistry::standard`].
    pub fn with_standard_visuals(translator: T) -> Self {
        Self::new(translator, VisualRegistry::standard())
    }

    /// Registered visual handlers.
    pub fn registry(&self) -> &VisualRegistry {
        &self.registry
    }

    /// Translate every section title and every handled visual in `document`.
    ///
    /// Stops at the first error; the document may then be partially
    /// translated and must not be saved.
    pub fn rewrite(&self, document: &mut Document, language: &LanguageCode) -> Result<TraversalSummary> {
        info!(language = %language, sections = document.section_count(), "translating layout");

        let mut ctx = TranslationContext::new(&self.translator, language);
        let mut summary = TraversalSummary::default();

        for mut section in document.sections_mut() {
            summary.sections += 1;
            debug!(section = section.name().unwrap_or_default(), "visiting section");

            let title = section.display_name().map(str::to_owned);
            if let Some(title) = title {
                if let Some(translated) = ctx.translate("section", &title)? {
                    section.set_display_name(translated);
                    summary.sections_renamed += 1;
                }
            }

            for mut container in section.visual_containers() {
                summary.containers += 1;
                self.rewrite_container(&mut container, &mut ctx, &mut summary)?;
            }
        }

        let stats = ctx.stats();
        summary.fragments_translated = stats.translated;
        summary.fragments_skipped_blank = stats.skipped_blank;

        info!(
            sections = summary.sections,
            visuals = summary.visuals_handled,
            fragments = summary.fragments_translated,
            "layout translated"
        );
        Ok(summary)
    }

    fn rewrite_container(
        &self,
        container: &mut VisualContainer<'_>,
        ctx: &mut TranslationContext<'_>,
        summary: &mut TraversalSummary,
    ) -> Result<()> {
        let Some(mut config) = container.decode_config()? else {
            summary.visuals_passed_through += 1;
            return Ok(());
        };

        let tag = config.visual_type().map(str::to_owned);
        let handler = tag.as_deref().and_then(|tag| self.registry.get(tag));

        match (handler, tag) {
            (Some(handler), Some(tag)) => {
                if let Some(mut visual) = config.single_visual_mut() {
                    handler.handle(&mut visual, ctx)?;
                }
                container.store_config(&config)?;
                summary.visuals_handled += 1;
                *summary.handled_by_kind.entry(tag).or_default() += 1;
            }
            (_, tag) => {
                debug!(
                    visual_type = tag.as_deref().unwrap_or("<none>"),
                    "no handler, visual left untouched"
                );
                if config.encoding() == ConfigEncoding::Structured {
                    container.store_config(&config)?;
                }
                summary.visuals_passed_through += 1;
            }
        }
        Ok(())
    }
}
