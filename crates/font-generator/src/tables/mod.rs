//! Table builders for the generated font
//!
//! Builders run in a fixed order: `glyf`/`loca` first, since it assigns the
//! new glyph IDs that every later builder reads.

pub mod cmap;
pub mod glyf;
pub mod head;
pub mod hmtx;
pub mod maxp;
pub mod post;
mod post_names;

use crate::{
    FontError, Result,
    coordinator::MergedModel,
    options::Options,
    source::FontSource,
    types::FontId,
};

/// Inputs shared by all table builders
#[derive(Clone, Copy)]
pub struct AssemblyContext<'s, 'a> {
    pub sources: &'s [FontSource<'a>],
    pub base: FontId,
    pub model: &'s MergedModel,
    pub options: &'s Options,
}

impl<'s, 'a> AssemblyContext<'s, 'a> {
    pub fn source(&self, font: FontId) -> Result<&'s FontSource<'a>> {
        self.sources.get(font.as_usize()).ok_or(FontError::MissingBaseFont(font))
    }

    pub fn base_source(&self) -> Result<&'s FontSource<'a>> {
        self.source(self.base)
    }

    /// Sources with the base font first, then the rest in insertion order
    pub fn base_first(&self) -> impl Iterator<Item = &'s FontSource<'a>> + '_ {
        let base = self.base.as_usize();
        self.sources
            .get(base)
            .into_iter()
            .chain(self.sources.iter().enumerate().filter(move |(i, _)| *i != base).map(|(_, s)| s))
    }
}
