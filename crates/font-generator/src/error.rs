use std::{io, path::PathBuf, result};

use read_fonts::ReadError;
use thiserror::Error;
use write_fonts::BuilderError;

use crate::types::{Codepoint, FontId, GlyphId};

#[derive(Error, Debug)]
pub enum FontError {
    #[error("font file not found: {0}")]
    MissingFile(PathBuf),

    #[error("failed to read font: {0}")]
    ReadError(#[from] ReadError),

    #[error("font is missing required table '{table}'")]
    UnparsableFont { table: &'static str },

    #[error("{font} has codepoints without a rename entry: {}", list_codepoints(.codepoints))]
    MergeInvariantViolation { font: FontId, codepoints: Vec<Codepoint> },

    #[error("no fonts provided for generation")]
    NoFonts,

    #[error("base font {0} is not loaded")]
    MissingBaseFont(FontId),

    #[error("{font} is missing required table '{table}'")]
    MissingTable { font: FontId, table: &'static str },

    #[error("glyph {glyph} of {font} is malformed")]
    MalformedGlyph { font: FontId, glyph: GlyphId },

    #[error("too many glyphs for one font: {0}")]
    TooManyGlyphs(usize),

    #[error("cmap format 4 offsets overflow with {0} mapped codepoints")]
    CmapOverflow(usize),

    #[error("glyph name longer than 255 bytes: {0}")]
    GlyphNameTooLong(String),

    #[error("failed to build font: {0}")]
    BuilderError(#[from] BuilderError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

fn list_codepoints(codepoints: &[Codepoint]) -> String {
    codepoints.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

pub type Result<T> = result::Result<T, FontError>;
