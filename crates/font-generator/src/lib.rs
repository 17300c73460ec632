mod coordinator;
mod error;
mod generator;
mod glyph_name;
mod options;
mod outline;
mod remap;
mod resolver;
mod selection;
mod source;
mod tables;
mod transform;
mod types;

pub use coordinator::{MergedModel, merge_character_maps};
pub use error::{FontError, Result};
pub use generator::FontGenerator;
pub use glyph_name::GlyphName;
pub use options::Options;
pub use outline::{BoundingBox, GlyphData, GlyphKind, OutlineProvider};
pub use remap::GlyphIdMap;
pub use resolver::resolve_glyphs;
pub use selection::{GlyphSelection, GlyphTransform, RenameEntry, RenameTable, TransformTable};
pub use source::{FontFile, FontSource, read_char_map, read_glyph_name};
pub use tables::{cmap::CmapFormat4, glyf::LocaFormat, hmtx::HMetric};
pub use transform::SimpleOutline;
pub use types::{Codepoint, FontGlyphId, FontId, GlyphId, NewGlyphId, TableTag};

/// Merge fonts with an identity recode of every codepoint and default options.
///
/// The first font is the base.
///
/// # Example
///
/// ```no_run
/// use glyphmerge_font_generator::merge_fonts_bytes;
///
/// let font1 = std::fs::read("font1.ttf").unwrap();
/// let font2 = std::fs::read("font2.ttf").unwrap();
/// let merged = merge_fonts_bytes(&[&font1, &font2]).unwrap();
/// ```
pub fn merge_fonts_bytes(fonts: &[&[u8]]) -> Result<Vec<u8>> {
    let mut generator = FontGenerator::new();
    for &data in fonts {
        let renames = RenameTable::identity(&read_fonts::FontRef::new(data)?)?;
        generator.add_font(FontSource::open(data, GlyphSelection::new(renames))?, false);
    }
    generator.generate()
}
