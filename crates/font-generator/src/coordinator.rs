//! Combining per-font selections into one merged model

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::{debug, warn};

use crate::{
    FontError, Result,
    glyph_name::GlyphName,
    selection::GlyphTransform,
    source::FontSource,
    types::{Codepoint, FontGlyphId, FontId},
};

/// Character map, names and resolved glyphs of all fonts being merged
#[derive(Debug, Clone, Default)]
pub struct MergedModel {
    /// New codepoint -> owning glyph
    pub char_map: BTreeMap<Codepoint, FontGlyphId>,
    /// Glyph -> new codepoint. A glyph reached from several codepoints keeps
    /// the highest one.
    pub reversed_char_map: BTreeMap<FontGlyphId, Codepoint>,
    /// New codepoint -> glyph name
    pub glyph_names: BTreeMap<Codepoint, GlyphName>,
    /// Every glyph the output needs, in canonical (font, glyph) order
    pub resolved: BTreeSet<FontGlyphId>,
    /// Outline transforms requested for selected glyphs
    pub transforms: HashMap<FontGlyphId, GlyphTransform>,
}

impl MergedModel {
    pub fn codepoint_of(&self, glyph: FontGlyphId) -> Option<Codepoint> {
        self.reversed_char_map.get(&glyph).copied()
    }

    /// The caller-chosen name of a glyph that is reachable from a codepoint
    pub fn name_of(&self, glyph: FontGlyphId) -> Option<&GlyphName> {
        self.codepoint_of(glyph).and_then(|cp| self.glyph_names.get(&cp))
    }

    pub fn transform_of(&self, glyph: FontGlyphId) -> Option<&GlyphTransform> {
        self.transforms.get(&glyph)
    }
}

/// Merge the character maps of `sources`, in order.
///
/// Every selected codepoint must have a rename entry; the first font that
/// breaks this fails the merge with all of its offending codepoints. When two
/// fonts claim the same new codepoint the later one wins.
pub fn merge_character_maps(sources: &[FontSource]) -> Result<MergedModel> {
    let mut model = MergedModel::default();

    for (idx, source) in sources.iter().enumerate() {
        let font = FontId::new(idx);

        let missing: Vec<Codepoint> = source
            .char_map()
            .keys()
            .copied()
            .filter(|cp| source.rename(*cp).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(FontError::MergeInvariantViolation { font, codepoints: missing });
        }

        for (&codepoint, &gid) in source.char_map() {
            let Some(entry) = source.rename(codepoint) else {
                continue;
            };
            let glyph = FontGlyphId::new(font, gid);
            let new_cp = entry.new_codepoint;

            if let Some(previous) = model.char_map.insert(new_cp, glyph)
                && previous != glyph
            {
                warn!("{new_cp} is mapped by both {previous} and {glyph}, keeping {glyph}");
            }
            model.reversed_char_map.insert(glyph, new_cp);
            model.glyph_names.insert(new_cp, entry.new_name.clone());

            if let Some(transform) = source.transform(codepoint)
                && !transform.is_identity()
            {
                model.transforms.insert(glyph, *transform);
            }
        }

        model
            .resolved
            .extend(source.resolved().iter().map(|gid| FontGlyphId::new(font, *gid)));

        debug!("{font}: {} codepoints, {} glyphs", source.char_map().len(), source.resolved().len());
    }

    Ok(model)
}
