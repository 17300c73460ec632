//! Bijective mapping between source glyphs and new glyph IDs

use std::collections::HashMap;

use crate::{
    FontError, Result,
    types::{FontGlyphId, NewGlyphId},
};

/// Source glyph <-> new glyph ID.
///
/// Built once by the glyf pass, in the order glyphs are written, and only
/// read afterwards.
#[derive(Debug, Clone, Default)]
pub struct GlyphIdMap {
    new_to_old: Vec<FontGlyphId>,
    old_to_new: HashMap<FontGlyphId, NewGlyphId>,
}

impl GlyphIdMap {
    /// Assign new IDs 0, 1, 2, ... in iteration order.
    ///
    /// Duplicates keep their first ID.
    pub fn from_ordered(glyphs: impl IntoIterator<Item = FontGlyphId>) -> Result<Self> {
        let mut map = Self::default();
        for glyph in glyphs {
            if map.old_to_new.contains_key(&glyph) {
                continue;
            }
            let next = map.new_to_old.len();
            if next >= u16::MAX as usize {
                return Err(FontError::TooManyGlyphs(next + 1));
            }
            map.old_to_new.insert(glyph, NewGlyphId::new(next as u16));
            map.new_to_old.push(glyph);
        }
        Ok(map)
    }

    pub fn get(&self, glyph: FontGlyphId) -> Option<NewGlyphId> {
        self.old_to_new.get(&glyph).copied()
    }

    pub fn old(&self, new_id: NewGlyphId) -> Option<FontGlyphId> {
        self.new_to_old.get(new_id.as_usize()).copied()
    }

    pub fn contains(&self, glyph: FontGlyphId) -> bool {
        self.old_to_new.contains_key(&glyph)
    }

    pub fn len(&self) -> usize {
        self.new_to_old.len()
    }

    pub fn is_empty(&self) -> bool {
        self.new_to_old.is_empty()
    }

    /// Glyph count for `maxp`; construction caps it at `u16::MAX`
    pub fn num_glyphs(&self) -> u16 {
        self.new_to_old.len() as u16
    }

    /// (new ID, source glyph) in new-ID order
    pub fn iter(&self) -> impl Iterator<Item = (NewGlyphId, FontGlyphId)> + '_ {
        self.new_to_old
            .iter()
            .enumerate()
            .map(|(idx, glyph)| (NewGlyphId::new(idx as u16), *glyph))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FontId, GlyphId};

    fn fg(font: usize, glyph: u16) -> FontGlyphId {
        FontGlyphId::new(FontId::new(font), GlyphId::new(glyph))
    }

    #[test]
    fn test_assigns_in_order() {
        let map = GlyphIdMap::from_ordered([fg(0, 0), fg(0, 5), fg(1, 0), fg(1, 7)]).unwrap();
        assert_eq!(map.len(), 4);
        assert_eq!(map.get(fg(0, 5)), Some(NewGlyphId::new(1)));
        assert_eq!(map.get(fg(1, 7)), Some(NewGlyphId::new(3)));
        assert_eq!(map.old(NewGlyphId::new(2)), Some(fg(1, 0)));
        assert_eq!(map.get(fg(2, 0)), None);
    }

    #[test]
    fn test_is_bijective() {
        let map = GlyphIdMap::from_ordered([fg(0, 3), fg(0, 1), fg(0, 3)]).unwrap();
        assert_eq!(map.len(), 2);
        for (new_id, old) in map.iter() {
            assert_eq!(map.get(old), Some(new_id));
        }
    }

    #[test]
    fn test_too_many_glyphs() {
        let glyphs = (0..u16::MAX as usize).map(|i| fg(i / 1000, (i % 1000) as u16));
        assert_eq!(GlyphIdMap::from_ordered(glyphs).unwrap().num_glyphs(), u16::MAX);

        let glyphs = (0..=u16::MAX as usize).map(|i| fg(i / 1000, (i % 1000) as u16));
        assert!(matches!(GlyphIdMap::from_ordered(glyphs), Err(FontError::TooManyGlyphs(_))));
    }
}
