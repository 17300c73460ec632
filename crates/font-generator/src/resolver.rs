//! Transitive closure of the glyphs a selection needs

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::{
    outline::{GlyphKind, OutlineProvider},
    types::GlyphId,
};

/// Resolve the set of glyphs reachable from `seeds` through composite
/// references.
///
/// Glyph 0 is always part of the result. Out-of-range and zero-length glyphs
/// are logged and left out; resolution carries on without them.
pub fn resolve_glyphs(
    seeds: impl IntoIterator<Item = GlyphId>,
    outlines: &impl OutlineProvider,
) -> BTreeSet<GlyphId> {
    let num_glyphs = outlines.num_glyphs();
    let mut resolved = BTreeSet::from([GlyphId::new(0)]);
    let mut unresolved: BTreeSet<GlyphId> = seeds.into_iter().collect();

    while let Some(gid) = unresolved.pop_first() {
        if gid.to_u16() >= num_glyphs {
            warn!("{gid} is out of range (font has {num_glyphs} glyphs), skipping");
            continue;
        }
        if outlines.glyph_length(gid) == 0 {
            debug!("{gid} has no outline data, skipping");
            continue;
        }

        resolved.insert(gid);

        if outlines.glyph_kind(gid) == GlyphKind::Composite {
            for component in outlines.component_ids(gid) {
                if !resolved.contains(&component) {
                    unresolved.insert(component);
                }
            }
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    /// In-memory outline table: gid -> (length, components)
    #[derive(Default)]
    struct FakeOutlines {
        num_glyphs: u16,
        glyphs: HashMap<u16, (usize, Vec<u16>)>,
    }

    impl FakeOutlines {
        fn new(num_glyphs: u16) -> Self {
            Self { num_glyphs, ..Default::default() }
        }

        fn simple(mut self, gid: u16) -> Self {
            self.glyphs.insert(gid, (20, Vec::new()));
            self
        }

        fn composite(mut self, gid: u16, components: &[u16]) -> Self {
            self.glyphs.insert(gid, (30, components.to_vec()));
            self
        }
    }

    impl OutlineProvider for FakeOutlines {
        fn num_glyphs(&self) -> u16 {
            self.num_glyphs
        }

        fn glyph_length(&self, gid: GlyphId) -> usize {
            self.glyphs.get(&gid.to_u16()).map_or(0, |g| g.0)
        }

        fn glyph_offset(&self, _gid: GlyphId) -> usize {
            0
        }

        fn glyph_kind(&self, gid: GlyphId) -> GlyphKind {
            match self.glyphs.get(&gid.to_u16()) {
                None => GlyphKind::Empty,
                Some((_, c)) if c.is_empty() => GlyphKind::Simple,
                Some(_) => GlyphKind::Composite,
            }
        }

        fn component_ids(&self, gid: GlyphId) -> Vec<GlyphId> {
            self.glyphs
                .get(&gid.to_u16())
                .map(|g| g.1.iter().copied().map(GlyphId::new).collect())
                .unwrap_or_default()
        }
    }

    fn ids(set: &BTreeSet<GlyphId>) -> Vec<u16> {
        set.iter().map(|g| g.to_u16()).collect()
    }

    #[test]
    fn test_notdef_always_resolved() {
        let outlines = FakeOutlines::new(3);
        assert_eq!(ids(&resolve_glyphs([], &outlines)), vec![0]);
    }

    #[test]
    fn test_nested_composites() {
        let outlines = FakeOutlines::new(10)
            .simple(0)
            .simple(2)
            .simple(3)
            .composite(5, &[6, 2])
            .composite(6, &[3]);
        let resolved = resolve_glyphs([GlyphId::new(5)], &outlines);
        assert_eq!(ids(&resolved), vec![0, 2, 3, 5, 6]);
    }

    #[test]
    fn test_cyclic_composites_terminate() {
        let outlines = FakeOutlines::new(4).composite(1, &[2]).composite(2, &[1]);
        let resolved = resolve_glyphs([GlyphId::new(1)], &outlines);
        assert_eq!(ids(&resolved), vec![0, 1, 2]);
    }

    #[test]
    fn test_invalid_glyphs_skipped() {
        let outlines = FakeOutlines::new(4).simple(1).composite(2, &[3, 40]);
        // 3 is empty, 40 and 4 are out of range
        let resolved = resolve_glyphs([GlyphId::new(1), GlyphId::new(2), GlyphId::new(4)], &outlines);
        assert_eq!(ids(&resolved), vec![0, 1, 2]);
    }
}
