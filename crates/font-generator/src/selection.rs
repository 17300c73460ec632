//! Caller-supplied per-font selection: renames, recodes and glyph transforms

use std::collections::BTreeMap;

use read_fonts::FontRef;

use crate::{
    Result,
    glyph_name::GlyphName,
    source::{read_char_map, read_glyph_name},
    types::Codepoint,
};

/// Where a selected source codepoint lands in the generated font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEntry {
    pub new_codepoint: Codepoint,
    pub new_name: GlyphName,
}

impl RenameEntry {
    pub fn new(new_codepoint: impl Into<Codepoint>, new_name: impl Into<GlyphName>) -> Self {
        Self { new_codepoint: new_codepoint.into(), new_name: new_name.into() }
    }
}

/// Source codepoint -> (new codepoint, new name), for one font.
///
/// The keys double as the codepoint selection for that font; an empty table
/// selects every codepoint of the font's character map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameTable(BTreeMap<Codepoint, RenameEntry>);

impl RenameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity recode of every mapped codepoint, named after the font's own
    /// `post` names (falling back to `uniXXXX`).
    pub fn identity(font: &FontRef) -> Result<Self> {
        Self::identity_for(font, |_| true)
    }

    /// Identity recode restricted to the codepoints accepted by `filter`.
    pub fn identity_for(font: &FontRef, filter: impl Fn(Codepoint) -> bool) -> Result<Self> {
        let table = read_char_map(font)?
            .into_iter()
            .filter(|(cp, _)| filter(*cp))
            .map(|(cp, gid)| {
                let name = read_glyph_name(font, gid).unwrap_or_else(|| GlyphName::for_codepoint(cp));
                (cp, RenameEntry { new_codepoint: cp, new_name: name })
            })
            .collect();
        Ok(Self(table))
    }

    pub fn insert(&mut self, codepoint: impl Into<Codepoint>, entry: RenameEntry) -> &mut Self {
        self.0.insert(codepoint.into(), entry);
        self
    }

    /// Builder-style insert
    pub fn with(mut self, codepoint: impl Into<Codepoint>, entry: RenameEntry) -> Self {
        self.insert(codepoint, entry);
        self
    }

    pub fn get(&self, codepoint: Codepoint) -> Option<&RenameEntry> {
        self.0.get(&codepoint)
    }

    pub fn contains(&self, codepoint: Codepoint) -> bool {
        self.0.contains_key(&codepoint)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Codepoint, &RenameEntry)> {
        self.0.iter()
    }
}

impl FromIterator<(Codepoint, RenameEntry)> for RenameTable {
    fn from_iter<I: IntoIterator<Item = (Codepoint, RenameEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Translation then scale, applied to the points of a simple glyph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphTransform {
    pub translation: (i32, i32),
    pub scale: (f64, f64),
}

impl Default for GlyphTransform {
    fn default() -> Self {
        Self { translation: (0, 0), scale: (1.0, 1.0) }
    }
}

impl GlyphTransform {
    pub fn new(translation: (i32, i32), scale: (f64, f64)) -> Self {
        Self { translation, scale }
    }

    pub fn translate(x: i32, y: i32) -> Self {
        Self { translation: (x, y), ..Self::default() }
    }

    pub fn scale(sx: f64, sy: f64) -> Self {
        Self { scale: (sx, sy), ..Self::default() }
    }

    pub fn is_identity(&self) -> bool {
        self.translation == (0, 0) && self.scale == (1.0, 1.0)
    }

    /// `p * s + t`, rounded to the font grid.
    pub fn apply(&self, x: i32, y: i32) -> (i32, i32) {
        let nx = (x as f64 * self.scale.0).round() as i32 + self.translation.0;
        let ny = (y as f64 * self.scale.1).round() as i32 + self.translation.1;
        (nx, ny)
    }

    /// Scale a horizontal metric, rounding toward negative infinity.
    pub fn scale_metric(&self, value: i32) -> i32 {
        (value as f64 * self.scale.0).floor() as i32
    }
}

/// Source codepoint -> transform, for one font
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformTable(BTreeMap<Codepoint, GlyphTransform>);

impl TransformTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, codepoint: impl Into<Codepoint>, transform: GlyphTransform) -> &mut Self {
        self.0.insert(codepoint.into(), transform);
        self
    }

    pub fn with(mut self, codepoint: impl Into<Codepoint>, transform: GlyphTransform) -> Self {
        self.insert(codepoint, transform);
        self
    }

    pub fn get(&self, codepoint: Codepoint) -> Option<&GlyphTransform> {
        self.0.get(&codepoint)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Everything the caller decides about one source font
#[derive(Debug, Clone, Default)]
pub struct GlyphSelection {
    pub renames: RenameTable,
    pub transforms: TransformTable,
}

impl GlyphSelection {
    pub fn new(renames: RenameTable) -> Self {
        Self { renames, transforms: TransformTable::default() }
    }

    pub fn with_transforms(mut self, transforms: TransformTable) -> Self {
        self.transforms = transforms;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_translates_after_scaling() {
        let t = GlyphTransform::new((10, -5), (2.0, 0.5));
        assert_eq!(t.apply(100, 100), (210, 45));
        assert_eq!(t.apply(-3, 3), (4, -3));
        assert!(!t.is_identity());
        assert!(GlyphTransform::default().is_identity());
    }

    #[test]
    fn test_metric_scaling_floors() {
        let t = GlyphTransform::scale(0.75, 1.0);
        assert_eq!(t.scale_metric(500), 375);
        assert_eq!(t.scale_metric(501), 375);
        assert_eq!(t.scale_metric(-3), -3);
    }

    #[test]
    fn test_rename_table() {
        let table = RenameTable::new()
            .with(0x41u32, RenameEntry::new(0xE000u32, "icon_home"))
            .with(0x42u32, RenameEntry::new(0xE001u32, "icon_user"));
        assert_eq!(table.len(), 2);
        assert!(table.contains(Codepoint::new(0x41)));
        assert_eq!(table.get(Codepoint::new(0x42)).unwrap().new_name, "icon_user");
        assert!(table.get(Codepoint::new(0x43)).is_none());
    }
}
