//! Source font loading and per-font character maps

use std::{
    collections::{BTreeMap, BTreeSet},
    fs,
    path::{Path, PathBuf},
};

use log::debug;
use read_fonts::{
    FontRef, TableProvider,
    tables::cmap::{Cmap as ReadCmap, CmapSubtable, PlatformId},
    types::{GlyphId16, Tag},
};

use crate::{
    FontError, Result,
    glyph_name::GlyphName,
    outline::GlyphData,
    resolver::resolve_glyphs,
    selection::{GlyphSelection, GlyphTransform, RenameEntry},
    types::{Codepoint, GlyphId},
};

/// Tables a font needs before it can take part in a merge
const REQUIRED_TABLES: [(Tag, &str); 4] = [
    (Tag::new(b"cmap"), "cmap"),
    (Tag::new(b"glyf"), "glyf"),
    (Tag::new(b"loca"), "loca"),
    (Tag::new(b"head"), "head"),
];

/// A font file read from disk
#[derive(Debug, Clone)]
pub struct FontFile {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

impl FontFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FontError::MissingFile(path.to_path_buf()));
        }
        let data = fs::read(path)?;
        debug!("Loaded {} ({} bytes)", path.display(), data.len());
        Ok(Self { path: path.to_path_buf(), data })
    }
}

/// One opened source font with its selection already resolved
#[derive(Clone)]
pub struct FontSource<'a> {
    font: FontRef<'a>,
    glyphs: GlyphData<'a>,
    selection: GlyphSelection,
    char_map: BTreeMap<Codepoint, GlyphId>,
    resolved: BTreeSet<GlyphId>,
}

impl<'a> FontSource<'a> {
    /// Parse `data`, build the character map restricted to the selection's
    /// rename keys (or every codepoint when there are none) and resolve the
    /// glyph closure.
    pub fn open(data: &'a [u8], selection: GlyphSelection) -> Result<Self> {
        let font = FontRef::new(data)?;
        for (tag, table) in REQUIRED_TABLES {
            if font.table_data(tag).is_none() {
                return Err(FontError::UnparsableFont { table });
            }
        }

        let glyphs = GlyphData::from_font(&font)?;
        let renames = &selection.renames;
        let char_map: BTreeMap<_, _> = read_char_map(&font)?
            .into_iter()
            .filter(|(cp, _)| renames.is_empty() || renames.contains(*cp))
            .collect();
        let resolved = resolve_glyphs(char_map.values().copied(), &glyphs);

        debug!(
            "Opened font: {} codepoints selected, {} glyphs resolved",
            char_map.len(),
            resolved.len()
        );

        Ok(Self { font, glyphs, selection, char_map, resolved })
    }

    pub fn font(&self) -> &FontRef<'a> {
        &self.font
    }

    pub fn glyphs(&self) -> &GlyphData<'a> {
        &self.glyphs
    }

    /// Selected codepoint -> source glyph
    pub fn char_map(&self) -> &BTreeMap<Codepoint, GlyphId> {
        &self.char_map
    }

    /// Glyphs needed by the selection, in ascending ID order
    pub fn resolved(&self) -> &BTreeSet<GlyphId> {
        &self.resolved
    }

    pub fn rename(&self, codepoint: Codepoint) -> Option<&RenameEntry> {
        self.selection.renames.get(codepoint)
    }

    pub fn transform(&self, codepoint: Codepoint) -> Option<&GlyphTransform> {
        self.selection.transforms.get(codepoint)
    }

    pub fn glyph_name(&self, gid: GlyphId) -> Option<GlyphName> {
        read_glyph_name(&self.font, gid)
    }
}

/// Read a font's Unicode character map from its best cmap subtable.
///
/// Mappings to glyph 0 are dropped.
pub fn read_char_map(font: &FontRef) -> Result<BTreeMap<Codepoint, GlyphId>> {
    let cmap = font.cmap()?;
    Ok(find_best_subtable(&cmap)
        .map(|subtable| iter_cmap_subtable(&subtable).into_iter().collect())
        .unwrap_or_default())
}

/// Look up a glyph's name in the font's `post` table
pub fn read_glyph_name(font: &FontRef, gid: GlyphId) -> Option<GlyphName> {
    let post = font.post().ok()?;
    post.glyph_name(GlyphId16::new(gid.to_u16())).map(GlyphName::from)
}

fn find_best_subtable<'a>(cmap: &'a ReadCmap<'a>) -> Option<CmapSubtable<'a>> {
    // Priority: Format 12 (full Unicode) > Format 4 (BMP) > others
    let records = cmap.encoding_records();

    for record in records {
        if (record.platform_id() == PlatformId::Unicode
            || (record.platform_id() == PlatformId::Windows && record.encoding_id() == 10))
            && let Ok(subtable) = record.subtable(cmap.offset_data())
            && matches!(subtable, CmapSubtable::Format12(_))
        {
            return Some(subtable);
        }
    }

    for record in records {
        if (record.platform_id() == PlatformId::Unicode
            || (record.platform_id() == PlatformId::Windows && record.encoding_id() == 1))
            && let Ok(subtable) = record.subtable(cmap.offset_data())
            && matches!(subtable, CmapSubtable::Format4(_))
        {
            return Some(subtable);
        }
    }

    records.iter().find_map(|r| r.subtable(cmap.offset_data()).ok())
}

fn iter_cmap_subtable(subtable: &CmapSubtable) -> Vec<(Codepoint, GlyphId)> {
    let mut mappings = Vec::new();

    match subtable {
        CmapSubtable::Format4(f4) => {
            let end_codes = f4.end_code();
            let start_codes = f4.start_code();
            let id_deltas = f4.id_delta();
            let id_range_offsets = f4.id_range_offsets();
            let glyph_id_array = f4.glyph_id_array();

            let seg_count = f4.seg_count_x2() as usize / 2;
            for seg in 0..seg_count {
                let end_code = end_codes.get(seg).map(|v| v.get()).unwrap_or(0xFFFF);
                let start_code = start_codes.get(seg).map(|v| v.get()).unwrap_or(0xFFFF);
                let id_delta = id_deltas.get(seg).map(|v| v.get()).unwrap_or(0);
                let id_range_offset = id_range_offsets.get(seg).map(|v| v.get()).unwrap_or(0);

                if start_code == 0xFFFF {
                    continue;
                }

                for cp in start_code..=end_code {
                    let gid = if id_range_offset == 0 {
                        ((cp as i32 + id_delta as i32) & 0xFFFF) as u16
                    } else {
                        (id_range_offset as usize / 2 + (cp - start_code) as usize + seg)
                            .checked_sub(seg_count)
                            .and_then(|idx| glyph_id_array.get(idx))
                            .map(|gid| gid.get())
                            .filter(|gid| *gid != 0)
                            .map_or(0, |gid| ((gid as i32 + id_delta as i32) & 0xFFFF) as u16)
                    };

                    if gid != 0 {
                        mappings.push((Codepoint::new(cp as u32), GlyphId::new(gid)));
                    }
                }
            }
        }
        CmapSubtable::Format12(f12) => {
            for group in f12.groups() {
                let start = group.start_char_code();
                let end = group.end_char_code();
                let mut gid = group.start_glyph_id();
                for cp in start..=end {
                    if gid != 0 && gid <= u16::MAX as u32 {
                        mappings.push((Codepoint::new(cp), GlyphId::new(gid as u16)));
                    }
                    gid = gid.saturating_add(1);
                }
            }
        }
        CmapSubtable::Format6(f6) => {
            let first = f6.first_code() as u32;
            for (i, gid) in f6.glyph_id_array().iter().enumerate() {
                let gid = gid.get();
                if gid != 0 {
                    mappings.push((Codepoint::new(first + i as u32), GlyphId::new(gid)));
                }
            }
        }
        _ => {}
    }

    mappings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = FontFile::load("/nonexistent/dir/font.ttf").unwrap_err();
        assert!(matches!(err, FontError::MissingFile(_)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = FontSource::open(b"definitely not a font", GlyphSelection::default()).err().unwrap();
        assert!(matches!(err, FontError::ReadError(_)));
    }
}
