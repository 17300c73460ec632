//! cmap assembly: a Windows BMP format 4 subtable, plus a format 12 subtable
//! when the merged map holds codepoints format 4 cannot carry (U+FFFF and up)

use glyphmerge_binary_stream::BinaryStream;
use log::{debug, warn};

use crate::{
    FontError, Result,
    coordinator::MergedModel,
    remap::GlyphIdMap,
};

const PLATFORM_WINDOWS: u16 = 3;
const ENCODING_UNICODE_BMP: u16 = 1;
const ENCODING_UNICODE_FULL: u16 = 10;

/// Last BMP codepoint a regular segment may cover; 0xFFFF is the sentinel
const MAX_FORMAT4_CODEPOINT: u32 = 0xFFFE;

/// One format 4 segment
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start_code: u16,
    pub end_code: u16,
    pub id_delta: i16,
    pub id_range_offset: u16,
}

/// A format 4 subtable where every segment indexes into `glyph_id_array`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CmapFormat4 {
    pub segments: Vec<Segment>,
    pub glyph_id_array: Vec<u16>,
}

impl CmapFormat4 {
    /// Build from (codepoint, glyph) pairs sorted by codepoint, without 0xFFFF.
    ///
    /// Each run of consecutive codepoints becomes one segment whose glyphs
    /// are looked up through the glyph ID array, so `idDelta` stays 0.
    pub fn from_mappings(mappings: &[(u16, u16)]) -> Result<Self> {
        let mut runs: Vec<(u16, u16, usize)> = Vec::new();
        let mut glyph_id_array = Vec::with_capacity(mappings.len() + 1);

        for (idx, &(cp, gid)) in mappings.iter().enumerate() {
            match runs.last_mut() {
                Some((_, end, _)) if end.checked_add(1) == Some(cp) => *end = cp,
                _ => runs.push((cp, cp, idx)),
            }
            glyph_id_array.push(gid);
        }
        glyph_id_array.push(0);

        // the sentinel counts toward the distance from each idRangeOffset
        let seg_count = runs.len() + 1;
        let mut segments = Vec::with_capacity(seg_count);
        for (i, (start_code, end_code, first_index)) in runs.into_iter().enumerate() {
            let id_range_offset = u16::try_from((seg_count - i + first_index) * 2)
                .map_err(|_| FontError::CmapOverflow(mappings.len()))?;
            segments.push(Segment { start_code, end_code, id_delta: 0, id_range_offset });
        }
        segments.push(Segment { start_code: 0xFFFF, end_code: 0xFFFF, id_delta: 1, id_range_offset: 0 });

        let table = Self { segments, glyph_id_array };
        if table.byte_len() > u16::MAX as usize {
            return Err(FontError::CmapOverflow(mappings.len()));
        }
        Ok(table)
    }

    pub fn byte_len(&self) -> usize {
        16 + self.segments.len() * 8 + self.glyph_id_array.len() * 2
    }

    /// Resolve a codepoint the way a font consumer would
    pub fn lookup(&self, codepoint: u32) -> u16 {
        let Ok(cp) = u16::try_from(codepoint) else {
            return 0;
        };
        let seg_count = self.segments.len();
        let Some((i, seg)) = self
            .segments
            .iter()
            .enumerate()
            .find(|(_, s)| s.end_code >= cp)
            .filter(|(_, s)| s.start_code <= cp)
        else {
            return 0;
        };

        if seg.id_range_offset == 0 {
            return cp.wrapping_add_signed(seg.id_delta);
        }
        (seg.id_range_offset as usize / 2 + (cp - seg.start_code) as usize + i)
            .checked_sub(seg_count)
            .and_then(|idx| self.glyph_id_array.get(idx))
            .filter(|gid| **gid != 0)
            .map_or(0, |gid| gid.wrapping_add_signed(seg.id_delta))
    }

    pub fn encode(&self) -> Vec<u8> {
        let seg_count = self.segments.len() as u16;
        let entry_selector = seg_count.max(1).ilog2() as u16;
        let search_range = 2 * (1u16 << entry_selector);

        let mut s = BinaryStream::with_capacity(self.byte_len());
        s.write_ushort(4);
        s.write_ushort(self.byte_len() as u16);
        s.write_ushort(0); // language
        s.write_ushort(seg_count * 2);
        s.write_ushort(search_range);
        s.write_ushort(entry_selector);
        s.write_ushort(seg_count * 2 - search_range);
        for seg in &self.segments {
            s.write_ushort(seg.end_code);
        }
        s.write_ushort(0); // reservedPad
        for seg in &self.segments {
            s.write_ushort(seg.start_code);
        }
        for seg in &self.segments {
            s.write_short(seg.id_delta);
        }
        for seg in &self.segments {
            s.write_ushort(seg.id_range_offset);
        }
        for gid in &self.glyph_id_array {
            s.write_ushort(*gid);
        }
        s.into_bytes()
    }
}

/// (startCharCode, endCharCode, startGlyphID)
type SequentialMapGroup = (u32, u32, u32);

/// Group consecutive codepoints that map to consecutive glyph IDs.
fn build_sequential_groups(mappings: &[(u32, u32)]) -> Vec<SequentialMapGroup> {
    let Some((&(first_cp, first_gid), rest)) = mappings.split_first() else {
        return Vec::new();
    };

    let mut groups = Vec::new();
    let mut group_start_cp = first_cp;
    let mut group_start_gid = first_gid;
    let mut prev_cp = first_cp;
    let mut prev_gid = first_gid;

    for &(cp, gid) in rest {
        if cp == prev_cp + 1 && gid == prev_gid + 1 {
            prev_cp = cp;
            prev_gid = gid;
        } else {
            groups.push((group_start_cp, prev_cp, group_start_gid));
            group_start_cp = cp;
            group_start_gid = gid;
            prev_cp = cp;
            prev_gid = gid;
        }
    }
    groups.push((group_start_cp, prev_cp, group_start_gid));

    groups
}

fn encode_format12(mappings: &[(u32, u32)]) -> Vec<u8> {
    let groups = build_sequential_groups(mappings);
    let mut s = BinaryStream::with_capacity(16 + groups.len() * 12);
    s.write_ushort(12);
    s.write_ushort(0); // reserved
    s.write_ulong(16 + groups.len() as u32 * 12);
    s.write_ulong(0); // language
    s.write_ulong(groups.len() as u32);
    for (start, end, gid) in groups {
        s.write_ulong(start);
        s.write_ulong(end);
        s.write_ulong(gid);
    }
    s.into_bytes()
}

/// Encode the merged character map as a complete `cmap` table.
pub fn build_cmap(model: &MergedModel, glyph_map: &GlyphIdMap) -> Result<Vec<u8>> {
    let mappings: Vec<(u32, u32)> = model
        .char_map
        .iter()
        .filter_map(|(cp, glyph)| match glyph_map.get(*glyph) {
            Some(new_id) => Some((cp.to_u32(), new_id.to_u32())),
            None => {
                warn!("{cp} maps to {glyph} which has no outline, leaving it unmapped");
                None
            }
        })
        .collect();

    let bmp: Vec<(u16, u16)> = mappings
        .iter()
        .filter(|(cp, _)| *cp <= MAX_FORMAT4_CODEPOINT)
        .map(|&(cp, gid)| (cp as u16, gid as u16))
        .collect();
    let format4 = CmapFormat4::from_mappings(&bmp)?;

    let mut subtables = vec![(ENCODING_UNICODE_BMP, format4.encode())];
    if mappings.iter().any(|(cp, _)| *cp > MAX_FORMAT4_CODEPOINT) {
        subtables.push((ENCODING_UNICODE_FULL, encode_format12(&mappings)));
    }

    debug!(
        "cmap: {} mappings, {} format 4 segments, {} subtables",
        mappings.len(),
        format4.segments.len(),
        subtables.len()
    );

    let mut s = BinaryStream::new();
    s.write_ushort(0); // version
    s.write_ushort(subtables.len() as u16);
    let mut offset = 4 + 8 * subtables.len() as u32;
    for (encoding, data) in &subtables {
        s.write_ushort(PLATFORM_WINDOWS);
        s.write_ushort(*encoding);
        s.write_ulong(offset);
        offset += data.len() as u32;
    }
    for (_, data) in &subtables {
        s.write_bytes(data);
    }
    Ok(s.into_bytes())
}
