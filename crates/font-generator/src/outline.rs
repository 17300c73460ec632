//! Raw access to a font's `glyf`/`loca` outline data
//!
//! Glyph records are kept as byte slices borrowed from the source font;
//! nothing here decodes contours. Composite component references are located
//! by offset so the glyf builder can rewrite them in place.

use glyphmerge_binary_stream::BinaryStream;
use read_fonts::{FontRef, TableProvider, types::Tag};

use crate::{
    FontError, Result,
    types::GlyphId,
};

const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// Size of the glyph header (numberOfContours + bbox)
pub const GLYPH_HEADER_LEN: usize = 10;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GlyphKind {
    /// Zero-length record, e.g. a space
    Empty,
    Simple,
    Composite,
}

/// A component reference inside a composite glyph record
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ComponentRef {
    pub glyph: GlyphId,
    /// Byte offset of the glyphIndex field within the glyph record
    pub index_offset: usize,
}

/// Glyph bounding box in font units
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl BoundingBox {
    /// Read the bbox from a glyph header. Returns None for records too short
    /// to hold one.
    pub fn from_glyph(record: &[u8]) -> Option<Self> {
        if record.len() < GLYPH_HEADER_LEN {
            return None;
        }
        let mut stream = BinaryStream::from_bytes(&record[..GLYPH_HEADER_LEN]);
        stream.set_pos(2);
        Some(Self {
            x_min: stream.read_short() as i32,
            y_min: stream.read_short() as i32,
            x_max: stream.read_short() as i32,
            y_max: stream.read_short() as i32,
        })
    }

    pub fn combine(&mut self, other: &BoundingBox) {
        self.x_min = self.x_min.min(other.x_min);
        self.y_min = self.y_min.min(other.y_min);
        self.x_max = self.x_max.max(other.x_max);
        self.y_max = self.y_max.max(other.y_max);
    }

    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }
}

/// Read-only view of glyph outlines, as needed by glyph resolution
pub trait OutlineProvider {
    fn num_glyphs(&self) -> u16;

    /// Length in bytes of the glyph record; 0 for empty or out-of-range glyphs
    fn glyph_length(&self, gid: GlyphId) -> usize;

    /// Offset of the glyph record within `glyf`
    fn glyph_offset(&self, gid: GlyphId) -> usize;

    fn glyph_kind(&self, gid: GlyphId) -> GlyphKind;

    /// Component glyph IDs of a composite glyph; empty for other kinds
    fn component_ids(&self, gid: GlyphId) -> Vec<GlyphId>;
}

/// `glyf` bytes plus decoded `loca` offsets for one font
#[derive(Debug, Clone)]
pub struct GlyphData<'a> {
    glyf: &'a [u8],
    offsets: Vec<u32>,
}

impl<'a> GlyphData<'a> {
    /// Decode `loca` according to `head.indexToLocFormat` and `maxp.numGlyphs`.
    pub fn from_font(font: &FontRef<'a>) -> Result<Self> {
        let head = font.head().map_err(|_| FontError::UnparsableFont { table: "head" })?;
        let num_glyphs = font.maxp().map(|m| m.num_glyphs()).unwrap_or_default();
        let glyf = font
            .table_data(Tag::new(b"glyf"))
            .ok_or(FontError::UnparsableFont { table: "glyf" })?
            .as_bytes();
        let loca = font
            .table_data(Tag::new(b"loca"))
            .ok_or(FontError::UnparsableFont { table: "loca" })?
            .as_bytes();

        let short = head.index_to_loc_format() == 0;
        let entry_len = if short { 2 } else { 4 };
        // tolerate a maxp/loca mismatch by trusting whichever is smaller
        let count = (num_glyphs as usize + 1).min(loca.len() / entry_len);

        let mut stream = BinaryStream::from_bytes(loca);
        let offsets = (0..count)
            .map(|_| {
                if short {
                    stream.read_ushort() as u32 * 2
                } else {
                    stream.read_ulong()
                }
            })
            .collect();

        Ok(Self { glyf, offsets })
    }

    /// Build directly from raw tables; `offsets` has numGlyphs + 1 entries.
    pub fn from_parts(glyf: &'a [u8], offsets: Vec<u32>) -> Self {
        Self { glyf, offsets }
    }

    /// The raw glyph record, or None if the ID is out of range or the record
    /// lies outside `glyf`.
    pub fn glyph_bytes(&self, gid: GlyphId) -> Option<&'a [u8]> {
        let idx = gid.as_usize();
        let start = *self.offsets.get(idx)? as usize;
        let end = *self.offsets.get(idx + 1)? as usize;
        self.glyf.get(start..end)
    }

    pub fn bounding_box(&self, gid: GlyphId) -> Option<BoundingBox> {
        self.glyph_bytes(gid).and_then(BoundingBox::from_glyph)
    }
}

impl OutlineProvider for GlyphData<'_> {
    fn num_glyphs(&self) -> u16 {
        self.offsets.len().saturating_sub(1).min(u16::MAX as usize) as u16
    }

    fn glyph_length(&self, gid: GlyphId) -> usize {
        self.glyph_bytes(gid).map_or(0, <[u8]>::len)
    }

    fn glyph_offset(&self, gid: GlyphId) -> usize {
        self.offsets.get(gid.as_usize()).map_or(0, |o| *o as usize)
    }

    fn glyph_kind(&self, gid: GlyphId) -> GlyphKind {
        self.glyph_bytes(gid).map_or(GlyphKind::Empty, glyph_kind)
    }

    fn component_ids(&self, gid: GlyphId) -> Vec<GlyphId> {
        self.glyph_bytes(gid)
            .map(|record| components(record).into_iter().map(|c| c.glyph).collect())
            .unwrap_or_default()
    }
}

/// Classify a glyph record by its numberOfContours field.
pub fn glyph_kind(record: &[u8]) -> GlyphKind {
    if record.len() < GLYPH_HEADER_LEN {
        return GlyphKind::Empty;
    }
    let contours = i16::from_be_bytes([record[0], record[1]]);
    if contours < 0 { GlyphKind::Composite } else { GlyphKind::Simple }
}

/// Walk the component records of a composite glyph.
///
/// Stops early on truncated data; non-composite records yield nothing.
pub fn components(record: &[u8]) -> Vec<ComponentRef> {
    if glyph_kind(record) != GlyphKind::Composite {
        return Vec::new();
    }

    let mut stream = BinaryStream::from_bytes(record);
    stream.set_pos(GLYPH_HEADER_LEN);
    let mut refs = Vec::new();

    loop {
        if stream.remaining() < 4 {
            break;
        }
        let flags = stream.read_ushort();
        let index_offset = stream.pos();
        refs.push(ComponentRef { glyph: GlyphId::new(stream.read_ushort()), index_offset });

        let mut skip = if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
        if flags & WE_HAVE_A_SCALE != 0 {
            skip += 2;
        } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
            skip += 4;
        } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
            skip += 8;
        }
        stream.set_pos(stream.pos() + skip);

        if flags & MORE_COMPONENTS == 0 {
            break;
        }
    }

    refs
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A composite record with the given (flags, glyph) components and
    /// byte-sized offsets.
    pub(crate) fn composite_record(parts: &[(u16, u16)]) -> Vec<u8> {
        let mut s = BinaryStream::new();
        s.write_short(-1);
        for v in [0i16, 0, 100, 100] {
            s.write_short(v);
        }
        for (i, (flags, glyph)) in parts.iter().enumerate() {
            let more = if i + 1 < parts.len() { MORE_COMPONENTS } else { 0 };
            s.write_ushort(flags | more);
            s.write_ushort(*glyph);
            let arg_len = if flags & ARG_1_AND_2_ARE_WORDS != 0 { 4 } else { 2 };
            s.write_bytes(&vec![0; arg_len]);
            if flags & WE_HAVE_A_SCALE != 0 {
                s.write_bytes(&[0x40, 0]);
            } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
                s.write_bytes(&[0x40, 0, 0x40, 0]);
            } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
                s.write_bytes(&[0x40, 0, 0, 0, 0, 0, 0x40, 0]);
            }
        }
        s.into_bytes()
    }

    #[test]
    fn test_components_with_every_argument_layout() {
        let record = composite_record(&[
            (0, 3),
            (ARG_1_AND_2_ARE_WORDS | WE_HAVE_A_SCALE, 5),
            (WE_HAVE_AN_X_AND_Y_SCALE, 7),
            (ARG_1_AND_2_ARE_WORDS | WE_HAVE_A_TWO_BY_TWO, 9),
        ]);
        let refs = components(&record);
        let ids: Vec<u16> = refs.iter().map(|c| c.glyph.to_u16()).collect();
        assert_eq!(ids, vec![3, 5, 7, 9]);
        assert_eq!(refs[0].index_offset, 12);
        assert_eq!(refs[1].index_offset, 12 + 2 + 2 + 2);
    }

    #[test]
    fn test_truncated_composite_stops() {
        let mut record = composite_record(&[(0, 3), (0, 4)]);
        record.truncate(record.len() - 5);
        let ids: Vec<u16> = components(&record).iter().map(|c| c.glyph.to_u16()).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn test_glyph_data_lookup() {
        let simple = [0u8, 1, 0, 0, 0, 0, 0, 10, 0, 20, 0, 0];
        let composite = composite_record(&[(0, 0)]);
        let mut glyf = simple.to_vec();
        glyf.extend_from_slice(&composite);
        let end = glyf.len() as u32;
        let data = GlyphData::from_parts(&glyf, vec![0, 0, 12, end]);

        assert_eq!(data.num_glyphs(), 3);
        assert_eq!(data.glyph_kind(GlyphId::new(0)), GlyphKind::Empty);
        assert_eq!(data.glyph_kind(GlyphId::new(1)), GlyphKind::Simple);
        assert_eq!(data.glyph_kind(GlyphId::new(2)), GlyphKind::Composite);
        assert_eq!(data.glyph_length(GlyphId::new(1)), 12);
        assert_eq!(data.glyph_offset(GlyphId::new(2)), 12);
        assert_eq!(data.glyph_length(GlyphId::new(9)), 0);
        assert_eq!(data.component_ids(GlyphId::new(2)), vec![GlyphId::new(0)]);
        assert_eq!(
            data.bounding_box(GlyphId::new(1)),
            Some(BoundingBox { x_min: 0, y_min: 0, x_max: 10, y_max: 20 })
        );
    }
}
