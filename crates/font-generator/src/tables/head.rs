//! head assembly and the whole-font checksum adjustment

use std::ops::RangeInclusive;

use glyphmerge_binary_stream::{BinaryStream, Fixed};
use log::{debug, info};
use read_fonts::{TableProvider, tables::head::Head as ReadHead, types::Tag};

use super::{AssemblyContext, glyf::LocaFormat};
use crate::{FontError, Result, outline::BoundingBox};

const HEAD_LEN: usize = 54;
const MAGIC_NUMBER: u32 = 0x5F0F_3CF5;
const CHECKSUM_MAGIC: u32 = 0xB1B0_AFBA;
const CHECKSUM_ADJUSTMENT_OFFSET: usize = 8;

/// Bounding box widths rasterizers accept as unitsPerEm
pub const VALID_UNITS_PER_EM: RangeInclusive<i32> = 16..=16384;

/// Build `head` from the base font.
///
/// When the merged bounding box has a usable width it replaces unitsPerEm
/// and the bbox; otherwise the base font's values are kept. The checksum
/// adjustment is left at 0 for [`patch_checksum_adjustment`].
pub fn build_head(ctx: &AssemblyContext, bbox: Option<BoundingBox>, loca_format: LocaFormat) -> Result<Vec<u8>> {
    let head = ctx
        .base_source()?
        .font()
        .head()
        .map_err(|_| FontError::MissingTable { font: ctx.base, table: "head" })?;
    Ok(encode_head(&head, bbox, loca_format))
}

pub fn encode_head(head: &ReadHead, bbox: Option<BoundingBox>, loca_format: LocaFormat) -> Vec<u8> {
    let computed = bbox.filter(|b| VALID_UNITS_PER_EM.contains(&b.width()));
    let (units_per_em, x_min, y_min, x_max, y_max) = match computed {
        Some(b) => (b.width() as u16, b.x_min as i16, b.y_min as i16, b.x_max as i16, b.y_max as i16),
        None => {
            if let Some(b) = bbox {
                info!("Bounding box width {} is out of range, keeping the base font's unitsPerEm", b.width());
            }
            (head.units_per_em(), head.x_min(), head.y_min(), head.x_max(), head.y_max())
        }
    };
    debug!("head: unitsPerEm {units_per_em}, bbox ({x_min}, {y_min}) - ({x_max}, {y_max})");

    let mut s = BinaryStream::with_capacity(HEAD_LEN);
    s.write_fixed(Fixed::new(1, 0));
    s.write_fixed(Fixed::from_bits(head.font_revision().to_bits()));
    s.write_ulong(0); // checkSumAdjustment
    s.write_ulong(MAGIC_NUMBER);
    s.write_ushort(head.flags().bits());
    s.write_ushort(units_per_em);
    s.write_date_time(head.created());
    s.write_date_time(head.modified());
    s.write_short(x_min);
    s.write_short(y_min);
    s.write_short(x_max);
    s.write_short(y_max);
    s.write_ushort(head.mac_style().bits());
    s.write_ushort(head.lowest_rec_ppem());
    s.write_short(head.font_direction_hint());
    s.write_short(loca_format.index_to_loc_format());
    s.write_short(head.glyph_data_format());
    s.into_bytes()
}

/// Set `head.checkSumAdjustment` so the whole file sums to the magic value.
///
/// Fonts without a `head` entry are returned unchanged.
pub fn patch_checksum_adjustment(font: Vec<u8>) -> Vec<u8> {
    let mut stream = BinaryStream::from_bytes(font);
    stream.set_pos(4);
    let num_tables = stream.read_ushort();
    stream.set_pos(12);

    let mut head_offset = None;
    for _ in 0..num_tables {
        let tag = Tag::new(&[stream.read_byte(), stream.read_byte(), stream.read_byte(), stream.read_byte()]);
        let _checksum = stream.read_ulong();
        let offset = stream.read_ulong() as usize;
        let _length = stream.read_ulong();
        if tag == Tag::new(b"head") {
            head_offset = Some(offset);
        }
    }

    let Some(head_offset) = head_offset else {
        return stream.into_bytes();
    };
    let adjustment_at = head_offset + CHECKSUM_ADJUSTMENT_OFFSET;
    stream.set_ulong_at(adjustment_at, 0);
    let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(stream.as_bytes()));
    stream.set_ulong_at(adjustment_at, adjustment);
    stream.into_bytes()
}

/// Sum of big-endian u32 words, zero-padding the tail
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_pads_tail() {
        assert_eq!(checksum(&[0, 0, 0, 1, 0, 0, 0, 2]), 3);
        assert_eq!(checksum(&[0, 0, 0, 1, 0x80]), 0x8000_0001);
        assert_eq!(checksum(&[0xFF; 8]), 0xFFFF_FFFE);
    }

    #[test]
    fn test_patched_font_sums_to_magic() {
        // minimal table directory with one head record at offset 28
        let mut s = BinaryStream::new();
        s.write_ulong(0x0001_0000);
        s.write_ushort(1);
        s.write_bytes(&[0; 6]);
        s.write_bytes(b"head");
        s.write_ulong(0);
        s.write_ulong(28);
        s.write_ulong(HEAD_LEN as u32);
        s.write_bytes(&[0x12; HEAD_LEN]);

        let patched = patch_checksum_adjustment(s.into_bytes());
        assert_eq!(checksum(&patched), CHECKSUM_MAGIC);
    }

    #[test]
    fn test_no_head_is_untouched() {
        let data = vec![0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(patch_checksum_adjustment(data.clone()), data);
    }
}
