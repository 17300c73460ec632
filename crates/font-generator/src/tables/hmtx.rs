//! hmtx/hhea assembly

use font_types::UfWord;
use glyphmerge_binary_stream::BinaryStream;
use log::debug;
use read_fonts::{TableProvider, types::GlyphId as ReadGlyphId};
use write_fonts::{from_obj::ToOwnedTable, tables::hhea::Hhea};

use super::{AssemblyContext, glyf::GlyfOutput};
use crate::{FontError, Result};

/// One glyph's horizontal metrics
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HMetric {
    pub advance: u16,
    pub lsb: i16,
}

/// Encoded `hmtx` and the values `hhea` has to agree with
#[derive(Debug, Clone)]
pub struct HmtxOutput {
    pub hmtx: Vec<u8>,
    pub number_of_h_metrics: u16,
    pub advance_width_max: u16,
}

/// Collect metrics for every new glyph from its source font, scaled where a
/// transform was applied to the outline.
pub fn build_hmtx(ctx: &AssemblyContext, glyf: &GlyfOutput) -> Result<HmtxOutput> {
    let mut metrics = Vec::with_capacity(glyf.glyph_map.len());

    for (new_id, old) in glyf.glyph_map.iter() {
        let hmtx = ctx
            .source(old.font)?
            .font()
            .hmtx()
            .map_err(|_| FontError::MissingTable { font: old.font, table: "hmtx" })?;
        let gid = ReadGlyphId::new(old.glyph.to_u32());
        let mut advance = hmtx.advance(gid).unwrap_or(0) as i32;
        let mut lsb = hmtx.side_bearing(gid).unwrap_or(0) as i32;

        if let Some(transform) = glyf.applied_transforms.get(&new_id) {
            advance = transform.scale_metric(advance);
            lsb = transform.scale_metric(lsb);
        }

        metrics.push(HMetric {
            advance: advance.clamp(0, u16::MAX as i32) as u16,
            lsb: lsb.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
        });
    }

    let output = encode_hmtx(&metrics);
    debug!(
        "hmtx: {} glyphs, numberOfHMetrics {}, advanceWidthMax {}",
        metrics.len(),
        output.number_of_h_metrics,
        output.advance_width_max
    );
    Ok(output)
}

/// Number of explicit advance widths needed: trailing glyphs that share the
/// last glyph's advance only store their side bearing.
pub fn compact_h_metrics(metrics: &[HMetric]) -> usize {
    let Some(last) = metrics.last() else {
        return 0;
    };
    let mut count = metrics.len();
    while count > 1 && metrics[count - 2].advance == last.advance {
        count -= 1;
    }
    count
}

pub fn encode_hmtx(metrics: &[HMetric]) -> HmtxOutput {
    let number_of_h_metrics = compact_h_metrics(metrics);
    let (long, short) = metrics.split_at(number_of_h_metrics);

    let mut s = BinaryStream::with_capacity(long.len() * 4 + short.len() * 2);
    for m in long {
        s.write_ushort(m.advance);
        s.write_short(m.lsb);
    }
    for m in short {
        s.write_short(m.lsb);
    }

    HmtxOutput {
        hmtx: s.into_bytes(),
        number_of_h_metrics: number_of_h_metrics as u16,
        advance_width_max: long.iter().map(|m| m.advance).max().unwrap_or(0),
    }
}

/// The base font's `hhea` with the metric count and widest advance replaced
pub fn build_hhea(ctx: &AssemblyContext, hmtx: &HmtxOutput) -> Result<Hhea> {
    let mut hhea: Hhea = ctx
        .base_source()?
        .font()
        .hhea()
        .map_err(|_| FontError::MissingTable { font: ctx.base, table: "hhea" })?
        .to_owned_table();
    hhea.number_of_h_metrics = hmtx.number_of_h_metrics;
    hhea.advance_width_max = UfWord::new(hmtx.advance_width_max);
    Ok(hhea)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(advances: &[u16]) -> Vec<HMetric> {
        advances
            .iter()
            .enumerate()
            .map(|(i, a)| HMetric { advance: *a, lsb: i as i16 })
            .collect()
    }

    #[test]
    fn test_trailing_widths_are_compacted() {
        let out = encode_hmtx(&widths(&[10, 10, 20, 20, 20]));
        assert_eq!(out.number_of_h_metrics, 3);
        assert_eq!(out.advance_width_max, 20);
        assert_eq!(
            out.hmtx,
            vec![0, 10, 0, 0, 0, 10, 0, 1, 0, 20, 0, 2, 0, 3, 0, 4]
        );
    }

    #[test]
    fn test_compaction_edge_cases() {
        assert_eq!(compact_h_metrics(&[]), 0);
        assert_eq!(compact_h_metrics(&widths(&[500])), 1);
        assert_eq!(compact_h_metrics(&widths(&[600, 600, 600])), 1);
        assert_eq!(compact_h_metrics(&widths(&[600, 500, 600])), 3);
    }

    #[test]
    fn test_advance_width_max_only_counts_explicit_widths() {
        let out = encode_hmtx(&widths(&[300, 900, 100, 100]));
        assert_eq!(out.number_of_h_metrics, 3);
        assert_eq!(out.advance_width_max, 900);
    }
}
