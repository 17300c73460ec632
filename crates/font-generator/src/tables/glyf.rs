//! glyf/loca assembly and the new glyph ID assignment

use std::collections::HashMap;

use glyphmerge_binary_stream::BinaryStream;
use log::{debug, warn};

use super::AssemblyContext;
use crate::{
    FontError, Result,
    outline::{BoundingBox, GlyphKind, components, glyph_kind},
    remap::GlyphIdMap,
    selection::GlyphTransform,
    transform::transform_simple_glyph,
    types::{FontGlyphId, NewGlyphId},
};

/// Largest offset the short loca format can express
const MAX_SHORT_LOCA_OFFSET: u32 = 0x1FFFE;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LocaFormat {
    Short,
    Long,
}

impl LocaFormat {
    /// Value of `head.indexToLocFormat`
    pub fn index_to_loc_format(self) -> i16 {
        match self {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        }
    }
}

/// Encoded `glyf`/`loca` plus what later builders need from this pass
#[derive(Debug, Clone)]
pub struct GlyfOutput {
    pub glyf: Vec<u8>,
    pub loca: Vec<u8>,
    pub loca_format: LocaFormat,
    pub glyph_map: GlyphIdMap,
    /// Union of the bounding boxes of all non-empty output glyphs
    pub bbox: Option<BoundingBox>,
    /// Transforms that were actually applied, by new glyph ID
    pub applied_transforms: HashMap<NewGlyphId, GlyphTransform>,
}

/// Copy every resolved glyph into a new `glyf` table in canonical order,
/// assigning new glyph IDs as it goes.
pub fn build_glyf(ctx: &AssemblyContext) -> Result<GlyfOutput> {
    let glyph_map = GlyphIdMap::from_ordered(ctx.model.resolved.iter().copied())?;

    let mut glyf = Vec::new();
    let mut offsets = Vec::with_capacity(glyph_map.len() + 1);
    let mut bbox: Option<BoundingBox> = None;
    let mut applied_transforms = HashMap::new();
    offsets.push(0u32);

    for (new_id, old) in glyph_map.iter() {
        let source = ctx.source(old.font)?;
        let record = source.glyphs().glyph_bytes(old.glyph).unwrap_or_default();
        let transform = ctx.model.transform_of(old);

        let mut data = match (glyph_kind(record), transform) {
            (GlyphKind::Empty, _) => Vec::new(),
            (GlyphKind::Simple, Some(transform)) => {
                let (data, _) = transform_simple_glyph(record, transform)
                    .ok_or(FontError::MalformedGlyph { font: old.font, glyph: old.glyph })?;
                applied_transforms.insert(new_id, *transform);
                data
            }
            (GlyphKind::Simple, None) => record.to_vec(),
            (GlyphKind::Composite, transform) => {
                if transform.is_some() {
                    warn!("{old} is a composite glyph, ignoring its transform");
                }
                remap_components(record, old, &glyph_map)
            }
        };

        if let Some(glyph_bbox) = BoundingBox::from_glyph(&data) {
            match bbox.as_mut() {
                Some(bbox) => bbox.combine(&glyph_bbox),
                None => bbox = Some(glyph_bbox),
            }
        }

        if data.len() % 2 != 0 {
            data.push(0);
        }
        glyf.extend_from_slice(&data);
        let end = u32::try_from(glyf.len()).map_err(|_| FontError::TooManyGlyphs(glyph_map.len()))?;
        offsets.push(end);
    }

    let loca_format = if offsets.last().is_some_and(|o| *o <= MAX_SHORT_LOCA_OFFSET) {
        LocaFormat::Short
    } else {
        LocaFormat::Long
    };
    let loca = encode_loca(&offsets, loca_format);

    debug!(
        "glyf: {} glyphs, {} bytes, {:?} loca",
        glyph_map.len(),
        glyf.len(),
        loca_format
    );

    Ok(GlyfOutput { glyf, loca, loca_format, glyph_map, bbox, applied_transforms })
}

/// Copy a composite record, pointing each component at its new glyph ID.
fn remap_components(record: &[u8], owner: FontGlyphId, glyph_map: &GlyphIdMap) -> Vec<u8> {
    let mut data = record.to_vec();
    for component in components(record) {
        let new_id = glyph_map
            .get(FontGlyphId::new(owner.font, component.glyph))
            .unwrap_or_else(|| {
                warn!("{owner} references {} which was not resolved, using .notdef", component.glyph);
                NewGlyphId::new(0)
            });
        let [hi, lo] = new_id.to_u16().to_be_bytes();
        data[component.index_offset] = hi;
        data[component.index_offset + 1] = lo;
    }
    data
}

fn encode_loca(offsets: &[u32], format: LocaFormat) -> Vec<u8> {
    let mut stream = BinaryStream::with_capacity(offsets.len() * 4);
    for offset in offsets {
        match format {
            LocaFormat::Short => stream.write_ushort((offset / 2) as u16),
            LocaFormat::Long => stream.write_ulong(*offset),
        }
    }
    stream.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        outline::tests::composite_record,
        types::{FontId, GlyphId},
    };

    fn fg(font: usize, glyph: u16) -> FontGlyphId {
        FontGlyphId::new(FontId::new(font), GlyphId::new(glyph))
    }

    #[test]
    fn test_loca_formats() {
        assert_eq!(encode_loca(&[0, 12, 40], LocaFormat::Short), vec![0, 0, 0, 6, 0, 20]);
        assert_eq!(
            encode_loca(&[0, 0x20000], LocaFormat::Long),
            vec![0, 0, 0, 0, 0, 2, 0, 0]
        );
    }

    #[test]
    fn test_components_point_at_new_ids() {
        let map = GlyphIdMap::from_ordered([fg(1, 0), fg(1, 4), fg(1, 9)]).unwrap();
        let record = composite_record(&[(0, 9), (0, 4), (0, 30)]);
        let data = remap_components(&record, fg(1, 9), &map);

        let ids: Vec<u16> = components(&data).iter().map(|c| c.glyph.to_u16()).collect();
        assert_eq!(ids, vec![2, 1, 0]);
        assert_eq!(data.len(), record.len());
    }
}
