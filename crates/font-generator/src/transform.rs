//! Translate/scale re-encoding of simple glyph outlines
//!
//! The glyph is decoded to absolute points, transformed, then written back
//! as a fresh flag/x/y delta stream. Hinting instructions do not survive a
//! transform and are dropped.

use glyphmerge_binary_stream::BinaryStream;

use crate::{
    outline::{BoundingBox, GLYPH_HEADER_LEN},
    selection::GlyphTransform,
};

const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT_VECTOR: u8 = 0x02;
const Y_SHORT_VECTOR: u8 = 0x04;
const REPEAT_FLAG: u8 = 0x08;
const X_IS_SAME_OR_POSITIVE: u8 = 0x10;
const Y_IS_SAME_OR_POSITIVE: u8 = 0x20;
const OVERLAP_SIMPLE: u8 = 0x40;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutlinePoint {
    pub x: i32,
    pub y: i32,
    pub on_curve: bool,
}

/// A decoded simple glyph with absolute coordinates
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimpleOutline {
    pub end_points: Vec<u16>,
    pub instructions: Vec<u8>,
    pub points: Vec<OutlinePoint>,
    pub overlap: bool,
}

impl SimpleOutline {
    /// Decode a simple glyph record. Returns None for composite or truncated
    /// records.
    pub fn decode(record: &[u8]) -> Option<Self> {
        if record.len() < GLYPH_HEADER_LEN {
            return None;
        }
        let mut stream = BinaryStream::from_bytes(record);
        let num_contours = stream.read_short();
        if num_contours < 0 {
            return None;
        }
        stream.set_pos(GLYPH_HEADER_LEN);

        let end_points: Vec<u16> = (0..num_contours).map(|_| stream.read_ushort()).collect();
        let num_points = end_points.last().map_or(0, |last| *last as usize + 1);
        if end_points.windows(2).any(|w| w[0] >= w[1]) {
            return None;
        }

        let instruction_len = stream.read_ushort() as usize;
        if stream.remaining() < instruction_len {
            return None;
        }
        let start = stream.pos();
        let instructions = record[start..start + instruction_len].to_vec();
        stream.set_pos(start + instruction_len);

        let mut flags = Vec::with_capacity(num_points);
        while flags.len() < num_points {
            if stream.remaining() == 0 {
                return None;
            }
            let flag = stream.read_byte();
            flags.push(flag);
            if flag & REPEAT_FLAG != 0 {
                let repeat = stream.read_byte() as usize;
                flags.extend(std::iter::repeat_n(flag, repeat.min(num_points - flags.len())));
            }
        }

        let xs = read_coordinates(&mut stream, &flags, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE)?;
        let ys = read_coordinates(&mut stream, &flags, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE)?;

        let points = flags
            .iter()
            .zip(xs.into_iter().zip(ys))
            .map(|(flag, (x, y))| OutlinePoint { x, y, on_curve: flag & ON_CURVE_POINT != 0 })
            .collect();

        Some(Self {
            end_points,
            instructions,
            points,
            overlap: flags.first().is_some_and(|f| f & OVERLAP_SIMPLE != 0),
        })
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut points = self.points.iter();
        let Some(first) = points.next() else {
            return BoundingBox { x_min: 0, y_min: 0, x_max: 0, y_max: 0 };
        };
        let mut bbox = BoundingBox { x_min: first.x, y_min: first.y, x_max: first.x, y_max: first.y };
        for p in points {
            bbox.combine(&BoundingBox { x_min: p.x, y_min: p.y, x_max: p.x, y_max: p.y });
        }
        bbox
    }

    /// Apply `transform` to every point; coordinates saturate to the i16 range.
    pub fn transformed(&self, transform: &GlyphTransform) -> Self {
        let points = self
            .points
            .iter()
            .map(|p| {
                let (x, y) = transform.apply(p.x, p.y);
                OutlinePoint { x: clamp_i16(x), y: clamp_i16(y), on_curve: p.on_curve }
            })
            .collect();
        Self {
            end_points: self.end_points.clone(),
            instructions: Vec::new(),
            points,
            overlap: self.overlap,
        }
    }

    /// Encode as a `glyf` record using the most compact coordinate forms.
    ///
    /// None if two consecutive points are further apart than an i16 delta
    /// can express.
    pub fn encode(&self) -> Option<Vec<u8>> {
        let bbox = self.bounding_box();
        let mut header = BinaryStream::new();
        header.write_short(self.end_points.len() as i16);
        header.write_short(bbox.x_min as i16);
        header.write_short(bbox.y_min as i16);
        header.write_short(bbox.x_max as i16);
        header.write_short(bbox.y_max as i16);
        for end in &self.end_points {
            header.write_ushort(*end);
        }
        header.write_ushort(self.instructions.len() as u16);
        header.write_bytes(&self.instructions);

        let mut flags = Vec::with_capacity(self.points.len());
        let mut x_stream = BinaryStream::new();
        let mut y_stream = BinaryStream::new();
        let (mut last_x, mut last_y) = (0, 0);

        for (idx, point) in self.points.iter().enumerate() {
            let mut flag = if point.on_curve { ON_CURVE_POINT } else { 0 };
            if idx == 0 && self.overlap {
                flag |= OVERLAP_SIMPLE;
            }
            flag |= write_delta(&mut x_stream, point.x - last_x, X_SHORT_VECTOR, X_IS_SAME_OR_POSITIVE)?;
            flag |= write_delta(&mut y_stream, point.y - last_y, Y_SHORT_VECTOR, Y_IS_SAME_OR_POSITIVE)?;
            flags.push(flag);
            last_x = point.x;
            last_y = point.y;
        }

        write_flags(&mut header, &flags);
        header.write_bytes(x_stream.as_bytes());
        header.write_bytes(y_stream.as_bytes());
        Some(header.into_bytes())
    }
}

/// Transform a simple glyph record, returning the new record and its bbox.
///
/// None if the record is not a decodable simple glyph, or if the
/// transformed points can no longer be delta-encoded.
pub fn transform_simple_glyph(record: &[u8], transform: &GlyphTransform) -> Option<(Vec<u8>, BoundingBox)> {
    let outline = SimpleOutline::decode(record)?.transformed(transform);
    Some((outline.encode()?, outline.bounding_box()))
}

fn read_coordinates(stream: &mut BinaryStream, flags: &[u8], short: u8, same_or_positive: u8) -> Option<Vec<i32>> {
    let mut value = 0i32;
    let mut coords = Vec::with_capacity(flags.len());
    for flag in flags {
        let delta = if flag & short != 0 {
            if stream.remaining() < 1 {
                return None;
            }
            let d = stream.read_byte() as i32;
            if flag & same_or_positive != 0 { d } else { -d }
        } else if flag & same_or_positive != 0 {
            0
        } else {
            if stream.remaining() < 2 {
                return None;
            }
            stream.read_short() as i32
        };
        value += delta;
        coords.push(value);
    }
    Some(coords)
}

/// Write one coordinate delta and return the flag bits describing it
fn write_delta(stream: &mut BinaryStream, delta: i32, short: u8, same_or_positive: u8) -> Option<u8> {
    if delta == 0 {
        Some(same_or_positive)
    } else if delta.unsigned_abs() <= 255 {
        stream.write_byte(delta.unsigned_abs() as u8);
        Some(if delta > 0 { short | same_or_positive } else { short })
    } else {
        stream.write_short(i16::try_from(delta).ok()?);
        Some(0)
    }
}

/// Write flags, folding runs of identical flags with REPEAT_FLAG
fn write_flags(stream: &mut BinaryStream, flags: &[u8]) {
    let mut idx = 0;
    while idx < flags.len() {
        let flag = flags[idx];
        let run = flags[idx + 1..].iter().take(255).take_while(|f| **f == flag).count();
        if run > 0 {
            stream.write_byte(flag | REPEAT_FLAG);
            stream.write_byte(run as u8);
        } else {
            stream.write_byte(flag);
        }
        idx += run + 1;
    }
}

fn clamp_i16(value: i32) -> i32 {
    value.clamp(i16::MIN as i32, i16::MAX as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: i32, with_instructions: bool) -> SimpleOutline {
        let points = [(0, 0), (0, size), (size, size), (size, 0)]
            .into_iter()
            .map(|(x, y)| OutlinePoint { x, y, on_curve: true })
            .collect();
        SimpleOutline {
            end_points: vec![3],
            instructions: if with_instructions { vec![0xB0, 0x01] } else { Vec::new() },
            points,
            overlap: false,
        }
    }

    #[test]
    fn test_encode_decode_preserves_points() {
        let mut outline = square(1000, true);
        outline.points.push(OutlinePoint { x: -40, y: 3, on_curve: false });
        outline.end_points.push(4);

        let record = outline.encode().unwrap();
        let decoded = SimpleOutline::decode(&record).unwrap();
        assert_eq!(decoded, outline);
        assert_eq!(
            BoundingBox::from_glyph(&record),
            Some(BoundingBox { x_min: -40, y_min: 0, x_max: 1000, y_max: 1000 })
        );
    }

    #[test]
    fn test_repeated_flags_are_folded() {
        let mut outline = square(0, false);
        outline.points.iter_mut().for_each(|p| p.on_curve = false);
        let record = outline.encode().unwrap();
        // header (10) + end point (2) + instruction length (2) + flag + repeat count
        assert_eq!(record.len(), 16);
        assert_eq!(record[14], X_IS_SAME_OR_POSITIVE | Y_IS_SAME_OR_POSITIVE | REPEAT_FLAG);
        assert_eq!(record[15], 3);
        assert_eq!(SimpleOutline::decode(&record).unwrap().points.len(), 4);
    }

    #[test]
    fn test_transform_glyph() {
        let record = square(100, true).encode().unwrap();
        let transform = GlyphTransform::new((10, 20), (0.5, 2.0));
        let (new_record, bbox) = transform_simple_glyph(&record, &transform).unwrap();

        assert_eq!(bbox, BoundingBox { x_min: 10, y_min: 20, x_max: 60, y_max: 220 });
        let decoded = SimpleOutline::decode(&new_record).unwrap();
        assert!(decoded.instructions.is_empty());
        let coords: Vec<(i32, i32)> = decoded.points.iter().map(|p| (p.x, p.y)).collect();
        assert_eq!(coords, vec![(10, 20), (10, 220), (60, 220), (60, 20)]);
    }

    #[test]
    fn test_composite_is_not_decoded() {
        let mut record = square(10, false).encode().unwrap();
        record[0] = 0xFF;
        record[1] = 0xFF;
        assert!(SimpleOutline::decode(&record).is_none());
    }

    #[test]
    fn test_empty_contour_list() {
        let outline = SimpleOutline {
            end_points: Vec::new(),
            instructions: Vec::new(),
            points: Vec::new(),
            overlap: false,
        };
        let decoded = SimpleOutline::decode(&outline.encode().unwrap()).unwrap();
        assert_eq!(decoded, outline);
    }

    #[test]
    fn test_transform_rejects_unencodable_deltas() {
        let outline = SimpleOutline {
            end_points: vec![2],
            instructions: Vec::new(),
            points: [(-15000, 0), (15000, 0), (15000, 10)]
                .into_iter()
                .map(|(x, y)| OutlinePoint { x, y, on_curve: true })
                .collect(),
            overlap: false,
        };
        let record = outline.encode().unwrap();

        // both points stay in range, the 60000 unit step between them does not
        let widen = GlyphTransform::new((0, 0), (2.0, 1.0));
        assert!(transform_simple_glyph(&record, &widen).is_none());
        assert!(outline.transformed(&widen).encode().is_none());

        let narrow = GlyphTransform::new((0, 0), (0.5, 1.0));
        let (_, bbox) = transform_simple_glyph(&record, &narrow).unwrap();
        assert_eq!(bbox, BoundingBox { x_min: -7500, y_min: 0, x_max: 7500, y_max: 10 });
    }
}
