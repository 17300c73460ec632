//! post assembly: version 2.0 with glyph names, or version 3.0 without

use font_types::{FWord, Fixed as FontFixed, Version16Dot16};
use glyphmerge_binary_stream::{BinaryStream, Fixed};
use indexmap::IndexMap;
use log::debug;
use read_fonts::{FontRef, TableProvider};
use write_fonts::{from_obj::ToOwnedTable, tables::post::Post};

use super::{AssemblyContext, post_names::standard_index};
use crate::{
    FontError, Result,
    glyph_name::GlyphName,
    remap::GlyphIdMap,
};

const POST_VERSION_2: Fixed = Fixed::new(2, 0);
const POST_VERSION_3: Version16Dot16 = Version16Dot16::new(3, 0);
const NUM_STANDARD_NAMES: usize = 258;

/// The fixed 32-byte part of a `post` table
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PostHeader {
    pub italic_angle: Fixed,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: u32,
    pub min_mem_type42: u32,
    pub max_mem_type42: u32,
    pub min_mem_type1: u32,
    pub max_mem_type1: u32,
}

impl PostHeader {
    /// Metrics of the font's `post` table, or zeros when it has none
    pub fn from_font(font: &FontRef) -> Self {
        let Ok(post) = font.post() else {
            return Self::default();
        };
        Self {
            italic_angle: Fixed::from_bits(post.italic_angle().to_bits()),
            underline_position: post.underline_position().to_i16(),
            underline_thickness: post.underline_thickness().to_i16(),
            is_fixed_pitch: post.is_fixed_pitch(),
            min_mem_type42: post.min_mem_type42(),
            max_mem_type42: post.max_mem_type42(),
            min_mem_type1: post.min_mem_type1(),
            max_mem_type1: post.max_mem_type1(),
        }
    }
}

/// Name every new glyph, in new-ID order.
///
/// Caller-supplied names win, then the source font's own name, then a
/// generated one. Repeated names get a `.N` suffix.
pub fn glyph_names(ctx: &AssemblyContext, glyph_map: &GlyphIdMap) -> Result<Vec<GlyphName>> {
    let mut names = Vec::with_capacity(glyph_map.len());
    for (new_id, old) in glyph_map.iter() {
        let name = match ctx.model.name_of(old) {
            Some(name) => name.clone(),
            None => ctx.source(old.font)?.glyph_name(old.glyph).unwrap_or_else(|| {
                if old.glyph.to_u16() == 0 {
                    GlyphName::new(".notdef")
                } else {
                    GlyphName::for_glyph_index(new_id.to_u16())
                }
            }),
        };
        names.push(name);
    }
    Ok(disambiguate(names))
}

/// Make every name unique by appending the first free `.N` suffix to repeats.
pub fn disambiguate(names: Vec<GlyphName>) -> Vec<GlyphName> {
    // name -> next suffix to try
    let mut seen: IndexMap<GlyphName, usize> = IndexMap::with_capacity(names.len());
    names
        .into_iter()
        .map(|name| {
            let Some(&next) = seen.get(&name) else {
                seen.insert(name.clone(), 1);
                return name;
            };
            let mut suffix = next;
            let mut candidate = GlyphName::new(format!("{name}.{suffix}"));
            while seen.contains_key(&candidate) {
                suffix += 1;
                candidate = GlyphName::new(format!("{name}.{suffix}"));
            }
            seen.insert(name, suffix + 1);
            seen.insert(candidate.clone(), 1);
            candidate
        })
        .collect()
}

/// Encode a version 2.0 table for `names`.
pub fn encode_post_v2(header: &PostHeader, names: &[GlyphName]) -> Result<Vec<u8>> {
    let mut indices = Vec::with_capacity(names.len());
    let mut pool = BinaryStream::new();
    let mut custom = 0usize;

    for name in names {
        let index = match standard_index(name) {
            Some(index) => index,
            None => {
                let len = u8::try_from(name.len())
                    .map_err(|_| FontError::GlyphNameTooLong(name.to_string()))?;
                let index = u16::try_from(NUM_STANDARD_NAMES + custom)
                    .map_err(|_| FontError::TooManyGlyphs(names.len()))?;
                pool.write_byte(len);
                pool.write_bytes(name.as_bytes());
                custom += 1;
                index
            }
        };
        indices.push(index);
    }

    let mut s = BinaryStream::with_capacity(34 + indices.len() * 2 + pool.len());
    s.write_fixed(POST_VERSION_2);
    s.write_fixed(header.italic_angle);
    s.write_fword(header.underline_position);
    s.write_fword(header.underline_thickness);
    s.write_ulong(header.is_fixed_pitch);
    s.write_ulong(header.min_mem_type42);
    s.write_ulong(header.max_mem_type42);
    s.write_ulong(header.min_mem_type1);
    s.write_ulong(header.max_mem_type1);
    s.write_ushort(indices.len() as u16);
    for index in indices {
        s.write_ushort(index);
    }
    s.write_bytes(pool.as_bytes());

    debug!("post: {} glyph names, {} stored in the table", names.len(), custom);
    Ok(s.into_bytes())
}

pub fn build_post_v2(ctx: &AssemblyContext, glyph_map: &GlyphIdMap) -> Result<Vec<u8>> {
    let header = PostHeader::from_font(ctx.base_source()?.font());
    let names = glyph_names(ctx, glyph_map)?;
    encode_post_v2(&header, &names)
}

/// A name-less `post` carrying the base font's metrics
pub fn build_post_v3(ctx: &AssemblyContext) -> Result<Post> {
    let base = ctx.base_source()?.font();
    let mut post: Post = match base.post() {
        Ok(post) => post.to_owned_table(),
        Err(_) => Post {
            version: POST_VERSION_3,
            italic_angle: FontFixed::ZERO,
            underline_position: FWord::new(0),
            underline_thickness: FWord::new(0),
            is_fixed_pitch: 0,
            min_mem_type42: 0,
            max_mem_type42: 0,
            min_mem_type1: 0,
            max_mem_type1: 0,
            num_glyphs: None,
            glyph_name_index: None,
            string_data: None,
        },
    };
    post.version = POST_VERSION_3;
    post.num_glyphs = None;
    post.glyph_name_index = None;
    post.string_data = None;
    Ok(post)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<GlyphName> {
        list.iter().map(|n| GlyphName::from(*n)).collect()
    }

    #[test]
    fn test_v2_layout() {
        let header = PostHeader {
            italic_angle: Fixed::new(-12, 0),
            underline_position: -100,
            underline_thickness: 50,
            ..Default::default()
        };
        let data = encode_post_v2(&header, &names(&[".notdef", "A", "icon_home", "space", "icon_user"])).unwrap();
        let mut s = BinaryStream::from_bytes(data);

        assert_eq!(s.read_ulong(), 0x0002_0000);
        assert_eq!(s.read_long(), -12 << 16);
        assert_eq!(s.read_short(), -100);
        assert_eq!(s.read_short(), 50);
        s.set_pos(32);
        assert_eq!(s.read_ushort(), 5);
        let indices: Vec<u16> = (0..5).map(|_| s.read_ushort()).collect();
        assert_eq!(indices, vec![0, 36, 258, 3, 259]);

        let len = s.read_byte() as usize;
        assert_eq!(s.read_string(len), "icon_home");
        let len = s.read_byte() as usize;
        assert_eq!(s.read_string(len), "icon_user");
        assert_eq!(s.remaining(), 0);
    }

    #[test]
    fn test_suffixes_skip_names_already_taken() {
        let out = disambiguate(names(&[".notdef", "A.1", "A", "A", "A", ".notdef"]));
        assert_eq!(out, names(&[".notdef", "A.1", "A", "A.2", "A.3", ".notdef.1"]));
    }

    #[test]
    fn test_generated_suffix_then_same_caller_name() {
        let out = disambiguate(names(&["A", "A", "A.1"]));
        assert_eq!(out, names(&["A", "A.1", "A.1.1"]));
    }

    #[test]
    fn test_long_names_rejected() {
        let long = "x".repeat(256);
        let err = encode_post_v2(&PostHeader::default(), &names(&[".notdef", &long])).unwrap_err();
        assert!(matches!(err, FontError::GlyphNameTooLong(_)));

        let ok = "x".repeat(255);
        assert!(encode_post_v2(&PostHeader::default(), &names(&[&ok])).is_ok());
    }
}
