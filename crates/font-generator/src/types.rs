//! Domain-specific newtypes for type safety
//!
//! Glyph IDs from a source font and glyph IDs in the generated font are both
//! plain `u16` on disk; keeping them apart at the type level makes it
//! impossible to write an old ID into a new table by accident.

use std::{
    fmt,
    fmt::{Display, Formatter, Result},
};

use read_fonts::types::Tag;

macro_rules! u16_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u16);

        impl $name {
            pub const fn new(id: u16) -> Self {
                Self(id)
            }

            pub const fn to_u16(self) -> u16 {
                self.0
            }

            pub const fn to_u32(self) -> u32 {
                self.0 as u32
            }

            pub const fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl From<u16> for $name {
            fn from(id: u16) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u16 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $label, self.0)
            }
        }
    };
}

u16_id!(
    /// A glyph ID inside one source font
    GlyphId,
    "GID"
);

u16_id!(
    /// A glyph ID in the generated font
    NewGlyphId,
    "NGID"
);

/// Index of a source font within the set being merged, in insertion order
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub usize);

impl FontId {
    pub const fn new(idx: usize) -> Self {
        Self(idx)
    }

    pub const fn as_usize(self) -> usize {
        self.0
    }
}

impl From<usize> for FontId {
    fn from(idx: usize) -> Self {
        Self(idx)
    }
}

impl Display for FontId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "Font[{}]", self.0)
    }
}

/// The only globally unique glyph identity while merging.
///
/// Ordering is by font first, then glyph, which is the canonical iteration
/// order of the merged resolved set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontGlyphId {
    pub font: FontId,
    pub glyph: GlyphId,
}

impl FontGlyphId {
    pub const fn new(font: FontId, glyph: GlyphId) -> Self {
        Self { font, glyph }
    }
}

impl Display for FontGlyphId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}:{}", self.font, self.glyph)
    }
}

/// A Unicode codepoint used as a character map key
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Codepoint(pub u32);

impl Codepoint {
    pub const fn new(cp: u32) -> Self {
        Self(cp)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    /// Whether the codepoint fits a format 4 segment (0xFFFF is reserved for the sentinel)
    pub const fn is_bmp(self) -> bool {
        self.0 < 0xFFFF
    }

    /// Convert to a Rust char if valid
    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.0)
    }
}

impl From<u32> for Codepoint {
    fn from(cp: u32) -> Self {
        Self(cp)
    }
}

impl From<Codepoint> for u32 {
    fn from(cp: Codepoint) -> Self {
        cp.0
    }
}

impl Display for Codepoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "U+{:04X}", self.0)
    }
}

/// A font table tag (always 4 bytes)
#[repr(transparent)]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TableTag(Tag);

impl TableTag {
    /// Create a TableTag from a 4-byte array
    pub fn new(bytes: &[u8; 4]) -> Self {
        Self(Tag::new(bytes))
    }

    /// Try to create a TableTag from a string
    ///
    /// Returns None if the string is longer than 4 bytes.
    /// Shorter strings are padded with spaces.
    pub fn parse(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        (bytes.len() <= 4).then(|| {
            let mut arr = [b' '; 4];
            arr[..bytes.len()].copy_from_slice(bytes);
            Self(Tag::new(&arr))
        })
    }

    /// Get the underlying Tag
    pub fn tag(&self) -> Tag {
        self.0
    }
}

impl From<Tag> for TableTag {
    fn from(tag: Tag) -> Self {
        Self(tag)
    }
}

impl Display for TableTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_ids() {
        assert_eq!(format!("{}", GlyphId::new(42)), "GID42");
        assert_eq!(format!("{}", NewGlyphId::new(7)), "NGID7");
    }

    #[test]
    fn test_font_glyph_id_order() {
        let a = FontGlyphId::new(FontId::new(0), GlyphId::new(9));
        let b = FontGlyphId::new(FontId::new(1), GlyphId::new(0));
        let c = FontGlyphId::new(FontId::new(1), GlyphId::new(3));
        assert!(a < b && b < c);
        assert_eq!(format!("{}", c), "Font[1]:GID3");
    }

    #[test]
    fn test_codepoint() {
        let cp = Codepoint::new(0x0041);
        assert_eq!(cp.to_char(), Some('A'));
        assert_eq!(format!("{}", cp), "U+0041");
        assert!(cp.is_bmp());
        assert!(!Codepoint::new(0xFFFF).is_bmp());
        assert!(!Codepoint::new(0x1F600).is_bmp());
    }

    #[test]
    fn test_table_tag() {
        let tag = TableTag::parse("OS/2").unwrap();
        assert_eq!(format!("{}", tag), "OS/2");

        let tag = TableTag::parse("cvt").unwrap();
        assert_eq!(tag.tag(), Tag::new(b"cvt "));

        assert!(TableTag::parse("toolong").is_none());
    }
}
