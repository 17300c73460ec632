//! PostScript glyph names

use std::{
    borrow::Borrow,
    fmt::{Display, Formatter, Result},
    ops::Deref,
};

use crate::types::Codepoint;

/// A PostScript glyph name as written to the `post` table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GlyphName(String);

impl GlyphName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The AGL-style fallback name for a codepoint (`uni0041`, `u1F600`)
    pub fn for_codepoint(cp: Codepoint) -> Self {
        if cp.to_u32() <= 0xFFFF {
            Self(format!("uni{:04X}", cp.to_u32()))
        } else {
            Self(format!("u{:05X}", cp.to_u32()))
        }
    }

    /// The fallback name for an unnamed glyph ID
    pub fn for_glyph_index(gid: u16) -> Self {
        Self(format!("glyph{gid:05}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for GlyphName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GlyphName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GlyphName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<&str> for GlyphName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Display for GlyphName {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GlyphName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for GlyphName {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
