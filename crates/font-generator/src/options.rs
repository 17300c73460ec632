//! Options for font generation

use read_fonts::types::Tag;

use crate::types::TableTag;

/// Options for font generation
#[derive(Debug, Clone)]
pub struct Options {
    /// Emit a version 2 `post` table carrying glyph names. When disabled a
    /// version 3 table (metrics only) is written instead.
    pub use_post_table: bool,

    /// Tables copied verbatim from the base font when it has them
    pub passthrough_tables: Vec<TableTag>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            use_post_table: true,
            passthrough_tables: vec![TableTag::new(b"name")],
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn use_post_table(mut self, use_post_table: bool) -> Self {
        self.use_post_table = use_post_table;
        self
    }

    /// Replace the passthrough list (accepts any iterable of string-like values)
    pub fn passthrough_tables(mut self, tables: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        self.passthrough_tables = tables
            .into_iter()
            .filter_map(|s| TableTag::parse(s.as_ref()))
            .collect();
        self
    }

    /// Add a single passthrough table
    pub fn passthrough_table(mut self, table: impl AsRef<str>) -> Self {
        if let Some(tag) = TableTag::parse(table.as_ref())
            && !self.passthrough_tables.contains(&tag)
        {
            self.passthrough_tables.push(tag);
        }
        self
    }

    /// Check if a table is copied from the base font
    pub fn is_passthrough(&self, tag: Tag) -> bool {
        self.passthrough_tables.iter().any(|t| t.tag() == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::new();
        assert!(options.use_post_table);
        assert!(options.is_passthrough(Tag::new(b"name")));
        assert!(!options.is_passthrough(Tag::new(b"OS/2")));
    }

    #[test]
    fn test_builder() {
        let options = Options::new()
            .use_post_table(false)
            .passthrough_table("OS/2")
            .passthrough_table("name")
            .passthrough_table("far-too-long");
        assert!(!options.use_post_table);
        assert_eq!(options.passthrough_tables.len(), 2);

        let options = options.passthrough_tables(["cvt", "fpgm"]);
        assert!(options.is_passthrough(Tag::new(b"cvt ")));
        assert!(!options.is_passthrough(Tag::new(b"name")));
    }
}
