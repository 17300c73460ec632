//! The merge pipeline: sources in, one assembled font out

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use read_fonts::types::Tag;
use write_fonts::FontBuilder;

use crate::{
    FontError, Result,
    coordinator::merge_character_maps,
    options::Options,
    source::FontSource,
    tables::{
        AssemblyContext,
        cmap::build_cmap,
        glyf::build_glyf,
        head::{build_head, patch_checksum_adjustment},
        hmtx::{build_hhea, build_hmtx},
        maxp::build_maxp,
        post::{build_post_v2, build_post_v3},
    },
    types::FontId,
};

/// Merges opened [`FontSource`]s into a single font.
///
/// # Example
///
/// ```no_run
/// use glyphmerge_font_generator::{FontFile, FontGenerator, FontSource, GlyphSelection, RenameTable};
/// use read_fonts::FontRef;
///
/// let a = FontFile::load("a.ttf")?;
/// let b = FontFile::load("b.ttf")?;
/// let renames_a = RenameTable::identity(&FontRef::new(&a.data)?)?;
/// let renames_b = RenameTable::identity(&FontRef::new(&b.data)?)?;
///
/// let mut generator = FontGenerator::new();
/// generator.add_font(FontSource::open(&a.data, GlyphSelection::new(renames_a))?, true);
/// generator.add_font(FontSource::open(&b.data, GlyphSelection::new(renames_b))?, false);
/// generator.generate_file("merged.ttf")?;
/// # Ok::<(), glyphmerge_font_generator::FontError>(())
/// ```
#[derive(Default)]
pub struct FontGenerator<'a> {
    sources: Vec<FontSource<'a>>,
    base: Option<FontId>,
    options: Options,
}

impl<'a> FontGenerator<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: Options) -> Self {
        Self { options, ..Self::default() }
    }

    /// Append a source; the last one added with `is_base` supplies the
    /// template tables, otherwise the first source does.
    pub fn add_font(&mut self, source: FontSource<'a>, is_base: bool) -> FontId {
        let id = FontId::new(self.sources.len());
        self.sources.push(source);
        if is_base {
            self.base = Some(id);
        }
        id
    }

    pub fn base(&self) -> FontId {
        self.base.unwrap_or(FontId::new(0))
    }

    pub fn sources(&self) -> &[FontSource<'a>] {
        &self.sources
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Assemble the merged font in memory.
    pub fn generate(&self) -> Result<Vec<u8>> {
        if self.sources.is_empty() {
            return Err(FontError::NoFonts);
        }
        let base = self.base();
        if base.as_usize() >= self.sources.len() {
            return Err(FontError::MissingBaseFont(base));
        }

        let model = merge_character_maps(&self.sources)?;
        info!(
            "Merging {} fonts: {} codepoints, {} glyphs, base {base}",
            self.sources.len(),
            model.char_map.len(),
            model.resolved.len()
        );

        let ctx = AssemblyContext { sources: &self.sources, base, model: &model, options: &self.options };

        let glyf = build_glyf(&ctx)?;
        let maxp = build_maxp(&ctx, glyf.glyph_map.num_glyphs())?;
        let cmap = build_cmap(&model, &glyf.glyph_map)?;
        let hmtx = build_hmtx(&ctx, &glyf)?;
        let hhea = build_hhea(&ctx, &hmtx)?;
        let head = build_head(&ctx, glyf.bbox, glyf.loca_format)?;

        let mut builder = FontBuilder::new();
        builder.add_raw(Tag::new(b"head"), head);
        builder.add_table(&hhea)?;
        builder.add_table(&maxp)?;
        builder.add_raw(Tag::new(b"cmap"), cmap);
        builder.add_raw(Tag::new(b"hmtx"), hmtx.hmtx);
        builder.add_raw(Tag::new(b"glyf"), glyf.glyf);
        builder.add_raw(Tag::new(b"loca"), glyf.loca);

        if self.options.use_post_table {
            builder.add_raw(Tag::new(b"post"), build_post_v2(&ctx, &glyf.glyph_map)?);
        } else {
            builder.add_table(&build_post_v3(&ctx)?)?;
        }

        copy_passthrough_tables(&mut builder, &ctx)?;

        let font = patch_checksum_adjustment(builder.build());
        info!("Generated font: {} glyphs, {} bytes", glyf.glyph_map.len(), font.len());
        Ok(font)
    }

    /// Assemble the merged font and write it to `path`.
    ///
    /// The data goes to a temporary file next to `path` first, so a failed
    /// run never leaves a partial font behind.
    pub fn generate_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let font = self.generate()?;

        let tmp = temp_path(path);
        if let Err(err) = fs::write(&tmp, &font).and_then(|()| fs::rename(&tmp, path)) {
            let _ = fs::remove_file(&tmp);
            return Err(err.into());
        }
        info!("Wrote {}", path.display());
        Ok(())
    }
}

/// Copy the configured tables from the base font unless they are generated
fn copy_passthrough_tables(builder: &mut FontBuilder, ctx: &AssemblyContext) -> Result<()> {
    let font = ctx.base_source()?.font();
    for table in &ctx.options.passthrough_tables {
        let tag = table.tag();
        if builder.contains(tag) {
            warn!("Not copying '{table}' from the base font, it is generated");
            continue;
        }
        match font.table_data(tag) {
            Some(data) => {
                debug!("Copying '{table}' from the base font");
                builder.add_raw(tag, data.as_bytes().to_vec());
            }
            None => debug!("Base font has no '{table}' table"),
        }
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
