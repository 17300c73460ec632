use std::{ops::RangeInclusive, path::PathBuf};

use clap::Parser;
use env_logger::Env;
use glyphmerge_font_generator::{
    Codepoint, FontFile, FontGenerator, FontSource, GlyphSelection, Options, RenameTable, Result,
};
use log::{info, warn};
use rayon::prelude::*;
use read_fonts::FontRef;

#[derive(Parser)]
#[command(name = "font-generator")]
#[command(about = "Merge glyphs from several fonts into one", long_about = None)]
struct Cli {
    /// Input font files, in merge order
    #[arg(required = true)]
    input_files: Vec<PathBuf>,

    /// Output font file
    #[arg(short, long, default_value = "merged.ttf")]
    output: PathBuf,

    /// Index of the input whose head/hhea/maxp/post are used as templates
    #[arg(long, default_value_t = 0)]
    base: usize,

    /// Codepoints to keep from every input, e.g. `0x41-0x5A,0x61` (default: all)
    #[arg(long, value_delimiter = ',', value_parser = parse_codepoint_range)]
    select: Vec<RangeInclusive<u32>>,

    /// Write a post table without glyph names
    #[arg(long)]
    no_post: bool,

    /// Comma-separated list of tables to copy from the base font
    #[arg(long, value_delimiter = ',', default_value = "name")]
    passthrough: Vec<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_codepoint(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("U+")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid codepoint '{s}': {e}"))
}

fn parse_codepoint_range(s: &str) -> std::result::Result<RangeInclusive<u32>, String> {
    match s.split_once('-') {
        Some((start, end)) => {
            let (start, end) = (parse_codepoint(start)?, parse_codepoint(end)?);
            if start > end {
                return Err(format!("empty codepoint range '{s}'"));
            }
            Ok(start..=end)
        }
        None => parse_codepoint(s).map(|cp| cp..=cp),
    }
}

/// Position of input `requested` among the inputs that were kept
fn base_position(kept: &[usize], requested: usize) -> Option<usize> {
    kept.iter().position(|&idx| idx == requested)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    info!("Loading {} fonts", cli.input_files.len());
    let files: Vec<FontFile> = cli
        .input_files
        .par_iter()
        .map(FontFile::load)
        .collect::<Result<Vec<_>>>()?;

    let selected = |cp: Codepoint| cli.select.is_empty() || cli.select.iter().any(|r| r.contains(&cp.to_u32()));

    let options = Options::new().use_post_table(!cli.no_post).passthrough_tables(&cli.passthrough);
    let mut kept = Vec::new();
    let mut sources = Vec::new();
    for (idx, file) in files.iter().enumerate() {
        let renames = RenameTable::identity_for(&FontRef::new(&file.data)?, selected)?;
        if renames.is_empty() {
            warn!("{}: no selected codepoints, skipping", file.path.display());
            continue;
        }
        info!("{}: {} codepoints selected", file.path.display(), renames.len());
        sources.push(FontSource::open(&file.data, GlyphSelection::new(renames))?);
        kept.push(idx);
    }

    let base = base_position(&kept, cli.base);
    if let (None, Some(&first)) = (base, kept.first()) {
        warn!(
            "Base input {} was not merged, using {} as the base",
            cli.base,
            files[first].path.display()
        );
    }

    let mut generator = FontGenerator::with_options(options);
    for (pos, source) in sources.into_iter().enumerate() {
        generator.add_font(source, base == Some(pos));
    }

    generator.generate_file(&cli.output)?;
    println!("{}", cli.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranges() {
        assert_eq!(parse_codepoint_range("0x41-0x5A").unwrap(), 0x41..=0x5A);
        assert_eq!(parse_codepoint_range("U+1F600").unwrap(), 0x1F600..=0x1F600);
        assert_eq!(parse_codepoint_range("97").unwrap(), 97..=97);
        assert!(parse_codepoint_range("0x5A-0x41").is_err());
        assert!(parse_codepoint_range("zz").is_err());
    }

    #[test]
    fn test_base_position_after_skipped_inputs() {
        // inputs 0 and 2 had nothing selected
        let kept = [1, 3, 4];
        assert_eq!(base_position(&kept, 3), Some(1));
        assert_eq!(base_position(&kept, 1), Some(0));
        assert_eq!(base_position(&kept, 0), None);
        assert_eq!(base_position(&kept, 2), None);
        assert_eq!(base_position(&kept, 9), None);
        assert_eq!(base_position(&[], 0), None);
    }
}
