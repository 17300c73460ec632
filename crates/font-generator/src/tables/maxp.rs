//! maxp assembly

use font_types::Version16Dot16;
use read_fonts::{TableProvider, tables::maxp::Maxp as ReadMaxp};
use write_fonts::{from_obj::ToOwnedTable, tables::maxp::Maxp};

use super::AssemblyContext;
use crate::{FontError, Result};

/// Build `maxp` from the base font, taking the largest profile values of
/// every source font so the merged outlines stay within bounds.
pub fn build_maxp(ctx: &AssemblyContext, num_glyphs: u16) -> Result<Maxp> {
    let base = ctx
        .base_source()?
        .font()
        .maxp()
        .map_err(|_| FontError::MissingTable { font: ctx.base, table: "maxp" })?;
    let is_version_1 = base.version() == Version16Dot16::VERSION_1_0;

    let mut maxp: Maxp = base.to_owned_table();
    maxp.num_glyphs = num_glyphs;
    if !is_version_1 {
        return Ok(maxp);
    }

    let tables: Vec<ReadMaxp> = ctx.base_first().filter_map(|s| s.font().maxp().ok()).collect();

    maxp.max_points = largest(&tables, |t| t.max_points());
    maxp.max_contours = largest(&tables, |t| t.max_contours());
    maxp.max_composite_points = largest(&tables, |t| t.max_composite_points());
    maxp.max_composite_contours = largest(&tables, |t| t.max_composite_contours());
    maxp.max_zones = largest(&tables, |t| t.max_zones());
    maxp.max_twilight_points = largest(&tables, |t| t.max_twilight_points());
    maxp.max_storage = largest(&tables, |t| t.max_storage());
    maxp.max_function_defs = largest(&tables, |t| t.max_function_defs());
    maxp.max_instruction_defs = largest(&tables, |t| t.max_instruction_defs());
    maxp.max_stack_elements = largest(&tables, |t| t.max_stack_elements());
    maxp.max_size_of_instructions = largest(&tables, |t| t.max_size_of_instructions());
    maxp.max_component_elements = largest(&tables, |t| t.max_component_elements());
    maxp.max_component_depth = largest(&tables, |t| t.max_component_depth());

    Ok(maxp)
}

fn largest(tables: &[ReadMaxp], field: impl Fn(&ReadMaxp) -> Option<u16>) -> Option<u16> {
    tables.iter().filter_map(field).max()
}
