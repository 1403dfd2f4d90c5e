//! Links whose geometry is missing.

use rigcheck_core::defect::{Defect, DefectKind, Severity};
use rigcheck_spatial::SpatialQueryProvider;

use super::CheckContext;

/// Emits a `MissingMesh` warning for each link that references mesh files
/// that could not be read. With `report_missing_geometry` enabled, every
/// other link without renderable bounds or colliders gets a `MissingMesh`
/// info defect.
pub fn check_missing_geometry<Q: SpatialQueryProvider>(
    ctx: &CheckContext<'_, Q>,
    out: &mut Vec<Defect>,
) {
    for link in ctx.model.links() {
        let unreadable = link.unreadable_meshes();
        if !unreadable.is_empty() {
            out.push(
                Defect::new(
                    DefectKind::MissingMesh,
                    Severity::Warning,
                    format!(
                        "Link '{}' references unreadable mesh {}",
                        link.name(),
                        unreadable
                            .iter()
                            .map(|f| format!("'{f}'"))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )
                .with_part(link.part_ref())
                .at(ctx.timestamp),
            );
            continue;
        }
        if !ctx.config.report_missing_geometry
            || link.has_bounds()
            || ctx.model.has_colliders(link.id())
        {
            continue;
        }
        out.push(
            Defect::new(
                DefectKind::MissingMesh,
                Severity::Info,
                format!("Link '{}' has no visual or collision geometry", link.name()),
            )
            .with_part(link.part_ref())
            .at(ctx.timestamp),
        );
    }
}
