//! Implausible link dimensions.

use rigcheck_core::defect::{Defect, DefectKind, Severity};
use rigcheck_spatial::SpatialQueryProvider;

use super::CheckContext;

/// Flags links whose largest dimension exceeds `max_dimension` (error) or
/// whose smallest positive dimension is under `min_dimension` (warning).
/// Both can fire for the same link.
pub fn check_scale<Q: SpatialQueryProvider>(ctx: &CheckContext<'_, Q>, out: &mut Vec<Defect>) {
    let limits = &ctx.config.scale;
    for link in ctx.model.links() {
        let Some(size) = link.world_size() else {
            continue;
        };
        let largest = size.max();
        if largest > limits.max_dimension {
            out.push(
                Defect::new(
                    DefectKind::InvalidScale,
                    Severity::Error,
                    format!(
                        "Link '{}' is too large ({largest:.3} > {:.3}); check units",
                        link.name(),
                        limits.max_dimension
                    ),
                )
                .with_part(link.part_ref())
                .at(ctx.timestamp),
            );
        }

        let smallest = size
            .iter()
            .copied()
            .filter(|d| *d > 0.0)
            .fold(f32::INFINITY, f32::min);
        if smallest < limits.min_dimension {
            out.push(
                Defect::new(
                    DefectKind::InvalidScale,
                    Severity::Warning,
                    format!(
                        "Link '{}' is too small ({smallest:.6} < {:.6})",
                        link.name(),
                        limits.min_dimension
                    ),
                )
                .with_part(link.part_ref())
                .at(ctx.timestamp),
            );
        }
    }
}
