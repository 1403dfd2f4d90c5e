//! Disconnection gaps between a jointed part and its parent.

use rigcheck_core::defect::{Defect, DefectKind, Severity};
use rigcheck_model::Hierarchy;
use rigcheck_spatial::SpatialQueryProvider;

use super::CheckContext;

/// Emits a `GeometryGap` warning for every joint whose part's bounds sit
/// further than `max_allowed_gap` from its parent's bounds. Parts without
/// bounds on either side are skipped.
pub fn check_gaps<Q: SpatialQueryProvider>(ctx: &CheckContext<'_, Q>, out: &mut Vec<Defect>) {
    for joint in ctx.model.joints() {
        let part = joint.part();
        let Some(parent) = ctx.model.parent(part) else {
            continue;
        };
        let (Some(child_box), Some(parent_box)) = (
            ctx.model.link_world_aabb(ctx.snapshot, part),
            ctx.model.link_world_aabb(ctx.snapshot, parent),
        ) else {
            continue;
        };
        if ctx.query.bounds_intersect(&child_box, &parent_box) {
            continue;
        }
        let distance = ctx.query.closest_point_distance(&child_box, &parent_box);
        if distance <= ctx.config.max_allowed_gap {
            continue;
        }

        let child = ctx.model.part_ref(part);
        let parent = ctx.model.part_ref(parent);
        let message = format!(
            "Gap of {distance:.4} m between '{}' and '{}' at joint '{}'",
            child.name,
            parent.name,
            joint.name()
        );
        out.push(
            Defect::new(DefectKind::GeometryGap, Severity::Warning, message)
                .with_parts(child, parent)
                .with_separation(distance)
                .with_joint(joint.name(), joint.current_angle())
                .at(ctx.timestamp),
        );
    }
}
