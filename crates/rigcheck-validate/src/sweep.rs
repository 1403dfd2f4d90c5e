//! Discrete sweep of one joint through its range.
//!
//! The joint is stepped through evenly spaced normalized positions and the
//! self-collision scan runs at each pose, restricted to pairs with exactly
//! one part in the joint's subtree. Continuous motion between samples is not
//! checked.

use rigcheck_core::config::ValidatorConfig;
use rigcheck_core::defect::{Defect, DefectKind};
use rigcheck_core::time::Timestamp;
use rigcheck_core::types::{JointId, PartId};
use rigcheck_model::{AdjacencyClassifier, RobotModel};
use rigcheck_spatial::SpatialQueryProvider;
use tracing::debug;

use crate::checks::{CheckContext, Contact, PairLedger, find_contacts, penetration_severity};

/// Parameters shared by every sample of a sweep.
pub struct SweepParams<'a, Q> {
    pub config: &'a ValidatorConfig,
    pub classifier: AdjacencyClassifier,
    pub query: &'a Q,
    pub timestamp: Timestamp,
}

/// Sweeps `joint` over `samples` poses (at least two) and returns one
/// `JointLimitCollision` defect per part pair that does not collide at the
/// joint's current angle but does at some sampled angle, reported at the
/// first such angle. The joint's angle and drive target are restored
/// afterwards.
#[allow(clippy::cast_precision_loss)]
pub fn sweep_joint<Q: SpatialQueryProvider>(
    model: &mut RobotModel,
    joint: JointId,
    samples: usize,
    params: &SweepParams<'_, Q>,
) -> Vec<Defect> {
    let Some(actuator) = model.joint(joint) else {
        return Vec::new();
    };
    if !actuator.kind().is_movable() || actuator.is_degenerate() {
        return Vec::new();
    }
    let name = actuator.name().to_string();
    let prior = actuator.current_angle();
    let prior_target = actuator.drive_target();
    let mask = model.subtree_mask(actuator.part());
    let crosses = |a: PartId, b: PartId| {
        mask[a.index()] != mask[b.index()]
    };

    // Pairs already colliding at the current pose are self-collisions, not
    // joint-limit collisions.
    let mut reported = PairLedger::default();
    for contact in contacts_at_current_pose(model, params, &crosses) {
        reported.insert(contact.key());
    }

    let samples = samples.max(2);
    let mut defects = Vec::new();
    for k in 0..samples {
        let position = k as f32 / (samples - 1) as f32;
        let Some(actuator) = model.joint_mut(joint) else {
            break;
        };
        actuator.set_normalized_position(position);
        let angle = actuator.current_angle();

        for contact in contacts_at_current_pose(model, params, &crosses) {
            if !reported.insert(contact.key()) {
                continue;
            }
            let a = model.part_ref(contact.a);
            let b = model.part_ref(contact.b);
            let message = format!(
                "Joint '{name}' at {angle:.2} drives '{}' into '{}' (penetration {:.4} m)",
                a.name, b.name, contact.depth
            );
            defects.push(
                Defect::new(
                    DefectKind::JointLimitCollision,
                    penetration_severity(contact.depth, params.config),
                    message,
                )
                .with_parts(a, b)
                .with_penetration(contact.depth)
                .with_joint(name.clone(), angle)
                .at(params.timestamp),
            );
        }
    }

    if let Some(actuator) = model.joint_mut(joint) {
        actuator.restore(prior, prior_target);
    }
    debug!(joint = %name, samples, found = defects.len(), "joint sweep finished");
    defects
}

fn contacts_at_current_pose<Q: SpatialQueryProvider>(
    model: &RobotModel,
    params: &SweepParams<'_, Q>,
    include: &impl Fn(PartId, PartId) -> bool,
) -> Vec<Contact> {
    let snapshot = model.pose_snapshot();
    let ctx = CheckContext {
        model,
        snapshot: &snapshot,
        config: params.config,
        classifier: params.classifier,
        query: params.query,
        timestamp: params.timestamp,
    };
    find_contacts(&ctx, include)
}
