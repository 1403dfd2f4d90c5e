//! Self-collision between non-adjacent parts.

use std::collections::HashSet;

use rigcheck_core::defect::{Defect, DefectKind};
use rigcheck_core::types::PartId;
use rigcheck_spatial::SpatialQueryProvider;

use super::{CheckContext, penetration_severity};

// ---------------------------------------------------------------------------
// PairKey / PairLedger
// ---------------------------------------------------------------------------

/// Order-independent key for a pair of parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(PartId, PartId);

impl PairKey {
    pub fn new(a: PartId, b: PartId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    pub const fn parts(self) -> (PartId, PartId) {
        (self.0, self.1)
    }
}

/// Part pairs already reported. Rebuilt for every pass or sweep.
#[derive(Debug, Clone, Default)]
pub struct PairLedger {
    seen: HashSet<PairKey>,
}

impl PairLedger {
    pub fn contains(&self, key: PairKey) -> bool {
        self.seen.contains(&key)
    }

    /// Records the pair; `false` if it was already recorded.
    pub fn insert(&mut self, key: PairKey) -> bool {
        self.seen.insert(key)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

/// Two parts whose colliders overlap beyond the reporting threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Owner of the earlier collider in enumeration order.
    pub a: PartId,
    pub b: PartId,
    pub depth: f32,
}

impl Contact {
    pub fn key(&self) -> PairKey {
        PairKey::new(self.a, self.b)
    }
}

/// Visits every unordered collider pair once and returns the first
/// overlapping collider pair for each non-adjacent part pair accepted by
/// `include`, in enumeration order.
pub fn find_contacts<Q: SpatialQueryProvider>(
    ctx: &CheckContext<'_, Q>,
    include: impl Fn(PartId, PartId) -> bool,
) -> Vec<Contact> {
    let colliders = ctx.model.colliders();
    let placed: Vec<_> = colliders
        .iter()
        .map(|c| ctx.model.collider_world(ctx.snapshot, c))
        .collect();

    let mut ledger = PairLedger::default();
    let mut contacts = Vec::new();
    for i in 0..colliders.len() {
        for j in (i + 1)..colliders.len() {
            let (a, b) = (colliders[i].owner, colliders[j].owner);
            if a == b || !include(a, b) {
                continue;
            }
            let key = PairKey::new(a, b);
            if ledger.contains(key) || ctx.classifier.are_adjacent(ctx.model, a, b) {
                continue;
            }
            let (shape_a, pose_a) = &placed[i];
            let (shape_b, pose_b) = &placed[j];
            let Some(depth) = ctx.query.overlap(shape_a, pose_a, shape_b, pose_b) else {
                continue;
            };
            if depth > ctx.config.penetration_threshold {
                ledger.insert(key);
                contacts.push(Contact { a, b, depth });
            }
        }
    }
    contacts
}

/// Emits one `SelfCollision` defect per overlapping non-adjacent part pair.
pub fn check_self_collision<Q: SpatialQueryProvider>(
    ctx: &CheckContext<'_, Q>,
    out: &mut Vec<Defect>,
) {
    for contact in find_contacts(ctx, |_, _| true) {
        let a = ctx.model.part_ref(contact.a);
        let b = ctx.model.part_ref(contact.b);
        let message = format!(
            "Self-collision between '{}' and '{}' (penetration {:.4} m)",
            a.name, b.name, contact.depth
        );
        out.push(
            Defect::new(
                DefectKind::SelfCollision,
                penetration_severity(contact.depth, ctx.config),
                message,
            )
            .with_parts(a, b)
            .with_penetration(contact.depth)
            .at(ctx.timestamp),
        );
    }
}
