//! Canned robots with known defects.
//!
//! All joints start at zero, so every link frame is a pure translation of
//! its parent and the world boxes quoted below can be checked by hand.

use nalgebra::Vector3;
use rigcheck_model::{JointDescription, JointKind, RobotDescription};

use crate::builders::{box_link, child_box, fixed, revolute};

/// A single link whose box has the given size.
pub fn single_box(size: [f32; 3]) -> RobotDescription {
    RobotDescription::new("single").with_link(box_link("body", size, [0.0; 3]))
}

/// Two 0.1 m cubes side by side along x, `gap` meters apart, joined by the
/// revolute joint `hinge` about z. A negative gap makes them overlap.
pub fn gapped_pair(gap: f32) -> RobotDescription {
    RobotDescription::new("pair")
        .with_link(box_link("base", [0.1; 3], [0.0; 3]))
        .with_link(child_box("tip", "base", [0.1 + gap, 0.0, 0.0], [0.1; 3], [0.0; 3]))
        .with_joint(revolute("hinge", "tip", [0.0, 0.0, 1.0]))
}

/// A straight chain `link0 .. link{n-1}` of 0.1 m cubes stacked along z,
/// each overlapping its parent by 0.02 m. Every link is adjacent to its
/// neighbours, and links three or more levels apart never touch.
pub fn stacked_chain(n: usize) -> RobotDescription {
    let mut description =
        RobotDescription::new("chain").with_link(box_link("link0", [0.1; 3], [0.0; 3]));
    for i in 1..n {
        let name = format!("link{i}");
        let parent = format!("link{}", i - 1);
        description = description
            .with_link(child_box(&name, &parent, [0.0, 0.0, 0.08], [0.1; 3], [0.0; 3]))
            .with_joint(revolute(&format!("joint{i}"), &name, [0.0, 0.0, 1.0]));
    }
    description
}

/// Two arms on a base with exactly two self-collisions and one gap.
///
/// World boxes at the zero pose (x, z ranges; every box is 0.05 m deep in
/// y except the base):
///
/// | link          | parent      | x              | z              |
/// |---------------|-------------|----------------|----------------|
/// | `base`        | -           | -0.2 .. 0.2    | -0.05 .. 0.05  |
/// | `left_upper`  | base        | -0.125 .. -0.075 | 0.05 .. 0.25 |
/// | `right_upper` | base        | 0.075 .. 0.125 | 0.05 .. 0.2    |
/// | `left_lower`  | left_upper  | -0.2 .. 0.1    | 0.25 .. 0.3    |
/// | `right_lower` | right_upper | 0.0 .. 0.1     | 0.2 .. 0.3     |
/// | `left_hand`   | left_lower  | -0.2 .. -0.15  | 0.045 .. 0.25  |
/// | `right_hand`  | right_lower | 0.15 .. 0.2    | 0.4 .. 0.45    |
///
/// * `left_lower` / `right_lower` are cousins and overlap by 0.05 m (error).
/// * `left_hand` is three levels below `base` and dips 0.005 m into it
///   (warning).
/// * `right_hand` floats about 0.112 m away from `right_lower` (gap at
///   joint `right_wrist`).
pub fn scenario_robot() -> RobotDescription {
    RobotDescription::new("scenario")
        .with_link(box_link("base", [0.4, 0.4, 0.1], [0.0; 3]))
        .with_link(child_box(
            "left_upper",
            "base",
            [-0.1, 0.0, 0.05],
            [0.05, 0.05, 0.2],
            [0.0, 0.0, 0.1],
        ))
        .with_link(child_box(
            "right_upper",
            "base",
            [0.1, 0.0, 0.05],
            [0.05, 0.05, 0.15],
            [0.0, 0.0, 0.075],
        ))
        .with_link(child_box(
            "left_lower",
            "left_upper",
            [0.0, 0.0, 0.2],
            [0.3, 0.05, 0.05],
            [0.05, 0.0, 0.025],
        ))
        .with_link(child_box(
            "right_lower",
            "right_upper",
            [0.0, 0.0, 0.15],
            [0.1, 0.05, 0.1],
            [-0.05, 0.0, 0.05],
        ))
        .with_link(child_box(
            "left_hand",
            "left_lower",
            [-0.075, 0.0, 0.0],
            [0.05, 0.05, 0.205],
            [0.0, 0.0, -0.1025],
        ))
        .with_link(child_box(
            "right_hand",
            "right_lower",
            [0.075, 0.0, 0.225],
            [0.05, 0.05, 0.05],
            [0.0; 3],
        ))
        .with_joint(revolute("left_shoulder", "left_upper", [0.0, 1.0, 0.0]))
        .with_joint(revolute("right_shoulder", "right_upper", [0.0, 1.0, 0.0]))
        .with_joint(revolute("left_elbow", "left_lower", [0.0, 1.0, 0.0]))
        .with_joint(revolute("right_elbow", "right_lower", [0.0, 1.0, 0.0]))
        .with_joint(fixed("left_wrist", "left_hand"))
        .with_joint(fixed("right_wrist", "right_hand"))
}

/// A vertical arm that can fold its hand into its base.
///
/// `shoulder` spins the whole arm about z (harmless); `elbow` bends about y
/// over 0..180 degrees. The hand is three levels below the base, so the
/// pair is not exempt: it collides from about 150 degrees on.
pub fn folding_arm() -> RobotDescription {
    RobotDescription::new("folding_arm")
        .with_link(box_link("base", [0.4, 0.4, 0.1], [0.0; 3]))
        .with_link(child_box(
            "upper",
            "base",
            [0.0, 0.0, 0.05],
            [0.05, 0.05, 0.5],
            [0.0, 0.0, 0.25],
        ))
        .with_link(child_box(
            "forearm",
            "upper",
            [0.0, 0.0, 0.5],
            [0.05, 0.05, 0.45],
            [0.0, 0.0, 0.225],
        ))
        .with_link(child_box(
            "hand",
            "forearm",
            [0.0, 0.0, 0.45],
            [0.1, 0.1, 0.1],
            [0.0, 0.0, 0.05],
        ))
        .with_joint(revolute("shoulder", "upper", [0.0, 0.0, 1.0]))
        .with_joint(
            JointDescription::new("elbow", JointKind::Revolute, "forearm")
                .with_axis(Vector3::y())
                .with_limits(0.0, 180.0),
        )
        .with_joint(fixed("wrist", "hand"))
}
