//! Point-in-time validation report and its plain-text rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defect::{Defect, DefectCounts};
use crate::time::Timestamp;
use crate::types::JointSetting;

/// Snapshot of the most recent pass plus the joint configuration it ran on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub robot_name: String,
    pub generated_at: Timestamp,
    /// Index of the pass the defects came from; `None` if no pass has run.
    pub pass_index: Option<u64>,
    pub error_count: usize,
    pub warning_count: usize,
    pub info_count: usize,
    pub defects: Vec<Defect>,
    pub joints: Vec<JointSetting>,
}

impl ValidationReport {
    pub fn new(
        robot_name: impl Into<String>,
        generated_at: Timestamp,
        pass_index: Option<u64>,
        defects: Vec<Defect>,
        joints: Vec<JointSetting>,
    ) -> Self {
        let counts = DefectCounts::tally(&defects);
        Self {
            robot_name: robot_name.into(),
            generated_at,
            pass_index,
            error_count: counts.errors,
            warning_count: counts.warnings,
            info_count: counts.infos,
            defects,
            joints,
        }
    }

    pub const fn counts(&self) -> DefectCounts {
        DefectCounts {
            errors: self.error_count,
            warnings: self.warning_count,
            infos: self.info_count,
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Robot Validation Report ===")?;
        writeln!(f, "Robot: {}", self.robot_name)?;
        writeln!(f, "Generated at: {}", self.generated_at)?;
        match self.pass_index {
            Some(index) => writeln!(f, "Pass: #{index}")?,
            None => writeln!(f, "Pass: none")?,
        }
        writeln!(f, "Errors: {}", self.error_count)?;
        writeln!(f, "Warnings: {}", self.warning_count)?;
        if self.info_count > 0 {
            writeln!(f, "Info: {}", self.info_count)?;
        }
        writeln!(f)?;

        writeln!(f, "--- Defects ---")?;
        if self.defects.is_empty() {
            writeln!(f, "  (none)")?;
        }
        for defect in &self.defects {
            writeln!(f, "  {defect}")?;
            if !defect.affected.is_empty() {
                let names: Vec<&str> = defect.affected.iter().map(|p| p.name.as_str()).collect();
                writeln!(f, "      parts: {}", names.join(", "))?;
            }
            if let (Some(joint), Some(angle)) = (&defect.joint_name, defect.joint_angle) {
                writeln!(f, "      joint: {joint} @ {angle:.2}")?;
            }
            if defect.penetration_depth > 0.0 {
                writeln!(f, "      penetration: {:.4} m", defect.penetration_depth)?;
            }
            if defect.separation > 0.0 {
                writeln!(f, "      separation: {:.4} m", defect.separation)?;
            }
        }
        writeln!(f)?;

        writeln!(f, "--- Joint Configuration ---")?;
        if self.joints.is_empty() {
            writeln!(f, "  (no joints)")?;
        }
        for joint in &self.joints {
            writeln!(f, "  {}: {:.2}", joint.name, joint.angle)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defect::{DefectKind, Severity};
    use crate::types::{PartId, PartRef};

    fn sample() -> ValidationReport {
        let defects = vec![
            Defect::new(
                DefectKind::SelfCollision,
                Severity::Error,
                "Self-collision between 'gripper' and 'base'",
            )
            .with_parts(
                PartRef::new(PartId(4), "gripper"),
                PartRef::new(PartId(0), "base"),
            )
            .with_penetration(0.025),
            Defect::new(DefectKind::GeometryGap, Severity::Warning, "Gap at 'elbow'")
                .with_joint("elbow", 30.0)
                .with_separation(0.05),
        ];
        let joints = vec![
            JointSetting {
                name: "shoulder".into(),
                angle: 0.0,
            },
            JointSetting {
                name: "elbow".into(),
                angle: 30.0,
            },
        ];
        ValidationReport::new("arm", Timestamp::from_secs(2.0), Some(3), defects, joints)
    }

    #[test]
    fn counts_are_tallied_on_construction() {
        let report = sample();
        assert_eq!(report.error_count, 1);
        assert_eq!(report.warning_count, 1);
        assert_eq!(report.info_count, 0);
        assert_eq!(report.counts().total(), 2);
    }

    #[test]
    fn text_contains_header_defects_and_joints() {
        let text = sample().to_string();
        assert!(text.starts_with("=== Robot Validation Report ==="));
        assert!(text.contains("Robot: arm"));
        assert!(text.contains("Pass: #3"));
        assert!(text.contains("Errors: 1"));
        assert!(text.contains("[ERROR] SelfCollision"));
        assert!(text.contains("parts: gripper, base"));
        assert!(text.contains("penetration: 0.0250 m"));
        assert!(text.contains("joint: elbow @ 30.00"));
        assert!(text.contains("separation: 0.0500 m"));
        assert!(text.contains("shoulder: 0.00"));
    }

    #[test]
    fn empty_report_renders_placeholders() {
        let report = ValidationReport::new("empty", Timestamp::ZERO, None, vec![], vec![]);
        let text = report.to_string();
        assert!(text.contains("Pass: none"));
        assert!(text.contains("(none)"));
        assert!(text.contains("(no joints)"));
        assert!(!text.contains("Info:"));
    }

    #[test]
    fn report_serializes_to_json_fields() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["robot_name"], "arm");
        assert_eq!(value["defects"][0]["kind"], "SelfCollision");
        assert_eq!(value["joints"][1]["name"], "elbow");
    }
}
