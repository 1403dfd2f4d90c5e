//! URDF-backed structure source.

use std::path::{Path, PathBuf};

use tracing::debug;

use rigcheck_model::{RobotDescription, SourceError, StructureSource};

use crate::convert::to_description_with;
use crate::error::UrdfError;
use crate::mesh::MeshLoader;
use crate::parser::{parse_file, parse_string};

#[derive(Debug, Clone)]
enum Location {
    File(PathBuf),
    Inline(String),
}

/// Reads a robot from a URDF file or string.
///
/// A file that does not exist yet is reported as "not available", so
/// discovery keeps polling until it appears or times out. Any other read,
/// parse or conversion failure is a source error.
///
/// Relative mesh paths resolve against the URDF file's directory, or the
/// mesh directory given to an inline source.
#[derive(Debug, Clone)]
pub struct UrdfSource {
    name: String,
    location: Location,
    mesh_dir: Option<PathBuf>,
}

impl UrdfSource {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        Self {
            name: path.display().to_string(),
            mesh_dir: path.parent().map(Path::to_path_buf),
            location: Location::File(path),
        }
    }

    pub fn from_xml(xml: impl Into<String>) -> Self {
        Self {
            name: "inline urdf".into(),
            location: Location::Inline(xml.into()),
            mesh_dir: None,
        }
    }

    /// Directory relative mesh paths resolve against.
    #[must_use]
    pub fn with_mesh_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.mesh_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Parses and converts immediately, bypassing discovery.
    pub fn load(&self) -> Result<RobotDescription, UrdfError> {
        let robot = match &self.location {
            Location::File(path) => parse_file(path)?,
            Location::Inline(xml) => parse_string(xml)?,
        };
        to_description_with(&robot, &mut MeshLoader::new(self.mesh_dir.as_deref()))
    }
}

impl StructureSource for UrdfSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate(&mut self) -> Result<Option<RobotDescription>, SourceError> {
        if let Location::File(path) = &self.location {
            if !path.exists() {
                debug!(path = %path.display(), "urdf file not present yet");
                return Ok(None);
            }
        }
        self.load()
            .map(Some)
            .map_err(|e| SourceError::new(self.name.clone(), e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
