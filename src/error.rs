//! Error types for loading and pipeline staging
//!
//! Nothing in the per-pixel path returns an error. Degenerate triangles,
//! near-zero edges and off-screen spans are skipped with guarded arithmetic.
//! The variants here cover the layers around the core: configuration and
//! scene files (rejected before the first frame) and calling a pipeline
//! stage on a render list that is in the wrong coordinate space.

use thiserror::Error;

use crate::pipeline::CoordSpace;

/// Errors raised by loaders and pipeline stages.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A face references a vertex outside its mesh's vertex pool.
    #[error("Object '{object}' face {face}: vertex index {index} out of range ({vertex_count} vertices)")]
    InvalidMesh {
        object: String,
        face: usize,
        index: usize,
        vertex_count: usize,
    },

    /// A face references a texture slot the scene does not load.
    #[error("Object '{object}' face {face}: texture slot {texture} out of range ({loaded} loaded)")]
    InvalidTexture {
        object: String,
        face: usize,
        texture: usize,
        loaded: usize,
    },

    #[error("Invalid bitmap: {0}")]
    InvalidBitmap(String),

    /// A pipeline stage was run on a list that is not in the space it consumes.
    #[error("Stage '{stage}' expects {expected:?} coordinates, render list is in {found:?}")]
    StageOrder {
        stage: &'static str,
        expected: CoordSpace,
        found: CoordSpace,
    },
}

/// Result alias used throughout the crate.
pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::InvalidMesh {
            object: "cube".to_string(),
            face: 3,
            index: 42,
            vertex_count: 8,
        };
        let msg = err.to_string();
        assert!(msg.contains("cube"));
        assert!(msg.contains("42"));

        let err = RenderError::StageOrder {
            stage: "project",
            expected: CoordSpace::Camera,
            found: CoordSpace::World,
        };
        assert!(err.to_string().contains("project"));
        assert!(err.to_string().contains("Camera"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RenderError>();
    }
}
