use thiserror::Error;

use crate::rendering::shader::ShaderStage;

/// Every failure in the viewer is fatal: the caller logs the diagnostic and
/// exits. There is no retry or degraded-mode path.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Window, event loop or GL context/surface creation failed.
    #[error("initialization failed: {0}")]
    Initialization(String),

    /// A shader stage failed to compile; `log` is the driver's info log.
    #[error("{stage} shader compilation failed: {log}")]
    Shader { stage: ShaderStage, log: String },

    /// Program linking failed after both stages compiled.
    #[error("shader program link failed: {log}")]
    ShaderLink { log: String },

    /// A mesh or shader file is missing or unparsable, or mesh data violates
    /// an invariant (index out of range, normal count mismatch).
    #[error("resource error: {0}")]
    Resource(String),

    /// Presenting a rendered frame failed (buffer swap on a live surface).
    #[error("frame presentation failed: {0}")]
    Present(String),

    /// Config file or command line argument problem.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Degenerate camera parameters (e.g. position coincides with target).
    #[error("invalid camera: {0}")]
    Camera(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn present_failures_are_reported_as_presentation_not_initialization() {
        let message = ViewerError::Present("context lost".into()).to_string();
        assert!(message.contains("frame presentation failed"));
        assert!(!message.contains("initialization"));
    }
}
