/// Errors from compositor setup and backend operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RenderError {
    #[error("{axis} scale factor {value} outside (0.1, 1.0]")]
    ScaleOutOfRange { axis: &'static str, value: f32 },
    #[error("shader not found: {0}")]
    ShaderNotFound(String),
    #[error("backend error: {0}")]
    Backend(String),
}
