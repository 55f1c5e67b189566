//! Errors raised while setting up the window and GPU resources.

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("SDL error: {0}")]
    Sdl(String),

    #[error("Failed to create window: {0}")]
    Window(#[from] sdl2::video::WindowBuildError),

    #[error("OpenGL error: {0}")]
    Gl(String),

    #[error("Failed to build {name} shader: {log}")]
    Shader { name: &'static str, log: String },

    #[error("Logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),
}
