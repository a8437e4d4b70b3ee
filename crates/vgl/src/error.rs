use crate::types::RendererType;

/// Errors surfaced by context and backend setup.
///
/// Everything after setup follows the log-and-continue model: invalid handles,
/// rejected creations and skipped draws are logged, never returned.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0:?} renderer is not implemented")]
    UnsupportedRenderer(RendererType),

    #[error("the OpenGL renderer needs a loaded GL context in `PlatformData::gl`")]
    MissingGlContext,

    #[error("the OpenGL renderer was requested but the `opengl` feature is disabled")]
    OpenGlDisabled,

    #[error("{renderer} backend failed to initialize")]
    BackendInit {
        renderer: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
