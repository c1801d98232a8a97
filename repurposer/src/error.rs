use thiserror::Error;

/// Failures a caller of the repurposing pipeline can observe.
///
/// Malformed model output is deliberately absent: it is absorbed into
/// fallback content by the generator and never reaches this type.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Page unreachable or answered with a non-success status.
    #[error("Failed to extract content from URL: {0:#}")]
    Fetch(anyhow::Error),

    /// Page fetched but no usable article text was found.
    #[error("Could not extract sufficient content from the URL")]
    Extraction { length: usize },

    /// Model API unreachable or rejected the request.
    #[error("Model API error: {0:#}")]
    Generation(anyhow::Error),
}

impl PipelineError {
    /// HTTP status code the server answers with for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            PipelineError::MissingUrl
            | PipelineError::InvalidUrl(_)
            | PipelineError::Extraction { .. } => 400,
            PipelineError::Fetch(_) | PipelineError::Generation(_) => 502,
        }
    }
}
