use wolfram_ca_automaton::AutomatonError;

/// Convenience result type used across the renderer.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Rejected rule, row, pattern, policy or size.
    #[error(transparent)]
    Automaton(#[from] AutomatonError),

    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl Error {
    /// Build an [`AutomatonError::InvalidArgument`] wrapped in [`Error::Automaton`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::Automaton(AutomatonError::invalid_argument(msg))
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::Automaton(AutomatonError::InvalidArgument(_)))
    }
}
