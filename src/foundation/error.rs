pub type SlidecastResult<T> = Result<T, SlidecastError>;

#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("generation error: {0}")]
    Generation(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error("insufficient credits: need {required}, have {available}")]
    InsufficientCredits { required: u32, available: u32 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn generation(msg: impl Into<String>) -> Self {
        Self::Generation(msg.into())
    }

    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
