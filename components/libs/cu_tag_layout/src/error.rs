use cu29::CuError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TagLayoutError {
    #[error("Invalid tag layout configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not parse tag layout configuration: {0}")]
    ConfigParse(String),
}

pub type TagLayoutResult<T> = Result<T, TagLayoutError>;

impl From<TagLayoutError> for CuError {
    fn from(err: TagLayoutError) -> Self {
        CuError::from(err.to_string())
    }
}
