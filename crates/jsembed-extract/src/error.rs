use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Language is not an embedding host: {0:?}")]
    UnsupportedLanguage(crate::Language),
}
