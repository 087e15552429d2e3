use thiserror::Error;

#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("unknown celestial body '{0}' (supported: Sun, Moon)")]
    UnknownBody(String),
}
