use atelia_common::FromMessage;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The call never produced a usable response (connect, timeout, decode).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered, but outside its own envelope contract.
    #[error("unexpected backend response: {0}")]
    Protocol(String),
}

impl FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Protocol(message)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

atelia_common::impl_context!();
