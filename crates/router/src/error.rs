#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("command handler failed: {0}")]
    Handler(String),

    #[error("outbound gateway call failed: {0}")]
    Gateway(String),

    #[error("no gateway configured for this dispatch")]
    NoGateway,
}

pub type Result<T> = std::result::Result<T, Error>;

impl signalrt_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Handler(message)
    }
}

signalrt_common::impl_context!();
