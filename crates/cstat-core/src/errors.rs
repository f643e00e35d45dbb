/// Core error type for the bot.
///
/// Adapter crates map their specific errors into this type so the router can
/// treat every failure the same way (user-facing message, never a crash).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    /// The status table could not be read (transport, auth, malformed payload).
    #[error("connection error: {0}")]
    Connection(String),

    #[error("external error: {0}")]
    External(String),
}

impl Error {
    /// Short cause fragment suitable for showing to a chat user.
    pub fn user_cause(&self) -> String {
        match self {
            Error::Config(cause) | Error::Connection(cause) | Error::External(cause) => {
                cause.clone()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_error_display() {
        let err = Error::Connection("sheet unreachable".into());
        assert_eq!(err.to_string(), "connection error: sheet unreachable");
        assert_eq!(err.user_cause(), "sheet unreachable");
    }

    #[test]
    fn user_cause_drops_category_prefix() {
        let err = Error::External("telegram error: Forbidden".into());
        assert_eq!(err.to_string(), "external error: telegram error: Forbidden");
        assert_eq!(err.user_cause(), "telegram error: Forbidden");
    }
}
