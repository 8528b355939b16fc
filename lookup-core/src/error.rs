use std::time::Duration;

use thiserror::Error;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a city name";

pub const UNKNOWN_CITY_MESSAGE: &str =
    "City not found. Try: London, Tokyo, New York, Paris, Mumbai, or Sydney";

pub const LIVE_FAILURE_MESSAGE: &str = "City not found. Please check the spelling and try again.";

/// Coarse failure class carried by a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Transport,
}

/// Why a single lookup attempt failed.
///
/// `Display` is diagnostic and meant for logs. What the user sees comes from
/// [`LookupError::user_message`], which deliberately folds every live-source
/// failure into one sentence.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("city is not in the mock table")]
    UnknownCity,

    #[error("weather endpoint answered with status {status}")]
    NotFound { status: u16 },

    #[error("request to weather endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("weather endpoint did not answer within {0:?}")]
    Timeout(Duration),

    #[error("weather endpoint returned a malformed body: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl LookupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LookupError::EmptyQuery => ErrorKind::Validation,
            LookupError::UnknownCity | LookupError::NotFound { .. } => ErrorKind::NotFound,
            LookupError::Transport(_) | LookupError::Timeout(_) | LookupError::Malformed(_) => {
                ErrorKind::Transport
            }
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            LookupError::EmptyQuery => EMPTY_QUERY_MESSAGE,
            LookupError::UnknownCity => UNKNOWN_CITY_MESSAGE,
            LookupError::NotFound { .. }
            | LookupError::Transport(_)
            | LookupError::Timeout(_)
            | LookupError::Malformed(_) => LIVE_FAILURE_MESSAGE,
        }
    }
}

/// A submission refused before it reached the state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("a lookup is already in flight")]
    InFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn live_failures_share_one_message() {
        let not_found = LookupError::NotFound { status: 404 };
        let server = LookupError::NotFound { status: 500 };
        let timeout = LookupError::Timeout(Duration::from_secs(10));
        let malformed =
            LookupError::from(serde_json::from_str::<u8>("nope").unwrap_err());

        for err in [&not_found, &server, &timeout, &malformed] {
            assert_eq!(err.user_message(), LIVE_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn kinds_split_not_found_from_transport() {
        assert_eq!(LookupError::EmptyQuery.kind(), ErrorKind::Validation);
        assert_eq!(LookupError::UnknownCity.kind(), ErrorKind::NotFound);
        assert_eq!(LookupError::NotFound { status: 404 }.kind(), ErrorKind::NotFound);
        assert_eq!(
            LookupError::Timeout(Duration::from_millis(5)).kind(),
            ErrorKind::Transport
        );
    }

    #[test]
    fn diagnostic_display_keeps_detail() {
        let err = LookupError::NotFound { status: 503 };
        assert!(err.to_string().contains("503"));
    }
}
