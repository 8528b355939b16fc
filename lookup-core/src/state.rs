use crate::{
    error::{ErrorKind, LookupError},
    model::WeatherReport,
};

/// User-facing description of a failed lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&LookupError> for Failure {
    fn from(err: &LookupError) -> Self {
        Self { kind: err.kind(), message: err.user_message().to_string() }
    }
}

/// State of the most recent lookup attempt. Exactly one variant holds at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LookupState {
    #[default]
    Idle,
    Loading,
    Success(WeatherReport),
    Failed(Failure),
}

/// Inputs to [`LookupState::transition`].
#[derive(Debug, Clone)]
pub enum Event<'a> {
    Submitted(&'a str),
    Resolved(WeatherReport),
    Rejected(Failure),
    Cancelled,
}

impl LookupState {
    /// Pure transition function; the state machine never mutates state any other way.
    pub fn transition(self, event: Event<'_>) -> LookupState {
        match event {
            Event::Submitted(query) if query.trim().is_empty() => {
                LookupState::Failed(Failure::from(&LookupError::EmptyQuery))
            }
            Event::Submitted(_) => LookupState::Loading,
            Event::Resolved(report) => LookupState::Success(report),
            Event::Rejected(failure) => LookupState::Failed(failure),
            Event::Cancelled => match self {
                LookupState::Loading => LookupState::Idle,
                other => other,
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LookupState::Loading)
    }

    /// True once an attempt has resolved either way.
    pub fn is_settled(&self) -> bool {
        matches!(self, LookupState::Success(_) | LookupState::Failed(_))
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        match self {
            LookupState::Success(report) => Some(report),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            LookupState::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        self.failure().map(|f| f.message.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::MockSource;

    fn london() -> WeatherReport {
        MockSource::new().report("London").cloned().expect("london is seeded")
    }

    #[test]
    fn blank_submission_fails_validation() {
        for query in ["", "   ", "\t\n"] {
            let next = LookupState::Idle.transition(Event::Submitted(query));
            let failure = next.failure().expect("blank query must fail");
            assert_eq!(failure.kind, ErrorKind::Validation);
            assert_eq!(failure.message, "Please enter a city name");
        }
    }

    #[test]
    fn loading_clears_previous_failure() {
        let failed = LookupState::Failed(Failure::from(&LookupError::UnknownCity));
        let next = failed.transition(Event::Submitted("Paris"));
        assert_eq!(next, LookupState::Loading);
        assert!(next.error_message().is_none());
    }

    #[test]
    fn loading_hides_previous_report() {
        let success = LookupState::Success(london());
        let next = success.transition(Event::Submitted("Tokyo"));
        assert!(next.report().is_none());
    }

    #[test]
    fn failure_clears_previous_report() {
        let next = LookupState::Success(london())
            .transition(Event::Rejected(Failure::from(&LookupError::UnknownCity)));
        assert!(next.report().is_none());
        assert_eq!(
            next.error_message(),
            Some("City not found. Try: London, Tokyo, New York, Paris, Mumbai, or Sydney")
        );
    }

    #[test]
    fn cancel_only_affects_loading() {
        assert_eq!(LookupState::Loading.transition(Event::Cancelled), LookupState::Idle);

        let success = LookupState::Success(london());
        assert_eq!(success.clone().transition(Event::Cancelled), success);
    }

    #[test]
    fn settled_states() {
        assert!(!LookupState::Idle.is_settled());
        assert!(!LookupState::Loading.is_settled());
        assert!(LookupState::Success(london()).is_settled());
        assert!(LookupState::Idle.transition(Event::Submitted("")).is_settled());
    }
}
