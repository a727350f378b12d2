//! # AsyncState
//!
//! Tagged state published on every observable channel of the crate (cart snapshot,
//! add-to-cart result, order placement, product listings).

use std::fmt::Display;

/// Progress of an asynchronous operation as seen by an observer.
///
/// Channels start in `Unspecified` (nothing requested yet) or `Loading`, and move to
/// `Success` or `Error` when the operation settles. An `Error` carries a readable message
/// and never ends the channel: a later `Success` can follow it.
#[derive(Debug, Clone, PartialEq)]
pub enum AsyncState<T> {
    Unspecified,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for AsyncState<T> {
    fn default() -> Self {
        AsyncState::Unspecified
    }
}

impl<T> AsyncState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, AsyncState::Loading)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AsyncState::Success(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, AsyncState::Error(_))
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            AsyncState::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AsyncState::Error(message) => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> AsyncState<U> {
        match self {
            AsyncState::Unspecified => AsyncState::Unspecified,
            AsyncState::Loading => AsyncState::Loading,
            AsyncState::Success(value) => AsyncState::Success(f(value)),
            AsyncState::Error(message) => AsyncState::Error(message),
        }
    }
}

impl<T, E: Display> From<Result<T, E>> for AsyncState<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => AsyncState::Success(value),
            Err(e) => AsyncState::Error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_conversion_keeps_error_message() {
        let state: AsyncState<u32> = Err::<u32, _>("store unavailable").into();
        assert_eq!(state.error(), Some("store unavailable"));
        assert!(AsyncState::from(Ok::<_, String>(3)).is_success());
    }

    #[test]
    fn map_preserves_tag() {
        assert_eq!(AsyncState::Success(2).map(|n| n * 2), AsyncState::Success(4));
        assert_eq!(AsyncState::<u32>::Loading.map(|n| n * 2), AsyncState::Loading);
        assert_eq!(AsyncState::<u32>::default(), AsyncState::Unspecified);
    }
}
