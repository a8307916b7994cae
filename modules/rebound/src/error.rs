use std::convert::Infallible;

use thiserror::Error;

use crate::shape::Shape;

/// Payload bytes could not be turned into the handler's input type.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload must be a JSON object (got: {found})")]
    NotAnObject { found: &'static str },

    /// Failure reported by a caller-supplied decoder.
    #[error("{0}")]
    Other(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl DecodeError {
    pub fn other(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        DecodeError::Other(err.into())
    }
}

/// A handler's input type is not shaped like a plain record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rebound: handler input parameter should be a struct (got: {found} for {input_type})")]
    InputNotRecord {
        input_type: &'static str,
        found: Shape,
    },
}

/// Returned by `Rebound::try_react_to`. `react_to` turns these into a panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("rebound: event name is empty")]
    EmptyName,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("rebound: event {event_name:?} already has a handler")]
    Duplicate { event_name: String },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubjectError {
    #[error("rebound: subject {subject:?} does not start with {prefix:?}")]
    MissingPrefix { subject: String, prefix: String },

    #[error("rebound: subject {subject:?} has no event name after the prefix")]
    Empty { subject: String },

    #[error("rebound: subject {subject:?} has no segment at index {index}")]
    MissingSegment { subject: String, index: usize },
}

/// Everything `Rebound::dispatch` can fail with.
///
/// `Handler` holds the handler's own error untouched: it displays exactly as
/// the original, is the `source()` of the dispatch error, and
/// `into_handler_error` hands the original value back.
///
/// `DispatchError<E>` is a `std::error::Error` when `E` is one. The default
/// `anyhow::Error` is not, so use [`DispatchError::into_anyhow`] there.
#[derive(Error, Debug)]
pub enum DispatchError<E> {
    #[error("rebound: event name is empty")]
    EmptyName,

    #[error("rebound: no handler for event {event_name:?}")]
    NoHandler { event_name: String },

    #[error("rebound: failed to decode {event_name:?} event data: {source}")]
    Decode {
        event_name: String,
        source: DecodeError,
    },

    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error("{0}")]
    Handler(#[source] E),
}

impl<E> DispatchError<E> {
    /// True when nothing is registered for the event, the usual signal to
    /// route the message to a dead-letter path.
    pub fn is_no_handler(&self) -> bool {
        matches!(self, DispatchError::NoHandler { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, DispatchError::Decode { .. })
    }

    /// The event name this failure is about, when there is one.
    pub fn event_name(&self) -> Option<&str> {
        match self {
            DispatchError::NoHandler { event_name } | DispatchError::Decode { event_name, .. } => {
                Some(event_name)
            }
            _ => None,
        }
    }

    pub fn handler_error(&self) -> Option<&E> {
        match self {
            DispatchError::Handler(err) => Some(err),
            _ => None,
        }
    }

    pub fn into_handler_error(self) -> Option<E> {
        match self {
            DispatchError::Handler(err) => Some(err),
            _ => None,
        }
    }
}

impl DispatchError<anyhow::Error> {
    /// Flatten into an `anyhow::Error`. A handler failure becomes the
    /// handler's error itself, so `downcast_ref` finds its concrete type;
    /// every other failure becomes a `DispatchError<Infallible>`.
    pub fn into_anyhow(self) -> anyhow::Error {
        let err: DispatchError<Infallible> = match self {
            DispatchError::Handler(err) => return err,
            DispatchError::EmptyName => DispatchError::EmptyName,
            DispatchError::NoHandler { event_name } => DispatchError::NoHandler { event_name },
            DispatchError::Decode { event_name, source } => {
                DispatchError::Decode { event_name, source }
            }
            DispatchError::Subject(err) => DispatchError::Subject(err),
        };
        anyhow::Error::new(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[derive(Debug, PartialEq)]
    struct OutOfStock;

    impl std::fmt::Display for OutOfStock {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("out of stock")
        }
    }

    impl std::error::Error for OutOfStock {}

    #[test]
    fn handler_error_displays_as_the_original() {
        let err: DispatchError<OutOfStock> = DispatchError::Handler(OutOfStock);
        assert_eq!(err.to_string(), "out of stock");
        assert_eq!(err.handler_error(), Some(&OutOfStock));
        assert_eq!(err.into_handler_error(), Some(OutOfStock));
    }

    #[test]
    fn handler_error_is_the_source() {
        let err: DispatchError<OutOfStock> = DispatchError::Handler(OutOfStock);
        let source = err.source().expect("handler error as source");
        assert_eq!(source.downcast_ref::<OutOfStock>(), Some(&OutOfStock));
    }

    #[test]
    fn into_anyhow_unwraps_handler_errors() {
        let err: DispatchError<anyhow::Error> = DispatchError::Handler(OutOfStock.into());
        assert_eq!(err.into_anyhow().downcast_ref::<OutOfStock>(), Some(&OutOfStock));

        let err: DispatchError<anyhow::Error> = DispatchError::NoHandler {
            event_name: "order.shipped".into(),
        };
        let flattened = err.into_anyhow();
        assert!(flattened
            .downcast_ref::<DispatchError<Infallible>>()
            .is_some_and(|err| err.is_no_handler()));
        assert_eq!(
            flattened.to_string(),
            r#"rebound: no handler for event "order.shipped""#
        );
    }

    #[test]
    fn no_handler_message_quotes_the_event_name() {
        let err: DispatchError<OutOfStock> = DispatchError::NoHandler {
            event_name: "order.completed".into(),
        };
        assert_eq!(
            err.to_string(),
            r#"rebound: no handler for event "order.completed""#
        );
        assert!(err.is_no_handler());
        assert_eq!(err.event_name(), Some("order.completed"));
    }

    #[test]
    fn decode_error_keeps_its_source() {
        let json_err = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err: DispatchError<OutOfStock> = DispatchError::Decode {
            event_name: "order.completed".into(),
            source: DecodeError::Json(json_err),
        };
        assert!(err.is_decode());
        assert!(err.source().is_some());
        assert!(err
            .to_string()
            .starts_with(r#"rebound: failed to decode "order.completed" event data"#));
    }

    #[test]
    fn registration_error_wraps_validation_transparently() {
        let validation = ValidationError::InputNotRecord {
            input_type: "alloc::string::String",
            found: Shape::Primitive("string"),
        };
        let err = RegistrationError::from(validation.clone());
        assert_eq!(err.to_string(), validation.to_string());
    }
}
