//! The handler registry and dispatch pipeline.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::decoder::{Decoder, JsonDecoder};
use crate::error::{DispatchError, RegistrationError};
use crate::handler::{HandlerDescriptor, TypedHandler};
use crate::shape::{validate_input, Shape};
use crate::subject::SubjectMapper;

/// Event name → handler registry.
///
/// Registration needs `&mut self` and dispatch needs `&self`, so once
/// setup is done the registry can be shared (e.g. in an `Arc`) and
/// dispatched from several threads. Registering while other threads
/// dispatch requires an external lock chosen by the owner.
///
/// `E` is the error type handlers return and `D` the payload decoder.
pub struct Rebound<E = anyhow::Error, D = JsonDecoder> {
    handlers: HashMap<String, HandlerDescriptor<E, D>>,
    decoder: D,
}

impl<E> Rebound<E, JsonDecoder> {
    pub fn new() -> Self {
        Self::with_decoder(JsonDecoder::new())
    }
}

impl<E> Default for Rebound<E, JsonDecoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, D: Decoder> Rebound<E, D> {
    pub fn with_decoder(decoder: D) -> Self {
        Self {
            handlers: HashMap::new(),
            decoder,
        }
    }

    /// Replace the decoder, returning the previous one. Handlers already
    /// registered use the new decoder from the next dispatch on.
    pub fn set_decoder(&mut self, decoder: D) -> D {
        std::mem::replace(&mut self.decoder, decoder)
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Register `handler` for `event_name`.
    ///
    /// # Panics
    ///
    /// On an empty event name, a handler whose input is not a struct, or a
    /// second registration for the same name. These are wiring bugs; use
    /// [`Rebound::try_react_to`] to get them as values.
    pub fn react_to<T, F>(&mut self, event_name: impl Into<String>, handler: F)
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<(), E> + Send + Sync + 'static,
        E: 'static,
        D: 'static,
    {
        if let Err(err) = self.try_react_to(event_name, handler) {
            panic!("{err}");
        }
    }

    /// Like [`Rebound::react_to`], but reports failures instead of panicking.
    /// The registry is left unchanged on error.
    pub fn try_react_to<T, F>(
        &mut self,
        event_name: impl Into<String>,
        handler: F,
    ) -> Result<(), RegistrationError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> Result<(), E> + Send + Sync + 'static,
        E: 'static,
        D: 'static,
    {
        let event_name = event_name.into();
        if event_name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }

        let shape = validate_input::<T>()?;

        if self.handlers.contains_key(&event_name) {
            return Err(RegistrationError::Duplicate { event_name });
        }

        let input_type = std::any::type_name::<T>();
        debug!(event_name = %event_name, input_type, "Registered event handler");

        self.handlers.insert(
            event_name,
            HandlerDescriptor {
                input_type,
                shape,
                handler: Box::new(TypedHandler::<T, F>::new(handler)),
            },
        );
        Ok(())
    }

    /// Decode `payload` for the handler registered under `event_name` and
    /// invoke it once.
    ///
    /// The payload must decode into a complete value: with the JSON decoder,
    /// `{}` or `null` for a struct with required fields is a
    /// `DispatchError::Decode`, not a zero-valued input. Fields marked
    /// `#[serde(default)]` (or a struct-level `#[serde(default)]`) may be
    /// omitted.
    ///
    /// A handler failure comes back as `DispatchError::Handler` holding the
    /// handler's own error value.
    pub fn dispatch(&self, event_name: &str, payload: &[u8]) -> Result<(), DispatchError<E>> {
        if event_name.is_empty() {
            return Err(DispatchError::EmptyName);
        }

        let Some(descriptor) = self.handlers.get(event_name) else {
            debug!(event_name, "No handler for event");
            return Err(DispatchError::NoHandler {
                event_name: event_name.to_string(),
            });
        };

        let result = descriptor
            .handler
            .handle_raw(event_name, payload, &self.decoder);

        match &result {
            Ok(()) => debug!(
                event_name,
                input_type = descriptor.input_type,
                payload_len = payload.len(),
                "Dispatched event"
            ),
            Err(DispatchError::Decode { source, .. }) => warn!(
                event_name,
                input_type = descriptor.input_type,
                decoder = self.decoder.name(),
                error = %source,
                "Failed to decode event payload"
            ),
            Err(_) => debug!(event_name, "Event handler returned an error"),
        }

        result
    }

    /// Map a broker subject to an event name, then dispatch.
    pub fn dispatch_subject(
        &self,
        mapper: &SubjectMapper,
        subject: &str,
        payload: &[u8],
    ) -> Result<(), DispatchError<E>> {
        let event_name = mapper.event_name(subject)?;
        self.dispatch(&event_name, payload)
    }
}

impl<E, D> Rebound<E, D> {
    pub fn contains(&self, event_name: &str) -> bool {
        self.handlers.contains_key(event_name)
    }

    /// Registered event names, sorted.
    pub fn event_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Type name of the input the handler for `event_name` expects.
    pub fn handler_type(&self, event_name: &str) -> Option<&'static str> {
        self.handlers.get(event_name).map(|d| d.input_type)
    }

    pub fn handler_shape(&self, event_name: &str) -> Option<Shape> {
        self.handlers.get(event_name).map(|d| d.shape)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E, D: Decoder> fmt::Debug for Rebound<E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rebound")
            .field("events", &self.event_names())
            .field("decoder", &self.decoder.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct OrderPlaced {
        order_id: String,
    }

    #[test]
    fn starts_empty() {
        let rb: Rebound = Rebound::new();
        assert!(rb.is_empty());
        assert_eq!(rb.len(), 0);
        assert!(rb.event_names().is_empty());
    }

    #[test]
    fn introspection_reports_registered_handlers() {
        let mut rb: Rebound = Rebound::new();
        rb.react_to("order.placed", |_: OrderPlaced| Ok(()));
        rb.react_to("order.cancelled", |_: OrderPlaced| Ok(()));

        assert_eq!(rb.len(), 2);
        assert!(rb.contains("order.placed"));
        assert!(!rb.contains("order.shipped"));
        assert_eq!(rb.event_names(), vec!["order.cancelled", "order.placed"]);
        assert!(rb
            .handler_type("order.placed")
            .is_some_and(|name| name.ends_with("OrderPlaced")));
        assert_eq!(
            rb.handler_shape("order.placed"),
            Some(Shape::Record {
                name: "OrderPlaced",
                fields: &["order_id"],
            })
        );
        assert_eq!(rb.handler_shape("order.shipped"), None);
    }

    #[test]
    fn failed_registration_leaves_registry_unchanged() {
        let mut rb: Rebound = Rebound::new();
        let err = rb.try_react_to("amount", |_: u64| Ok(())).unwrap_err();
        assert!(matches!(err, RegistrationError::Validation(_)));
        assert!(rb.is_empty());
    }

    #[test]
    fn debug_lists_events_and_decoder() {
        let mut rb: Rebound = Rebound::new();
        rb.react_to("order.placed", |_: OrderPlaced| Ok(()));
        let rendered = format!("{rb:?}");
        assert!(rendered.contains("order.placed"));
        assert!(rendered.contains("json"));
    }
}
