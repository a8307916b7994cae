//! Type-erased handlers.
//!
//! Each registration wraps a typed closure `Fn(T) -> Result<(), E>` in a
//! `TypedHandler<T, F>`, which knows how to decode `T` and call the closure.
//! The registry only ever sees `dyn ErasedHandler<E, D>`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::decoder::Decoder;
use crate::error::DispatchError;
use crate::shape::Shape;

/// Decode-then-invoke, with the input type erased.
pub trait ErasedHandler<E, D>: Send + Sync {
    fn handle_raw(
        &self,
        event_name: &str,
        payload: &[u8],
        decoder: &D,
    ) -> Result<(), DispatchError<E>>;
}

/// Adapter from a typed closure to `ErasedHandler`.
pub struct TypedHandler<T, F> {
    handler: F,
    _input: PhantomData<fn(T)>,
}

impl<T, F> TypedHandler<T, F> {
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _input: PhantomData,
        }
    }
}

impl<T, E, D, F> ErasedHandler<E, D> for TypedHandler<T, F>
where
    T: DeserializeOwned,
    D: Decoder,
    F: Fn(T) -> Result<(), E> + Send + Sync,
{
    fn handle_raw(
        &self,
        event_name: &str,
        payload: &[u8],
        decoder: &D,
    ) -> Result<(), DispatchError<E>> {
        // Nothing runs unless the whole payload decodes.
        let event: T = decoder
            .decode(payload)
            .map_err(|source| DispatchError::Decode {
                event_name: event_name.to_string(),
                source,
            })?;

        (self.handler)(event).map_err(DispatchError::Handler)
    }
}

/// What the registry keeps per event name.
pub struct HandlerDescriptor<E, D> {
    pub input_type: &'static str,
    pub shape: Shape,
    pub handler: Box<dyn ErasedHandler<E, D>>,
}

impl<E, D> std::fmt::Debug for HandlerDescriptor<E, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerDescriptor")
            .field("input_type", &self.input_type)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}
