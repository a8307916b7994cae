//! Named event dispatch.
//!
//! Register one handler per event name, then dispatch raw payloads by name:
//! the payload is decoded into the handler's input type and the handler is
//! invoked. Sits between a transport (queue, stream, outbox table) and typed
//! application code.
//!
//! ```
//! use rebound::Rebound;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct OrderCompleted {
//!     #[serde(rename = "OrderID")]
//!     order_id: String,
//! }
//!
//! let mut rb: Rebound = Rebound::new();
//! rb.react_to("order.completed", |event: OrderCompleted| {
//!     println!("Order {:?} is completed", event.order_id);
//!     Ok(())
//! });
//!
//! rb.dispatch("order.completed", br#"{"OrderID":"123"}"#).unwrap();
//! ```

pub mod decoder;
pub mod error;
pub mod handler;
pub mod registry;
pub mod shape;
pub mod subject;

pub use decoder::{Decoder, JsonDecoder};
pub use error::{DecodeError, DispatchError, RegistrationError, SubjectError, ValidationError};
pub use registry::Rebound;
pub use shape::{validate_handler, validate_input, Shape};
pub use subject::SubjectMapper;
