//! Input shape probing and handler validation.
//!
//! A handler's input must be a plain record: a struct with named fields.
//! The arity and return type of a handler are fixed by the `Fn(T) ->
//! Result<(), E>` bound, so the only thing left to check at runtime is the
//! input type, which we learn by asking its `Deserialize` impl which
//! `deserialize_*` entry point it wants.

use std::fmt;

use serde::de::{self, DeserializeOwned, Visitor};

use crate::error::ValidationError;

/// The serde data-model shape a type deserializes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Record {
        name: &'static str,
        fields: &'static [&'static str],
    },
    Primitive(&'static str),
    Bytes,
    Unit,
    Optional,
    Sequence,
    Tuple {
        len: usize,
    },
    TupleStruct {
        name: &'static str,
        len: usize,
    },
    Newtype {
        name: &'static str,
    },
    Map,
    Enum {
        name: &'static str,
    },
    /// Self-describing input such as `serde_json::Value`.
    Any,
    /// The type never asked the deserializer for anything.
    Opaque,
}

impl Shape {
    pub fn is_record(&self) -> bool {
        matches!(self, Shape::Record { .. })
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Record { name, .. } => write!(f, "struct {name}"),
            Shape::Primitive(kind) => f.write_str(kind),
            Shape::Bytes => f.write_str("bytes"),
            Shape::Unit => f.write_str("unit"),
            Shape::Optional => f.write_str("option"),
            Shape::Sequence => f.write_str("sequence"),
            Shape::Tuple { len } => write!(f, "tuple of {len}"),
            Shape::TupleStruct { name, len } => write!(f, "tuple struct {name} of {len}"),
            Shape::Newtype { name } => write!(f, "newtype struct {name}"),
            Shape::Map => f.write_str("map"),
            Shape::Enum { name } => write!(f, "enum {name}"),
            Shape::Any => f.write_str("any"),
            Shape::Opaque => f.write_str("opaque"),
        }
    }
}

/// Probe the shape `T` deserializes from.
pub fn probe<T: DeserializeOwned>() -> Shape {
    match T::deserialize(Probe) {
        Err(Probed(shape)) => shape,
        Ok(_) => Shape::Opaque,
    }
}

/// Check that `T` is usable as a handler input.
pub fn validate_input<T: DeserializeOwned>() -> Result<Shape, ValidationError> {
    let shape = probe::<T>();
    if shape.is_record() {
        Ok(shape)
    } else {
        Err(ValidationError::InputNotRecord {
            input_type: std::any::type_name::<T>(),
            found: shape,
        })
    }
}

/// Check a handler without registering it.
///
/// ```
/// use rebound::validate_handler;
///
/// let handler = |amount: u64| -> anyhow::Result<()> { Ok(()) };
/// assert!(validate_handler(&handler).is_err());
/// ```
pub fn validate_handler<T, E, F>(_handler: &F) -> Result<(), ValidationError>
where
    T: DeserializeOwned,
    F: Fn(T) -> Result<(), E>,
{
    validate_input::<T>().map(|_| ())
}

// ---------------------------------------------------------------------------
// Probe deserializer
// ---------------------------------------------------------------------------

/// Deserializer that fails on the first request, reporting what was asked for.
struct Probe;

#[derive(Debug)]
struct Probed(Shape);

impl fmt::Display for Probed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "probed {}", self.0)
    }
}

impl std::error::Error for Probed {}

impl de::Error for Probed {
    fn custom<T: fmt::Display>(_msg: T) -> Self {
        Probed(Shape::Opaque)
    }
}

macro_rules! probe_as {
    ($($method:ident => $shape:expr,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, _visitor: V) -> Result<V::Value, Probed> {
                Err(Probed($shape))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Probe {
    type Error = Probed;

    probe_as! {
        deserialize_any => Shape::Any,
        deserialize_bool => Shape::Primitive("bool"),
        deserialize_i8 => Shape::Primitive("i8"),
        deserialize_i16 => Shape::Primitive("i16"),
        deserialize_i32 => Shape::Primitive("i32"),
        deserialize_i64 => Shape::Primitive("i64"),
        deserialize_i128 => Shape::Primitive("i128"),
        deserialize_u8 => Shape::Primitive("u8"),
        deserialize_u16 => Shape::Primitive("u16"),
        deserialize_u32 => Shape::Primitive("u32"),
        deserialize_u64 => Shape::Primitive("u64"),
        deserialize_u128 => Shape::Primitive("u128"),
        deserialize_f32 => Shape::Primitive("f32"),
        deserialize_f64 => Shape::Primitive("f64"),
        deserialize_char => Shape::Primitive("char"),
        deserialize_str => Shape::Primitive("string"),
        deserialize_string => Shape::Primitive("string"),
        deserialize_identifier => Shape::Primitive("identifier"),
        deserialize_bytes => Shape::Bytes,
        deserialize_byte_buf => Shape::Bytes,
        deserialize_option => Shape::Optional,
        deserialize_unit => Shape::Unit,
        deserialize_seq => Shape::Sequence,
        deserialize_map => Shape::Map,
        deserialize_ignored_any => Shape::Any,
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Probed> {
        // A struct without fields is still a record.
        Err(Probed(Shape::Record { name, fields: &[] }))
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        _visitor: V,
    ) -> Result<V::Value, Probed> {
        Err(Probed(Shape::Newtype { name }))
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, len: usize, _visitor: V) -> Result<V::Value, Probed> {
        Err(Probed(Shape::Tuple { len }))
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        len: usize,
        _visitor: V,
    ) -> Result<V::Value, Probed> {
        Err(Probed(Shape::TupleStruct { name, len }))
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Probed> {
        Err(Probed(Shape::Record { name, fields }))
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Probed> {
        Err(Probed(Shape::Enum { name }))
    }
}
