//! Two ways of looking inside a request without knowing its concrete type.
//!
//! Schematized requests describe themselves through a static [`MessageDescriptor`]
//! and hand out field values one declared field at a time. Everything else is
//! treated as a plain object and read through its `serde` representation.
use std::fmt;

use serde::{
    ser::{self, Impossible},
    Serialize,
};
use serde_json::Value;

/// Static description of a schematized message type.
#[derive(Debug)]
pub struct MessageDescriptor {
    /// Package-qualified name, for example `myservice.GetUserRequest`.
    pub full_name: &'static str,
    /// Short type name, for example `GetUserRequest`.
    pub name: &'static str,
    /// Fields in declaration order.
    pub fields: &'static [FieldDescriptor],
}

#[derive(Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub number: u32,
}

/// A single field value read from a schematized message.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue<'a> {
    Bool(bool),
    I64(i64),
    U64(u64),
    F64(f64),
    Str(&'a str),
    Enum(&'static str),
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(value) => write!(f, "{value}"),
            FieldValue::I64(value) => write!(f, "{value}"),
            FieldValue::U64(value) => write!(f, "{value}"),
            FieldValue::F64(value) => write!(f, "{value}"),
            FieldValue::Str(value) => f.write_str(value),
            FieldValue::Enum(value) => f.write_str(value),
        }
    }
}

/// A message that exposes its declared fields.
pub trait SchemaIntrospectable: Send + Sync {
    fn descriptor(&self) -> &'static MessageDescriptor;

    /// Returns `None` when the field is unset.
    fn field_value(&self, field: &FieldDescriptor) -> Option<FieldValue<'_>>;
}

/// An arbitrary object exposing named properties.
pub trait GenericIntrospectable {
    fn type_name(&self) -> &'static str;

    /// Property names with their stringified values, `None` for null.
    /// The order is stable for a given type.
    fn properties(&self) -> Vec<(String, Option<String>)>;
}

impl<T: Serialize> GenericIntrospectable for T {
    fn type_name(&self) -> &'static str {
        short_type_name(std::any::type_name::<T>())
    }

    fn properties(&self) -> Vec<(String, Option<String>)> {
        // Values that do not serialize as a struct or map contribute no properties.
        self.serialize(PropertyCollector).unwrap_or_default()
    }
}

type Properties = Vec<(String, Option<String>)>;

/// Each property is converted on its own, so a value that has no JSON form
/// only loses its own value.
fn stringify_property<V: Serialize + ?Sized>(value: &V) -> Option<String> {
    match serde_json::to_value(value).ok()? {
        Value::Null => None,
        Value::String(value) => Some(value),
        other => Some(other.to_string()),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("value does not serialize as an object")]
struct NotAnObject;

impl ser::Error for NotAnObject {
    fn custom<M: fmt::Display>(_msg: M) -> Self {
        NotAnObject
    }
}

/// Collects the top-level properties of a struct or map.
struct PropertyCollector;

macro_rules! reject_values {
    ($($method:ident($ty:ty)),+ $(,)?) => {
        $(
            fn $method(self, _value: $ty) -> Result<Properties, NotAnObject> {
                Err(NotAnObject)
            }
        )+
    };
}

impl ser::Serializer for PropertyCollector {
    type Ok = Properties;
    type Error = NotAnObject;
    type SerializeSeq = Impossible<Properties, NotAnObject>;
    type SerializeTuple = Impossible<Properties, NotAnObject>;
    type SerializeTupleStruct = Impossible<Properties, NotAnObject>;
    type SerializeTupleVariant = Impossible<Properties, NotAnObject>;
    type SerializeMap = MapProperties;
    type SerializeStruct = StructProperties;
    type SerializeStructVariant = Impossible<Properties, NotAnObject>;

    reject_values! {
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    }

    fn serialize_none(self) -> Result<Properties, NotAnObject> {
        Err(NotAnObject)
    }

    fn serialize_some<V: Serialize + ?Sized>(self, value: &V) -> Result<Properties, NotAnObject> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Properties, NotAnObject> {
        Err(NotAnObject)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
    ) -> Result<Properties, NotAnObject> {
        Err(NotAnObject)
    }

    fn serialize_newtype_struct<V: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &V,
    ) -> Result<Properties, NotAnObject> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<V: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &V,
    ) -> Result<Properties, NotAnObject> {
        Err(NotAnObject)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, NotAnObject> {
        Err(NotAnObject)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, NotAnObject> {
        Err(NotAnObject)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, NotAnObject> {
        Err(NotAnObject)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, NotAnObject> {
        Err(NotAnObject)
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapProperties, NotAnObject> {
        Ok(MapProperties {
            properties: Vec::with_capacity(len.unwrap_or_default()),
            pending_key: None,
        })
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<StructProperties, NotAnObject> {
        Ok(StructProperties(Vec::with_capacity(len)))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, NotAnObject> {
        Err(NotAnObject)
    }
}

struct StructProperties(Properties);

impl ser::SerializeStruct for StructProperties {
    type Ok = Properties;
    type Error = NotAnObject;

    fn serialize_field<V: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &V,
    ) -> Result<(), NotAnObject> {
        self.0.push((key.to_string(), stringify_property(value)));
        Ok(())
    }

    fn end(self) -> Result<Properties, NotAnObject> {
        Ok(self.0)
    }
}

struct MapProperties {
    properties: Properties,
    pending_key: Option<String>,
}

impl ser::SerializeMap for MapProperties {
    type Ok = Properties;
    type Error = NotAnObject;

    fn serialize_key<K: Serialize + ?Sized>(&mut self, key: &K) -> Result<(), NotAnObject> {
        self.pending_key = stringify_property(key);
        Ok(())
    }

    fn serialize_value<V: Serialize + ?Sized>(&mut self, value: &V) -> Result<(), NotAnObject> {
        // entries whose key has no string form are skipped
        if let Some(key) = self.pending_key.take() {
            self.properties.push((key, stringify_property(value)));
        }
        Ok(())
    }

    fn end(self) -> Result<Properties, NotAnObject> {
        Ok(self.properties)
    }
}

/// `my_crate::messages::Thing<u8>` becomes `Thing`.
fn short_type_name(full: &'static str) -> &'static str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

/// The view a request offers to the instrumentation.
pub enum Introspection<'a> {
    Schema(&'a dyn SchemaIntrospectable),
    Generic(&'a dyn GenericIntrospectable),
}

impl Introspection<'_> {
    /// Short type identifier, used to build the `endpoint` attribute.
    pub fn short_name(&self) -> &'static str {
        match self {
            Introspection::Schema(message) => message.descriptor().name,
            Introspection::Generic(object) => object.type_name(),
        }
    }

    /// Fully-qualified identifier for schematized messages, the runtime type
    /// name otherwise.
    pub fn qualified_name(&self) -> &'static str {
        match self {
            Introspection::Schema(message) => message.descriptor().full_name,
            Introspection::Generic(object) => object.type_name(),
        }
    }
}

/// Implemented by every request type a wrapped handler accepts.
pub trait Introspect {
    fn introspect(&self) -> Introspection<'_>;
}

/// Implements [`Introspect`] for `serde::Serialize` types that have no schema.
#[macro_export]
macro_rules! plain_request {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::introspect::Introspect for $ty {
                fn introspect(&self) -> $crate::introspect::Introspection<'_> {
                    $crate::introspect::Introspection::Generic(self)
                }
            }
        )+
    };
}
