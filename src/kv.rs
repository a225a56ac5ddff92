// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The value type of request log fields.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use jiff::Timestamp;
use serde::Serialize;
use serde::Serializer;
use serde::ser::Error as _;
use serde::ser::SerializeMap;
use serde::ser::SerializeSeq;

use crate::Error;

/// A field value of a request [`Log`](crate::Log).
///
/// Values nest arbitrarily through [`Value::Seq`] and [`Value::Map`]. Serialization fails with
/// an `unsupported value` error for non-finite floats.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value, serialized as `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    I64(i64),
    /// An unsigned integer.
    U64(u64),
    /// A float.
    F64(f64),
    /// A string.
    Str(String),
    /// An instant, serialized as an RFC 3339 string.
    Time(Timestamp),
    /// A sequence of values.
    Seq(Vec<Value>),
    /// A nested map.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Convert any serializable value into a [`Value`].
    ///
    /// # Errors
    ///
    /// Return an error if `value` fails to serialize, or serializes a map with non-string keys.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Value, Error> {
        let json = serde_json::to_value(value).map_err(Error::from_json_error)?;
        Ok(Value::from_json(json))
    }

    /// Convert a [`serde_json::Value`] into a [`Value`].
    pub fn from_json(json: serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Value::U64(u)
                } else if let Some(i) = n.as_i64() {
                    Value::I64(i)
                } else {
                    Value::F64(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(seq) => {
                Value::Seq(seq.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Map(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Return the string slice if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Return the instant if this is a [`Value::Time`].
    pub fn as_time(&self) -> Option<Timestamp> {
        match self {
            Value::Time(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Return the integer if this is a [`Value::U64`], or a non-negative [`Value::I64`].
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            Value::U64(u) => Some(u),
            Value::I64(i) => u64::try_from(i).ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::I64(i) => write!(f, "{i}"),
            Value::U64(u) => write!(f, "{u}"),
            Value::F64(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::Time(ts) => write!(f, "{ts:.3}"),
            Value::Seq(_) | Value::Map(_) => match serde_json::to_string(self) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "{self:?}"),
            },
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::I64(i) => serializer.serialize_i64(*i),
            Value::U64(u) => serializer.serialize_u64(*u),
            Value::F64(x) if x.is_finite() => serializer.serialize_f64(*x),
            Value::F64(x) => Err(S::Error::custom(format_args!("unsupported value: {x}"))),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Time(ts) => serializer.collect_str(&format_args!("{ts:.3}")),
            Value::Seq(seq) => {
                let mut s = serializer.serialize_seq(Some(seq.len()))?;
                for v in seq {
                    s.serialize_element(v)?;
                }
                s.end()
            }
            Value::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (k, v) in map {
                    m.serialize_entry(k, v)?;
                }
                m.end()
            }
        }
    }
}

macro_rules! impl_from_for_value {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Value {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for_value! {
    bool => Bool,
    i8 => I64,
    i16 => I64,
    i32 => I64,
    i64 => I64,
    u8 => U64,
    u16 => U64,
    u32 => U64,
    u64 => U64,
    f32 => F64,
    f64 => F64,
    String => Str,
    Timestamp => Time,
}

impl From<&str> for Value {
    fn from(v: &str) -> Value {
        Value::Str(v.to_owned())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(v: Cow<'_, str>) -> Value {
        Value::Str(v.into_owned())
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Value {
        Value::U64(v as u64)
    }
}

impl From<isize> for Value {
    fn from(v: isize) -> Value {
        Value::I64(v as i64)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Value {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Value {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Value {
        Value::Seq(v.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Value {
        Value::Seq(v.into_iter().map(Into::into).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(v: BTreeMap<K, V>) -> Value {
        Value::Map(v.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Value {
        Value::from_json(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_values_serialize() {
        let value = Value::from(BTreeMap::from([
            ("a", Value::from(0)),
            ("b", Value::from([1, 2, 3])),
        ]));
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"a":0,"b":[1,2,3]}"#
        );
    }

    #[test]
    fn non_finite_float_fails_with_kind() {
        let err = serde_json::to_string(&Value::from(f64::NAN)).unwrap_err();
        assert!(err.to_string().contains("unsupported value: NaN"));
    }

    #[test]
    fn time_serializes_with_milliseconds() {
        let ts: Timestamp = "2024-08-11T22:44:57.172105Z".parse().unwrap();
        assert_eq!(
            serde_json::to_string(&Value::from(ts)).unwrap(),
            r#""2024-08-11T22:44:57.172Z""#
        );
    }

    #[test]
    fn from_serialize_keeps_structure() {
        #[derive(Serialize)]
        struct User {
            id: u32,
            name: &'static str,
            tags: Vec<&'static str>,
        }

        let value = Value::from_serialize(&User {
            id: 7,
            name: "ann",
            tags: vec!["a"],
        })
        .unwrap();
        let Value::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map["id"], Value::U64(7));
        assert_eq!(map["name"], Value::Str("ann".to_string()));
        assert_eq!(map["tags"], Value::Seq(vec![Value::Str("a".to_string())]));
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Str("x".to_string()));
    }
}
