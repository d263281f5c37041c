use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Basic type declared for a data attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Boolean,
    Int32,
    Unsigned32,
    Float32,
    VisibleString,
    UtcTime,
    /// Structured attribute (e.g. `Oper`); carries children instead of a value.
    Constructed,
}

impl DataType {
    /// The value a freshly created attribute of this type holds.
    #[must_use]
    pub fn default_value(self) -> Option<MmsValue> {
        match self {
            Self::Boolean => Some(MmsValue::Boolean(false)),
            Self::Int32 => Some(MmsValue::Int32(0)),
            Self::Unsigned32 => Some(MmsValue::Unsigned32(0)),
            Self::Float32 => Some(MmsValue::Float32(0.0)),
            Self::VisibleString => Some(MmsValue::VisibleString(String::new())),
            Self::UtcTime => Some(MmsValue::UtcTime(DateTime::<Utc>::UNIX_EPOCH)),
            Self::Constructed => None,
        }
    }

    /// Converts a JSON literal from a model description into a value of this type.
    ///
    /// Returns `None` when the literal does not fit the type.
    #[must_use]
    pub fn value_from_json(self, raw: &serde_json::Value) -> Option<MmsValue> {
        use serde_json::Value as Json;

        match (self, raw) {
            (Self::Boolean, Json::Bool(b)) => Some(MmsValue::Boolean(*b)),
            (Self::Int32, Json::Number(n)) => {
                n.as_i64().and_then(|v| i32::try_from(v).ok()).map(MmsValue::Int32)
            },
            (Self::Unsigned32, Json::Number(n)) => {
                n.as_u64().and_then(|v| u32::try_from(v).ok()).map(MmsValue::Unsigned32)
            },
            #[allow(clippy::cast_possible_truncation)]
            (Self::Float32, Json::Number(n)) => n.as_f64().map(|v| MmsValue::Float32(v as f32)),
            (Self::VisibleString, Json::String(s)) => Some(MmsValue::VisibleString(s.clone())),
            (Self::UtcTime, Json::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|t| MmsValue::UtcTime(t.with_timezone(&Utc))),
            _ => None,
        }
    }
}

/// A typed attribute value as exchanged with the protocol server.
#[derive(Debug, Clone, PartialEq)]
pub enum MmsValue {
    Boolean(bool),
    Int32(i32),
    Unsigned32(u32),
    Float32(f32),
    VisibleString(String),
    UtcTime(DateTime<Utc>),
}

impl MmsValue {
    /// The basic type this value belongs to.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Boolean(_) => DataType::Boolean,
            Self::Int32(_) => DataType::Int32,
            Self::Unsigned32(_) => DataType::Unsigned32,
            Self::Float32(_) => DataType::Float32,
            Self::VisibleString(_) => DataType::VisibleString,
            Self::UtcTime(_) => DataType::UtcTime,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        if let Self::Boolean(b) = self { Some(*b) } else { None }
    }

    #[must_use]
    pub const fn as_i32(&self) -> Option<i32> {
        if let Self::Int32(v) = self { Some(*v) } else { None }
    }

    #[must_use]
    pub const fn as_f32(&self) -> Option<f32> {
        if let Self::Float32(v) = self { Some(*v) } else { None }
    }

    #[must_use]
    pub const fn as_utc_time(&self) -> Option<DateTime<Utc>> {
        if let Self::UtcTime(t) = self { Some(*t) } else { None }
    }
}

impl fmt::Display for MmsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::Unsigned32(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::VisibleString(s) => f.write_str(s),
            Self::UtcTime(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}
