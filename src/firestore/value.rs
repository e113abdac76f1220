//! An explicit value model for the flat key/value documents the admin tools
//! read and write, plus the conversions to and from the gRPC wire types.
//!
//! The scripts build every document field by field, so the mapping is spelled
//! out rather than routed through a generic serialization layer. The one
//! wrinkle is [`FieldValue::ServerTimestamp`]: Firestore assigns those values
//! server-side through a field transform, so they are split out of the field
//! map at write time.

use std::collections::{BTreeMap, HashMap};

use anyhow::anyhow;
use chrono::{DateTime, TimeZone, Utc};
use firestore_grpc::v1::{value::ValueType, ArrayValue, MapValue, Value};
use prost_types::Timestamp;

use crate::error::FirebaseError;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Double(f64),
    String(String),
    Timestamp(DateTime<Utc>),
    /// Sentinel for a timestamp assigned by Firestore when the write commits.
    ServerTimestamp,
    Array(Vec<FieldValue>),
    Map(Fields),
}

/// An ordered field map. Ordering keeps console output and test assertions
/// deterministic.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fields(BTreeMap<String, FieldValue>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric accessor. Integers coerce to doubles, matching how loosely the
    /// seeded documents treat numbers.
    pub fn double(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            FieldValue::Double(d) => Some(*d),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn integer(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn boolean(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            FieldValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key)? {
            FieldValue::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn map(&self, key: &str) -> Option<&Fields> {
        match self.get(key)? {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, FieldValue)> for Fields {
    fn from_iter<T: IntoIterator<Item = (String, FieldValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        Self::Integer(v as i64)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl From<Fields> for FieldValue {
    fn from(v: Fields) -> Self {
        Self::Map(v)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(v: Vec<FieldValue>) -> Self {
        Self::Array(v)
    }
}

/// Splits a document into the value map to write and the paths of the fields
/// that must become server-timestamp transforms on the same write.
///
/// The sentinel is only supported at the top level of a document; the admin
/// tools never nest one.
pub(crate) fn split_for_write(
    fields: &Fields,
) -> Result<(HashMap<String, Value>, Vec<String>), FirebaseError> {
    let mut values = HashMap::new();
    let mut server_timestamps = Vec::new();

    for (key, value) in fields.iter() {
        match value {
            FieldValue::ServerTimestamp => server_timestamps.push(key.to_string()),
            other => {
                values.insert(key.to_string(), to_grpc_value(other)?);
            }
        }
    }

    Ok((values, server_timestamps))
}

fn to_grpc_value(value: &FieldValue) -> Result<Value, FirebaseError> {
    let value_type = match value {
        FieldValue::Null => ValueType::NullValue(0),
        FieldValue::Boolean(b) => ValueType::BooleanValue(*b),
        FieldValue::Integer(i) => ValueType::IntegerValue(*i),
        FieldValue::Double(d) => ValueType::DoubleValue(*d),
        FieldValue::String(s) => ValueType::StringValue(s.clone()),
        FieldValue::Timestamp(t) => ValueType::TimestampValue(Timestamp {
            seconds: t.timestamp(),
            nanos: t.timestamp_subsec_nanos() as i32,
        }),
        FieldValue::ServerTimestamp => {
            return Err(
                anyhow!("server timestamps are only supported as top-level document fields").into(),
            )
        }
        FieldValue::Array(items) => {
            let values = items
                .iter()
                .map(to_grpc_value)
                .collect::<Result<Vec<_>, _>>()?;
            ValueType::ArrayValue(ArrayValue { values })
        }
        FieldValue::Map(fields) => {
            let mut inner = HashMap::new();
            for (key, value) in fields.iter() {
                inner.insert(key.to_string(), to_grpc_value(value)?);
            }
            ValueType::MapValue(MapValue { fields: inner })
        }
    };

    Ok(Value {
        value_type: Some(value_type),
    })
}

pub(crate) fn from_grpc_fields(fields: HashMap<String, Value>) -> Fields {
    fields
        .into_iter()
        .map(|(key, value)| (key, from_grpc_value(value)))
        .collect()
}

fn from_grpc_value(value: Value) -> FieldValue {
    match value.value_type {
        Some(ValueType::BooleanValue(b)) => FieldValue::Boolean(b),
        Some(ValueType::IntegerValue(i)) => FieldValue::Integer(i),
        Some(ValueType::DoubleValue(d)) => FieldValue::Double(d),
        Some(ValueType::StringValue(s)) => FieldValue::String(s),
        Some(ValueType::TimestampValue(ts)) => Utc
            .timestamp_opt(ts.seconds, ts.nanos as u32)
            .single()
            .map(FieldValue::Timestamp)
            .unwrap_or(FieldValue::Null),
        Some(ValueType::ArrayValue(items)) => {
            FieldValue::Array(items.values.into_iter().map(from_grpc_value).collect())
        }
        Some(ValueType::MapValue(map)) => FieldValue::Map(from_grpc_fields(map.fields)),
        // Bytes, references and geo points never occur in these collections.
        _ => FieldValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_flat_document() {
        let time = Utc.with_ymd_and_hms(2024, 5, 4, 12, 30, 0).unwrap();
        let fields = Fields::new()
            .with("name", "Ahmed Khan")
            .with("rate", 3.0)
            .with("totalRides", 12)
            .with("isActive", true)
            .with("lastSeen", time)
            .with(
                "driverLoc",
                Fields::new().with("latitude", 40.6895).with("longitude", -74.1745),
            );

        let (values, transforms) = split_for_write(&fields).unwrap();
        assert!(transforms.is_empty());

        let restored = from_grpc_fields(values);
        assert_eq!(restored, fields);
    }

    #[test]
    fn server_timestamps_become_transform_paths() {
        let fields = Fields::new()
            .with("email", "driver@example.com")
            .with("createdAt", FieldValue::ServerTimestamp)
            .with("lastLogin", FieldValue::ServerTimestamp);

        let (values, transforms) = split_for_write(&fields).unwrap();

        assert_eq!(values.len(), 1);
        assert!(values.contains_key("email"));
        assert_eq!(transforms, vec!["createdAt".to_string(), "lastLogin".to_string()]);
    }

    #[test]
    fn nested_server_timestamps_are_rejected() {
        let fields = Fields::new().with(
            "audit",
            Fields::new().with("createdAt", FieldValue::ServerTimestamp),
        );

        assert!(split_for_write(&fields).is_err());
    }

    #[test]
    fn integers_coerce_to_doubles() {
        let fields = Fields::new().with("rate", 3);
        assert_eq!(fields.double("rate"), Some(3.0));
        assert_eq!(fields.integer("rate"), Some(3));
    }
}
