//! Bound parameter values and row objects.
//!
//! [`Value`] is the scalar every builder binds. It carries its own Postgres encoding so
//! descriptors stay plain data (comparable, cloneable, printable) instead of holding
//! opaque `dyn ToSql` trait objects.

use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};
use uuid::Uuid;

/// A scalar bound parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    Double(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
    LocalTimestamp(NaiveDateTime),
    Date(NaiveDate),
}

impl Value {
    /// Whether this value encodes as SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl ToSql for Value {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            // Numbers follow the type the server inferred for the placeholder.
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT8 => i64::from(*v).to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => f64::from(*v).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::BigInt(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql(ty, out),
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::FLOAT8 => (*v as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Double(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*v)?.to_sql(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Decimal(v) => v.to_sql_checked(ty, out),
            Value::Text(v) => match *ty {
                Type::NUMERIC => Decimal::from_str(v)?.to_sql(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::LocalTimestamp(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::Int(i32::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::LocalTimestamp(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// An ordered column → value mapping (one INSERT row, or an UPDATE value map).
///
/// Columns keep the order they were first set in; setting a column again replaces
/// its value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value (consuming builder form).
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column value in place.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (column, value) in iter {
            record.insert(column, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_becomes_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn record_keeps_first_set_order() {
        let r = Record::new()
            .set("name", "John")
            .set("email", "j@x.com")
            .set("name", "Johnny");
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["name", "email"]);
        assert_eq!(r.get("name"), Some(&Value::Text("Johnny".into())));
    }

    #[test]
    fn record_from_iterator() {
        let r: Record = [("reps", Value::from(10)), ("weight", Value::Null)]
            .into_iter()
            .collect();
        assert_eq!(r.len(), 2);
        assert!(r.get("weight").is_some_and(Value::is_null));
    }

    #[test]
    fn null_encodes_for_any_type() {
        let mut buf = BytesMut::new();
        let is_null = Value::Null.to_sql_checked(&Type::INT4, &mut buf).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(buf.is_empty());
    }

    #[test]
    fn int_adapts_to_bigint_placeholder() {
        let mut buf = BytesMut::new();
        Value::Int(7).to_sql_checked(&Type::INT8, &mut buf).unwrap();
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn bigint_out_of_range_for_int4_is_an_error() {
        let mut buf = BytesMut::new();
        assert!(
            Value::BigInt(i64::MAX)
                .to_sql_checked(&Type::INT4, &mut buf)
                .is_err()
        );
    }

    fn encode(value: Value, ty: &Type) -> Result<BytesMut, Box<dyn Error + Sync + Send>> {
        let mut buf = BytesMut::new();
        value.to_sql_checked(ty, &mut buf)?;
        Ok(buf)
    }

    fn numeric(s: &str) -> BytesMut {
        let mut buf = BytesMut::new();
        Decimal::from_str(s)
            .unwrap()
            .to_sql(&Type::NUMERIC, &mut buf)
            .unwrap();
        buf
    }

    #[test]
    fn numbers_bind_against_numeric_placeholders() {
        assert_eq!(encode(Value::Int(70), &Type::NUMERIC).unwrap(), numeric("70"));
        assert_eq!(encode(Value::BigInt(3), &Type::NUMERIC).unwrap(), numeric("3"));
        assert_eq!(
            encode(Value::Double(72.5), &Type::NUMERIC).unwrap(),
            numeric("72.5")
        );
        assert_eq!(
            encode(Value::from("72.5"), &Type::NUMERIC).unwrap(),
            numeric("72.5")
        );
        let weight = Decimal::from_str("102.25").unwrap();
        assert_eq!(
            encode(Value::from(weight), &Type::NUMERIC).unwrap(),
            numeric("102.25")
        );
    }

    #[test]
    fn non_numeric_text_into_numeric_is_an_error() {
        assert!(encode(Value::from("heavy"), &Type::NUMERIC).is_err());
        assert!(encode(Value::Double(f64::NAN), &Type::NUMERIC).is_err());
    }

    #[test]
    fn integers_adapt_to_float_placeholders() {
        assert_eq!(
            encode(Value::BigInt(3), &Type::FLOAT8).unwrap().as_ref(),
            &3.0f64.to_be_bytes()[..]
        );
        assert_eq!(
            encode(Value::Int(70), &Type::FLOAT4).unwrap().as_ref(),
            &70.0f32.to_be_bytes()[..]
        );
    }

    #[test]
    fn text_into_int_column_is_rejected_by_encoding() {
        let mut buf = BytesMut::new();
        assert!(
            Value::from("abc")
                .to_sql_checked(&Type::INT4, &mut buf)
                .is_err()
        );
    }
}
