//! Normalized records

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    pub constructor_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub driver_id: i32,
    pub fullname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub race_id: i32,
    pub year: i32,
    pub name: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub result_id: i32,
    pub race_id: i32,
    pub driver_id: i32,
    pub constructor_id: i32,
    pub position_order: i32,
    pub points: i32,
    pub fastest_lap_time: Option<NaiveTime>,
}

/// One column value of a normalized row, in a backend-neutral form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i32),
    Text(String),
    Date(Option<NaiveDate>),
    Time(Option<NaiveTime>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Date(None) | FieldValue::Time(None))
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldValue::Int(n) => write!(f, "{}", n),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Date(Some(d)) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Time(Some(t)) => write!(f, "{}", t.format("%H:%M:%S%.3f")),
            FieldValue::Date(None) | FieldValue::Time(None) => f.write_str("NULL"),
        }
    }
}

/// Conversion of a record into insert-ordered column values
pub trait Row {
    fn values(&self) -> Vec<FieldValue>;
}

impl Row for Constructor {
    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int(self.constructor_id),
            FieldValue::Text(self.name.clone()),
        ]
    }
}

impl Row for Driver {
    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int(self.driver_id),
            FieldValue::Text(self.fullname.clone()),
        ]
    }
}

impl Row for Race {
    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int(self.race_id),
            FieldValue::Int(self.year),
            FieldValue::Text(self.name.clone()),
            FieldValue::Date(self.date),
        ]
    }
}

impl Row for RaceResult {
    fn values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Int(self.result_id),
            FieldValue::Int(self.race_id),
            FieldValue::Int(self.driver_id),
            FieldValue::Int(self.constructor_id),
            FieldValue::Int(self.position_order),
            FieldValue::Int(self.points),
            FieldValue::Time(self.fastest_lap_time),
        ]
    }
}
