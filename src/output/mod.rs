// Structured record output produced by successful decodes

use serde::Serialize;
use std::fmt;

/// A typed field value. `HexInt` keeps the fixed-width hex rendering some
/// protocols use for ids (e.g. a 20-bit serial printed as five digits).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    String(String),
    Int(i64),
    HexInt { value: u64, width: usize },
}

impl Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => ser.serialize_str(s),
            Value::Int(i) => ser.serialize_i64(*i),
            Value::HexInt { value, width } => {
                ser.serialize_str(&format!("{:0width$x}", value, width = width))
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Int(i) => write!(f, "{}", i),
            Value::HexInt { value, width } => write!(f, "{:0width$x}", value, width = width),
        }
    }
}

/// Ordered field map emitted once per validated message. The first field
/// is always `model`, naming the decoder that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Serialize for Record {
    fn serialize<S: serde::Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = ser.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Record {
    /// Start a record for the given model name.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            fields: vec![("model".to_string(), Value::String(model.into()))],
        }
    }

    pub fn push_str(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), Value::String(value.into())));
    }

    pub fn push_int(&mut self, name: impl Into<String>, value: i64) {
        self.fields.push((name.into(), Value::Int(value)));
    }

    pub fn push_hex(&mut self, name: impl Into<String>, value: u64, width: usize) {
        self.fields.push((name.into(), Value::HexInt { value, width }));
    }

    pub fn model(&self) -> &str {
        match &self.fields[0].1 {
            Value::String(s) => s,
            _ => unreachable!("model field is always a string"),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }
}

/// Where validated records go. Called once per decode; the sink cannot
/// influence decoding.
pub trait RecordSink: Send {
    fn emit(&mut self, record: Record);
}

/// Collects records in memory. Used by tests and the CLI.
#[derive(Debug, Default)]
pub struct VecSink {
    pub records: Vec<Record>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordSink for VecSink {
    fn emit(&mut self, record: Record) {
        self.records.push(record);
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F: FnMut(Record) + Send> RecordSink for FnSink<F> {
    fn emit(&mut self, record: Record) {
        (self.0)(record)
    }
}
