//! Typed field values.
//!
//! Keys and value payloads carry [`Value`]s rather than untyped data, so a
//! value's representation is fixed by its variant and checked against the
//! owning field's [`Kind`] at every boundary.

use std::fmt::{self, Write};

use crate::types::Kind;

/// A single field value, tagged by the kind it represents.
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::disallowed_methods)] // Clone needed to hand copies to listeners
pub enum Value {
    /// Absence of a value. Only valid for nullable fields.
    Null,
    String(String),
    Bytes(Vec<u8>),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Integer(String),
    Decimal(String),
    Bool(bool),
    /// Nanoseconds since the Unix epoch.
    Time(i64),
    /// Signed nanoseconds.
    Duration(i64),
    Float32(f32),
    Float64(f64),
    Bech32Address(Vec<u8>),
    Enum(String),
}

impl Value {
    /// The kind this value represents, or `None` for [`Value::Null`].
    #[must_use]
    pub const fn kind(&self) -> Option<Kind> {
        let kind = match self {
            Self::Null => return None,
            Self::String(_) => Kind::String,
            Self::Bytes(_) => Kind::Bytes,
            Self::Int8(_) => Kind::Int8,
            Self::Uint8(_) => Kind::Uint8,
            Self::Int16(_) => Kind::Int16,
            Self::Uint16(_) => Kind::Uint16,
            Self::Int32(_) => Kind::Int32,
            Self::Uint32(_) => Kind::Uint32,
            Self::Int64(_) => Kind::Int64,
            Self::Uint64(_) => Kind::Uint64,
            Self::Integer(_) => Kind::Integer,
            Self::Decimal(_) => Kind::Decimal,
            Self::Bool(_) => Kind::Bool,
            Self::Time(_) => Kind::Time,
            Self::Duration(_) => Kind::Duration,
            Self::Float32(_) => Kind::Float32,
            Self::Float64(_) => Kind::Float64,
            Self::Bech32Address(_) => Kind::Bech32Address,
            Self::Enum(_) => Kind::Enum,
        };
        Some(kind)
    }

    /// Returns true for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Write an unambiguous rendering of this value.
    ///
    /// Strings are quoted and escaped and byte sequences are hex encoded, so
    /// two values render the same exactly when they are structurally equal
    /// (floats compare by their shortest round-trip representation).
    pub fn write_canonical(&self, out: &mut impl Write) -> fmt::Result {
        match self {
            Self::Null => out.write_str("null"),
            Self::String(s) => write!(out, "{s:?}"),
            Self::Integer(s) => write!(out, "int:{s}"),
            Self::Decimal(s) => write!(out, "dec:{s}"),
            Self::Enum(s) => write!(out, "enum:{s}"),
            Self::Bytes(bytes) => {
                out.write_str("0x")?;
                write_hex(out, bytes)
            }
            Self::Bech32Address(bytes) => {
                out.write_str("addr:")?;
                write_hex(out, bytes)
            }
            Self::Int8(n) => write!(out, "{n}i8"),
            Self::Uint8(n) => write!(out, "{n}u8"),
            Self::Int16(n) => write!(out, "{n}i16"),
            Self::Uint16(n) => write!(out, "{n}u16"),
            Self::Int32(n) => write!(out, "{n}i32"),
            Self::Uint32(n) => write!(out, "{n}u32"),
            Self::Int64(n) => write!(out, "{n}i64"),
            Self::Uint64(n) => write!(out, "{n}u64"),
            Self::Float32(n) => write!(out, "{n:?}f32"),
            Self::Float64(n) => write!(out, "{n:?}f64"),
            Self::Bool(b) => write!(out, "{b}"),
            Self::Time(ns) => write!(out, "time:{ns}"),
            Self::Duration(ns) => write!(out, "dur:{ns}"),
        }
    }
}

fn write_hex(out: &mut impl Write, bytes: &[u8]) -> fmt::Result {
    for byte in bytes {
        write!(out, "{byte:02x}")?;
    }
    Ok(())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_canonical(f)
    }
}
