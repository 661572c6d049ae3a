//! Primitive value kinds and their format grammars.
//!
//! Every field in a schema carries exactly one [`Kind`]. The kind decides
//! which [`Value`] variant a field accepts and which structural checks run
//! on it (numeric width, string grammar, byte length).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_ADDRESS_LENGTH, MIN_ADDRESS_LENGTH};
use crate::types::{Value, ValueError};

/// Grammar for `Integer` values: an optional minus sign followed by digits.
pub const INTEGER_FORMAT: &str = r"^-?[0-9]+$";

/// Grammar for `Decimal` values: an integer part with at most one
/// fractional part.
pub const DECIMAL_FORMAT: &str = r"^-?[0-9]+(\.[0-9]+)?$";

/// Grammar for type, field and enum names.
pub const NAME_FORMAT: &str = r"^[a-zA-Z_][a-zA-Z0-9_]{0,63}$";

#[allow(clippy::unwrap_used)] // Constant patterns, covered by tests
static INTEGER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(INTEGER_FORMAT).unwrap());

#[allow(clippy::unwrap_used)]
static DECIMAL_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(DECIMAL_FORMAT).unwrap());

#[allow(clippy::unwrap_used)]
static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(NAME_FORMAT).unwrap());

/// Returns true if `name` is a valid type, field or enum name.
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    NAME_REGEX.is_match(name)
}

/// The closed set of primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Kind {
    /// Sentinel for an unset kind. Never valid in a schema.
    Invalid = 0,
    String = 1,
    Bytes = 2,
    Int8 = 3,
    Uint8 = 4,
    Int16 = 5,
    Uint16 = 6,
    Int32 = 7,
    Uint32 = 8,
    Int64 = 9,
    Uint64 = 10,
    /// Arbitrary-precision integer encoded as a string matching [`INTEGER_FORMAT`].
    Integer = 11,
    /// Arbitrary-precision decimal encoded as a string matching [`DECIMAL_FORMAT`].
    Decimal = 12,
    Bool = 13,
    Time = 14,
    Duration = 15,
    Float32 = 16,
    Float64 = 17,
    /// Raw address bytes, rendered with the field's human-readable prefix.
    Bech32Address = 18,
    /// A named value drawn from the field's enum definition.
    Enum = 19,
}

impl Kind {
    /// Every valid kind, in discriminant order. Generators draw from this range.
    pub const ALL_VALID: [Self; 19] = [
        Self::String,
        Self::Bytes,
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Int32,
        Self::Uint32,
        Self::Int64,
        Self::Uint64,
        Self::Integer,
        Self::Decimal,
        Self::Bool,
        Self::Time,
        Self::Duration,
        Self::Float32,
        Self::Float64,
        Self::Bech32Address,
        Self::Enum,
    ];

    /// The snake-case name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Int8 => "int8",
            Self::Uint8 => "uint8",
            Self::Int16 => "int16",
            Self::Uint16 => "uint16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Uint64 => "uint64",
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Bool => "bool",
            Self::Time => "time",
            Self::Duration => "duration",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Bech32Address => "bech32_address",
            Self::Enum => "enum",
        }
    }

    /// Check that a non-null value has the representation this kind requires.
    ///
    /// Enum membership is not checked here because it depends on the field's
    /// enum definition; see [`Field::validate_value`](crate::types::Field::validate_value).
    ///
    /// # Panics
    ///
    /// Panics when called on [`Kind::Invalid`]. A schema that passed
    /// validation never contains it, so reaching this is a programming error.
    pub fn validate_value(self, value: &Value) -> Result<(), ValueError> {
        let matches = match (self, value) {
            (Self::Invalid, _) => panic!("cannot validate a value against the invalid kind"),
            (Self::String, Value::String(_))
            | (Self::Bytes, Value::Bytes(_))
            | (Self::Int8, Value::Int8(_))
            | (Self::Uint8, Value::Uint8(_))
            | (Self::Int16, Value::Int16(_))
            | (Self::Uint16, Value::Uint16(_))
            | (Self::Int32, Value::Int32(_))
            | (Self::Uint32, Value::Uint32(_))
            | (Self::Int64, Value::Int64(_))
            | (Self::Uint64, Value::Uint64(_))
            | (Self::Bool, Value::Bool(_))
            | (Self::Time, Value::Time(_))
            | (Self::Duration, Value::Duration(_))
            | (Self::Float32, Value::Float32(_))
            | (Self::Float64, Value::Float64(_))
            | (Self::Enum, Value::Enum(_)) => true,
            (Self::Integer, Value::Integer(s)) => {
                if !INTEGER_REGEX.is_match(s) {
                    return Err(ValueError::InvalidFormat {
                        kind: self,
                        value: s.clone(),
                    });
                }
                true
            }
            (Self::Decimal, Value::Decimal(s)) => {
                if !DECIMAL_REGEX.is_match(s) {
                    return Err(ValueError::InvalidFormat {
                        kind: self,
                        value: s.clone(),
                    });
                }
                true
            }
            (Self::Bech32Address, Value::Bech32Address(bytes)) => {
                if !(MIN_ADDRESS_LENGTH..=MAX_ADDRESS_LENGTH).contains(&bytes.len()) {
                    return Err(ValueError::AddressLength(bytes.len()));
                }
                true
            }
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(ValueError::KindMismatch {
                expected: self,
                actual: value.kind(),
            })
        }
    }
}

impl TryFrom<u8> for Kind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Invalid),
            1..=19 => Ok(Self::ALL_VALID[usize::from(value) - 1]),
            _ => Err(value),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
