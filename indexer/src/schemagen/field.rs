//! Value and field generators.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::constants::{MAX_ADDRESS_LENGTH, MIN_ADDRESS_LENGTH};
use crate::types::{EnumDefinition, Field, Kind, Value};

/// Probability that a numeric draw picks a boundary value instead.
const EDGE_CASE_PROBABILITY: f64 = 0.1;

/// Longest generated string, in characters.
const MAX_STRING_LENGTH: usize = 32;

/// Longest generated byte sequence.
const MAX_BYTES_LENGTH: usize = 64;

/// Most digits in a generated integer or decimal part.
const MAX_DIGITS: usize = 40;

/// Longest generated name, in characters.
const MAX_GENERATED_NAME_LENGTH: usize = 16;

const NAME_START_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_";
const NAME_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ_0123456789";

/// Draws values for one field.
///
/// The distribution covers the kind's whole domain, with boundary values
/// drawn more often than chance. Nullable fields yield [`Value::Null`]
/// half of the time.
#[derive(Debug, Clone)]
#[allow(clippy::disallowed_methods)] // Holds its own copy of the field
pub struct FieldValueGenerator {
    field: Field,
}

impl FieldValueGenerator {
    #[must_use]
    #[allow(clippy::disallowed_methods)] // Clone needed to own the field definition
    pub fn new(field: &Field) -> Self {
        Self {
            field: field.clone(),
        }
    }

    /// The field this generator draws for.
    #[must_use]
    pub const fn field(&self) -> &Field {
        &self.field
    }

    /// Draw one value.
    ///
    /// # Panics
    ///
    /// Panics if the field's kind is [`Kind::Invalid`] or its enum
    /// definition has no values. Neither passes schema validation.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Value {
        if self.field.nullable && rng.random_bool(0.5) {
            return Value::Null;
        }
        base_value(&self.field, rng)
    }
}

fn base_value<R: Rng + ?Sized>(field: &Field, rng: &mut R) -> Value {
    match field.kind {
        Kind::Invalid => panic!("cannot generate a value for field {:?} of invalid kind", field.name),
        Kind::String => Value::String(random_string(rng)),
        Kind::Bytes => {
            let len = rng.random_range(0..=MAX_BYTES_LENGTH);
            Value::Bytes(random_bytes(rng, len))
        }
        Kind::Int8 => Value::Int8(with_edges(rng, &[0, i8::MIN, i8::MAX], |r| r.random())),
        Kind::Uint8 => Value::Uint8(with_edges(rng, &[0, u8::MAX], |r| r.random())),
        Kind::Int16 => Value::Int16(with_edges(rng, &[0, i16::MIN, i16::MAX], |r| r.random())),
        Kind::Uint16 => Value::Uint16(with_edges(rng, &[0, u16::MAX], |r| r.random())),
        Kind::Int32 => Value::Int32(with_edges(rng, &[0, i32::MIN, i32::MAX], |r| r.random())),
        Kind::Uint32 => Value::Uint32(with_edges(rng, &[0, u32::MAX], |r| r.random())),
        Kind::Int64 => Value::Int64(with_edges(rng, &[0, i64::MIN, i64::MAX], |r| r.random())),
        Kind::Uint64 => Value::Uint64(with_edges(rng, &[0, u64::MAX], |r| r.random())),
        Kind::Float32 => Value::Float32(with_edges(
            rng,
            &[0.0, f32::MIN, f32::MAX, f32::MIN_POSITIVE, f32::EPSILON],
            |r| r.random_range(-1.0e6..1.0e6),
        )),
        Kind::Float64 => Value::Float64(with_edges(
            rng,
            &[0.0, f64::MIN, f64::MAX, f64::MIN_POSITIVE, f64::EPSILON],
            |r| r.random_range(-1.0e12..1.0e12),
        )),
        Kind::Integer => Value::Integer(random_integer_string(rng)),
        Kind::Decimal => {
            let mut s = random_integer_string(rng);
            if rng.random_bool(0.5) {
                let len = rng.random_range(1..=MAX_DIGITS / 2);
                s.push('.');
                s.push_str(&random_digits(rng, len));
            }
            Value::Decimal(s)
        }
        Kind::Bool => Value::Bool(rng.random()),
        Kind::Time => Value::Time(with_edges(rng, &[0, i64::MIN, i64::MAX], |r| r.random())),
        Kind::Duration => {
            Value::Duration(with_edges(rng, &[0, i64::MIN, i64::MAX], |r| r.random()))
        }
        Kind::Bech32Address => {
            let len = with_edges(rng, &[MIN_ADDRESS_LENGTH, MAX_ADDRESS_LENGTH], |r| {
                r.random_range(MIN_ADDRESS_LENGTH..=MAX_ADDRESS_LENGTH)
            });
            Value::Bech32Address(random_bytes(rng, len))
        }
        Kind::Enum => {
            let values = field
                .enum_definition
                .as_ref()
                .map_or(&[][..], |def| def.values.as_slice());
            let Some(value) = values.choose(rng) else {
                panic!("enum field {:?} has no values to draw from", field.name);
            };
            Value::Enum(value.as_str().to_owned())
        }
    }
}

fn with_edges<T: Copy, R: Rng + ?Sized>(
    rng: &mut R,
    edges: &[T],
    draw: impl FnOnce(&mut R) -> T,
) -> T {
    if rng.random_bool(EDGE_CASE_PROBABILITY) {
        if let Some(edge) = edges.choose(rng) {
            return *edge;
        }
    }
    draw(rng)
}

fn random_string<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.random_range(0..=MAX_STRING_LENGTH);
    (0..len)
        .map(|_| {
            // Mostly printable ASCII, sometimes any Unicode scalar value.
            if rng.random_bool(0.9) {
                char::from(rng.random_range(b' '..=b'~'))
            } else {
                rng.random::<char>()
            }
        })
        .collect()
}

fn random_bytes<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    rng.fill(bytes.as_mut_slice());
    bytes
}

fn random_digits<R: Rng + ?Sized>(rng: &mut R, len: usize) -> String {
    (0..len)
        .map(|_| char::from(rng.random_range(b'0'..=b'9')))
        .collect()
}

fn random_integer_string<R: Rng + ?Sized>(rng: &mut R) -> String {
    let len = rng.random_range(1..=MAX_DIGITS);
    let mut s = String::with_capacity(len + 1);
    if rng.random_bool(0.5) {
        s.push('-');
    }
    s.push_str(&random_digits(rng, len));
    s
}

/// Draw a name matching the schema name grammar.
pub fn random_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let rest = rng.random_range(0..MAX_GENERATED_NAME_LENGTH);
    let mut name = String::with_capacity(rest + 1);
    name.push(char::from(NAME_START_CHARS[rng.random_range(0..NAME_START_CHARS.len())]));
    for _ in 0..rest {
        name.push(char::from(NAME_CHARS[rng.random_range(0..NAME_CHARS.len())]));
    }
    name
}

/// Draw an enum definition with one to six distinct values.
pub fn random_enum_definition<R: Rng + ?Sized>(rng: &mut R) -> EnumDefinition {
    let name = random_name(rng);
    let target = rng.random_range(1..=6);
    let mut seen = HashSet::new();
    let mut values = Vec::with_capacity(target);
    while values.len() < target {
        let value = random_name(rng);
        if seen.insert(value.as_str().to_owned()) {
            values.push(value);
        }
    }
    EnumDefinition { name, values }
}

/// Draw a field definition: any valid kind, random nullability, and the
/// auxiliary data its kind requires.
pub fn random_field<R: Rng + ?Sized>(rng: &mut R) -> Field {
    let kind = Kind::ALL_VALID[rng.random_range(0..Kind::ALL_VALID.len())];
    let mut field = Field::new(random_name(rng), kind);
    field.nullable = rng.random();
    match kind {
        Kind::Enum => field.enum_definition = Some(random_enum_definition(rng)),
        Kind::Bech32Address => field.address_prefix = Some(random_name(rng)),
        _ => {}
    }
    field
}
