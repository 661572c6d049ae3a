//! Schema-driven random generators.
//!
//! Every generator takes the random source as an argument, so a caller
//! that seeds a [`StdRng`](rand::rngs::StdRng) gets the same draws back
//! for the same seed. Generators assume their schema passed validation.

mod field;
mod object;

pub use field::{FieldValueGenerator, random_enum_definition, random_field, random_name};
pub use object::{
    KeyGenerator, ObjectUpdateGenerator, ValueUpdateGenerator, random_module_schema,
    random_object_type,
};
