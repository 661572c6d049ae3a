/// Default upper bound on the number of updates drawn per simulated block.
pub const DEFAULT_MAX_UPDATES_PER_BLOCK: usize = 100;

/// Shortest byte length accepted for a `Bech32Address` value.
pub const MIN_ADDRESS_LENGTH: usize = 20;

/// Longest byte length accepted for a `Bech32Address` value.
pub const MAX_ADDRESS_LENGTH: usize = 64;

/// Longest name accepted for types, fields, enums and enum values.
pub const MAX_NAME_LENGTH: usize = 64;
