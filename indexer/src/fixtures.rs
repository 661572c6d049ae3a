//! Example schemas modelled on a small chain application.
//!
//! [`example_app_schema`] uses every valid [`Kind`] at least once,
//! including a unit-keyed parameters object, composite keys, nullable
//! values, an enum shared between object types and a standalone enum.

use crate::types::{AppSchema, EnumDefinition, Field, Kind, ModuleSchema, ObjectType};

const ACCOUNT_PREFIX: &str = "cosmos";
const VALIDATOR_PREFIX: &str = "cosmosvaloper";

fn bond_status() -> EnumDefinition {
    EnumDefinition::new("bond_status", ["bonded", "unbonding", "unbonded"])
}

fn vote_option() -> EnumDefinition {
    EnumDefinition::new("vote_option", ["yes", "abstain", "no", "no_with_veto"])
}

fn proposal_status() -> EnumDefinition {
    EnumDefinition::new(
        "proposal_status",
        ["deposit_period", "voting_period", "passed", "rejected", "failed"],
    )
}

fn bank() -> ModuleSchema {
    ModuleSchema::from_object_types([
        ObjectType::new(
            "balance",
            vec![
                Field::new_address("address", ACCOUNT_PREFIX),
                Field::new("denom", Kind::String),
            ],
            vec![Field::new("amount", Kind::Integer)],
        ),
        ObjectType::new(
            "supply",
            vec![Field::new("denom", Kind::String)],
            vec![Field::new("amount", Kind::Integer)],
        ),
        ObjectType::new(
            "params",
            vec![],
            vec![
                Field::new("default_send_enabled", Kind::Bool),
                Field::new("max_memo_characters", Kind::Uint16).nullable(),
            ],
        ),
    ])
}

fn staking() -> ModuleSchema {
    ModuleSchema::from_object_types([
        ObjectType::new(
            "validator",
            vec![Field::new_address("operator", VALIDATOR_PREFIX)],
            vec![
                Field::new("moniker", Kind::String),
                Field::new("tokens", Kind::Integer),
                Field::new("commission_rate", Kind::Decimal),
                Field::new("jailed", Kind::Bool),
                Field::new_enum("status", bond_status()),
                Field::new("unbonding_time", Kind::Time).nullable(),
                Field::new("consensus_pubkey", Kind::Bytes),
            ],
        ),
        ObjectType::new(
            "delegation",
            vec![
                Field::new_address("delegator", ACCOUNT_PREFIX),
                Field::new_address("validator", VALIDATOR_PREFIX),
            ],
            vec![Field::new("shares", Kind::Decimal)],
        ),
        ObjectType::new(
            "validator_signing_info",
            vec![Field::new_address("operator", VALIDATOR_PREFIX)],
            vec![
                Field::new("start_height", Kind::Int64),
                Field::new("missed_blocks", Kind::Uint32),
                Field::new("index_offset", Kind::Int32),
            ],
        ),
    ])
    .with_enum(bond_status())
}

fn gov() -> ModuleSchema {
    ModuleSchema::from_object_types([
        ObjectType::new(
            "proposal",
            vec![Field::new("id", Kind::Uint64)],
            vec![
                Field::new("title", Kind::String),
                Field::new("metadata", Kind::Bytes).nullable(),
                Field::new_enum("status", proposal_status()),
                Field::new("submit_time", Kind::Time),
                Field::new("voting_period", Kind::Duration),
                Field::new_enum("final_tally_leader", vote_option()).nullable(),
            ],
        ),
        ObjectType::new(
            "vote",
            vec![
                Field::new("proposal_id", Kind::Uint64),
                Field::new_address("voter", ACCOUNT_PREFIX),
            ],
            vec![
                Field::new_enum("option", vote_option()),
                Field::new("weight", Kind::Float64),
            ],
        ),
    ])
    .with_enum(vote_option())
}

fn mint() -> ModuleSchema {
    ModuleSchema::from_object_types([
        ObjectType::new(
            "minter",
            vec![],
            vec![
                Field::new("inflation", Kind::Float32),
                Field::new("annual_provisions", Kind::Decimal),
            ],
        ),
        ObjectType::new(
            "epoch_info",
            vec![Field::new("identifier", Kind::String)],
            vec![
                Field::new("current_epoch", Kind::Int64),
                Field::new("duration", Kind::Duration),
                Field::new("reduction_factor", Kind::Int8),
                Field::new("decimals", Kind::Uint8),
                Field::new("skew", Kind::Int16).nullable(),
                Field::new("counting_started", Kind::Bool),
            ],
        ),
        ObjectType::new("halted", vec![Field::new("height", Kind::Uint64)], vec![]),
    ])
}

/// An app with `bank`, `gov`, `mint` and `staking` modules.
#[must_use]
pub fn example_app_schema() -> AppSchema {
    AppSchema::from([
        ("bank".to_owned(), bank()),
        ("gov".to_owned(), gov()),
        ("mint".to_owned(), mint()),
        ("staking".to_owned(), staking()),
    ])
}

/// A single `bank` module holding `balance` objects keyed by address.
#[must_use]
pub fn bank_balance_schema() -> AppSchema {
    let balance = ObjectType::new(
        "balance",
        vec![Field::new_address("addr", ACCOUNT_PREFIX)],
        vec![Field::new("amount", Kind::Uint64)],
    );
    AppSchema::from([("bank".to_owned(), ModuleSchema::from_object_types([balance]))])
}
