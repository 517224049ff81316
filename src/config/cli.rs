use crate::domain::model::VariantId;
use crate::utils::error::{CartError, Result};
use clap::Parser;
use std::str::FromStr;

#[derive(Debug, Clone, Parser)]
#[command(name = "cart-bundle")]
#[command(about = "Replay cart operations against the bundle reconciliation engine")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "cart-bundle.toml")]
    pub config: String,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,

    /// add:<variant>:<qty> | update:<variant>:<qty> | remove:<variant> | clear | draft
    #[arg(value_name = "OPERATION")]
    pub operations: Vec<String>,
}

impl CliConfig {
    pub fn parsed_operations(&self) -> Result<Vec<Operation>> {
        self.operations.iter().map(|op| op.parse()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Add { variant_id: VariantId, quantity: i64 },
    Update { variant_id: VariantId, quantity: i64 },
    Remove { variant_id: VariantId },
    Clear,
    Draft,
}

impl FromStr for Operation {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();

        match parts.as_slice() {
            ["add", variant, quantity] => Ok(Operation::Add {
                variant_id: parse_variant(s, variant)?,
                quantity: parse_quantity(s, quantity)?,
            }),
            ["update", variant, quantity] => Ok(Operation::Update {
                variant_id: parse_variant(s, variant)?,
                quantity: parse_quantity(s, quantity)?,
            }),
            ["remove", variant] => Ok(Operation::Remove {
                variant_id: parse_variant(s, variant)?,
            }),
            ["clear"] => Ok(Operation::Clear),
            ["draft"] => Ok(Operation::Draft),
            _ => Err(invalid(s, "Unknown operation")),
        }
    }
}

fn parse_variant(op: &str, value: &str) -> Result<VariantId> {
    value
        .parse::<u64>()
        .map(VariantId)
        .map_err(|e| invalid(op, &format!("Invalid variant id: {}", e)))
}

fn parse_quantity(op: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|e| invalid(op, &format!("Invalid quantity: {}", e)))
}

fn invalid(op: &str, reason: &str) -> CartError {
    CartError::InvalidConfigValueError {
        field: "operations".to_string(),
        value: op.to_string(),
        reason: reason.to_string(),
    }
}
