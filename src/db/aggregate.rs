//! Aggregate functions over a single column

use anyhow::Result;
use std::fmt;

use super::row::Value;
use super::sqlite::Database;

/// SQL aggregate function applied by [`Database::aggregate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    Count,
    Sum,
    Avg,
    Min,
    Max,
    /// Any other aggregate, e.g. `TOTAL` or `GROUP_CONCAT`
    Custom(String),
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Count => write!(f, "COUNT"),
            Aggregate::Sum => write!(f, "SUM"),
            Aggregate::Avg => write!(f, "AVG"),
            Aggregate::Min => write!(f, "MIN"),
            Aggregate::Max => write!(f, "MAX"),
            Aggregate::Custom(name) => write!(f, "{}", name),
        }
    }
}

impl std::str::FromStr for Aggregate {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_uppercase().as_str() {
            "COUNT" => Aggregate::Count,
            "SUM" => Aggregate::Sum,
            "AVG" => Aggregate::Avg,
            "MIN" => Aggregate::Min,
            "MAX" => Aggregate::Max,
            other => Aggregate::Custom(other.to_string()),
        })
    }
}

/// Largest precision that still changes an `f64`
const MAX_PRECISION: u32 = 15;

/// Round to `precision` decimal places, ties to even
pub fn round_to(value: f64, precision: u32) -> f64 {
    if precision > MAX_PRECISION {
        return value;
    }
    let factor = 10f64.powi(precision as i32);
    (value * factor).round_ties_even() / factor
}

fn as_f64(value: Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(i as f64),
        Value::Real(f) => Some(f),
        _ => None,
    }
}

impl Database {
    /// `SELECT <agg>(<column>) FROM <table>`; `Value::Null` for empty tables
    pub fn aggregate(&self, table: &str, column: &str, agg: Aggregate) -> Result<Value> {
        let sql = format!("SELECT {}({}) FROM {};", agg, column, table);
        Ok(self.fetch_first_value(&sql, &[])?.unwrap_or(Value::Null))
    }

    /// Number of rows, or of non-null values when a column is given
    pub fn count(&self, table: &str, column: Option<&str>) -> Result<i64> {
        match self.aggregate(table, column.unwrap_or("*"), Aggregate::Count)? {
            Value::Integer(n) => Ok(n),
            other => anyhow::bail!("COUNT on {} returned {:?}", table, other),
        }
    }

    /// Sum of a column, `None` when there are no non-null values
    pub fn sum(&self, table: &str, column: &str) -> Result<Option<f64>> {
        Ok(as_f64(self.aggregate(table, column, Aggregate::Sum)?))
    }

    /// Average of a column rounded to `precision` decimal places
    pub fn avg(&self, table: &str, column: &str, precision: u32) -> Result<Option<f64>> {
        let avg = as_f64(self.aggregate(table, column, Aggregate::Avg)?);
        Ok(avg.map(|a| round_to(a, precision)))
    }

    pub fn min(&self, table: &str, column: &str) -> Result<Value> {
        self.aggregate(table, column, Aggregate::Min)
    }

    pub fn max(&self, table: &str, column: &str) -> Result<Value> {
        self.aggregate(table, column, Aggregate::Max)
    }
}
