//! Row-returning commands: select, aggregate and raw SQL

use anyhow::{Context, Result};
use clap::Args;
use sqrl::{Aggregate, Order, SelectQuery, Value};
use std::path::Path;

use crate::GlobalArgs;

/// Arguments of the select command, one per clause of the statement
#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// Table name
    pub table: String,

    /// Columns to return (comma-separated, default: all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Only distinct rows
    #[arg(long)]
    pub distinct: bool,

    /// WHERE clause
    #[arg(long = "where")]
    pub filter: Option<String>,

    /// Column to order by
    #[arg(long)]
    pub order_by: Option<String>,

    /// Order descending instead of ascending
    #[arg(long, requires = "order_by")]
    pub desc: bool,

    /// GROUP BY clause
    #[arg(long)]
    pub group_by: Option<String>,

    /// HAVING clause
    #[arg(long, requires = "group_by")]
    pub having: Option<String>,

    /// Maximum rows (default: no limit)
    #[arg(long, default_value = "-1", allow_negative_numbers = true)]
    pub limit: i64,

    /// Rows to skip
    #[arg(long, default_value = "0")]
    pub offset: i64,

    /// Output results as JSON
    #[arg(short, long)]
    pub json: bool,
}

impl SelectArgs {
    pub fn to_query(&self) -> SelectQuery {
        let mut query = SelectQuery::from(self.table.clone())
            .columns(self.columns.iter().cloned())
            .distinct(self.distinct)
            .limit(self.limit)
            .offset(self.offset);

        if let Some(filter) = &self.filter {
            query = query.filter(filter.as_str());
        }
        if let Some(column) = &self.order_by {
            let order = if self.desc { Order::Desc } else { Order::Asc };
            query = query.order_by(column.clone(), order);
        }
        if let Some(group_by) = &self.group_by {
            query = query.group_by(group_by.clone());
        }
        if let Some(having) = &self.having {
            query = query.having(having.clone());
        }
        query
    }
}

pub fn select(db: &Path, args: &SelectArgs, global: &GlobalArgs) -> Result<()> {
    let db = super::open(db, global)?;
    let rows = db.select(&args.to_query())?;
    super::print_rows(&rows, args.json)
}

pub fn aggregate(
    db: &Path,
    table: &str,
    function: &str,
    column: Option<&str>,
    precision: u32,
    global: &GlobalArgs,
) -> Result<()> {
    let db = super::open(db, global)?;

    let value = match function.parse::<Aggregate>()? {
        Aggregate::Count => Value::Integer(db.count(table, column)?),
        Aggregate::Avg => {
            let column = column.context("avg needs a column")?;
            db.avg(table, column, precision)?
                .map(Value::Real)
                .unwrap_or(Value::Null)
        }
        agg => {
            let column = column.with_context(|| format!("{} needs a column", agg))?;
            db.aggregate(table, column, agg)?
        }
    };

    match value {
        Value::Null => println!("NULL"),
        other => println!("{}", sqrl::export::csv_cell(&other)),
    }
    Ok(())
}

/// Run a script given inline or as `@path`
pub fn exec(db: &Path, sql: &str, global: &GlobalArgs) -> Result<()> {
    let script = match sql.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read SQL file: {}", path))?,
        None => sql.to_string(),
    };

    let db = super::open(db, global)?;
    db.execute_script(&script)?;
    Ok(())
}
