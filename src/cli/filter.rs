//! `explorer filter` - build and inspect filter tokens.
//!
//! ```bash
//! explorer filter encode status=true owner=ann --contains owner --ref owner=UserEntity.login
//! # ::status:true::owner:%ann%{UserEntity.login}
//!
//! explorer filter encode --range due=2024-01-01T00:00:00Z..2024-02-01T00:00:00Z
//! explorer filter decode '::status:true::owner:%ann%{UserEntity.login}'
//! ```

use anyhow::{Context, Result, bail};
use chrono::DateTime;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::core::ExplorerError;
use crate::filter::{self, FilterKind, FilterMap, FilterValue, ReferencePointer};

/// Encode and decode filter tokens.
#[derive(Args)]
pub struct FilterCommand {
    #[command(subcommand)]
    command: FilterSubcommands,
}

#[derive(Subcommand)]
enum FilterSubcommands {
    /// Build a token from `name=value` clauses
    Encode {
        /// Clauses in `name=value` form
        #[arg(value_name = "NAME=VALUE")]
        clauses: Vec<String>,

        /// Substring match for the named clauses
        #[arg(long, value_name = "NAME")]
        contains: Vec<String>,

        /// Date range clause `name=FROM..TO` (epoch ms or RFC 3339)
        #[arg(long, value_name = "NAME=FROM..TO")]
        range: Vec<String>,

        /// Compare a clause against a referenced field, `name=Entity.property`
        #[arg(long = "ref", value_name = "NAME=ENTITY.PROPERTY")]
        references: Vec<String>,
    },

    /// Print the clauses of a token
    Decode {
        /// Filter token
        token: String,

        /// Fail on malformed clauses instead of skipping them
        #[arg(long)]
        strict: bool,

        /// Print the decoded mapping as JSON
        #[arg(long)]
        json: bool,
    },
}

impl FilterCommand {
    pub fn execute(self) -> Result<()> {
        match self.command {
            FilterSubcommands::Encode {
                clauses,
                contains,
                range,
                references,
            } => {
                let map = build_map(&clauses, &contains, &range, &references)?;
                let token = filter::serialize(&map).map_err(ExplorerError::from)?;
                println!("{token}");
                Ok(())
            }
            FilterSubcommands::Decode {
                token,
                strict,
                json,
            } => decode(&token, strict, json),
        }
    }
}

fn split_pair<'a>(pair: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    pair.split_once('=')
        .with_context(|| format!("Expected {what} in NAME=VALUE form, got '{pair}'"))
}

fn parse_instant(raw: &str) -> Result<i64> {
    if let Ok(millis) = raw.parse::<i64>() {
        return Ok(millis);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.timestamp_millis())
        .with_context(|| format!("'{raw}' is neither epoch milliseconds nor an RFC 3339 timestamp"))
}

/// Assemble the mapping in argument order: plain clauses, then ranges.
fn build_map(clauses: &[String], contains: &[String], ranges: &[String], references: &[String]) -> Result<FilterMap> {
    let mut values: Vec<(String, FilterValue)> = Vec::new();

    for clause in clauses {
        let (name, value) = split_pair(clause, "clause")?;
        let value = if contains.iter().any(|c| c == name) {
            FilterValue::contains(value)
        } else {
            FilterValue::exact(value)
        };
        values.push((name.to_string(), value));
    }

    for range in ranges {
        let (name, bounds) = split_pair(range, "range")?;
        let (from, to) = bounds
            .split_once("..")
            .with_context(|| format!("Expected FROM..TO bounds for '{name}', got '{bounds}'"))?;
        values.push((name.to_string(), FilterValue::date_range(parse_instant(from)?, parse_instant(to)?)));
    }

    if let Some(name) = contains.iter().find(|name| !values.iter().any(|(n, _)| n == *name)) {
        bail!("--contains {name} does not name a clause");
    }

    for reference in references {
        let (name, pointer) = split_pair(reference, "reference")?;
        let pointer = ReferencePointer::parse(pointer).map_err(ExplorerError::from)?;
        let Some((_, value)) = values.iter_mut().find(|(n, _)| n == name) else {
            bail!("--ref {name} does not name a clause");
        };
        *value = value.clone().with_reference(pointer.entity, pointer.property);
    }

    let mut map = FilterMap::new();
    for (name, value) in &values {
        map.set_value(name.as_str(), value);
    }
    Ok(map)
}

fn describe(value: &FilterValue) -> String {
    let mut text = match &value.kind {
        FilterKind::Exact(text) => format!("equals '{text}'"),
        FilterKind::Contains(text) => format!("contains '{text}'"),
        FilterKind::DateRange { from, to } => match value.bounds() {
            Some((from, to)) => format!("between {} and {}", from.to_rfc3339(), to.to_rfc3339()),
            None => format!("between {from} and {to} (epoch ms)"),
        },
    };
    if let Some(pointer) = &value.reference {
        text.push_str(&format!(" on {pointer}"));
    }
    text
}

fn decode(token: &str, strict: bool, json: bool) -> Result<()> {
    let map = if strict {
        filter::parse_strict(token).map_err(ExplorerError::from)?
    } else {
        let parsed = filter::parse(token);
        for diagnostic in &parsed.diagnostics {
            eprintln!("{}: {diagnostic}", "warning".yellow());
        }
        parsed.entries
    };

    if json {
        let object: serde_json::Map<String, serde_json::Value> =
            map.iter().map(|(name, raw)| (name.to_string(), raw.into())).collect();
        println!("{}", serde_json::to_string_pretty(&object)?);
        return Ok(());
    }

    if map.is_empty() {
        println!("No filter clauses.");
        return Ok(());
    }

    for (name, raw) in map.iter() {
        let (value, diagnostic) = FilterValue::decode_lenient(raw);
        println!("{}: {}", name.bold(), describe(&value));
        if let Some(diagnostic) = diagnostic {
            eprintln!("{}: {diagnostic}", "warning".yellow());
        }
    }
    Ok(())
}
