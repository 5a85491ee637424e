use crate::conf::{ServerConfig, load_config_or_default};
use crate::store::{LogStore, keys};
use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use std::fmt::Write;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterRow {
    pub severity: String,
    pub count: i64,
}

pub fn run(path: Option<PathBuf>, json: bool) -> Result<()> {
    let cfg = load_config_or_default(path.as_deref())?;
    let store = open_store(&cfg.server)?;
    let rows = read_counters(store.as_ref())?;

    if json {
        println!("{}", render_json(&rows)?);
    } else {
        print!("{}", render_pretty(&rows, io::stdout().is_terminal()));
    }

    Ok(())
}

#[cfg(feature = "redis")]
fn open_store(server: &ServerConfig) -> Result<Box<dyn LogStore>> {
    use anyhow::Context;

    let store = crate::store::RedisStore::open(&server.redis_url)
        .context("failed to connect store")?;
    Ok(Box::new(store))
}

#[cfg(not(feature = "redis"))]
fn open_store(_server: &ServerConfig) -> Result<Box<dyn LogStore>> {
    anyhow::bail!("logsplit was built without the `redis` feature")
}

/// Per-severity totals, highest first.
pub fn read_counters(store: &dyn LogStore) -> Result<Vec<CounterRow>> {
    let rows = store
        .counters(keys::COUNTER_KEY)?
        .into_iter()
        .map(|(severity, count)| CounterRow { severity, count })
        .collect();
    Ok(rows)
}

pub fn render_json(rows: &[CounterRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

pub fn render_pretty(rows: &[CounterRow], color: bool) -> String {
    let mut out = String::new();

    if rows.is_empty() {
        out.push_str("no events recorded\n");
        return out;
    }

    let width = rows
        .iter()
        .map(|r| r.severity.len())
        .max()
        .unwrap_or(0)
        .max("total".len());
    let total: i64 = rows.iter().map(|r| r.count).sum();

    for row in rows {
        let label = format!("{:<width$}", row.severity);
        let label = if color { paint(&row.severity, &label) } else { label };
        let _ = writeln!(out, "  {label}  {:>10}", row.count);
    }
    let _ = writeln!(out, "  {:<width$}  {:>10}", "total", total);

    out
}

fn paint(severity: &str, label: &str) -> String {
    match severity {
        "fatal" | "critical" | "error" => label.red().bold().to_string(),
        "warn" | "warning" => label.yellow().to_string(),
        "info" => label.green().to_string(),
        "debug" | "trace" => label.dimmed().to_string(),
        _ => label.to_string(),
    }
}
