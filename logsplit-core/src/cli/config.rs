use crate::conf::{RuntimeConfig, TriggerOptions, load_config_or_default};
use anyhow::Result;
use std::fmt::Write;
use std::path::PathBuf;

pub fn check(path: Option<PathBuf>) -> Result<()> {
    let cfg = load_config_or_default(path.as_deref())?;
    print!("{}", check_report(&cfg)?);
    Ok(())
}

/// Resolve the trigger options the way registration would and describe the
/// result. Fails on the same option type errors registration fails on.
pub fn check_report(cfg: &RuntimeConfig) -> Result<String> {
    let options = TriggerOptions::resolve(cfg.options())?;
    let trigger = &cfg.trigger;
    let mut out = String::new();

    writeln!(out, "✔ Config loaded successfully")?;
    writeln!(
        out,
        "✔ consuming '{}' as '{}'",
        options.stream_name, options.consumer_name
    )?;
    writeln!(out, "✔ archiving under '{}'", options.log_prefix)?;
    writeln!(
        out,
        "✔ window {}, trimmed {}, dedupe {}",
        trigger.window, trigger.trimmed, trigger.dedupe
    )?;
    writeln!(
        out,
        "✔ severity streams capped at ~{} entries",
        trigger.max_stream_len
    )?;
    if let Some(key) = &cfg.server.control_key {
        writeln!(out, "✔ pause switch on key '{key}'")?;
    }

    Ok(out)
}
