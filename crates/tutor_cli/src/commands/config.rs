//! `tutor config` subcommands.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use tutor_runtime::config::API_KEY_ENV;
use tutor_runtime::RuntimeConfig;

use crate::cli::ConfigAction;
use crate::output;

pub async fn handle(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Api => configure_api(),
        ConfigAction::Show => show(),
    }
}

fn configure_api() -> Result<()> {
    output::header("Configure OpenAI");
    println!("  Used for every tutor reply (chat completions).");
    println!();

    let current = RuntimeConfig::from_env_without_key()?;
    if current.has_api_key() {
        println!("  Current: {}", current.masked_api_key());
        println!();
    }

    let key = prompt_api_key()?;
    if key.is_empty() {
        output::warning("Nothing saved.");
        return Ok(());
    }

    let config_path = global_env_file()?;
    save_api_key(&config_path, API_KEY_ENV, &key)?;

    output::success(&format!("Saved {} to {}", API_KEY_ENV, config_path.display()));
    output::dim("It is picked up the next time tutor starts.");

    Ok(())
}

fn show() -> Result<()> {
    let config = RuntimeConfig::from_env_without_key()?;
    let key = if config.has_api_key() {
        config.masked_api_key()
    } else {
        "(not set)".to_string()
    };

    let rows: Vec<(&str, String)> = vec![
        (API_KEY_ENV, key),
        (
            "base_url",
            config
                .base_url
                .clone()
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        ),
        ("model", config.model.clone()),
        ("temperature", config.temperature.to_string()),
        (
            "request_timeout",
            format!("{}s", config.request_timeout.as_secs()),
        ),
        ("interpreter", config.interpreter.clone()),
        (
            "capture_timeout",
            config
                .capture_timeout
                .map_or_else(|| "none".to_string(), |d| format!("{}s", d.as_secs())),
        ),
    ];

    let mut table = output::table();
    output::table_header(&mut table, "Setting", "Value");
    for (name, value) in &rows {
        output::table_row(&mut table, name, value);
    }
    output::table_print(&table, &rows);

    Ok(())
}

/// Leaves raw mode when dropped, including on early returns.
struct RawMode;

impl RawMode {
    fn enable() -> io::Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

/// Read a line without echoing it, printing `*` per character.
/// Ctrl-C or Esc yields an empty string.
fn prompt_api_key() -> Result<String> {
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

    println!("Paste your OpenAI API key and press Enter:");
    let mut stdout = io::stdout();
    write!(stdout, "{} ", console::style(">").cyan().bold())?;
    stdout.flush()?;

    let mut typed = String::new();
    let _raw = RawMode::enable()?;

    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind == KeyEventKind::Release {
            continue;
        }
        match key.code {
            KeyCode::Enter => break,
            KeyCode::Esc => {
                typed.clear();
                break;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                typed.clear();
                break;
            }
            KeyCode::Char(c) => {
                typed.push(c);
                write!(stdout, "*")?;
            }
            KeyCode::Backspace => {
                if typed.pop().is_some() {
                    write!(stdout, "\x08 \x08")?;
                }
            }
            _ => continue,
        }
        stdout.flush()?;
    }

    // raw mode needs an explicit carriage return
    write!(stdout, "\r\n")?;
    stdout.flush()?;
    Ok(typed.trim().to_string())
}

fn global_env_file() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
    let dir = home.join(".tutor");
    fs::create_dir_all(&dir)?;
    Ok(dir.join("env"))
}

fn save_api_key(path: &Path, env_var: &str, key: &str) -> Result<()> {
    let existing = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e.into()),
    };
    fs::write(path, upsert_export(&existing, env_var, key))?;
    Ok(())
}

/// Rewrite an env file with `name` set to `value`. Other `export` lines are
/// kept (sorted); comments and anything else are replaced by the header.
fn upsert_export(existing: &str, name: &str, value: &str) -> String {
    let mut entries: BTreeMap<&str, String> = existing
        .lines()
        .filter_map(|line| line.trim().strip_prefix("export "))
        .filter_map(|assignment| assignment.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim().to_string()))
        .collect();
    entries.insert(name, format!("{:?}", value));

    let mut out = String::from(
        "# tutor configuration\n# Read at startup; values already in the environment win.\n\n",
    );
    for (k, v) in entries {
        out.push_str(&format!("export {k}={v}\n"));
    }
    out
}
