//! What the user sees: styled text by default, one JSON object per line
//! with `--output json`.
//!
//! Chat replies on the stdio surface do not go through here; that surface
//! owns stdout.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value as JsonValue;

use crate::cli::OutputFormat;

static JSON_OUTPUT: AtomicBool = AtomicBool::new(false);

pub fn init(format: OutputFormat) {
    JSON_OUTPUT.store(matches!(format, OutputFormat::Json), Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_OUTPUT.load(Ordering::Relaxed)
}

#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
enum Level {
    Info,
    Success,
    Warning,
    Error,
    Data,
}

#[derive(Serialize)]
struct Envelope<'a> {
    level: Level,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a JsonValue>,
}

fn envelope(level: Level, message: &str, data: Option<&JsonValue>) -> String {
    serde_json::to_string(&Envelope {
        level,
        message,
        data,
    })
    .unwrap_or_else(|_| serde_json::json!({ "message": message }).to_string())
}

fn stdout_line(level: Level, message: &str, data: Option<&JsonValue>) {
    println!("{}", envelope(level, message, data));
}

fn stderr_line(level: Level, message: &str) {
    eprintln!("{}", envelope(level, message, None));
}

pub fn header(text: &str) {
    if is_json() {
        return stdout_line(Level::Info, text, None);
    }
    println!("{}", style(text).bold().cyan());
}

pub fn success(text: &str) {
    if is_json() {
        return stdout_line(Level::Success, text, None);
    }
    println!("{} {}", style("✓").green(), text);
}

/// stderr in both modes.
pub fn error(text: &str) {
    if is_json() {
        return stderr_line(Level::Error, text);
    }
    eprintln!("{} {}", style("error:").red().bold(), text);
}

/// stderr in both modes.
pub fn warning(text: &str) {
    if is_json() {
        return stderr_line(Level::Warning, text);
    }
    eprintln!("{} {}", style("warning:").yellow().bold(), text);
}

pub fn dim(text: &str) {
    if is_json() {
        return stdout_line(Level::Info, text, None);
    }
    println!("{}", style(text).dim());
}

pub fn data<T: Serialize>(label: &str, value: &T) {
    let value = serde_json::to_value(value).unwrap_or(JsonValue::Null);
    if is_json() {
        return stdout_line(Level::Data, label, Some(&value));
    }
    match serde_json::to_string_pretty(&value) {
        Ok(pretty) => println!("{pretty}"),
        Err(_) => println!("{label}: {value}"),
    }
}

pub fn kv(key: &str, value: &str) {
    if is_json() {
        return stdout_line(Level::Info, key, Some(&serde_json::json!({ key: value })));
    }
    println!("  {} {}", style(key).cyan().bold(), value);
}

pub fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn table_header(table: &mut Table, left: &str, right: &str) {
    let heading = |text: &str| Cell::new(text).fg(Color::Cyan).add_attribute(Attribute::Bold);
    table.set_header(vec![heading(left), heading(right)]);
}

pub fn table_row(table: &mut Table, name: &str, value: &str) {
    table.add_row(vec![Cell::new(name).fg(Color::Green), Cell::new(value)]);
}

/// In JSON mode the rows become one object instead.
pub fn table_print(table: &Table, rows: &[(&str, String)]) {
    if is_json() {
        let object: serde_json::Map<String, JsonValue> = rows
            .iter()
            .map(|(name, value)| (name.to_string(), JsonValue::from(value.as_str())))
            .collect();
        return stdout_line(Level::Data, "", Some(&JsonValue::Object(object)));
    }
    println!("{table}");
}

/// Spinner on stderr; hidden in JSON mode.
pub fn spinner(message: &str) -> ProgressBar {
    if is_json() {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

pub fn spinner_done(spinner: &ProgressBar) {
    spinner.finish_and_clear();
}
