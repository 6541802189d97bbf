//! Output formatting: table, JSON, YAML.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`
//! for lists and a hand-written detail block for single items; structured
//! formats use serde.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use crate::cli::OutputFormat;
use crate::error::CliError;

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use the
/// `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Single-line JSON, one document per line.
pub(crate) fn render_json_line<T: serde::Serialize + ?Sized>(
    data: &T,
) -> Result<String, CliError> {
    Ok(serde_json::to_string(data)?)
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

// ── Value formatting ─────────────────────────────────────────────────

/// `21.5°C`, or `-` when unknown.
pub fn temp(value: Option<f32>) -> String {
    value.map_or_else(|| "-".into(), |v| format!("{v:.1}°C"))
}

pub fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".into(), |v| v.to_string())
}

pub fn on_off(value: Option<bool>) -> String {
    match value {
        Some(true) => "on".into(),
        Some(false) => "off".into(),
        None => "-".into(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn formats_values() {
        assert_eq!(temp(Some(21.0)), "21.0°C");
        assert_eq!(temp(None), "-");
        assert_eq!(on_off(Some(true)), "on");
        assert_eq!(or_dash(None::<u8>), "-");
    }

    #[test]
    fn structured_formats_ignore_detail_fn() {
        let json = render_single(OutputFormat::Json, &[1, 2], |_| "table".into()).unwrap();
        assert!(json.contains('1'));
        let table = render_single(OutputFormat::Table, &[1, 2], |_| "table".into()).unwrap();
        assert_eq!(table, "table");
    }
}
