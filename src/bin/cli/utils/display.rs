//! Display and output utilities for CLI commands
//!
//! Supports both text and JSON output formats.

use std::io::{self, Write};

/// Format a record rate as a human-readable string
pub fn format_rate(per_sec: f64) -> String {
    if per_sec >= 1_000_000.0 {
        format!("{:.2} M rec/s", per_sec / 1_000_000.0)
    } else if per_sec >= 1_000.0 {
        format!("{:.2} K rec/s", per_sec / 1_000.0)
    } else {
        format!("{:.0} rec/s", per_sec)
    }
}

/// Format duration in human-readable form
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 0.001 {
        format!("{:.0} μs", duration.as_micros())
    } else if secs < 1.0 {
        format!("{:.1} ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{:.2} s", secs)
    } else {
        format!("{:.1} min", secs / 60.0)
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("[OK] {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("[ERROR] {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("[WARN] {}", message);
}

/// Print a progress indicator (inline, no newline)
pub fn print_progress(message: &str) {
    print!("{}... ", message);
    io::stdout().flush().ok();
}

/// Print a section header
pub fn print_header(title: &str) {
    println!("\n=== {} ===", title);
}

/// Render a `count / total` share as a fixed-width bar
pub fn share_bar(count: u64, total: u64, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        ((count as f64 / total as f64) * width as f64).round() as usize
    };
    format!("{}{}", "#".repeat(filled.min(width)), ".".repeat(width - filled.min(width)))
}

// ============================================================================
// JSON Output Support
// ============================================================================

/// JSON output builder for structured CLI output
#[derive(Debug, Clone, Default)]
pub struct JsonOutput {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_str(&mut self, key: &str, value: &str) -> &mut Self {
        self.fields
            .insert(key.to_string(), serde_json::Value::String(value.to_string()));
        self
    }

    pub fn add_uint(&mut self, key: &str, value: u64) -> &mut Self {
        self.fields.insert(
            key.to_string(),
            serde_json::Value::Number(serde_json::Number::from(value)),
        );
        self
    }

    pub fn add_bool(&mut self, key: &str, value: bool) -> &mut Self {
        self.fields.insert(key.to_string(), serde_json::Value::Bool(value));
        self
    }

    pub fn add_string_array(&mut self, key: &str, values: &[String]) -> &mut Self {
        let array: Vec<serde_json::Value> = values
            .iter()
            .map(|s| serde_json::Value::String(s.clone()))
            .collect();
        self.fields.insert(key.to_string(), serde_json::Value::Array(array));
        self
    }

    /// Add any serializable value; values that fail to serialize are skipped
    pub fn add_value<T: serde::Serialize>(&mut self, key: &str, value: &T) -> &mut Self {
        if let Ok(value) = serde_json::to_value(value) {
            self.fields.insert(key.to_string(), value);
        }
        self
    }

    /// Set the status field (common for all responses)
    pub fn status(&mut self, success: bool) -> &mut Self {
        self.add_str("status", if success { "success" } else { "error" })
    }

    pub fn error(&mut self, message: &str) -> &mut Self {
        self.add_str("status", "error");
        self.add_str("error", message)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&serde_json::Value::Object(self.fields.clone()))
            .unwrap_or_else(|_| "{}".to_string())
    }

    pub fn print(&self) {
        println!("{}", self.to_json());
    }
}

/// Create an error JSON response
pub fn json_error(message: &str) -> JsonOutput {
    let mut output = JsonOutput::new();
    output.error(message);
    output
}
