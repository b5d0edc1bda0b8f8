//! Text output formatting with colors.

use chrono::Local;
use serde_json::Value;

use super::json::StatusOutput;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats the session status block.
    pub fn format_status(&self, status: &StatusOutput) -> String {
        let mut lines = Vec::new();

        lines.push(self.bold("SmartHire Session"));
        lines.push("─".repeat(40));

        let state = if status.authenticated {
            self.green("✓ Logged in")
        } else if status.has_access_token {
            self.yellow("! Access token expired")
        } else {
            self.red("✗ Not logged in")
        };
        lines.push(format!("Status:   {state}"));

        if let Some(user) = format_user(status) {
            lines.push(format!("User:     {user}"));
        }

        if let Some(expires_at) = status.expires_at {
            let local = expires_at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
            let when = match status.expires_in_secs {
                Some(secs) => format!("{} ({local})", format_remaining(secs)),
                None => format!("expired ({local})"),
            };
            lines.push(format!("Expires:  {when}"));
        }

        let refresh = if status.has_refresh_token {
            "available"
        } else {
            "none"
        };
        lines.push(format!("Refresh:  {refresh}"));
        lines.push(self.dim(&format!("App:      {}", status.app)));
        lines.push(self.dim(&format!("Backend:  {}", status.base_url)));

        lines.join("\n")
    }

    /// Formats an API response payload.
    pub fn format_value(&self, value: &Value) -> String {
        match value {
            Value::Null => self.dim("(no data)"),
            Value::String(s) => s.clone(),
            other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
        }
    }

    /// Formats a success line.
    pub fn format_success(&self, message: &str) -> String {
        format!("{} {message}", self.green("✓"))
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }
}

fn format_user(status: &StatusOutput) -> Option<String> {
    let name = status.username.as_deref()?;
    let mut details = Vec::new();
    if let Some(user_type) = &status.user_type {
        details.push(user_type.clone());
    }
    if let Some(id) = status.user_id {
        details.push(format!("id {id}"));
    }

    if details.is_empty() {
        Some(name.to_string())
    } else {
        Some(format!("{name} ({})", details.join(", ")))
    }
}

/// Formats a number of seconds as a short countdown.
pub fn format_remaining(secs: i64) -> String {
    if secs < 60 {
        return format!("in {secs}s");
    }

    let hours = secs / 3600;
    let mins = (secs % 3600) / 60;
    match (hours, mins) {
        (0, m) => format!("in {m}m"),
        (h, 0) => format!("in {h}h"),
        (h, m) => format!("in {h}h {m}m"),
    }
}
