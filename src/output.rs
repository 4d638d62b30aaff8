//! Output context: every command renders either text or one JSON document.
//!
//! JSON documents are written one per line so a piped session can be read
//! back as JSON Lines.

use std::io::{self, Write};

use serde::Serialize;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OutputContext {
    mode: OutputMode,
}

impl OutputContext {
    #[must_use]
    pub const fn new(json: bool) -> Self {
        Self {
            mode: if json { OutputMode::Json } else { OutputMode::Text },
        }
    }

    #[must_use]
    pub const fn mode(&self) -> OutputMode {
        self.mode
    }

    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.mode, OutputMode::Json)
    }

    /// Write `value` as a single JSON line.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn json<T: Serialize + ?Sized>(&self, out: &mut dyn Write, value: &T) -> io::Result<()> {
        serde_json::to_writer(&mut *out, value)?;
        writeln!(out)
    }

    /// Render `value` as JSON in JSON mode, otherwise run `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn emit<T, F>(&self, out: &mut dyn Write, value: &T, text: F) -> io::Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        if self.is_json() {
            self.json(out, value)
        } else {
            text(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_emit_text_mode_runs_closure() {
        let ctx = OutputContext::new(false);
        let mut buf = Vec::new();
        ctx.emit(&mut buf, &json!({"a": 1}), |out| writeln!(out, "plain"))
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "plain\n");
    }

    #[test]
    fn test_emit_json_mode_writes_one_line() {
        let ctx = OutputContext::new(true);
        let mut buf = Vec::new();
        ctx.emit(&mut buf, &json!({"a": 1}), |out| writeln!(out, "plain"))
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "{\"a\":1}\n");
        assert_eq!(ctx.mode(), OutputMode::Json);
    }
}
