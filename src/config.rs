//! Writer configuration (spec §6 "Recognized configuration options").
//!
//! Mirrors the teacher's builder-method configuration style
//! (`Emitter::with_indent`, `with_width`, `with_canonical`, ...) but as a
//! plain struct so it can also be deserialized from a config file via
//! `serde`, the way a host application would load it alongside its other
//! settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WriterConfig {
    /// Insert newline + indent between sibling values and before closers.
    pub pretty_print: bool,
    /// Indent with `'\t'` x depth; else with spaces x (depth * indent_size).
    pub indent_with_tabs: bool,
    /// Spaces per level when not using tabs.
    pub indent_size: u32,
    /// Force full (non-UTF-8-preserving) escaping on strings/symbols in Ion mode.
    pub escape_all_non_ascii: bool,
    /// Restrict output to the JSON subset.
    pub json_downconvert: bool,
    /// Flush the sink after each value and after each container open.
    pub flush_every_value: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            pretty_print: false,
            indent_with_tabs: false,
            indent_size: 2,
            escape_all_non_ascii: false,
            json_downconvert: false,
            flush_every_value: false,
        }
    }
}

impl WriterConfig {
    pub fn pretty() -> Self {
        Self {
            pretty_print: true,
            ..Self::default()
        }
    }

    pub fn json_downconvert() -> Self {
        Self {
            json_downconvert: true,
            ..Self::default()
        }
    }

    pub fn with_indent_size(mut self, size: u32) -> Self {
        self.indent_size = size;
        self
    }

    pub fn with_indent_with_tabs(mut self, tabs: bool) -> Self {
        self.indent_with_tabs = tabs;
        self
    }

    pub fn with_escape_all_non_ascii(mut self, escape_all: bool) -> Self {
        self.escape_all_non_ascii = escape_all;
        self
    }

    pub fn with_flush_every_value(mut self, flush: bool) -> Self {
        self.flush_every_value = flush;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_compact_ion_mode() {
        let cfg = WriterConfig::default();
        assert!(!cfg.pretty_print);
        assert!(!cfg.json_downconvert);
        assert_eq!(cfg.indent_size, 2);
    }

    #[test]
    fn builder_methods_compose() {
        let cfg = WriterConfig::pretty().with_indent_size(4).with_indent_with_tabs(true);
        assert!(cfg.pretty_print);
        assert_eq!(cfg.indent_size, 4);
        assert!(cfg.indent_with_tabs);
    }

    #[test]
    fn round_trips_through_serde_json() {
        let cfg = WriterConfig::pretty().with_indent_size(4).with_indent_with_tabs(true);
        let serialized = serde_json::to_string(&cfg).unwrap();
        assert!(serialized.contains("\"pretty_print\":true"));
        let deserialized: WriterConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }
}
