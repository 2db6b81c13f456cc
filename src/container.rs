//! The container stack and separator policy (spec §4.1).
//!
//! The separator is a function of context, not of value, so encoding it
//! into state (rather than recomputing it at every `start_value`) keeps
//! the framing code context-free. Mirrors the teacher's `Emitter::indents`
//! stack (`emitter.rs`), generalized from a single `usize` per level to a
//! full frame record since Ion's separator/struct-ness rules are richer
//! than YAML's indent-only stack.

use crate::config::WriterConfig;
use crate::error::{IonWriterError, IonWriterResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerType {
    List,
    Sexp,
    Struct,
    /// The lob-top frame pushed while a blob's base-64 tail is pending.
    Blob,
    Clob,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    parent_type: ContainerType,
    saved_in_struct: bool,
    saved_pending_separator: bool,
}

/// Emitter state: container stack, pending-separator flag, first-value
/// flag, pending-lob state (spec §3).
pub struct ContainerStack {
    stack: Vec<Frame>,
    pub in_struct: bool,
    pub separator_char: u8,
    pub pending_separator: bool,
    pub no_output: bool,
    pub pending_blob_bytes: u8,
    pub pending_triple: u32,
}

impl ContainerStack {
    pub fn new(config: &WriterConfig) -> Self {
        let separator_char = Self::top_level_separator(config);
        Self {
            stack: Vec::with_capacity(16),
            in_struct: false,
            separator_char,
            pending_separator: false,
            no_output: true,
            pending_blob_bytes: 0,
            pending_triple: 0,
        }
    }

    fn top_level_separator(config: &WriterConfig) -> u8 {
        if config.pretty_print {
            b'\n'
        } else {
            b' '
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn top(&self) -> IonWriterResult<ContainerType> {
        self.stack
            .last()
            .map(|f| f.parent_type)
            .ok_or_else(|| IonWriterError::InvalidState("container stack is empty".into()))
    }

    /// Push(parent_type) — spec §4.1.
    pub fn push(&mut self, parent_type: ContainerType, config: &WriterConfig) {
        self.stack.push(Frame {
            parent_type,
            saved_in_struct: self.in_struct,
            saved_pending_separator: self.pending_separator,
        });
        self.in_struct = parent_type == ContainerType::Struct;
        self.pending_separator = false;
        self.separator_char = self.separator_for(parent_type, config);
    }

    /// Pop() — spec §4.1. Returns the popped container type so the caller
    /// can emit the matching closing glyph.
    pub fn pop(&mut self, config: &WriterConfig) -> IonWriterResult<ContainerType> {
        let frame = self
            .stack
            .pop()
            .ok_or_else(|| IonWriterError::InvalidState("pop on empty container stack".into()))?;
        self.in_struct = frame.saved_in_struct;
        self.pending_separator = frame.saved_pending_separator;
        self.separator_char = match self.stack.last() {
            Some(outer) => self.separator_for(outer.parent_type, config),
            None => Self::top_level_separator(config),
        };
        Ok(frame.parent_type)
    }

    fn separator_for(&self, parent_type: ContainerType, config: &WriterConfig) -> u8 {
        match parent_type {
            ContainerType::Sexp => {
                if config.json_downconvert {
                    b','
                } else {
                    b' '
                }
            }
            ContainerType::List | ContainerType::Struct => b',',
            ContainerType::Blob | ContainerType::Clob => self.separator_char,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_2_in_struct_matches_top_frame() {
        let config = WriterConfig::default();
        let mut stack = ContainerStack::new(&config);
        assert!(!stack.in_struct);
        stack.push(ContainerType::Struct, &config);
        assert!(stack.in_struct);
        stack.push(ContainerType::List, &config);
        assert!(!stack.in_struct);
        stack.pop(&config).unwrap();
        assert!(stack.in_struct);
    }

    #[test]
    fn separator_char_follows_container_and_mode_table() {
        let ion = WriterConfig::default();
        let json = WriterConfig::json_downconvert();

        let mut s = ContainerStack::new(&ion);
        s.push(ContainerType::Sexp, &ion);
        assert_eq!(s.separator_char, b' ');

        let mut s = ContainerStack::new(&json);
        s.push(ContainerType::Sexp, &json);
        assert_eq!(s.separator_char, b',');

        let mut s = ContainerStack::new(&ion);
        s.push(ContainerType::List, &ion);
        assert_eq!(s.separator_char, b',');
        s.push(ContainerType::Struct, &ion);
        assert_eq!(s.separator_char, b',');
    }

    #[test]
    fn top_level_separator_depends_on_pretty_print() {
        let compact = WriterConfig::default();
        let pretty = WriterConfig::pretty();
        assert_eq!(ContainerStack::new(&compact).separator_char, b' ');
        assert_eq!(ContainerStack::new(&pretty).separator_char, b'\n');
    }

    #[test]
    fn pop_on_empty_stack_fails() {
        let config = WriterConfig::default();
        let mut stack = ContainerStack::new(&config);
        assert!(stack.pop(&config).is_err());
    }

    #[test]
    fn push_restores_outer_pending_separator_on_pop() {
        let config = WriterConfig::default();
        let mut stack = ContainerStack::new(&config);
        stack.pending_separator = true;
        stack.push(ContainerType::List, &config);
        assert!(!stack.pending_separator);
        stack.pending_separator = true;
        stack.pop(&config).unwrap();
        assert!(stack.pending_separator);
    }
}
