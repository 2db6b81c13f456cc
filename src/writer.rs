//! The core streaming writer (spec §4.2, §4.5): value framing, container
//! open/close, and the orchestration of the scalar/lob formatters.
//!
//! Mirrors the teacher's `Emitter<W: Write>` (`emitter.rs`): a single
//! struct holding the sink, the indent/container stack, and a "pending
//! separator" flag, with small `write_*` helpers doing the punctuation and
//! indentation bookkeeping so the value-writing methods only worry about
//! their own lexical form.

use crate::config::WriterConfig;
use crate::container::{ContainerStack, ContainerType};
use crate::error::{IonWriterError, IonWriterResult};
use crate::lob;
use crate::scalar::{self, DecimalText, IonType, TimestampText};
use crate::sink::{self, Sink};
use crate::symtab::SymbolTable;
use crate::text_encoding;

/// Streaming text writer over any [`Sink`] (spec §4.2).
///
/// Holds no document state beyond the current container stack and pending
/// framing bits; everything it emits is pushed straight to the sink, so
/// memory use is bounded regardless of document size (spec §5).
pub struct TextWriter<S: Sink> {
    sink: S,
    config: WriterConfig,
    stack: ContainerStack,
    preamble_written: bool,
    pending_field_name: Option<Vec<u8>>,
    pending_annotations: Vec<Vec<u8>>,
}

impl<S: Sink> TextWriter<S> {
    pub fn new(sink: S, config: WriterConfig) -> Self {
        let stack = ContainerStack::new(&config);
        Self {
            sink,
            config,
            stack,
            preamble_written: false,
            pending_field_name: None,
            pending_annotations: Vec::new(),
        }
    }

    pub fn into_inner(self) -> S {
        self.sink
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Writes the Ion version marker (absent in JSON mode, spec §4.2).
    /// Idempotent: `start_value` calls this itself the first time a value
    /// is written, so most callers never need to call it directly. Only a
    /// caller that wants a local-symbol-table preamble ahead of the first
    /// value needs [`Self::stream_start_with_symbol_table`] explicitly.
    pub fn stream_start(&mut self) -> IonWriterResult<()> {
        if self.preamble_written {
            return Ok(());
        }
        if !self.config.json_downconvert {
            sink::write_str(&mut self.sink, "$ion_1_0")?;
            sink::write_all(&mut self.sink, &[self.stack.separator_char])?;
        }
        self.preamble_written = true;
        log::trace!("stream started, json_downconvert={}", self.config.json_downconvert);
        Ok(())
    }

    /// Same as [`Self::stream_start`], but also emits a local-symbol-table
    /// preamble when `table`'s shared imports are non-empty (spec §4.2).
    pub fn stream_start_with_symbol_table<T: SymbolTable>(
        &mut self,
        table: &T,
    ) -> IonWriterResult<()> {
        self.stream_start()?;
        if !table.get_imports().is_empty_collection() {
            table.unload(self)?;
        }
        Ok(())
    }

    /// Queues a field name for the next value; must be called exactly once
    /// per value while the top of the container stack is a struct
    /// (spec §4.1 invariant 2).
    pub fn field_name(&mut self, name: &str) -> IonWriterResult<()> {
        if !self.stack.in_struct {
            return Err(IonWriterError::InvalidState(
                "field_name called outside a struct".into(),
            ));
        }
        let text = self.symbol_text_bytes(name)?;
        self.pending_field_name = Some(text);
        Ok(())
    }

    /// Queues an annotation for the next value (spec §4.3 "Concrete
    /// scenario 6: annotation on value"). May be called more than once;
    /// annotations are emitted in call order.
    pub fn annotate(&mut self, name: &str) -> IonWriterResult<()> {
        let text = self.symbol_text_bytes(name)?;
        self.pending_annotations.push(text);
        Ok(())
    }

    fn symbol_text_bytes(&self, name: &str) -> IonWriterResult<Vec<u8>> {
        self.symbol_text_bytes_with_sid_quoting(name, true)
    }

    fn symbol_text_bytes_with_sid_quoting(
        &self,
        name: &str,
        sid_forms_need_quotes: bool,
    ) -> IonWriterResult<Vec<u8>> {
        scalar::format_symbol_text(
            name,
            self.config.json_downconvert,
            self.config.escape_all_non_ascii,
            sid_forms_need_quotes,
        )
    }

    /// Indentation only — the leading end-of-line is the caller's job (it
    /// is conditional in different ways at `start_value` vs. container
    /// close, per spec §4.2/§4.5).
    fn write_plain_indent(&mut self) -> IonWriterResult<()> {
        let depth = self.stack.depth();
        if self.config.indent_with_tabs {
            for _ in 0..depth {
                sink::write_str(&mut self.sink, "\t")?;
            }
        } else {
            let width = depth * self.config.indent_size as usize;
            for _ in 0..width {
                sink::write_str(&mut self.sink, " ")?;
            }
        }
        Ok(())
    }

    /// Framing prologue shared by every scalar and container-open call:
    /// emits the pending separator, indentation, field name, and queued
    /// annotations, in that order (spec §4.2).
    fn start_value(&mut self) -> IonWriterResult<()> {
        if self.stack.pending_blob_bytes > 0 {
            return Err(IonWriterError::InvalidState(
                "a blob was opened and appended to but never finished".into(),
            ));
        }
        if self.stack.in_struct && self.pending_field_name.is_none() {
            return Err(IonWriterError::InvalidState(
                "a struct value requires field_name() first".into(),
            ));
        }

        if self.stack.no_output {
            self.stream_start()?;
        }

        if self.config.pretty_print {
            if self.stack.pending_separator
                && self.stack.separator_char != b' '
                && self.stack.separator_char != b'\n'
            {
                sink::write_all(&mut self.sink, &[self.stack.separator_char])?;
            }
            if !self.stack.no_output {
                sink::write_str(&mut self.sink, "\n")?;
            }
            self.write_plain_indent()?;
        } else if self.stack.pending_separator {
            sink::write_all(&mut self.sink, &[self.stack.separator_char])?;
        }
        self.stack.no_output = false;

        if let Some(name) = self.pending_field_name.take() {
            sink::write_all(&mut self.sink, &name)?;
            sink::write_str(&mut self.sink, ":")?;
        }

        for annotation in std::mem::take(&mut self.pending_annotations) {
            sink::write_all(&mut self.sink, &annotation)?;
            sink::write_str(&mut self.sink, "::")?;
        }

        Ok(())
    }

    /// Framing epilogue: arms the pending separator for the next sibling
    /// and, when configured, flushes the sink (spec §6 `flush_every_value`).
    fn close_value(&mut self) -> IonWriterResult<()> {
        self.stack.pending_separator = true;
        if self.config.flush_every_value {
            self.sink.flush()?;
        }
        Ok(())
    }

    fn write_scalar_text(&mut self, text: &[u8]) -> IonWriterResult<()> {
        self.start_value()?;
        sink::write_all(&mut self.sink, text)?;
        self.close_value()
    }

    pub fn write_null(&mut self, ion_type: IonType) -> IonWriterResult<()> {
        let text = scalar::format_null(ion_type, self.config.json_downconvert);
        self.write_scalar_text(text.as_bytes())
    }

    pub fn write_bool(&mut self, value: bool) -> IonWriterResult<()> {
        self.write_scalar_text(scalar::format_bool(value).as_bytes())
    }

    pub fn write_int64(&mut self, value: i64) -> IonWriterResult<()> {
        self.write_scalar_text(scalar::format_int64(value).as_bytes())
    }

    pub fn write_big_int(&mut self, magnitude: &[u32], negative: bool) -> IonWriterResult<()> {
        self.write_scalar_text(scalar::format_big_int(magnitude, negative).as_bytes())
    }

    pub fn write_double(&mut self, value: f64) -> IonWriterResult<()> {
        let text = scalar::format_double(value, self.config.json_downconvert)?;
        self.write_scalar_text(text.as_bytes())
    }

    pub fn write_decimal<D: DecimalText>(&mut self, value: &D) -> IonWriterResult<()> {
        let mut text = String::new();
        value.write_decimal_text(&mut text, self.config.json_downconvert);
        self.write_scalar_text(text.as_bytes())
    }

    pub fn write_timestamp<T: TimestampText>(&mut self, value: &T) -> IonWriterResult<()> {
        let mut text = String::new();
        value.write_timestamp_text(&mut text);
        if self.config.json_downconvert {
            let mut quoted = Vec::with_capacity(text.len() + 2);
            quoted.push(b'"');
            quoted.extend_from_slice(text.as_bytes());
            quoted.push(b'"');
            self.write_scalar_text(&quoted)
        } else {
            self.write_scalar_text(text.as_bytes())
        }
    }

    /// Writes a symbol by text (spec §4.3). Silently drops the value at
    /// top level with no annotations when it is the reserved IVM form
    /// (spec §4.3, §9), matching the source's documented no-op.
    pub fn write_symbol(&mut self, text: &str) -> IonWriterResult<()> {
        if self.stack.depth() == 0
            && self.pending_annotations.is_empty()
            && text_encoding::is_reserved_ivm_form(text)
        {
            return Ok(());
        }
        let rendered = self.symbol_text_bytes(text)?;
        self.write_scalar_text(&rendered)
    }

    /// Writes a symbol resolved from a SID (spec §4.3 "symbol (by ID)").
    /// Unlike [`Self::write_symbol`], `$N`-shaped text is never quoted —
    /// a resolved SID placeholder is always legal unquoted Ion.
    pub fn write_symbol_by_sid<T: SymbolTable>(
        &mut self,
        sid: u64,
        table: &T,
    ) -> IonWriterResult<()> {
        let text = table.find_by_sid(sid);
        let rendered = self.symbol_text_bytes_with_sid_quoting(&text, false)?;
        self.write_scalar_text(&rendered)
    }

    pub fn write_string(&mut self, text: &str) -> IonWriterResult<()> {
        let rendered =
            scalar::format_string_text(text, self.config.json_downconvert, self.config.escape_all_non_ascii)?;
        self.write_scalar_text(&rendered)
    }

    fn begin_container(&mut self, container_type: ContainerType, open: u8) -> IonWriterResult<()> {
        self.start_value()?;
        sink::write_all(&mut self.sink, &[open])?;
        self.stack.push(container_type, &self.config);
        log::trace!("pushed {container_type:?}, depth now {}", self.stack.depth());
        Ok(())
    }

    fn end_container(
        &mut self,
        expected: ContainerType,
        close: u8,
    ) -> IonWriterResult<()> {
        if self.stack.depth() == 0 {
            return Err(IonWriterError::InvalidState(
                "end_container called at top level".into(),
            ));
        }
        let popped = self.stack.pop(&self.config)?;
        if popped != expected {
            return Err(IonWriterError::InvalidState(format!(
                "mismatched container close: expected {expected:?}, found {popped:?}"
            )));
        }
        if self.config.pretty_print {
            sink::write_str(&mut self.sink, "\n")?;
            self.write_plain_indent()?;
        }
        sink::write_all(&mut self.sink, &[close])?;
        log::trace!("popped {popped:?}, depth now {}", self.stack.depth());
        self.close_value()
    }

    pub fn begin_list(&mut self) -> IonWriterResult<()> {
        self.begin_container(ContainerType::List, b'[')
    }

    pub fn end_list(&mut self) -> IonWriterResult<()> {
        self.end_container(ContainerType::List, b']')
    }

    pub fn begin_sexp(&mut self) -> IonWriterResult<()> {
        if self.config.json_downconvert {
            return self.begin_container(ContainerType::Sexp, b'[');
        }
        self.begin_container(ContainerType::Sexp, b'(')
    }

    pub fn end_sexp(&mut self) -> IonWriterResult<()> {
        if self.config.json_downconvert {
            return self.end_container(ContainerType::Sexp, b']');
        }
        self.end_container(ContainerType::Sexp, b')')
    }

    pub fn begin_struct(&mut self) -> IonWriterResult<()> {
        self.begin_container(ContainerType::Struct, b'{')
    }

    pub fn end_struct(&mut self) -> IonWriterResult<()> {
        if self.pending_field_name.is_some() {
            return Err(IonWriterError::InvalidState(
                "struct closed with a field name pending".into(),
            ));
        }
        self.end_container(ContainerType::Struct, b'}')
    }

    /// Fails unless the top of the container stack is the given lob type —
    /// the stack, not a side field, is the single source of truth for
    /// "is a lob open" (spec §4.4's push/pop framing).
    fn require_open_lob(&self, expected: ContainerType, action: &str) -> IonWriterResult<()> {
        match self.stack.top() {
            Ok(top) if top == expected => Ok(()),
            _ => Err(IonWriterError::InvalidState(format!(
                "{action} called without an open {expected:?}"
            ))),
        }
    }

    /// Opens a streamed blob (spec §4.4): pushes a BLOB frame, resets the
    /// base-64 carry state, and writes the `{{` opener.
    pub fn begin_blob(&mut self) -> IonWriterResult<()> {
        self.start_value()?;
        sink::write_str(&mut self.sink, "{{")?;
        self.stack.push(ContainerType::Blob, &self.config);
        self.stack.pending_blob_bytes = 0;
        self.stack.pending_triple = 0;
        log::trace!("blob opened");
        Ok(())
    }

    pub fn append_blob(&mut self, bytes: &[u8]) -> IonWriterResult<()> {
        self.require_open_lob(ContainerType::Blob, "append_blob")?;
        let mut out = Vec::new();
        lob::append_blob_chunk(
            bytes,
            &mut self.stack.pending_blob_bytes,
            &mut self.stack.pending_triple,
            &mut out,
        );
        sink::write_all(&mut self.sink, &out)
    }

    /// Closes a streamed blob: flushes the remaining base-64 tail, writes
    /// the `}}` closer, and pops the BLOB frame (spec §4.4).
    pub fn end_blob(&mut self) -> IonWriterResult<()> {
        self.require_open_lob(ContainerType::Blob, "end_blob")?;
        let mut out = Vec::new();
        lob::finish_blob(
            self.stack.pending_blob_bytes,
            self.stack.pending_triple,
            &mut out,
        );
        sink::write_all(&mut self.sink, &out)?;
        sink::write_str(&mut self.sink, "}}")?;
        self.stack.pop(&self.config)?;
        log::trace!("blob closed");
        self.close_value()
    }

    /// Opens a streamed clob (spec §4.4): pushes a CLOB frame and writes
    /// the `{{"` opener.
    pub fn begin_clob(&mut self) -> IonWriterResult<()> {
        self.start_value()?;
        sink::write_str(&mut self.sink, "{{\"")?;
        self.stack.push(ContainerType::Clob, &self.config);
        Ok(())
    }

    pub fn append_clob(&mut self, bytes: &[u8]) -> IonWriterResult<()> {
        self.require_open_lob(ContainerType::Clob, "append_clob")?;
        let mut out = Vec::with_capacity(bytes.len());
        for &b in bytes {
            lob::escape_clob_byte(b, self.config.json_downconvert, &mut out);
        }
        sink::write_all(&mut self.sink, &out)
    }

    /// Closes a streamed clob: writes the `"}}` closer and pops the CLOB
    /// frame (spec §4.4).
    pub fn end_clob(&mut self) -> IonWriterResult<()> {
        self.require_open_lob(ContainerType::Clob, "end_clob")?;
        sink::write_str(&mut self.sink, "\"}}")?;
        self.stack.pop(&self.config)?;
        self.close_value()
    }
}
