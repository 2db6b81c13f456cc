//! A streaming text serializer for the Ion data format, with an optional
//! down-convert mode that restricts output to the JSON subset.
//!
//! The entry point is [`writer::TextWriter`]: construct one over any
//! [`sink::Sink`] (an [`sink::IoSink`] adapter is provided for anything
//! implementing [`std::io::Write`]) and drive it with the
//! `write_*`/`begin_*`/`end_*` methods — the Ion version marker is written
//! automatically before the first value, so no separate start-of-stream
//! call is needed. The writer never buffers a whole document in memory;
//! every call appends directly to the sink.
//!
//! ```
//! use ion_text_writer::config::WriterConfig;
//! use ion_text_writer::sink::IoSink;
//! use ion_text_writer::writer::TextWriter;
//!
//! let mut writer = TextWriter::new(IoSink::new(Vec::new()), WriterConfig::default());
//! writer.begin_list().unwrap();
//! writer.write_int64(1).unwrap();
//! writer.write_int64(2).unwrap();
//! writer.end_list().unwrap();
//! assert_eq!(writer.into_inner().into_inner(), b"$ion_1_0 [1,2]");
//! ```

pub mod config;
pub mod container;
pub mod error;
pub mod lob;
pub mod scalar;
pub mod sink;
pub mod symtab;
pub mod text_encoding;
pub mod writer;

pub use config::WriterConfig;
pub use error::{IonWriterError, IonWriterResult};
pub use scalar::IonType;
pub use sink::{IoSink, Sink};
pub use symtab::{NullSymbolTable, SymbolTable};
pub use writer::TextWriter;
