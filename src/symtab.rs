//! The symbol-table contract (spec §6).
//!
//! The writer never decides how symbols are interned; it only resolves SIDs
//! to text through this trait, and asks whether a local-symbol-table
//! preamble is needed for the stream's shared imports.

use crate::error::IonWriterResult;
use crate::sink::Sink;

/// An opaque handle to a shared-import list. The writer never inspects its
/// contents directly; it only asks [`SymbolTable::is_collection_empty`].
pub trait ImportList {
    fn is_empty_collection(&self) -> bool;
}

pub trait SymbolTable {
    type Imports: ImportList;

    /// Resolves a SID to text. Per spec §6, unknown SIDs must still produce
    /// *some* text (at least a `$N` placeholder) rather than failing.
    fn find_by_sid(&self, sid: u64) -> String;

    /// The shared imports declared for the current symbol table context.
    fn get_imports(&self) -> Self::Imports;

    /// Serializes a local-symbol-table declaration for `imports` by driving
    /// `writer` the same way any other producer would (struct-open,
    /// `imports` field, list of import structs, struct-close). Implemented
    /// by the symbol-table subsystem, not the core.
    fn unload<S: Sink>(&self, writer: &mut crate::writer::TextWriter<S>) -> IonWriterResult<()>;
}

/// A symbol table with no shared imports and unresolved SIDs rendered as
/// `$N`. Useful for writers that never touch shared symbol tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSymbolTable;

#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyImportList;

impl ImportList for EmptyImportList {
    fn is_empty_collection(&self) -> bool {
        true
    }
}

impl SymbolTable for NullSymbolTable {
    type Imports = EmptyImportList;

    fn find_by_sid(&self, sid: u64) -> String {
        format!("${sid}")
    }

    fn get_imports(&self) -> Self::Imports {
        EmptyImportList
    }

    fn unload<S: Sink>(&self, _writer: &mut crate::writer::TextWriter<S>) -> IonWriterResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_symbol_table_resolves_unknown_sids_to_dollar_form() {
        let t = NullSymbolTable;
        assert_eq!(t.find_by_sid(10), "$10");
        assert!(t.get_imports().is_empty_collection());
    }
}
