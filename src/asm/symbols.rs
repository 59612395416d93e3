use std::collections::HashMap;

use tracing::trace;

use super::lexer::SourceLine;
use super::parser::{is_reserved, Stmt};
use super::{AsmError, AsmErrorKind};

/// Label name → image slot (a word index, not a byte offset).
#[derive(Debug, Default, Clone)]
pub struct SymbolTable {
    labels: HashMap<String, u32>,
}

impl SymbolTable {
    /// Pass 1. Each label binds to the slot of the next word emitted; a
    /// `DOUBLE` takes two slots, everything else with a mnemonic takes one.
    pub fn build(lines: &[SourceLine]) -> Result<Self, AsmError> {
        let mut table = Self::default();
        let mut slot = 0u32;
        for line in lines {
            for label in &line.labels {
                table
                    .define(label, slot)
                    .map_err(|kind| AsmError::new(line.number, kind))?;
            }
            if let Some(mnemonic) = &line.mnemonic {
                // unknown mnemonics are reported by the encoder
                let width = Stmt::classify(mnemonic).map_or(1, |s| s.width());
                slot = slot.wrapping_add(width);
            }
        }
        Ok(table)
    }

    pub fn define(&mut self, name: &str, slot: u32) -> Result<(), AsmErrorKind> {
        if is_reserved(name) {
            return Err(AsmErrorKind::ReservedName(name.to_string()));
        }
        if self.labels.contains_key(name) {
            return Err(AsmErrorKind::DuplicateLabel(name.to_string()));
        }
        trace!(label = name, slot, "label");
        self.labels.insert(name.to_string(), slot);
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Result<u32, AsmErrorKind> {
        self.labels
            .get(name)
            .copied()
            .ok_or_else(|| AsmErrorKind::UndefinedLabel(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::lexer::tokenize;

    #[test]
    fn labels_bind_to_the_following_word() {
        let src = "start:\n  lc r0, 1\nmid: lc r1, 2\nd: double 1.5\nafter: halt r0, 0\n";
        let t = SymbolTable::build(&tokenize(src)).unwrap();
        assert_eq!(t.resolve("start"), Ok(0));
        assert_eq!(t.resolve("mid"), Ok(1));
        assert_eq!(t.resolve("d"), Ok(2));
        assert_eq!(t.resolve("after"), Ok(4));
    }

    #[test]
    fn duplicates_and_reserved_names_report_their_line() {
        let err = SymbolTable::build(&tokenize("a: halt r0, 0\n\na: halt r0, 0")).unwrap_err();
        assert_eq!(err, AsmError::new(3, AsmErrorKind::DuplicateLabel("a".into())));
        let err = SymbolTable::build(&tokenize("ok:\nadd: halt r0, 0")).unwrap_err();
        assert_eq!(err, AsmError::new(2, AsmErrorKind::ReservedName("add".into())));
        let err = SymbolTable::build(&tokenize("r3: halt r0, 0")).unwrap_err();
        assert_eq!(err.kind, AsmErrorKind::ReservedName("r3".into()));
    }
}
