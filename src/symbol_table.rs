// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

// Symbol table for labels and equ constants.

#[derive(Debug, Clone)]
pub struct SymbolTableEntry {
    pub name: String,
    pub val: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolTableResult {
    Ok,
    Duplicate,
}

/// Append-only mapping from label name to 16-bit value. Names are
/// case-sensitive and compared by exact equality; each name may be
/// defined exactly once.
#[derive(Debug, Default)]
pub struct SymbolTable {
    entries: Vec<SymbolTableEntry>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, name: &str, val: u16) -> SymbolTableResult {
        if self.entries.iter().any(|entry| entry.name == name) {
            return SymbolTableResult::Duplicate;
        }
        self.entries.push(SymbolTableEntry {
            name: name.to_string(),
            val,
        });
        SymbolTableResult::Ok
    }

    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.val)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{SymbolTable, SymbolTableResult};

    #[test]
    fn add_and_lookup() {
        let mut table = SymbolTable::new();
        assert_eq!(table.add("start", 0x100), SymbolTableResult::Ok);
        assert_eq!(table.lookup("start"), Some(0x100));
        assert_eq!(table.lookup("missing"), None);
    }

    #[test]
    fn duplicate_definition_is_rejected() {
        let mut table = SymbolTable::new();
        assert_eq!(table.add("x", 1), SymbolTableResult::Ok);
        assert_eq!(table.add("x", 2), SymbolTableResult::Duplicate);
        assert_eq!(table.lookup("x"), Some(1));
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut table = SymbolTable::new();
        assert_eq!(table.add("Loop", 0x10), SymbolTableResult::Ok);
        assert_eq!(table.add("loop", 0x20), SymbolTableResult::Ok);
        assert_eq!(table.lookup("Loop"), Some(0x10));
        assert_eq!(table.lookup("loop"), Some(0x20));
        assert_eq!(table.lookup("LOOP"), None);
    }
}
