// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Erik van der Tier

//! Symbol table for constants and labels.
//!
//! Constants (`EQU` identifiers) and labels live in two separate ordered
//! collections, but a name may only be defined once across both.

use std::io::{self, Write};

use thiserror::Error;

pub const MAX_IDS: usize = 1000;
pub const MAX_LABELS: usize = 1000;
pub const MAX_ID_LEN: usize = 16;

/// Width of a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Byte,
    Word,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub value: u16,
    pub kind: IdKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub address: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("redefinition : {0}")]
    Redefined(String),
    #[error("too many ids")]
    TooManyIds,
    #[error("too many labels")]
    TooManyLabels,
    #[error("identifier too long : {0}")]
    NameTooLong(String),
}

#[derive(Debug)]
pub struct SymbolTable {
    ids: Vec<Identifier>,
    labels: Vec<Label>,
    max_ids: usize,
    max_labels: usize,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_limits(MAX_IDS, MAX_LABELS)
    }

    pub fn with_limits(max_ids: usize, max_labels: usize) -> Self {
        Self {
            ids: Vec::new(),
            labels: Vec::new(),
            max_ids,
            max_labels,
        }
    }

    /// True if `name` is already taken by a constant or a label.
    pub fn contains(&self, name: &str) -> bool {
        self.identifier(name).is_some() || self.label(name).is_some()
    }

    fn check_name(&self, name: &str) -> Result<(), SymbolError> {
        if self.contains(name) {
            return Err(SymbolError::Redefined(name.to_string()));
        }
        Ok(())
    }

    pub fn define_identifier(&mut self, name: &str, value: u16, kind: IdKind) -> Result<(), SymbolError> {
        self.check_name(name)?;
        if self.ids.len() >= self.max_ids {
            return Err(SymbolError::TooManyIds);
        }
        if name.len() > MAX_ID_LEN {
            return Err(SymbolError::NameTooLong(name.to_string()));
        }
        self.ids.push(Identifier {
            name: name.to_string(),
            value,
            kind,
        });
        Ok(())
    }

    pub fn define_label(&mut self, name: &str, address: u16) -> Result<(), SymbolError> {
        self.check_name(name)?;
        if self.labels.len() >= self.max_labels {
            return Err(SymbolError::TooManyLabels);
        }
        if name.len() > MAX_ID_LEN {
            return Err(SymbolError::NameTooLong(name.to_string()));
        }
        self.labels.push(Label {
            name: name.to_string(),
            address,
        });
        Ok(())
    }

    pub fn identifier(&self, name: &str) -> Option<&Identifier> {
        self.ids.iter().find(|id| id.name == name)
    }

    pub fn label(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|label| label.name == name)
    }

    /// Resolve a 16-bit operand: labels first, then constants.
    pub fn resolve_word(&self, name: &str) -> Option<u16> {
        self.label(name)
            .map(|label| label.address)
            .or_else(|| self.identifier(name).map(|id| id.value))
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len() + self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dump<W: Write>(&self, mut out: W) -> io::Result<()> {
        for id in &self.ids {
            let kind = match id.kind {
                IdKind::Byte => "byte",
                IdKind::Word => "word",
            };
            writeln!(out, "{:<16}: {:04x} ({}) {kind}", id.name, id.value, id.value)?;
        }
        for label in &self.labels {
            writeln!(
                out,
                "{:<16}: {:04x} ({}) label",
                label.name, label.address, label.address
            )?;
        }
        Ok(())
    }
}
