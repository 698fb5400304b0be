//! Struct declaration registry.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use sigma_ir::{FieldDecl, Name};

/// Field declarations by struct name, in declaration order.
///
/// Filled by `struct` statements and emptied only when the runtime
/// re-initializes. Shared by every interpreter of the runtime.
#[derive(Debug, Default)]
pub struct StructRegistry {
    decls: FxHashMap<Name, Arc<[FieldDecl]>>,
}

impl StructRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a declaration.
    pub fn register(&mut self, name: Name, fields: Arc<[FieldDecl]>) {
        self.decls.insert(name, fields);
    }

    pub fn get(&self, name: Name) -> Option<Arc<[FieldDecl]>> {
        self.decls.get(&name).cloned()
    }

    pub fn clear(&mut self) {
        self.decls.clear();
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}
