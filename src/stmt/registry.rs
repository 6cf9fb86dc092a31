//! # Statement Registry
//!
//! Numeric-id bookkeeping for the prepared statements of one logical
//! connection: Prepare hands the client an id, Exec/Query look the
//! statement up by it, Finalize releases it. Freed slots are reused, so
//! ids stay small for long-lived connections.

use crate::error::{Error, ErrorKind, Result};
use crate::stmt::Stmt;

/// Slot-indexed collection of prepared statements.
pub struct Registry<'db> {
    slots: Vec<Option<Stmt<'db>>>,
}

impl<'db> Registry<'db> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Registers a statement, returning its id. The lowest free slot wins.
    pub fn add(&mut self, stmt: Stmt<'db>) -> usize {
        match self.slots.iter().position(Option::is_none) {
            Some(id) => {
                self.slots[id] = Some(stmt);
                id
            }
            None => {
                self.slots.push(Some(stmt));
                self.slots.len() - 1
            }
        }
    }

    /// Looks up a registered statement by id.
    pub fn get(&mut self, id: usize) -> Option<&mut Stmt<'db>> {
        self.slots.get_mut(id)?.as_mut()
    }

    /// Removes a statement by id, releasing it back to the engine.
    pub fn del(&mut self, id: usize) -> Result<()> {
        match self.slots.get_mut(id) {
            Some(slot @ Some(_)) => {
                *slot = None;
                Ok(())
            }
            _ => Err(Error::new(
                ErrorKind::Generic,
                format!("no statement with id {id}"),
            )),
        }
    }

    /// Number of registered statements.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Connection;

    #[test]
    fn add_assigns_sequential_ids() {
        let db = Connection::open_in_memory().unwrap();
        let mut registry = Registry::new();
        assert_eq!(registry.add(Stmt::new(&db)), 0);
        assert_eq!(registry.add(Stmt::new(&db)), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn del_frees_the_slot_for_reuse() {
        let db = Connection::open_in_memory().unwrap();
        let mut registry = Registry::new();
        registry.add(Stmt::new(&db));
        registry.add(Stmt::new(&db));
        registry.del(0).unwrap();
        assert!(registry.get(0).is_none());
        assert_eq!(registry.add(Stmt::new(&db)), 0);
    }

    #[test]
    fn del_of_unknown_id_fails() {
        let db = Connection::open_in_memory().unwrap();
        let mut registry = Registry::new();
        registry.add(Stmt::new(&db));
        let err = registry.del(7).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Generic);
        assert_eq!(err.message(), "no statement with id 7");

        registry.del(0).unwrap();
        assert!(registry.del(0).is_err());
    }

    #[test]
    fn registered_statements_stay_usable() {
        let db = Connection::open_in_memory().unwrap();
        let mut registry = Registry::new();
        let mut stmt = Stmt::new(&db);
        stmt.prepare("SELECT 1").unwrap();
        let id = registry.add(stmt);

        let stmt = registry.get(id).unwrap();
        assert!(stmt.statement().is_some());
    }
}
