//! Identity tables mapping raw host nodes to their one wrapper.
//!
//! Keys are the raw trait object's thin pointer, so two `Rc` clones of the
//! same node resolve to the same wrapper while two distinct nodes never
//! collide. One table per node kind lives on each board; the tables are
//! caches over the host's truth and are emptied when the board dies.
//!
//! A double insert for one key means two wrappers exist for one raw node.
//! That is registry corruption, a programmer error, and it asserts instead
//! of degrading.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Identity key for a shared trait object: its data pointer with the vtable
/// metadata discarded.
pub(crate) fn identity_key<T: ?Sized>(node: &Rc<T>) -> usize {
    Rc::as_ptr(node) as *const () as usize
}

pub(crate) struct IdentityTable<T> {
    entries: RefCell<HashMap<usize, Rc<T>>>,
}

impl<T> IdentityTable<T> {
    pub(crate) fn new() -> Self {
        IdentityTable {
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub(crate) fn get(&self, key: usize) -> Option<Rc<T>> {
        self.entries.borrow().get(&key).cloned()
    }

    pub(crate) fn insert(&self, key: usize, wrapper: Rc<T>) {
        let previous = self.entries.borrow_mut().insert(key, wrapper);
        assert!(
            previous.is_none(),
            "identity registry corrupted: two wrappers for one raw node"
        );
    }

    pub(crate) fn remove(&self, key: usize) -> Option<Rc<T>> {
        self.entries.borrow_mut().remove(&key)
    }

    pub(crate) fn drain(&self) -> Vec<Rc<T>> {
        self.entries.borrow_mut().drain().map(|(_, v)| v).collect()
    }
}
