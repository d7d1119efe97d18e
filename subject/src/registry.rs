use std::collections::BTreeMap;

/// Identifies one registration within a single subject.
/// Ids are handed out in increasing order and never reused, so ordering by id is registration order.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn first() -> Self { Self(0) }

    pub(crate) fn next(self) -> Self { Self(self.0 + 1) }
}

impl From<SubscriptionId> for u64 {
    fn from(id: SubscriptionId) -> Self { id.0 }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "#{}", self.0) }
}

/// A unique identifier for a subject, derived from the address of its shared state.
/// Only used for comparison and diagnostics; it cannot be turned back into a subject.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubjectId(usize);

impl SubjectId {
    pub(crate) fn from_ptr<P: ?Sized>(ptr: *const P) -> Self { Self(ptr as *const () as usize) }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "subject:{:x}", self.0) }
}

/// Insertion-ordered mapping from subscription id to listener.
/// Makes no lifetime decisions of its own; the dispatcher decides when entries come and go.
pub(crate) struct Registry<L> {
    entries: BTreeMap<SubscriptionId, L>,
}

impl<L> Registry<L> {
    pub fn new() -> Self { Self { entries: BTreeMap::new() } }

    pub fn insert(&mut self, id: SubscriptionId, listener: L) { self.entries.insert(id, listener); }

    /// Removes and returns the entry, if present. Callers are responsible for dropping the returned
    /// listener outside of any borrow of the registry.
    pub fn remove(&mut self, id: &SubscriptionId) -> Option<L> { self.entries.remove(id) }

    pub fn contains(&self, id: &SubscriptionId) -> bool { self.entries.contains_key(id) }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&SubscriptionId, &L)> { self.entries.iter() }
}

impl<L: Clone> Registry<L> {
    /// Copy of the current entries in registration order
    pub fn snapshot(&self) -> Vec<(SubscriptionId, L)> { self.entries.iter().map(|(id, listener)| (*id, listener.clone())).collect() }
}

impl<L> Default for Registry<L> {
    fn default() -> Self { Self::new() }
}
