//! Run-wide, concurrency-safe accumulator of accepted items.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pricetrawl_core::{DedupKey, Item};

#[derive(Debug, Default)]
struct CollectorState {
    seen: HashSet<DedupKey>,
    items: Vec<Item>,
}

impl CollectorState {
    fn accept(&mut self, item: Item) -> bool {
        if self.seen.insert(item.dedup_key()) {
            self.items.push(item);
            true
        } else {
            false
        }
    }
}

/// Deduplicating sink shared by all payload tasks of one run.
///
/// All reads and writes go through a single mutex. The lock is held only
/// for the membership test, insert and append; it is never held across an
/// `.await` or while running caller code. Acceptance order across
/// concurrent callers is unspecified.
#[derive(Debug, Default)]
pub struct Collector {
    state: Mutex<CollectorState>,
}

impl Collector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers one item. Returns `true` if it was new and has been stored,
    /// `false` if an item with the same `(name, price, url)` was already
    /// accepted.
    pub fn offer(&self, item: Item) -> bool {
        self.lock().accept(item)
    }

    /// Offers a batch under a single lock acquisition and returns how many
    /// items were accepted. Either the whole batch is considered or, if the
    /// caller is cancelled before calling this, none of it.
    pub fn offer_all(&self, items: impl IntoIterator<Item = Item>) -> usize {
        let mut state = self.lock();
        items
            .into_iter()
            .map(|item| state.accept(item))
            .filter(|accepted| *accepted)
            .count()
    }

    /// Returns an independent copy of the accepted items.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Item> {
        self.lock().items.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the collector, returning the accepted items without copying.
    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .items
    }

    // A panic under the lock leaves at worst one key without its item.
    fn lock(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
