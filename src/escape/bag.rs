//! Named-counter bag shared by every inventory store.
//!
//! A name that is present always maps to a count of at least 1. Mutations
//! never touch the screen: they notify subscribed listeners, and the
//! presentation layer decides what to redraw.

use std::collections::BTreeMap;
use std::fmt;

/// Snapshot handed to listeners after every mutation.
pub type ItemMap = BTreeMap<String, u32>;

type Listener = Box<dyn FnMut(&ItemMap)>;

/// Observer list for a single store.
#[derive(Default)]
pub struct Observers {
    listeners: Vec<Listener>,
}

impl Observers {
    pub fn subscribe(&mut self, listener: impl FnMut(&ItemMap) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn notify(&mut self, items: &ItemMap) {
        for listener in &mut self.listeners {
            listener(items);
        }
    }
}

impl fmt::Debug for Observers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct CountedBag {
    items: ItemMap,
    observers: Observers,
}

impl CountedBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from a loaded mapping, dropping zero counts.
    pub fn from_items(items: ItemMap) -> Self {
        Self {
            items: items.into_iter().filter(|(_, c)| *c > 0).collect(),
            observers: Observers::default(),
        }
    }

    /// Add `count` of `name`. A count of 0 is treated as 1.
    pub fn add(&mut self, name: &str, count: u32) {
        let count = count.max(1);
        let stored = self.items.entry(name.to_string()).or_insert(0);
        *stored = stored.saturating_add(count);
        self.observers.notify(&self.items);
    }

    /// Remove `count` of `name`. Returns false when nothing was held.
    pub fn remove(&mut self, name: &str, count: u32) -> bool {
        let count = count.max(1);
        let Some(stored) = self.items.get_mut(name) else {
            return false;
        };
        if *stored <= count {
            self.items.remove(name);
        } else {
            *stored -= count;
        }
        self.observers.notify(&self.items);
        true
    }

    pub fn has(&self, name: &str, count: u32) -> bool {
        self.count(name) >= count
    }

    pub fn count(&self, name: &str) -> u32 {
        self.items.get(name).copied().unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.observers.notify(&self.items);
    }

    /// Swap in a whole new mapping (used when reloading from storage).
    pub fn replace(&mut self, items: ItemMap) {
        self.items = items.into_iter().filter(|(_, c)| *c > 0).collect();
        self.observers.notify(&self.items);
    }

    pub fn items(&self) -> &ItemMap {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ItemMap) + 'static) {
        self.observers.subscribe(listener);
    }
}
