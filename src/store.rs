//! Destination store - ordered, index-addressable destinations
//!
//! The store knows nothing about text. Every mutation is recorded as a
//! [`StoreChange`], delivered to subscribed observers and kept in a journal
//! that the owning entry drains to keep its text in step.

use std::fmt;

use crate::contact::ContactHit;
use crate::destination::{Destination, DestinationId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Inserted,
    Changed,
    Removed,
    /// The whole sequence was replaced
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub kind: ChangeKind,
    pub index: usize,
    pub old: Option<Destination>,
    pub new: Option<Destination>,
}

/// Handle to a row, valid until the store is reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorePosition {
    stamp: u64,
    index: usize,
}

impl StorePosition {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Observer = Box<dyn FnMut(&StoreChange)>;

#[derive(Default)]
pub struct DestinationStore {
    destinations: Vec<Destination>,
    next_id: u64,
    stamp: u64,
    journal: Vec<StoreChange>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for DestinationStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DestinationStore")
            .field("destinations", &self.destinations)
            .field("stamp", &self.stamp)
            .field("pending_changes", &self.journal.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl DestinationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.destinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.destinations.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Destination> {
        self.destinations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Destination> {
        self.destinations.iter()
    }

    pub fn index_of(&self, id: DestinationId) -> Option<usize> {
        self.destinations.iter().position(|d| d.id() == Some(id))
    }

    pub fn contains(&self, id: DestinationId) -> bool {
        self.index_of(id).is_some()
    }

    /// Changes whenever the sequence is replaced wholesale
    pub fn stamp(&self) -> u64 {
        self.stamp
    }

    pub fn position(&self, index: usize) -> Option<StorePosition> {
        (index < self.len()).then_some(StorePosition {
            stamp: self.stamp,
            index,
        })
    }

    /// Resolve a position; None if the store was reset since it was issued
    pub fn get_at(&self, position: StorePosition) -> Option<&Destination> {
        if position.stamp != self.stamp {
            tracing::debug!(
                "Stale store position: stamp {} != {}",
                position.stamp,
                self.stamp
            );
            return None;
        }
        self.get(position.index)
    }

    /// Insert at `index` (clamped to the end). A destination whose identity
    /// is already present is not inserted again.
    pub fn insert(&mut self, index: usize, mut destination: Destination) -> Option<DestinationId> {
        if let Some(id) = destination.id() {
            if self.contains(id) {
                tracing::debug!("Destination {:?} already in store, not inserting", id);
                return None;
            }
        }

        let id = match destination.id() {
            Some(id) => id,
            None => self.allocate_id(),
        };
        destination.set_id(id);

        let index = index.min(self.len());
        self.destinations.insert(index, destination.clone());
        self.emit(StoreChange {
            kind: ChangeKind::Inserted,
            index,
            old: None,
            new: Some(destination),
        });
        Some(id)
    }

    /// Append at the end, rejecting a non-list destination whose address is
    /// already present.
    pub fn append(&mut self, destination: Destination) -> Option<DestinationId> {
        if !destination.is_list() {
            if let Some(email) = destination.email() {
                let duplicate = self.destinations.iter().any(|d| {
                    !d.is_list()
                        && d.email()
                            .is_some_and(|other| other.eq_ignore_ascii_case(&email))
                });
                if duplicate {
                    tracing::debug!("Rejecting duplicate destination <{}>", email);
                    return None;
                }
            }
        }
        self.insert(self.len(), destination)
    }

    pub fn remove(&mut self, id: DestinationId) -> Option<Destination> {
        match self.index_of(id) {
            Some(index) => self.remove_at(index),
            None => {
                debug_assert!(false, "removing unknown destination {:?}", id);
                tracing::warn!("Tried to remove unknown destination {:?}", id);
                None
            }
        }
    }

    pub fn remove_at(&mut self, index: usize) -> Option<Destination> {
        if index >= self.len() {
            debug_assert!(false, "removing destination {} of {}", index, self.len());
            tracing::warn!(
                "Tried to remove destination {} from a store of {}",
                index,
                self.len()
            );
            return None;
        }

        let removed = self.destinations.remove(index);
        self.emit(StoreChange {
            kind: ChangeKind::Removed,
            index,
            old: Some(removed.clone()),
            new: None,
        });
        Some(removed)
    }

    /// Mutate the destination at `index` in place. A change is recorded
    /// only when the destination actually differs afterwards.
    pub fn update<R>(&mut self, index: usize, f: impl FnOnce(&mut Destination) -> R) -> Option<R> {
        let dest = self.destinations.get_mut(index)?;
        let old = dest.clone();
        let result = f(dest);
        if *dest != old {
            let new = dest.clone();
            self.emit(StoreChange {
                kind: ChangeKind::Changed,
                index,
                old: Some(old),
                new: Some(new),
            });
        }
        Some(result)
    }

    pub fn set_raw(&mut self, index: usize, text: &str) -> bool {
        self.update(index, |d| d.set_raw(text)).unwrap_or(false)
    }

    pub fn set_contact(&mut self, index: usize, hit: &ContactHit, email_index: usize) -> bool {
        self.update(index, |d| d.set_contact(hit, email_index)).is_some()
    }

    pub fn set_member_ignored(&mut self, index: usize, member: usize, ignored: bool) -> bool {
        self.update(index, |d| d.set_member_ignored(member, ignored))
            .unwrap_or(false)
    }

    /// Replace the whole sequence and invalidate outstanding positions
    pub fn replace_all(&mut self, destinations: Vec<Destination>) {
        self.destinations = destinations
            .into_iter()
            .map(|mut d| {
                if d.id().is_none() {
                    let id = self.allocate_id();
                    d.set_id(id);
                }
                d
            })
            .collect();
        self.stamp = self.stamp.wrapping_add(1);
        self.emit(StoreChange {
            kind: ChangeKind::Reset,
            index: 0,
            old: None,
            new: None,
        });
    }

    pub fn clear(&mut self) {
        self.replace_all(Vec::new());
    }

    pub fn subscribe(&mut self, observer: Observer) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sid, _)| *sid != id);
        self.observers.len() != before
    }

    /// Drain changes recorded since the last call
    pub fn take_changes(&mut self) -> Vec<StoreChange> {
        std::mem::take(&mut self.journal)
    }

    fn allocate_id(&mut self) -> DestinationId {
        self.next_id += 1;
        DestinationId(self.next_id)
    }

    fn emit(&mut self, change: StoreChange) {
        tracing::trace!(kind = ?change.kind, index = change.index, "store change");
        for (_, observer) in &mut self.observers {
            observer(&change);
        }
        self.journal.push(change);
    }
}
