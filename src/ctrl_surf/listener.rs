use std::{collections::BTreeMap, fmt};

use crate::daw::{ListenerId, Notifier, Topic};

/// Listeners registered by the surface, keyed by the observed object.
///
/// At most one listener is kept per key and a listener is only removed
/// from the host if the host still knows it.
#[derive(Debug)]
pub struct Registry<K> {
    map: BTreeMap<K, ListenerId>,
}

impl<K> Default for Registry<K> {
    fn default() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy + fmt::Debug> Registry<K> {
    /// Registers a listener on `topic` unless `key` is already observed.
    ///
    /// Returns `true` if a listener was added.
    pub fn insert<N: Notifier + ?Sized>(&mut self, key: K, topic: Topic, host: &mut N) -> bool {
        if self.map.contains_key(&key) {
            return false;
        }

        let id = host.add_listener(topic);
        log::trace!("Listening to {topic:?} for {key:?} with {id:?}");
        self.map.insert(key, id);

        true
    }

    /// Stops observing `key`.
    ///
    /// Returns `true` if the host listener was actually removed.
    pub fn remove<N: Notifier + ?Sized>(&mut self, key: K, host: &mut N) -> bool {
        let id = match self.map.remove(&key) {
            Some(id) => id,
            None => return false,
        };

        if !host.has_listener(id) {
            log::debug!("Listener {id:?} for {key:?} already gone");
            return false;
        }

        host.remove_listener(id);

        true
    }

    pub fn clear<N: Notifier + ?Sized>(&mut self, host: &mut N) {
        let keys: Vec<K> = self.map.keys().copied().collect();
        for key in keys {
            self.remove(key, host);
        }
    }

    pub fn contains(&self, key: K) -> bool {
        self.map.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.map.keys().copied()
    }
}
