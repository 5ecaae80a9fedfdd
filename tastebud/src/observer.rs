use log::debug;

#[cfg(test)]
use mockall::automock;

use crate::item::ItemId;

/// The change caused by one applied outcome.
#[derive(Clone, Debug, PartialEq)]
pub struct PreferenceUpdate {
    pub winner: ItemId,
    pub loser: ItemId,
    /// The new strength of the winner, on the scale of the configured strategy.
    pub winner_strength: f32,
    pub loser_strength: f32,
    /// The number of outcomes applied so far, including this one.
    pub rounds: u32,
}

/// Gets notified whenever the preferences of a session changed.
#[cfg_attr(test, automock)]
pub trait PreferenceObserver {
    fn preferences_updated(&mut self, update: &PreferenceUpdate);
}

/// Identifies a registered observer for its removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverHandle(u64);

/// The observers registered on one engine.
#[derive(Default)]
pub(crate) struct Observers {
    next: u64,
    observers: Vec<(ObserverHandle, Box<dyn PreferenceObserver + Send>)>,
}

impl Observers {
    pub(crate) fn register(&mut self, observer: Box<dyn PreferenceObserver + Send>) -> ObserverHandle {
        let handle = ObserverHandle(self.next);
        self.next += 1;
        self.observers.push((handle, observer));
        debug!("registered observer {:?}", handle);

        handle
    }

    /// Removes the observer, returns `false` if the handle is unknown.
    pub(crate) fn remove(&mut self, handle: ObserverHandle) -> bool {
        let len = self.observers.len();
        self.observers.retain(|(registered, _)| *registered != handle);

        self.observers.len() < len
    }

    /// Notifies all observers in the order of their registration.
    pub(crate) fn notify(&mut self, update: &PreferenceUpdate) {
        for (_, observer) in &mut self.observers {
            observer.preferences_updated(update);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}
