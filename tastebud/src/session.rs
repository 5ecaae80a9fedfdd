use std::collections::HashMap;

use derive_more::{Display, From};
use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    engine::{Builder, Engine},
    error::Error,
};

/// Opaque identifier of a session.
#[derive(Clone, Copy, Debug, Display, From, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Creates a random session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// The engines of all active sessions, each with its own isolated user state.
///
/// Mutations of a session go through `&mut` access to its engine, ie. they are serialized per
/// session by construction.
#[derive(Default)]
pub struct Sessions {
    config: Config,
    engines: HashMap<SessionId, Engine>,
}

impl Sessions {
    /// Creates an empty registry whose sessions use the given configuration.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            engines: HashMap::new(),
        }
    }

    /// Starts a fresh session.
    pub fn create(&mut self) -> SessionId {
        let engine = Builder::default().with_config(self.config.clone()).build();
        self.insert(engine)
    }

    /// Resumes a session from a serialized user state.
    ///
    /// # Errors
    /// Fails if the state cannot be deserialized.
    pub fn restore(&mut self, bytes: impl AsRef<[u8]>) -> Result<SessionId, Error> {
        let engine = Builder::default()
            .with_config(self.config.clone())
            .with_serialized_state(bytes)?
            .build();
        Ok(self.insert(engine))
    }

    /// Adds an already built engine as a new session.
    pub fn insert(&mut self, engine: Engine) -> SessionId {
        let id = SessionId::new();
        debug!("starting session {}", id);
        self.engines.insert(id, engine);

        id
    }

    pub fn get(&self, id: SessionId) -> Option<&Engine> {
        self.engines.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Engine> {
        self.engines.get_mut(&id)
    }

    /// Ends the session and hands out its engine, eg. to persist the state.
    pub fn remove(&mut self, id: SessionId) -> Option<Engine> {
        debug!("ending session {}", id);
        self.engines.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemId;

    #[test]
    fn test_sessions_are_isolated() {
        let mut sessions = Sessions::default();
        let first = sessions.create();
        let second = sessions.create();
        assert_ne!(first, second);

        sessions
            .get_mut(first)
            .unwrap()
            .apply_outcome(&ItemId::from("a"), &ItemId::from("b"), None, None)
            .unwrap();

        assert_eq!(sessions.get(first).unwrap().state().rounds(), 1);
        assert_eq!(sessions.get(second).unwrap().state().rounds(), 0);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_restore_and_remove() {
        let mut sessions = Sessions::default();
        let id = sessions.create();
        let engine = sessions.get_mut(id).unwrap();
        engine.block("a");
        let bytes = engine.serialize().unwrap();

        let restored = sessions.restore(&bytes).unwrap();
        assert_eq!(
            sessions.get(restored).unwrap().state(),
            sessions.get(id).unwrap().state(),
        );

        assert!(sessions.remove(id).is_some());
        assert!(sessions.remove(id).is_none());
        assert!(sessions.get(id).is_none());
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_restore_rejects_garbage() {
        let mut sessions = Sessions::default();

        assert!(sessions.restore([9_u8, 1, 2, 3]).is_err());
        assert!(sessions.is_empty());
    }
}
