use displaydoc::Display;
use thiserror::Error;

use crate::{
    error::Error,
    state::{UserState, UserState_v0_0_0},
    utils::serialize_with_version,
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Potential errors of the persisted user state.
#[derive(Copy, Clone, Debug, Display, Error, PartialEq)]
pub enum StateError {
    /// Unsupported serialized state. Found version {found} expected {expected}
    UnsupportedVersion { found: u8, expected: u8 },
}

impl UserState {
    /// Deserializes the bytes into a user state.
    ///
    /// If `bytes` is empty, then a fresh state is returned. If `bytes` represents an older
    /// version, then the state is migrated.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.is_empty() {
            return Ok(Self::default());
        }

        // version is encoded in the first byte
        let state = match bytes[0] {
            0 => bincode::deserialize::<UserState_v0_0_0>(&bytes[1..])?.into(),
            CURRENT_SCHEMA_VERSION => bincode::deserialize(&bytes[1..])?,
            version => {
                return Err(StateError::UnsupportedVersion {
                    found: version,
                    expected: CURRENT_SCHEMA_VERSION,
                }
                .into())
            }
        };

        Ok(state)
    }

    /// Serializes the user state with the current schema version.
    pub fn serialize(&self) -> Result<Vec<u8>, Error> {
        serialize_with_version(self, CURRENT_SCHEMA_VERSION)
    }
}
