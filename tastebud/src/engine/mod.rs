mod public;
mod system;

use displaydoc::Display;
use thiserror::Error;

pub use self::public::{Builder, Engine};
use crate::item::ItemId;

/// Potential errors of applying a comparison outcome.
#[derive(Clone, Debug, Display, Error, PartialEq)]
pub enum OutcomeError {
    /// The item {0} can't be compared with itself
    SelfComparison(ItemId),
}
