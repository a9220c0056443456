use std::fmt;

use thiserror::Error;
use ulid::Ulid;

use crate::model::Collection;

/// How a delete addressed its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    Index(usize),
    Id(Ulid),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Index(i) => write!(f, "index {i}"),
            Locator::Id(id) => write!(f, "id {id}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {collection} {locator}")]
    NotFound {
        collection: Collection,
        locator: Locator,
    },
    #[error("conflict with booking: {0}")]
    Conflict(Ulid),
    #[error("persist error: {0}")]
    Persist(String),
}
