//! Session-scoped selection of the active client.

mod session;

use rand::Rng;
use serde::Serialize;

use crate::catalog::{Catalog, ClientId};

pub use session::{SessionError, SessionId, SessionRecord, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("client identifier must be at least {min}, got {value}")]
    BelowMinimum { value: i64, min: u64 },
}

/// How the active identifier was last set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionOrigin {
    Random,
    Entered,
}

/// Active identifier together with how it was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub client_id: ClientId,
    pub origin: SelectionOrigin,
}

impl Selection {
    pub fn random(client_id: ClientId) -> Self {
        Self {
            client_id,
            origin: SelectionOrigin::Random,
        }
    }

    pub fn entered(client_id: ClientId) -> Self {
        Self {
            client_id,
            origin: SelectionOrigin::Entered,
        }
    }
}

/// The active client for one session. Empty until first read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    active: Option<Selection>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Active selection, drawing one at random the first time it is read.
    pub fn current<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R) -> Selection {
        match self.active {
            Some(selection) => selection,
            None => self.redraw(catalog, rng),
        }
    }

    /// Replace the active identifier with a uniform draw from the catalog.
    pub fn redraw<R: Rng + ?Sized>(&mut self, catalog: &Catalog, rng: &mut R) -> Selection {
        let selection = Selection::random(catalog.random_id(rng));
        self.active = Some(selection);
        selection
    }

    /// Replace the active identifier with a user-entered value. Values below 1 leave the
    /// selection untouched.
    pub fn submit(&mut self, raw: i64) -> Result<Selection, SelectionError> {
        let id = u64::try_from(raw)
            .ok()
            .and_then(ClientId::new)
            .ok_or(SelectionError::BelowMinimum {
                value: raw,
                min: ClientId::MIN,
            })?;
        let selection = Selection::entered(id);
        self.active = Some(selection);
        Ok(selection)
    }

    /// Active identifier without triggering the lazy draw.
    pub fn peek(&self) -> Option<ClientId> {
        self.active.map(|selection| selection.client_id)
    }
}
