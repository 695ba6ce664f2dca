//! Transaction handles.
//!
//! Lookups used by the quote pipeline live on [`ReadTransaction`]; the only
//! write the pipeline performs, persisting an outgoing message, lives on
//! [`WriteTransaction`].  Both roll back when dropped without a commit.

use rusqlite::{Connection, Transaction};

use crate::error::Result;

/// A consistent read-only snapshot of the store.
pub struct ReadTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> ReadTransaction<'conn> {
    pub(crate) fn new(tx: Transaction<'conn>) -> Self {
        Self { tx }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.tx
    }
}

/// An exclusive write transaction.
pub struct WriteTransaction<'conn> {
    tx: Transaction<'conn>,
}

impl<'conn> WriteTransaction<'conn> {
    pub(crate) fn new(tx: Transaction<'conn>) -> Self {
        Self { tx }
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.tx
    }

    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }
}
