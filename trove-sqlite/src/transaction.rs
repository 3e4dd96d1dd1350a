use crate::{
    SqliteBackend, SqliteConnection,
    backend::{Session, impl_sqlite_backend},
};
use std::sync::atomic::{AtomicU64, Ordering};
use trove_core::{Pooled, Result, SqlWriter, Transaction};

static TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// A unit of work pinned on one pooled connection.
///
/// Exposes the whole backend surface, every statement runs on the pinned
/// connection and is marked with the transaction id. Dropping it without
/// `commit` or `rollback` is reported and rolled back.
pub struct SqliteTransaction<'b> {
    backend: &'b SqliteBackend,
    connection: Pooled<String, SqliteConnection>,
    id: u64,
    finished: bool,
}

impl<'b> SqliteTransaction<'b> {
    pub(crate) fn new(backend: &'b SqliteBackend) -> Result<Self> {
        let result = Self {
            backend,
            connection: backend.lease()?,
            id: TRANSACTION_ID.fetch_add(1, Ordering::Relaxed),
            finished: false,
        };
        let mut sql = String::new();
        backend.writer.write_transaction_begin(&mut sql);
        result.session().execute_batch(&sql)?;
        log::debug!("Transaction {} started on {}", result.id, backend.descriptor);
        Ok(result)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn session(&self) -> Session<'_> {
        Session {
            backend: self.backend,
            pinned: Some(&*self.connection),
            transaction: Some(self.id),
        }
    }

    fn finish(&mut self, write: fn(&crate::SqliteSqlWriter, &mut String)) -> Result<()> {
        self.finished = true;
        let mut sql = String::new();
        write(&self.backend.writer, &mut sql);
        self.session().execute_batch(&sql)
    }
}

impl_sqlite_backend!(SqliteTransaction<'_>);

impl Transaction for SqliteTransaction<'_> {
    fn commit(mut self) -> Result<()> {
        self.finish(|writer, out| writer.write_transaction_commit(out))
    }

    fn rollback(mut self) -> Result<()> {
        self.finish(|writer, out| writer.write_transaction_rollback(out))
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        log::warn!(
            "Transaction {} on {} was dropped without commit or rollback, rolling back",
            self.id,
            self.backend.descriptor
        );
        if let Err(e) = self.finish(|writer, out| writer.write_transaction_rollback(out)) {
            log::error!("{:#}", e);
        }
    }
}
