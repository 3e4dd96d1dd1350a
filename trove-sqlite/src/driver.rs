use crate::{SqliteBackend, SqliteSqlWriter};
use trove_core::{ConnectionDescriptor, Driver, Result};

#[derive(Default, Debug, Clone, Copy)]
pub struct SqliteDriver {}

impl SqliteDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Driver for SqliteDriver {
    type Backend = SqliteBackend;
    type SqlWriter = SqliteSqlWriter;

    const NAME: &'static str = "sqlite";

    fn sql_writer(&self) -> SqliteSqlWriter {
        SqliteSqlWriter {}
    }

    fn connect_with(&self, descriptor: ConnectionDescriptor) -> Result<SqliteBackend> {
        SqliteBackend::open(descriptor)
    }
}
