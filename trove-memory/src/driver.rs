use crate::MemoryBackend;
use trove_core::{ConnectionDescriptor, Driver, GenericSqlWriter, Result};

#[derive(Default, Debug, Clone, Copy)]
pub struct MemoryDriver {}

impl MemoryDriver {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Driver for MemoryDriver {
    type Backend = MemoryBackend;
    type SqlWriter = GenericSqlWriter;

    const NAME: &'static str = "memory";

    fn sql_writer(&self) -> GenericSqlWriter {
        GenericSqlWriter::new()
    }

    fn connect_with(&self, descriptor: ConnectionDescriptor) -> Result<MemoryBackend> {
        Ok(MemoryBackend::new(descriptor))
    }
}
