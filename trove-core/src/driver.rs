use crate::{Backend, ConnectionDescriptor, Result, SqlWriter};

/// Entry point of a backend family.
pub trait Driver {
    type Backend: Backend;
    type SqlWriter: SqlWriter;

    /// Url scheme served by this driver.
    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;

    fn connect_with(&self, descriptor: ConnectionDescriptor) -> Result<Self::Backend>;

    /// Parse `url` and open a backend on it.
    fn connect(&self, url: &str) -> Result<Self::Backend> {
        let descriptor = ConnectionDescriptor::parse(url)?;
        descriptor.expect_scheme(Self::NAME)?;
        self.connect_with(descriptor)
    }
}
