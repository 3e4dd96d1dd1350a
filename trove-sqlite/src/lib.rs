mod backend;
mod connection;
mod driver;
mod extract;
mod sql_writer;
mod transaction;

pub use backend::*;
pub use connection::*;
pub use driver::*;
pub use sql_writer::*;
pub use transaction::*;
