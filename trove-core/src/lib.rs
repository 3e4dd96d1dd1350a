mod as_value;
mod backend;
mod column;
mod connection;
mod criteria;
mod driver;
mod entity;
mod error;
pub mod evaluate;
mod executor;
mod expression;
mod join;
mod pool;
mod pseudo_join;
mod query;
mod table_ref;
mod util;
mod value;
mod writer;

pub use ::anyhow::Context as ErrorContext;
pub use as_value::*;
pub use backend::*;
pub use column::*;
pub use connection::*;
pub use criteria::*;
pub use driver::*;
pub use entity::*;
pub use error::*;
pub use executor::*;
pub use expression::*;
pub use join::*;
pub use pool::*;
pub use pseudo_join::*;
pub use query::*;
pub use table_ref::*;
pub use util::*;
pub use value::*;
pub use writer::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
