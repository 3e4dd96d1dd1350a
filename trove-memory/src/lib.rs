mod backend;
mod driver;

pub use backend::*;
pub use driver::*;
