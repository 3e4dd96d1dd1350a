mod counts;
mod criteria;
mod items;
mod joins;
mod operations;

pub use items::*;

use crate::{
    counts::counts,
    criteria::criteria,
    joins::{join_pagination, join_predicates, join_types},
    operations::operations,
};
use log::LevelFilter;
use std::env;
use trove::Backend;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Run the whole suite: single entity scenarios on `left`, joins with the
/// left entity stored in `left` and the right entity in `right`.
pub fn execute_tests(left: &dyn Backend, right: &dyn Backend) {
    criteria(left);
    counts(left);
    operations(left);
    join_types(left, right);
    join_pagination(left, right);
    join_predicates(left, right);
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        $($code)+
        log::set_max_level(level);
    }};
}
