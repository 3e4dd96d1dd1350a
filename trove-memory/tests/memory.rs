#[cfg(test)]
mod tests {
    use trove_core::{
        Backend, Criteria, Driver, Entity, Expression, JoinCriteria, JoinExpression, JoinStrategy,
        join_strategy,
    };
    use trove_memory::MemoryDriver;
    use trove_tests::{Product, execute_tests, init_logs, setup_products, silent_logs};

    #[test]
    fn memory() {
        init_logs();
        let driver = MemoryDriver::new();
        let left = driver
            .connect("memory://left")
            .expect("Could not open the left backend");
        let right = driver
            .connect("memory://right")
            .expect("Could not open the right backend");
        execute_tests(&left, &right);
    }

    #[test]
    fn memory_single_backend() {
        init_logs();
        let backend = MemoryDriver::new()
            .connect("memory://single?pool_max_idle=1")
            .expect("Could not open the backend");
        assert_eq!(backend.descriptor().pool_max_idle, 1);
        let criteria = JoinCriteria::inner().on(JoinExpression::equal("tag", "tag"));
        assert_eq!(
            join_strategy(&backend, &backend, &criteria),
            JoinStrategy::Pseudo
        );
        execute_tests(&backend, &backend);
        assert!(backend.query_stats().reused > 0);
    }

    #[test]
    fn memory_isolation() {
        init_logs();
        let driver = MemoryDriver::new();
        let first = driver
            .connect("memory://first")
            .expect("Could not open the first backend");
        let second = driver
            .connect("memory://second")
            .expect("Could not open the second backend");
        setup_products(&first);
        silent_logs! {
            assert!(Product::count(&second, &Criteria::new()).is_err());
        }
        Product::create_table(&second, false).expect("Failed to create the table");
        assert_eq!(
            Product::count(&second, &Criteria::new()).expect("Failed to count"),
            0
        );
        assert_eq!(
            Product::count(&first, &Criteria::new().with(Expression::greater("id", 2)))
                .expect("Failed to count"),
            3
        );
    }
}
