#[cfg(test)]
mod tests {
    use std::{fs, path::Path, sync::Mutex};
    use trove_core::{
        Backend, ConnectionDescriptor, Criteria, Driver, Entity, ErrorKind, Expression,
        GroupCount, JoinBackend, JoinCriteria, JoinExpression, JoinStrategy, JoinType, Mapping,
        Order, Pooled, Query, QueryShape, Result, RowLabeled, RowsAffected, Transaction, Value,
        count_join, error_kind, fetch_join, join_strategy,
    };
    use trove_memory::MemoryDriver;
    use trove_sqlite::{SqliteBackend, SqliteDriver};
    use trove_tests::{
        LeftItem, Product, RightItem, execute_tests, init_logs, setup_items, setup_products,
        silent_logs,
    };

    static MUTEX: Mutex<()> = Mutex::new(());

    fn open(name: &str) -> SqliteBackend {
        let path = format!("../target/debug/{}.sqlite", name);
        if Path::new(&path).exists() {
            fs::remove_file(&path)
                .expect(format!("Failed to remove existing test database file {}", path).as_str());
        }
        assert!(
            !Path::new(&path).exists(),
            "Database file should not exist before test"
        );
        let backend = SqliteDriver::new()
            .connect(&format!("sqlite://{}?mode=rwc", path))
            .expect("Could not open the database");
        assert!(
            Path::new(&path).exists(),
            "Database file should be created after connection"
        );
        backend
    }

    /// Sqlite restricted to the joins of engines older than 3.39.0.
    struct LeftJoinsOnly(SqliteBackend);

    impl Backend for LeftJoinsOnly {
        fn name(&self) -> &'static str {
            self.0.name()
        }

        fn descriptor(&self) -> &ConnectionDescriptor {
            self.0.descriptor()
        }

        fn create_table(&self, mapping: Mapping, if_not_exists: bool) -> Result<()> {
            self.0.create_table(mapping, if_not_exists)
        }

        fn drop_table(&self, mapping: Mapping, if_exists: bool) -> Result<()> {
            self.0.drop_table(mapping, if_exists)
        }

        fn delete(&self, mapping: Mapping, criteria: &Criteria) -> Result<RowsAffected> {
            self.0.delete(mapping, criteria)
        }

        fn delete_all(&self, mapping: Mapping) -> Result<RowsAffected> {
            self.0.delete_all(mapping)
        }

        fn insert(&self, mapping: Mapping, row: &[Value]) -> Result<RowsAffected> {
            self.0.insert(mapping, row)
        }

        fn update(
            &self,
            mapping: Mapping,
            criteria: &Criteria,
            values: &[(&str, Value)],
        ) -> Result<RowsAffected> {
            self.0.update(mapping, criteria, values)
        }

        fn compile_query(
            &self,
            mapping: Mapping,
            criteria: &Criteria,
        ) -> Result<Pooled<QueryShape, Query>> {
            self.0.compile_query(mapping, criteria)
        }

        fn execute(
            &self,
            query: &Query,
            callback: &mut dyn FnMut(RowLabeled) -> Result<()>,
        ) -> Result<()> {
            self.0.execute(query, callback)
        }

        fn count(&self, mapping: Mapping, criteria: &Criteria) -> Result<u64> {
            self.0.count(mapping, criteria)
        }

        fn count_grouped(
            &self,
            mapping: Mapping,
            criteria: &Criteria,
            group_by: &[&str],
        ) -> Result<Vec<GroupCount>> {
            self.0.count_grouped(mapping, criteria, group_by)
        }

        fn as_join_backend(&self) -> Option<&dyn JoinBackend> {
            Some(self)
        }
    }

    impl JoinBackend for LeftJoinsOnly {
        fn can_join_natively(&self, criteria: &JoinCriteria, other: &dyn Backend) -> bool {
            self.0.can_join_natively(criteria, other)
        }

        fn supports_join_type(&self, join_type: JoinType) -> bool {
            matches!(join_type, JoinType::Inner | JoinType::LeftOuter)
        }

        fn compile_join_query(
            &self,
            left: Mapping,
            right: Mapping,
            criteria: &JoinCriteria,
        ) -> Result<Pooled<QueryShape, Query>> {
            self.0.compile_join_query(left, right, criteria)
        }

        fn count_join(&self, left: Mapping, right: Mapping, criteria: &JoinCriteria) -> Result<u64> {
            self.0.count_join(left, right, criteria)
        }
    }

    fn on_tag() -> JoinCriteria {
        JoinCriteria::inner().on(JoinExpression::equal("tag", "tag"))
    }

    #[test]
    fn sqlite() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let backend = open("tests");
        assert_eq!(
            join_strategy(&backend, &backend, &on_tag()),
            JoinStrategy::Native
        );
        execute_tests(&backend, &backend);
        let stats = backend.query_stats();
        assert!(stats.reused > 0, "Compiled queries should be reused");
        assert!(backend.connection_stats().reused > 0);
        assert!(backend.command_stats().reused > 0);
    }

    #[test]
    fn sqlite_cross_database() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let left = open("tests_left");
        let right = open("tests_right");
        assert_eq!(
            join_strategy(&left, &right, &on_tag()),
            JoinStrategy::Pseudo
        );
        execute_tests(&left, &right);
    }

    #[test]
    fn sqlite_and_memory() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let sqlite = open("tests_mixed");
        let memory = MemoryDriver::new()
            .connect("memory://mixed")
            .expect("Could not open the memory backend");
        assert_eq!(
            join_strategy(&sqlite, &memory, &on_tag()),
            JoinStrategy::Pseudo
        );
        execute_tests(&sqlite, &memory);
        execute_tests(&memory, &sqlite);
    }

    #[test]
    fn sqlite_without_right_joins() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let backend = LeftJoinsOnly(open("tests_left_joins"));
        let on_tag = |criteria: JoinCriteria| criteria.on(JoinExpression::equal("tag", "tag"));
        assert_eq!(
            join_strategy(&backend, &backend, &on_tag(JoinCriteria::inner())),
            JoinStrategy::Native
        );
        assert_eq!(
            join_strategy(&backend, &backend, &on_tag(JoinCriteria::left_outer())),
            JoinStrategy::Native
        );
        assert_eq!(
            join_strategy(&backend, &backend, &on_tag(JoinCriteria::right_outer())),
            JoinStrategy::NativeFlipped
        );
        assert_eq!(
            join_strategy(&backend, &backend, &on_tag(JoinCriteria::outer())),
            JoinStrategy::Pseudo
        );
        execute_tests(&backend, &backend);

        setup_items(&backend, &backend);
        let criteria = on_tag(JoinCriteria::right_outer())
            .order_by_left("id", Order::Asc)
            .order_by_right("id", Order::Desc)
            .start(1)
            .limit(3);
        let rows = fetch_join::<LeftItem, RightItem>(&backend, &backend, &criteria)
            .expect("Failed to run the flipped join");
        let tags: Vec<_> = rows
            .iter()
            .map(|v| {
                (
                    v.left.as_ref().map(|v| v.tag.as_str()),
                    v.right.as_ref().map(|v| v.tag.as_str()),
                )
            })
            .collect();
        assert_eq!(
            tags,
            [
                (None, Some("4")),
                (Some("one"), Some("one")),
                (Some("two"), Some("two")),
            ]
        );
        assert_eq!(
            count_join::<LeftItem, RightItem>(&backend, &backend, &criteria)
                .expect("Failed to count the flipped join"),
            3
        );
    }

    #[test]
    fn transactions() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let backend = open("transactions");
        setup_products(&backend);
        let by_id = |id: i64| Criteria::new().with(Expression::equal("id", id));

        let transaction = backend.begin().expect("Could not begin a transaction");
        Product::delete_many(&transaction, &by_id(1)).expect("Failed to delete in transaction");
        assert_eq!(
            Product::count(&transaction, &Criteria::new()).expect("Failed to count"),
            4
        );
        transaction.rollback().expect("Could not roll back");
        assert_eq!(
            Product::count(&backend, &Criteria::new()).expect("Failed to count"),
            5
        );

        let transaction = backend.begin().expect("Could not begin a transaction");
        Product::update_many(
            &transaction,
            &by_id(2),
            &[("quantity", trove_core::Value::from(42))],
        )
        .expect("Failed to update in transaction");
        transaction.commit().expect("Could not commit");
        let mouse = Product::find_one(&backend, &by_id(2))
            .expect("Failed to query the mouse")
            .expect("The mouse is missing");
        assert_eq!(mouse.quantity, 42);

        silent_logs! {
            let transaction = backend.begin().expect("Could not begin a transaction");
            Product::delete_all(&transaction).expect("Failed to delete in transaction");
            drop(transaction);
        }
        assert_eq!(
            Product::count(&backend, &Criteria::new()).expect("Failed to count"),
            5,
            "A dropped transaction must be rolled back"
        );

        let transaction = backend.begin().expect("Could not begin a transaction");
        LeftItem::drop_table(&transaction, true).expect("Failed to drop in transaction");
        LeftItem::create_table(&transaction, false).expect("Failed to create in transaction");
        assert_eq!(
            join_strategy(&transaction, &backend, &on_tag()),
            JoinStrategy::Native
        );
        transaction.commit().expect("Could not commit");
    }

    #[test]
    fn sql_only_clauses() {
        init_logs();
        let _guard = MUTEX.lock().unwrap();
        let backend = open("clauses");
        setup_products(&backend);
        let memory = MemoryDriver::new()
            .connect("memory://clauses")
            .expect("Could not open the memory backend");
        setup_products(&memory);

        let raw = Criteria::new().with(Expression::raw(
            "\"quantity\" % ? = 0",
            [trove_core::Value::from(5)],
        ));
        let ids: Vec<_> = Product::find_many(&backend, &raw.clone().order_by("id", Order::Asc))
            .expect("Failed to query with a raw clause")
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, [1, 2, 4]);
        let error = Product::find_many(&memory, &raw).expect_err("The memory backend has no SQL");
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        let error = raw.invert().expect_err("Raw clauses cannot be inverted");
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));

        let computed = Criteria::new().order_by("\"price\" * \"quantity\" DESC", Order::Computed);
        let ids: Vec<_> = Product::find_many(&backend, &computed)
            .expect("Failed to query with a computed order")
            .into_iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(ids, [5, 3, 4, 1, 2]);
        let error =
            Product::find_many(&memory, &computed).expect_err("The memory backend has no SQL");
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));

        silent_logs! {
            let error = Product::find_many(
                &backend,
                &Criteria::new().with(Expression::raw("\"missing_column\" = 1", [])),
            )
            .expect_err("The engine must reject an unknown column");
            assert_eq!(error_kind(&error), Some(ErrorKind::Execution));
            assert!(format!("{:#}", error).contains("missing_column"));
        }
    }
}
