#[cfg(test)]
mod tests {
    use indoc::indoc;
    use trove::{
        BooleanOperator, ColumnDef, Context, Criteria, DaoError, ErrorKind, Expression, Fragment,
        GenericSqlWriter, JoinCriteria, JoinExpression, Mapping, Order, Query, QueryShape,
        SqlWriter, TableRef, Value, error_kind,
    };

    const WRITER: GenericSqlWriter = GenericSqlWriter {};

    static PERSON_TABLE: TableRef = TableRef::new("person");
    static PERSON_COLUMNS: [ColumnDef; 4] = [
        ColumnDef::key("id", "id", Value::Int64(None)),
        ColumnDef::required("name", "full_name", Value::Varchar(None)),
        ColumnDef::new("age", "age", Value::Int32(None)),
        ColumnDef::new("flags", "flags", Value::Int64(None)),
    ];

    static AUTHOR_TABLE: TableRef = TableRef::new("author");
    static AUTHOR_COLUMNS: [ColumnDef; 2] = [
        ColumnDef::key("id", "id", Value::Int64(None)),
        ColumnDef::new("name", "name", Value::Varchar(None)),
    ];

    static BOOK_TABLE: TableRef = TableRef::new("book");
    static BOOK_COLUMNS: [ColumnDef; 3] = [
        ColumnDef::key("id", "id", Value::Int64(None)),
        ColumnDef::required("author", "author_id", Value::Int64(None)),
        ColumnDef::new("pages", "pages", Value::Int32(None)),
    ];

    static MEMBERSHIP_TABLE: TableRef = TableRef::with_schema("shop", "membership");
    static MEMBERSHIP_COLUMNS: [ColumnDef; 3] = [
        ColumnDef::key("member", "member", Value::Int64(None)),
        ColumnDef::key("club", "club", Value::Int64(None)),
        ColumnDef::new("since", "since", Value::Date(None)),
    ];

    fn person() -> Mapping {
        Mapping::new(&PERSON_TABLE, &PERSON_COLUMNS)
    }

    fn author() -> Mapping {
        Mapping::new(&AUTHOR_TABLE, &AUTHOR_COLUMNS)
    }

    fn book() -> Mapping {
        Mapping::new(&BOOK_TABLE, &BOOK_COLUMNS)
    }

    fn clause(expression: &Expression) -> Query {
        let mut out = Query::new(QueryShape::Select);
        WRITER
            .write_expression(
                &Context::new(Fragment::SqlSelectWhere),
                &mut out,
                person(),
                expression,
            )
            .expect("Failed to write the expression");
        out
    }

    fn join(criteria: &JoinCriteria) -> Query {
        let mut out = Query::new(QueryShape::Join);
        WRITER
            .write_join_select(&mut out, author(), book(), criteria)
            .expect("Failed to write the join");
        out
    }

    #[test]
    fn sql_expressions() {
        let cases = [
            (Expression::equal("id", 1i64), "(\"id\" = ?)", 1),
            (Expression::not_equal("id", 1i64), "(\"id\" <> ?)", 1),
            (Expression::is_null("age"), "(\"age\" IS NULL)", 0),
            (Expression::is_not_null("name"), "(\"full_name\" IS NOT NULL)", 0),
            (
                Expression::equal_case_insensitive("name", "bob"),
                "(LOWER(\"full_name\") = LOWER(?))",
                1,
            ),
            (Expression::greater("age", 18), "(\"age\" > ?)", 1),
            (Expression::lesser("age", 65), "(\"age\" < ?)", 1),
            (Expression::between("age", 18, 30), "(\"age\" >= ? AND \"age\" <= ?)", 2),
            (Expression::like("name", "A%"), "(\"full_name\" LIKE ?)", 1),
            (
                Expression::like_case_insensitive("name", "a%"),
                "(LOWER(\"full_name\") LIKE LOWER(?))",
                1,
            ),
            (Expression::bitwise_and("flags", 5), "((\"flags\" & ?) = ?)", 2),
            (
                Expression::in_list("id", [1i64, 2, 3]),
                "(\"id\" IN (?, ?, ?))",
                3,
            ),
            (
                Expression::nested(
                    Criteria::any()
                        .with(Expression::lesser("age", 10))
                        .with(Expression::greater("age", 60)),
                ),
                "((\"age\" < ?) OR (\"age\" > ?))",
                2,
            ),
            (
                Expression::raw("\"age\" % ? = 0", [Value::Int32(Some(2))]),
                "(\"age\" % ? = 0)",
                1,
            ),
        ];
        for (expression, expected, params) in cases {
            let out = clause(&expression);
            assert_eq!(out.text, expected);
            assert_eq!(out.params.len(), params, "{}", expected);
        }
    }

    #[test]
    fn sql_inverted_expressions() {
        let cases = [
            (Expression::is_null("age"), "(\"age\" IS NOT NULL)"),
            (
                Expression::equal_case_insensitive("name", "bob"),
                "(LOWER(\"full_name\") <> LOWER(?))",
            ),
            (Expression::greater("age", 18), "(\"age\" <= ?)"),
            (Expression::lesser("age", 65), "(\"age\" >= ?)"),
            (Expression::between("age", 18, 30), "(\"age\" < ? OR \"age\" > ?)"),
            (Expression::like("name", "A%"), "(\"full_name\" NOT LIKE ?)"),
            (
                Expression::like_case_insensitive("name", "a%"),
                "(LOWER(\"full_name\") NOT LIKE LOWER(?))",
            ),
            (Expression::bitwise_and("flags", 5), "((\"flags\" & ?) <> ?)"),
            (Expression::in_list("id", [1i64, 2]), "(\"id\" NOT IN (?, ?))"),
            (
                Expression::nested(
                    Criteria::any()
                        .with(Expression::lesser("age", 10))
                        .with(Expression::greater("age", 60)),
                ),
                "((\"age\" >= ?) AND (\"age\" <= ?))",
            ),
        ];
        for (expression, expected) in cases {
            let inverted = expression.invert().expect("Failed to invert");
            assert_eq!(clause(&inverted).text, expected);
        }
    }

    #[test]
    fn sql_invalid_expressions() {
        for expression in [
            Expression::equal("missing", 1),
            Expression::greater("age", Value::Null),
            Expression::between("age", Value::Int32(None), 3),
            Expression::in_list::<i64>("id", []),
            Expression::nested(Criteria::new()),
        ] {
            let mut out = Query::new(QueryShape::Select);
            let error = WRITER
                .write_expression(
                    &Context::new(Fragment::SqlSelectWhere),
                    &mut out,
                    person(),
                    &expression,
                )
                .expect_err("Should not compile");
            assert_eq!(error_kind(&error), Some(ErrorKind::Configuration), "{:#}", error);
        }
    }

    #[test]
    fn sql_select() {
        let criteria = Criteria::new()
            .with(Expression::greater("age", 18))
            .with(Expression::like("name", "A%"))
            .order_by("name", Order::Asc)
            .order_by("age", Order::Desc)
            .start(10)
            .limit(5);
        let mut out = Query::new(QueryShape::Select);
        WRITER
            .write_select(&mut out, person(), &criteria)
            .expect("Failed to write the select");
        assert_eq!(
            out.text,
            indoc! {r#"
                SELECT *
                FROM "person"
                WHERE ("age" > ?) AND ("full_name" LIKE ?)
                ORDER BY "full_name" ASC, "age" DESC
                LIMIT 5 OFFSET 10;
            "#}
            .trim()
        );
        assert_eq!(
            out.params,
            [Value::Int32(Some(18)), Value::Varchar(Some("A%".into()))]
        );

        let mut out = Query::new(QueryShape::Select);
        WRITER
            .write_select(
                &mut out,
                person(),
                &Criteria::any()
                    .with(Expression::equal("id", 1i64))
                    .with(Expression::equal("id", 2i64))
                    .order_by("\"age\" * 2 DESC", Order::Computed)
                    .start(3),
            )
            .expect("Failed to write the select");
        assert_eq!(
            out.text,
            indoc! {r#"
                SELECT *
                FROM "person"
                WHERE ("id" = ?) OR ("id" = ?)
                ORDER BY "age" * 2 DESC
                OFFSET 3;
            "#}
            .trim()
        );

        let mut out = Query::new(QueryShape::Select);
        WRITER
            .write_select(&mut out, person(), &Criteria::new())
            .expect("Failed to write the select");
        assert_eq!(out.text, "SELECT *\nFROM \"person\";");
        assert!(out.params.is_empty());
    }

    #[test]
    fn sql_select_deterministic() {
        let criteria = Criteria::new()
            .with(Expression::in_list("id", [3i64, 1, 2]))
            .with(Expression::nested(
                Criteria::any()
                    .with(Expression::like("name", "%a%"))
                    .with(Expression::is_null("age")),
            ))
            .order_by("id", Order::Asc)
            .limit(2);
        let compile = || {
            let mut out = Query::new(QueryShape::Select);
            WRITER
                .write_select(&mut out, person(), &criteria)
                .expect("Failed to write the select");
            (out.text, out.params)
        };
        assert_eq!(compile(), compile());
    }

    #[test]
    fn sql_count() {
        let criteria = Criteria::new()
            .with(Expression::greater("age", 18))
            .order_by("age", Order::Asc)
            .limit(5);
        let mut out = Query::new(QueryShape::Count);
        WRITER
            .write_count(&mut out, person(), &criteria)
            .expect("Failed to write the count");
        assert_eq!(
            out.text,
            indoc! {r#"
                SELECT COUNT(*)
                FROM "person"
                WHERE ("age" > ?);
            "#}
            .trim()
        );

        let mut out = Query::new(QueryShape::CountGrouped);
        WRITER
            .write_count_grouped(
                &mut out,
                person(),
                &Criteria::new().with(Expression::greater("age", 1)).limit(3),
                &["age", "name"],
            )
            .expect("Failed to write the grouped count");
        assert_eq!(
            out.text,
            indoc! {r#"
                SELECT "age" AS "gb_0", "full_name" AS "gb_1", COUNT(*) AS "gb_count"
                FROM "person"
                WHERE ("age" > ?)
                GROUP BY "age", "full_name"
                ORDER BY "age", "full_name"
                LIMIT 3;
            "#}
            .trim()
        );

        let mut out = Query::new(QueryShape::CountGrouped);
        WRITER
            .write_count_grouped(&mut out, person(), &Criteria::new(), &[])
            .expect("Failed to write the grouped count");
        assert_eq!(out.text, "SELECT COUNT(*) AS \"gb_count\"\nFROM \"person\";");

        let mut out = Query::new(QueryShape::CountGrouped);
        assert!(
            WRITER
                .write_count_grouped(&mut out, person(), &Criteria::new(), &["missing"])
                .is_err()
        );
    }

    #[test]
    fn sql_join_inner() {
        let criteria = JoinCriteria::inner()
            .on(JoinExpression::equal("id", "author"))
            .left(
                Criteria::any()
                    .with(Expression::like("name", "A%"))
                    .with(Expression::like("name", "B%")),
            )
            .right(Criteria::new().with(Expression::greater("pages", 100)));
        let out = join(&criteria);
        assert_eq!(
            out.text,
            indoc! {r#"
                SELECT la."id" AS "la_id", la."name" AS "la_name", rb."id" AS "rb_id", rb."author_id" AS "rb_author_id", rb."pages" AS "rb_pages"
                FROM "author" AS la
                INNER JOIN "book" AS rb ON (la."id" = rb."author_id")
                WHERE ((la."name" LIKE ?) OR (la."name" LIKE ?)) AND (rb."pages" > ?);
            "#}
            .trim()
        );
        assert_eq!(
            out.params,
            [
                Value::Varchar(Some("A%".into())),
                Value::Varchar(Some("B%".into())),
                Value::Int32(Some(100)),
            ]
        );

        let mut out = Query::new(QueryShape::JoinCount);
        WRITER
            .write_join_count(&mut out, author(), book(), &criteria.clone().limit(1))
            .expect("Failed to write the join count");
        assert_eq!(
            out.text,
            indoc! {r#"
                SELECT COUNT(*)
                FROM "author" AS la
                INNER JOIN "book" AS rb ON (la."id" = rb."author_id")
                WHERE ((la."name" LIKE ?) OR (la."name" LIKE ?)) AND (rb."pages" > ?);
            "#}
            .trim()
        );
    }

    #[test]
    fn sql_join_left_outer() {
        let criteria = JoinCriteria::left_outer()
            .on(JoinExpression::equal("id", "author"))
            .on(JoinExpression::greater("id", "pages"))
            .left(Criteria::new().with(Expression::like("name", "A%")))
            .right(
                Criteria::new()
                    .with(Expression::greater("pages", 100))
                    .with(Expression::lesser("pages", 500)),
            )
            .order_by_left("name", Order::Asc)
            .order_by_right("pages", Order::Desc)
            .start(1)
            .limit(2);
        let out = join(&criteria);
        assert_eq!(
            out.text,
            indoc! {r#"
                SELECT la."id" AS "la_id", la."name" AS "la_name", rb."id" AS "rb_id", rb."author_id" AS "rb_author_id", rb."pages" AS "rb_pages"
                FROM "author" AS la
                LEFT JOIN "book" AS rb ON ((la."id" = rb."author_id") AND (la."id" > rb."pages")) AND ((rb."pages" > ?) AND (rb."pages" < ?))
                WHERE (la."name" LIKE ?)
                ORDER BY la."name" ASC, rb."pages" DESC
                LIMIT 2 OFFSET 1;
            "#}
            .trim()
        );
        assert_eq!(
            out.params,
            [
                Value::Int32(Some(100)),
                Value::Int32(Some(500)),
                Value::Varchar(Some("A%".into())),
            ]
        );
    }

    #[test]
    fn sql_join_right_outer() {
        let criteria = JoinCriteria::right_outer()
            .on(JoinExpression::lesser("id", "author").invert())
            .left(Criteria::new().with(Expression::like("name", "A%")));
        assert_eq!(
            join(&criteria).text,
            indoc! {r#"
                SELECT la."id" AS "la_id", la."name" AS "la_name", rb."id" AS "rb_id", rb."author_id" AS "rb_author_id", rb."pages" AS "rb_pages"
                FROM "author" AS la
                RIGHT JOIN "book" AS rb ON (la."id" >= rb."author_id") AND (la."name" LIKE ?);
            "#}
            .trim()
        );
    }

    #[test]
    fn sql_join_outer() {
        let criteria = JoinCriteria::outer()
            .on(JoinExpression::equal("id", "author"))
            .on(JoinExpression::lesser("id", "pages"))
            .operator(BooleanOperator::Or)
            .left(Criteria::new().with(Expression::like("name", "A%")))
            .right(Criteria::new().with(Expression::greater("pages", 100)));
        assert_eq!(
            join(&criteria).text,
            indoc! {r#"
                SELECT la."id" AS "la_id", la."name" AS "la_name", rb."id" AS "rb_id", rb."author_id" AS "rb_author_id", rb."pages" AS "rb_pages"
                FROM (SELECT * FROM "author" WHERE ("name" LIKE ?)) AS la
                FULL OUTER JOIN (SELECT * FROM "book" WHERE ("pages" > ?)) AS rb ON (la."id" = rb."author_id") OR (la."id" < rb."pages");
            "#}
            .trim()
        );
    }

    #[test]
    fn sql_join_invalid() {
        let mut out = Query::new(QueryShape::Join);
        let error = WRITER
            .write_join_select(&mut out, author(), book(), &JoinCriteria::inner())
            .expect_err("A join needs a predicate");
        assert!(matches!(
            error.downcast_ref::<DaoError>(),
            Some(DaoError::EmptyCriteria { .. })
        ));

        let mut out = Query::new(QueryShape::Join);
        let error = WRITER
            .write_join_select(
                &mut out,
                author(),
                book(),
                &JoinCriteria::inner().on(JoinExpression::equal("id", "name")),
            )
            .expect_err("`name` is not a property of book");
        assert!(matches!(
            error.downcast_ref::<DaoError>(),
            Some(DaoError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn sql_ddl() {
        let mut out = Query::new(QueryShape::Statement);
        WRITER
            .write_create_table(&mut out, person(), false)
            .expect("Failed to write the table");
        assert_eq!(
            out.text,
            indoc! {r#"
                CREATE TABLE "person" (
                "id" BIGINT PRIMARY KEY,
                "full_name" VARCHAR NOT NULL,
                "age" INTEGER,
                "flags" BIGINT
                );
            "#}
            .trim()
        );

        let mut out = Query::new(QueryShape::Statement);
        WRITER
            .write_create_table(
                &mut out,
                Mapping::new(&MEMBERSHIP_TABLE, &MEMBERSHIP_COLUMNS),
                true,
            )
            .expect("Failed to write the table");
        assert_eq!(
            out.text,
            indoc! {r#"
                CREATE TABLE IF NOT EXISTS "shop"."membership" (
                "member" BIGINT NOT NULL,
                "club" BIGINT NOT NULL,
                "since" DATE,
                PRIMARY KEY ("member", "club")
                );
            "#}
            .trim()
        );

        let mut out = Query::new(QueryShape::Statement);
        WRITER.write_drop_table(&mut out, person(), true);
        assert_eq!(out.text, "DROP TABLE IF EXISTS \"person\";");

        let mut out = Query::new(QueryShape::Statement);
        WRITER.write_drop_table(&mut out, person(), false);
        assert_eq!(out.text, "DROP TABLE \"person\";");
    }

    #[test]
    fn sql_dml() {
        let mut out = Query::new(QueryShape::Statement);
        WRITER
            .write_insert(
                &mut out,
                person(),
                &[
                    Value::Int64(Some(1)),
                    Value::Varchar(Some("Ann".into())),
                    Value::Int32(None),
                    Value::Int64(Some(0)),
                ],
            )
            .expect("Failed to write the insert");
        assert_eq!(
            out.text,
            "INSERT INTO \"person\" (\"id\", \"full_name\", \"age\", \"flags\") VALUES (?, ?, ?, ?);"
        );
        assert_eq!(out.params.len(), 4);
        assert!(
            WRITER
                .write_insert(&mut Query::new(QueryShape::Statement), person(), &[])
                .is_err()
        );

        let mut out = Query::new(QueryShape::Statement);
        WRITER
            .write_update(
                &mut out,
                person(),
                &Criteria::new().with(Expression::equal("id", 1i64)),
                &[("name", "Bob".into()), ("age", 3.into())],
            )
            .expect("Failed to write the update");
        assert_eq!(
            out.text,
            indoc! {r#"
                UPDATE "person" SET "full_name" = ?, "age" = ?
                WHERE ("id" = ?);
            "#}
            .trim()
        );
        assert_eq!(
            out.params,
            [
                Value::Varchar(Some("Bob".into())),
                Value::Int32(Some(3)),
                Value::Int64(Some(1)),
            ]
        );

        let error = WRITER
            .write_update(
                &mut Query::new(QueryShape::Statement),
                person(),
                &Criteria::new(),
                &[("age", 3.into())],
            )
            .expect_err("An update needs a criteria");
        assert!(matches!(
            error.downcast_ref::<DaoError>(),
            Some(DaoError::EmptyCriteria { operation: "update" })
        ));
        let error = WRITER
            .write_update(
                &mut Query::new(QueryShape::Statement),
                person(),
                &Criteria::new().with(Expression::equal("id", 1i64)),
                &[],
            )
            .expect_err("An update needs values");
        assert!(matches!(
            error.downcast_ref::<DaoError>(),
            Some(DaoError::EmptyAssignment)
        ));

        let mut out = Query::new(QueryShape::Statement);
        WRITER
            .write_delete(
                &mut out,
                person(),
                &Criteria::new().with(Expression::lesser("age", 18)),
            )
            .expect("Failed to write the delete");
        assert_eq!(out.text, "DELETE FROM \"person\"\nWHERE (\"age\" < ?);");
        let error = WRITER
            .write_delete(&mut Query::new(QueryShape::Statement), person(), &Criteria::new())
            .expect_err("A delete needs a criteria");
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));

        let mut out = Query::new(QueryShape::Statement);
        WRITER.write_delete_all(&mut out, person());
        assert_eq!(out.text, "DELETE FROM \"person\";");
    }

    #[test]
    fn sql_identifiers() {
        static ODD_TABLE: TableRef = TableRef::new("odd\"table");
        static ODD_COLUMNS: [ColumnDef; 1] =
            [ColumnDef::new("value", "the \"value\"", Value::Varchar(None))];
        let mut out = Query::new(QueryShape::Select);
        WRITER
            .write_select(
                &mut out,
                Mapping::new(&ODD_TABLE, &ODD_COLUMNS),
                &Criteria::new().with(Expression::is_not_null("value")),
            )
            .expect("Failed to write the select");
        assert_eq!(
            out.text,
            indoc! {r#"
                SELECT *
                FROM "odd""table"
                WHERE ("the ""value""" IS NOT NULL);
            "#}
            .trim()
        );
    }

    #[test]
    fn sql_transactions() {
        let mut out = String::new();
        WRITER.write_transaction_begin(&mut out);
        WRITER.write_transaction_commit(&mut out);
        WRITER.write_transaction_rollback(&mut out);
        assert_eq!(out, "BEGIN;COMMIT;ROLLBACK;");
    }
}
