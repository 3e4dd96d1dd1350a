#[cfg(test)]
mod tests {
    use trove::{
        BooleanOperator, Criteria, DaoError, ErrorKind, Expression, Order, Value, error_kind,
    };

    fn every_kind() -> Vec<Expression> {
        vec![
            Expression::equal("a", 1),
            Expression::not_equal("a", "x"),
            Expression::is_null("a"),
            Expression::equal_case_insensitive("a", "X"),
            Expression::greater("a", 2.5),
            Expression::lesser("a", 3i64),
            Expression::between("a", 1, 9),
            Expression::like("a", "x%"),
            Expression::like_case_insensitive("a", "%X"),
            Expression::bitwise_and("a", 6),
            Expression::in_list("a", [1, 2, 3]),
            Expression::nested(
                Criteria::any()
                    .with(Expression::equal("b", true))
                    .with(Expression::lesser("c", 0)),
            ),
        ]
    }

    #[test]
    fn expression_invert_polarity() {
        for expression in every_kind() {
            let inverted = expression.invert().expect("Failed to invert");
            assert_ne!(inverted, expression);
            if !matches!(expression, Expression::Nested(..)) {
                assert_eq!(inverted.true_or_not(), !expression.true_or_not());
                assert_eq!(inverted.property(), expression.property());
                assert_eq!(inverted.clause_name(), expression.clause_name());
            }
        }
    }

    #[test]
    fn expression_double_invert() {
        for expression in every_kind() {
            let twice = expression
                .invert()
                .and_then(|v| v.invert())
                .expect("Failed to invert");
            assert_eq!(twice, expression);
        }
    }

    #[test]
    fn expression_nested_de_morgan() {
        let nested = Expression::nested(
            Criteria::new()
                .with(Expression::equal("b", true))
                .with(Expression::greater("c", 0)),
        );
        let Expression::Nested(criteria) = nested.invert().expect("Failed to invert") else {
            panic!("The inverse of a nested expression is nested");
        };
        assert_eq!(criteria.operator, BooleanOperator::Or);
        assert_eq!(
            criteria.expressions,
            [
                Expression::not_equal("b", true),
                Expression::Greater {
                    property: "c".into(),
                    value: Value::Int32(Some(0)),
                    true_or_not: false,
                },
            ]
        );
    }

    #[test]
    fn expression_nested_drops_pagination() {
        let nested = Expression::nested(
            Criteria::new()
                .with(Expression::equal("a", 1))
                .order_by("a", Order::Desc)
                .start(2)
                .limit(5),
        );
        let Expression::Nested(criteria) = nested else {
            panic!("Expected a nested expression");
        };
        assert!(criteria.orders.is_empty());
        assert_eq!(criteria.start, None);
        assert_eq!(criteria.limit, None);
    }

    #[test]
    fn criteria_invert() {
        let criteria = Criteria::new()
            .with(Expression::equal("a", 1))
            .with(Expression::like("b", "x%"))
            .order_by("a", Order::Asc)
            .start(1)
            .limit(3);
        let inverted = criteria.invert().expect("Failed to invert");
        assert_eq!(inverted.operator, BooleanOperator::Or);
        assert_eq!(inverted.orders, criteria.orders);
        assert_eq!(inverted.start, Some(1));
        assert_eq!(inverted.limit, Some(3));
        assert_eq!(inverted.invert().expect("Failed to invert"), criteria);
    }

    #[test]
    fn raw_clause_cannot_invert() {
        let raw = Expression::raw("\"a\" % ? = 0", [Value::Int64(Some(2))]);
        assert_eq!(raw.property(), None);
        let error = raw.invert().expect_err("A raw clause cannot be inverted");
        assert_eq!(error_kind(&error), Some(ErrorKind::Configuration));
        assert!(matches!(
            error.downcast_ref::<DaoError>(),
            Some(DaoError::UnsupportedInvert(..))
        ));
        let criteria = Criteria::new()
            .with(Expression::equal("a", 1))
            .with(Expression::nested(Criteria::new().with(raw)));
        assert!(criteria.invert().is_err());
    }

    #[test]
    fn operator_combine() {
        let and = BooleanOperator::And;
        let or = BooleanOperator::Or;
        assert_eq!(and.invert(), or);
        assert_eq!(or.invert(), and);
        assert!(and.combine([true, true], Ok).expect("Failed to combine"));
        assert!(!and.combine([true, false], Ok).expect("Failed to combine"));
        assert!(or.combine([false, true], Ok).expect("Failed to combine"));
        assert!(!or.combine([false, false], Ok).expect("Failed to combine"));
        assert!(and.combine([], Ok).expect("Failed to combine"));
        assert!(!or.combine([], Ok).expect("Failed to combine"));
        // The second term fails if evaluated
        let terms: [Result<bool, ()>; 2] = [Ok(false), Err(())];
        assert!(
            !and.combine(terms, |v| v.map_err(|_| trove::Error::msg("evaluated")))
                .expect("Failed to combine")
        );
        assert_eq!(and.to_string(), "AND");
        assert_eq!(or.to_string(), "OR");
    }
}
