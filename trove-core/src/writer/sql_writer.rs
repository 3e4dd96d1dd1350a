use crate::{
    BooleanOperator, ColumnDef, Criteria, DaoError, Error, Expression, JoinCriteria,
    JoinExpression, JoinSortOrder, JoinType, Mapping, Order, Query, Result, SortOrder, TableRef,
    Value, possibly_parenthesized, separated_by,
    writer::{Context, Fragment},
};

/// Alias of the left table in join queries.
pub const LEFT_ALIAS: &str = "la";
/// Alias of the right table in join queries.
pub const RIGHT_ALIAS: &str = "rb";

macro_rules! write_integer {
    ($out:ident, $value:expr) => {{
        let mut buffer = itoa::Buffer::new();
        $out.push_str(buffer.format($value));
    }};
}

/// Dialect printer lowering criteria into parameterized SQL.
///
/// Every method has a default following the generic SQL conventions, a
/// dialect overrides the hooks where it differs (quoting, placeholders,
/// pagination, join keywords, column types).
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    /// Whether the current fragment declares table aliases.
    fn alias_declaration(&self, context: &Context) -> bool {
        matches!(context.fragment, Fragment::SqlSelectFrom | Fragment::SqlJoin)
    }

    /// Escape occurrences of `search` char with `replace` while copying into buffer.
    fn write_escaped(
        &self,
        _context: &Context,
        out: &mut String,
        value: &str,
        search: char,
        replace: &str,
    ) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    /// Quote identifiers ("name") doubling inner quotes.
    fn write_identifier_quoted(&self, context: &Context, out: &mut Query, value: &str) {
        out.push('"');
        self.write_escaped(context, &mut out.text, value, '"', "\"\"");
        out.push('"');
    }

    /// Render a table reference, followed by its alias where aliases are declared.
    fn write_table_ref(&self, context: &Context, out: &mut Query, value: &TableRef) {
        if !value.schema.is_empty() {
            self.write_identifier_quoted(context, out, value.schema);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, value.name);
        if self.alias_declaration(context) && !context.qualifier.is_empty() {
            out.push_str(" AS ");
            out.push_str(context.qualifier);
        }
    }

    /// Render a column, qualified by the table alias when the context has one.
    fn write_column(&self, context: &Context, out: &mut Query, column: &ColumnDef) {
        if !context.qualifier.is_empty() {
            out.push_str(context.qualifier);
            out.push('.');
        }
        self.write_identifier_quoted(context, out, column.name);
    }

    /// Render ` AS "alias"` after a projected column.
    fn write_column_alias(&self, context: &Context, out: &mut Query, alias: &str) {
        out.push_str(" AS ");
        self.write_identifier_quoted(context, out, alias);
    }

    /// Render a parameter placeholder and bind its value.
    fn write_placeholder(&self, _context: &Context, out: &mut Query, value: Value) {
        out.push('?');
        out.bind(value);
    }

    /// Render the SQL type for a `Value` prototype.
    fn write_column_type(&self, _context: &Context, out: &mut Query, value: &Value) {
        out.push_str(match value {
            Value::Null => "VARCHAR",
            Value::Boolean(..) => "BOOLEAN",
            Value::Int32(..) => "INTEGER",
            Value::Int64(..) => "BIGINT",
            Value::Float64(..) => "DOUBLE",
            Value::Decimal(..) => "DECIMAL",
            Value::Varchar(..) => "VARCHAR",
            Value::Blob(..) => "BLOB",
            Value::Date(..) => "DATE",
            Value::Time(..) => "TIME",
            Value::Timestamp(..) => "TIMESTAMP",
            Value::Uuid(..) => "UUID",
        });
    }

    /// Lower one expression into a parenthesized clause.
    fn write_expression(
        &self,
        context: &Context,
        out: &mut Query,
        mapping: Mapping,
        expression: &Expression,
    ) -> Result<()> {
        let null_operand = |property: &str| {
            Error::new(DaoError::NullOperand {
                property: property.to_string(),
                clause: expression.clause_name(),
            })
        };
        out.push('(');
        match expression {
            Expression::Equal {
                property,
                value,
                true_or_not,
            }
            | Expression::EqualCaseInsensitive {
                property,
                value,
                true_or_not,
            } => {
                let column = mapping.column(property)?;
                if value.is_null() {
                    self.write_column(context, out, column);
                    out.push_str(if *true_or_not {
                        " IS NULL"
                    } else {
                        " IS NOT NULL"
                    });
                } else if matches!(expression, Expression::EqualCaseInsensitive { .. }) {
                    out.push_str("LOWER(");
                    self.write_column(context, out, column);
                    out.push_str(if *true_or_not { ") = " } else { ") <> " });
                    out.push_str("LOWER(");
                    self.write_placeholder(context, out, value.clone());
                    out.push(')');
                } else {
                    self.write_column(context, out, column);
                    out.push_str(if *true_or_not { " = " } else { " <> " });
                    self.write_placeholder(context, out, value.clone());
                }
            }
            Expression::Greater {
                property,
                value,
                true_or_not,
            }
            | Expression::Lesser {
                property,
                value,
                true_or_not,
            } => {
                let column = mapping.column(property)?;
                if value.is_null() {
                    return Err(null_operand(property));
                }
                let greater = matches!(expression, Expression::Greater { .. });
                self.write_column(context, out, column);
                out.push_str(match (greater, *true_or_not) {
                    (true, true) => " > ",
                    (true, false) => " <= ",
                    (false, true) => " < ",
                    (false, false) => " >= ",
                });
                self.write_placeholder(context, out, value.clone());
            }
            Expression::Between {
                property,
                min,
                max,
                true_or_not,
            } => {
                let column = mapping.column(property)?;
                if min.is_null() || max.is_null() {
                    return Err(null_operand(property));
                }
                let (lower, glue, upper) = if *true_or_not {
                    (" >= ", " AND ", " <= ")
                } else {
                    (" < ", " OR ", " > ")
                };
                self.write_column(context, out, column);
                out.push_str(lower);
                self.write_placeholder(context, out, min.clone());
                out.push_str(glue);
                self.write_column(context, out, column);
                out.push_str(upper);
                self.write_placeholder(context, out, max.clone());
            }
            Expression::Like {
                property,
                pattern,
                true_or_not,
            } => {
                let column = mapping.column(property)?;
                self.write_column(context, out, column);
                out.push_str(if *true_or_not { " LIKE " } else { " NOT LIKE " });
                self.write_placeholder(context, out, Value::Varchar(Some(pattern.clone())));
            }
            Expression::LikeCaseInsensitive {
                property,
                pattern,
                true_or_not,
            } => {
                let column = mapping.column(property)?;
                out.push_str("LOWER(");
                self.write_column(context, out, column);
                out.push_str(if *true_or_not {
                    ") LIKE LOWER("
                } else {
                    ") NOT LIKE LOWER("
                });
                self.write_placeholder(context, out, Value::Varchar(Some(pattern.clone())));
                out.push(')');
            }
            Expression::BitwiseAnd {
                property,
                mask,
                true_or_not,
            } => {
                let column = mapping.column(property)?;
                out.push('(');
                self.write_column(context, out, column);
                out.push_str(" & ");
                self.write_placeholder(context, out, Value::Int64(Some(*mask)));
                out.push_str(if *true_or_not { ") = " } else { ") <> " });
                self.write_placeholder(context, out, Value::Int64(Some(*mask)));
            }
            Expression::PropertyInList {
                property,
                values,
                true_or_not,
            } => {
                let column = mapping.column(property)?;
                if values.is_empty() {
                    return Err(Error::new(DaoError::EmptyInList(property.clone())));
                }
                self.write_column(context, out, column);
                out.push_str(if *true_or_not { " IN (" } else { " NOT IN (" });
                separated_by(
                    out,
                    values,
                    |out, v| {
                        self.write_placeholder(context, out, v.clone());
                        Ok(())
                    },
                    ", ",
                )?;
                out.push(')');
            }
            Expression::Nested(criteria) => {
                if criteria.is_empty() {
                    return Err(Error::new(DaoError::EmptyCriteria {
                        operation: "nested criteria",
                    }));
                }
                self.write_expressions(
                    context,
                    out,
                    mapping,
                    &criteria.expressions,
                    criteria.operator,
                )?;
            }
            Expression::Raw { clause, params } => {
                out.push_str(clause);
                for param in params {
                    out.bind(param.clone());
                }
            }
        }
        out.push(')');
        Ok(())
    }

    /// Lower a list of expressions glued by `operator`.
    fn write_expressions(
        &self,
        context: &Context,
        out: &mut Query,
        mapping: Mapping,
        expressions: &[Expression],
        operator: BooleanOperator,
    ) -> Result<()> {
        let separator = format!(" {} ", operator);
        separated_by(
            out,
            expressions,
            |out, v| self.write_expression(context, out, mapping, v),
            &separator,
        )
    }

    /// Render `\nWHERE ...` unless the criteria is empty.
    fn write_where(
        &self,
        context: &Context,
        out: &mut Query,
        mapping: Mapping,
        criteria: &Criteria,
    ) -> Result<()> {
        if criteria.is_empty() {
            return Ok(());
        }
        out.push_str("\nWHERE ");
        self.write_expressions(
            &context.switch_fragment(Fragment::SqlSelectWhere),
            out,
            mapping,
            &criteria.expressions,
            criteria.operator,
        )
    }

    /// Render one sort key, computed keys are written verbatim.
    fn write_order(
        &self,
        context: &Context,
        out: &mut Query,
        mapping: Mapping,
        property: &str,
        direction: Order,
    ) -> Result<()> {
        if direction == Order::Computed {
            out.push_str(property);
            return Ok(());
        }
        self.write_column(context, out, mapping.column(property)?);
        out.push_str(if direction == Order::Desc {
            " DESC"
        } else {
            " ASC"
        });
        Ok(())
    }

    fn write_order_by(
        &self,
        context: &Context,
        out: &mut Query,
        mapping: Mapping,
        orders: &[SortOrder],
    ) -> Result<()> {
        if orders.is_empty() {
            return Ok(());
        }
        out.push_str("\nORDER BY ");
        let context = context.switch_fragment(Fragment::SqlSelectOrderBy);
        separated_by(
            out,
            orders,
            |out, v| self.write_order(&context, out, mapping, &v.property, v.direction),
            ", ",
        )
    }

    /// Render `LIMIT`/`OFFSET`.
    fn write_pagination(
        &self,
        _context: &Context,
        out: &mut Query,
        start: Option<u64>,
        limit: Option<u64>,
    ) {
        if let Some(limit) = limit {
            out.push_str("\nLIMIT ");
            write_integer!(out, limit);
        }
        if let Some(start) = start {
            out.push_str(if limit.is_some() {
                " OFFSET "
            } else {
                "\nOFFSET "
            });
            write_integer!(out, start);
        }
    }

    /// Whether the dialect has a keyword for `join_type`.
    fn supports_join_type(&self, _join_type: JoinType) -> bool {
        true
    }

    fn full_outer_join_keyword(&self) -> &'static str {
        "FULL OUTER JOIN"
    }

    /// Emit the join keyword.
    fn write_join_type(&self, _context: &Context, out: &mut Query, join_type: JoinType) {
        out.push_str(match join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::LeftOuter => "LEFT JOIN",
            JoinType::RightOuter => "RIGHT JOIN",
            JoinType::Outer => self.full_outer_join_keyword(),
        });
    }

    /// Lower a join expression, both sides are qualified by their alias.
    fn write_join_expression(
        &self,
        context: &Context,
        out: &mut Query,
        left: Mapping,
        right: Mapping,
        expression: &JoinExpression,
    ) -> Result<()> {
        let left_column = left.column(expression.left_property())?;
        let right_column = right.column(expression.right_property())?;
        out.push('(');
        self.write_column(&context.qualified(LEFT_ALIAS), out, left_column);
        out.push_str(match (expression, expression.true_or_not()) {
            (JoinExpression::Equal { .. }, true) => " = ",
            (JoinExpression::Equal { .. }, false) => " <> ",
            (JoinExpression::Greater { .. }, true) => " > ",
            (JoinExpression::Greater { .. }, false) => " <= ",
            (JoinExpression::Lesser { .. }, true) => " < ",
            (JoinExpression::Lesser { .. }, false) => " >= ",
        });
        self.write_column(&context.qualified(RIGHT_ALIAS), out, right_column);
        out.push(')');
        Ok(())
    }

    /// Render one side of the FROM clause. Full outer joins filter each side
    /// in a derived table, otherwise the filter goes to WHERE or ON.
    fn write_join_source(
        &self,
        context: &Context,
        out: &mut Query,
        mapping: Mapping,
        filter: Option<&Criteria>,
        alias: &'static str,
    ) -> Result<()> {
        match filter {
            Some(filter) => {
                let inner = Context::new(Fragment::SqlSelect);
                out.push_str("(SELECT * FROM ");
                self.write_table_ref(&inner, out, mapping.table);
                out.push_str(" WHERE ");
                self.write_expressions(
                    &inner.switch_fragment(Fragment::SqlSelectWhere),
                    out,
                    mapping,
                    &filter.expressions,
                    filter.operator,
                )?;
                out.push_str(") AS ");
                out.push_str(alias);
            }
            None => self.write_table_ref(&context.qualified(alias), out, mapping.table),
        }
        Ok(())
    }

    /// Render the common part of join queries: FROM, JOIN, ON and WHERE.
    fn write_join_body(
        &self,
        out: &mut Query,
        left: Mapping,
        right: Mapping,
        criteria: &JoinCriteria,
    ) -> Result<()> {
        criteria.validate()?;
        let context = Context::new(Fragment::SqlJoin);
        let left_filter = criteria.side_filter(true);
        let right_filter = criteria.side_filter(false);
        let outer = criteria.join_type == JoinType::Outer;
        let (on_filter, where_filters) = match criteria.join_type {
            JoinType::Inner => (
                None,
                vec![
                    (left, left_filter, LEFT_ALIAS),
                    (right, right_filter, RIGHT_ALIAS),
                ],
            ),
            JoinType::LeftOuter => (
                right_filter.map(|v| (right, v, RIGHT_ALIAS)),
                vec![(left, left_filter, LEFT_ALIAS)],
            ),
            JoinType::RightOuter => (
                left_filter.map(|v| (left, v, LEFT_ALIAS)),
                vec![(right, right_filter, RIGHT_ALIAS)],
            ),
            JoinType::Outer => (None, vec![]),
        };
        out.push_str("\nFROM ");
        self.write_join_source(
            &context,
            out,
            left,
            left_filter.filter(|_| outer),
            LEFT_ALIAS,
        )?;
        out.push('\n');
        self.write_join_type(&context, out, criteria.join_type);
        out.push(' ');
        self.write_join_source(
            &context,
            out,
            right,
            right_filter.filter(|_| outer),
            RIGHT_ALIAS,
        )?;
        out.push_str(" ON ");
        let on_context = context.switch_fragment(Fragment::SqlJoinOn);
        let separator = format!(" {} ", criteria.operator);
        possibly_parenthesized!(
            out,
            on_filter.is_some() && criteria.expressions.len() > 1,
            separated_by(
                out,
                &criteria.expressions,
                |out, v| self.write_join_expression(&on_context, out, left, right, v),
                &separator,
            )?
        );
        if let Some((mapping, filter, alias)) = on_filter {
            out.push_str(" AND ");
            possibly_parenthesized!(
                out,
                filter.expressions.len() > 1,
                self.write_expressions(
                    &on_context.qualified(alias),
                    out,
                    mapping,
                    &filter.expressions,
                    filter.operator,
                )?
            );
        }
        let where_filters: Vec<_> = where_filters
            .into_iter()
            .filter_map(|(mapping, filter, alias)| filter.map(|v| (mapping, v, alias)))
            .collect();
        if !where_filters.is_empty() {
            out.push_str("\nWHERE ");
            let where_context = context.switch_fragment(Fragment::SqlSelectWhere);
            let grouped = where_filters.len() > 1;
            separated_by(
                out,
                where_filters,
                |out, (mapping, filter, alias)| {
                    possibly_parenthesized!(
                        out,
                        grouped && filter.expressions.len() > 1,
                        self.write_expressions(
                            &where_context.qualified(alias),
                            out,
                            mapping,
                            &filter.expressions,
                            filter.operator,
                        )?
                    );
                    Ok(())
                },
                " AND ",
            )?;
        }
        Ok(())
    }

    /// Emit a join SELECT projecting the left columns then the right ones,
    /// aliased `la_<column>` and `rb_<column>`.
    fn write_join_select(
        &self,
        out: &mut Query,
        left: Mapping,
        right: Mapping,
        criteria: &JoinCriteria,
    ) -> Result<()> {
        out.text.reserve(256 + (left.columns.len() + right.columns.len()) * 32);
        out.push_str("SELECT ");
        let context = Context::new(Fragment::SqlSelect);
        let columns = left
            .columns
            .iter()
            .map(|c| (c, LEFT_ALIAS))
            .chain(right.columns.iter().map(|c| (c, RIGHT_ALIAS)));
        separated_by(
            out,
            columns,
            |out, (column, alias)| {
                self.write_column(&context.qualified(alias), out, column);
                self.write_column_alias(&context, out, &format!("{}_{}", alias, column.name));
                Ok(())
            },
            ", ",
        )?;
        self.write_join_body(out, left, right, criteria)?;
        self.write_join_order_by(&context, out, left, right, &criteria.orders)?;
        self.write_pagination(&context, out, criteria.start, criteria.limit);
        out.push(';');
        Ok(())
    }

    fn write_join_order_by(
        &self,
        context: &Context,
        out: &mut Query,
        left: Mapping,
        right: Mapping,
        orders: &[JoinSortOrder],
    ) -> Result<()> {
        if orders.is_empty() {
            return Ok(());
        }
        out.push_str("\nORDER BY ");
        let context = context.switch_fragment(Fragment::SqlSelectOrderBy);
        separated_by(
            out,
            orders,
            |out, v| {
                let (mapping, alias) = if v.is_for_left {
                    (left, LEFT_ALIAS)
                } else {
                    (right, RIGHT_ALIAS)
                };
                self.write_order(&context.qualified(alias), out, mapping, &v.property, v.direction)
            },
            ", ",
        )
    }

    /// Emit a join count, pagination is applied by the caller on the total.
    fn write_join_count(
        &self,
        out: &mut Query,
        left: Mapping,
        right: Mapping,
        criteria: &JoinCriteria,
    ) -> Result<()> {
        out.push_str("SELECT COUNT(*)");
        self.write_join_body(out, left, right, criteria)?;
        out.push(';');
        Ok(())
    }

    /// Emit SELECT statement (FROM, WHERE, ORDER BY, LIMIT).
    fn write_select(&self, out: &mut Query, mapping: Mapping, criteria: &Criteria) -> Result<()> {
        let context = Context::new(Fragment::SqlSelect);
        out.push_str("SELECT *\nFROM ");
        self.write_table_ref(
            &context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            mapping.table,
        );
        self.write_where(&context, out, mapping, criteria)?;
        self.write_order_by(&context, out, mapping, &criteria.orders)?;
        self.write_pagination(&context, out, criteria.start, criteria.limit);
        out.push(';');
        Ok(())
    }

    /// Emit a count, pagination is applied by the caller on the total.
    fn write_count(&self, out: &mut Query, mapping: Mapping, criteria: &Criteria) -> Result<()> {
        let context = Context::new(Fragment::SqlSelect);
        out.push_str("SELECT COUNT(*)\nFROM ");
        self.write_table_ref(
            &context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            mapping.table,
        );
        self.write_where(&context, out, mapping, criteria)?;
        out.push(';');
        Ok(())
    }

    /// Emit a grouped count: group columns are aliased `gb_0`, `gb_1`, ...
    /// and the count `gb_count`, groups are ordered by their values.
    fn write_count_grouped(
        &self,
        out: &mut Query,
        mapping: Mapping,
        criteria: &Criteria,
        group_by: &[&str],
    ) -> Result<()> {
        let context = Context::new(Fragment::SqlSelect);
        let columns = group_by
            .iter()
            .map(|v| mapping.column(v))
            .collect::<Result<Vec<_>>>()?;
        out.push_str("SELECT ");
        for (i, column) in columns.iter().enumerate() {
            self.write_column(&context, out, column);
            self.write_column_alias(&context, out, &format!("gb_{}", i));
            out.push_str(", ");
        }
        out.push_str("COUNT(*)");
        self.write_column_alias(&context, out, "gb_count");
        out.push_str("\nFROM ");
        self.write_table_ref(
            &context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            mapping.table,
        );
        self.write_where(&context, out, mapping, criteria)?;
        if !columns.is_empty() {
            let group_context = context.switch_fragment(Fragment::SqlSelectGroupBy);
            out.push_str("\nGROUP BY ");
            separated_by(
                out,
                &columns,
                |out, v| {
                    self.write_column(&group_context, out, v);
                    Ok(())
                },
                ", ",
            )?;
            out.push_str("\nORDER BY ");
            separated_by(
                out,
                &columns,
                |out, v| {
                    self.write_column(&group_context, out, v);
                    Ok(())
                },
                ", ",
            )?;
        }
        self.write_pagination(&context, out, criteria.start, criteria.limit);
        out.push(';');
        Ok(())
    }

    /// Emit CREATE TABLE.
    fn write_create_table(
        &self,
        out: &mut Query,
        mapping: Mapping,
        if_not_exists: bool,
    ) -> Result<()> {
        let context = Context::new(Fragment::SqlCreateTable);
        out.text.reserve(128 + mapping.columns.len() * 64);
        out.push_str("CREATE TABLE ");
        if if_not_exists {
            out.push_str("IF NOT EXISTS ");
        }
        self.write_table_ref(&context, out, mapping.table);
        out.push_str(" (\n");
        let primary_key: Vec<_> = mapping.columns.iter().filter(|c| c.primary_key).collect();
        separated_by(
            out,
            mapping.columns,
            |out, column| {
                self.write_identifier_quoted(&context, out, column.name);
                out.push(' ');
                self.write_column_type(&context, out, &column.value);
                if column.primary_key && primary_key.len() == 1 {
                    out.push_str(" PRIMARY KEY");
                } else if !column.nullable {
                    out.push_str(" NOT NULL");
                }
                Ok(())
            },
            ",\n",
        )?;
        if primary_key.len() > 1 {
            out.push_str(",\nPRIMARY KEY (");
            separated_by(
                out,
                primary_key,
                |out, column| {
                    self.write_identifier_quoted(&context, out, column.name);
                    Ok(())
                },
                ", ",
            )?;
            out.push(')');
        }
        out.push_str("\n);");
        Ok(())
    }

    /// Emit DROP TABLE.
    fn write_drop_table(&self, out: &mut Query, mapping: Mapping, if_exists: bool) {
        let context = Context::new(Fragment::SqlDropTable);
        out.push_str("DROP TABLE ");
        if if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_table_ref(&context, out, mapping.table);
        out.push(';');
    }

    /// Emit a single row INSERT, `row` follows the canonical column order.
    fn write_insert(&self, out: &mut Query, mapping: Mapping, row: &[Value]) -> Result<()> {
        if row.len() != mapping.columns.len() {
            return Err(Error::msg(format!(
                "Table `{}` has {} columns but the row has {} values",
                mapping.table,
                mapping.columns.len(),
                row.len()
            )));
        }
        let context = Context::new(Fragment::SqlInsertInto);
        out.push_str("INSERT INTO ");
        self.write_table_ref(&context, out, mapping.table);
        out.push_str(" (");
        separated_by(
            out,
            mapping.columns,
            |out, v| {
                self.write_identifier_quoted(&context, out, v.name);
                Ok(())
            },
            ", ",
        )?;
        out.push_str(") VALUES (");
        let context = context.switch_fragment(Fragment::SqlInsertIntoValues);
        separated_by(
            out,
            row,
            |out, v| {
                self.write_placeholder(&context, out, v.clone());
                Ok(())
            },
            ", ",
        )?;
        out.push_str(");");
        Ok(())
    }

    /// Emit UPDATE, the criteria must not be empty.
    fn write_update(
        &self,
        out: &mut Query,
        mapping: Mapping,
        criteria: &Criteria,
        values: &[(&str, Value)],
    ) -> Result<()> {
        if criteria.is_empty() {
            return Err(Error::new(DaoError::EmptyCriteria {
                operation: "update",
            }));
        }
        if values.is_empty() {
            return Err(Error::new(DaoError::EmptyAssignment));
        }
        let context = Context::new(Fragment::SqlUpdate);
        out.push_str("UPDATE ");
        self.write_table_ref(&context, out, mapping.table);
        out.push_str(" SET ");
        let set_context = context.switch_fragment(Fragment::SqlUpdateSet);
        separated_by(
            out,
            values,
            |out, (property, value)| {
                self.write_identifier_quoted(&set_context, out, mapping.column(property)?.name);
                out.push_str(" = ");
                self.write_placeholder(&set_context, out, value.clone());
                Ok(())
            },
            ", ",
        )?;
        self.write_where(
            &context.switch_fragment(Fragment::SqlUpdateWhere),
            out,
            mapping,
            criteria,
        )?;
        out.push(';');
        Ok(())
    }

    /// Emit DELETE, the criteria must not be empty.
    fn write_delete(&self, out: &mut Query, mapping: Mapping, criteria: &Criteria) -> Result<()> {
        if criteria.is_empty() {
            return Err(Error::new(DaoError::EmptyCriteria {
                operation: "delete",
            }));
        }
        let context = Context::new(Fragment::SqlDeleteFrom);
        out.push_str("DELETE FROM ");
        self.write_table_ref(&context, out, mapping.table);
        self.write_where(
            &context.switch_fragment(Fragment::SqlDeleteFromWhere),
            out,
            mapping,
            criteria,
        )?;
        out.push(';');
        Ok(())
    }

    /// Emit DELETE of every row.
    fn write_delete_all(&self, out: &mut Query, mapping: Mapping) {
        let context = Context::new(Fragment::SqlDeleteFrom);
        out.push_str("DELETE FROM ");
        self.write_table_ref(&context, out, mapping.table);
        out.push(';');
    }

    /// Emit BEGIN statement.
    fn write_transaction_begin(&self, out: &mut String) {
        out.push_str("BEGIN;");
    }

    /// Emit COMMIT statement.
    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT;");
    }

    /// Emit ROLLBACK statement.
    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK;");
    }
}

/// Fallback generic SQL writer.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl GenericSqlWriter {
    pub fn new() -> Self {
        Self {}
    }
}

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}
