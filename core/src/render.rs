use dynlist_types::{NullsOrder, Primitive, SortDirection};
use serde::Serialize;

use crate::ast::{JoinKind, SelectStatement, TableRef};
use crate::sql::{SQL, Token};

/// Statement text plus the values bound to its `$n` placeholders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedQuery {
    pub text: String,
    pub params: Vec<Primitive>,
}

/// Renders a statement to PostgreSQL text.
///
/// Each `WHERE` predicate is parenthesised before the predicates are joined with
/// `AND`, so an `OR` inside one predicate cannot leak into its neighbours.
/// Placeholders are numbered while writing and the parameter vector is filled
/// in the same pass.
#[must_use]
pub fn render(statement: &SelectStatement) -> RenderedQuery {
    let (text, params) = to_sql(statement).build();
    RenderedQuery { text, params }
}

/// Assembles the statement into a single flat fragment.
pub fn to_sql(statement: &SelectStatement) -> SQL {
    let mut sql = SQL::token(Token::SELECT);

    let columns = statement
        .columns
        .iter()
        .map(|column| column.expr.clone().alias(column.alias.clone()));
    let projection = SQL::join(columns, Token::COMMA);
    if projection.is_empty() {
        sql.push_mut(Token::STAR);
    } else {
        sql.append_mut(projection);
    }

    sql.push_mut(Token::FROM);
    sql.append_mut(table_sql(&statement.from));

    for join in &statement.joins {
        let kind = match join.kind {
            JoinKind::Inner => Token::INNER,
            JoinKind::Left => Token::LEFT,
        };
        sql.push_mut(kind);
        sql.push_mut(Token::JOIN);
        sql.append_mut(table_sql(&join.table));
        sql.push_mut(Token::ON);
        sql.append_mut(join.on.clone());
    }

    if !statement.where_clauses.is_empty() {
        sql.push_mut(Token::WHERE);
        sql.append_mut(SQL::join(
            statement.where_clauses.iter().cloned().map(SQL::parens),
            Token::AND,
        ));
    }

    if !statement.order_by.is_empty() {
        sql.push_mut(Token::ORDER);
        sql.push_mut(Token::BY);
        let entries = statement.order_by.iter().map(|entry| {
            let mut item = entry.expr.clone().push(match entry.direction {
                SortDirection::Asc => Token::ASC,
                SortDirection::Desc => Token::DESC,
            });
            match entry.nulls {
                Some(NullsOrder::First) => {
                    item = item.push(Token::NULLS).push(Token::FIRST);
                }
                Some(NullsOrder::Last) => {
                    item = item.push(Token::NULLS).push(Token::LAST);
                }
                Some(NullsOrder::Default) | None => {}
            }
            item
        });
        sql.append_mut(SQL::join(entries, Token::COMMA));
    }

    if let Some(limit) = statement.limit {
        sql.push_mut(Token::LIMIT);
        sql.append_mut(SQL::number(u64::from(limit)));
    }

    sql
}

fn table_sql(table: &TableRef) -> SQL {
    SQL::table(&table.schema, &table.table).alias(table.alias.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Join, OrderBy, SelectColumn};

    fn statement() -> SelectStatement {
        let mut statement = SelectStatement::new(TableRef {
            schema: "public".into(),
            table: "Customer".into(),
            alias: "root".into(),
        });
        statement.columns.push(SelectColumn::new(SQL::column("root", "id"), "id"));
        statement
            .columns
            .push(SelectColumn::new(SQL::column("root", "name"), "name"));
        statement
    }

    #[test]
    fn test_render_minimal_select() {
        let rendered = render(&statement());
        assert_eq!(
            rendered.text,
            r#"SELECT "root"."id" AS "id", "root"."name" AS "name" FROM "public"."Customer" AS "root""#
        );
        assert!(rendered.params.is_empty());
    }

    #[test]
    fn test_render_full_statement() {
        let mut statement = statement();
        statement.joins.push(Join {
            kind: JoinKind::Left,
            table: TableRef {
                schema: "public".into(),
                table: "User".into(),
                alias: "owner".into(),
            },
            on: SQL::raw(r#"owner."id" = root."ownerId""#),
        });
        statement.push_where(
            SQL::column("root", "name")
                .push(Token::ILIKE)
                .append(SQL::param("%Acme%")),
        );
        statement.push_where(SQL::raw(r#"root."markedForDeletion" = FALSE"#));
        statement.order_by.push(OrderBy {
            field: "name".into(),
            expr: SQL::column("root", "name"),
            direction: SortDirection::Desc,
            nulls: Some(NullsOrder::Last),
            cast: None,
        });
        statement.limit = Some(3);

        let rendered = render(&statement);
        assert_eq!(
            rendered.text,
            concat!(
                r#"SELECT "root"."id" AS "id", "root"."name" AS "name" "#,
                r#"FROM "public"."Customer" AS "root" "#,
                r#"LEFT JOIN "public"."User" AS "owner" ON owner."id" = root."ownerId" "#,
                r#"WHERE ("root"."name" ILIKE $1) AND (root."markedForDeletion" = FALSE) "#,
                r#"ORDER BY "root"."name" DESC NULLS LAST LIMIT 3"#
            )
        );
        assert_eq!(rendered.params, vec![Primitive::from("%Acme%")]);
    }

    #[test]
    fn test_empty_where_is_omitted() {
        let mut statement = statement();
        statement.push_where(SQL::empty());
        assert!(!render(&statement).text.contains("WHERE"));
    }
}
