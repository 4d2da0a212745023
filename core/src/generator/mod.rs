//! Base query generation: [`EntityMetadata`] + [`ListContext`] to [`SelectStatement`].

mod filters;

use dynlist_types::{EntityMetadata, ListContext, ListSearch, ListSort, SearchMode};

use crate::ast::{Join, JoinKind, OrderBy, SelectColumn, SelectStatement, TableRef};
use crate::error::Result;
use crate::sql::{SQL, SQLChunk, Token};
use crate::{dynlist_trace_dropped, ListError};

use filters::{column_sql, compile_filter, ilike};

/// Output alias of the projected row key.
pub const GLOBAL_KEY_ALIAS: &str = "global_key";

/// A generated statement plus what the generator made of the caller's input.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuery {
    pub statement: SelectStatement,
    /// Caller filters that produced a predicate.
    pub applied_filters: usize,
    /// The search term, when a search predicate was added.
    pub search_term: Option<String>,
}

/// Builds the base statement for a list request.
///
/// # Errors
///
/// Returns a validation error when a filter value has the wrong shape for its
/// operator or cannot be coerced to the field type.
pub fn build(metadata: &EntityMetadata, context: &ListContext) -> Result<SelectStatement> {
    build_with_summary(metadata, context).map(|generated| generated.statement)
}

/// Like [`build`], also reporting which parts of the context were applied.
pub fn build_with_summary(
    metadata: &EntityMetadata,
    context: &ListContext,
) -> Result<GeneratedQuery> {
    let mut statement = SelectStatement::new(TableRef {
        schema: metadata.schema.clone(),
        table: metadata.base_table.clone(),
        alias: metadata.base_alias.clone(),
    });

    project(&mut statement, metadata);
    join(&mut statement, metadata);
    let applied_filters = filter(&mut statement, metadata, context)?;
    secure(&mut statement, metadata)?;
    let search_term = search(&mut statement, metadata, context.search.as_ref());
    sort(&mut statement, metadata, context);

    Ok(GeneratedQuery {
        statement,
        applied_filters,
        search_term,
    })
}

/// Every field under its logical name, plus the composite row key.
fn project(statement: &mut SelectStatement, metadata: &EntityMetadata) {
    statement.columns.extend(
        metadata
            .fields
            .iter()
            .map(|field| SelectColumn::new(column_sql(field), field.field.clone())),
    );

    let parts = metadata.global_key_fields.iter().map(|name| {
        let column = match metadata.field(name) {
            Some(field) => column_sql(field),
            None => SQL::column(&metadata.base_alias, name),
        };
        SQL::func(
            Token::COALESCE,
            column.cast("text").push(Token::COMMA).push(SQLChunk::raw("''")),
        )
    });
    let key = SQL::func(
        Token::ARRAY_TO_STRING,
        SQL::token(Token::ARRAY)
            .push(Token::LBRACKET)
            .append(SQL::join(parts, Token::COMMA))
            .push(Token::RBRACKET)
            .push(Token::COMMA)
            .push(SQLChunk::raw("'::'")),
    );
    statement.columns.push(SelectColumn::new(key, GLOBAL_KEY_ALIAS));
}

fn join(statement: &mut SelectStatement, metadata: &EntityMetadata) {
    statement.joins.extend(metadata.joins.iter().map(|join| Join {
        kind: if join.required {
            JoinKind::Inner
        } else {
            JoinKind::Left
        },
        table: TableRef {
            schema: metadata.schema.clone(),
            table: join.table.clone(),
            alias: join.alias.clone(),
        },
        on: SQL::raw(join.on.clone()),
    }));
}

fn filter(
    statement: &mut SelectStatement,
    metadata: &EntityMetadata,
    context: &ListContext,
) -> Result<usize> {
    let mut applied = 0;
    for filter in &context.filters {
        let Some(field) = metadata.field(&filter.field).filter(|field| field.filterable) else {
            dynlist_trace_dropped!("filter", filter.field);
            continue;
        };
        if let Some(predicate) = compile_filter(field, filter)? {
            statement.push_where(predicate);
            applied += 1;
        }
    }
    Ok(applied)
}

fn secure(statement: &mut SelectStatement, metadata: &EntityMetadata) -> Result<()> {
    for security in &metadata.security_filters {
        let placeholders = security.clause.matches('?').count();
        if placeholders != security.params.len() {
            return Err(ListError::Execution(format!(
                "security filter expects {placeholders} parameters, {} supplied",
                security.params.len()
            )));
        }
        statement.push_where(SQL::with_placeholders(&security.clause, &security.params));
    }
    Ok(())
}

fn search(
    statement: &mut SelectStatement,
    metadata: &EntityMetadata,
    search: Option<&ListSearch>,
) -> Option<String> {
    let search = search?;
    let term = search.term.trim();
    if term.is_empty() {
        return None;
    }

    let pattern = match search.mode.unwrap_or_default() {
        SearchMode::Contains => format!("%{term}%"),
        SearchMode::Prefix => format!("{term}%"),
        SearchMode::Exact => term.to_owned(),
    };

    let predicates: Vec<SQL> = metadata
        .fields
        .iter()
        .filter(|field| field.searchable)
        .filter(|field| {
            search
                .fields
                .as_ref()
                .is_none_or(|only| only.iter().any(|name| name == &field.field))
        })
        .map(|field| ilike(field, pattern.clone()))
        .collect();

    if predicates.is_empty() {
        dynlist_trace_dropped!("search", term);
        return None;
    }

    statement.push_where(SQL::join(predicates, Token::OR));
    Some(term.to_owned())
}

fn sort(statement: &mut SelectStatement, metadata: &EntityMetadata, context: &ListContext) {
    let sorts: &[ListSort] = if context.sorts.is_empty() {
        &metadata.default_sort
    } else {
        &context.sorts
    };

    for sort in sorts {
        let Some(field) = metadata.field(&sort.field).filter(|field| field.sortable) else {
            dynlist_trace_dropped!("sort", sort.field);
            continue;
        };
        if statement.order_by.iter().any(|entry| entry.field == field.field) {
            continue;
        }
        statement.order_by.push(OrderBy {
            field: field.field.clone(),
            expr: column_sql(field),
            direction: sort.direction,
            nulls: sort.nulls,
            cast: field.column_type.parameter_cast(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynlist_types::{
        ColumnType, EntityFieldMeta, FilterOperator, FilterValue, ListFilter, NullsOrder,
        Primitive, SecurityFilterMeta, SortDirection,
    };

    fn field(name: &str, column_type: ColumnType) -> EntityFieldMeta {
        EntityFieldMeta {
            field: name.into(),
            column: name.into(),
            table_alias: "root".into(),
            column_type,
            label: None,
            sortable: true,
            filterable: true,
            searchable: column_type == ColumnType::String,
            reference: None,
            hidden: false,
        }
    }

    fn customer() -> EntityMetadata {
        let mut id = field("id", ColumnType::String);
        id.hidden = true;
        id.searchable = false;
        let mut notes = field("notes", ColumnType::String);
        notes.sortable = false;
        notes.filterable = false;
        EntityMetadata {
            schema: "public".into(),
            base_table: "Customer".into(),
            base_alias: "root".into(),
            fields: vec![
                id,
                field("name", ColumnType::String),
                field("email", ColumnType::String),
                field("credit", ColumnType::Number),
                notes,
            ],
            joins: Vec::new(),
            default_sort: vec![ListSort::asc("name")],
            global_key_fields: vec!["id".into()],
            security_filters: vec![SecurityFilterMeta::fixed(
                r#"root."markedForDeletion" = FALSE"#,
            )],
            inline_editing: false,
        }
    }

    #[test]
    fn test_projection_and_global_key() {
        let statement = build(&customer(), &ListContext::default()).unwrap();
        let text = statement.render().text;
        assert!(text.starts_with(concat!(
            r#"SELECT "root"."id" AS "id", "root"."name" AS "name", "root"."email" AS "email", "#,
            r#""root"."credit" AS "credit", "root"."notes" AS "notes", "#,
            r#"array_to_string(ARRAY[COALESCE("root"."id"::text, '')], '::') AS "global_key" "#,
            r#"FROM "public"."Customer" AS "root""#
        )));
    }

    #[test]
    fn test_security_filter_after_caller_filters() {
        let mut context = ListContext::default();
        context.filters.push(ListFilter::new(
            "credit",
            FilterOperator::Gte,
            Some(100i64.into()),
        ));
        let statement = build(&customer(), &context).unwrap();
        let rendered = statement.render();
        assert!(rendered.text.contains(
            r#"WHERE ("root"."credit" >= $1::numeric) AND (root."markedForDeletion" = FALSE)"#
        ));
        assert_eq!(rendered.params, vec![Primitive::Int(100)]);
    }

    #[test]
    fn test_unknown_and_unfilterable_filters_dropped() {
        let mut context = ListContext::default();
        context
            .filters
            .push(ListFilter::new("nope", FilterOperator::Equals, Some("x".into())));
        context
            .filters
            .push(ListFilter::new("notes", FilterOperator::Equals, Some("x".into())));
        context
            .filters
            .push(ListFilter::new("name", FilterOperator::Custom, Some("x".into())));
        let generated = build_with_summary(&customer(), &context).unwrap();
        assert_eq!(generated.applied_filters, 0);
        assert_eq!(generated.statement.where_clauses.len(), 1);
        assert!(generated.statement.params().is_empty());
    }

    #[test]
    fn test_search_over_searchable_fields() {
        let mut context = ListContext::default();
        context.search = Some(ListSearch {
            term: " acme ".into(),
            fields: None,
            mode: None,
        });
        let generated = build_with_summary(&customer(), &context).unwrap();
        assert_eq!(generated.search_term.as_deref(), Some("acme"));
        let rendered = generated.statement.render();
        assert!(rendered.text.contains(
            r#"AND ("root"."name" ILIKE $1 OR "root"."email" ILIKE $2 OR "root"."notes" ILIKE $3)"#
        ));
        assert_eq!(rendered.params, vec![Primitive::from("%acme%"); 3]);
    }

    #[test]
    fn test_search_restricted_fields_and_mode() {
        let mut context = ListContext::default();
        context.search = Some(ListSearch {
            term: "ac".into(),
            fields: Some(vec!["email".into(), "credit".into()]),
            mode: Some(SearchMode::Prefix),
        });
        let rendered = build(&customer(), &context).unwrap().render();
        assert!(rendered.text.contains(r#"AND ("root"."email" ILIKE $1)"#));
        assert_eq!(rendered.params, vec![Primitive::from("ac%")]);

        context.search = Some(ListSearch {
            term: "ac".into(),
            fields: Some(vec!["credit".into()]),
            mode: None,
        });
        let generated = build_with_summary(&customer(), &context).unwrap();
        assert!(generated.search_term.is_none());
        assert!(generated.statement.params().is_empty());
    }

    #[test]
    fn test_empty_search_term_skipped() {
        let mut context = ListContext::default();
        context.search = Some(ListSearch {
            term: "   ".into(),
            fields: None,
            mode: None,
        });
        let statement = build(&customer(), &context).unwrap();
        assert_eq!(statement.where_clauses.len(), 1);
    }

    #[test]
    fn test_sort_defaults_and_drops() {
        let statement = build(&customer(), &ListContext::default()).unwrap();
        assert_eq!(statement.order_by.len(), 1);
        assert_eq!(statement.order_by[0].field, "name");

        let mut context = ListContext::default();
        context.sorts = vec![
            ListSort::desc("credit"),
            ListSort::asc("notes"),
            ListSort::asc("ghost"),
            ListSort {
                nulls: Some(NullsOrder::First),
                ..ListSort::asc("email")
            },
        ];
        let statement = build(&customer(), &context).unwrap();
        let fields: Vec<_> = statement.order_by.iter().map(|o| o.field.as_str()).collect();
        assert_eq!(fields, ["credit", "email"]);
        assert_eq!(statement.order_by[0].direction, SortDirection::Desc);
        assert_eq!(statement.order_by[0].cast, Some("numeric"));
        assert!(statement.render().text.ends_with(
            r#"ORDER BY "root"."credit" DESC, "root"."email" ASC NULLS FIRST"#
        ));
    }

    #[test]
    fn test_invalid_filter_value_is_validation_error() {
        let mut context = ListContext::default();
        context.filters.push(ListFilter::new(
            "name",
            FilterOperator::In,
            Some(FilterValue::List(Vec::new())),
        ));
        let err = build(&customer(), &context).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_security_filter_placeholders() {
        let mut metadata = customer();
        metadata.security_filters = vec![SecurityFilterMeta {
            clause: r#"root."tenantId" = ?"#.into(),
            params: vec!["t-1".into()],
        }];
        let mut context = ListContext::default();
        context
            .filters
            .push(ListFilter::new("name", FilterOperator::Equals, Some("Acme".into())));
        let rendered = build(&metadata, &context).unwrap().render();
        assert!(rendered
            .text
            .contains(r#"WHERE ("root"."name" = $1) AND (root."tenantId" = $2)"#));
        assert_eq!(rendered.params, vec![Primitive::from("Acme"), Primitive::from("t-1")]);

        metadata.security_filters[0].params.clear();
        assert_eq!(build(&metadata, &context).unwrap_err().status_code(), 500);
    }
}
