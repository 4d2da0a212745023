mod common;

use std::time::Duration;

use common::{MemoryPool, customer, registry};
use dynlist_core::{
    EngineConfig, GlobalKey, ListEngine, ListError, SQL, SelectStatement, decode_global_key,
    encode_global_key,
};
use dynlist_types::{
    ColumnType, FilterOperator, ListContext, ListFilter, ListSort, PageDirection, Primitive,
};
use serde_json::{Value, json};

fn engine(pool: MemoryPool) -> ListEngine<MemoryPool> {
    ListEngine::builder(registry()).build(pool)
}

fn acme_context(limit: u32) -> ListContext {
    let mut context = ListContext::with_limit(limit);
    context.filters.push(ListFilter::new(
        "name",
        FilterOperator::Contains,
        Some("Acme".into()),
    ));
    context
}

#[tokio::test]
async fn test_first_page_with_contains_filter() {
    let pool = MemoryPool::new();
    pool.respond(vec![
        customer("c1", "Acme One", json!(10)),
        customer("c2", "Acme Two", json!(20)),
        customer("c3", "Acme Zed", json!(30)),
    ]);
    let engine = engine(pool.clone());

    let response = engine
        .execute("crm", "Customer", &acme_context(2))
        .await
        .unwrap();

    let (sql, params) = pool.last();
    assert!(sql.contains(r#"FROM "public"."Customer" AS "root""#));
    assert!(sql.contains(
        r#"WHERE ("root"."name" ILIKE $1) AND (root."markedForDeletion" = FALSE)"#
    ));
    assert!(sql.ends_with(r#"ORDER BY "root"."name" ASC, "root"."id" ASC LIMIT 3"#));
    assert_eq!(params, vec![Primitive::from("%Acme%")]);

    assert_eq!(response.entity_code, "Customer");
    assert_eq!(response.list_code, "CustomerList");
    assert_eq!(response.rows.len(), 2);
    assert!(response.page_info.has_next_page);
    assert!(!response.page_info.has_previous_page);

    let end = decode_global_key(response.page_info.end_cursor.as_deref().unwrap()).unwrap();
    assert_eq!(end.entity, "Customer");
    assert_eq!(end.key, vec![Primitive::from("c2")]);
    assert_eq!(end.sort, vec![Primitive::from("Acme Two"), Primitive::from("c2")]);
    assert_eq!(
        response.page_info.start_cursor.as_deref(),
        Some(response.rows[0].cursor.as_str())
    );

    let summary = response.summary.unwrap();
    assert_eq!(summary.applied_filters, 1);
    assert!(!response.debug.unwrap().custom_query_applied);
    assert!(!response.capabilities.unwrap().inline_editing);
    assert_eq!(pool.acquired(), 1);
}

#[tokio::test]
async fn test_columns_hide_builtin_fields() {
    let pool = MemoryPool::new();
    let response = engine(pool)
        .execute("crm", "Customer", &ListContext::default())
        .await
        .unwrap();

    let fields: Vec<_> = response.columns.iter().map(|c| c.field.as_str()).collect();
    assert_eq!(fields, ["name", "email", "credit"]);
    assert_eq!(response.columns[1].label, "E-mail");
    assert_eq!(response.columns[2].column_type, ColumnType::Number);
    assert!(response.rows.is_empty());
    assert!(response.page_info.end_cursor.is_none());
    assert!(!response.page_info.has_next_page);
}

#[tokio::test]
async fn test_next_page_continues_after_cursor() {
    let pool = MemoryPool::new();
    pool.respond(vec![
        customer("c1", "Acme One", json!(10)),
        customer("c2", "Acme Two", json!(20)),
        customer("c3", "Acme Zed", json!(30)),
    ]);
    pool.respond(vec![customer("c3", "Acme Zed", json!(30))]);
    let engine = engine(pool.clone());

    let first = engine
        .execute("crm", "Customer", &acme_context(2))
        .await
        .unwrap();

    let mut context = acme_context(2);
    context.pagination.after = first.page_info.end_cursor.clone();
    let second = engine.execute("crm", "Customer", &context).await.unwrap();

    let (sql, params) = pool.last();
    assert!(sql.contains(concat!(
        r#"AND ((("root"."name" > $2 OR "root"."name" IS NULL)) OR "#,
        r#"("root"."name" IS NOT DISTINCT FROM $3 AND ("root"."id" > $4 OR "root"."id" IS NULL)))"#
    )));
    assert_eq!(
        params,
        vec![
            Primitive::from("%Acme%"),
            Primitive::from("Acme Two"),
            Primitive::from("Acme Two"),
            Primitive::from("c2"),
        ]
    );
    assert_eq!(second.rows.len(), 1);
    assert!(!second.page_info.has_next_page);
    assert!(second.page_info.has_previous_page);
}

#[tokio::test]
async fn test_backward_page_restores_declared_order() {
    let pool = MemoryPool::new();
    // The database walks the reversed ordering.
    pool.respond(vec![
        customer("c2", "Acme Two", json!(20)),
        customer("c1", "Acme One", json!(10)),
    ]);
    let engine = engine(pool.clone());

    let before = encode_global_key(&GlobalKey {
        entity: "Customer".into(),
        key: vec!["c3".into()],
        sort: vec!["Acme Zed".into(), "c3".into()],
    })
    .unwrap();
    let mut context = acme_context(2);
    context.pagination.direction = PageDirection::Backward;
    context.pagination.before = Some(before);

    let response = engine.execute("crm", "Customer", &context).await.unwrap();

    let (sql, _) = pool.last();
    assert!(sql.contains(r#""root"."name" < $2"#));
    assert!(sql.ends_with(r#"ORDER BY "root"."name" DESC, "root"."id" DESC LIMIT 3"#));

    let ids: Vec<_> = response
        .rows
        .iter()
        .map(|row| row.values["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["c1", "c2"]);
    assert!(response.page_info.has_previous_page);
    assert!(!response.page_info.has_next_page);
}

#[tokio::test]
async fn test_cursor_for_other_entity_is_rejected() {
    let pool = MemoryPool::new();
    let mut context = ListContext::default();
    context.pagination.after = Some(encode_global_key(&GlobalKey {
        entity: "Invoice".into(),
        key: vec!["i1".into()],
        sort: Vec::new(),
    })
    .unwrap());

    let err = engine(pool.clone())
        .execute("crm", "Customer", &context)
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 400);
    assert!(pool.executed().is_empty());
}

#[tokio::test]
async fn test_garbled_cursor_is_rejected() {
    let mut context = ListContext::default();
    context.pagination.after = Some("not a cursor!".into());

    let err = engine(MemoryPool::new())
        .execute("crm", "Customer", &context)
        .await
        .unwrap_err();
    assert!(matches!(err, ListError::Validation(_)));
}

#[tokio::test]
async fn test_unknown_application_and_entity() {
    let engine = engine(MemoryPool::new());
    let ctx = ListContext::default();

    let err = engine.execute("hr", "Customer", &ctx).await.unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = engine.execute("crm", "Invoice", &ctx).await.unwrap_err();
    assert_eq!(err.to_body().message, "Entity Invoice not found");
}

#[tokio::test]
async fn test_limit_bounds() {
    let pool = MemoryPool::new();
    let engine = ListEngine::builder(registry())
        .config(EngineConfig::new().with_max_limit(10))
        .build(pool.clone());

    for limit in [0, 11] {
        let err = engine
            .execute("crm", "Customer", &ListContext::with_limit(limit))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }
    assert_eq!(pool.acquired(), 0);
}

#[tokio::test]
async fn test_custom_query_applied_by_list_code() {
    let pool = MemoryPool::new();
    let engine = ListEngine::builder(registry())
        .custom_query("CustomerList", |mut statement: SelectStatement| {
            statement.push_where(SQL::raw(r#"root."credit" > 0"#));
            statement
        })
        .build(pool.clone());

    let response = engine
        .execute("crm", "Customer", &ListContext::default())
        .await
        .unwrap();
    assert!(response.debug.unwrap().custom_query_applied);
    assert!(pool.last().0.contains(r#"AND (root."credit" > 0)"#));

    let mut context = ListContext::default();
    context.list_code = Some("CustomerArchive".into());
    let response = engine.execute("crm", "Customer", &context).await.unwrap();
    assert!(!response.debug.unwrap().custom_query_applied);
    assert_eq!(response.list_code, "CustomerArchive");
}

#[tokio::test]
async fn test_custom_query_may_replace_sort() {
    let pool = MemoryPool::new();
    pool.respond(vec![customer("c9", "Zeta", json!(5))]);
    let engine = ListEngine::builder(registry())
        .custom_query("CustomerList", |mut statement: SelectStatement| {
            statement.order_by.clear();
            statement
        })
        .build(pool.clone());

    let response = engine
        .execute("crm", "Customer", &ListContext::default())
        .await
        .unwrap();

    assert!(pool.last().0.ends_with(r#"ORDER BY "root"."id" ASC LIMIT 51"#));
    let key = decode_global_key(&response.rows[0].cursor).unwrap();
    assert_eq!(key.sort, vec![Primitive::from("c9")]);
}

#[tokio::test]
async fn test_sort_on_grid_field_is_dropped() {
    let pool = MemoryPool::new();
    let Value::Object(quote) = json!({
        "id": "q1",
        "markedForDeletion": false,
        "number": "Q-1",
        "lines": [{ "sku": "x" }],
    }) else {
        unreachable!()
    };
    pool.respond(vec![quote]);
    let engine = engine(pool.clone());

    let mut context = ListContext::default();
    context.sorts.push(ListSort::asc("lines"));
    let response = engine.execute("crm", "Quote", &context).await.unwrap();

    let (sql, _) = pool.last();
    assert!(sql.ends_with(r#"ORDER BY "root"."id" ASC LIMIT 51"#));
    assert!(!sql.contains(r#""root"."lines" ASC"#));

    let key = decode_global_key(&response.rows[0].cursor).unwrap();
    assert_eq!(key.key, vec![Primitive::from("q1")]);
    assert_eq!(key.sort, vec![Primitive::from("q1")]);

    let lines = response.columns.iter().find(|c| c.field == "lines").unwrap();
    assert!(!lines.sortable);
    assert_eq!(lines.column_type, ColumnType::Json);
}

#[tokio::test]
async fn test_execution_failure_hides_driver_message() {
    let pool = MemoryPool::new();
    pool.fail("relation \"Customer\" does not exist");

    let err = engine(pool.clone())
        .execute("crm", "Customer", &ListContext::default())
        .await
        .unwrap_err();

    assert_eq!(err.status_code(), 500);
    assert!(!err.to_body().message.contains("relation"));
    assert_eq!(pool.acquired(), 1);
}

#[tokio::test]
async fn test_row_without_key_is_execution_error() {
    let pool = MemoryPool::new();
    let mut row = customer("c1", "Acme", json!(1));
    row.remove("id");
    pool.respond(vec![row]);

    let err = engine(pool)
        .execute("crm", "Customer", &ListContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ListError::Execution(_)));
}

#[tokio::test]
async fn test_statement_timeout() {
    let pool = MemoryPool::new();
    pool.delay(Duration::from_millis(200));
    let engine = ListEngine::builder(registry())
        .config(EngineConfig::new().with_statement_timeout(Duration::from_millis(10)))
        .build(pool);

    let err = engine
        .execute("crm", "Customer", &ListContext::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ListError::Execution(ref m) if m.contains("timed out")));
}

#[tokio::test]
async fn test_sort_by_number_casts_cursor_params() {
    let pool = MemoryPool::new();
    let engine = engine(pool.clone());

    let mut context = ListContext::default();
    context.sorts.push(ListSort::desc("credit"));
    context.pagination.after = Some(encode_global_key(&GlobalKey {
        entity: "Customer".into(),
        key: vec!["c1".into()],
        sort: vec![Primitive::Int(10), "c1".into()],
    })
    .unwrap());

    engine.execute("crm", "Customer", &context).await.unwrap();

    let (sql, params) = pool.last();
    assert!(sql.contains(r#""root"."credit" < $1::numeric"#));
    assert!(sql.contains(r#""root"."credit" IS NOT DISTINCT FROM $2::numeric"#));
    assert_eq!(params[0], Primitive::Int(10));
}

#[tokio::test]
async fn test_execute_request_parses_string_context() {
    let pool = MemoryPool::new();
    let engine = ListEngine::builder(registry())
        .config(EngineConfig::new().with_default_limit(5))
        .build(pool.clone());

    let request = engine
        .parse_request(r#"{"appCode":"crm","context":"{\"search\":{\"term\":\"acme\"}}"}"#)
        .unwrap();
    let response = engine.execute_request(&request, "Customer").await.unwrap();

    let (sql, params) = pool.last();
    assert!(sql.ends_with("LIMIT 6"));
    assert_eq!(params, vec![Primitive::from("%acme%"); 2]);
    assert_eq!(response.summary.unwrap().search_term.as_deref(), Some("acme"));
}

#[tokio::test]
async fn test_registry_reload_is_visible() {
    let pool = MemoryPool::new();
    let engine = engine(pool);
    let registry = engine.planner().registry();

    registry.reload(dynlist_core::RegistrySnapshot::default());
    let err = engine
        .execute("crm", "Customer", &ListContext::default())
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), 404);
}
