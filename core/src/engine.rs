use std::sync::Arc;

use dynlist_types::{
    EntityMetadata, ListCapabilities, ListColumnMeta, ListContext, ListDebug, ListResponse,
    ListResponseRow, ListSummary, PageDirection, PageInfo, Primitive, Row,
};

use crate::ast::{OrderBy, SelectStatement};
use crate::config::EngineConfig;
use crate::custom::{CustomQueryRegistry, QueryTransform};
use crate::error::{ListError, Result};
use crate::generator;
use crate::metadata::{ConfigRegistry, MetadataLoader};
use crate::pagination::{GlobalKey, apply_pagination, encode_global_key};
use crate::pool::{Connection, ConnectionPool};
use crate::render::RenderedQuery;
use crate::request::ListRequest;
use crate::{dynlist_trace_failure, dynlist_trace_query};

/// Collects custom transforms and settings, then freezes them into a planner or engine.
pub struct ListEngineBuilder {
    registry: Arc<ConfigRegistry>,
    custom: CustomQueryRegistry,
    config: EngineConfig,
}

impl ListEngineBuilder {
    /// Registers a transform for one list code.
    #[must_use]
    pub fn custom_query(
        mut self,
        list_code: impl Into<String>,
        transform: impl QueryTransform + 'static,
    ) -> Self {
        self.custom.register(list_code, transform);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds a planner that generates and renders statements without executing them.
    pub fn build_planner(self) -> ListPlanner {
        ListPlanner {
            loader: MetadataLoader::new(self.registry),
            custom: self.custom,
            config: self.config,
        }
    }

    pub fn build<P: ConnectionPool>(self, pool: P) -> ListEngine<P> {
        ListEngine {
            planner: self.build_planner(),
            pool,
        }
    }
}

/// Everything known about one list request before it reaches the database.
#[derive(Debug, Clone)]
pub struct ListPlan {
    pub entity_code: String,
    pub list_code: String,
    pub metadata: EntityMetadata,
    /// Final statement, after custom transform and pagination.
    pub statement: SelectStatement,
    pub query: RenderedQuery,
    pub custom_query_applied: bool,
    pub applied_filters: usize,
    pub search_term: Option<String>,
}

/// Turns list requests into rendered statements.
///
/// Holds only read-only state, so one planner serves any number of concurrent
/// requests.
#[derive(Debug)]
pub struct ListPlanner {
    loader: MetadataLoader,
    custom: CustomQueryRegistry,
    config: EngineConfig,
}

impl ListPlanner {
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ConfigRegistry> {
        self.loader.registry()
    }

    /// Loads metadata, generates the base statement, applies the custom
    /// transform and pagination, and renders the result.
    pub fn plan(&self, app_code: &str, entity_code: &str, context: &ListContext) -> Result<ListPlan> {
        context.validate(self.config.max_limit)?;

        let metadata = self.loader.load(app_code, entity_code)?;
        let generated = generator::build_with_summary(&metadata, context)?;

        let list_code = context.resolved_list_code(entity_code);
        let custom_query_applied = self.custom.contains(&list_code);
        let statement = self.custom.apply(&list_code, generated.statement);

        let statement =
            apply_pagination(statement, context, entity_code, &metadata.global_key_fields)?;
        let query = statement.render();

        Ok(ListPlan {
            entity_code: entity_code.to_owned(),
            list_code,
            metadata,
            statement,
            query,
            custom_query_applied,
            applied_filters: generated.applied_filters,
            search_term: generated.search_term,
        })
    }

    /// Turns fetched rows into the response page.
    ///
    /// `rows` may hold one row more than the page size; its presence sets
    /// `hasNextPage`. Backward pages arrive in reversed order and are flipped
    /// back here.
    pub fn shape(&self, plan: ListPlan, context: &ListContext, mut rows: Vec<Row>) -> Result<ListResponse> {
        let limit = usize::try_from(context.pagination.limit).unwrap_or(usize::MAX);
        let has_next_page = rows.len() > limit;
        rows.truncate(limit);
        if context.pagination.direction == PageDirection::Backward {
            rows.reverse();
        }

        let rows = rows
            .into_iter()
            .map(|values| {
                let cursor = row_cursor(&plan, &values)?;
                Ok(ListResponseRow { cursor, values })
            })
            .collect::<Result<Vec<_>>>()?;

        let page_info = PageInfo {
            has_next_page,
            has_previous_page: context.active_cursor().is_some(),
            start_cursor: rows.first().map(|row| row.cursor.clone()),
            end_cursor: rows.last().map(|row| row.cursor.clone()),
        };

        let columns = plan
            .metadata
            .visible_fields()
            .map(|field| ListColumnMeta {
                field: field.field.clone(),
                label: field.display_label().to_owned(),
                column_type: field.column_type,
                width: None,
                sortable: field.sortable,
                filterable: field.filterable,
                reference: field.reference.clone(),
            })
            .collect();

        Ok(ListResponse {
            entity_code: plan.entity_code,
            list_code: plan.list_code,
            columns,
            rows,
            page_info,
            summary: Some(ListSummary {
                applied_filters: plan.applied_filters,
                search_term: plan.search_term,
            }),
            debug: Some(ListDebug {
                custom_query_applied: plan.custom_query_applied,
            }),
            capabilities: Some(ListCapabilities {
                inline_editing: plan.metadata.inline_editing,
            }),
        })
    }
}

/// Executes declarative list requests against a connection pool.
#[derive(Debug)]
pub struct ListEngine<P> {
    planner: ListPlanner,
    pool: P,
}

impl ListEngine<()> {
    /// Starts building an engine over the applications in `registry`.
    pub fn builder(registry: Arc<ConfigRegistry>) -> ListEngineBuilder {
        ListEngineBuilder {
            registry,
            custom: CustomQueryRegistry::new(),
            config: EngineConfig::default(),
        }
    }
}

impl<P: ConnectionPool> ListEngine<P> {
    pub fn planner(&self) -> &ListPlanner {
        &self.planner
    }

    pub fn pool(&self) -> &P {
        &self.pool
    }

    /// Runs one list request: one connection, one statement.
    ///
    /// # Errors
    ///
    /// - [`ListError::NotFound`] for an unknown application or entity
    /// - [`ListError::Validation`] for a malformed context or cursor
    /// - [`ListError::Execution`] when the statement fails or a row cannot be shaped
    pub async fn execute(
        &self,
        app_code: &str,
        entity_code: &str,
        context: &ListContext,
    ) -> Result<ListResponse> {
        let plan = self.planner.plan(app_code, entity_code, context)?;
        let rows = self.run(&plan.query).await?;
        self.planner.shape(plan, context, rows)
    }

    /// Runs a parsed wire request.
    pub async fn execute_request(
        &self,
        request: &ListRequest,
        entity_code: &str,
    ) -> Result<ListResponse> {
        self.execute(&request.app_code, entity_code, &request.context)
            .await
    }

    /// Parses a wire request body, applying the configured default page size.
    pub fn parse_request(&self, body: &str) -> Result<ListRequest> {
        Ok(ListRequest::from_json_str_with(
            body,
            self.planner.config.default_limit,
        )?)
    }

    async fn run(&self, query: &RenderedQuery) -> Result<Vec<Row>> {
        dynlist_trace_query!(query.text, query.params.len());

        let result = async {
            let mut connection = self.pool.acquire().await?;
            match self.planner.config.statement_timeout {
                Some(timeout) => {
                    tokio::time::timeout(timeout, connection.query(&query.text, &query.params))
                        .await
                        .map_err(|_| {
                            ListError::Execution(format!(
                                "statement timed out after {}ms",
                                timeout.as_millis()
                            ))
                        })?
                }
                None => connection.query(&query.text, &query.params).await,
            }
        }
        .await;

        if let Err(err) = &result {
            dynlist_trace_failure!(self.planner.config.truncate_statement(&query.text), err);
        }
        result
    }
}

/// Builds the cursor of one result row from its key and `ORDER BY` values.
fn row_cursor(plan: &ListPlan, row: &Row) -> Result<String> {
    let key = plan
        .metadata
        .global_key_fields
        .iter()
        .map(|field| primitive_at(row, field))
        .collect::<Result<Vec<_>>>()?;
    let sort = plan
        .statement
        .order_by
        .iter()
        .map(|entry: &OrderBy| primitive_at(row, &entry.field))
        .collect::<Result<Vec<_>>>()?;

    encode_global_key(&GlobalKey {
        entity: plan.entity_code.clone(),
        key,
        sort,
    })
    .map_err(|err| ListError::Execution(err.to_string()))
}

fn primitive_at(row: &Row, field: &str) -> Result<Primitive> {
    let value = row
        .get(field)
        .ok_or_else(|| ListError::Execution(format!("result row is missing column {field}")))?;
    Primitive::from_json(value).ok_or_else(|| {
        ListError::Execution(format!(
            "Field {field} is not a primitive and cannot be used in cursor encoding"
        ))
    })
}
