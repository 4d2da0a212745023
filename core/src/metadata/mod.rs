//! Resolution of `(application, entity)` to physical table metadata.

mod registry;

pub use registry::{ConfigRegistry, RegistrySnapshot};

use std::collections::HashSet;
use std::sync::Arc;

use dynlist_types::{
    ColumnType, EntityDefinition, EntityFieldMeta, EntityMetadata, FieldDefinition, FieldKind,
    FieldReference, ListSort, SecurityFilterMeta,
};
use heck::{ToLowerCamelCase, ToUpperCamelCase};

use crate::error::{ListError, Result};

/// Schema every generated entity table lives in.
pub const BASE_SCHEMA: &str = "public";

/// Alias of the entity's base table in generated statements.
pub const BASE_ALIAS: &str = "root";

/// Primary key column present on every entity table.
pub const ID_FIELD: &str = "id";

/// Soft-delete marker present on every entity table.
pub const DELETION_MARKER_FIELD: &str = "markedForDeletion";

const DEFAULT_SORT_CANDIDATES: [&str; 5] = ["updatedAt", "createdAt", "name", "code", "id"];

/// Loads [`EntityMetadata`] from the application definitions in a [`ConfigRegistry`].
///
/// Metadata is derived on every call, so a registry reload is visible to the
/// next request without any invalidation.
#[derive(Debug, Clone)]
pub struct MetadataLoader {
    registry: Arc<ConfigRegistry>,
}

impl MetadataLoader {
    pub fn new(registry: Arc<ConfigRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ConfigRegistry> {
        &self.registry
    }

    /// Resolves one entity of one application.
    ///
    /// # Errors
    ///
    /// [`ListError::NotFound`] when either the application or the entity is unknown.
    pub fn load(&self, app_code: &str, entity_code: &str) -> Result<EntityMetadata> {
        let application = self
            .registry
            .get_application(app_code)
            .ok_or_else(|| ListError::NotFound(format!("Application {app_code} not found")))?;
        let entity = application
            .entity(entity_code)
            .ok_or_else(|| ListError::NotFound(format!("Entity {entity_code} not found")))?;
        Ok(entity_metadata(entity))
    }
}

/// Derives the physical mapping of an entity definition.
///
/// The hidden `id` and `markedForDeletion` columns come first; a declared
/// field that collides with either is dropped in favour of the built-in one.
#[must_use]
pub fn entity_metadata(entity: &EntityDefinition) -> EntityMetadata {
    let mut seen = HashSet::new();
    let fields = [id_field(), deletion_marker_field()]
        .into_iter()
        .chain(entity.fields.iter().map(field_meta))
        .filter(|field| seen.insert(field.field.clone()))
        .collect();

    EntityMetadata {
        schema: BASE_SCHEMA.into(),
        base_table: entity.code.to_upper_camel_case(),
        base_alias: BASE_ALIAS.into(),
        fields,
        joins: Vec::new(),
        default_sort: default_sort(entity),
        global_key_fields: vec![ID_FIELD.into()],
        security_filters: vec![SecurityFilterMeta::fixed(format!(
            r#"{BASE_ALIAS}."{DELETION_MARKER_FIELD}" = FALSE"#
        ))],
        inline_editing: entity.list_inline_editing,
    }
}

fn field_meta(field: &FieldDefinition) -> EntityFieldMeta {
    let column_type = column_type(field.kind);
    EntityFieldMeta {
        field: field.code.clone(),
        column: field.code.to_lower_camel_case(),
        table_alias: BASE_ALIAS.into(),
        column_type,
        label: Some(field.name.clone()),
        // JSON values have no keyset order and cannot ride in a cursor.
        sortable: column_type != ColumnType::Json,
        filterable: true,
        searchable: column_type == ColumnType::String,
        reference: field.reference.as_ref().map(|reference| FieldReference {
            entity_code: reference.entity.clone(),
            label_field: reference.label_field.clone(),
        }),
        hidden: false,
    }
}

const fn column_type(kind: FieldKind) -> ColumnType {
    match kind {
        FieldKind::Number | FieldKind::Decimal => ColumnType::Number,
        FieldKind::Date => ColumnType::Date,
        FieldKind::Boolean => ColumnType::Boolean,
        FieldKind::Grid => ColumnType::Json,
        FieldKind::Reference => ColumnType::Reference,
        FieldKind::String => ColumnType::String,
    }
}

fn default_sort(entity: &EntityDefinition) -> Vec<ListSort> {
    DEFAULT_SORT_CANDIDATES
        .iter()
        .find_map(|candidate| entity.field(candidate))
        .or_else(|| entity.fields.first())
        .map(|field| vec![ListSort::asc(field.code.clone())])
        .unwrap_or_default()
}

fn hidden_field(name: &str, column_type: ColumnType, sortable: bool) -> EntityFieldMeta {
    EntityFieldMeta {
        field: name.into(),
        column: name.into(),
        table_alias: BASE_ALIAS.into(),
        column_type,
        label: None,
        sortable,
        filterable: true,
        searchable: false,
        reference: None,
        hidden: true,
    }
}

fn id_field() -> EntityFieldMeta {
    hidden_field(ID_FIELD, ColumnType::String, true)
}

fn deletion_marker_field() -> EntityFieldMeta {
    hidden_field(DELETION_MARKER_FIELD, ColumnType::Boolean, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynlist_types::ApplicationConfig;

    fn app() -> ApplicationConfig {
        ApplicationConfig::from_json_str(
            r#"{
                "appId": "crm",
                "name": "CRM",
                "entities": [
                    {
                        "code": "sales_order",
                        "name": "Sales order",
                        "listInlineEditing": true,
                        "fields": [
                            { "code": "id", "name": "Identifier" },
                            { "code": "order_number", "name": "Number" },
                            { "code": "total", "name": "Total", "type": "decimal" },
                            { "code": "lines", "name": "Lines", "type": "grid" },
                            { "code": "customer", "name": "Customer", "type": "reference",
                              "reference": { "entity": "Customer", "labelField": "name" } },
                            { "code": "createdAt", "name": "Created", "type": "date" }
                        ]
                    },
                    {
                        "code": "Tag",
                        "name": "Tag",
                        "fields": [{ "code": "label", "name": "Label" }]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    fn loader() -> MetadataLoader {
        let snapshot = RegistrySnapshot::from_applications([app()]).unwrap();
        MetadataLoader::new(Arc::new(ConfigRegistry::new(snapshot)))
    }

    #[test]
    fn test_hidden_fields_injected_first() {
        let meta = loader().load("crm", "sales_order").unwrap();
        let names: Vec<_> = meta.fields.iter().map(|f| f.field.as_str()).collect();
        assert_eq!(
            names,
            ["id", "markedForDeletion", "order_number", "total", "lines", "customer", "createdAt"]
        );
        let id = meta.field("id").unwrap();
        assert!(id.hidden && id.sortable && id.filterable);
        let marker = meta.field("markedForDeletion").unwrap();
        assert!(marker.hidden && !marker.sortable && marker.filterable);
        assert_eq!(meta.visible_fields().count(), 5);
    }

    #[test]
    fn test_physical_mapping() {
        let meta = loader().load("crm", "sales_order").unwrap();
        assert_eq!(meta.schema, "public");
        assert_eq!(meta.base_table, "SalesOrder");
        assert_eq!(meta.base_alias, "root");
        assert_eq!(meta.global_key_fields, ["id"]);
        assert!(meta.inline_editing);
        assert_eq!(
            meta.security_filters,
            [SecurityFilterMeta::fixed(r#"root."markedForDeletion" = FALSE"#)]
        );

        let number = meta.field("order_number").unwrap();
        assert_eq!(number.column, "orderNumber");
        assert!(number.searchable);
        assert_eq!(number.display_label(), "Number");

        assert_eq!(meta.field("total").unwrap().column_type, ColumnType::Number);
        assert!(!meta.field("total").unwrap().searchable);
        let lines = meta.field("lines").unwrap();
        assert_eq!(lines.column_type, ColumnType::Json);
        assert!(!lines.sortable && lines.filterable);
        assert!(meta.field("total").unwrap().sortable);
        let customer = meta.field("customer").unwrap();
        assert_eq!(customer.column_type, ColumnType::Reference);
        assert_eq!(customer.reference.as_ref().unwrap().entity_code, "Customer");
    }

    #[test]
    fn test_default_sort_probes_preferred_fields() {
        let meta = loader().load("crm", "sales_order").unwrap();
        assert_eq!(meta.default_sort, [ListSort::asc("createdAt")]);

        let meta = loader().load("crm", "Tag").unwrap();
        assert_eq!(meta.default_sort, [ListSort::asc("label")]);
    }

    #[test]
    fn test_unknown_app_or_entity_is_not_found() {
        let err = loader().load("hr", "sales_order").unwrap_err();
        assert!(matches!(err, ListError::NotFound(ref m) if m == "Application hr not found"));

        let err = loader().load("crm", "Invoice").unwrap_err();
        assert!(matches!(err, ListError::NotFound(ref m) if m == "Entity Invoice not found"));
    }
}
