//! Per-list statement rewrites.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::ast::SelectStatement;

/// Rewrites a generated statement before pagination is applied.
///
/// Any `Fn(SelectStatement) -> SelectStatement + Send + Sync` is a transform.
/// Bound values travel inside the statement's fragments, so a transform may
/// add, drop or reorder predicates freely.
pub trait QueryTransform: Send + Sync {
    fn transform(&self, statement: SelectStatement) -> SelectStatement;
}

impl<F> QueryTransform for F
where
    F: Fn(SelectStatement) -> SelectStatement + Send + Sync,
{
    fn transform(&self, statement: SelectStatement) -> SelectStatement {
        self(statement)
    }
}

/// Transforms keyed by list code.
#[derive(Clone, Default)]
pub struct CustomQueryRegistry {
    transforms: HashMap<String, Arc<dyn QueryTransform>>,
}

impl CustomQueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transform` for `list_code`, replacing any earlier one.
    pub fn register(&mut self, list_code: impl Into<String>, transform: impl QueryTransform + 'static) {
        self.transforms.insert(list_code.into(), Arc::new(transform));
    }

    #[must_use]
    pub fn contains(&self, list_code: &str) -> bool {
        self.transforms.contains_key(list_code)
    }

    /// Runs the transform registered for `list_code`; unregistered codes pass through.
    #[must_use]
    pub fn apply(&self, list_code: &str, statement: SelectStatement) -> SelectStatement {
        match self.transforms.get(list_code) {
            Some(transform) => transform.transform(statement),
            None => statement,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

impl fmt::Debug for CustomQueryRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomQueryRegistry")
            .field("list_codes", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}
