//! Structured form of the list `SELECT`.
//!
//! The generator produces a [`SelectStatement`], custom transforms rewrite it,
//! pagination narrows it and the renderer turns it into text. Every predicate
//! and expression is an [`SQL`] fragment that carries its own bound values.

use dynlist_types::{NullsOrder, Primitive, SortDirection};

use crate::render::{render, RenderedQuery};
use crate::sql::SQL;

/// A `SELECT` over one base table with optional joins.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub columns: Vec<SelectColumn>,
    pub from: TableRef,
    pub joins: Vec<Join>,
    /// Predicates combined with `AND`.
    pub where_clauses: Vec<SQL>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u32>,
}

impl SelectStatement {
    pub fn new(from: TableRef) -> Self {
        Self {
            columns: Vec::new(),
            from,
            joins: Vec::new(),
            where_clauses: Vec::new(),
            order_by: Vec::new(),
            limit: None,
        }
    }

    /// Finds a projected column by its output alias.
    #[must_use]
    pub fn column(&self, alias: &str) -> Option<&SelectColumn> {
        self.columns.iter().find(|column| column.alias == alias)
    }

    /// Adds a predicate to the `WHERE` conjunction.
    pub fn push_where(&mut self, predicate: SQL) {
        if !predicate.is_empty() {
            self.where_clauses.push(predicate);
        }
    }

    /// Bound values in placeholder order.
    #[must_use]
    pub fn params(&self) -> Vec<Primitive> {
        self.render().params
    }

    /// Renders this statement; shorthand for [`render`].
    #[must_use]
    pub fn render(&self) -> RenderedQuery {
        render(self)
    }
}

/// One projected expression and its output alias.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectColumn {
    pub expr: SQL,
    pub alias: String,
}

impl SelectColumn {
    pub fn new(expr: SQL, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: alias.into(),
        }
    }
}

/// `"schema"."table" AS "alias"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
    pub alias: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: SQL,
}

/// One `ORDER BY` entry.
///
/// `field` is the output alias the entry's value is read back from when
/// building cursors.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub expr: SQL,
    pub direction: SortDirection,
    pub nulls: Option<NullsOrder>,
    /// Cast applied to cursor values compared against `expr`.
    pub cast: Option<&'static str>,
}

impl OrderBy {
    /// Where `NULL`s land in this entry's effective ordering.
    ///
    /// PostgreSQL sorts nulls as larger than any value, so without a hint they
    /// come last ascending and first descending.
    #[must_use]
    pub fn nulls_first(&self) -> bool {
        match self.nulls {
            Some(NullsOrder::First) => true,
            Some(NullsOrder::Last) => false,
            Some(NullsOrder::Default) | None => self.direction == SortDirection::Desc,
        }
    }

    /// The same entry walked in the opposite direction.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.direction = self.direction.reversed();
        self.nulls = match self.nulls {
            Some(NullsOrder::First) => Some(NullsOrder::Last),
            Some(NullsOrder::Last) => Some(NullsOrder::First),
            other => other,
        };
        self
    }
}
