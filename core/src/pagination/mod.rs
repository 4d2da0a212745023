//! Keyset pagination.
//!
//! A page continues strictly after the row a cursor points at, in the
//! statement's effective ordering. The ordering is always made total by
//! appending the entity's key fields as tie-breakers, and the cursor carries
//! one value per `ORDER BY` entry so the comparison can be expressed as a
//! lexicographic OR-of-ANDs:
//!
//! ```text
//! (a > $1) OR (a IS NOT DISTINCT FROM $2 AND b > $3) OR ...
//! ```
//!
//! Backward pages walk the reversed ordering; the engine restores declared
//! order afterwards.

mod cursor;

pub use cursor::{CursorError, GlobalKey, decode_global_key, encode_global_key};

use dynlist_types::{ListContext, PageDirection, Primitive, SortDirection, ValidationError};

use crate::ast::{OrderBy, SelectStatement};
use crate::error::{ListError, Result};
use crate::sql::{SQL, Token};
use crate::dynlist_trace_cursor;

const CURSOR_MISMATCH: &str = "cursor does not match list definition";

/// Narrows `statement` to the page the context asks for.
///
/// Adds key tie-breakers to `ORDER BY`, reverses the ordering for backward
/// pages, applies the cursor predicate and sets `LIMIT` to one more than the
/// page size so the caller can tell whether another page exists.
pub fn apply_pagination(
    mut statement: SelectStatement,
    context: &ListContext,
    entity_code: &str,
    key_fields: &[String],
) -> Result<SelectStatement> {
    append_tie_breakers(&mut statement, key_fields)?;

    if context.pagination.direction == PageDirection::Backward {
        statement.order_by = statement
            .order_by
            .into_iter()
            .map(OrderBy::reversed)
            .collect();
    }

    if let Some(cursor) = context.active_cursor() {
        let key = decode_global_key(cursor).inspect_err(|err| {
            dynlist_trace_cursor!(err);
        })?;
        let values = cursor_values(&statement, key, entity_code, key_fields)?;
        statement.push_where(keyset_predicate(&statement.order_by, &values));
    }

    statement.limit = Some(context.pagination.limit.saturating_add(1));
    Ok(statement)
}

/// Makes the ordering total by appending any key field not already ordered on.
fn append_tie_breakers(statement: &mut SelectStatement, key_fields: &[String]) -> Result<()> {
    for field in key_fields {
        if statement.order_by.iter().any(|entry| &entry.field == field) {
            continue;
        }
        let column = statement.column(field).ok_or_else(|| {
            ListError::Execution(format!("key field {field} is not part of the projection"))
        })?;
        statement.order_by.push(OrderBy {
            field: field.clone(),
            expr: column.expr.clone(),
            direction: SortDirection::Asc,
            nulls: None,
            cast: None,
        });
    }
    Ok(())
}

/// Checks the cursor against the statement and returns one value per `ORDER BY` entry.
fn cursor_values(
    statement: &SelectStatement,
    key: GlobalKey,
    entity_code: &str,
    key_fields: &[String],
) -> Result<Vec<Primitive>> {
    let mismatch = || {
        dynlist_trace_cursor!(CURSOR_MISMATCH);
        ListError::Validation(ValidationError::for_field("pagination", CURSOR_MISMATCH))
    };

    if key.entity != entity_code || key.key.len() != key_fields.len() {
        return Err(mismatch());
    }

    if key.sort.len() == statement.order_by.len() {
        return Ok(key.sort);
    }

    // A key-only cursor still works when the ordering is exactly the key.
    let ordered_by_key = key.sort.is_empty()
        && statement.order_by.len() == key_fields.len()
        && statement
            .order_by
            .iter()
            .zip(key_fields)
            .all(|(entry, field)| &entry.field == field);
    if ordered_by_key {
        return Ok(key.key);
    }

    Err(mismatch())
}

/// Rows strictly after `values` in the ordering described by `order_by`.
///
/// Each entry contributes one branch: every earlier entry equal, this one
/// strictly after. Branches that can never match are left out; with none left
/// the predicate is `FALSE`.
pub fn keyset_predicate(order_by: &[OrderBy], values: &[Primitive]) -> SQL {
    let mut branches = Vec::with_capacity(order_by.len());

    for (index, (entry, value)) in order_by.iter().zip(values).enumerate() {
        let Some(after) = strictly_after(entry, value) else {
            continue;
        };
        let mut parts: Vec<SQL> = order_by[..index]
            .iter()
            .zip(values)
            .map(|(prefix, value)| equal_to(prefix, value))
            .collect();
        parts.push(after);
        branches.push(SQL::join(parts, Token::AND));
    }

    match branches.len() {
        0 => SQL::token(Token::FALSE),
        1 => branches.remove(0),
        _ => SQL::join(branches.into_iter().map(SQL::parens), Token::OR),
    }
}

fn strictly_after(entry: &OrderBy, value: &Primitive) -> Option<SQL> {
    if value.is_null() {
        // Nothing sorts after a trailing NULL; everything non-null follows a leading one.
        return entry.nulls_first().then(|| {
            entry
                .expr
                .clone()
                .push(Token::IS)
                .push(Token::NOT)
                .push(Token::NULL)
        });
    }

    let comparison = match entry.direction {
        SortDirection::Asc => Token::GT,
        SortDirection::Desc => Token::LT,
    };
    let beyond = entry
        .expr
        .clone()
        .push(comparison)
        .append(SQL::param_cast(value.clone(), entry.cast));

    if entry.nulls_first() {
        Some(beyond)
    } else {
        Some(
            beyond
                .push(Token::OR)
                .append(entry.expr.clone())
                .push(Token::IS)
                .push(Token::NULL)
                .parens(),
        )
    }
}

fn equal_to(entry: &OrderBy, value: &Primitive) -> SQL {
    if value.is_null() {
        return entry.expr.clone().push(Token::IS).push(Token::NULL);
    }
    entry
        .expr
        .clone()
        .push(Token::IS)
        .push(Token::NOT)
        .push(Token::DISTINCT)
        .push(Token::FROM)
        .append(SQL::param_cast(value.clone(), entry.cast))
}
