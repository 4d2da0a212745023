use dynlist_types::{
    ColumnType, EntityFieldMeta, FilterOperator, FilterValue, ListFilter, Primitive,
    ValidationError,
};

use crate::sql::{SQL, Token};

/// Compiles one caller filter into a predicate over `field`.
///
/// Returns `Ok(None)` for operators that are accepted but produce no SQL.
pub(crate) fn compile_filter(
    field: &EntityFieldMeta,
    filter: &ListFilter,
) -> Result<Option<SQL>, ValidationError> {
    let column = column_sql(field);
    let cast = field.column_type.parameter_cast();

    let predicate = match filter.operator {
        FilterOperator::Equals => match scalar(field, filter)? {
            Primitive::Null => column.push(Token::IS).push(Token::NULL),
            value => compare(column, Token::EQ, value, cast),
        },
        FilterOperator::NotEquals => match scalar(field, filter)? {
            Primitive::Null => column.push(Token::IS).push(Token::NOT).push(Token::NULL),
            value => compare(column, Token::NE, value, cast),
        },
        FilterOperator::Lt => compare(column, Token::LT, required(field, filter)?, cast),
        FilterOperator::Lte => compare(column, Token::LE, required(field, filter)?, cast),
        FilterOperator::Gt => compare(column, Token::GT, required(field, filter)?, cast),
        FilterOperator::Gte => compare(column, Token::GE, required(field, filter)?, cast),
        FilterOperator::In => column
            .push(Token::EQ)
            .append(SQL::func(Token::ANY, array(list(field, filter)?, cast))),
        FilterOperator::NotIn => column
            .push(Token::NE)
            .append(SQL::func(Token::ALL, array(list(field, filter)?, cast))),
        FilterOperator::Between => {
            let (from, to) = range(field, filter)?;
            column
                .push(Token::BETWEEN)
                .append(SQL::param_cast(from, cast))
                .push(Token::AND)
                .append(SQL::param_cast(to, cast))
        }
        FilterOperator::Contains => pattern(field, filter, |v| format!("%{v}%"))?,
        FilterOperator::StartsWith => pattern(field, filter, |v| format!("{v}%"))?,
        FilterOperator::EndsWith => pattern(field, filter, |v| format!("%{v}"))?,
        FilterOperator::IsNull => column.push(Token::IS).push(Token::NULL),
        FilterOperator::IsNotNull => column.push(Token::IS).push(Token::NOT).push(Token::NULL),
        FilterOperator::Custom => return Ok(None),
    };

    if filter.negate {
        Ok(Some(SQL::token(Token::NOT).append(predicate.parens())))
    } else {
        Ok(Some(predicate))
    }
}

/// `"alias"."column"`
pub(crate) fn column_sql(field: &EntityFieldMeta) -> SQL {
    SQL::column(&field.table_alias, &field.column)
}

/// `column ILIKE $n`, casting non-text columns to text.
pub(crate) fn ilike(field: &EntityFieldMeta, pattern: String) -> SQL {
    let column = column_sql(field);
    let column = if field.column_type.is_textual() {
        column
    } else {
        column.cast("text")
    };
    column.push(Token::ILIKE).append(SQL::param(pattern))
}

fn compare(column: SQL, op: Token, value: Primitive, cast: Option<&'static str>) -> SQL {
    column.push(op).append(SQL::param_cast(value, cast))
}

fn array(values: Vec<Primitive>, cast: Option<&'static str>) -> SQL {
    SQL::token(Token::ARRAY)
        .push(Token::LBRACKET)
        .append(SQL::param_list(values, cast))
        .push(Token::RBRACKET)
}

fn pattern(
    field: &EntityFieldMeta,
    filter: &ListFilter,
    wrap: impl Fn(&Primitive) -> String,
) -> Result<SQL, ValidationError> {
    let value = match &filter.value {
        Some(FilterValue::Scalar(value)) if !value.is_null() => value,
        _ => return Err(needs(filter, "a non-null scalar value")),
    };
    Ok(ilike(field, wrap(value)))
}

/// The filter's scalar value coerced to the field type; absent means `NULL`.
fn scalar(field: &EntityFieldMeta, filter: &ListFilter) -> Result<Primitive, ValidationError> {
    match &filter.value {
        None => Ok(Primitive::Null),
        Some(FilterValue::Scalar(value)) => coerce(field, value),
        Some(other) => Err(needs(filter, &format!("a scalar value, got {}", other.kind()))),
    }
}

fn required(field: &EntityFieldMeta, filter: &ListFilter) -> Result<Primitive, ValidationError> {
    match scalar(field, filter)? {
        Primitive::Null => Err(needs(filter, "a non-null value")),
        value => Ok(value),
    }
}

fn list(field: &EntityFieldMeta, filter: &ListFilter) -> Result<Vec<Primitive>, ValidationError> {
    match &filter.value {
        Some(FilterValue::List(values)) if !values.is_empty() => values
            .iter()
            .map(|value| match value {
                Primitive::Null => Err(needs(filter, "an array without nulls")),
                value => coerce(field, value),
            })
            .collect(),
        _ => Err(needs(filter, "a non-empty array value")),
    }
}

fn range(
    field: &EntityFieldMeta,
    filter: &ListFilter,
) -> Result<(Primitive, Primitive), ValidationError> {
    let (from, to) = match &filter.value {
        Some(FilterValue::List(values)) if values.len() == 2 => (&values[0], &values[1]),
        Some(FilterValue::Record(record)) => match (record.get("from"), record.get("to")) {
            (Some(from), Some(to)) => (from, to),
            _ => return Err(needs(filter, "a {from, to} object")),
        },
        _ => return Err(needs(filter, "a two-element array or a {from, to} object")),
    };
    if from.is_null() || to.is_null() {
        return Err(needs(filter, "non-null bounds"));
    }
    Ok((coerce(field, from)?, coerce(field, to)?))
}

/// Converts a caller value into the representation the column compares against.
fn coerce(field: &EntityFieldMeta, value: &Primitive) -> Result<Primitive, ValidationError> {
    let mismatch = |expected: &str| {
        ValidationError::for_field(
            field.field.clone(),
            format!(
                "value for field {} must be {expected}, got {}",
                field.field,
                value.kind()
            ),
        )
    };

    match (field.column_type, value) {
        (_, Primitive::Null) => Ok(Primitive::Null),
        (ColumnType::Number, Primitive::Int(_) | Primitive::Float(_)) => Ok(value.clone()),
        (ColumnType::Number, Primitive::Text(text)) => {
            let text = text.trim();
            if let Ok(int) = text.parse::<i64>() {
                Ok(Primitive::Int(int))
            } else {
                match text.parse::<f64>() {
                    Ok(float) if float.is_finite() => Ok(Primitive::Float(float)),
                    _ => Err(mismatch("a number")),
                }
            }
        }
        (ColumnType::Number, Primitive::Bool(_)) => Err(mismatch("a number")),
        (ColumnType::Boolean, Primitive::Bool(_)) => Ok(value.clone()),
        (ColumnType::Boolean, Primitive::Text(text)) => match text.trim() {
            t if t.eq_ignore_ascii_case("true") => Ok(Primitive::Bool(true)),
            t if t.eq_ignore_ascii_case("false") => Ok(Primitive::Bool(false)),
            _ => Err(mismatch("a boolean")),
        },
        (ColumnType::Boolean, _) => Err(mismatch("a boolean")),
        (_, Primitive::Text(_)) => Ok(value.clone()),
        (_, other) => Ok(Primitive::Text(other.to_string())),
    }
}

fn needs(filter: &ListFilter, what: &str) -> ValidationError {
    ValidationError::for_field(
        filter.field.clone(),
        format!(
            "{} filter on {} requires {what}",
            filter.operator.as_str(),
            filter.field
        ),
    )
}
