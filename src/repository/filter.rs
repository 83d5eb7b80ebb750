//! Translates [`PaginationInputWithFilter`] into parameterised SQL.
//!
//! Only columns an [`Entity`] declares can be filtered or sorted on, so field
//! names never reach the query text unchecked.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};

use crate::{
    dto::filter::{FilterCondition, FilterOperator, PaginationInputWithFilter, SortDirection},
    error::{AppError, AppResult},
    repository::{Column, ColumnKind, Entity},
};

/// `SELECT COUNT(*) FROM <table> WHERE ...`
pub fn build_count_query<T: Entity>(
    req: &PaginationInputWithFilter,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", T::TABLE));
    push_where::<T>(&mut builder, req)?;
    Ok(builder)
}

/// `SELECT <columns> FROM <table> WHERE ... ORDER BY ... LIMIT .. OFFSET ..`
pub fn build_page_query<T: Entity>(
    req: &PaginationInputWithFilter,
) -> AppResult<QueryBuilder<'static, Postgres>> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM {}",
        T::SELECT_COLUMNS,
        T::TABLE
    ));
    push_where::<T>(&mut builder, req)?;
    push_order_by::<T>(&mut builder, req)?;
    builder
        .push(" LIMIT ")
        .push_bind(req.page_size())
        .push(" OFFSET ")
        .push_bind(req.offset());
    Ok(builder)
}

fn push_where<T: Entity>(
    builder: &mut QueryBuilder<'static, Postgres>,
    req: &PaginationInputWithFilter,
) -> AppResult<()> {
    let mut first = true;
    for (field, condition) in &req.filter {
        let column = lookup::<T>(field)?;
        builder.push(if first { " WHERE " } else { " AND " });
        first = false;
        push_condition(builder, field, column, condition)?;
    }
    Ok(())
}

fn push_order_by<T: Entity>(
    builder: &mut QueryBuilder<'static, Postgres>,
    req: &PaginationInputWithFilter,
) -> AppResult<()> {
    builder.push(" ORDER BY ");
    for criteria in &req.sort {
        let column = lookup::<T>(&criteria.col_id)?;
        let direction = match criteria.sort {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        builder.push(format!("{} {}, ", column.name, direction));
    }
    // id as the final key keeps pages stable and defaults to insertion order.
    builder.push("id ASC");
    Ok(())
}

fn lookup<T: Entity>(field: &str) -> AppResult<&'static Column> {
    T::column(field).ok_or_else(|| {
        AppError::validation(format!("unknown filter field '{}' for {}", field, T::NAME))
    })
}

fn push_condition(
    builder: &mut QueryBuilder<'static, Postgres>,
    field: &str,
    column: &Column,
    condition: &FilterCondition,
) -> AppResult<()> {
    let value = &condition.from;
    let comparison = match condition.operator {
        FilterOperator::Contains => {
            return push_like(builder, field, column, "ILIKE", format!("%{}%", escape_like(value)))
        }
        FilterOperator::NotContains => {
            return push_like(builder, field, column, "NOT ILIKE", format!("%{}%", escape_like(value)))
        }
        FilterOperator::StartsWith => {
            return push_like(builder, field, column, "ILIKE", format!("{}%", escape_like(value)))
        }
        FilterOperator::EndsWith => {
            return push_like(builder, field, column, "ILIKE", format!("%{}", escape_like(value)))
        }
        FilterOperator::InRange => {
            let to = condition.to.as_deref().ok_or_else(|| {
                AppError::validation(format!("inRange filter on '{}' requires 'to'", field))
            })?;
            builder.push(format!("{} BETWEEN ", column.name));
            push_value(builder, field, column.kind, value)?;
            builder.push(" AND ");
            return push_value(builder, field, column.kind, to);
        }
        FilterOperator::Equals => "=",
        FilterOperator::NotEqual => "<>",
        FilterOperator::LessThan => "<",
        FilterOperator::LessThanOrEqual => "<=",
        FilterOperator::GreaterThan => ">",
        FilterOperator::GreaterThanOrEqual => ">=",
    };

    builder.push(format!("{} {} ", column.name, comparison));
    push_value(builder, field, column.kind, value)
}

fn push_like(
    builder: &mut QueryBuilder<'static, Postgres>,
    field: &str,
    column: &Column,
    operator: &str,
    pattern: String,
) -> AppResult<()> {
    if column.kind != ColumnKind::Text {
        return Err(AppError::validation(format!(
            "'{}' is not a text field and cannot be matched with {}",
            field, operator
        )));
    }
    builder
        .push(format!("{} {} ", column.name, operator))
        .push_bind(pattern);
    Ok(())
}

fn push_value(
    builder: &mut QueryBuilder<'static, Postgres>,
    field: &str,
    kind: ColumnKind,
    raw: &str,
) -> AppResult<()> {
    match kind {
        ColumnKind::Text => {
            builder.push_bind(raw.to_string());
        }
        ColumnKind::Integer => {
            let value: i64 = raw.trim().parse().map_err(|_| {
                AppError::validation(format!("'{}' is not a valid number for '{}'", raw, field))
            })?;
            builder.push_bind(value);
        }
        ColumnKind::Timestamp => {
            let value: DateTime<Utc> = raw.trim().parse().map_err(|_| {
                AppError::validation(format!(
                    "'{}' is not a valid RFC 3339 timestamp for '{}'",
                    raw, field
                ))
            })?;
            builder.push_bind(value);
        }
    }
    Ok(())
}

/// Escapes LIKE wildcards so user input matches literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
