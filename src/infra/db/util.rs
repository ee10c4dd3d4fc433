use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::application::repos::{Condition, Filter, RepoError};
use crate::domain::types::Field;

pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::Database(db) if db.message().contains("duplicate key") => {
            RepoError::Duplicate {
                constraint: db.constraint().unwrap_or("unknown").to_string(),
            }
        }
        sqlx::Error::Database(db) if db.message().contains("invalid input syntax") => {
            RepoError::InvalidInput {
                message: db.message().to_string(),
            }
        }
        sqlx::Error::Database(db) if db.message().contains("violates") => RepoError::Integrity {
            message: db.message().to_string(),
        },
        sqlx::Error::Database(db)
            if db
                .message()
                .contains("canceling statement due to user request") =>
        {
            RepoError::Timeout
        }
        other => RepoError::from_persistence(other),
    }
}

/// Appends ` AND (<filter>)` over the `body` column. Field names are static
/// identifiers; values are always bound.
pub(super) fn push_filter<'q>(qb: &mut QueryBuilder<'q, Postgres>, filter: &'q Filter) {
    if filter.is_all() {
        return;
    }

    qb.push(" AND (");
    for (index, clause) in filter.clauses().iter().enumerate() {
        if index > 0 {
            qb.push(" OR ");
        }
        qb.push("(");
        for (position, condition) in clause.iter().enumerate() {
            if position > 0 {
                qb.push(" AND ");
            }
            push_condition(qb, condition);
        }
        qb.push(")");
    }
    qb.push(")");
}

fn push_condition<'q>(qb: &mut QueryBuilder<'q, Postgres>, condition: &'q Condition) {
    match condition {
        Condition::Equals(Field::Id, raw) => match Uuid::parse_str(raw) {
            Ok(id) => {
                qb.push("id = ");
                qb.push_bind(id);
            }
            Err(_) => {
                qb.push("FALSE");
            }
        },
        Condition::Equals(field, value) => {
            qb.push(format!("body ->> '{}' = ", field.as_str()));
            qb.push_bind(value.as_str());
        }
        Condition::StartsWith(field, prefix) => {
            qb.push(format!("body ->> '{}' ILIKE ", field.as_str()));
            qb.push_bind(format!("{}%", escape_like(prefix)));
        }
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
