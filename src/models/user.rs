use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::repository::{Column, ColumnKind, Entity};

/// Local record of a user whose identity lives in the external auth service.
///
/// `user_id` is the external identity id and is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub user_id: String,
}

impl NewUser {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

impl Entity for User {
    type Create = NewUser;
    // Users only ever get their timestamp refreshed.
    type Patch = ();

    const NAME: &'static str = "User";
    const TABLE: &'static str = "users";
    const SELECT_COLUMNS: &'static str = "id, user_id, created_at, updated_at";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "id", ColumnKind::Integer),
        Column::new("userId", "user_id", ColumnKind::Text),
        Column::new("createdAt", "created_at", ColumnKind::Timestamp),
    ];

    fn push_insert(builder: &mut QueryBuilder<'_, Postgres>, input: NewUser) {
        builder
            .push("(user_id) VALUES (")
            .push_bind(input.user_id)
            .push(")");
    }

    fn push_patch(_builder: &mut QueryBuilder<'_, Postgres>, _patch: ()) {}
}
