use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Postgres, QueryBuilder};

use crate::repository::{Column, ColumnKind, Entity};

/// Metadata row for a file stored on local disk under `directory/name`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct File {
    pub id: i64,
    pub name: String,
    pub directory: String,
    pub description: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewFile {
    pub name: String,
    pub directory: String,
    pub description: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilePatch {
    pub description: Option<String>,
}

impl File {
    pub fn path(&self) -> String {
        format!("{}/{}", self.directory, self.name)
    }
}

impl Entity for File {
    type Create = NewFile;
    type Patch = FilePatch;

    const NAME: &'static str = "File";
    const TABLE: &'static str = "files";
    const SELECT_COLUMNS: &'static str =
        "id, name, directory, description, mime_type, created_at, updated_at";
    const COLUMNS: &'static [Column] = &[
        Column::new("id", "id", ColumnKind::Integer),
        Column::new("name", "name", ColumnKind::Text),
        Column::new("directory", "directory", ColumnKind::Text),
        Column::new("description", "description", ColumnKind::Text),
        Column::new("mimeType", "mime_type", ColumnKind::Text),
        Column::new("createdAt", "created_at", ColumnKind::Timestamp),
        Column::new("updatedAt", "updated_at", ColumnKind::Timestamp),
    ];

    fn push_insert(builder: &mut QueryBuilder<'_, Postgres>, input: NewFile) {
        builder.push("(name, directory, description, mime_type) VALUES (");
        let mut values = builder.separated(", ");
        values.push_bind(input.name);
        values.push_bind(input.directory);
        values.push_bind(input.description);
        values.push_bind(input.mime_type);
        values.push_unseparated(")");
    }

    fn push_patch(builder: &mut QueryBuilder<'_, Postgres>, patch: FilePatch) {
        if let Some(description) = patch.description {
            builder.push(", description = ").push_bind(description);
        }
    }
}
