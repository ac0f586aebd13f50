/// Generic document operations
///
/// One set of create/find/find-by-id/update/delete operations shared by
/// every collection. Per-collection behavior (schema fields, required and
/// unique fields, filterable/updatable fields, reference checks, hidden
/// fields) lives in a `ResourceSpec` value, not in per-resource code.
///
/// Documents are stored as JSONB rows: `(id UUID PRIMARY KEY, doc JSONB)`.
/// Uniqueness is pre-checked here and backstopped by unique expression
/// indexes in the migrations.
use std::collections::HashMap;

use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, ValidationError};

/// A field that must point at an existing document in another collection.
pub struct Reference {
    pub field: &'static str,
    pub collection: &'static str,
    pub not_found_message: &'static str,
}

/// Per-collection configuration driving the generic operations.
pub struct ResourceSpec {
    /// Table / collection name
    pub collection: &'static str,
    /// Fields accepted from clients; everything else is dropped
    pub fields: &'static [&'static str],
    /// Fields that must be present as non-empty strings on create
    pub required: &'static [&'static str],
    /// Fields whose values must be unique across the collection
    pub unique: &'static [&'static str],
    /// Fields usable as equality filters on list queries
    pub filterable: &'static [&'static str],
    /// Fields a PUT may change
    pub updatable: &'static [&'static str],
    /// Fields stripped from every response body
    pub hidden: &'static [&'static str],
    /// Cross-collection existence checks run on create
    pub references: &'static [Reference],
    /// Hook run on the body right before insert (e.g. password hashing)
    pub prepare: Option<fn(&mut Map<String, Value>) -> Result<(), AppError>>,
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: Uuid,
    pub data: Map<String, Value>,
}

impl Document {
    fn from_row(id: Uuid, doc: Value) -> Self {
        let data = match doc {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { id, data }
    }

    /// JSON representation for responses: hidden fields removed, the
    /// store-generated id exposed as `_id`.
    pub fn to_response(&self, spec: &ResourceSpec) -> Value {
        let mut body = self.data.clone();
        for field in spec.hidden {
            body.remove(*field);
        }
        body.insert("_id".to_string(), Value::String(self.id.to_string()));
        Value::Object(body)
    }
}

fn is_nonempty_string(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.is_empty())
}

async fn id_exists(pool: &PgPool, collection: &str, id: Uuid) -> Result<bool, AppError> {
    let row: Option<(Uuid,)> =
        sqlx::query_as(&format!("SELECT id FROM {} WHERE id = $1", collection))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

async fn value_taken(
    pool: &PgPool,
    collection: &str,
    field: &str,
    value: &str,
) -> Result<bool, AppError> {
    let row: Option<(Uuid,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE doc->>'{}' = $1 LIMIT 1",
        collection, field
    ))
    .bind(value)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Insert a new document after schema-level validation.
pub async fn create(
    pool: &PgPool,
    spec: &ResourceSpec,
    mut body: Map<String, Value>,
) -> Result<Document, AppError> {
    // Unknown fields are dropped, not rejected
    body.retain(|key, _| spec.fields.contains(&key.as_str()));

    for field in spec.required {
        if !is_nonempty_string(body.get(*field)) {
            return Err(ValidationError::MissingField(field).into());
        }
    }

    for reference in spec.references {
        if let Some(Value::String(raw)) = body.get(reference.field) {
            let referenced = Uuid::parse_str(raw).ok();
            let found = match referenced {
                Some(id) => id_exists(pool, reference.collection, id).await?,
                None => false,
            };
            if !found {
                return Err(ValidationError::BrokenReference(
                    reference.not_found_message.to_string(),
                )
                .into());
            }
        }
    }

    for field in spec.unique {
        if let Some(Value::String(value)) = body.get(*field) {
            if value_taken(pool, spec.collection, field, value).await? {
                return Err(ValidationError::Duplicate(field).into());
            }
        }
    }

    if let Some(prepare) = spec.prepare {
        prepare(&mut body)?;
    }

    let id = Uuid::new_v4();
    sqlx::query(&format!(
        "INSERT INTO {} (id, doc) VALUES ($1, $2)",
        spec.collection
    ))
    .bind(id)
    .bind(Value::Object(body.clone()))
    .execute(pool)
    .await?;

    Ok(Document { id, data: body })
}

/// List documents, equality-filtered by whichever filterable fields appear
/// in the query string.
pub async fn find(
    pool: &PgPool,
    spec: &ResourceSpec,
    filters: &HashMap<String, String>,
) -> Result<Vec<Document>, AppError> {
    let mut sql = format!("SELECT id, doc FROM {}", spec.collection);
    let mut values: Vec<String> = Vec::new();

    for field in spec.filterable {
        if let Some(value) = filters.get(*field) {
            if value.is_empty() {
                continue;
            }
            sql.push_str(if values.is_empty() { " WHERE " } else { " AND " });
            sql.push_str(&format!("doc->>'{}' = ${}", field, values.len() + 1));
            values.push(value.clone());
        }
    }

    let mut query = sqlx::query_as::<_, (Uuid, Value)>(&sql);
    for value in &values {
        query = query.bind(value);
    }

    let rows = query.fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|(id, doc)| Document::from_row(id, doc))
        .collect())
}

pub async fn find_by_id(
    pool: &PgPool,
    spec: &ResourceSpec,
    id: Uuid,
) -> Result<Option<Document>, AppError> {
    let row = sqlx::query_as::<_, (Uuid, Value)>(&format!(
        "SELECT id, doc FROM {} WHERE id = $1",
        spec.collection
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, doc)| Document::from_row(id, doc)))
}

/// Merge the updatable fields present in `body` into the stored document.
/// Fields with empty-string or null values are skipped.
pub async fn update_by_id(
    pool: &PgPool,
    spec: &ResourceSpec,
    id: Uuid,
    body: &Map<String, Value>,
) -> Result<Option<Document>, AppError> {
    let mut patch = Map::new();
    for field in spec.updatable {
        match body.get(*field) {
            Some(Value::String(s)) if s.is_empty() => {}
            Some(Value::Null) | None => {}
            Some(value) => {
                patch.insert(field.to_string(), value.clone());
            }
        }
    }

    if patch.is_empty() {
        // Nothing to change; report the current document
        return find_by_id(pool, spec, id).await;
    }

    let row = sqlx::query_as::<_, (Uuid, Value)>(&format!(
        "UPDATE {} SET doc = doc || $1 WHERE id = $2 RETURNING id, doc",
        spec.collection
    ))
    .bind(Value::Object(patch))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, doc)| Document::from_row(id, doc)))
}

pub async fn delete_by_id(
    pool: &PgPool,
    spec: &ResourceSpec,
    id: Uuid,
) -> Result<Option<Document>, AppError> {
    let row = sqlx::query_as::<_, (Uuid, Value)>(&format!(
        "DELETE FROM {} WHERE id = $1 RETURNING id, doc",
        spec.collection
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, doc)| Document::from_row(id, doc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec_with_hidden() -> ResourceSpec {
        ResourceSpec {
            collection: "things",
            fields: &["name", "secret"],
            required: &["name"],
            unique: &[],
            filterable: &[],
            updatable: &[],
            hidden: &["secret"],
            references: &[],
            prepare: None,
        }
    }

    #[test]
    fn response_strips_hidden_fields_and_exposes_id() {
        let spec = spec_with_hidden();
        let id = Uuid::new_v4();
        let doc = Document::from_row(id, json!({"name": "x", "secret": "s3cr3t"}));

        let body = doc.to_response(&spec);
        assert_eq!(body["name"], "x");
        assert_eq!(body["_id"], id.to_string());
        assert!(body.get("secret").is_none());
    }

    #[test]
    fn empty_string_does_not_satisfy_required() {
        assert!(!is_nonempty_string(Some(&json!(""))));
        assert!(!is_nonempty_string(None));
        assert!(!is_nonempty_string(Some(&json!(42))));
        assert!(is_nonempty_string(Some(&json!("ok"))));
    }
}
