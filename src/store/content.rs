//! Generic content-record store.
//!
//! Every resource table has the same shape: system columns for identity,
//! visibility, manual ordering and timestamps, plus a JSONB document holding
//! the typed field payload. One store implementation serves all resources,
//! parameterized by the resource descriptor.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::StoreError;
use crate::resource::ResourceDescriptor;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ContentRecord {
    pub id: Uuid,
    pub doc: Value,
    pub is_active: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// List-endpoint query after bounds checking
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub search: Option<String>,
    /// Equality filters over document fields, values compared as text
    pub filters: Vec<(&'static str, String)>,
    pub include_inactive: bool,
}

pub struct ContentStore {
    pool: PgPool,
    desc: &'static ResourceDescriptor,
}

impl ContentStore {
    pub fn new(pool: PgPool, desc: &'static ResourceDescriptor) -> Self {
        Self { pool, desc }
    }

    /// List matching records plus the true total for pagination metadata.
    pub async fn list(&self, query: &ListQuery) -> Result<(Vec<ContentRecord>, i64), StoreError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if !query.include_inactive {
            clauses.push("is_active = TRUE".to_string());
        }

        if let Some(term) = query.search.as_deref().filter(|t| !t.trim().is_empty()) {
            if !self.desc.search_fields.is_empty() {
                binds.push(format!("%{}%", term.trim()));
                let param = binds.len();
                let matches: Vec<String> = self
                    .desc
                    .search_fields
                    .iter()
                    .map(|field| format!("doc->>'{}' ILIKE ${}", field, param))
                    .collect();
                clauses.push(format!("({})", matches.join(" OR ")));
            }
        }

        for (field, value) in &query.filters {
            binds.push(value.clone());
            clauses.push(format!("doc->>'{}' = ${}", field, binds.len()));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", clauses.join(" AND "))
        };

        let count_sql = format!(r#"SELECT COUNT(*) FROM "{}" {}"#, self.desc.table, where_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &binds {
            count_query = count_query.bind(bind);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let rows_sql = format!(
            r#"SELECT * FROM "{}" {} ORDER BY {} LIMIT ${} OFFSET ${}"#,
            self.desc.table,
            where_sql,
            self.desc.order_by_sql(),
            binds.len() + 1,
            binds.len() + 2,
        );
        let mut rows_query = sqlx::query_as::<_, ContentRecord>(&rows_sql);
        for bind in &binds {
            rows_query = rows_query.bind(bind);
        }
        let offset = (query.page - 1) * query.limit;
        let rows = rows_query
            .bind(query.limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ContentRecord>, StoreError> {
        let sql = format!(r#"SELECT * FROM "{}" WHERE id = $1"#, self.desc.table);
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Fetch a record by id, atomically incrementing a counter field as a
    /// side effect of the read. Single-statement, so concurrent readers
    /// never lose an increment.
    pub async fn get_and_increment(
        &self,
        id: Uuid,
        counter: &'static str,
    ) -> Result<Option<ContentRecord>, StoreError> {
        let sql = format!(
            r#"UPDATE "{table}"
               SET doc = jsonb_set(doc, '{{{field}}}', to_jsonb(COALESCE((doc->>'{field}')::bigint, 0) + 1), true)
               WHERE id = $1 RETURNING *"#,
            table = self.desc.table,
            field = counter,
        );
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Atomic counter increment with no other state changes.
    pub async fn increment(
        &self,
        id: Uuid,
        counter: &'static str,
    ) -> Result<Option<ContentRecord>, StoreError> {
        self.get_and_increment(id, counter).await
    }

    pub async fn insert(
        &self,
        doc: Value,
        is_active: Option<bool>,
        position: Option<i64>,
    ) -> Result<ContentRecord, StoreError> {
        let sql = format!(
            r#"INSERT INTO "{}" (doc, is_active, position)
               VALUES ($1, COALESCE($2, TRUE), COALESCE($3, 0))
               RETURNING *"#,
            self.desc.table
        );
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(doc)
            .bind(is_active)
            .bind(position.map(|p| p as i32))
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    /// Replace the document wholesale; system columns change only when the
    /// caller supplied them. Returns None when the id resolves to nothing.
    pub async fn update(
        &self,
        id: Uuid,
        doc: Value,
        is_active: Option<bool>,
        position: Option<i64>,
    ) -> Result<Option<ContentRecord>, StoreError> {
        let sql = format!(
            r#"UPDATE "{}"
               SET doc = $2,
                   is_active = COALESCE($3, is_active),
                   position = COALESCE($4, position),
                   updated_at = now()
               WHERE id = $1 RETURNING *"#,
            self.desc.table
        );
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .bind(doc)
            .bind(is_active)
            .bind(position.map(|p| p as i32))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!(r#"DELETE FROM "{}" WHERE id = $1"#, self.desc.table);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_position(
        &self,
        id: Uuid,
        position: i64,
    ) -> Result<Option<ContentRecord>, StoreError> {
        let sql = format!(
            r#"UPDATE "{}" SET position = $2, updated_at = now() WHERE id = $1 RETURNING *"#,
            self.desc.table
        );
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .bind(position as i32)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn toggle_active(&self, id: Uuid) -> Result<Option<ContentRecord>, StoreError> {
        let sql = format!(
            r#"UPDATE "{}" SET is_active = NOT is_active, updated_at = now() WHERE id = $1 RETURNING *"#,
            self.desc.table
        );
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn toggle_doc_flag(
        &self,
        id: Uuid,
        field: &'static str,
    ) -> Result<Option<ContentRecord>, StoreError> {
        let sql = format!(
            r#"UPDATE "{table}"
               SET doc = jsonb_set(doc, '{{{field}}}', to_jsonb(NOT COALESCE((doc->>'{field}')::boolean, false)), true),
                   updated_at = now()
               WHERE id = $1 RETURNING *"#,
            table = self.desc.table,
            field = field,
        );
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Fetch the live singleton record, creating it with the given defaults
    /// on first read. The find-then-insert pair is not guarded against
    /// concurrent first reads; see DESIGN.md.
    pub async fn singleton_or_create(
        &self,
        defaults: Value,
    ) -> Result<ContentRecord, StoreError> {
        let select_sql = format!(
            r#"SELECT * FROM "{}" WHERE is_active = TRUE ORDER BY created_at ASC LIMIT 1"#,
            self.desc.table
        );
        if let Some(existing) = sqlx::query_as::<_, ContentRecord>(&select_sql)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(existing);
        }

        self.insert(defaults, Some(true), None).await
    }

    /// Shallow-merge a patch into the document (singleton update path).
    pub async fn merge_update(
        &self,
        id: Uuid,
        patch: Value,
        is_active: Option<bool>,
    ) -> Result<Option<ContentRecord>, StoreError> {
        let sql = format!(
            r#"UPDATE "{}"
               SET doc = doc || $2,
                   is_active = COALESCE($3, is_active),
                   updated_at = now()
               WHERE id = $1 RETURNING *"#,
            self.desc.table
        );
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .bind(patch)
            .bind(is_active)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Message status transition with its timestamp side effects: `read`
    /// marks the record read, `replied` additionally stamps the reply time,
    /// other statuses change nothing but the status itself.
    pub async fn transition_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<Option<ContentRecord>, StoreError> {
        let read_patch = r#"|| jsonb_build_object('isRead', true)
               || CASE WHEN doc ? 'readAt' THEN '{}'::jsonb
                       ELSE jsonb_build_object('readAt', to_jsonb(now())) END"#;
        let replied_patch = r#"|| jsonb_build_object('repliedAt', to_jsonb(now()))"#;

        let patches = match status {
            "read" => read_patch.to_string(),
            "replied" => format!("{} {}", read_patch, replied_patch),
            _ => String::new(),
        };

        let sql = format!(
            r#"UPDATE "{table}"
               SET doc = doc || jsonb_build_object('status', $2::text) {patches},
                   updated_at = now()
               WHERE id = $1 RETURNING *"#,
            table = self.desc.table,
            patches = patches,
        );
        let row = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Resolve an id list into records, for read-time reference joins.
    pub async fn select_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ContentRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }
        let sql = format!(r#"SELECT * FROM "{}" WHERE id = ANY($1)"#, self.desc.table);
        let rows = sqlx::query_as::<_, ContentRecord>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::catalog;

    #[test]
    fn list_query_defaults_are_inactive_safe() {
        let query = ListQuery::default();
        assert!(!query.include_inactive);
        assert!(query.search.is_none());
        assert!(query.filters.is_empty());
    }

    #[test]
    fn offset_math_matches_page_and_limit() {
        let query = ListQuery { page: 3, limit: 20, ..Default::default() };
        assert_eq!((query.page - 1) * query.limit, 40);
    }

    #[test]
    fn order_by_uses_descriptor_sort_keys() {
        assert_eq!(
            catalog::CERTIFICATIONS.order_by_sql(),
            "doc->>'issueDate' DESC NULLS LAST"
        );
        assert_eq!(
            catalog::EXPERIENCE.order_by_sql(),
            "position ASC, doc->>'startDate' DESC NULLS LAST"
        );
    }
}
