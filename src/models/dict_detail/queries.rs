use async_trait::async_trait;
use sqlx::PgPool;

use super::filter::{self, DictDetailQueryCriteria};
use super::types::{DictDetail, DictDetailForm};
use crate::errors::AppError;
use crate::models::page::Pageable;
use crate::models::table_filter::FilterTree;
use crate::models::table_filter::builder::build_where_clause;
use crate::repository::DictDetailRepository;

const SELECT_DETAIL: &str = "\
    SELECT dd.id, d.name AS dict_name, dd.label, dd.value, dd.dict_sort \
    FROM dict_details dd \
    JOIN dicts d ON d.id = dd.dict_id";

#[derive(Clone)]
pub struct PgDictDetailRepository {
    pool: PgPool,
}

impl PgDictDetailRepository {
    pub fn new(pool: PgPool) -> Self {
        PgDictDetailRepository { pool }
    }

    async fn query(&self, tree: &FilterTree) -> Result<Vec<DictDetail>, AppError> {
        let clause = build_where_clause(tree, &filter::FIELDS, 0)?;
        let sql = format!("{SELECT_DETAIL} WHERE {} ORDER BY dd.dict_sort, dd.id", clause.sql);
        let mut query = sqlx::query_as::<_, DictDetail>(&sql);
        for p in &clause.params {
            query = query.bind(p);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }
}

/// Upsert the dictionary row and return its id.
async fn ensure_dict(conn: &mut sqlx::PgConnection, name: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO dicts (name) VALUES ($1) \
         ON CONFLICT (name) DO UPDATE SET name = excluded.name \
         RETURNING id",
    )
    .bind(name)
    .fetch_one(conn)
    .await
}

#[async_trait]
impl DictDetailRepository for PgDictDetailRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<DictDetail>, AppError> {
        let sql = format!("{SELECT_DETAIL} WHERE dd.id = $1");
        Ok(sqlx::query_as::<_, DictDetail>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_all(&self, tree: &FilterTree) -> Result<Vec<DictDetail>, AppError> {
        self.query(tree).await
    }

    async fn find_page(&self, tree: &FilterTree, pageable: &Pageable) -> Result<(Vec<DictDetail>, i64), AppError> {
        let clause = build_where_clause(tree, &filter::FIELDS, 0)?;

        let count_sql = format!(
            "SELECT COUNT(*) FROM dict_details dd JOIN dicts d ON d.id = dd.dict_id WHERE {}",
            clause.sql
        );
        let mut count = sqlx::query_scalar::<_, i64>(&count_sql);
        for p in &clause.params {
            count = count.bind(p);
        }
        let total = count.fetch_one(&self.pool).await?;

        let n = clause.params.len();
        let sql = format!(
            "{SELECT_DETAIL} WHERE {} ORDER BY dd.dict_sort, dd.id LIMIT ${} OFFSET ${}",
            clause.sql,
            n + 1,
            n + 2
        );
        let mut query = sqlx::query_as::<_, DictDetail>(&sql);
        for p in &clause.params {
            query = query.bind(p);
        }
        let details = query
            .bind(pageable.size)
            .bind(pageable.offset())
            .fetch_all(&self.pool)
            .await?;
        Ok((details, total))
    }

    async fn create(&self, form: &DictDetailForm) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;
        let dict_id = ensure_dict(&mut tx, &form.dict_name).await?;
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO dict_details (dict_id, label, value, dict_sort) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(dict_id)
        .bind(&form.label)
        .bind(&form.value)
        .bind(form.dict_sort)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(id)
    }

    async fn update(&self, id: i64, form: &DictDetailForm) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;
        let dict_id = ensure_dict(&mut tx, &form.dict_name).await?;
        let result = sqlx::query(
            "UPDATE dict_details SET dict_id = $1, label = $2, value = $3, dict_sort = $4 WHERE id = $5",
        )
        .bind(dict_id)
        .bind(&form.label)
        .bind(&form.value)
        .bind(form.dict_sort)
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            // Nothing to update; don't leave a fresh dictionary behind.
            tx.rollback().await?;
            return Ok(false);
        }
        tx.commit().await?;
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM dict_details WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_dict_name(&self, name: &str) -> Result<Vec<DictDetail>, AppError> {
        self.query(&DictDetailQueryCriteria::by_dict_name(name).to_filter()).await
    }
}
