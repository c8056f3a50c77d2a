//! One generic repository, instantiated once per resource kind.

use std::marker::PhantomData;
use std::sync::Arc;

use rusqlite::{params_from_iter, OptionalExtension};

use crate::error::{CatalogueError, Result};
use crate::filters::{Filters, Metadata, Page};
use crate::resource::{RecordKey, Resource};
use crate::store::columns::timestamp_column;
use crate::store::database::Database;
use crate::store::sql_query::{
    compile_filter, delete_statement, insert_statement, list_statement, select_statement,
    update_statement,
};
use crate::validator::Validator;

/// Insert, get, version-checked update, delete and filtered listing over
/// the table of `R`.
pub struct Repository<R> {
    db: Arc<Database>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for Repository<R> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            _resource: PhantomData,
        }
    }
}

fn validate<R: Resource>(record: &R) -> Result<()> {
    let mut v = Validator::new();
    record.validate(&mut v);
    v.finish()?;
    Ok(())
}

impl<R: Resource> Repository<R> {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            _resource: PhantomData,
        }
    }

    /// Store a new record. The store assigns identity, creation time and
    /// version 1, which are written back into the returned record.
    pub async fn insert(&self, mut record: R) -> Result<R> {
        record.normalize();
        validate(&record)?;

        let sql = insert_statement(R::TABLE, R::FIELDS, R::Key::COLUMNS);
        let values = record.field_values()?;

        let (key, created_at, version) = self
            .db
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                let generated = stmt.query_row(params_from_iter(values), |row| {
                    Ok((
                        R::Key::from_row(row)?,
                        timestamp_column(row, "created_at")?,
                        row.get::<_, i64>("version")?,
                    ))
                })?;
                Ok(generated)
            })
            .await?;

        record.stamp(key, created_at, version);
        Ok(record)
    }

    pub async fn get(&self, key: R::Key) -> Result<R> {
        if !key.is_valid() {
            return Err(CatalogueError::NotFound);
        }

        let sql = select_statement(R::TABLE, R::COLUMNS, R::Key::COLUMNS);
        let params = key.to_sql();

        self.db
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                stmt.query_row(params_from_iter(params), R::from_row)
                    .optional()?
                    .ok_or(CatalogueError::NotFound)
            })
            .await
    }

    /// Replace the stored record with the same identity and version.
    pub async fn update(&self, record: R) -> Result<R> {
        let key = record.key();
        self.update_from(key, record).await
    }

    /// Replace the record stored under `original` at `record.version()`.
    ///
    /// For composite identities `record` may carry a different key than
    /// `original`, moving the row. Fails with `EditConflict` when no row has
    /// that identity and version any more.
    pub async fn update_from(&self, original: R::Key, mut record: R) -> Result<R> {
        record.normalize();
        validate(&record)?;
        if !original.is_valid() {
            return Err(CatalogueError::EditConflict);
        }

        let sql = update_statement(R::TABLE, R::FIELDS, R::Key::COLUMNS);
        let mut params = record.field_values()?;
        params.extend(original.to_sql());
        params.push(record.version().into());

        let version = self
            .db
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                stmt.query_row(params_from_iter(params), |row| row.get::<_, i64>("version"))
                    .optional()?
                    .ok_or(CatalogueError::EditConflict)
            })
            .await?;

        record.set_version(version);
        Ok(record)
    }

    /// Hard-delete the record. There is no version check.
    pub async fn delete(&self, key: R::Key) -> Result<()> {
        if !key.is_valid() {
            return Err(CatalogueError::NotFound);
        }

        let sql = delete_statement(R::TABLE, R::Key::COLUMNS);
        let params = key.to_sql();

        let removed = self
            .db
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                Ok(stmt.execute(params_from_iter(params))?)
            })
            .await?;

        if removed == 0 {
            return Err(CatalogueError::NotFound);
        }
        Ok(())
    }

    /// One page of records matching `filter`, with pagination metadata.
    ///
    /// The sort token is checked against the safelist before any statement
    /// is built. A page past the end is empty with all-zero metadata.
    pub async fn list(&self, filter: &R::Filter, filters: &Filters) -> Result<Page<R>> {
        let window = filters.resolve(R::SORT_SAFELIST)?;
        let compiled = compile_filter(R::TABLE, &R::predicates(filter))?;

        let sql = list_statement(
            R::TABLE,
            R::COLUMNS,
            R::Key::COLUMNS,
            &compiled.where_clause,
            &window,
        );
        let mut params = compiled.params;
        params.push(window.limit().into());
        params.push(window.offset().into());

        let (records, total_records) = self
            .db
            .run(move |conn| {
                let mut stmt = conn.prepare_cached(&sql)?;
                let mut rows = stmt.query(params_from_iter(params))?;
                let mut records = Vec::new();
                let mut total_records = 0i64;
                while let Some(row) = rows.next()? {
                    total_records = row.get("total_records")?;
                    records.push(R::from_row(row)?);
                }
                Ok((records, total_records))
            })
            .await?;

        Ok(Page {
            records,
            metadata: Metadata::calculate(total_records, window.page, window.page_size),
        })
    }
}
