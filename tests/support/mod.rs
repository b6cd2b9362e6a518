//! Shared fixtures: an in-memory store with transactions, and an app wired to it.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Map, Value};
use sqlx::error::{DatabaseError, ErrorKind};
use sqlx::postgres::PgPoolOptions;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use taskhub::repository::{Transactor, UnitOfWork};
use taskhub::routes::{api_routes, with_middleware};
use taskhub::sql::{Direction, Filter, SortDirective};
use taskhub::{
    entities, resolve, AppError, AppState, AuthSettings, Repository, Row, ServiceRegistry,
    TableDescription,
};
use tokio::sync::Barrier;
use tower::ServiceExt;

/// Database error carrying a SQLSTATE, as the Postgres driver would report it.
#[derive(Debug)]
pub struct FakeDbError {
    code: String,
    message: String,
}

impl FakeDbError {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        FakeDbError {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FakeDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FakeDbError {}

impl DatabaseError for FakeDbError {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(&self.code))
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        match self.code.as_str() {
            "23505" => ErrorKind::UniqueViolation,
            "23503" => ErrorKind::ForeignKeyViolation,
            "23502" => ErrorKind::NotNullViolation,
            "23514" => ErrorKind::CheckViolation,
            _ => ErrorKind::Other,
        }
    }
}

pub fn db_error(code: &str, message: impl Into<String>) -> AppError {
    AppError::Db(sqlx::Error::Database(Box::new(FakeDbError::new(code, message))))
}

type Rows = Arc<Mutex<Vec<Row>>>;

struct Fault {
    table: String,
    op: &'static str,
    sqlstate: String,
}

#[derive(Default)]
struct StoreInner {
    tables: Mutex<HashMap<String, Rows>>,
    clock: AtomicI64,
    faults: Mutex<Vec<Fault>>,
    calls: Mutex<Vec<String>>,
}

/// Committed rows for every table, shared by all repositories and units of work built
/// from it. Records each repository call and can fail the next matching write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    fn committed(&self, table: &str) -> Rows {
        self.inner
            .tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .clone()
    }

    pub fn repository(&self, table: TableDescription) -> MemoryRepository {
        let rows = self.committed(&table.table_name);
        MemoryRepository {
            table,
            rows,
            store: self.clone(),
        }
    }

    /// Snapshot of committed rows.
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.committed(table).lock().unwrap().clone()
    }

    /// Make the next `op` ("create", "update_by", ...) on `table` fail with `sqlstate`.
    pub fn fail_next(&self, table: &str, op: &'static str, sqlstate: &str) {
        self.inner.faults.lock().unwrap().push(Fault {
            table: table.to_string(),
            op,
            sqlstate: sqlstate.to_string(),
        });
    }

    /// Calls made so far, as `table.op`.
    pub fn calls(&self) -> Vec<String> {
        self.inner.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.inner.calls.lock().unwrap().clear();
    }

    fn enter(&self, table: &str, op: &'static str) -> Result<(), AppError> {
        self.inner.calls.lock().unwrap().push(format!("{}.{}", table, op));
        let mut faults = self.inner.faults.lock().unwrap();
        match faults.iter().position(|f| f.table == table && f.op == op) {
            Some(i) => {
                let fault = faults.remove(i);
                Err(db_error(&fault.sqlstate, format!("injected failure on {}.{}", table, op)))
            }
            None => Ok(()),
        }
    }

    fn now(&self) -> Value {
        let tick = self.inner.clock.fetch_add(1, AtomicOrdering::SeqCst);
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
        Value::String((base + Duration::seconds(tick)).to_rfc3339())
    }

    /// Registry over every table, with transactions staged against this store.
    pub fn registry(&self) -> ServiceRegistry {
        let store = self.clone();
        ServiceRegistry::build(tables(), |t| Arc::new(store.repository(t)) as Arc<dyn Repository>)
            .unwrap()
            .with_transactions(Arc::new(self.clone()))
    }
}

#[async_trait]
impl Transactor for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        Ok(Box::new(MemoryUnitOfWork {
            store: self.clone(),
            staged: Mutex::new(HashMap::new()),
        }))
    }
}

/// Copies of each touched table; written back over the committed rows on commit.
struct MemoryUnitOfWork {
    store: MemoryStore,
    staged: Mutex<HashMap<String, Rows>>,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    fn repository(&self, table: TableDescription) -> Arc<dyn Repository> {
        let rows = self
            .staged
            .lock()
            .unwrap()
            .entry(table.table_name.clone())
            .or_insert_with(|| {
                let copy = self.store.committed(&table.table_name).lock().unwrap().clone();
                Arc::new(Mutex::new(copy))
            })
            .clone();
        Arc::new(MemoryRepository {
            table,
            rows,
            store: self.store.clone(),
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryUnitOfWork { store, staged } = *self;
        for (table, rows) in staged.into_inner().unwrap() {
            let rows = rows.lock().unwrap().clone();
            *store.committed(&table).lock().unwrap() = rows;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }
}

/// Repository over a Vec, honouring filter, sort, limit and offset like the SQL version.
/// Constraint violations surface as database errors with the Postgres SQLSTATE.
pub struct MemoryRepository {
    table: TableDescription,
    rows: Rows,
    store: MemoryStore,
}

impl MemoryRepository {
    pub fn new(table: TableDescription) -> Self {
        MemoryStore::new().repository(table)
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    fn enter(&self, op: &'static str) -> Result<(), AppError> {
        self.store.enter(&self.table.table_name, op)
    }

    fn check_fields(&self, filter: &Filter) -> Result<(), AppError> {
        for (field, _) in filter.terms() {
            self.table.column_for(field)?;
        }
        Ok(())
    }

    fn unique_violation(&self, rows: &[Row], candidate: &Row, skip_id: Option<&Value>) -> Result<(), AppError> {
        let clash = self.table.columns.iter().filter(|c| c.unique).find(|c| {
            let value = candidate.get(&c.field);
            value.is_some()
                && rows
                    .iter()
                    .filter(|r| skip_id.map_or(true, |id| r.get("id") != Some(id)))
                    .any(|r| r.get(&c.field) == value)
        });
        match clash {
            Some(c) => Err(db_error(
                "23505",
                format!("duplicate key value violates unique constraint on \"{}\"", c.name),
            )),
            None => Ok(()),
        }
    }

    fn apply_update(&self, row: &mut Row, data: &Row) {
        for (k, v) in data {
            row.insert(k.clone(), v.clone());
        }
        row.insert("updatedAt".into(), self.store.now());
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn table(&self) -> &TableDescription {
        &self.table
    }

    async fn count(&self, filter: &Filter) -> Result<i64, AppError> {
        self.enter("count")?;
        self.check_fields(filter)?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().filter(|r| filter.matches(r)).count() as i64)
    }

    async fn find_by(
        &self,
        filter: &Filter,
        limit: i64,
        offset: i64,
        sort: &[SortDirective],
    ) -> Result<Vec<Row>, AppError> {
        self.enter("find_by")?;
        self.check_fields(filter)?;
        let directives = if sort.is_empty() { self.table.default_sort.clone() } else { sort.to_vec() };
        for d in &directives {
            self.table.column_for(&d.field)?;
        }
        let mut matched: Vec<Row> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            directives
                .iter()
                .map(|d| {
                    let ord = compare(a.get(&d.field), b.get(&d.field));
                    match d.direction {
                        Direction::Asc => ord,
                        Direction::Desc => ord.reverse(),
                    }
                })
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
        Ok(matched
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Row>, AppError> {
        self.enter("find_by_id")?;
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|r| r.get("id") == Some(&Value::from(id))).cloned())
    }

    async fn create(&self, data: Row) -> Result<Option<Row>, AppError> {
        self.enter("create")?;
        self.table.check_write_shape(&data)?;
        let mut rows = self.rows.lock().unwrap();
        self.unique_violation(&rows, &data, None)?;
        let mut row = Map::new();
        for c in self.table.columns.iter().filter(|c| !c.is_base()) {
            let value = match data.get(&c.field) {
                Some(v) => v.clone(),
                None => match c.default.as_deref() {
                    Some("false") => Value::Bool(false),
                    Some("true") => Value::Bool(true),
                    Some(_) => Value::Null,
                    None if c.nullable => Value::Null,
                    None => {
                        return Err(db_error(
                            "23502",
                            format!("null value in column \"{}\" violates not-null constraint", c.name),
                        ))
                    }
                },
            };
            row.insert(c.field.clone(), value);
        }
        let now = self.store.now();
        row.insert("id".into(), Value::String(uuid::Uuid::new_v4().to_string()));
        row.insert("createdAt".into(), now.clone());
        row.insert("updatedAt".into(), now);
        rows.push(row.clone());
        Ok(Some(row))
    }

    async fn update_by(&self, data: Row, filter: &Filter) -> Result<Vec<Row>, AppError> {
        self.enter("update_by")?;
        self.table.check_write_shape(&data)?;
        self.check_fields(filter)?;
        let mut rows = self.rows.lock().unwrap();
        let mut out = Vec::new();
        for i in 0..rows.len() {
            if filter.matches(&rows[i]) {
                let mut row = rows[i].clone();
                self.apply_update(&mut row, &data);
                rows[i] = row.clone();
                out.push(row);
            }
        }
        Ok(out)
    }

    async fn update_by_id(&self, id: &str, data: Row) -> Result<Option<Row>, AppError> {
        self.enter("update_by_id")?;
        self.table.check_write_shape(&data)?;
        let mut rows = self.rows.lock().unwrap();
        let id = Value::from(id);
        let Some(pos) = rows.iter().position(|r| r.get("id") == Some(&id)) else {
            return Ok(None);
        };
        self.unique_violation(&rows, &data, Some(&id))?;
        let mut row = rows[pos].clone();
        self.apply_update(&mut row, &data);
        rows[pos] = row.clone();
        Ok(Some(row))
    }

    async fn delete_by(&self, filter: &Filter) -> Result<Vec<Row>, AppError> {
        self.enter("delete_by")?;
        self.check_fields(filter)?;
        let mut rows = self.rows.lock().unwrap();
        let (gone, kept): (Vec<Row>, Vec<Row>) = rows.drain(..).partition(|r| filter.matches(r));
        *rows = kept;
        Ok(gone)
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Row>, AppError> {
        self.enter("delete_by_id")?;
        let mut rows = self.rows.lock().unwrap();
        let id = Value::from(id);
        Ok(rows
            .iter()
            .position(|r| r.get("id") == Some(&id))
            .map(|pos| rows.remove(pos)))
    }
}

/// Holds `find_by` and `count` at a two-party barrier: completes only if both run at once.
pub struct GatedRepository {
    pub inner: MemoryRepository,
    pub gate: Barrier,
}

#[async_trait]
impl Repository for GatedRepository {
    fn table(&self) -> &TableDescription {
        self.inner.table()
    }

    async fn count(&self, filter: &Filter) -> Result<i64, AppError> {
        self.gate.wait().await;
        self.inner.count(filter).await
    }

    async fn find_by(
        &self,
        filter: &Filter,
        limit: i64,
        offset: i64,
        sort: &[SortDirective],
    ) -> Result<Vec<Row>, AppError> {
        self.gate.wait().await;
        self.inner.find_by(filter, limit, offset, sort).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Row>, AppError> {
        self.inner.find_by_id(id).await
    }

    async fn create(&self, data: Row) -> Result<Option<Row>, AppError> {
        self.inner.create(data).await
    }

    async fn update_by(&self, data: Row, filter: &Filter) -> Result<Vec<Row>, AppError> {
        self.inner.update_by(data, filter).await
    }

    async fn update_by_id(&self, id: &str, data: Row) -> Result<Option<Row>, AppError> {
        self.inner.update_by_id(id, data).await
    }

    async fn delete_by(&self, filter: &Filter) -> Result<Vec<Row>, AppError> {
        self.inner.delete_by(filter).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Row>, AppError> {
        self.inner.delete_by_id(id).await
    }
}

pub fn tables() -> Vec<TableDescription> {
    resolve(&entities::tables()).unwrap()
}

pub fn table(name: &str) -> TableDescription {
    tables().into_iter().find(|t| t.table_name == name).unwrap()
}

pub fn memory_registry() -> Arc<ServiceRegistry> {
    Arc::new(MemoryStore::new().registry())
}

pub fn auth_settings() -> AuthSettings {
    AuthSettings {
        jwt_secret: "test-secret".into(),
        cookie_name: "token".into(),
        refresh_cookie_name: "refresh_token".into(),
        secure_cookie: false,
        token_ttl_secs: 3600,
        refresh_ttl_secs: 7200,
        bcrypt_cost: 4,
    }
}

/// Router over a fresh in-memory store. The pool is lazy and never touched by these routes.
pub fn app() -> Router {
    app_on(&MemoryStore::new())
}

/// Router over `store`, so a test can inspect rows, calls and inject failures.
pub fn app_on(store: &MemoryStore) -> Router {
    build(store, Router::new())
}

/// Same app with extra routes merged in (e.g. a route that panics).
pub fn app_with_routes(extra: Router<AppState>) -> Router {
    build(&MemoryStore::new(), extra)
}

fn build(store: &MemoryStore, extra: Router<AppState>) -> Router {
    let state = AppState {
        pool: PgPoolOptions::new()
            .connect_lazy("postgres://localhost/taskhub_test")
            .unwrap(),
        registry: Arc::new(store.registry()),
        auth: Arc::new(auth_settings()),
    };
    with_middleware(api_routes(&state).merge(extra), state, 64 * 1024)
}

pub fn json_request(method: &str, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn empty_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(c) = cookie {
        builder = builder.header(header::COOKIE, c);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> Response<Body> {
    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_json(res: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

/// `name=value` pairs from every `Set-Cookie` header, in order.
pub fn set_cookies(res: &Response<Body>) -> Vec<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().split(';').next().unwrap().to_string())
        .collect()
}

/// The `name=value` pair for cookie `name`.
pub fn cookie_pair(res: &Response<Body>, name: &str) -> String {
    let prefix = format!("{}=", name);
    set_cookies(res).into_iter().find(|c| c.starts_with(&prefix)).unwrap()
}

/// Register a user and return the `name=value` pair from its session cookie.
pub async fn session(app: &Router, email: &str) -> String {
    sessions(app, email).await.0
}

/// Register a user and return its session and refresh cookie pairs.
pub async fn sessions(app: &Router, email: &str) -> (String, String) {
    let res = send(
        app,
        json_request("POST", "/register", serde_json::json!({"email": email, "password": "password123"}), None),
    )
    .await;
    assert_eq!(res.status(), 201);
    (cookie_pair(&res, "token"), cookie_pair(&res, "refresh_token"))
}
