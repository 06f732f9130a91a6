use std::path::Path;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_types::BigInt;
use diesel::sqlite::SqliteConnection;
use diesel::{ConnectionError, ConnectionResult};
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};
use diesel_async::sync_connection_wrapper::SyncConnectionWrapper;
use diesel_async::{AsyncConnection, RunQueryDsl, SimpleAsyncConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domains::todo::Todo;
use crate::error::{Result, TodoServiceError};
use crate::interfaces::backend::TodoBackend;

mod schema;
use schema::todos;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

// Writers wait on SQLite's lock instead of failing with SQLITE_BUSY.
const BUSY_TIMEOUT_PRAGMA: &str = "PRAGMA busy_timeout = 5000";

type SqliteAsyncConn = SyncConnectionWrapper<SqliteConnection>;
type SqlitePool = Pool<SqliteAsyncConn>;
type SqlitePooledConn = PooledConnection<'static, SqliteAsyncConn>;

#[derive(Queryable)]
struct TodoRow {
    id: i32,
    title: String,
    done: bool,
}

#[derive(Insertable)]
#[diesel(table_name = todos)]
struct NewTodo<'a> {
    title: &'a str,
    done: bool,
}

#[derive(QueryableByName)]
struct RowId {
    #[diesel(sql_type = BigInt)]
    id: i64,
}

pub struct SqliteTodoBackend {
    pool: RwLock<Option<SqlitePool>>,
}

impl SqliteTodoBackend {
    pub async fn new(sqlite_path: impl AsRef<str>) -> Result<Self> {
        let sqlite_path = sqlite_path.as_ref();
        ensure_parent_dir(sqlite_path)?;
        run_migrations(sqlite_path).await?;

        let mut config = ManagerConfig::default();
        config.custom_setup = Box::new(|url| establish_connection(url));
        let manager =
            AsyncDieselConnectionManager::<SqliteAsyncConn>::new_with_config(sqlite_path, config);
        let pool: SqlitePool = Pool::builder()
            .build(manager)
            .await
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
        info!(path = sqlite_path, "opened sqlite todo store");
        Ok(Self {
            pool: RwLock::new(Some(pool)),
        })
    }

    async fn conn(&self) -> Result<SqlitePooledConn> {
        let pool = self
            .pool
            .read()
            .await
            .clone()
            .ok_or_else(|| TodoServiceError::Backend("store is closed".to_string()))?;
        pool.get_owned()
            .await
            .map_err(|e| TodoServiceError::Backend(e.to_string()))
    }
}

#[async_trait]
impl TodoBackend for SqliteTodoBackend {
    async fn list(&self) -> Result<Vec<Todo>> {
        let mut conn = self.conn().await?;
        let rows: Vec<TodoRow> = todos::table
            .order(todos::id.asc())
            .load(&mut conn)
            .await
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
        Ok(rows.into_iter().map(map_row).collect())
    }

    async fn create(&self, title: &str, done: bool) -> Result<Todo> {
        let mut conn = self.conn().await?;
        diesel::insert_into(todos::table)
            .values(&NewTodo { title, done })
            .execute(&mut conn)
            .await
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;

        let row_id: RowId = diesel::sql_query("SELECT last_insert_rowid() as id")
            .get_result(&mut conn)
            .await
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
        // Ids are i32; a row beyond that range is removed again so a failed
        // create leaves nothing behind.
        let Ok(id) = i32::try_from(row_id.id) else {
            diesel::sql_query("DELETE FROM todos WHERE id = ?1")
                .bind::<BigInt, _>(row_id.id)
                .execute(&mut conn)
                .await
                .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
            return Err(TodoServiceError::Backend(
                "todo id space exhausted".to_string(),
            ));
        };
        Ok(Todo {
            id,
            title: title.to_string(),
            done,
        })
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Todo>> {
        let mut conn = self.conn().await?;
        let row: Option<TodoRow> = todos::table
            .filter(todos::id.eq(id))
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
        Ok(row.map(map_row))
    }

    async fn update(&self, id: i32, title: &str, done: bool) -> Result<Todo> {
        let mut conn = self.conn().await?;
        let count = diesel::update(todos::table.filter(todos::id.eq(id)))
            .set((todos::title.eq(title), todos::done.eq(done)))
            .execute(&mut conn)
            .await
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
        if count == 0 {
            debug!(id, "update matched no rows");
        }
        Ok(Todo {
            id,
            title: title.to_string(),
            done,
        })
    }

    async fn delete(&self, id: i32) -> Result<()> {
        let mut conn = self.conn().await?;
        diesel::delete(todos::table.filter(todos::id.eq(id)))
            .execute(&mut conn)
            .await
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.pool.write().await.take().is_some() {
            info!("closed sqlite todo store");
        }
        Ok(())
    }
}

fn ensure_parent_dir(path: &str) -> Result<()> {
    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| TodoServiceError::Backend(e.to_string()))?;
    }
    Ok(())
}

fn establish_connection(url: &str) -> BoxFuture<ConnectionResult<SqliteAsyncConn>> {
    let url = url.to_string();
    async move {
        let mut conn = <SqliteAsyncConn as AsyncConnection>::establish(&url).await?;
        conn.batch_execute(BUSY_TIMEOUT_PRAGMA)
            .await
            .map_err(ConnectionError::CouldntSetupConfiguration)?;
        Ok(conn)
    }
    .boxed()
}

async fn run_migrations(database_url: &str) -> Result<()> {
    let database_url = database_url.to_string();
    tokio::task::spawn_blocking(move || {
        let mut conn = <SqliteConnection as Connection>::establish(&database_url)
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| TodoServiceError::Backend(e.to_string()))?;
        Ok::<_, TodoServiceError>(())
    })
    .await
    .map_err(|e| TodoServiceError::Runtime(e.to_string()))??;
    Ok(())
}

fn map_row(row: TodoRow) -> Todo {
    Todo {
        id: row.id,
        title: row.title,
        done: row.done,
    }
}
