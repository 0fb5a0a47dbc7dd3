use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use sqlx::pool::PoolConnection;
use sqlx::{Connection, PgConnection, PgPool, Postgres, Transaction};
use std::ops::{Deref, DerefMut};

use crate::error::AppError;

/// A database session scoped to one request.
///
/// Taking `DbSession` as a handler argument checks a connection out of the
/// `web::Data<PgPool>` registered on the app. The connection goes back to the pool
/// when the session is dropped, i.e. once the handler has finished.
///
/// The session dereferences to a [`PgConnection`], so `&mut *session` can be passed
/// anywhere `sqlx` expects an executor.
pub struct DbSession {
    conn: PoolConnection<Postgres>,
}

impl DbSession {
    /// Checks a connection out of `pool`.
    pub async fn acquire(pool: &PgPool) -> Result<Self, AppError> {
        let conn = pool.acquire().await?;
        Ok(Self { conn })
    }

    /// Starts a transaction on this session's connection.
    /// It rolls back on drop unless committed.
    pub async fn begin(&mut self) -> Result<Transaction<'_, Postgres>, AppError> {
        Ok(self.conn.begin().await?)
    }
}

impl Deref for DbSession {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.conn
    }
}

impl DerefMut for DbSession {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.conn
    }
}

impl FromRequest for DbSession {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let pool = req.app_data::<web::Data<PgPool>>().cloned();
        Box::pin(async move {
            let pool = pool.ok_or_else(|| {
                log::error!("No database pool registered as app data");
                AppError::InternalServerError("Database unavailable".into())
            })?;
            let session = DbSession::acquire(&pool).await?;
            Ok::<_, ActixError>(session)
        })
    }
}
