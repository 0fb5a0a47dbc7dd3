use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use std::collections::HashMap;

use super::session::DbSession;
use crate::error::AppError;
use crate::models::task::TASK_COLUMNS;
use crate::models::user::USER_COLUMNS;
use crate::models::{NewUser, Task, User, UserChanges};

/// The user store that authentication and account routes delegate to.
///
/// Wraps a request's [`DbSession`]; as an extractor it resolves the session first,
/// so a handler can ask for `UserDb` alone. Every `User` it returns comes with its
/// `tasks` loaded.
pub struct UserDb {
    session: DbSession,
}

impl UserDb {
    pub fn new(session: DbSession) -> Self {
        Self { session }
    }

    pub async fn get(&mut self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.session)
            .await?;
        self.with_tasks(user).await
    }

    /// Looks a user up by email, ignoring case.
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email.trim())
            .fetch_optional(&mut *self.session)
            .await?;
        self.with_tasks(user).await
    }

    /// Inserts a user, storing the email lowercased whatever the caller passed.
    /// A taken email surfaces as `AppError::BadRequest`.
    pub async fn create(&mut self, new_user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users (email, hashed_password, is_active, is_superuser, is_verified, username) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(new_user.email.trim().to_lowercase())
            .bind(&new_user.hashed_password)
            .bind(new_user.is_active)
            .bind(new_user.is_superuser)
            .bind(new_user.is_verified)
            .bind(&new_user.username)
            .fetch_one(&mut *self.session)
            .await?;
        log::info!("Created {}", user);
        Ok(user)
    }

    /// Applies `changes` to the user with `id`. Returns `None` if there is no such user.
    pub async fn update(
        &mut self,
        id: i32,
        changes: UserChanges,
    ) -> Result<Option<User>, AppError> {
        if changes.is_empty() {
            return self.get(id).await;
        }

        let sql = format!(
            "UPDATE users SET \
                 email = COALESCE($2, email), \
                 hashed_password = COALESCE($3, hashed_password), \
                 username = COALESCE($4, username) \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.email.map(|email| email.trim().to_lowercase()))
            .bind(changes.hashed_password)
            .bind(changes.username)
            .fetch_optional(&mut *self.session)
            .await?;
        self.with_tasks(user).await
    }

    /// Deletes the user with `id`; their tasks are removed by the foreign key's cascade.
    /// Returns whether a row was deleted.
    pub async fn delete(&mut self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *self.session)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            log::info!("Deleted user {}", id);
        }
        Ok(deleted)
    }

    /// Fills `tasks` for every user in `users` with a single `ANY($1)` query.
    /// Each collection is ordered by task id.
    pub async fn load_tasks(&mut self, users: &mut [User]) -> Result<(), AppError> {
        if users.is_empty() {
            return Ok(());
        }

        let ids: Vec<i32> = users.iter().map(|user| user.id).collect();
        let sql = format!(
            "SELECT {} FROM tasks WHERE author_id = ANY($1) ORDER BY id",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(&ids)
            .fetch_all(&mut *self.session)
            .await?;

        let mut by_author: HashMap<i32, Vec<Task>> = HashMap::new();
        for task in tasks {
            by_author.entry(task.author_id).or_default().push(task);
        }
        for user in users.iter_mut() {
            user.tasks = by_author.remove(&user.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn with_tasks(&mut self, user: Option<User>) -> Result<Option<User>, AppError> {
        match user {
            Some(user) => {
                let mut users = [user];
                self.load_tasks(&mut users).await?;
                let [user] = users;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }
}

impl FromRequest for UserDb {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = DbSession::from_request(req, payload);
        Box::pin(async move { Ok::<_, ActixError>(UserDb::new(session.await?)) })
    }
}
