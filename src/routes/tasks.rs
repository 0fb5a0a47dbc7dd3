use crate::{
    auth::AuthenticatedUserId,
    db::DbSession,
    error::AppError,
    models::{task::TASK_COLUMNS, Task, TaskInput, TaskQuery},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Builds the listing query for one author. Returns the SQL and, when a search term
/// was given, the `ILIKE` pattern to bind after the optional `completed` filter.
fn list_query(query: &TaskQuery) -> (String, Option<String>) {
    let mut sql = format!("SELECT {} FROM tasks WHERE author_id = $1", TASK_COLUMNS);
    let mut param = 2;

    if query.completed.is_some() {
        sql.push_str(&format!(" AND completed = ${}", param));
        param += 1;
    }

    let pattern = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(|term| format!("%{}%", escape_like(term)));
    if pattern.is_some() {
        sql.push_str(&format!(
            " AND (title ILIKE ${p} ESCAPE '\\' OR description ILIKE ${p} ESCAPE '\\')",
            p = param
        ));
    }

    sql.push_str(" ORDER BY created_at DESC, id DESC");
    (sql, pattern)
}

/// Escapes `LIKE` wildcards so a search term only ever matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lists the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false`.
/// - `search` (optional): case-insensitive substring match on title or description.
///   `%` and `_` match themselves.
#[get("")]
pub async fn get_tasks(
    mut session: DbSession,
    user_id: AuthenticatedUserId,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let (sql, pattern) = list_query(&query_params);

    let mut query = sqlx::query_as::<_, Task>(&sql).bind(user_id.0);
    if let Some(completed) = query_params.completed {
        query = query.bind(completed);
    }
    if let Some(pattern) = pattern {
        query = query.bind(pattern);
    }

    let tasks = query.fetch_all(&mut *session).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task`; `id` and `created_at` come from the database.
/// - `422 Unprocessable Entity`: empty title, or longer than 50 characters.
#[post("")]
pub async fn create_task(
    mut session: DbSession,
    user_id: AuthenticatedUserId,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let input = task_data.into_inner();

    let sql = format!(
        "INSERT INTO tasks (title, description, completed, author_id) \
         VALUES ($1, $2, $3, $4) \
         RETURNING {}",
        TASK_COLUMNS
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(input.title)
        .bind(input.description)
        .bind(input.completed)
        .bind(user_id.0)
        .fetch_one(&mut *session)
        .await?;

    log::debug!("User {} created {}", user_id.0, task);
    Ok(HttpResponse::Created().json(task))
}

/// Fetches one task. Tasks owned by someone else are reported as not found.
#[get("/{id}")]
pub async fn get_task(
    mut session: DbSession,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let sql = format!(
        "SELECT {} FROM tasks WHERE id = $1 AND author_id = $2",
        TASK_COLUMNS
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(task_id.into_inner())
        .bind(user_id.0)
        .fetch_optional(&mut *session)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Replaces title, description and completed flag of a task the user owns.
/// `created_at` and `author_id` never change.
#[put("/{id}")]
pub async fn update_task(
    mut session: DbSession,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let input = task_data.into_inner();

    let sql = format!(
        "UPDATE tasks SET title = $1, description = $2, completed = $3 \
         WHERE id = $4 AND author_id = $5 \
         RETURNING {}",
        TASK_COLUMNS
    );
    let task = sqlx::query_as::<_, Task>(&sql)
        .bind(input.title)
        .bind(input.description)
        .bind(input.completed)
        .bind(task_id.into_inner())
        .bind(user_id.0)
        .fetch_optional(&mut *session)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the user owns.
#[delete("/{id}")]
pub async fn delete_task(
    mut session: DbSession,
    user_id: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND author_id = $2")
        .bind(task_id.into_inner())
        .bind(user_id.0)
        .execute(&mut *session)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
