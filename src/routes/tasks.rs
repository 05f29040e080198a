use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskInput, TaskQuery, TaskUpdate},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false`.
/// - `priority` (optional): `low`, `medium` or `high`.
/// - `search` (optional): case-insensitive match on title or description.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = tasks.list_tasks(user.id(), &query_params).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: required, 1 to 200 characters.
/// - `description` (optional): up to 1000 characters.
/// - `completed` (optional): defaults to `false`.
/// - `priority` (optional): defaults to `medium`.
/// - `dueDate` (optional): RFC 3339 timestamp.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: body is not valid JSON or lacks `title`.
/// - `422 Unprocessable Entity`: a field breaks a validation rule.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.create_task(user.id(), task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task. Tasks owned by other users answer `404 Not Found`.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.get_task(user.id(), task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task the caller owns. Absent fields are left unchanged.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskUpdate>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .update_task(user.id(), task_id.into_inner(), task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task the caller owns; `204 No Content` on success.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    tasks.delete_task(user.id(), task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
