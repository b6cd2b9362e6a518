use crate::entities::{
    task::{NewTask, TaskPatch},
    user::Credentials,
    IdParam,
};
use crate::handlers::auth::BAD_CREDENTIALS;
use crate::problem::{catalog, problem_doc, validation_problem_doc, ProblemCode, ProblemDoc, ValidationTarget};
use crate::service::Pagination;
use axum::Json;
use serde::Serialize;

const EXAMPLE_TASK: &str = "/tasks/3fa85f64-5717-4562-b3fc-2c963f66afa6";

#[derive(Serialize)]
pub struct ProblemCatalog {
    problems: Vec<ProblemDoc>,
    routes: Vec<RouteProblems>,
}

/// Problems one route can answer with, beyond the common 401/500.
#[derive(Serialize)]
struct RouteProblems {
    request: &'static str,
    problems: Vec<ProblemDoc>,
}

fn route(request: &'static str, problems: Vec<ProblemDoc>) -> RouteProblems {
    RouteProblems { request, problems }
}

fn task_id_problems() -> Vec<ProblemDoc> {
    vec![
        problem_doc(ProblemCode::NotFound, EXAMPLE_TASK, None),
        validation_problem_doc::<IdParam>(ProblemCode::UnprocessableEntity, "/tasks/not-a-uuid", ValidationTarget::Param),
    ]
}

/// GET /doc/problems: schema and example for every problem the API can return.
pub async fn problems() -> Json<ProblemCatalog> {
    let unprocessable = ProblemCode::UnprocessableEntity;
    let mut patch = task_id_problems();
    patch.push(validation_problem_doc::<TaskPatch>(unprocessable, EXAMPLE_TASK, ValidationTarget::Json));

    Json(ProblemCatalog {
        problems: catalog(),
        routes: vec![
            route(
                "POST /register",
                vec![
                    problem_doc(ProblemCode::Conflict, "/register", None),
                    validation_problem_doc::<Credentials>(unprocessable, "/register", ValidationTarget::Json),
                ],
            ),
            route(
                "POST /login",
                vec![
                    problem_doc(ProblemCode::Unauthorized, "/login", Some(BAD_CREDENTIALS)),
                    validation_problem_doc::<Credentials>(unprocessable, "/login", ValidationTarget::Json),
                ],
            ),
            route(
                "POST /refresh-token",
                vec![problem_doc(ProblemCode::Unauthorized, "/refresh-token", None)],
            ),
            route(
                "GET /tasks",
                vec![validation_problem_doc::<Pagination>(unprocessable, "/tasks", ValidationTarget::Query)],
            ),
            route(
                "POST /tasks",
                vec![validation_problem_doc::<NewTask>(unprocessable, "/tasks", ValidationTarget::Json)],
            ),
            route("GET /tasks/{id}", task_id_problems()),
            route("PATCH /tasks/{id}", patch),
            route("DELETE /tasks/{id}", task_id_problems()),
        ],
    })
}
