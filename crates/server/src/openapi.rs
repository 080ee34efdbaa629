use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserRequestDoc {
    #[schema(example = "hong@example.com")]
    pub email: String,
    #[schema(example = "S3curePass!", format = Password)]
    pub password: String,
    #[schema(example = "Hong Gildong")]
    pub name: String,
    #[schema(example = "010-1234-5678", pattern = r"^\d{2,3}-\d{3,4}-\d{4}$")]
    pub phone_number: String,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct UserResponseDoc {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub phone_number: String,
    #[schema(example = "2024-01-01T09:00:00Z")]
    pub created_at: String,
    #[schema(example = "2024-01-01T09:00:00Z")]
    pub updated_at: String,
}

#[derive(ToSchema)]
pub struct ErrorBodyDoc {
    #[schema(example = "Duplicate Entry")]
    pub error: String,
    #[schema(example = "email already exists: hong@example.com")]
    pub message: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::create_user,
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            UserRequestDoc,
            UserResponseDoc,
            ErrorBodyDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users", description = "User management API")
    )
)]
pub struct ApiDoc;
