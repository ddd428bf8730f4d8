use serde_json::Value;

use crate::client::Zep;
use crate::error::Result;
use crate::models::{CreateUserRequest, DeletedData, SuccessResponse, ThreadsData, UsersData};

/// Options for creating a user
#[derive(Debug, Default)]
pub struct AddUserOptions {
    pub user_id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub async fn add_user(zep: &Zep, opts: AddUserOptions) -> Result<Value> {
    let request = CreateUserRequest {
        email: opts.email,
        first_name: opts.first_name,
        last_name: opts.last_name,
        ..CreateUserRequest::new(opts.user_id)
    };
    let user = zep.user().add(&request).await?;
    Ok(serde_json::to_value(SuccessResponse::new(user))?)
}

pub async fn get_user(zep: &Zep, user_id: &str) -> Result<Value> {
    let user = zep.user().get(user_id).await?;
    Ok(serde_json::to_value(SuccessResponse::new(user))?)
}

pub async fn delete_user(zep: &Zep, user_id: &str) -> Result<Value> {
    zep.user().delete(user_id).await?;
    Ok(serde_json::to_value(SuccessResponse::new(DeletedData {
        deleted: user_id.to_string(),
    }))?)
}

pub async fn list_users(zep: &Zep, page: Option<u32>, page_size: Option<u32>) -> Result<Value> {
    let response = zep.user().list_ordered(page, page_size).await?;
    let count = response.users.len();
    Ok(serde_json::to_value(SuccessResponse::new(UsersData {
        users: response.users,
        count,
    }))?)
}

pub async fn user_threads(zep: &Zep, user_id: &str) -> Result<Value> {
    let threads = zep.user().get_threads(user_id).await?;
    let count = threads.len();
    Ok(serde_json::to_value(SuccessResponse::new(ThreadsData { threads, count }))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support::http_for;
    use crate::error::ZepError;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_add_user_sends_optional_fields() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/v2/users")
            .match_body(Matcher::Json(json!({"user_id": "jane", "email": "jane@example.com"})))
            .with_status(201)
            .with_body(r#"{"user_id":"jane","email":"jane@example.com"}"#)
            .create_async()
            .await;

        let zep = Zep::from_http(http_for(&server));
        let opts = AddUserOptions {
            user_id: "jane".to_string(),
            email: Some("jane@example.com".to_string()),
            ..Default::default()
        };
        let json = add_user(&zep, opts).await.unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["user_id"], "jane");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_missing_user_is_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/users/ghost")
            .with_status(404)
            .with_body(r#"{"message":"not found"}"#)
            .create_async()
            .await;

        let zep = Zep::from_http(http_for(&server));
        let err = get_user(&zep, "ghost").await.unwrap_err();
        assert!(err.is_not_found());
        assert!(!matches!(err, ZepError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_user_threads_count() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/users/jane/threads")
            .with_status(200)
            .with_body(r#"[{"thread_id":"t-1"},{"thread_id":"t-2"}]"#)
            .create_async()
            .await;

        let zep = Zep::from_http(http_for(&server));
        let json = user_threads(&zep, "jane").await.unwrap();
        assert_eq!(json["count"], 2);
        assert_eq!(json["threads"][0]["thread_id"], "t-1");
    }
}
