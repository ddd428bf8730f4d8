use crate::error::Result;
use crate::http::{query, HttpClient};
use crate::models::{
    ApiAck, CreateUserRequest, FactsResponse, Thread, UpdateUserRequest, User, UserListResponse,
    UserNodeResponse,
};

use super::require_id;

#[derive(Debug, Clone)]
pub struct UserClient {
    http: HttpClient,
}

impl UserClient {
    pub(crate) fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn add(&self, request: &CreateUserRequest) -> Result<User> {
        require_id(&request.user_id, "user_id")?;
        self.http.post(&["users"], request).await
    }

    pub async fn get(&self, user_id: &str) -> Result<User> {
        let user_id = require_id(user_id, "user_id")?;
        self.http.get(&["users", user_id]).await
    }

    pub async fn update(&self, user_id: &str, request: &UpdateUserRequest) -> Result<User> {
        let user_id = require_id(user_id, "user_id")?;
        self.http.patch(&["users", user_id], request).await
    }

    pub async fn delete(&self, user_id: &str) -> Result<ApiAck> {
        let user_id = require_id(user_id, "user_id")?;
        let ack: Option<ApiAck> = self.http.delete(&["users", user_id]).await?;
        Ok(ack.unwrap_or_default())
    }

    pub async fn list_ordered(
        &self,
        page_number: Option<u32>,
        page_size: Option<u32>,
    ) -> Result<UserListResponse> {
        let q = query([
            ("pageNumber", page_number.map(|n| n.to_string())),
            ("pageSize", page_size.map(|n| n.to_string())),
        ]);
        self.http.get_with_query(&["users-ordered"], &q).await
    }

    pub async fn get_threads(&self, user_id: &str) -> Result<Vec<Thread>> {
        let user_id = require_id(user_id, "user_id")?;
        let threads: Option<Vec<Thread>> = self.http.get(&["users", user_id, "threads"]).await?;
        Ok(threads.unwrap_or_default())
    }

    pub async fn get_facts(&self, user_id: &str) -> Result<FactsResponse> {
        let user_id = require_id(user_id, "user_id")?;
        let facts: Option<FactsResponse> = self.http.get(&["users", user_id, "facts"]).await?;
        Ok(facts.unwrap_or_default())
    }

    /// The graph node that stands for this user
    pub async fn get_node(&self, user_id: &str) -> Result<UserNodeResponse> {
        let user_id = require_id(user_id, "user_id")?;
        self.http.get(&["users", user_id, "node"]).await
    }
}
