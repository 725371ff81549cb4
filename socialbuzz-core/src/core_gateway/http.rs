/*
    http.rs - HTTP implementation of the feed transport

    Talks JSON to the backend REST surface:

      GET    /users          PUT    /users/{id}
      POST   /users          PUT    /posts/{id}
      GET    /posts          DELETE /posts/{id}
      POST   /posts
*/

use crate::core_gateway::errors::{GatewayError, GatewayResult};
use crate::core_gateway::transport::FeedTransport;
use crate::core_store::model::{Post, PostId, User, UserId};
use async_trait::async_trait;
use metrics::counter;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// HTTP transport using reqwest against a fixed base URL
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for `base_url` (no trailing slash) with the given
    /// request timeout.
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> GatewayResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(HttpGateway { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check status, then decode the JSON body
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
        let status = response.status();
        if !status.is_success() {
            counter!("gateway.requests.failed").increment(1);
            return Err(GatewayError::Server {
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| GatewayError::Serialization(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        counter!("gateway.requests.total").increment(1);
        debug!(path = %path, "GET");

        let response = self.client.get(self.url(path)).send().await.map_err(|e| {
            counter!("gateway.requests.failed").increment(1);
            GatewayError::from(e)
        })?;

        Self::decode(response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> GatewayResult<T> {
        counter!("gateway.requests.total").increment(1);
        debug!(method = %method, path = %path, "request");

        let response = self
            .client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| {
                counter!("gateway.requests.failed").increment(1);
                GatewayError::from(e)
            })?;

        Self::decode(response).await
    }
}

#[async_trait]
impl FeedTransport for HttpGateway {
    async fn fetch_users(&self) -> GatewayResult<Vec<User>> {
        self.get("/users").await
    }

    async fn fetch_posts(&self) -> GatewayResult<Vec<Post>> {
        self.get("/posts").await
    }

    async fn create_user(&self, user: &User) -> GatewayResult<User> {
        self.send_json(reqwest::Method::POST, "/users", user).await
    }

    async fn update_user(&self, id: &UserId, user: &User) -> GatewayResult<User> {
        self.send_json(reqwest::Method::PUT, &format!("/users/{}", id), user)
            .await
    }

    async fn create_post(&self, post: &Post) -> GatewayResult<Post> {
        self.send_json(reqwest::Method::POST, "/posts", post).await
    }

    async fn update_post(&self, id: &PostId, post: &Post) -> GatewayResult<Post> {
        self.send_json(reqwest::Method::PUT, &format!("/posts/{}", id), post)
            .await
    }

    async fn delete_post(&self, id: &PostId) -> GatewayResult<()> {
        counter!("gateway.requests.total").increment(1);
        debug!(post_id = %id, "DELETE");

        let response = self
            .client
            .delete(self.url(&format!("/posts/{}", id)))
            .send()
            .await
            .map_err(|e| {
                counter!("gateway.requests.failed").increment(1);
                GatewayError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            counter!("gateway.requests.failed").increment(1);
            return Err(GatewayError::Server {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}
