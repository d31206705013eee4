#![allow(dead_code)]

use products_service::config::ProductsConfig;
use products_service::startup::Application;
use serde_json::Value;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawns the service on a random port with the in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with(ProductsConfig::for_memory_store()).await
    }

    pub async fn spawn_with(config: ProductsConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let live_url = format!("{}/health/live", address);
        for _ in 0..50 {
            if client.get(&live_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request");
        into_parts(response).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");
        into_parts(response).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> (u16, Value) {
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request");
        into_parts(response).await
    }

    pub async fn delete(&self, path: &str) -> (u16, Value) {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("Failed to execute request");
        into_parts(response).await
    }

    /// Creates a product and returns its `_id`.
    pub async fn create_product(&self, body: &Value) -> String {
        let (status, json) = self.post_json("/products/", body).await;
        assert_eq!(status, 201, "create failed: {}", json);
        json["data"]["_id"]
            .as_str()
            .expect("created product has no _id")
            .to_string()
    }
}

async fn into_parts(response: reqwest::Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json().await.expect("Failed to parse JSON");
    (status, body)
}
