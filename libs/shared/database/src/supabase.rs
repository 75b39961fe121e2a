use anyhow::{Result, anyhow};
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = auth_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap()
            );
        }

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token);

        // PostgREST returns the inserted rows only when asked to
        if method == Method::POST && path.starts_with("/rest/") {
            headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Authentication error: {}", error_text),
                404 => anyhow!("Resource not found: {}", error_text),
                _ => anyhow!("API error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    pub async fn get_user_profile(&self, _user_id: &str, auth_token: &str) -> Result<Value> {
        // Use the Supabase Auth API to get user data
        let path = "/auth/v1/user";

        self.request::<Value>(
            Method::GET,
            path,
            Some(auth_token),
            None,
        ).await
    }

    pub async fn save_medication(&self, user_id: &str, medication: Value, auth_token: &str) -> Result<Value> {
        let path = "/rest/v1/medications";

        let mut row = medication;
        if let Some(obj) = row.as_object_mut() {
            obj.insert("user_id".to_string(), json!(user_id));
            obj.insert("is_active".to_string(), json!(true));
        }

        let result: Vec<Value> = self.request(
            Method::POST,
            path,
            Some(auth_token),
            Some(row),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| anyhow!("Medication insert returned no row"))
    }

    pub async fn get_user_medications(&self, user_id: &str, auth_token: &str) -> Result<Vec<Value>> {
        let path = format!(
            "/rest/v1/medications?user_id=eq.{}&is_active=eq.true&order=created_at.desc",
            user_id
        );

        self.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await
    }

    pub async fn find_doctors(&self, specialty: &str, city: &str, auth_token: &str) -> Result<Vec<Value>> {
        let path = format!(
            "/rest/v1/doctors?specialty=eq.{}&city=eq.{}&is_active=eq.true&order=rating.desc",
            urlencoding::encode(specialty),
            urlencoding::encode(city)
        );

        self.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await
    }

    pub async fn insert_appointment(&self, row: Value, auth_token: &str) -> Result<Value> {
        let path = "/rest/v1/appointments";

        let result: Vec<Value> = self.request(
            Method::POST,
            path,
            Some(auth_token),
            Some(row),
        ).await?;

        result.into_iter().next()
            .ok_or_else(|| anyhow!("Appointment insert returned no row"))
    }
}
