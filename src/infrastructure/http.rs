use reqwest::Method;
use serde_json::Value;

/// Method, body and extra headers for one API call
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post(body: Option<Value>) -> Self {
        Self::new(Method::POST).with_body(body)
    }

    pub fn put(body: Option<Value>) -> Self {
        Self::new(Method::PUT).with_body(body)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn with_body(mut self, body: Option<Value>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Builds the reqwest request. JSON content type is always set; explicit
    /// headers are applied after it and may override it.
    pub(crate) fn build(&self, client: &reqwest::Client, url: &str) -> reqwest::RequestBuilder {
        let mut request = client
            .request(self.method.clone(), url)
            .header("Content-Type", "application/json");

        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &self.body {
            request = request.body(body.to_string());
        }

        request
    }
}

/// Joins the API base URL and an endpoint path with exactly one slash.
pub fn join_url(base: &str, endpoint: &str) -> String {
    let base = base.trim_end_matches('/');
    if endpoint.is_empty() {
        return base.to_string();
    }
    if endpoint.starts_with('/') {
        format!("{}{}", base, endpoint)
    } else {
        format!("{}/{}", base, endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("http://localhost:3001", "/kiro/health"),
            "http://localhost:3001/kiro/health"
        );
        assert_eq!(
            join_url("http://localhost:3001/", "/kiro/health"),
            "http://localhost:3001/kiro/health"
        );
        assert_eq!(
            join_url("http://localhost:3001", "kiro/plans"),
            "http://localhost:3001/kiro/plans"
        );
        assert_eq!(join_url("http://h/", ""), "http://h");
    }

    #[test]
    fn test_request_options_builders() {
        let post = RequestOptions::post(Some(serde_json::json!({"a": 1})))
            .with_header("X-Project", "conceptpulse-mvp");
        assert_eq!(post.method, Method::POST);
        assert!(post.body.is_some());
        assert_eq!(post.headers.len(), 1);

        assert_eq!(RequestOptions::default().method, Method::GET);
        assert!(RequestOptions::delete().body.is_none());
    }

    #[test]
    fn test_build_sets_json_content_type() {
        let client = reqwest::Client::new();
        let request = RequestOptions::put(Some(serde_json::json!({"status": "testing"})))
            .build(&client, "http://localhost:3001/kiro/workflows/t1/move")
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::PUT);
        assert_eq!(
            request.headers().get("content-type").unwrap(),
            "application/json"
        );
        let body = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(body, br#"{"status":"testing"}"#);
    }
}
