use axum::http::HeaderValue;

/// Runtime configuration, fixed once the server starts.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub cookie_name: String,
    pub cookie_value: String,
}

impl ServerConfig {
    pub fn new(port: u16, cookie_name: String, cookie_value: String) -> Self {
        Self {
            port,
            cookie_name,
            cookie_value,
        }
    }

    /// The `Set-Cookie` value attached to every response, or `None` when
    /// either the name or the value is empty (no cookie is sent then).
    pub fn cookie_header(&self) -> Option<HeaderValue> {
        if self.cookie_name.is_empty() || self.cookie_value.is_empty() {
            return None;
        }
        let cookie = format!(
            "{}={}; Path=/; Max-Age=3600",
            self.cookie_name, self.cookie_value
        );
        HeaderValue::from_str(&cookie).ok()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            cookie_name: "MY_CUSTOM_COOKIE".to_string(),
            cookie_value: "1".to_string(),
        }
    }
}
