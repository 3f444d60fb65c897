use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub default_attempts_allowed: i32,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            default_attempts_allowed: env::var("DEFAULT_ATTEMPTS_ALLOWED")
                .unwrap_or_else(|_| "6".to_string())
                .parse()
                .expect("Invalid DEFAULT_ATTEMPTS_ALLOWED"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
