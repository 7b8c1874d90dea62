pub struct Env {
    pub jwt_secret: String,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    /// Minutes before an unanswered consult request expires.
    pub pending_session_timeout_minutes: i64,
    /// Attachment metadata size cap in bytes.
    pub max_attachment_size: i64,
    /// Upper bound on messages returned by the history endpoint.
    pub history_limit: i64,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        let pending_session_timeout_minutes = std::env::var("PENDING_SESSION_TIMEOUT_MINUTES")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<i64>()
            .expect("PENDING_SESSION_TIMEOUT_MINUTES must be a valid i64 integer");

        let max_attachment_size = std::env::var("MAX_ATTACHMENT_SIZE")
            .unwrap_or_else(|_| (10 * 1024 * 1024).to_string())
            .parse::<i64>()
            .expect("MAX_ATTACHMENT_SIZE must be a valid i64 integer");

        let history_limit = std::env::var("HISTORY_LIMIT")
            .unwrap_or_else(|_| "500".to_string())
            .parse::<i64>()
            .expect("HISTORY_LIMIT must be a valid i64 integer");

        Env {
            jwt_secret,
            database_url,
            redis_url,
            frontend_url,
            ip,
            port,
            pending_session_timeout_minutes,
            max_attachment_size,
            history_limit,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
