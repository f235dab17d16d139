use clap::Parser;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "bookshelf-gateway")]
#[command(about = "Book CRUD API with bearer auth and per-client rate limiting")]
pub struct Args {
    // Address to listen on
    #[arg(long, env = "HTTP_ADDR", default_value = "0.0.0.0:8080")]
    pub addr: String,

    // Max requests per client per minute (non-positive uses the default)
    #[arg(long, env = "RATE_LIMIT_PER_MINUTE", default_value_t = 200, allow_negative_numbers = true)]
    pub rate_limit: i64,

    // Key clients on X-Real-IP / X-Forwarded-For instead of the peer address
    #[arg(long, env = "TRUST_PROXY_HEADERS", default_value_t = false)]
    pub trust_proxy_headers: bool,

    // Seconds allowed for reading a request body
    #[arg(long, env = "HTTP_READ_TIMEOUT_SECONDS", default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub read_timeout: u64,

    // Seconds allowed for producing a response
    #[arg(long, env = "HTTP_WRITE_TIMEOUT_SECONDS", default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..))]
    pub write_timeout: u64,

    // HMAC secret for bearer tokens
    #[arg(long, env = "JWT_SECRET", default_value = DEFAULT_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    // Token lifetime in seconds
    #[arg(long, env = "JWT_TTL_SECONDS", default_value_t = 3600, value_parser = clap::value_parser!(u32).range(1..))]
    pub jwt_ttl: u32,

    // Credentials accepted by POST /auth/token
    #[arg(long, env = "AUTH_USERNAME", default_value = "admin")]
    pub auth_username: String,

    #[arg(long, env = "AUTH_PASSWORD", default_value = "password", hide_env_values = true)]
    pub auth_password: String,

    // tracing filter directive
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_filter: String,

    // Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

pub const DEFAULT_JWT_SECRET: &str = "change-me";

impl Args {
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["bookshelf-gateway"]).unwrap();
        assert_eq!(args.rate_limit, 200);
        assert_eq!(args.jwt_ttl, 3600);
        assert!(!args.trust_proxy_headers);
        assert!(args.uses_default_secret());
        assert_eq!(args.read_timeout, 10);
        assert_eq!(args.write_timeout, 15);
    }

    #[test]
    fn timeouts_must_be_positive() {
        assert!(Args::try_parse_from(["bookshelf-gateway", "--write-timeout", "0"]).is_err());
        let args = Args::try_parse_from(["bookshelf-gateway", "--read-timeout", "3"]).unwrap();
        assert_eq!(args.read_timeout, 3);
    }

    #[test]
    fn zero_ttl_is_rejected() {
        assert!(Args::try_parse_from(["bookshelf-gateway", "--jwt-ttl", "0"]).is_err());
    }

    #[test]
    fn negative_rate_limit_is_accepted() {
        let args = Args::try_parse_from(["bookshelf-gateway", "--rate-limit", "-1"]).unwrap();
        assert_eq!(args.rate_limit, -1);
    }
}
