use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge, register_histogram};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("bookshelf_requests_total", "Total number of requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: Counter =
        register_counter!("bookshelf_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref UNAUTHORIZED_TOTAL: Counter =
        register_counter!("bookshelf_unauthorized_total", "Requests rejected by bearer auth").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "bookshelf_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_KEYS: Gauge =
        register_gauge!("bookshelf_rate_limit_keys", "Client keys currently tracked by the rate limiter").unwrap();
}

// Text exposition of everything in the default registry
pub fn render() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| format!("encode metrics: {}", e))?;
    String::from_utf8(buffer).map_err(|e| format!("metrics not utf-8: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_registered_metrics() {
        REQUEST_TOTAL.inc();
        RATE_LIMIT_KEYS.set(3.0);
        let text = render().unwrap();
        assert!(text.contains("bookshelf_requests_total"));
        assert!(text.contains("bookshelf_rate_limit_keys"));
    }
}
