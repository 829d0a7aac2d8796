use std::env;

pub struct Config {
    pub api_key: String,
    pub min_event_amount: f64,
    pub top_n: usize,
    pub quarters: usize,
    pub page_size: usize,
    pub max_pages: usize,
    pub output_html: String,
    pub output_snapshot: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Self {
            api_key: env::var("GRAPH_API_KEY").map_err(|_| {
                "GRAPH_API_KEY not found in environment; create a .env file with \
                 GRAPH_API_KEY=your_gateway_key"
                    .to_string()
            })?,
            min_event_amount: env_or("MIN_EVENT_AMOUNT", 10_000.0),
            top_n: env_or("TOP_N", 20),
            quarters: env_or("QUARTERS", 6),
            page_size: env_or("PAGE_SIZE", 1000),
            max_pages: env_or("MAX_PAGES", 10),
            output_html: env::var("OUTPUT_HTML").unwrap_or_else(|_| "index.html".to_string()),
            output_snapshot: env::var("OUTPUT_SNAPSHOT")
                .unwrap_or_else(|_| "metrics_snapshot.json".to_string()),
        })
    }
}

fn env_or<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
