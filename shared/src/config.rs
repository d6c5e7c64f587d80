use dotenv::dotenv;
use std::str::FromStr;

pub const DEFAULT_POPULATION_CSV: &str = "202504_202504_연령별인구현황_월간_남녀구분.csv";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub population_csv_path: String,
    pub stock_api_base_url: String,
    pub stock_period: String,
    pub http_timeout_secs: u64,
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_addr: "0.0.0.0:9999".to_string(),
            population_csv_path: DEFAULT_POPULATION_CSV.to_string(),
            stock_api_base_url: "https://query1.finance.yahoo.com".to_string(),
            stock_period: "1y".to_string(),
            http_timeout_secs: 30,
            log_json: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let defaults = Config::default();
        Ok(Config {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            population_csv_path: std::env::var("POPULATION_CSV_PATH")
                .unwrap_or(defaults.population_csv_path),
            stock_api_base_url: std::env::var("STOCK_API_BASE_URL")
                .unwrap_or(defaults.stock_api_base_url),
            stock_period: std::env::var("STOCK_PERIOD").unwrap_or(defaults.stock_period),
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            log_json: parse_var("LOG_JSON", defaults.log_json)?,
        })
    }
}

/// Reads an optional variable, failing loudly on values that do not parse.
fn parse_var<T>(name: &str, default: T) -> Result<T, anyhow::Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid value for {}: {:?} ({})", name, raw, e)),
        _ => Ok(default),
    }
}
