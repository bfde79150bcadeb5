use ticker_chart::config::{parse_interval_ms, Config, FeedConfig};
use ticker_chart::indicator::IndicatorMode;

#[test]
fn parse_default_toml() {
    let toml_str = r#"
[feed]
ws_url = "wss://ws-feed.exchange.coinbase.com"
product_ids = ["ETH-USD", "BTC-USD"]
channel = "ticker"

[aggregation]
capacity = 60000
bucket_width = "15s"
indicator_window = 15000
indicator_mode = "incremental"

[ui]
refresh_rate_ms = 1000
visible_candles = 90

[logging]
level = "debug"
file = "chart.log"
"#;
    let config = Config::from_toml_str(toml_str).unwrap();
    assert_eq!(config.feed.product_ids.len(), 2);
    assert_eq!(config.aggregation.capacity, 60_000);
    assert_eq!(config.aggregation.bucket_width_ms().unwrap(), 15_000);
    assert_eq!(config.aggregation.indicator_window, 15_000);
    assert_eq!(config.aggregation.indicator_mode, IndicatorMode::Incremental);
    assert_eq!(config.ui.visible_candles, 90);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, "chart.log");
    assert!(config.validate().is_ok());
}

#[test]
fn shipped_default_config_is_valid() {
    let config = Config::load_from(std::path::Path::new("config/default.toml")).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.feed.symbols(), vec!["ETH-USD".to_string()]);
}

#[test]
fn symbols_are_normalized_and_deduplicated() {
    let feed = FeedConfig {
        ws_url: "wss://example.com".to_string(),
        product_ids: vec![
            "eth-usd".to_string(),
            " ETH-USD ".to_string(),
            "  ".to_string(),
            "BTC-USD".to_string(),
        ],
        channel: "ticker".to_string(),
    };
    assert_eq!(
        feed.symbols(),
        vec!["ETH-USD".to_string(), "BTC-USD".to_string()]
    );
}

fn with(aggregation: &str, feed: &str) -> Config {
    let toml_str = format!("[feed]\n{}\n[aggregation]\n{}\n", feed, aggregation);
    Config::from_toml_str(&toml_str).unwrap()
}

const FEED: &str = r#"ws_url = "wss://ws-feed.exchange.coinbase.com"
product_ids = ["ETH-USD"]"#;

#[test]
fn validate_rejects_inconsistent_aggregation() {
    assert!(with("capacity = 0", FEED).validate().is_err());
    assert!(with("indicator_window = 0", FEED).validate().is_err());
    assert!(with("capacity = 100\nindicator_window = 101", FEED)
        .validate()
        .is_err());
    assert!(with("bucket_width = \"0s\"", FEED).validate().is_err());
    assert!(with("capacity = 100\nindicator_window = 100", FEED)
        .validate()
        .is_ok());
}

#[test]
fn validate_rejects_bad_feed() {
    assert!(with("", "ws_url = \"https://example.com\"\nproduct_ids = [\"ETH-USD\"]")
        .validate()
        .is_err());
    assert!(with("", "ws_url = \"not a url\"\nproduct_ids = [\"ETH-USD\"]")
        .validate()
        .is_err());
    assert!(with("", "ws_url = \"wss://example.com\"\nproduct_ids = []")
        .validate()
        .is_err());
}

#[test]
fn unknown_indicator_mode_fails_to_parse() {
    let toml_str = format!("[feed]\n{}\n[aggregation]\nindicator_mode = \"sometimes\"\n", FEED);
    assert!(Config::from_toml_str(&toml_str).is_err());
}

#[test]
fn parse_interval_valid() {
    assert_eq!(parse_interval_ms("15s").unwrap(), 15_000);
    assert_eq!(parse_interval_ms("1m").unwrap(), 60_000);
    assert_eq!(parse_interval_ms("2h").unwrap(), 7_200_000);
}

#[test]
fn parse_interval_rejects_invalid_inputs() {
    assert!(parse_interval_ms("").is_err());
    assert!(parse_interval_ms("s").is_err());
    assert!(parse_interval_ms("0m").is_err());
    assert!(parse_interval_ms("1x").is_err());
    assert!(parse_interval_ms("1M").is_err());
    assert!(parse_interval_ms("15é").is_err());
    assert!(parse_interval_ms("µ").is_err());
}

#[test]
fn validate_reports_multibyte_bucket_suffix_as_error() {
    assert!(with("bucket_width = \"1µ\"", FEED).validate().is_err());
}
