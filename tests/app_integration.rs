use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const MARKETS_BODY: &str = r#"[
        {
            "symbol": "btc",
            "name": "Bitcoin",
            "current_price": 67000.5,
            "market_cap": 1300000000000,
            "price_change_percentage_24h": -1.25
        },
        {
            "symbol": "eth",
            "name": "Ethereum",
            "current_price": 3500.0,
            "market_cap": 420000000000,
            "price_change_percentage_24h": 2.1
        }
    ]"#;

    pub async fn create_markets_mock_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v3/coins/markets"))
            .respond_with(ResponseTemplate::new(200).set_body_string(MARKETS_BODY))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_rates_mock_server(base: &str, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        let url_path = format!("/v4/latest/{base}");

        Mock::given(method("GET"))
            .and(path(&url_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub async fn create_failing_server() -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

fn write_config(market_url: &str, rates_url: &str) -> tempfile::NamedTempFile {
    let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    let config_content = format!(
        r#"
currency: "USD"
providers:
  market:
    base_url: {market_url}
  rates:
    base_url: {rates_url}
"#
    );
    fs::write(config_file.path(), &config_content).expect("Failed to write config file");
    config_file
}

#[test_log::test(tokio::test)]
async fn test_prices_flow_with_mock() {
    let markets = test_utils::create_markets_mock_server().await;
    let config = write_config(&markets.uri(), "http://unused.invalid");

    let result = fxwatch::run_command(
        fxwatch::AppCommand::Prices(fxwatch::prices::PricesQuery {
            search: Some("bit".to_string()),
            sort: Some(fxwatch::dataset::SortKey::Price),
            direction: fxwatch::dataset::SortDirection::Descending,
            currency: None,
        }),
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_ok(), "Prices flow failed: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_prices_flow_with_display_currency() {
    let markets = test_utils::create_markets_mock_server().await;
    let rates = test_utils::create_rates_mock_server(
        "USD",
        r#"{"base": "USD", "rates": {"EUR": 0.91, "GBP": 0.78}}"#,
    )
    .await;
    let config = write_config(&markets.uri(), &rates.uri());

    let result = fxwatch::run_command(
        fxwatch::AppCommand::Prices(fxwatch::prices::PricesQuery {
            search: None,
            sort: None,
            direction: fxwatch::dataset::SortDirection::Ascending,
            currency: Some("EUR".to_string()),
        }),
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(
        result.is_ok(),
        "Prices flow with currency failed: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_with_mock_and_export() {
    let rates = test_utils::create_rates_mock_server(
        "USD",
        r#"{"base": "USD", "rates": {"EUR": 0.85, "GBP": 0.73}}"#,
    )
    .await;
    let config = write_config("http://unused.invalid", &rates.uri());

    let export_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let export_path = export_dir.path().join("history.csv");

    let result = fxwatch::run_command(
        fxwatch::AppCommand::Convert(fxwatch::exchange::ConvertRequest {
            amount: 100.0,
            from: "USD".to_string(),
            targets: vec!["EUR".to_string(), "GBP".to_string()],
            export: Some(export_path.clone()),
        }),
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_ok(), "Convert flow failed: {:?}", result.err());

    let csv = fs::read_to_string(&export_path).expect("Export file missing");
    info!(%csv, "Exported history");
    assert!(csv.starts_with("Date,Amount,From Currency,Converted Amount,To Currency,Exchange Rate"));
    assert!(csv.contains(",100,USD,85,EUR,0.85"));
    assert!(csv.contains(",100,USD,73,GBP,0.73"));
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_survives_rates_outage() {
    // Rates endpoint answers 500; the converter must fall back to demo rates
    // and the command must still succeed.
    let rates = test_utils::create_failing_server().await;
    let config = write_config("http://unused.invalid", &rates.uri());

    let result = fxwatch::run_command(
        fxwatch::AppCommand::Convert(fxwatch::exchange::ConvertRequest {
            amount: 50.0,
            from: "USD".to_string(),
            targets: vec!["EUR".to_string()],
            export: None,
        }),
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(
        result.is_ok(),
        "Convert should fall back to demo rates: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_rejects_invalid_amount() {
    let rates = test_utils::create_rates_mock_server(
        "USD",
        r#"{"base": "USD", "rates": {"EUR": 0.85}}"#,
    )
    .await;
    let config = write_config("http://unused.invalid", &rates.uri());

    let result = fxwatch::run_command(
        fxwatch::AppCommand::Convert(fxwatch::exchange::ConvertRequest {
            amount: -5.0,
            from: "USD".to_string(),
            targets: vec!["EUR".to_string()],
            export: None,
        }),
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(
        err.downcast_ref::<fxwatch::convert::ConvertError>().is_some(),
        "Expected a ConvertError, got: {err:?}"
    );
}

#[test_log::test(tokio::test)]
async fn test_rates_flow_with_mock() {
    let rates = test_utils::create_rates_mock_server(
        "EUR",
        r#"{"base": "EUR", "rates": {"USD": 1.08, "GBP": 0.86}}"#,
    )
    .await;
    let config = write_config("http://unused.invalid", &rates.uri());

    let result = fxwatch::run_command(
        fxwatch::AppCommand::Rates {
            base: Some("EUR".to_string()),
            search: Some("dollar".to_string()),
        },
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_ok(), "Rates flow failed: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_markets_outage_is_an_error_on_first_load() {
    // Unlike rates, there is no fallback snapshot on first load
    let markets = test_utils::create_failing_server().await;
    let config = write_config(&markets.uri(), "http://unused.invalid");

    let result = fxwatch::run_command(
        fxwatch::AppCommand::Prices(fxwatch::prices::PricesQuery::default()),
        Some(config.path().to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
}
