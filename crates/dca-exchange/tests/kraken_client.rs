//! Integration tests for KrakenClient against a local mock server.

use std::sync::Arc;

use dca_core::Credentials;
use dca_exchange::kraken::{
    buy_volume, encode_form, format_volume, sign, FormParams, KrakenClient, KrakenConfig,
    SequentialNonce,
};
use dca_exchange::ExchangeError;
use mockito::{Matcher, Server, ServerGuard};

const API_KEY: &str = "test-api-key";
const SECRET: &[u8] = b"test-secret-bytes";
const FIRST_NONCE: u64 = 1_000;

const TICKER_BODY: &str = r#"{"error":[],"result":{"XXBTZUSD":{"a":["50000.0","1","1.000"],"b":["49999.9","1","1.000"],"c":["50000.0","0.01"]}}}"#;

fn client_for(server: &ServerGuard) -> KrakenClient {
    KrakenClient::new(
        KrakenConfig::default().with_base_url(server.url()),
        Credentials::new(API_KEY, SECRET.to_vec()),
    )
    .expect("client must build")
    .with_nonce_source(Arc::new(SequentialNonce::starting_at(FIRST_NONCE)))
}

fn expected_body(params: &[(&'static str, &str)], nonce: u64) -> String {
    let mut form: FormParams = params.iter().map(|(k, v)| (*k, v.to_string())).collect();
    form.insert("nonce", nonce.to_string());
    encode_form(&form).unwrap()
}

#[tokio::test]
async fn test_fetch_buy_volume_from_ticker() {
    let mut server = Server::new_async().await;
    let ticker = server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::UrlEncoded("pair".into(), "XBTUSD".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(TICKER_BODY)
        .create_async()
        .await;

    let client = client_for(&server);

    let volume = client.fetch_buy_volume(10_000).await.unwrap();
    assert!((volume - 0.002).abs() < 1e-12);

    ticker.assert_async().await;
}

#[tokio::test]
async fn test_fetch_buy_volume_small_amount() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::Any)
        .with_body(r#"{"error":[],"result":{"XXBTZUSD":{"a":["50000.0"]}}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let volume = client.fetch_buy_volume(500).await.unwrap();
    assert!((volume - 0.0001).abs() < 1e-12);
}

#[tokio::test]
async fn test_ticker_provider_error_is_classified() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::Any)
        .with_body(r#"{"error":["EQuery:Unknown asset pair"]}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.fetch_buy_volume(10_000).await.unwrap_err();
    assert_eq!(
        err.contexts(),
        vec![
            "kraken.client.fetch_buy_volume",
            "kraken.client.fetch_ask_price"
        ]
    );
    assert_eq!(
        err.provider_error().map(ToString::to_string).as_deref(),
        Some("EQuery:Unknown asset pair")
    );
}

#[tokio::test]
async fn test_ticker_bad_price_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::Any)
        .with_body(r#"{"error":[],"result":{"XXBTZUSD":{"a":["not-a-price"]}}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.fetch_ask_price().await.unwrap_err();
    assert!(err.is_decode());
    assert!(matches!(
        err.root(),
        ExchangeError::InvalidNumber { field: "ask", .. }
    ));
}

#[tokio::test]
async fn test_ticker_empty_result_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::Any)
        .with_body(r#"{"error":[],"result":{}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.fetch_ask_price().await.unwrap_err();
    assert!(matches!(err.root(), ExchangeError::ParseError(_)));
}

#[tokio::test]
async fn test_non_json_error_status_is_transport_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::Any)
        .with_status(502)
        .with_body("<html>bad gateway</html>")
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.fetch_ask_price().await.unwrap_err();
    assert!(err.is_transport());
    match err.root() {
        ExchangeError::Http { status, body } => {
            assert_eq!(*status, 502);
            assert!(body.contains("bad gateway"));
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_non_json_success_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/0/public/Ticker")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("maintenance")
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.fetch_ask_price().await.unwrap_err();
    assert!(err.is_decode());
    assert!(!err.is_transport());
}

#[tokio::test]
async fn test_add_order_sends_signed_form() {
    let volume = buy_volume(10_000, 50_000.0).unwrap();
    let volume_param = format_volume(volume);
    let body = expected_body(
        &[
            ("ordertype", "market"),
            ("pair", "XBTUSD"),
            ("type", "buy"),
            ("volume", volume_param.as_str()),
        ],
        FIRST_NONCE,
    );
    let signature = sign("/0/private/AddOrder", &body, FIRST_NONCE, SECRET);

    let mut server = Server::new_async().await;
    let add_order = server
        .mock("POST", "/0/private/AddOrder")
        .match_header("API-Key", API_KEY)
        .match_header("API-Sign", signature.as_str())
        .match_header("content-type", "application/x-www-form-urlencoded")
        .match_body(body.as_str())
        .with_body(
            r#"{"error":[],"result":{"descr":{"order":"buy 0.00200000 XBTUSD @ market"},"txid":["OUF4EM-FRGI2-MQMWZD"]}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);

    let placement = client.add_order(volume).await.unwrap();
    assert_eq!(placement.transaction_id, "OUF4EM-FRGI2-MQMWZD");
    assert_eq!(placement.description, "buy 0.00200000 XBTUSD @ market");

    add_order.assert_async().await;
}

#[tokio::test]
async fn test_add_order_invalid_key_is_auth_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/0/private/AddOrder")
        .with_body(r#"{"error":["EAPI:Invalid key"]}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.add_order(0.002).await.unwrap_err();
    assert!(err.is_auth_error());
    assert!(!err.is_order_too_small());
    assert_eq!(err.contexts(), vec!["kraken.client.add_order"]);
}

#[tokio::test]
async fn test_add_order_volume_minimum_is_order_too_small() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/0/private/AddOrder")
        .with_body(r#"{"error":["EGeneral:Invalid arguments:volume minimum not met"]}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.add_order(0.00001).await.unwrap_err();
    assert!(err.is_order_too_small());
    assert_eq!(
        err.to_string(),
        "kraken.client.add_order: order is too small"
    );
}

#[tokio::test]
async fn test_add_order_rejects_invalid_volume_without_request() {
    let mut server = Server::new_async().await;
    let add_order = server
        .mock("POST", "/0/private/AddOrder")
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.add_order(0.0).await.unwrap_err();
    assert!(matches!(err.root(), ExchangeError::InvalidQuantity(_)));

    add_order.assert_async().await;
}

#[tokio::test]
async fn test_add_order_without_txid_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/0/private/AddOrder")
        .with_body(r#"{"error":[],"result":{"descr":{"order":"buy"},"txid":[]}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.add_order(0.002).await.unwrap_err();
    assert!(err.is_decode());
}

#[tokio::test]
async fn test_query_order_parses_settlement() {
    let body = expected_body(
        &[("trades", "true"), ("txid", "OUF4EM-FRGI2-MQMWZD")],
        FIRST_NONCE,
    );

    let mut server = Server::new_async().await;
    let query = server
        .mock("POST", "/0/private/QueryOrders")
        .match_header(
            "API-Sign",
            sign("/0/private/QueryOrders", &body, FIRST_NONCE, SECRET).as_str(),
        )
        .match_body(body.as_str())
        .with_body(
            r#"{"error":[],"result":{"OUF4EM-FRGI2-MQMWZD":{"status":"closed","vol":"0.00200000","vol_exec":"0.00200000","cost":"100.00000","fee":"0.26000","price":"50000.0"}}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);

    let info = client.query_order("OUF4EM-FRGI2-MQMWZD").await.unwrap();
    assert_eq!(info.volume_purchased, 0.002);
    assert_eq!(info.cost, 100.0);
    assert_eq!(info.fee, 0.26);
    assert_eq!(info.price, 50000.0);

    query.assert_async().await;
}

#[tokio::test]
async fn test_query_order_bad_number_names_field() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/0/private/QueryOrders")
        .with_body(
            r#"{"error":[],"result":{"OABC":{"vol":"0.002","cost":"100","fee":"0.26","price":"n/a"}}}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.query_order("OABC").await.unwrap_err();
    assert_eq!(err.contexts(), vec!["kraken.client.query_order"]);
    assert!(matches!(
        err.root(),
        ExchangeError::InvalidNumber { field: "price", .. }
    ));
}

#[tokio::test]
async fn test_query_order_missing_txid() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/0/private/QueryOrders")
        .with_body(r#"{"error":[],"result":{}}"#)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.query_order("OABC").await.unwrap_err();
    assert!(matches!(err.root(), ExchangeError::OrderNotFound(id) if id == "OABC"));
}
