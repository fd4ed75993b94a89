//! Payment gateway client against a mock HTTP server.

use std::time::Duration;

use serde_json::json;
use topup_api::services::payment_gateway::{FlutterwaveGateway, PaymentGateway, VerifyOutcome};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn success_body(amount: f64) -> serde_json::Value {
    json!({
        "status": "success",
        "message": "Transaction fetched successfully",
        "data": {
            "status": "successful",
            "amount": amount,
            "currency": "NGN"
        }
    })
}

#[tokio::test]
async fn confirmed_when_charge_covers_expected_amount() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/transactions/verify_by_reference"))
        .and(query_param("tx_ref", "TX-1"))
        .and(header("Authorization", "Bearer sk_test_secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(300.0)))
        .expect(1)
        .mount(&server)
        .await;

    let gateway =
        FlutterwaveGateway::new(&server.uri(), "sk_test_secret", Duration::from_secs(2)).unwrap();
    let outcome = gateway.verify("TX-1", 300).await;

    assert_eq!(
        outcome,
        VerifyOutcome::Confirmed {
            amount_observed: 300
        }
    );
}

#[tokio::test]
async fn underpaid_charge_is_not_confirmed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/transactions/verify_by_reference"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body(299.0)))
        .mount(&server)
        .await;

    let gateway =
        FlutterwaveGateway::new(&server.uri(), "sk_test_secret", Duration::from_secs(2)).unwrap();
    let outcome = gateway.verify("TX-1", 300).await;

    assert_eq!(outcome, VerifyOutcome::NotConfirmed);
}

#[tokio::test]
async fn pending_charge_is_not_confirmed() {
    let server = MockServer::start().await;
    let body = json!({
        "status": "success",
        "data": {"status": "pending", "amount": 300.0}
    });
    Mock::given(method("GET"))
        .and(path("/v3/transactions/verify_by_reference"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let gateway =
        FlutterwaveGateway::new(&server.uri(), "sk_test_secret", Duration::from_secs(2)).unwrap();
    assert_eq!(gateway.verify("TX-1", 300).await, VerifyOutcome::NotConfirmed);
}

#[tokio::test]
async fn server_error_is_unreachable_not_negative() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/transactions/verify_by_reference"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let gateway =
        FlutterwaveGateway::new(&server.uri(), "sk_test_secret", Duration::from_secs(2)).unwrap();
    assert_eq!(gateway.verify("TX-1", 300).await, VerifyOutcome::Unreachable);
}

#[tokio::test]
async fn undecodable_body_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/transactions/verify_by_reference"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let gateway =
        FlutterwaveGateway::new(&server.uri(), "sk_test_secret", Duration::from_secs(2)).unwrap();
    assert_eq!(gateway.verify("TX-1", 300).await, VerifyOutcome::Unreachable);
}

#[tokio::test]
async fn timeout_is_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/transactions/verify_by_reference"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success_body(300.0))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let gateway =
        FlutterwaveGateway::new(&server.uri(), "sk_test_secret", Duration::from_millis(200))
            .unwrap();
    assert_eq!(gateway.verify("TX-1", 300).await, VerifyOutcome::Unreachable);
}
