use chrono::{DateTime, Duration, Utc};

use claims::assert_ok;

use reqwest::StatusCode;

use serde_json::Value;

use crate::helpers::{NewOrder, TestApp};

const MISSING_ID: &str = "5f1d7f0b9d3e2a0012345678";

#[tokio::test]
async fn update_marks_record_and_refreshes_timestamp() {
    let app = TestApp::spawn().await;
    let order = NewOrder::from_phone("13800000001");
    let seeded_at = Utc::now() - Duration::days(3);
    let seeded = app.seed(&order, seeded_at).await;

    // Identical fields still count as an update
    let res = app
        .update_order(&seeded.id.to_hex(), &order)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(200, body["code"]);
    assert_eq!(true, body["data"]["isUpdated"]);
    assert_eq!(seeded.id.to_hex(), body["data"]["_id"]);

    let created_at: DateTime<Utc> =
        assert_ok!(serde_json::from_value(body["data"]["createdAt"].clone()));
    assert!(created_at > seeded_at);

    let stored = app.store.snapshot();
    assert!(stored[0].is_updated);
    assert_eq!(created_at, stored[0].created_at);
}

#[tokio::test]
async fn update_overwrites_provided_fields() {
    let app = TestApp::spawn().await;
    let seeded = app
        .seed(&NewOrder::from_phone("13800000001"), Utc::now() - Duration::days(1))
        .await;

    let changes = NewOrder::from_phone("13800000009");
    app.update_order(&seeded.id.to_hex(), &changes)
        .await
        .expect("Failed to execute request");

    let stored = &app.store.snapshot()[0];
    assert_eq!(changes.phone, stored.phone);
    assert_eq!(changes.address, stored.address);
    assert_eq!(changes.amount, stored.amount);
}

#[tokio::test]
async fn update_succeeds_when_the_phone_already_has_a_record_today() {
    let app = TestApp::spawn().await;
    let order = NewOrder::from_phone("13800000001");
    let yesterday = app.seed(&order, Utc::now() - Duration::days(1)).await;
    let today = app.seed(&order, Utc::now()).await;

    let res = app
        .update_order(&yesterday.id.to_hex(), &order)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(200, body["code"]);
    assert_eq!(true, body["data"]["isUpdated"]);

    // Later submissions keep merging into the record that already held today's key
    let resubmitted = NewOrder {
        remark: Some("second thoughts".into()),
        ..order.clone()
    };
    let res = app
        .submit(&resubmitted)
        .await
        .expect("Failed to execute request");
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(true, body["isUpdated"]);

    let stored = app.store.snapshot();
    assert_eq!(2, stored.len());
    let merged = stored.iter().find(|s| s.id == today.id).unwrap();
    assert_eq!(resubmitted.remark, merged.remark);
}

#[tokio::test]
async fn update_coerces_numeric_fields_to_text() {
    let app = TestApp::spawn().await;
    let seeded = app.seed(&NewOrder::from_phone("1"), Utc::now()).await;

    let res = app
        .update_order_json(
            &seeded.id.to_hex(),
            &serde_json::json!({ "phone": 13800000002u64, "amount": 99 }),
        )
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!("13800000002", body["data"]["phone"]);
    assert_eq!("99", body["data"]["amount"]);
}

#[tokio::test]
async fn update_of_missing_order_is_not_found() {
    let app = TestApp::spawn().await;

    let res = app
        .update_order(MISSING_ID, &NewOrder::from_phone("1"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(201, body["code"]);
}

#[tokio::test]
async fn update_with_malformed_id_is_a_store_failure() {
    let app = TestApp::spawn().await;

    let res = app
        .update_order("not-an-id", &NewOrder::from_phone("1"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(202, body["code"]);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn delete_removes_the_order() {
    let app = TestApp::spawn().await;
    let seeded = app.seed(&NewOrder::from_phone("1"), Utc::now()).await;

    let res = app
        .delete_order(&seeded.id.to_hex())
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(200, body["code"]);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn delete_of_missing_order_is_not_found() {
    let app = TestApp::spawn().await;
    app.seed(&NewOrder::from_phone("1"), Utc::now()).await;

    let res = app
        .delete_order(MISSING_ID)
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(201, body["code"]);
    assert_eq!(1, app.store.len());
}

#[tokio::test]
async fn delete_with_malformed_id_is_a_store_failure() {
    let app = TestApp::spawn().await;

    let res = app
        .delete_order("42")
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(202, body["code"]);
}
