use chrono::{DateTime, Duration, TimeZone, Utc};

use claims::assert_ok;

use reqwest::StatusCode;

use serde_json::Value;

use crate::helpers::{NewOrder, TestApp};

#[tokio::test]
async fn submit_creates_a_new_record() {
    let app = TestApp::spawn().await;

    let res = app
        .submit(&NewOrder::from_phone("13800000001"))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(false, body["isUpdated"]);
    assert!(body["message"].is_string());
    assert_eq!(1, app.store.len());
}

#[tokio::test]
async fn submitting_twice_on_the_same_day_merges_the_record() {
    let app = TestApp::spawn().await;
    let first = NewOrder::from_phone("13800000001");
    let second = NewOrder {
        remark: Some("changed my mind".into()),
        ..NewOrder::from_phone("13800000001")
    };

    app.submit(&first).await.expect("Failed to execute request");
    let res = app.submit(&second).await.expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(true, body["isUpdated"]);

    let stored = app.store.snapshot();
    assert_eq!(1, stored.len());
    assert!(stored[0].is_updated);
    assert_eq!(second.name, stored[0].name);
    assert_eq!(second.remark, stored[0].remark);
}

#[tokio::test]
async fn different_phones_create_separate_records() {
    let app = TestApp::spawn().await;

    for phone in ["13800000001", "13800000002"] {
        let res = app
            .submit(&NewOrder::from_phone(phone))
            .await
            .expect("Failed to execute request");
        let body: Value = res.json().await.expect("Failed to parse body");
        assert_eq!(false, body["isUpdated"]);
    }

    assert_eq!(2, app.store.len());
}

#[tokio::test]
async fn same_phone_on_an_earlier_day_is_not_merged() {
    let app = TestApp::spawn().await;
    let order = NewOrder::from_phone("13800000001");
    app.seed(&order, Utc::now() - Duration::days(1)).await;

    let res = app.submit(&order).await.expect("Failed to execute request");

    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(false, body["isUpdated"]);
    assert_eq!(2, app.store.len());
}

#[tokio::test]
async fn submit_accepts_partial_bodies() {
    let app = TestApp::spawn().await;
    let order = NewOrder {
        address: None,
        name: None,
        phone: Some("13800000001".into()),
        remark: None,
        amount: None,
    };

    let res = app.submit(&order).await.expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    assert!(app.store.snapshot()[0].address.is_none());
}

#[tokio::test]
async fn numeric_and_boolean_fields_are_stored_as_text() {
    let app = TestApp::spawn().await;

    let res = app
        .submit_json(&serde_json::json!({
            "address": "1 Main St",
            "name": "Ada",
            "phone": 13800000000u64,
            "remark": false,
            "amount": 12.5,
        }))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let stored = &app.store.snapshot()[0];
    assert_eq!(Some("13800000000"), stored.phone.as_deref());
    assert_eq!(Some("12.5"), stored.amount.as_deref());
    assert_eq!(Some("false"), stored.remark.as_deref());
}

#[tokio::test]
async fn numeric_phone_merges_with_the_same_phone_as_text() {
    let app = TestApp::spawn().await;

    app.submit(&NewOrder::from_phone("13800000000"))
        .await
        .expect("Failed to execute request");
    let res = app
        .submit_json(&serde_json::json!({ "phone": 13800000000u64, "amount": 20 }))
        .await
        .expect("Failed to execute request");

    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(true, body["isUpdated"]);
    assert_eq!(1, app.store.len());
    assert_eq!(Some("20"), app.store.snapshot()[0].amount.as_deref());
}

#[tokio::test]
async fn malformed_json_is_a_400_with_body_code() {
    let app = TestApp::spawn().await;

    let res = app
        .request(reqwest::Method::POST, "submit")
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"phone\": ")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_REQUEST, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(400, body["code"]);
    assert!(app.store.is_empty());
}

/// 8 records on 2024-06-02 and 7 on 2024-06-01, one minute apart
async fn seed_two_days(app: &TestApp) {
    let day_one = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let day_two = day_one + Duration::days(1);

    for i in 0..7 {
        let order = NewOrder::from_phone(&format!("1{:02}", i));
        app.seed(&order, day_one + Duration::minutes(i)).await;
    }
    for i in 0..8 {
        let order = NewOrder::from_phone(&format!("2{:02}", i));
        app.seed(&order, day_two + Duration::minutes(i)).await;
    }
}

fn phones(group: &Value) -> Vec<String> {
    group["list"]
        .as_array()
        .expect("list is not an array")
        .iter()
        .map(|s| s["phone"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn first_page_returns_newest_ten_records() {
    let app = TestApp::spawn().await;
    seed_two_days(&app).await;

    let res = app
        .list("?page=1&limit=10")
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(200, body["code"]);

    let data = &body["data"];
    assert_eq!(15, data["totalRecords"]);
    assert_eq!(2, data["totalPages"]);
    assert_eq!(1, data["currentPage"]);

    let groups = data["submissions"].as_array().unwrap();
    assert_eq!(2, groups.len());
    assert_eq!("2024-06-02", groups[0]["date"]);
    assert_eq!(
        vec!["207", "206", "205", "204", "203", "202", "201", "200"],
        phones(&groups[0])
    );
    assert_eq!("2024-06-01", groups[1]["date"]);
    assert_eq!(vec!["106", "105"], phones(&groups[1]));
}

#[tokio::test]
async fn second_page_returns_the_remaining_records() {
    let app = TestApp::spawn().await;
    seed_two_days(&app).await;

    let res = app
        .list("?page=2&limit=10")
        .await
        .expect("Failed to execute request");

    let body: Value = res.json().await.expect("Failed to parse body");
    let groups = body["data"]["submissions"].as_array().unwrap();
    assert_eq!(2, body["data"]["currentPage"]);
    assert_eq!(1, groups.len());
    assert_eq!("2024-06-01", groups[0]["date"]);
    assert_eq!(vec!["104", "103", "102", "101", "100"], phones(&groups[0]));
}

#[tokio::test]
async fn listing_defaults_to_first_page_of_ten() {
    let app = TestApp::spawn().await;
    seed_two_days(&app).await;

    let res = app.list("").await.expect("Failed to execute request");

    let body: Value = res.json().await.expect("Failed to parse body");
    assert_eq!(1, body["data"]["currentPage"]);
    let listed: usize = body["data"]["submissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["list"].as_array().unwrap().len())
        .sum();
    assert_eq!(10, listed);
}

#[tokio::test]
async fn listed_records_carry_the_stored_shape() {
    let app = TestApp::spawn().await;
    let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
    let seeded = app.seed(&NewOrder::from_phone("555"), created_at).await;

    let res = app.list("?page=1&limit=5").await.expect("Failed to execute request");

    let body: Value = res.json().await.expect("Failed to parse body");
    let record = &body["data"]["submissions"][0]["list"][0];
    assert_eq!(seeded.id.to_hex(), record["_id"]);
    assert_eq!(false, record["isUpdated"]);
    let listed_at: DateTime<Utc> = assert_ok!(serde_json::from_value(record["createdAt"].clone()));
    assert_eq!(created_at, listed_at);
}

#[tokio::test]
async fn non_numeric_paging_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .list("?page=abc&limit=10")
        .await
        .expect("Failed to execute request");

    assert!(res.status().is_client_error());
}
