//! End-to-end tests of the HTTP API against an in-memory book.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use gncql_web::{AppState, router};

const BOOK: &str = r#"<?xml version="1.0" encoding="utf-8" ?>
<gnc-v2
     xmlns:gnc="http://www.gnucash.org/XML/gnc"
     xmlns:act="http://www.gnucash.org/XML/act"
     xmlns:cd="http://www.gnucash.org/XML/cd"
     xmlns:split="http://www.gnucash.org/XML/split"
     xmlns:trn="http://www.gnucash.org/XML/trn"
     xmlns:ts="http://www.gnucash.org/XML/ts">
<gnc:book version="2.0.0">
<gnc:count-data cd:type="account">5</gnc:count-data>
<gnc:count-data cd:type="transaction">1</gnc:count-data>
<gnc:account version="2.0.0">
  <act:name>Root Account</act:name>
  <act:id type="guid">r</act:id>
  <act:type>ROOT</act:type>
</gnc:account>
<gnc:account version="2.0.0">
  <act:name>Assets</act:name>
  <act:id type="guid">a</act:id>
  <act:type>ASSET</act:type>
  <act:parent type="guid">r</act:parent>
</gnc:account>
<gnc:account version="2.0.0">
  <act:name>Expenses</act:name>
  <act:id type="guid">e</act:id>
  <act:type>EXPENSE</act:type>
  <act:parent type="guid">r</act:parent>
</gnc:account>
<gnc:account version="2.0.0">
  <act:name>Checking</act:name>
  <act:id type="guid">c</act:id>
  <act:type>BANK</act:type>
  <act:parent type="guid">a</act:parent>
</gnc:account>
<gnc:account version="2.0.0">
  <act:name>Savings</act:name>
  <act:id type="guid">s</act:id>
  <act:type>BANK</act:type>
  <act:parent type="guid">a</act:parent>
</gnc:account>
<gnc:transaction version="2.0.0">
  <trn:num>42</trn:num>
  <trn:date-posted>
    <ts:date>2021-03-04 10:00:00 +0000</ts:date>
  </trn:date-posted>
  <trn:splits>
    <trn:split>
      <split:value>-1250/100</split:value>
      <split:account type="guid">c</split:account>
    </trn:split>
    <trn:split>
      <split:value>1250/100</split:value>
      <split:account type="guid">e</split:account>
    </trn:split>
  </trn:splits>
</gnc:transaction>
</gnc:book>
</gnc-v2>
"#;

fn app() -> Router {
    let database = gncql_loader::load(BOOK.as_bytes()).expect("book should load");
    router(Arc::new(AppState::new(database)))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

fn ids(json: &Value) -> Vec<&str> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|a| a["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_status() {
    let (status, json) = get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["accounts"], 5);
    assert_eq!(json["transactions"], 2);
    assert_eq!(json["gnucash"]["compression"], "plain");
    assert_eq!(json["gnucash"]["declared_accounts"], 5);
    assert!(json["gnucash"]["file"].is_null());
    assert_eq!(json["warnings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_root_account() {
    let (status, json) = get("/api/root").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["id"], "r");
    assert_eq!(json["type"], "ROOT");
    assert!(json["parent"].is_null());
    assert_eq!(ids(&json["children"]), vec!["a", "e"]);
}

#[tokio::test]
async fn test_account_by_id() {
    let (status, json) = get("/api/accounts/c").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["name"], "Checking");
    assert_eq!(json["parent"]["id"], "a");

    let transactions = json["transactions"].as_array().unwrap();
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0]["num"], "42");
    assert_eq!(transactions[0]["date"], "2021-03-04");

    let balance: Decimal = json["balance"].as_str().unwrap().parse().unwrap();
    assert_eq!(balance, Decimal::new(-1250, 2));
}

#[tokio::test]
async fn test_unknown_account_is_404() {
    let (status, json) = get("/api/accounts/DuMmY").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "account 'DuMmY' not found");
}

#[tokio::test]
async fn test_accounts_filter() {
    let (_, all) = get("/api/accounts").await;
    assert_eq!(ids(&all), vec!["r", "a", "e", "c", "s"]);

    let (_, banks) = get("/api/accounts?type=BANK").await;
    assert_eq!(ids(&banks), vec!["c", "s"]);

    let (_, named) = get("/api/accounts?name=Savings&type=BANK").await;
    assert_eq!(ids(&named), vec!["s"]);

    let (_, none) = get("/api/accounts?name=Savings&type=ASSET").await;
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_descendants() {
    let (status, json) = get("/api/accounts/a/descendants").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&json), vec!["a", "c", "s"]);
    assert_eq!(json[1]["parent"], "a");
    assert_eq!(json[0]["children"], 2);

    let (_, banks) = get("/api/accounts/a/descendants?type=BANK").await;
    assert_eq!(ids(&banks), vec!["c", "s"]);

    let (status, _) = get("/api/accounts/x/descendants").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let (status, json) = get("/api/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "no route for '/api/nothing'");
}
