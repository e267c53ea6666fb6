use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, Utc};
use fintrack_api::app::services::AppServices;
use fintrack_api::config::AppConfig;
use fintrack_auth::{Argon2Hasher, Claims, InMemoryUserStore};
use fintrack_core::{Pagination, StoreError, TransactionId, UserId};
use fintrack_ledger::{InMemoryTransactionStore, Transaction, TransactionStore};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

fn test_config() -> AppConfig {
    AppConfig::from_lookup(|var| match var {
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        _ => None,
    })
    .expect("config")
}

fn cheap_hasher() -> Arc<Argon2Hasher> {
    Arc::new(Argon2Hasher::with_cost(8, 1, 1).expect("hasher"))
}

impl TestServer {
    async fn spawn() -> Self {
        // Same router as prod, in-memory stores, cheap hashing, ephemeral port.
        let services = AppServices::in_memory(&test_config(), cheap_hasher()).expect("services");
        Self::serve(services).await
    }

    async fn serve(services: AppServices) -> Self {
        let app = fintrack_api::app::router(Arc::new(services));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url,
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/users"))
            .json(&json!({ "username": username, "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/users/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Register + login; returns (user id, token).
    async fn signup(&self, username: &str) -> (String, String) {
        let email = format!("{username}@example.com");
        let res = self.register(username, &email, "pw123").await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = res.json().await.unwrap();
        let id = body["result"]["id"].as_str().unwrap().to_string();

        let res = self.login(&email, "pw123").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        let token = body["result"]["token"].as_str().unwrap().to_string();
        (id, token)
    }

    async fn create_tx(&self, token: &str, amount: i64) -> reqwest::Response {
        self.client
            .post(self.url("/transactions"))
            .bearer_auth(token)
            .json(&json!({ "amount": amount, "kind": "test", "description": "black box" }))
            .send()
            .await
            .unwrap()
    }

    async fn statement(&self, token: &str) -> Value {
        let res = self
            .client
            .get(self.url("/transactions/statement"))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn running_balances(statement: &Value) -> Vec<i64> {
    statement["lines"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["balance_after"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn().await;
    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_login_and_statement_scenario() {
    let srv = TestServer::spawn().await;

    let res = srv.register("alice", "alice@example.com", "pw123").await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["result"]["username"], "alice");
    assert!(body["result"].get("password_hash").is_none());
    assert!(!body.to_string().contains("pw123"));
    let alice_id = body["result"]["id"].as_str().unwrap().to_string();

    let res = srv.login("alice@example.com", "pw123").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let token = body["result"]["token"].as_str().unwrap().to_string();
    assert!(body["result"]["expires_at"].is_string());

    let res = srv.client.get(srv.url("/whoami")).bearer_auth(&token).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["user_id"], alice_id.as_str());

    for amount in [10_000, -2_500, 500] {
        let res = srv.create_tx(&token, amount).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let tx: Value = res.json().await.unwrap();
        assert_eq!(tx["user_id"], alice_id.as_str());
    }

    let statement = srv.statement(&token).await;
    assert_eq!(running_balances(&statement), vec![10_000, 7_500, 8_000]);
    assert_eq!(statement["summary"]["closing_balance"], 8_000);
    assert_eq!(statement["summary"]["transaction_count"], 3);

    // Idempotent read.
    assert_eq!(srv.statement(&token).await, statement);

    let res = srv
        .client
        .get(srv.url(&format!("/transactions/user/{alice_id}?limit=2")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total"], 3);
    assert_eq!(body["result"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn protected_endpoints_require_a_token() {
    let srv = TestServer::spawn().await;

    for path in ["/whoami", "/transactions", "/transactions/statement", "/users"] {
        let res = srv.client.get(srv.url(path)).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{path}");
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["error"], "unauthenticated");
    }

    let res = srv
        .client
        .post(srv.url("/transactions"))
        .json(&json!({ "amount": 100, "kind": "test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .get(srv.url("/transactions/statement"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_or_foreign_tokens_are_rejected() {
    let srv = TestServer::spawn().await;
    let (alice_id, _) = srv.signup("alice").await;
    let sub: UserId = alice_id.parse().unwrap();

    let now = Utc::now();
    let expired = Claims {
        sub,
        iat: (now - ChronoDuration::hours(13)).timestamp(),
        exp: (now - ChronoDuration::hours(1)).timestamp(),
        exp_nanos: 0,
        jti: uuid::Uuid::now_v7(),
    };
    let fresh = Claims {
        iat: now.timestamp(),
        exp: (now + ChronoDuration::hours(1)).timestamp(),
        ..expired.clone()
    };

    let mint = |claims: &Claims, secret: &str| {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    };

    for token in [mint(&expired, JWT_SECRET), mint(&fresh, "some-other-secret")] {
        let res = srv.client.get(srv.url("/whoami")).bearer_auth(token).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    // Sanity check: the same claims signed correctly and in-window are accepted.
    let res = srv
        .client
        .get(srv.url("/whoami"))
        .bearer_auth(mint(&fresh, JWT_SECRET))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn duplicate_registration_is_a_conflict() {
    let srv = TestServer::spawn().await;
    assert_eq!(srv.register("alice", "alice@example.com", "pw123").await.status(), StatusCode::CREATED);

    let res = srv.register("alice", "other@example.com", "pw123").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "conflict");

    let res = srv.register("alice2", "ALICE@example.com", "pw123").await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn bad_login_does_not_reveal_whether_the_account_exists() {
    let srv = TestServer::spawn().await;
    srv.signup("alice").await;

    let wrong_password = srv.login("alice@example.com", "nope").await;
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    let wrong_password: Value = wrong_password.json().await.unwrap();

    let no_such_user = srv.login("mallory@example.com", "pw123").await;
    assert_eq!(no_such_user.status(), StatusCode::BAD_REQUEST);
    let no_such_user: Value = no_such_user.json().await.unwrap();

    assert_eq!(wrong_password, no_such_user);
    assert_eq!(wrong_password["error"], "invalid_credentials");
}

#[tokio::test]
async fn other_users_resources_are_forbidden() {
    let srv = TestServer::spawn().await;
    let (alice_id, alice) = srv.signup("alice").await;
    let (_, bob) = srv.signup("bob").await;

    let res = srv.create_tx(&alice, 10_000).await;
    let tx: Value = res.json().await.unwrap();
    let tx_id = tx["id"].as_str().unwrap().to_string();
    let tx_path = format!("/transactions/{tx_id}");

    let res = srv.client.get(srv.url(&tx_path)).bearer_auth(&bob).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .put(srv.url(&tx_path))
        .bearer_auth(&bob)
        .json(&json!({ "amount": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv.client.delete(srv.url(&tx_path)).bearer_auth(&bob).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .get(srv.url(&format!("/transactions/user/{alice_id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .post(srv.url("/transactions"))
        .bearer_auth(&bob)
        .json(&json!({ "user_id": alice_id, "amount": -99, "kind": "theft" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = srv
        .client
        .delete(srv.url(&format!("/users/{alice_id}")))
        .bearer_auth(&bob)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Bob's own statement is unaffected by Alice's entries.
    let statement = srv.statement(&bob).await;
    assert!(statement["lines"].as_array().unwrap().is_empty());

    // Alice's entry is untouched.
    let statement = srv.statement(&alice).await;
    assert_eq!(running_balances(&statement), vec![10_000]);
}

#[tokio::test]
async fn deleted_transaction_leaves_the_statement() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.signup("alice").await;

    let mut ids = Vec::new();
    for amount in [10_000, -2_500, 500] {
        let tx: Value = srv.create_tx(&token, amount).await.json().await.unwrap();
        ids.push(tx["id"].as_str().unwrap().to_string());
    }

    let res = srv
        .client
        .delete(srv.url(&format!("/transactions/{}", ids[1])))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let statement = srv.statement(&token).await;
    assert_eq!(running_balances(&statement), vec![10_000, 10_500]);

    let res = srv
        .client
        .get(srv.url(&format!("/transactions/{}", ids[1])))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_changes_amount_and_statement() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.signup("alice").await;

    let tx: Value = srv.create_tx(&token, 100).await.json().await.unwrap();
    let res = srv
        .client
        .put(srv.url(&format!("/transactions/{}", tx["id"].as_str().unwrap())))
        .bearer_auth(&token)
        .json(&json!({ "amount": 250, "description": "corrected" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["amount"], 250);
    assert_eq!(updated["user_id"], tx["user_id"]);

    let statement = srv.statement(&token).await;
    assert_eq!(statement["summary"]["closing_balance"], 250);
}

#[tokio::test]
async fn malformed_amounts_are_validation_errors() {
    let srv = TestServer::spawn().await;
    let (_, token) = srv.signup("alice").await;

    for body in [
        json!({ "amount": 12.5, "kind": "test" }),
        json!({ "amount": 0, "kind": "test" }),
        json!({ "amount": 100 }),
        json!({ "amount": 100, "kind": "   " }),
    ] {
        let res = srv
            .client
            .post(srv.url("/transactions"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        let err: Value = res.json().await.unwrap();
        assert_eq!(err["error"], "validation_error");
    }

    let res = srv
        .client
        .get(srv.url("/transactions/statement?from=2030-01-01T00:00:00Z&to=2020-01-01T00:00:00Z"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn user_with_transactions_cannot_be_deleted() {
    let srv = TestServer::spawn().await;
    let (alice_id, token) = srv.signup("alice").await;
    let user_path = format!("/users/{alice_id}");

    let tx: Value = srv.create_tx(&token, 100).await.json().await.unwrap();

    let res = srv.client.delete(srv.url(&user_path)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    srv.client
        .delete(srv.url(&format!("/transactions/{}", tx["id"].as_str().unwrap())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let res = srv.client.delete(srv.url(&user_path)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url(&user_path)).bearer_auth(&token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_update_rehashes_password() {
    let srv = TestServer::spawn().await;
    let (alice_id, token) = srv.signup("alice").await;

    let res = srv
        .client
        .put(srv.url(&format!("/users/{alice_id}")))
        .bearer_auth(&token)
        .json(&json!({ "password": "new-secret", "email": "Alice.New@Example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["result"]["email"], "alice.new@example.com");

    assert_eq!(srv.login("alice.new@example.com", "pw123").await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(srv.login("alice.new@example.com", "new-secret").await.status(), StatusCode::OK);

    let res = srv
        .client
        .get(srv.url("/users/email/alice.new@example.com"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = srv.client.get(srv.url("/users")).bearer_auth(&token).send().await.unwrap();
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["total"], 1);
}

/// Transaction store that counts every call before delegating.
#[derive(Default)]
struct CountingStore {
    inner: InMemoryTransactionStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl TransactionStore for CountingStore {
    async fn insert(&self, transaction: Transaction) -> Result<(), StoreError> {
        self.hit();
        self.inner.insert(transaction).await
    }

    async fn find(&self, id: TransactionId) -> Result<Option<Transaction>, StoreError> {
        self.hit();
        self.inner.find(id).await
    }

    async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Transaction>, StoreError> {
        self.hit();
        self.inner.list_by_user(user_id).await
    }

    async fn page_by_user(&self, user_id: UserId, page: Pagination) -> Result<Vec<Transaction>, StoreError> {
        self.hit();
        self.inner.page_by_user(user_id, page).await
    }

    async fn count_by_user(&self, user_id: UserId) -> Result<u64, StoreError> {
        self.hit();
        self.inner.count_by_user(user_id).await
    }

    async fn update(&self, transaction: Transaction) -> Result<bool, StoreError> {
        self.hit();
        self.inner.update(transaction).await
    }

    async fn delete(&self, id: TransactionId) -> Result<bool, StoreError> {
        self.hit();
        self.inner.delete(id).await
    }
}

#[tokio::test]
async fn unauthenticated_requests_never_reach_the_ledger() {
    let store = Arc::new(CountingStore::default());
    let config = test_config();
    let services = AppServices::new(
        Arc::new(InMemoryUserStore::new()),
        store.clone(),
        cheap_hasher(),
        config.token_issuer().unwrap(),
    )
    .unwrap();
    let srv = TestServer::serve(services).await;
    let (alice_id, token) = srv.signup("alice").await;

    let res = srv
        .client
        .post(srv.url("/transactions"))
        .json(&json!({ "amount": 100, "kind": "test" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .get(srv.url("/transactions/statement"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .get(srv.url(&format!("/transactions/user/{alice_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = srv
        .client
        .delete(srv.url(&format!("/transactions/{}", TransactionId::new())))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.calls.load(Ordering::SeqCst), 0);

    // The same store is reachable once a valid token is presented.
    assert_eq!(srv.create_tx(&token, 100).await.status(), StatusCode::CREATED);
    assert!(store.calls.load(Ordering::SeqCst) > 0);
}
