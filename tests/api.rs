// Tests HTTP de bout en bout: l'App réelle sur SQLite en mémoire,
// avec une passerelle de paiement scriptée.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::{Value, json};

use storefront::config::{AppConfig, ProductDeletePolicy};
use storefront::models::payment::{PaymentResult, PaymentTransaction};
use storefront::models::users::{self, Role};
use storefront::services::payment::{PaymentError, PaymentGateway};
use storefront::{db, routes};

struct ApprovingGateway;

#[async_trait]
impl PaymentGateway for ApprovingGateway {
    async fn generate_client_token(&self) -> Result<String, PaymentError> {
        Ok("client-token-123".to_string())
    }

    async fn sale(&self, amount: Decimal, _nonce: &str) -> Result<PaymentResult, PaymentError> {
        Ok(PaymentResult {
            success: true,
            transaction: Some(PaymentTransaction {
                id: "txn_1".to_string(),
                amount,
                status: "SUBMITTED_FOR_SETTLEMENT".to_string(),
            }),
            message: None,
        })
    }
}

struct DecliningGateway;

#[async_trait]
impl PaymentGateway for DecliningGateway {
    async fn generate_client_token(&self) -> Result<String, PaymentError> {
        Err(PaymentError::NotConfigured)
    }

    async fn sale(&self, _amount: Decimal, _nonce: &str) -> Result<PaymentResult, PaymentError> {
        Ok(PaymentResult {
            success: false,
            transaction: None,
            message: Some("Processor Declined".to_string()),
        })
    }
}

async fn memory_db() -> DatabaseConnection {
    let conn = db::establish_connection("sqlite::memory:").await.unwrap();
    db::create_schema(&conn).await.unwrap();
    conn
}

macro_rules! app {
    ($db:expr) => {
        app!($db, AppConfig::for_tests("sqlite::memory:"), ApprovingGateway)
    };
    ($db:expr, $config:expr, $gateway:expr) => {{
        let gateway: Arc<dyn PaymentGateway> = Arc::new($gateway);
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .app_data(web::Data::new($config))
                .app_data(web::Data::from(gateway))
                .configure(routes::configure_routes),
        )
        .await
    }};
}

/// Envoie la requête, renvoie (statut, corps JSON)
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

fn register_body(email: &str) -> Value {
    json!({
        "name": "Test User",
        "email": email,
        "password": "secret123",
        "phone": "0612345678",
        "address": "1 rue de la Paix",
        "answer": "blue"
    })
}

macro_rules! login {
    ($app:expr, $email:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/auth/register")
                .set_json(register_body($email))
        );
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/auth/login")
                .set_json(json!({ "email": $email, "password": "secret123" }))
        );
        assert_eq!(status, StatusCode::OK, "{}", body);
        (
            body["user"]["id"].as_i64().unwrap() as i32,
            body["token"].as_str().unwrap().to_string(),
        )
    }};
}

async fn promote(db: &DatabaseConnection, user_id: i32) {
    let user = users::Entity::find_by_id(user_id).one(db).await.unwrap().unwrap();
    let mut active: users::ActiveModel = user.into();
    active.role = Set(Role::Admin);
    active.update(db).await.unwrap();
}

fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

macro_rules! seed_catalog {
    ($app:expr, $admin:expr) => {{
        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/category/create-category")
                .insert_header(bearer(&$admin))
                .set_json(json!({ "name": "Books" }))
        );
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        let category_id = body["category"]["id"].as_i64().unwrap();

        let (status, body) = send!(
            $app,
            test::TestRequest::post()
                .uri("/api/v1/product/create-product")
                .insert_header(bearer(&$admin))
                .set_json(json!({
                    "name": "Rust Book",
                    "description": "Learn Rust",
                    "price": 10,
                    "category": category_id,
                    "quantity": 5,
                    "shipping": true
                }))
        );
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        (category_id, body["products"]["id"].as_i64().unwrap())
    }};
}

#[actix_web::test]
async fn test_health() {
    let db = memory_db().await;
    let app = app!(db);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/v1/health"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "up");
}

#[actix_web::test]
async fn test_duplicate_registration_is_reported() {
    let db = memory_db().await;
    let app = app!(db);

    let req = || {
        test::TestRequest::post()
            .uri("/api/v1/auth/register")
            .set_json(register_body("a@b.com"))
    };
    let (status, body) = send!(app, req());
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["user"].get("answer").is_none());

    let (status, body) = send!(app, req());
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Already Register please login");

    let count = users::Entity::find()
        .filter(users::Column::Email.eq("a@b.com"))
        .count(&db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[actix_web::test]
async fn test_login_messages_stay_distinct() {
    let db = memory_db().await;
    let app = app!(db);
    login!(app, "a@b.com");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "a@b.com", "password": "wrong-one" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid Password");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "never@b.com", "password": "secret123" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Email is not registerd");
}

#[actix_web::test]
async fn test_session_and_role_checks() {
    let db = memory_db().await;
    let app = app!(db);
    let (_, token) = login!(app, "customer@b.com");

    let (status, _) = send!(app, test::TestRequest::get().uri("/api/v1/auth/user-auth"));
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // token brut, sans "Bearer "
    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/user-auth")
            .insert_header(("Authorization", token.clone()))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/all-orders")
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "UnAuthorized Access");

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/admin-auth")
            .insert_header(bearer("not-a-jwt"))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_category_in_use_cannot_be_deleted() {
    let db = memory_db().await;
    let app = app!(db);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    let (category_id, _) = seed_catalog!(app, admin);

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/category/delete-category/{}", category_id))
            .insert_header(bearer(&admin))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["message"],
        "Error while deleting category, category belongs to existing product"
    );

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/v1/category/single-category/books")
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["id"], category_id);
}

#[actix_web::test]
async fn test_checkout_then_admin_ships_the_order() {
    let db = memory_db().await;
    let app = app!(db);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    let (_, product_id) = seed_catalog!(app, admin);
    let (_, customer) = login!(app, "customer@b.com");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/product/braintree/token")
            .insert_header(bearer(&customer))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientToken"], "client-token-123");

    // le prix envoyé par le client est ignoré
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/product/braintree/payment")
            .insert_header(bearer(&customer))
            .set_json(json!({ "nonce": "fake-valid-nonce", "cart": [{ "_id": product_id, "price": 1 }] }))
    );
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["ok"], true);
    assert_eq!(body["order"]["status"], "Not Process");
    assert_eq!(body["order"]["payment"]["transaction"]["amount"].as_f64(), Some(10.0));
    let order_id = body["order"]["id"].as_i64().unwrap();

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/orders")
            .insert_header(bearer(&customer))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["products"][0]["name"], "Rust Book");
    assert_eq!(body[0]["buyer"]["email"], "customer@b.com");

    for status_name in ["Not Processed", "Shipped"] {
        let (status, body) = send!(
            app,
            test::TestRequest::put()
                .uri(&format!("/api/v1/auth/order-status/{}", order_id))
                .insert_header(bearer(&admin))
                .set_json(json!({ "status": status_name }))
        );
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["status"], status_name);
    }

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/all-orders")
            .insert_header(bearer(&admin))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], order_id);
    assert_eq!(body[0]["status"], "Shipped");
}

#[actix_web::test]
async fn test_order_status_rejections() {
    let db = memory_db().await;
    let app = app!(db);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/v1/auth/order-status/1")
            .insert_header(bearer(&admin))
            .set_json(json!({ "status": "Lost in transit" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid order status");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/v1/auth/order-status/999")
            .insert_header(bearer(&admin))
            .set_json(json!({ "status": "Shipped" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Order not found");
}

#[actix_web::test]
async fn test_declined_payment_writes_no_order() {
    let db = memory_db().await;
    let app = app!(db, AppConfig::for_tests("sqlite::memory:"), DecliningGateway);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    let (_, product_id) = seed_catalog!(app, admin);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/product/braintree/payment")
            .insert_header(bearer(&admin))
            .set_json(json!({ "nonce": "fake-nonce", "cart": [{ "_id": product_id }] }))
    );
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Payment failed");

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/all-orders")
            .insert_header(bearer(&admin))
    );
    assert!(body.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_delete_policy_protects_ordered_products() {
    let db = memory_db().await;
    let mut config = AppConfig::for_tests("sqlite::memory:");
    config.product_delete_policy = ProductDeletePolicy::RejectIfOrdered;
    let app = app!(db, config, ApprovingGateway);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    let (_, product_id) = seed_catalog!(app, admin);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/product/braintree/payment")
            .insert_header(bearer(&admin))
            .set_json(json!({ "nonce": "n", "cart": [{ "_id": product_id }] }))
    );
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/v1/product/delete-product/{}", product_id))
            .insert_header(bearer(&admin))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product is referenced by existing orders");

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/v1/product/product-count"));
    assert_eq!(body["total"], 1);
}

#[actix_web::test]
async fn test_catalog_reads() {
    let db = memory_db().await;
    let app = app!(db);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    seed_catalog!(app, admin);

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/v1/product/get-product"));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["countTotal"], 1);
    assert_eq!(body["products"][0]["category"]["slug"], "books");

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/v1/product/search/RUST"));
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/v1/product/product-list/0"));
    assert_eq!(body["products"].as_array().unwrap().len(), 1);

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/v1/product/get-product/missing")
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_product_photo_is_served_raw() {
    use base64::{Engine, engine::general_purpose::STANDARD};

    let db = memory_db().await;
    let app = app!(db);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    let (category_id, _) = seed_catalog!(app, admin);

    let bytes = b"\x89PNG\r\n\x1a\nfake".to_vec();
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/product/create-product")
            .insert_header(bearer(&admin))
            .set_json(json!({
                "name": "Poster",
                "description": "Wall poster",
                "price": "12.50",
                "category": category_id,
                "quantity": "3",
                "photo": { "data": STANDARD.encode(&bytes), "contentType": "image/png" }
            }))
    );
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let product_id = body["products"]["id"].as_i64().unwrap();
    assert!(body["products"].get("photo").is_none());

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/api/v1/product/product-photo/{}", product_id))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(test::read_body(resp).await.to_vec(), bytes);

    // produit sans photo
    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/product/product-photo/{}", product_id + 100))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[actix_web::test]
async fn test_profile_update_and_password_reset() {
    let db = memory_db().await;
    let app = app!(db);
    let (_, token) = login!(app, "a@b.com");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/v1/auth/profile")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": "Renamed", "email": "other@b.com", "password": "" }))
    );
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Profile Updated Successfully");
    assert_eq!(body["updatedUser"]["name"], "Renamed");
    assert_eq!(body["updatedUser"]["email"], "a@b.com");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/v1/auth/profile")
            .insert_header(bearer(&token))
            .set_json(json!({ "password": "abc" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Password must be at least 6 characters long");

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/v1/auth/profile")
            .set_json(json!({ "name": "Nobody" }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/forgot-password")
            .set_json(json!({ "email": "a@b.com", "answer": "red", "newPassword": "fresh123" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Wrong Email Or Answer");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/forgot-password")
            .set_json(json!({ "email": "a@b.com", "answer": "blue", "newPassword": "fresh123" }))
    );
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Password Reset Successfully");

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/auth/login")
            .set_json(json!({ "email": "a@b.com", "password": "fresh123" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[actix_web::test]
async fn test_category_create_duplicate_and_update() {
    let db = memory_db().await;
    let app = app!(db);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    let (category_id, _) = seed_catalog!(app, admin);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/category/create-category")
            .insert_header(bearer(&admin))
            .set_json(json!({ "name": "Books" }))
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Category Already Exists");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/v1/category/update-category/{}", category_id))
            .insert_header(bearer(&admin))
            .set_json(json!({ "name": "Rare Books" }))
    );
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["category"]["slug"], "rare-books");

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri("/api/v1/category/single-category/rare-books")
    );
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category"]["name"], "Rare Books");

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/v1/category/update-category/9999")
            .insert_header(bearer(&admin))
            .set_json(json!({ "name": "Ghost" }))
    );
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/category/create-category")
            .insert_header(bearer(&admin))
            .set_json(json!({ "name": "日本" }))
    );
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/v1/category/get-category"));
    assert_eq!(body["category"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn test_customers_cannot_write_catalog() {
    let db = memory_db().await;
    let app = app!(db);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    let (category_id, product_id) = seed_catalog!(app, admin);
    let (_, customer) = login!(app, "customer@b.com");

    let requests = vec![
        test::TestRequest::post()
            .uri("/api/v1/category/create-category")
            .set_json(json!({ "name": "Toys" })),
        test::TestRequest::put()
            .uri(&format!("/api/v1/category/update-category/{}", category_id))
            .set_json(json!({ "name": "Toys" })),
        test::TestRequest::delete().uri(&format!("/api/v1/category/delete-category/{}", category_id)),
        test::TestRequest::post()
            .uri("/api/v1/product/create-product")
            .set_json(json!({ "name": "Ball" })),
        test::TestRequest::delete().uri(&format!("/api/v1/product/delete-product/{}", product_id)),
    ];
    for req in requests {
        let (status, body) = send!(app, req.insert_header(bearer(&customer)));
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);
        assert_eq!(body["message"], "UnAuthorized Access");
    }

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/v1/product/product-count"));
    assert_eq!(body["total"], 1);
}

#[actix_web::test]
async fn test_token_of_deleted_user_is_refused() {
    let db = memory_db().await;
    let app = app!(db);
    let (admin_id, admin) = login!(app, "admin@b.com");
    promote(&db, admin_id).await;
    let (_, product_id) = seed_catalog!(app, admin);
    let (user_id, token) = login!(app, "leaving@b.com");

    users::Entity::delete_by_id(user_id).exec(&db).await.unwrap();

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/admin-auth")
            .insert_header(bearer(&token))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/v1/product/braintree/payment")
            .insert_header(bearer(&token))
            .set_json(json!({ "nonce": "n", "cart": [{ "_id": product_id }] }))
    );
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/v1/auth/all-orders")
            .insert_header(bearer(&admin))
    );
    assert!(body.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_huge_page_number_is_an_empty_page() {
    let db = memory_db().await;
    let app = app!(db);

    let (status, body) = send!(
        app,
        test::TestRequest::get().uri(&format!("/api/v1/product/product-list/{}", i64::MAX))
    );
    assert_eq!(status, StatusCode::OK);
    assert!(body["products"].as_array().unwrap().is_empty());
}
