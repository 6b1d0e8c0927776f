use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::config::AppConfig;
use crate::error::{AppError, WithMessage};
use crate::middleware::{AdminUser, AuthUser};
use crate::models::dto::{PaymentRequest, ProductFilterRequest, ProductForm};
use crate::services::order_service::OrderService;
use crate::services::payment::PaymentGateway;
use crate::services::product_service::ProductService;

// ---------------------------------------------------------------- écriture (ADMIN)

#[post("/create-product")]
pub async fn create_product(
    _admin: AdminUser,
    body: web::Json<ProductForm>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let product = ProductService::create(db.get_ref(), body.into_inner())
        .await
        .with_message("Error in creating product")?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Product Created Successfully",
        "products": product,
    })))
}

#[put("/update-product/{id}")]
pub async fn update_product(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<ProductForm>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let product = ProductService::update(db.get_ref(), path.into_inner(), body.into_inner())
        .await
        .with_message("Error in Update product")?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Product Updated Successfully",
        "products": product,
    })))
}

#[delete("/delete-product/{id}")]
pub async fn delete_product(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, AppError> {
    ProductService::delete(db.get_ref(), path.into_inner(), config.product_delete_policy)
        .await
        .with_message("Error while deleting product")?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Product Deleted successfully",
    })))
}

// ---------------------------------------------------------------- lecture (PUBLIC)

#[get("/get-product")]
pub async fn get_products(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let products = ProductService::latest(db.get_ref())
        .await
        .with_message("Error in getting products")?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "countTotal": products.len(),
        "message": "All Products",
        "products": products,
    })))
}

#[get("/get-product/{slug}")]
pub async fn get_product(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let product = ProductService::find_by_slug(db.get_ref(), &path)
        .await
        .with_message("Error while getting single product")?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Single Product Fetched",
        "product": product,
    })))
}

/// Octets bruts de la photo avec leur content-type
#[get("/product-photo/{id}")]
pub async fn product_photo(
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let photo = ProductService::photo(db.get_ref(), path.into_inner())
        .await
        .with_message("Error while getting photo")?
        .ok_or_else(|| AppError::NotFound("Photo not found".to_string()))?;

    Ok(HttpResponse::Ok()
        .content_type(photo.content_type)
        .body(photo.data))
}

#[get("/product-count")]
pub async fn product_count(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let total = ProductService::count(db.get_ref())
        .await
        .with_message("Error in product count")?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "total": total })))
}

#[get("/product-list/{page}")]
pub async fn product_list(
    path: web::Path<i64>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let page = path.into_inner().max(1) as u64;
    let products = ProductService::page(db.get_ref(), page)
        .await
        .with_message("error in per page ctrl")?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "products": products })))
}

#[get("/search/{keyword}")]
pub async fn search_products(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let results = ProductService::search(db.get_ref(), &path)
        .await
        .with_message("Error In Search Product API")?;

    Ok(HttpResponse::Ok().json(results))
}

#[get("/product-category/{slug}")]
pub async fn product_category(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let (category, products) = ProductService::by_category_slug(db.get_ref(), &path)
        .await
        .with_message("Error While Getting products")?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "category": category,
        "products": products,
    })))
}

#[post("/product-filters")]
pub async fn product_filters(
    body: web::Json<ProductFilterRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let products = ProductService::filter(db.get_ref(), &body.checked, &body.radio)
        .await
        .with_message("Error While Filtering Products")?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "products": products })))
}

#[get("/related-product/{pid}/{cid}")]
pub async fn related_products(
    path: web::Path<(i32, i32)>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let (product_id, category_id) = path.into_inner();
    let products = ProductService::related(db.get_ref(), product_id, category_id)
        .await
        .with_message("error while getting related product")?;

    Ok(HttpResponse::Ok().json(json!({ "success": true, "products": products })))
}

// ---------------------------------------------------------------- paiement (PROTÉGÉ)

#[get("/braintree/token")]
pub async fn braintree_token(
    _auth: AuthUser,
    gateway: web::Data<dyn PaymentGateway>,
) -> Result<HttpResponse, AppError> {
    let client_token = gateway
        .generate_client_token()
        .await
        .map_err(|e| AppError::internal("Error while generating payment token", e))?;

    Ok(HttpResponse::Ok().json(json!({ "clientToken": client_token })))
}

/// Le montant est recalculé côté serveur, les prix du panier sont ignorés
#[post("/braintree/payment")]
pub async fn braintree_payment(
    auth: AuthUser,
    body: web::Json<PaymentRequest>,
    db: web::Data<DatabaseConnection>,
    gateway: web::Data<dyn PaymentGateway>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let order = OrderService::place_order(
        db.get_ref(),
        gateway.get_ref(),
        auth.user_id,
        &request.cart,
        &request.nonce,
    )
    .await?;

    Ok(HttpResponse::Ok().json(json!({ "ok": true, "order": order })))
}

pub fn product_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/product")
            .service(create_product)
            .service(update_product)
            .service(delete_product)
            .service(get_products)
            .service(get_product)
            .service(product_photo)
            .service(product_count)
            .service(product_list)
            .service(search_products)
            .service(product_category)
            .service(product_filters)
            .service(related_products)
            .service(braintree_token)
            .service(braintree_payment),
    );
}
