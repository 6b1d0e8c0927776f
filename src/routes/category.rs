use actix_web::{HttpResponse, delete, get, post, put, web};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::error::{AppError, WithMessage};
use crate::middleware::AdminUser;
use crate::models::dto::CategoryRequest;
use crate::services::category_service::CategoryService;

/// POST /category/create-category (ADMIN)
#[post("/create-category")]
pub async fn create_category(
    _admin: AdminUser,
    body: web::Json<CategoryRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let category = CategoryService::create(db.get_ref(), body.name.as_deref())
        .await
        .with_message("Error in Category")?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "New category created",
        "category": category,
    })))
}

/// PUT /category/update-category/{id} (ADMIN)
#[put("/update-category/{id}")]
pub async fn update_category(
    _admin: AdminUser,
    path: web::Path<i32>,
    body: web::Json<CategoryRequest>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let category = CategoryService::update(db.get_ref(), path.into_inner(), body.name.as_deref())
        .await
        .with_message("Error while updating category")?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Category Updated Successfully",
        "category": category,
    })))
}

/// GET /category/get-category (PUBLIC)
#[get("/get-category")]
pub async fn get_categories(db: web::Data<DatabaseConnection>) -> Result<HttpResponse, AppError> {
    let categories = CategoryService::list(db.get_ref())
        .await
        .with_message("Error while getting all categories")?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "All Categories List",
        "category": categories,
    })))
}

/// GET /category/single-category/{slug} (PUBLIC)
#[get("/single-category/{slug}")]
pub async fn single_category(
    path: web::Path<String>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let category = CategoryService::find_by_slug(db.get_ref(), &path)
        .await
        .with_message("Error While getting Single Category")?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Get Single Category Successfully",
        "category": category,
    })))
}

/// DELETE /category/delete-category/{id} (ADMIN)
#[delete("/delete-category/{id}")]
pub async fn delete_category(
    _admin: AdminUser,
    path: web::Path<i32>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    CategoryService::delete(db.get_ref(), path.into_inner())
        .await
        .with_message("Error while deleting category")?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Category Deleted Successfully",
    })))
}

pub fn category_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/category")
            .service(create_category)
            .service(update_category)
            .service(get_categories)
            .service(single_category)
            .service(delete_category),
    );
}
