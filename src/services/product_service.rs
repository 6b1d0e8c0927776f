use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, Func, LikeExpr, OnConflict};
use sea_orm::*;

use crate::config::ProductDeletePolicy;
use crate::error::AppError;
use crate::models::dto::{PhotoUpload, ProductForm, ProductView};
use crate::models::{categories, order_items, product_photos, products};
use crate::utils::slug::slugify;
use crate::utils::validation::{self, required};

pub const LATEST_LIMIT: u64 = 12;
pub const PER_PAGE: u64 = 6;
pub const RELATED_LIMIT: u64 = 3;

pub struct ProductService;

/// Photo validée, prête à être stockée
struct PhotoBlob {
    data: Vec<u8>,
    content_type: String,
}

fn invalid(message: String) -> AppError {
    AppError::Validation(message)
}

fn check_photo(photo: &Option<PhotoUpload>) -> Result<Option<PhotoBlob>, AppError> {
    match photo {
        None => Ok(None),
        Some(upload) => {
            let data =
                validation::decode_photo(&upload.data, &upload.content_type).map_err(invalid)?;
            Ok(Some(PhotoBlob {
                data,
                content_type: upload.content_type.trim().to_ascii_lowercase(),
            }))
        }
    }
}

async fn ensure_category<C: ConnectionTrait>(db: &C, category_id: i32) -> Result<(), AppError> {
    let exists = categories::Entity::find_by_id(category_id).one(db).await?;
    match exists {
        Some(_) => Ok(()),
        None => Err(invalid("Category not found".to_string())),
    }
}

async fn save_photo<C: ConnectionTrait>(
    db: &C,
    product_id: i32,
    photo: PhotoBlob,
) -> Result<(), AppError> {
    let model = product_photos::ActiveModel {
        product_id: Set(product_id),
        data: Set(photo.data),
        content_type: Set(photo.content_type),
    };

    product_photos::Entity::insert(model)
        .on_conflict(
            OnConflict::column(product_photos::Column::ProductId)
                .update_columns([
                    product_photos::Column::Data,
                    product_photos::Column::ContentType,
                ])
                .to_owned(),
        )
        .exec(db)
        .await?;
    Ok(())
}

/// Produits avec leur catégorie, les plus récents d'abord
fn with_category() -> SelectTwo<products::Entity, categories::Entity> {
    products::Entity::find()
        .find_also_related(categories::Entity)
        .order_by_desc(products::Column::CreatedAt)
        .order_by_desc(products::Column::Id)
}

fn escape_like(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len());
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

impl ProductService {
    /// Création: tous les champs sont obligatoires sauf photo et shipping
    pub async fn create(db: &DatabaseConnection, form: ProductForm) -> Result<ProductView, AppError> {
        let name = required(form.name.as_deref(), "Name is Required").map_err(invalid)?;
        validation::ensure_sluggable(name).map_err(invalid)?;
        let description =
            required(form.description.as_deref(), "Description is Required").map_err(invalid)?;
        let price = validation::parse_price(form.price.as_ref()).map_err(invalid)?;
        let category_id = form
            .category
            .ok_or_else(|| invalid("Category is Required".to_string()))?;
        let quantity = validation::parse_quantity(form.quantity.as_ref()).map_err(invalid)?;
        let photo = check_photo(&form.photo)?;

        let txn = db.begin().await?;
        ensure_category(&txn, category_id).await?;

        let now = Utc::now();
        let product = products::ActiveModel {
            name: Set(name.trim().to_string()),
            slug: Set(slugify(name)),
            description: Set(description.trim().to_string()),
            price: Set(price),
            quantity: Set(quantity),
            category_id: Set(category_id),
            shipping: Set(form.shipping),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if let Some(photo) = photo {
            save_photo(&txn, product.id, photo).await?;
        }

        let category = categories::Entity::find_by_id(category_id).one(&txn).await?;
        txn.commit().await?;

        tracing::info!(product_id = product.id, slug = %product.slug, "product created");
        Ok(ProductView { product, category })
    }

    /// Mise à jour partielle: les champs absents gardent leur valeur.
    /// Un champ présent passe par les mêmes règles qu'à la création.
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        form: ProductForm,
    ) -> Result<ProductView, AppError> {
        let photo = check_photo(&form.photo)?;

        let txn = db.begin().await?;
        let product = products::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let mut active: products::ActiveModel = product.into();

        if form.name.is_some() {
            let name = required(form.name.as_deref(), "Name is Required").map_err(invalid)?;
            validation::ensure_sluggable(name).map_err(invalid)?;
            active.name = Set(name.trim().to_string());
            active.slug = Set(slugify(name));
        }
        if form.description.is_some() {
            let description = required(form.description.as_deref(), "Description is Required")
                .map_err(invalid)?;
            active.description = Set(description.trim().to_string());
        }
        if form.price.is_some() {
            active.price = Set(validation::parse_price(form.price.as_ref()).map_err(invalid)?);
        }
        if form.quantity.is_some() {
            active.quantity =
                Set(validation::parse_quantity(form.quantity.as_ref()).map_err(invalid)?);
        }
        if let Some(category_id) = form.category {
            ensure_category(&txn, category_id).await?;
            active.category_id = Set(category_id);
        }
        if form.shipping.is_some() {
            active.shipping = Set(form.shipping);
        }
        active.updated_at = Set(Utc::now());

        let product = active.update(&txn).await?;
        if let Some(photo) = photo {
            save_photo(&txn, product.id, photo).await?;
        }

        let category = categories::Entity::find_by_id(product.category_id)
            .one(&txn)
            .await?;
        txn.commit().await?;

        Ok(ProductView { product, category })
    }

    /// Suppression. Avec `Unconditional` les commandes gardent une
    /// référence orpheline, ignorée à la lecture.
    pub async fn delete(
        db: &DatabaseConnection,
        id: i32,
        policy: ProductDeletePolicy,
    ) -> Result<(), AppError> {
        let txn = db.begin().await?;

        let product = products::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        if policy == ProductDeletePolicy::RejectIfOrdered {
            let ordered = order_items::Entity::find()
                .filter(order_items::Column::ProductId.eq(product.id))
                .count(&txn)
                .await?;
            if ordered > 0 {
                tracing::warn!(product_id = id, ordered, "refusing to delete ordered product");
                return Err(AppError::Conflict(
                    "Product is referenced by existing orders".to_string(),
                ));
            }
        }

        product_photos::Entity::delete_by_id(product.id).exec(&txn).await?;
        products::Entity::delete_by_id(product.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(product_id = id, "product deleted");
        Ok(())
    }

    pub async fn latest(db: &DatabaseConnection) -> Result<Vec<ProductView>, AppError> {
        let rows = with_category().limit(LATEST_LIMIT).all(db).await?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }

    pub async fn find_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<Option<ProductView>, AppError> {
        let row = products::Entity::find()
            .find_also_related(categories::Entity)
            .filter(products::Column::Slug.eq(slug))
            .order_by_asc(products::Column::Id)
            .one(db)
            .await?;
        Ok(row.map(ProductView::from))
    }

    pub async fn photo(
        db: &DatabaseConnection,
        product_id: i32,
    ) -> Result<Option<product_photos::Model>, AppError> {
        Ok(product_photos::Entity::find_by_id(product_id).one(db).await?)
    }

    pub async fn count(db: &DatabaseConnection) -> Result<u64, AppError> {
        Ok(products::Entity::find().count(db).await?)
    }

    /// Page de 6 produits, la page 1 est la plus récente.
    /// Une page hors de portée est simplement vide.
    pub async fn page(db: &DatabaseConnection, page: u64) -> Result<Vec<ProductView>, AppError> {
        let offset = page
            .max(1)
            .checked_sub(1)
            .and_then(|p| p.checked_mul(PER_PAGE))
            .filter(|offset| *offset <= i64::MAX as u64);
        let Some(offset) = offset else {
            return Ok(Vec::new());
        };
        let rows = with_category()
            .offset(offset)
            .limit(PER_PAGE)
            .all(db)
            .await?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }

    /// Recherche insensible à la casse dans le nom ou la description
    pub async fn search(
        db: &DatabaseConnection,
        keyword: &str,
    ) -> Result<Vec<products::Model>, AppError> {
        let pattern = format!("%{}%", escape_like(&keyword.trim().to_lowercase()));

        let matches = Condition::any()
            .add(
                Expr::expr(Func::lower(Expr::col(products::Column::Name)))
                    .like(LikeExpr::new(pattern.clone()).escape('\\')),
            )
            .add(
                Expr::expr(Func::lower(Expr::col(products::Column::Description)))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );

        Ok(products::Entity::find()
            .filter(matches)
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .all(db)
            .await?)
    }

    /// Produits d'une catégorie désignée par son slug
    pub async fn by_category_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<(categories::Model, Vec<ProductView>), AppError> {
        let category = categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .order_by_asc(categories::Column::Id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let rows = with_category()
            .filter(products::Column::CategoryId.eq(category.id))
            .all(db)
            .await?;

        Ok((category, rows.into_iter().map(ProductView::from).collect()))
    }

    /// Filtres de la page d'accueil: catégories cochées et fourchette de prix
    pub async fn filter(
        db: &DatabaseConnection,
        category_ids: &[i32],
        price_range: &[Decimal],
    ) -> Result<Vec<products::Model>, AppError> {
        let mut query = products::Entity::find();

        if !category_ids.is_empty() {
            query = query.filter(products::Column::CategoryId.is_in(category_ids.to_vec()));
        }
        if let [min, max, ..] = price_range {
            query = query.filter(products::Column::Price.between(*min, *max));
        }

        Ok(query
            .order_by_desc(products::Column::CreatedAt)
            .order_by_desc(products::Column::Id)
            .all(db)
            .await?)
    }

    /// Jusqu'à 3 autres produits de la même catégorie
    pub async fn related(
        db: &DatabaseConnection,
        product_id: i32,
        category_id: i32,
    ) -> Result<Vec<ProductView>, AppError> {
        let rows = with_category()
            .filter(products::Column::CategoryId.eq(category_id))
            .filter(products::Column::Id.ne(product_id))
            .limit(RELATED_LIMIT)
            .all(db)
            .await?;
        Ok(rows.into_iter().map(ProductView::from).collect())
    }
}
