use sea_orm::*;

use crate::error::AppError;
use crate::models::{categories, products};
use crate::utils::slug::slugify;
use crate::utils::validation;

pub const CATEGORY_IN_USE: &str =
    "Error while deleting category, category belongs to existing product";

pub struct CategoryService;

impl CategoryService {
    pub async fn list(db: &DatabaseConnection) -> Result<Vec<categories::Model>, AppError> {
        Ok(categories::Entity::find()
            .order_by_asc(categories::Column::Id)
            .all(db)
            .await?)
    }

    /// Plusieurs catégories peuvent partager un slug: on renvoie la plus ancienne
    pub async fn find_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<Option<categories::Model>, AppError> {
        Ok(categories::Entity::find()
            .filter(categories::Column::Slug.eq(slug))
            .order_by_asc(categories::Column::Id)
            .one(db)
            .await?)
    }

    /// Création. Un nom strictement identique court-circuite (pas de doublon),
    /// les variantes de casse ou d'espaces ne sont pas détectées.
    pub async fn create(
        db: &DatabaseConnection,
        name: Option<&str>,
    ) -> Result<categories::Model, AppError> {
        let name = validation::validate_category_name(name).map_err(AppError::Validation)?;

        let existing = categories::Entity::find()
            .filter(categories::Column::Name.eq(name.as_str()))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Rejected("Category Already Exists".to_string()));
        }

        let category = categories::ActiveModel {
            slug: Set(slugify(&name)),
            name: Set(name),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!(category_id = category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    /// Renommer re-dérive toujours le slug
    pub async fn update(
        db: &DatabaseConnection,
        id: i32,
        name: Option<&str>,
    ) -> Result<categories::Model, AppError> {
        let name = validation::validate_category_name(name).map_err(AppError::Validation)?;

        let category = categories::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let mut active: categories::ActiveModel = category.into();
        active.slug = Set(slugify(&name));
        active.name = Set(name);

        Ok(active.update(db).await?)
    }

    /// Suppression refusée tant qu'un produit référence la catégorie.
    /// Vérification et suppression dans la même transaction.
    pub async fn delete(db: &DatabaseConnection, id: i32) -> Result<(), AppError> {
        let txn = db.begin().await?;

        let category = categories::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

        let products_using = products::Entity::find()
            .filter(products::Column::CategoryId.eq(category.id))
            .count(&txn)
            .await?;
        if products_using > 0 {
            tracing::warn!(category_id = id, products_using, "refusing to delete category in use");
            return Err(AppError::Conflict(CATEGORY_IN_USE.to_string()));
        }

        categories::Entity::delete_by_id(category.id).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }
}
