// connexion BD + création du schéma

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

use crate::models::{categories, order_items, orders, product_photos, products, users};

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options.sqlx_logging(false);

    // SQLite en mémoire: une base par connexion, donc une seule connexion
    if database_url.starts_with("sqlite::memory:") {
        options.max_connections(1).min_connections(1);
    }

    Database::connect(options).await
}

/// Crée les tables manquantes à partir des entités (dans l'ordre des FK)
pub async fn create_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_table(db, users::Entity).await?;
    create_table(db, categories::Entity).await?;
    create_table(db, products::Entity).await?;
    create_table(db, product_photos::Entity).await?;
    create_table(db, orders::Entity).await?;
    create_table(db, order_items::Entity).await?;
    Ok(())
}

async fn create_table<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();

    tracing::debug!(table = entity.table_name(), "ensuring table exists");
    db.execute(backend.build(&statement)).await?;
    Ok(())
}
