// ============================================================================
// MODÈLE : USERS
// ============================================================================
//
// Colonnes de la table users:
//   - id (SERIAL, PRIMARY KEY)
//   - name, email (UNIQUE), phone, address
//   - password_hash : pbkdf2:sha256:iterations$salt$hash (jamais en clair)
//   - answer : réponse secrète pour le reset de mot de passe
//   - role : 0 = client, 1 = admin
//   - created_at / updated_at
//
// Points d'attention:
//   - password_hash et answer ne sont jamais sérialisés en JSON
//   - email n'est plus modifiable après l'inscription
//
// ============================================================================

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(into = "i32", try_from = "i32")]
pub enum Role {
    #[default]
    #[sea_orm(num_value = 0)]
    Customer,
    #[sea_orm(num_value = 1)]
    Admin,
}

impl From<Role> for i32 {
    fn from(role: Role) -> i32 {
        match role {
            Role::Customer => 0,
            Role::Admin => 1,
        }
    }
}

impl TryFrom<i32> for Role {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Role::Customer),
            1 => Ok(Role::Admin),
            other => Err(format!("unknown role {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: String,
    #[sea_orm(column_type = "Text")]
    pub address: String,
    #[serde(skip_serializing)]
    pub answer: String,
    pub role: Role,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
