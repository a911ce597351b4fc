//! Administrator entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Administrator.
impl From<Model> for quillpress_core::domain::Administrator {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        }
    }
}

/// Conversion from Domain Administrator to SeaORM ActiveModel.
impl From<quillpress_core::domain::Administrator> for ActiveModel {
    fn from(value: quillpress_core::domain::Administrator) -> Self {
        Self {
            id: Set(value.id),
            name: Set(value.name),
            email: Set(value.email),
            password_hash: Set(value.password_hash),
            created_at: Set(value.created_at.into()),
            updated_at: Set(value.updated_at.into()),
        }
    }
}
