//! Media entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quillpress_core::domain::MediaCollection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Collection {
    #[sea_orm(string_value = "featured_image")]
    FeaturedImage,
    #[sea_orm(string_value = "gallery")]
    Gallery,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "media")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub post_id: Uuid,
    pub collection: Collection,
    pub file_name: String,
    pub mime_type: String,
    pub size: i64,
    pub storage_key: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::post::Entity",
        from = "Column::PostId",
        to = "super::post::Column::Id",
        on_delete = "Cascade"
    )]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<MediaCollection> for Collection {
    fn from(collection: MediaCollection) -> Self {
        match collection {
            MediaCollection::FeaturedImage => Collection::FeaturedImage,
            MediaCollection::Gallery => Collection::Gallery,
        }
    }
}

impl From<Collection> for MediaCollection {
    fn from(collection: Collection) -> Self {
        match collection {
            Collection::FeaturedImage => MediaCollection::FeaturedImage,
            Collection::Gallery => MediaCollection::Gallery,
        }
    }
}

impl From<Model> for quillpress_core::domain::Media {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            collection: model.collection.into(),
            file_name: model.file_name,
            mime_type: model.mime_type,
            size: model.size,
            storage_key: model.storage_key,
            created_at: model.created_at.into(),
        }
    }
}

impl From<quillpress_core::domain::Media> for ActiveModel {
    fn from(media: quillpress_core::domain::Media) -> Self {
        Self {
            id: Set(media.id),
            post_id: Set(media.post_id),
            collection: Set(media.collection.into()),
            file_name: Set(media.file_name),
            mime_type: Set(media.mime_type),
            size: Set(media.size),
            storage_key: Set(media.storage_key),
            created_at: Set(media.created_at.into()),
        }
    }
}
