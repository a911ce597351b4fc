//! Activity log entity for SeaORM.
//!
//! The causer is denormalized into three nullable columns so a deleted
//! account does not erase history.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use quillpress_core::domain::{Causer, PrincipalKind};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "activity_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub description: String,
    pub subject_id: Uuid,
    pub causer_id: Option<Uuid>,
    pub causer_kind: Option<String>,
    pub causer_name: Option<String>,
    pub properties: Json,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for quillpress_core::domain::Activity {
    fn from(model: Model) -> Self {
        let kind = model
            .causer_kind
            .as_deref()
            .and_then(|kind| kind.parse::<PrincipalKind>().ok());
        let causer = match (model.causer_id, kind) {
            (Some(id), Some(kind)) => Some(Causer {
                id,
                kind,
                name: model.causer_name.unwrap_or_default(),
            }),
            _ => None,
        };

        Self {
            id: model.id,
            description: model.description,
            subject_id: model.subject_id,
            causer,
            properties: model.properties,
            created_at: model.created_at.into(),
        }
    }
}

impl From<quillpress_core::domain::Activity> for ActiveModel {
    fn from(activity: quillpress_core::domain::Activity) -> Self {
        let (causer_id, causer_kind, causer_name) = match activity.causer {
            Some(causer) => (
                Some(causer.id),
                Some(causer.kind.as_str().to_string()),
                Some(causer.name),
            ),
            None => (None, None, None),
        };

        Self {
            id: Set(activity.id),
            description: Set(activity.description),
            subject_id: Set(activity.subject_id),
            causer_id: Set(causer_id),
            causer_kind: Set(causer_kind),
            causer_name: Set(causer_name),
            properties: Set(activity.properties),
            created_at: Set(activity.created_at.into()),
        }
    }
}
