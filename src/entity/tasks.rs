//! 任务实体

use sea_orm::entity::prelude::*;

use super::ts_to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub deadline: i64,
    pub created_by: i64,
    pub attachment_storage_id: Option<String>,
    pub attachment_url: Option<String>,
    pub attachment_name: Option<String>,
    pub attachment_size: Option<i64>,
    pub attachment_mime_type: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::submissions::Entity")]
    Submissions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Creator.def()
    }
}

impl Related<super::submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_task(self) -> crate::models::tasks::entities::Task {
        use crate::models::tasks::entities::{Task, TaskAttachment};

        // 附件列要么全有要么全无
        let attachment = match (
            self.attachment_storage_id,
            self.attachment_url,
            self.attachment_name,
        ) {
            (Some(storage_file_id), Some(url), Some(name)) => Some(TaskAttachment {
                storage_file_id,
                url,
                name,
                size: self.attachment_size.unwrap_or_default(),
                mime_type: self.attachment_mime_type.unwrap_or_default(),
            }),
            _ => None,
        };

        Task {
            id: self.id,
            title: self.title,
            description: self.description,
            deadline: ts_to_datetime(self.deadline),
            created_by: self.created_by,
            attachment,
            created_at: ts_to_datetime(self.created_at),
            updated_at: ts_to_datetime(self.updated_at),
        }
    }
}
