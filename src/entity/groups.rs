//! 学习小组实体

use sea_orm::entity::prelude::*;

use super::ts_to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "study_groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub center_id: Option<i64>,
    pub teacher_id: i64,
    pub subject: Option<String>,
    pub max_students: i32,
    pub current_students: i32,
    pub schedule: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::centers::Entity",
        from = "Column::CenterId",
        to = "super::centers::Column::Id"
    )]
    Center,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::TeacherId",
        to = "super::users::Column::Id"
    )]
    Teacher,
    #[sea_orm(has_many = "super::group_students::Entity")]
    Members,
}

impl Related<super::centers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Center.def()
    }
}

impl Related<super::group_students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_group(self) -> crate::models::groups::entities::Group {
        crate::models::groups::entities::Group {
            id: self.id,
            name: self.name,
            description: self.description,
            center_id: self.center_id,
            teacher_id: self.teacher_id,
            subject: self.subject,
            max_students: self.max_students,
            current_students: self.current_students,
            schedule: self.schedule,
            is_active: self.is_active,
            created_at: ts_to_datetime(self.created_at),
            updated_at: ts_to_datetime(self.updated_at),
        }
    }
}
