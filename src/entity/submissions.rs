//! 提交实体

use sea_orm::entity::prelude::*;

use super::ts_to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub student_id: i64,
    pub file_url: String,
    pub file_name: String,
    pub original_name: String,
    pub storage_file_id: String,
    pub file_size: i64,
    pub mime_type: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub score: Option<f64>,
    #[sea_orm(column_type = "Text")]
    pub feedback: String,
    pub is_graded: bool,
    pub submitted_at: i64,
    pub graded_at: Option<i64>,
    pub graded_by: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id"
    )]
    Task,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::GradedBy",
        to = "super::users::Column::Id"
    )]
    Grader,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(self) -> crate::models::submissions::entities::Submission {
        use crate::models::submissions::entities::Submission;

        Submission {
            id: self.id,
            task_id: self.task_id,
            student_id: self.student_id,
            file_url: self.file_url,
            file_name: self.file_name,
            original_name: self.original_name,
            storage_file_id: self.storage_file_id,
            file_size: self.file_size,
            mime_type: self.mime_type,
            // 已评分与分数存在性保持一致
            is_graded: self.is_graded && self.score.is_some(),
            score: self.score,
            feedback: self.feedback,
            submitted_at: ts_to_datetime(self.submitted_at),
            graded_at: self.graded_at.map(ts_to_datetime),
            graded_by: self.graded_by,
        }
    }
}
