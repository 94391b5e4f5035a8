use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::CenterId).big_integer().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建任务表
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tasks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Tasks::Title).string().not_null())
                    .col(ColumnDef::new(Tasks::Description).text().not_null())
                    .col(ColumnDef::new(Tasks::Deadline).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::CreatedBy).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::AttachmentStorageId).string().null())
                    .col(ColumnDef::new(Tasks::AttachmentUrl).string().null())
                    .col(ColumnDef::new(Tasks::AttachmentName).string().null())
                    .col(ColumnDef::new(Tasks::AttachmentSize).big_integer().null())
                    .col(ColumnDef::new(Tasks::AttachmentMimeType).string().null())
                    .col(ColumnDef::new(Tasks::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Tasks::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Tasks::Table, Tasks::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建提交表
        manager
            .create_table(
                Table::create()
                    .table(Submissions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Submissions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Submissions::TaskId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Submissions::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::FileUrl).string().not_null())
                    .col(ColumnDef::new(Submissions::FileName).string().not_null())
                    .col(ColumnDef::new(Submissions::OriginalName).string().not_null())
                    .col(
                        ColumnDef::new(Submissions::StorageFileId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::FileSize).big_integer().not_null())
                    .col(ColumnDef::new(Submissions::MimeType).string().not_null())
                    .col(ColumnDef::new(Submissions::Score).double().null())
                    .col(
                        ColumnDef::new(Submissions::Feedback)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Submissions::IsGraded)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Submissions::SubmittedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Submissions::GradedAt).big_integer().null())
                    .col(ColumnDef::new(Submissions::GradedBy).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::TaskId)
                            .to(Tasks::Table, Tasks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Submissions::Table, Submissions::GradedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 每个学生对每个任务只能有一条提交
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_submissions_task_student")
                    .table(Submissions::Table)
                    .col(Submissions::TaskId)
                    .col(Submissions::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submissions_task_submitted_at")
                    .table(Submissions::Table)
                    .col(Submissions::TaskId)
                    .col(Submissions::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_submissions_student_submitted_at")
                    .table(Submissions::Table)
                    .col(Submissions::StudentId)
                    .col(Submissions::SubmittedAt)
                    .to_owned(),
            )
            .await?;

        // 任务表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_created_by_created_at")
                    .table(Tasks::Table)
                    .col(Tasks::CreatedBy)
                    .col(Tasks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tasks_deadline")
                    .table(Tasks::Table)
                    .col(Tasks::Deadline)
                    .to_owned(),
            )
            .await?;

        // 用户表索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Submissions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    FullName,
    Email,
    PasswordHash,
    Role,
    Status,
    CenterId,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tasks {
    #[sea_orm(iden = "tasks")]
    Table,
    Id,
    Title,
    Description,
    Deadline,
    CreatedBy,
    AttachmentStorageId,
    AttachmentUrl,
    AttachmentName,
    AttachmentSize,
    AttachmentMimeType,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Submissions {
    #[sea_orm(iden = "submissions")]
    Table,
    Id,
    TaskId,
    StudentId,
    FileUrl,
    FileName,
    OriginalName,
    StorageFileId,
    FileSize,
    MimeType,
    Score,
    Feedback,
    IsGraded,
    SubmittedAt,
    GradedAt,
    GradedBy,
}
