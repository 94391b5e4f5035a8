use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 教育中心
        manager
            .create_table(
                Table::create()
                    .table(Centers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Centers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Centers::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Centers::Description).text().null())
                    .col(ColumnDef::new(Centers::Address).string().null())
                    .col(ColumnDef::new(Centers::Phone).string().null())
                    .col(ColumnDef::new(Centers::Email).string().null().unique_key())
                    .col(ColumnDef::new(Centers::Website).string().null())
                    .col(ColumnDef::new(Centers::AdminId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Centers::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Centers::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Centers::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Centers::Table, Centers::AdminId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 学习小组
        manager
            .create_table(
                Table::create()
                    .table(StudyGroups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StudyGroups::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StudyGroups::Name).string().not_null())
                    .col(ColumnDef::new(StudyGroups::Description).text().null())
                    .col(ColumnDef::new(StudyGroups::CenterId).big_integer().null())
                    .col(ColumnDef::new(StudyGroups::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(StudyGroups::Subject).string().null())
                    .col(
                        ColumnDef::new(StudyGroups::MaxStudents)
                            .integer()
                            .not_null()
                            .default(15),
                    )
                    .col(
                        ColumnDef::new(StudyGroups::CurrentStudents)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(StudyGroups::Schedule).string().null())
                    .col(
                        ColumnDef::new(StudyGroups::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(StudyGroups::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(StudyGroups::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudyGroups::Table, StudyGroups::CenterId)
                            .to(Centers::Table, Centers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(StudyGroups::Table, StudyGroups::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 小组成员
        manager
            .create_table(
                Table::create()
                    .table(GroupStudents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroupStudents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroupStudents::GroupId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GroupStudents::StudentId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GroupStudents::JoinedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupStudents::Table, GroupStudents::GroupId)
                            .to(StudyGroups::Table, StudyGroups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(GroupStudents::Table, GroupStudents::StudentId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 同一学生在同一小组只出现一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_group_students_group_student")
                    .table(GroupStudents::Table)
                    .col(GroupStudents::GroupId)
                    .col(GroupStudents::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_study_groups_center")
                    .table(StudyGroups::Table)
                    .col(StudyGroups::CenterId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_study_groups_teacher")
                    .table(StudyGroups::Table)
                    .col(StudyGroups::TeacherId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(GroupStudents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StudyGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Centers::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Centers {
    #[sea_orm(iden = "centers")]
    Table,
    Id,
    Name,
    Description,
    Address,
    Phone,
    Email,
    Website,
    AdminId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum StudyGroups {
    #[sea_orm(iden = "study_groups")]
    Table,
    Id,
    Name,
    Description,
    CenterId,
    TeacherId,
    Subject,
    MaxStudents,
    CurrentStudents,
    Schedule,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GroupStudents {
    #[sea_orm(iden = "group_students")]
    Table,
    Id,
    GroupId,
    StudentId,
    JoinedAt,
}
