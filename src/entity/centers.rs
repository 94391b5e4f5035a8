//! 教育中心实体

use sea_orm::entity::prelude::*;

use super::ts_to_datetime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "centers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub website: Option<String>,
    pub admin_id: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::AdminId",
        to = "super::users::Column::Id"
    )]
    Admin,
    #[sea_orm(has_many = "super::groups::Entity")]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_center(self) -> crate::models::centers::entities::Center {
        crate::models::centers::entities::Center {
            id: self.id,
            name: self.name,
            description: self.description,
            address: self.address,
            phone: self.phone,
            email: self.email,
            website: self.website,
            admin_id: self.admin_id,
            is_active: self.is_active,
            created_at: ts_to_datetime(self.created_at),
            updated_at: ts_to_datetime(self.updated_at),
        }
    }
}
