use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "curve_point")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub curve_id: i32,
    pub as_of_date: Option<String>,
    pub term: f64,
    pub value: f64,
    pub creation_date: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
