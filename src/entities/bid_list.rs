use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "bid_list")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub account: String,
    pub bid_type: String,
    pub bid_quantity: f64,
    pub ask_quantity: Option<f64>,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub benchmark: Option<String>,
    pub commentary: Option<String>,
    pub trader: Option<String>,
    pub book: Option<String>,
    pub side: Option<String>,
    pub creation_date: String,
    pub revision_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
