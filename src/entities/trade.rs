use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "trade")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub account: String,
    pub trade_type: String,
    pub buy_quantity: f64,
    pub sell_quantity: Option<f64>,
    pub buy_price: Option<f64>,
    pub sell_price: Option<f64>,
    pub benchmark: Option<String>,
    pub security: Option<String>,
    pub status: Option<String>,
    pub trader: Option<String>,
    pub book: Option<String>,
    pub side: Option<String>,
    pub creation_date: String,
    pub revision_date: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
