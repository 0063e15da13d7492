use crate::entities::{prelude::*, trade};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};

#[derive(Debug, Clone, PartialEq)]
pub struct TradeInput {
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
}

impl TradeInput {
    fn apply(self, active: &mut trade::ActiveModel) {
        active.account = Set(self.account);
        active.trade_type = Set(self.trade_type);
        active.buy_quantity = Set(self.buy_quantity);
        active.sell_quantity = Set(self.sell_quantity);
        active.buy_price = Set(self.buy_price);
        active.sell_price = Set(self.sell_price);
        active.benchmark = Set(self.benchmark);
        active.security = Set(self.security);
        active.status = Set(self.status);
        active.trader = Set(self.trader);
        active.book = Set(self.book);
        active.side = Set(self.side);
    }
}

pub struct TradeRepository {
    conn: DatabaseConnection,
}

impl TradeRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<trade::Model>> {
        Ok(Trade::find()
            .order_by_asc(trade::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<trade::Model>> {
        Ok(Trade::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Trade::find().count(&self.conn).await?)
    }

    pub async fn create(&self, input: TradeInput) -> Result<trade::Model> {
        let mut active = trade::ActiveModel {
            creation_date: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        input.apply(&mut active);

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn update(&self, id: i32, input: TradeInput) -> Result<Option<trade::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: trade::ActiveModel = existing.into();
        input.apply(&mut active);
        active.revision_date = Set(Some(chrono::Utc::now().to_rfc3339()));

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Trade::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
