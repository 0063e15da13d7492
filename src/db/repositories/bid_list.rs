use crate::entities::{bid_list, prelude::*};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};

/// Validated bid list fields, as accepted from the add/update forms.
#[derive(Debug, Clone, PartialEq)]
pub struct BidListInput {
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
}

impl BidListInput {
    fn apply(self, active: &mut bid_list::ActiveModel) {
        active.account = Set(self.account);
        active.bid_type = Set(self.bid_type);
        active.bid_quantity = Set(self.bid_quantity);
        active.ask_quantity = Set(self.ask_quantity);
        active.bid = Set(self.bid);
        active.ask = Set(self.ask);
        active.benchmark = Set(self.benchmark);
        active.commentary = Set(self.commentary);
        active.trader = Set(self.trader);
        active.book = Set(self.book);
        active.side = Set(self.side);
    }
}

pub struct BidListRepository {
    conn: DatabaseConnection,
}

impl BidListRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<bid_list::Model>> {
        Ok(BidList::find()
            .order_by_asc(bid_list::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<bid_list::Model>> {
        Ok(BidList::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(BidList::find().count(&self.conn).await?)
    }

    pub async fn create(&self, input: BidListInput) -> Result<bid_list::Model> {
        let mut active = bid_list::ActiveModel {
            creation_date: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        input.apply(&mut active);

        Ok(active.insert(&self.conn).await?)
    }

    /// Returns `None` when no row has this id.
    pub async fn update(&self, id: i32, input: BidListInput) -> Result<Option<bid_list::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: bid_list::ActiveModel = existing.into();
        input.apply(&mut active);
        active.revision_date = Set(Some(chrono::Utc::now().to_rfc3339()));

        Ok(Some(active.update(&self.conn).await?))
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = BidList::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
