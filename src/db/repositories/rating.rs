use crate::entities::{prelude::*, rating};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatingInput {
    pub moodys_rating: String,
    pub sand_p_rating: String,
    pub fitch_rating: String,
    pub order_number: i32,
}

impl RatingInput {
    fn apply(self, active: &mut rating::ActiveModel) {
        active.moodys_rating = Set(self.moodys_rating);
        active.sand_p_rating = Set(self.sand_p_rating);
        active.fitch_rating = Set(self.fitch_rating);
        active.order_number = Set(self.order_number);
    }
}

pub struct RatingRepository {
    conn: DatabaseConnection,
}

impl RatingRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<rating::Model>> {
        Ok(Rating::find()
            .order_by_asc(rating::Column::OrderNumber)
            .order_by_asc(rating::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<rating::Model>> {
        Ok(Rating::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Rating::find().count(&self.conn).await?)
    }

    pub async fn create(&self, input: RatingInput) -> Result<rating::Model> {
        let mut active = <rating::ActiveModel as Default>::default();
        input.apply(&mut active);

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn update(&self, id: i32, input: RatingInput) -> Result<Option<rating::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: rating::ActiveModel = existing.into();
        input.apply(&mut active);

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = Rating::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
