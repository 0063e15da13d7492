use crate::entities::{curve_point, prelude::*};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};

#[derive(Debug, Clone, PartialEq)]
pub struct CurvePointInput {
    pub curve_id: i32,
    pub as_of_date: Option<String>,
    pub term: f64,
    pub value: f64,
}

impl CurvePointInput {
    fn apply(self, active: &mut curve_point::ActiveModel) {
        active.curve_id = Set(self.curve_id);
        active.as_of_date = Set(self.as_of_date);
        active.term = Set(self.term);
        active.value = Set(self.value);
    }
}

pub struct CurvePointRepository {
    conn: DatabaseConnection,
}

impl CurvePointRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<curve_point::Model>> {
        Ok(CurvePoint::find()
            .order_by_asc(curve_point::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<curve_point::Model>> {
        Ok(CurvePoint::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(CurvePoint::find().count(&self.conn).await?)
    }

    pub async fn create(&self, input: CurvePointInput) -> Result<curve_point::Model> {
        let mut active = curve_point::ActiveModel {
            creation_date: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };
        input.apply(&mut active);

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn update(
        &self,
        id: i32,
        input: CurvePointInput,
    ) -> Result<Option<curve_point::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: curve_point::ActiveModel = existing.into();
        input.apply(&mut active);

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = CurvePoint::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
