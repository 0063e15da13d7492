use crate::entities::{prelude::*, rule_name};
use anyhow::Result;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryOrder, Set};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleNameInput {
    pub name: String,
    pub description: String,
    pub json: String,
    pub template: String,
    pub sql_str: String,
    pub sql_part: String,
}

impl RuleNameInput {
    fn apply(self, active: &mut rule_name::ActiveModel) {
        active.name = Set(self.name);
        active.description = Set(self.description);
        active.json = Set(self.json);
        active.template = Set(self.template);
        active.sql_str = Set(self.sql_str);
        active.sql_part = Set(self.sql_part);
    }
}

pub struct RuleNameRepository {
    conn: DatabaseConnection,
}

impl RuleNameRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<rule_name::Model>> {
        Ok(RuleName::find()
            .order_by_asc(rule_name::Column::Id)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, id: i32) -> Result<Option<rule_name::Model>> {
        Ok(RuleName::find_by_id(id).one(&self.conn).await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(RuleName::find().count(&self.conn).await?)
    }

    pub async fn create(&self, input: RuleNameInput) -> Result<rule_name::Model> {
        let mut active = <rule_name::ActiveModel as Default>::default();
        input.apply(&mut active);

        Ok(active.insert(&self.conn).await?)
    }

    pub async fn update(&self, id: i32, input: RuleNameInput) -> Result<Option<rule_name::Model>> {
        let Some(existing) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: rule_name::ActiveModel = existing.into();
        input.apply(&mut active);

        Ok(Some(active.update(&self.conn).await?))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = RuleName::delete_by_id(id).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }
}
