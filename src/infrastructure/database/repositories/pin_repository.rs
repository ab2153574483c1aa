use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::domain::{AccessError, AccessResult, PinRecord, PinRepositoryInterface};
use crate::infrastructure::database::entities::admin_pin::{self, SINGLETON_ID};

use super::db_err;

pub struct PinRepository {
    db: DatabaseConnection,
}

impl PinRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PinRepositoryInterface for PinRepository {
    async fn get_or_init(&self, at: DateTime<Utc>) -> AccessResult<PinRecord> {
        let existing = admin_pin::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let model = match existing {
            Some(model) => model,
            None => {
                let row = admin_pin::ActiveModel {
                    id: Set(SINGLETON_ID),
                    pin_hash: Set(None),
                    is_set: Set(false),
                    updated_at: Set(at),
                };
                admin_pin::Entity::insert(row)
                    .on_conflict(
                        OnConflict::column(admin_pin::Column::Id)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(&self.db)
                    .await
                    .map_err(db_err)?;

                admin_pin::Entity::find_by_id(SINGLETON_ID)
                    .one(&self.db)
                    .await
                    .map_err(db_err)?
                    .ok_or_else(|| AccessError::Storage("admin pin row missing after insert".into()))?
            }
        };

        Ok(PinRecord {
            pin_hash: model.pin_hash,
            is_set: model.is_set,
        })
    }

    async fn set_if_unset(&self, pin_hash: &str, at: DateTime<Utc>) -> AccessResult<bool> {
        self.get_or_init(at).await?;

        let result = admin_pin::Entity::update_many()
            .col_expr(admin_pin::Column::PinHash, Expr::value(Some(pin_hash.to_string())))
            .col_expr(admin_pin::Column::IsSet, Expr::value(true))
            .col_expr(admin_pin::Column::UpdatedAt, Expr::value(at))
            .filter(admin_pin::Column::Id.eq(SINGLETON_ID))
            .filter(admin_pin::Column::IsSet.eq(false))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::testing::memory_db;

    #[tokio::test]
    async fn pin_can_only_be_set_once() {
        let repo = PinRepository::new(memory_db().await);
        assert_eq!(repo.get_or_init(Utc::now()).await.unwrap(), PinRecord::default());

        assert!(repo.set_if_unset("first", Utc::now()).await.unwrap());
        assert!(!repo.set_if_unset("second", Utc::now()).await.unwrap());

        let record = repo.get_or_init(Utc::now()).await.unwrap();
        assert!(record.is_set);
        assert_eq!(record.pin_hash.as_deref(), Some("first"));
    }
}
