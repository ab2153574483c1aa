//! System settings singleton entity

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Primary key of the only row
pub const SINGLETON_ID: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "system_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub login_restriction_enabled: bool,
    pub login_start_minute: i32,
    pub login_end_minute: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
