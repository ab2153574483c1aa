use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::domain::{
    AccessError, AccessResult, CreateUserDto, StateChange, User, UserRepositoryInterface,
    UserRole,
};
use crate::infrastructure::database::entities::user;

use super::db_err;

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn entity_role_to_domain(role: user::UserRole) -> UserRole {
    match role {
        user::UserRole::Admin => UserRole::Admin,
        user::UserRole::Manager => UserRole::Manager,
        user::UserRole::Collector => UserRole::Collector,
        user::UserRole::Supervisor => UserRole::Supervisor,
        user::UserRole::Member => UserRole::Member,
    }
}

fn domain_role_to_entity(role: UserRole) -> user::UserRole {
    match role {
        UserRole::Admin => user::UserRole::Admin,
        UserRole::Manager => user::UserRole::Manager,
        UserRole::Collector => user::UserRole::Collector,
        UserRole::Supervisor => user::UserRole::Supervisor,
        UserRole::Member => user::UserRole::Member,
    }
}

fn user_model_to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        identifier: model.identifier,
        name: model.name,
        password_hash: model.password_hash,
        role: entity_role_to_domain(model.role),
        is_approved: model.is_approved,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
        last_login_at: model.last_login_at,
    }
}

// ── Repository implementation ───────────────────────────────────

#[async_trait]
impl UserRepositoryInterface for UserRepository {
    async fn create_user(&self, dto: CreateUserDto, at: DateTime<Utc>) -> AccessResult<User> {
        let new_user = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            identifier: Set(dto.identifier),
            name: Set(dto.name),
            password_hash: Set(dto.password_hash),
            role: Set(domain_role_to_entity(dto.role)),
            is_approved: Set(dto.is_approved),
            is_active: Set(dto.is_active),
            created_at: Set(at),
            updated_at: Set(at),
            last_login_at: Set(None),
        };

        let model = new_user.insert(&self.db).await.map_err(|e| {
            if e.to_string().contains("UNIQUE") || e.to_string().contains("duplicate") {
                AccessError::Conflict("An account with this identifier already exists".into())
            } else {
                db_err(e)
            }
        })?;

        Ok(user_model_to_domain(model))
    }

    async fn get_user_by_id(&self, id: &str) -> AccessResult<Option<User>> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn get_user_by_identifier(&self, identifier: &str) -> AccessResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Identifier.eq(identifier))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(model.map(user_model_to_domain))
    }

    async fn list_users(&self) -> AccessResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_desc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn list_pending_users(&self) -> AccessResult<Vec<User>> {
        let models = user::Entity::find()
            .filter(user::Column::IsApproved.eq(false))
            .order_by_asc(user::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(models.into_iter().map(user_model_to_domain).collect())
    }

    async fn count_users(&self) -> AccessResult<u64> {
        user::Entity::find().count(&self.db).await.map_err(db_err)
    }

    async fn record_login(&self, id: &str, at: DateTime<Utc>) -> AccessResult<()> {
        user::Entity::update_many()
            .col_expr(user::Column::LastLoginAt, Expr::value(Some(at)))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        Ok(())
    }

    async fn apply_state_change(
        &self,
        id: &str,
        change: StateChange,
        at: DateTime<Utc>,
    ) -> AccessResult<bool> {
        let update = user::Entity::update_many()
            .col_expr(user::Column::UpdatedAt, Expr::value(at))
            .filter(user::Column::Id.eq(id));

        // The precondition travels in the WHERE clause so two concurrent
        // callers cannot both observe the old state and both write.
        let update = match change {
            StateChange::Approve => update
                .col_expr(user::Column::IsApproved, Expr::value(true))
                .filter(user::Column::IsApproved.eq(false)),
            StateChange::Activate => update
                .col_expr(user::Column::IsActive, Expr::value(true))
                .filter(user::Column::IsApproved.eq(true))
                .filter(user::Column::IsActive.eq(false)),
            StateChange::Deactivate => update
                .col_expr(user::Column::IsActive, Expr::value(false))
                .filter(user::Column::IsApproved.eq(true))
                .filter(user::Column::IsActive.eq(true)),
        };

        let result = update.exec(&self.db).await.map_err(db_err)?;
        Ok(result.rows_affected == 1)
    }

    async fn delete_user(&self, id: &str, only_if_approved: Option<bool>) -> AccessResult<bool> {
        let mut delete = user::Entity::delete_many().filter(user::Column::Id.eq(id));
        if let Some(approved) = only_if_approved {
            delete = delete.filter(user::Column::IsApproved.eq(approved));
        }

        let result = delete.exec(&self.db).await.map_err(db_err)?;
        Ok(result.rows_affected == 1)
    }
}
