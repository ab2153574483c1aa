use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::domain::{
    AccessError, AccessResult, LoginTimeRestriction, SettingsRepositoryInterface, SystemSettings,
};
use crate::infrastructure::database::entities::system_settings::{self, SINGLETON_ID};

use super::db_err;

pub struct SettingsRepository {
    db: DatabaseConnection,
}

impl SettingsRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load_or_insert(&self, at: DateTime<Utc>) -> AccessResult<system_settings::Model> {
        if let Some(model) = system_settings::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(db_err)?
        {
            return Ok(model);
        }

        let defaults = LoginTimeRestriction::default();
        let row = system_settings::ActiveModel {
            id: Set(SINGLETON_ID),
            login_restriction_enabled: Set(defaults.enabled),
            login_start_minute: Set(defaults.start_minute_of_day as i32),
            login_end_minute: Set(defaults.end_minute_of_day as i32),
            updated_at: Set(at),
        };

        // A concurrent first access may win the insert; either way the row exists after this.
        system_settings::Entity::insert(row)
            .on_conflict(
                OnConflict::column(system_settings::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(db_err)?;

        system_settings::Entity::find_by_id(SINGLETON_ID)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| AccessError::Storage("system settings row missing after insert".into()))
    }
}

fn model_to_domain(model: system_settings::Model) -> AccessResult<SystemSettings> {
    let minute = |v: i32| {
        u16::try_from(v)
            .map_err(|_| AccessError::Storage(format!("stored minute-of-day out of range: {}", v)))
    };

    Ok(SystemSettings {
        login_time_restriction: LoginTimeRestriction {
            enabled: model.login_restriction_enabled,
            start_minute_of_day: minute(model.login_start_minute)?,
            end_minute_of_day: minute(model.login_end_minute)?,
        },
        updated_at: model.updated_at,
    })
}

#[async_trait]
impl SettingsRepositoryInterface for SettingsRepository {
    async fn get_or_init(&self, at: DateTime<Utc>) -> AccessResult<SystemSettings> {
        model_to_domain(self.load_or_insert(at).await?)
    }

    async fn save_login_time_restriction(
        &self,
        restriction: LoginTimeRestriction,
        at: DateTime<Utc>,
    ) -> AccessResult<SystemSettings> {
        let existing = self.load_or_insert(at).await?;

        let mut active: system_settings::ActiveModel = existing.into();
        active.login_restriction_enabled = Set(restriction.enabled);
        active.login_start_minute = Set(restriction.start_minute_of_day as i32);
        active.login_end_minute = Set(restriction.end_minute_of_day as i32);
        active.updated_at = Set(at);

        let updated = active.update(&self.db).await.map_err(db_err)?;
        model_to_domain(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::infrastructure::database::testing::memory_db;

    #[tokio::test]
    async fn first_read_creates_defaults_stamped_with_the_given_time() {
        let repo = SettingsRepository::new(memory_db().await);
        let created = Utc.with_ymd_and_hms(2024, 3, 4, 8, 0, 0).unwrap();
        let settings = repo.get_or_init(created).await.unwrap();
        assert_eq!(settings.login_time_restriction, LoginTimeRestriction::default());
        assert_eq!(settings.updated_at, created);

        // second read sees the same row
        let again = repo.get_or_init(created + chrono::Duration::hours(1)).await.unwrap();
        assert_eq!(again.login_time_restriction, settings.login_time_restriction);
        assert_eq!(again.updated_at, created);
    }

    #[tokio::test]
    async fn save_replaces_the_window_in_place() {
        let repo = SettingsRepository::new(memory_db().await);
        let window = LoginTimeRestriction {
            enabled: true,
            start_minute_of_day: 22 * 60,
            end_minute_of_day: 6 * 60,
        };

        let saved = repo
            .save_login_time_restriction(window, Utc::now())
            .await
            .unwrap();
        assert_eq!(saved.login_time_restriction, window);
        assert_eq!(repo.get_or_init(Utc::now()).await.unwrap().login_time_restriction, window);
    }
}
