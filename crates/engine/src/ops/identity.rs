//! Identity lookups, registration and platform-user bookkeeping.

use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Engine, EngineError, LedgerAccount, ResultEngine, accounts, platform_users, users,
};

impl Engine {
    /// Returns the app user with the given id.
    pub async fn user(&self, user_id: &str) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("user [{user_id}]")))
    }

    /// Returns the app user connected to a platform id, if any.
    pub async fn user_by_platform_id(
        &self,
        platform_id: i64,
    ) -> ResultEngine<Option<users::Model>> {
        Ok(users::Entity::find()
            .filter(users::Column::PlatformId.eq(platform_id))
            .one(&self.database)
            .await?)
    }

    /// Resolves a platform handle to the platform identity it names.
    ///
    /// Handles resolve case-insensitively against the last sighted spelling.
    pub async fn resolve_platform_user(&self, handle: &str) -> ResultEngine<platform_users::Model> {
        let normalized = handle.to_lowercase();
        platform_users::Entity::find()
            .filter(platform_users::Column::Username.eq(normalized.clone()))
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("platform user [{normalized}]")))
    }

    /// Records a platform-user sighting: inserts the identity on first
    /// contact, keeps the handle current afterwards. Idempotent; never
    /// touches a provisioned `account_id`.
    pub async fn record_platform_user(&self, platform_id: i64, username: &str) -> ResultEngine<()> {
        let normalized = username.to_lowercase();

        match platform_users::Entity::find_by_id(platform_id)
            .one(&self.database)
            .await?
        {
            Some(existing) => {
                if existing.username != normalized {
                    let mut active: platform_users::ActiveModel = existing.into();
                    active.username = ActiveValue::Set(normalized);
                    active.update(&self.database).await?;
                }
            }
            None => {
                platform_users::ActiveModel {
                    platform_id: ActiveValue::Set(platform_id),
                    username: ActiveValue::Set(normalized),
                    account_id: ActiveValue::Set(None),
                }
                .insert(&self.database)
                .await?;
            }
        }

        Ok(())
    }

    /// Registers an app user.
    ///
    /// When a platform identity is given and it already holds a provisioned
    /// ledger account (first-contact tips landed there), that account is
    /// linked instead of a fresh one, and pending unclaimed tips for the
    /// identity are claimed. The first linked account becomes primary.
    pub async fn register_user(
        &self,
        username: &str,
        password: &str,
        platform: Option<(i64, &str)>,
    ) -> ResultEngine<users::Model> {
        if username.is_empty() || password.is_empty() {
            return Err(EngineError::InvalidArgument(
                "username and password are required".to_string(),
            ));
        }

        if users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.database)
            .await?
            .is_some()
        {
            return Err(EngineError::Conflict(format!(
                "username [{username}] is already taken"
            )));
        }

        let (platform_id, account) = match platform {
            Some((platform_id, platform_username)) => {
                self.record_platform_user(platform_id, platform_username)
                    .await?;
                let identity = platform_users::Entity::find_by_id(platform_id)
                    .one(&self.database)
                    .await?
                    .ok_or_else(|| {
                        EngineError::NotFound(format!("platform user [{platform_id}]"))
                    })?;

                let account = match identity.account_id {
                    Some(account_id) => self.ledger.get_account(&account_id).await?,
                    None => self.provision_platform_account(platform_id).await?,
                };
                (Some(platform_id), account)
            }
            None => (None, self.create_mirrored_account().await?),
        };

        let user = users::ActiveModel {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            username: ActiveValue::Set(username.to_string()),
            password: ActiveValue::Set(password.to_string()),
            platform_id: ActiveValue::Set(platform_id),
            primary_account_id: ActiveValue::Set(None),
            disclaimer_accepted: ActiveValue::Set(false),
        }
        .insert(&self.database)
        .await?;

        if !self.link_account(&user.id, &account).await? {
            tracing::warn!(
                "account [{}] was already linked while registering user [{}]",
                account.id,
                user.id
            );
        }

        if let Some(platform_id) = platform_id {
            let claimed = self.claim_unclaimed_tips(platform_id).await?;
            if claimed > 0 {
                tracing::info!(
                    "user [{}] claimed {claimed} pending tip(s) on registration",
                    user.id
                );
            }
        }

        // Reload: linking sets the primary pointer.
        self.user(&user.id).await
    }

    /// Marks the user's disclaimer as accepted.
    pub async fn accept_disclaimer(&self, user_id: &str) -> ResultEngine<()> {
        let user = self.user(user_id).await?;
        let mut active: users::ActiveModel = user.into();
        active.disclaimer_accepted = ActiveValue::Set(true);
        active.update(&self.database).await?;
        Ok(())
    }

    /// Fetches an account from the external ledger.
    pub async fn ledger_account(&self, account_id: &str) -> ResultEngine<LedgerAccount> {
        Ok(self.ledger.get_account(account_id).await?)
    }

    /// Creates a ledger account and its local mirror row.
    pub(crate) async fn create_mirrored_account(&self) -> ResultEngine<LedgerAccount> {
        let account = self.ledger.create_account().await?;

        accounts::ActiveModel {
            id: ActiveValue::Set(account.id.clone()),
            balance_unlocked: ActiveValue::Set(account.balance_unlocked),
        }
        .insert(&self.database)
        .await?;

        Ok(account)
    }

    /// First-contact provisioning: creates a ledger account for a sighted
    /// platform identity. Mirror row and identity update commit together.
    pub(crate) async fn provision_platform_account(
        &self,
        platform_id: i64,
    ) -> ResultEngine<LedgerAccount> {
        let identity = platform_users::Entity::find_by_id(platform_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("platform user [{platform_id}]")))?;

        let account = self.ledger.create_account().await?;

        let db_tx = self.database.begin().await?;

        accounts::ActiveModel {
            id: ActiveValue::Set(account.id.clone()),
            balance_unlocked: ActiveValue::Set(account.balance_unlocked),
        }
        .insert(&db_tx)
        .await?;

        let mut active: platform_users::ActiveModel = identity.into();
        active.account_id = ActiveValue::Set(Some(account.id.clone()));
        active.update(&db_tx).await?;

        db_tx.commit().await?;

        tracing::info!(
            "provisioned account [{}] for platform user [{platform_id}]",
            account.id
        );
        Ok(account)
    }
}
