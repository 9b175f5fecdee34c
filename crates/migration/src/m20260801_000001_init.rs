//! Initial schema migration - creates all tables from scratch.
//!
//! Schema for Tipjar:
//!
//! - `users`: app identities and authentication
//! - `platform_users`: messaging-platform identities sighted by the bot
//! - `accounts`: local mirrors of external ledger accounts
//! - `linked_accounts`: user/account edges with the primary designation
//! - `transactions`: transfer legs, two per two-party transfer
//! - `unclaimed_tips`: tips held for recipients without a linked account
//! - `service_config`: operational parameters (seeded with one row)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Password,
    PlatformId,
    PrimaryAccountId,
    DisclaimerAccepted,
}

#[derive(Iden)]
enum PlatformUsers {
    Table,
    PlatformId,
    Username,
    AccountId,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    BalanceUnlocked,
}

#[derive(Iden)]
enum LinkedAccounts {
    Table,
    AccountId,
    UserId,
    Primary,
    BalanceUnlocked,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    UserId,
    AccountId,
    Platform,
    PlatformUserId,
    Timestamp,
    TransferType,
    Amount,
    Fee,
    Status,
    TransferId,
    SenderUsername,
    RecipientUsername,
}

#[derive(Iden)]
enum UnclaimedTips {
    Table,
    Id,
    TransferId,
    Amount,
    SenderAccountId,
    RecipientAccountId,
    TimeoutDays,
    SenderUsername,
    RecipientUsername,
    RecipientPlatformId,
    CreatedAt,
    Status,
    ResolvedAt,
}

#[derive(Iden)]
enum ServiceConfig {
    Table,
    Id,
    TipTimeoutDays,
    ActivationUrl,
    Ticker,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null())
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .col(ColumnDef::new(Users::PlatformId).big_integer())
                    .col(ColumnDef::new(Users::PrimaryAccountId).string())
                    .col(
                        ColumnDef::new(Users::DisclaimerAccepted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-username")
                    .table(Users::Table)
                    .col(Users::Username)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-platform_id")
                    .table(Users::Table)
                    .col(Users::PlatformId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Platform users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(PlatformUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlatformUsers::PlatformId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PlatformUsers::Username).string().not_null())
                    .col(ColumnDef::new(PlatformUsers::AccountId).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-platform_users-username")
                    .table(PlatformUsers::Table)
                    .col(PlatformUsers::Username)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Accounts (mirrors)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Accounts::BalanceUnlocked)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Linked accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LinkedAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LinkedAccounts::AccountId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LinkedAccounts::UserId).string().not_null())
                    .col(
                        ColumnDef::new(LinkedAccounts::Primary)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LinkedAccounts::BalanceUnlocked)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-linked_accounts-user_id")
                            .from(LinkedAccounts::Table, LinkedAccounts::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-linked_accounts-user_id")
                    .table(LinkedAccounts::Table)
                    .col(LinkedAccounts::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::UserId).string())
                    .col(ColumnDef::new(Transactions::AccountId).string().not_null())
                    .col(ColumnDef::new(Transactions::Platform).string().not_null())
                    .col(ColumnDef::new(Transactions::PlatformUserId).big_integer())
                    .col(
                        ColumnDef::new(Transactions::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::TransferType)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Fee).big_integer().not_null())
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::TransferId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::SenderUsername)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::RecipientUsername)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-account_id")
                    .table(Transactions::Table)
                    .col(Transactions::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-transfer_id")
                    .table(Transactions::Table)
                    .col(Transactions::TransferId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Unclaimed tips
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(UnclaimedTips::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UnclaimedTips::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::TransferId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::SenderAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::RecipientAccountId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::TimeoutDays)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::SenderUsername)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::RecipientUsername)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::RecipientPlatformId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnclaimedTips::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UnclaimedTips::Status).string().not_null())
                    .col(ColumnDef::new(UnclaimedTips::ResolvedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-unclaimed_tips-status")
                    .table(UnclaimedTips::Table)
                    .col(UnclaimedTips::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-unclaimed_tips-recipient_platform_id")
                    .table(UnclaimedTips::Table)
                    .col(UnclaimedTips::RecipientPlatformId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Service config (single seeded row)
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ServiceConfig::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ServiceConfig::Id)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ServiceConfig::TipTimeoutDays)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ServiceConfig::ActivationUrl)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ServiceConfig::Ticker).string().not_null())
                    .to_owned(),
            )
            .await?;

        let seed = Query::insert()
            .into_table(ServiceConfig::Table)
            .columns([
                ServiceConfig::Id,
                ServiceConfig::TipTimeoutDays,
                ServiceConfig::ActivationUrl,
                ServiceConfig::Ticker,
            ])
            .values_panic([
                1.into(),
                3.into(),
                "https://tips.example.com".into(),
                "TPJ".into(),
            ])
            .to_owned();
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceConfig::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UnclaimedTips::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LinkedAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlatformUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}
