use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Storage-level guard for the email uniqueness rule
        manager
            .create_index(
                Index::create()
                    .name("uniq_user_email")
                    .table(User::Table)
                    .col(User::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uniq_user_phone_number")
                    .table(User::Table)
                    .col(User::PhoneNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_user_email").table(User::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uniq_user_phone_number").table(User::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum User { Table, Email, PhoneNumber }
