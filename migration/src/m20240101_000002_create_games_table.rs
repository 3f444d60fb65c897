use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Games::UserId).uuid().not_null())
                    .col(ColumnDef::new(Games::SecretWord).string().not_null())
                    .col(ColumnDef::new(Games::RemainingLetters).string().not_null())
                    .col(ColumnDef::new(Games::RevealedPattern).string().not_null())
                    .col(ColumnDef::new(Games::AttemptsAllowed).integer().not_null())
                    .col(
                        ColumnDef::new(Games::AttemptsRemaining)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Games::LettersTried).string().not_null())
                    .col(
                        ColumnDef::new(Games::IsOver)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Games::IsCancelled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Games::Guesses).json().not_null())
                    .col(ColumnDef::new(Games::MessagesHistory).json().not_null())
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_games_user_id")
                            .from(Games::Table, Games::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // The user-games listing and the refresher both filter on these
        manager
            .create_index(
                Index::create()
                    .name("idx_games_user_id")
                    .table(Games::Table)
                    .col(Games::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_games_is_over")
                    .table(Games::Table)
                    .col(Games::IsOver)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    UserId,
    SecretWord,
    RemainingLetters,
    RevealedPattern,
    AttemptsAllowed,
    AttemptsRemaining,
    LettersTried,
    IsOver,
    IsCancelled,
    Guesses,
    MessagesHistory,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
