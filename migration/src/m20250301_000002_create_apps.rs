use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create apps table
        manager
            .create_table(
                Table::create()
                    .table(Apps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Apps::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Apps::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Apps::Slug)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Apps::CompanyName).string_len(255).not_null())
                    .col(ColumnDef::new(Apps::Email).string_len(180).not_null())
                    .col(ColumnDef::new(Apps::Description).text().null())
                    .col(ColumnDef::new(Apps::LogoPath).string_len(255).null())
                    .col(ColumnDef::new(Apps::OwnerId).integer().not_null())
                    .col(
                        ColumnDef::new(Apps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(SimpleExpr::Keyword(Keyword::CurrentTimestamp)),
                    )
                    .col(
                        ColumnDef::new(Apps::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_apps_owner")
                            .from(Apps::Table, Apps::OwnerId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create index on slug for fast lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_apps_slug")
                    .table(Apps::Table)
                    .col(Apps::Slug)
                    .to_owned(),
            )
            .await?;

        // Create app_users join table (assigned-user set)
        manager
            .create_table(
                Table::create()
                    .table(AppUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppUsers::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppUsers::AppId).integer().not_null())
                    .col(ColumnDef::new(AppUsers::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_users_app")
                            .from(AppUsers::Table, AppUsers::AppId)
                            .to(Apps::Table, Apps::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_app_users_user")
                            .from(AppUsers::Table, AppUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One assignment row per (app, user)
        manager
            .create_index(
                Index::create()
                    .name("idx_app_users_app_user")
                    .table(AppUsers::Table)
                    .col(AppUsers::AppId)
                    .col(AppUsers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AppUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Apps::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Apps {
    Table,
    Id,
    Title,
    Slug,
    CompanyName,
    Email,
    Description,
    LogoPath,
    OwnerId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AppUsers {
    Table,
    Id,
    AppId,
    UserId,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
