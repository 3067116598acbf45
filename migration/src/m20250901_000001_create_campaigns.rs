use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Campaigns {
    Table,
    Id,
    Slug,
    Title,
    Description,
    Goal,
    Currency,
    Category,
    Status,
    IsFeatured,
    CoverImage,
    StartDate,
    EndDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 状态机: draft -> active -> completed | cancelled
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("campaign_status"))
                    .values(vec![
                        Alias::new("draft"),
                        Alias::new("active"),
                        Alias::new("completed"),
                        Alias::new("cancelled"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Campaigns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Campaigns::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Campaigns::Slug).string_len(160).not_null())
                    .col(ColumnDef::new(Campaigns::Title).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Campaigns::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    // 目标金额必须为正数（IDR 无小数，但保留两位以兼容其他币种）
                    .col(
                        ColumnDef::new(Campaigns::Goal)
                            .decimal_len(16, 2)
                            .not_null()
                            .check(Expr::col(Campaigns::Goal).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Campaigns::Currency)
                            .string_len(3)
                            .not_null()
                            .default("IDR"),
                    )
                    .col(
                        ColumnDef::new(Campaigns::Category)
                            .string_len(64)
                            .not_null()
                            .default("general"),
                    )
                    .col(
                        ColumnDef::new(Campaigns::Status)
                            .custom(Alias::new("campaign_status"))
                            .not_null()
                            .default(Expr::cust("'draft'::campaign_status")),
                    )
                    .col(
                        ColumnDef::new(Campaigns::IsFeatured)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Campaigns::CoverImage).string_len(512).null())
                    .col(
                        ColumnDef::new(Campaigns::StartDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Campaigns::EndDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Campaigns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Campaigns::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_campaigns_slug_unique")
                    .table(Campaigns::Table)
                    .col(Campaigns::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 公开列表按状态过滤
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_campaigns_status")
                    .table(Campaigns::Table)
                    .col(Campaigns::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Campaigns::Table).to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .if_exists()
                    .name(Alias::new("campaign_status"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
