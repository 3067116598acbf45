use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Donations {
    Table,
    Id,
    ReceiptNumber,
    DonorName,
    DonorEmail,
    DonorPhone,
    Amount,
    Currency,
    Campaign,
    PaymentMethod,
    Status,
    IsAnonymous,
    Message,
    CreatedAt,
    CompletedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 捐款记录通过 campaign slug 关联项目，不建外键：
/// 删除项目时保留捐款流水（孤立记录），财务数据不随项目删除。
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("donation_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("completed"),
                        Alias::new("failed"),
                        Alias::new("refunded"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("payment_method"))
                    .values(vec![
                        Alias::new("bank_transfer"),
                        Alias::new("e_wallet"),
                        Alias::new("qris"),
                        Alias::new("credit_card"),
                        Alias::new("cash"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Donations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donations::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Donations::ReceiptNumber)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Donations::DonorName).string_len(255).null())
                    .col(ColumnDef::new(Donations::DonorEmail).string_len(255).null())
                    .col(ColumnDef::new(Donations::DonorPhone).string_len(32).null())
                    .col(
                        ColumnDef::new(Donations::Amount)
                            .decimal_len(16, 2)
                            .not_null()
                            .check(Expr::col(Donations::Amount).gt(0)),
                    )
                    .col(ColumnDef::new(Donations::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Donations::Campaign).string_len(160).not_null())
                    .col(
                        ColumnDef::new(Donations::PaymentMethod)
                            .custom(Alias::new("payment_method"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Donations::Status)
                            .custom(Alias::new("donation_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::donation_status")),
                    )
                    .col(
                        ColumnDef::new(Donations::IsAnonymous)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Donations::Message).text().null())
                    .col(
                        ColumnDef::new(Donations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .col(
                        ColumnDef::new(Donations::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Donations::UpdatedAt)
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
                    .name("idx_donations_receipt_number_unique")
                    .table(Donations::Table)
                    .col(Donations::ReceiptNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 进度汇总按 (campaign, status) 读取
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_donations_campaign_status")
                    .table(Donations::Table)
                    .col(Donations::Campaign)
                    .col(Donations::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Donations::Table).to_owned())
            .await?;
        for name in ["donation_status", "payment_method"] {
            manager
                .drop_type(Type::drop().if_exists().name(Alias::new(name)).to_owned())
                .await?;
        }
        Ok(())
    }
}
