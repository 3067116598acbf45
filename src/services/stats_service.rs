use crate::database::DbPool;
use crate::entities::{
    CampaignStatus, DonationStatus, campaign_entity as campaigns, donation_entity as donations,
};
use crate::error::AppResult;
use crate::models::{CampaignStatusCounts, CurrencyTotal, DashboardStats};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect};

#[derive(Clone)]
pub struct StatsService {
    pool: DbPool,
}

impl StatsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        let mut counts = CampaignStatusCounts::default();
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Active,
            CampaignStatus::Completed,
            CampaignStatus::Cancelled,
        ] {
            let n = campaigns::Entity::find()
                .filter(campaigns::Column::Status.eq(status))
                .count(self.pool.as_ref())
                .await?;
            match status {
                CampaignStatus::Draft => counts.draft = n,
                CampaignStatus::Active => counts.active = n,
                CampaignStatus::Completed => counts.completed = n,
                CampaignStatus::Cancelled => counts.cancelled = n,
            }
        }

        // 不同币种分开汇总
        let totals: Vec<(String, Option<Decimal>)> = donations::Entity::find()
            .select_only()
            .column(donations::Column::Currency)
            .column_as(Expr::col(donations::Column::Amount).sum(), "total")
            .filter(donations::Column::Status.eq(DonationStatus::Completed))
            .group_by(donations::Column::Currency)
            .order_by_asc(donations::Column::Currency)
            .into_tuple()
            .all(self.pool.as_ref())
            .await?;

        let completed_donations = self.count_donations(DonationStatus::Completed).await?;
        let pending_donations = self.count_donations(DonationStatus::Pending).await?;

        Ok(DashboardStats {
            campaigns: counts,
            collected_by_currency: totals
                .into_iter()
                .map(|(currency, total)| CurrencyTotal {
                    currency,
                    total: total.unwrap_or(Decimal::ZERO),
                })
                .collect(),
            completed_donations,
            pending_donations,
        })
    }

    async fn count_donations(&self, status: DonationStatus) -> AppResult<u64> {
        let n = donations::Entity::find()
            .filter(donations::Column::Status.eq(status))
            .count(self.pool.as_ref())
            .await?;
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn count_row(n: i64) -> Vec<BTreeMap<String, Value>> {
        vec![BTreeMap::from([("num_items".to_string(), Value::BigInt(Some(n)))])]
    }

    fn total_row(currency: &str, total: Option<Decimal>) -> BTreeMap<String, Value> {
        BTreeMap::from([
            ("currency".to_string(), Value::String(Some(Box::new(currency.to_string())))),
            ("total".to_string(), Value::Decimal(total.map(Box::new))),
        ])
    }

    #[tokio::test]
    async fn test_dashboard_aggregates_counts_and_totals() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // draft / active / completed / cancelled
            .append_query_results([count_row(1)])
            .append_query_results([count_row(4)])
            .append_query_results([count_row(2)])
            .append_query_results([count_row(0)])
            .append_query_results([vec![
                total_row("IDR", Some("12500000.50".parse().unwrap())),
                total_row("USD", None),
            ]])
            // completed / pending 捐款数
            .append_query_results([count_row(37)])
            .append_query_results([count_row(5)]);

        let stats = StatsService::new(Arc::new(db.into_connection()))
            .dashboard()
            .await
            .unwrap();

        assert_eq!(stats.campaigns.draft, 1);
        assert_eq!(stats.campaigns.active, 4);
        assert_eq!(stats.campaigns.completed, 2);
        assert_eq!(stats.campaigns.cancelled, 0);
        assert_eq!(
            stats.collected_by_currency,
            vec![
                CurrencyTotal {
                    currency: "IDR".to_string(),
                    total: "12500000.50".parse().unwrap(),
                },
                CurrencyTotal {
                    currency: "USD".to_string(),
                    total: Decimal::ZERO,
                },
            ]
        );
        assert_eq!(stats.completed_donations, 37);
        assert_eq!(stats.pending_donations, 5);
    }
}
