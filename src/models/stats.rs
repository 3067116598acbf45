use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CampaignStatusCounts {
    pub draft: u64,
    pub active: u64,
    pub completed: u64,
    pub cancelled: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CurrencyTotal {
    pub currency: String,
    pub total: Decimal,
}

/// 后台首页统计
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub campaigns: CampaignStatusCounts,
    /// 已完成捐款按币种汇总（不做汇率换算）
    pub collected_by_currency: Vec<CurrencyTotal>,
    pub completed_donations: u64,
    pub pending_donations: u64,
}
