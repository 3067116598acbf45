use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{CampaignStatus, campaign_entity};
use crate::services::campaign_progress::CampaignProgress;

/// 项目列表查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct CampaignQuery {
    /// 页码 (默认 1)
    pub page: Option<u64>,
    /// 每页数量
    pub limit: Option<u64>,
    /// 标题 / 描述关键字
    pub search: Option<String>,
    pub status: Option<CampaignStatus>,
    pub category: Option<String>,
    pub featured: Option<bool>,
}

/// 项目详情（附带实时计算的进度字段）
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignResponse {
    pub id: i64,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub goal: Decimal,
    pub currency: String,
    pub category: String,
    pub status: CampaignStatus,
    pub is_featured: bool,
    pub cover_image: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub collected: Decimal,
    pub donor_count: u64,
    /// 0 - 100
    pub progress: f64,
    pub remaining: Decimal,
}

impl CampaignResponse {
    pub fn new(m: campaign_entity::Model, p: CampaignProgress) -> Self {
        Self {
            id: m.id,
            slug: m.slug,
            title: m.title,
            description: m.description,
            goal: m.goal,
            currency: m.currency,
            category: m.category,
            status: m.status,
            is_featured: m.is_featured,
            cover_image: m.cover_image,
            start_date: m.start_date,
            end_date: m.end_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
            collected: p.collected,
            donor_count: p.donor_count,
            progress: p.progress,
            remaining: p.remaining,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    #[schema(example = "Beasiswa Santri Yatim")]
    pub title: String,
    /// 不填则由标题生成
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[schema(example = 10000000)]
    pub goal: Decimal,
    /// 不填则使用默认币种
    pub currency: Option<String>,
    pub category: Option<String>,
    /// 仅允许 draft / active，默认 draft
    pub status: Option<CampaignStatus>,
    #[serde(default)]
    pub is_featured: bool,
    pub cover_image: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// 部分更新；状态只能通过状态接口修改
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub goal: Option<Decimal>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub is_featured: Option<bool>,
    pub cover_image: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CampaignStatusRequest {
    pub status: CampaignStatus,
}
