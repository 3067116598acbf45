use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{DonationStatus, PaymentMethod, donation_entity};

/// 捐款提交
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDonationRequest {
    /// 非匿名捐款必填
    #[schema(example = "Ahmad Fauzi")]
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    #[schema(example = "081234567890")]
    pub donor_phone: Option<String>,
    #[schema(example = 500000)]
    pub amount: Decimal,
    #[serde(default)]
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub payment_method: PaymentMethod,
    /// 项目 slug
    #[schema(example = "beasiswa")]
    pub campaign: String,
    #[schema(example = "IDR")]
    pub currency: String,
}

/// 提交成功后返回给捐款人的收据
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationReceiptResponse {
    pub receipt_number: String,
    pub campaign: String,
    pub donor_name: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<donation_entity::Model> for DonationReceiptResponse {
    fn from(m: donation_entity::Model) -> Self {
        Self {
            donor_name: m.public_donor_name(),
            receipt_number: m.receipt_number,
            campaign: m.campaign,
            amount: m.amount,
            currency: m.currency,
            payment_method: m.payment_method,
            status: m.status,
            is_anonymous: m.is_anonymous,
            created_at: m.created_at,
            completed_at: m.completed_at,
        }
    }
}

/// 项目页“捐款人名单”条目（不含联系方式）
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicDonationResponse {
    /// 匿名捐款为 null
    pub donor_name: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub message: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<donation_entity::Model> for PublicDonationResponse {
    fn from(m: donation_entity::Model) -> Self {
        Self {
            donor_name: m.public_donor_name(),
            amount: m.amount,
            currency: m.currency,
            message: m.message,
            completed_at: m.completed_at,
        }
    }
}

/// 后台捐款详情
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DonationResponse {
    pub id: i64,
    pub receipt_number: String,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub donor_phone: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub campaign: String,
    pub payment_method: PaymentMethod,
    pub status: DonationStatus,
    pub is_anonymous: bool,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<donation_entity::Model> for DonationResponse {
    fn from(m: donation_entity::Model) -> Self {
        Self {
            id: m.id,
            receipt_number: m.receipt_number,
            donor_name: m.donor_name,
            donor_email: m.donor_email,
            donor_phone: m.donor_phone,
            amount: m.amount,
            currency: m.currency,
            campaign: m.campaign,
            payment_method: m.payment_method,
            status: m.status,
            is_anonymous: m.is_anonymous,
            message: m.message,
            created_at: m.created_at,
            completed_at: m.completed_at,
            updated_at: m.updated_at,
        }
    }
}

/// 后台捐款列表查询
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct DonationQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// 捐款人姓名 / 邮箱 / 收据号
    pub search: Option<String>,
    pub status: Option<DonationStatus>,
    /// 项目 slug
    pub campaign: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct DonorWallQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}
