//! 募捐进度计算与捐款状态机
//!
//! 纯函数模块，不做任何 I/O：服务层负责读取记录、调用这里的函数、再把结果写回数据库。
//!
//! ```text
//! 捐款:  pending ──► completed ──► refunded
//!           └──────► failed
//! 项目:  draft ──► active ──► completed
//!                    └──────► cancelled
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sea_orm::Set;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::entities::{
    CampaignStatus, DonationStatus, PaymentMethod, campaign_entity as campaigns,
    donation_entity as donations,
};
use crate::utils::generate_receipt_number;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DonationError {
    #[error("Donation amount must be positive, below 10^14 and have at most two decimal places")]
    InvalidAmount,

    #[error("Campaign '{slug}' is not accepting donations (status: {status})")]
    CampaignNotAcceptingDonations { slug: String, status: CampaignStatus },

    #[error("Donation currency {actual} does not match campaign currency {expected}")]
    CurrencyMismatch { expected: String, actual: String },

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },
}

/// 展示用的项目进度（只读）
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampaignProgress {
    /// 已完成捐款总额（项目币种）
    pub collected: Decimal,
    /// 已完成捐款笔数（匿名捐款同样计入）
    pub donor_count: u64,
    /// 百分比，限定在 [0, 100]，保留两位小数
    pub progress: f64,
    /// 距离目标的差额，不会小于 0
    pub remaining: Decimal,
}

/// 捐款人提交的原始信息
#[derive(Debug, Clone)]
pub struct DonationProposal {
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub donor_phone: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub payment_method: PaymentMethod,
    pub is_anonymous: bool,
    pub message: Option<String>,
}

/// 校验通过、待入库的捐款
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
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
}

impl NewDonation {
    pub fn into_active_model(self) -> donations::ActiveModel {
        donations::ActiveModel {
            receipt_number: Set(self.receipt_number),
            donor_name: Set(self.donor_name),
            donor_email: Set(self.donor_email),
            donor_phone: Set(self.donor_phone),
            amount: Set(self.amount),
            currency: Set(self.currency),
            campaign: Set(self.campaign),
            payment_method: Set(self.payment_method),
            status: Set(self.status),
            is_anonymous: Set(self.is_anonymous),
            message: Set(self.message),
            created_at: Set(self.created_at),
            completed_at: Set(None),
            updated_at: Set(Some(self.created_at)),
            ..Default::default()
        }
    }
}

/// 计算项目进度
///
/// 只统计 `status == completed` 且 `campaign == slug` 的捐款；目标金额非正数时进度按 0 处理。
pub fn compute_progress<'a, I>(campaign: &campaigns::Model, donations: I) -> CampaignProgress
where
    I: IntoIterator<Item = &'a donations::Model>,
{
    let (collected, donor_count) = donations
        .into_iter()
        .filter(|d| d.status == DonationStatus::Completed && d.campaign == campaign.slug)
        .fold((Decimal::ZERO, 0u64), |(sum, count), d| {
            (sum + d.amount, count + 1)
        });

    let progress = funding_percentage(collected, campaign.goal)
        .map(|pct| pct.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED).round_dp(2))
        .and_then(|pct| pct.to_f64())
        .unwrap_or(0.0);

    let remaining = if campaign.goal > collected {
        campaign.goal - collected
    } else {
        Decimal::ZERO
    };

    CampaignProgress {
        collected,
        donor_count,
        progress,
        remaining,
    }
}

/// 未截断的筹款百分比（超额项目可大于 100）；目标金额非正数时返回 None
pub fn funding_percentage(collected: Decimal, goal: Decimal) -> Option<Decimal> {
    if goal <= Decimal::ZERO {
        return None;
    }
    collected
        .checked_div(goal)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// 金额列为 NUMERIC(16,2)
const AMOUNT_UPPER_BOUND: i64 = 100_000_000_000_000;

/// 正数、最多两位小数且小于 10^14，数据库可原样保存
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO
        && amount.normalize().scale() <= 2
        && amount < Decimal::from(AMOUNT_UPPER_BOUND)
}

/// 校验一笔新捐款并生成收据号
pub fn accept_donation(
    campaign: &campaigns::Model,
    proposal: DonationProposal,
    receipt_prefix: &str,
    now: DateTime<Utc>,
) -> Result<NewDonation, DonationError> {
    if campaign.status != CampaignStatus::Active {
        return Err(DonationError::CampaignNotAcceptingDonations {
            slug: campaign.slug.clone(),
            status: campaign.status,
        });
    }

    if !is_storable_amount(proposal.amount) {
        return Err(DonationError::InvalidAmount);
    }

    let currency = proposal.currency.trim().to_ascii_uppercase();
    if !currency.eq_ignore_ascii_case(&campaign.currency) {
        return Err(DonationError::CurrencyMismatch {
            expected: campaign.currency.clone(),
            actual: currency,
        });
    }

    Ok(NewDonation {
        receipt_number: generate_receipt_number(receipt_prefix, now),
        donor_name: proposal.donor_name,
        donor_email: proposal.donor_email,
        donor_phone: proposal.donor_phone,
        amount: proposal.amount,
        currency,
        campaign: campaign.slug.clone(),
        payment_method: proposal.payment_method,
        status: DonationStatus::Pending,
        is_anonymous: proposal.is_anonymous,
        message: proposal.message,
        created_at: now,
    })
}

pub fn mark_completed(
    donation: &donations::Model,
    now: DateTime<Utc>,
) -> Result<donations::Model, DonationError> {
    let mut next = transition_donation(donation, DonationStatus::Completed, now)?;
    next.completed_at = Some(now);
    Ok(next)
}

pub fn mark_failed(
    donation: &donations::Model,
    now: DateTime<Utc>,
) -> Result<donations::Model, DonationError> {
    transition_donation(donation, DonationStatus::Failed, now)
}

pub fn mark_refunded(
    donation: &donations::Model,
    now: DateTime<Utc>,
) -> Result<donations::Model, DonationError> {
    transition_donation(donation, DonationStatus::Refunded, now)
}

fn transition_donation(
    donation: &donations::Model,
    to: DonationStatus,
    now: DateTime<Utc>,
) -> Result<donations::Model, DonationError> {
    let allowed = matches!(
        (donation.status, to),
        (DonationStatus::Pending, DonationStatus::Completed)
            | (DonationStatus::Pending, DonationStatus::Failed)
            | (DonationStatus::Completed, DonationStatus::Refunded)
    );
    if !allowed {
        return Err(DonationError::InvalidStateTransition {
            from: donation.status.to_string(),
            to: to.to_string(),
        });
    }

    let mut next = donation.clone();
    next.status = to;
    next.updated_at = Some(now);
    Ok(next)
}

/// 校验项目状态切换，返回目标状态
pub fn transition_campaign(
    campaign: &campaigns::Model,
    to: CampaignStatus,
) -> Result<CampaignStatus, DonationError> {
    let allowed = matches!(
        (campaign.status, to),
        (CampaignStatus::Draft, CampaignStatus::Active)
            | (CampaignStatus::Active, CampaignStatus::Completed)
            | (CampaignStatus::Active, CampaignStatus::Cancelled)
    );
    if allowed {
        Ok(to)
    } else {
        Err(DonationError::InvalidStateTransition {
            from: campaign.status.to_string(),
            to: to.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 8, 30, 0).unwrap()
    }

    fn campaign(goal: i64, status: CampaignStatus) -> campaigns::Model {
        campaigns::Model {
            id: 1,
            slug: "beasiswa".to_string(),
            title: "Beasiswa Santri".to_string(),
            description: String::new(),
            goal: Decimal::from(goal),
            currency: "IDR".to_string(),
            category: "pendidikan".to_string(),
            status,
            is_featured: false,
            cover_image: None,
            start_date: now(),
            end_date: None,
            created_at: Some(now()),
            updated_at: Some(now()),
        }
    }

    fn donation(id: i64, amount: i64, status: DonationStatus) -> donations::Model {
        donations::Model {
            id,
            receipt_number: format!("PSN-20250901-{id:06}"),
            donor_name: Some("Hamba Allah".to_string()),
            donor_email: None,
            donor_phone: None,
            amount: Decimal::from(amount),
            currency: "IDR".to_string(),
            campaign: "beasiswa".to_string(),
            payment_method: PaymentMethod::BankTransfer,
            status,
            is_anonymous: false,
            message: None,
            created_at: now(),
            completed_at: None,
            updated_at: None,
        }
    }

    fn proposal(amount: i64) -> DonationProposal {
        DonationProposal {
            donor_name: Some("Ahmad".to_string()),
            donor_email: Some("ahmad@example.com".to_string()),
            donor_phone: None,
            amount: Decimal::from(amount),
            currency: "idr".to_string(),
            payment_method: PaymentMethod::Qris,
            is_anonymous: false,
            message: Some("Semoga berkah".to_string()),
        }
    }

    #[test]
    fn test_compute_progress_excludes_pending() {
        let c = campaign(10_000_000, CampaignStatus::Active);
        let ds = vec![
            donation(1, 500_000, DonationStatus::Completed),
            donation(2, 1_000_000, DonationStatus::Completed),
            donation(3, 2_000_000, DonationStatus::Pending),
        ];

        let p = compute_progress(&c, &ds);
        assert_eq!(p.collected, Decimal::from(1_500_000));
        assert_eq!(p.donor_count, 2);
        assert_eq!(p.progress, 15.0);
        assert_eq!(p.remaining, Decimal::from(8_500_000));
    }

    #[test]
    fn test_compute_progress_ignores_other_campaigns_and_statuses() {
        let c = campaign(1_000_000, CampaignStatus::Active);
        let mut other = donation(1, 300_000, DonationStatus::Completed);
        other.campaign = "wakaf-masjid".to_string();
        let ds = vec![
            other,
            donation(2, 100_000, DonationStatus::Failed),
            donation(3, 100_000, DonationStatus::Refunded),
            donation(4, 250_000, DonationStatus::Completed),
        ];

        let p = compute_progress(&c, &ds);
        assert_eq!(p.collected, Decimal::from(250_000));
        assert_eq!(p.donor_count, 1);
        assert_eq!(p.progress, 25.0);
    }

    #[test]
    fn test_compute_progress_is_idempotent() {
        let c = campaign(3_000_000, CampaignStatus::Active);
        let ds = vec![
            donation(1, 1_000_000, DonationStatus::Completed),
            donation(2, 250_000, DonationStatus::Completed),
        ];
        assert_eq!(compute_progress(&c, &ds), compute_progress(&c, &ds));
    }

    #[test]
    fn test_overfunded_campaign_is_clamped() {
        let c = campaign(1_000_000, CampaignStatus::Active);
        let ds = vec![
            donation(1, 900_000, DonationStatus::Completed),
            donation(2, 600_000, DonationStatus::Completed),
        ];

        let p = compute_progress(&c, &ds);
        assert_eq!(p.progress, 100.0);
        assert_eq!(p.remaining, Decimal::ZERO);
        assert_eq!(
            funding_percentage(p.collected, c.goal),
            Some(Decimal::from(150))
        );
    }

    #[test]
    fn test_anonymous_donations_are_counted() {
        let c = campaign(1_000_000, CampaignStatus::Active);
        let mut anon = donation(1, 100_000, DonationStatus::Completed);
        anon.is_anonymous = true;
        let ds = vec![anon, donation(2, 100_000, DonationStatus::Completed)];

        let p = compute_progress(&c, &ds);
        assert_eq!(p.donor_count, 2);
        assert_eq!(ds[0].public_donor_name(), None);
        assert_eq!(ds[1].public_donor_name().as_deref(), Some("Hamba Allah"));
    }

    #[test]
    fn test_non_positive_goal_fails_closed() {
        let c = campaign(0, CampaignStatus::Active);
        let ds = vec![donation(1, 100_000, DonationStatus::Completed)];

        let p = compute_progress(&c, &ds);
        assert_eq!(p.progress, 0.0);
        assert_eq!(p.remaining, Decimal::ZERO);
        assert_eq!(p.collected, Decimal::from(100_000));
    }

    #[test]
    fn test_progress_rounds_to_two_decimals() {
        let c = campaign(3_000_000, CampaignStatus::Active);
        let ds = vec![donation(1, 1_000_000, DonationStatus::Completed)];
        let p = compute_progress(&c, &ds);
        assert!((p.progress - 33.33).abs() < 1e-9);
    }

    #[test]
    fn test_empty_ledger() {
        let c = campaign(5_000_000, CampaignStatus::Active);
        let p = compute_progress(&c, &Vec::<donations::Model>::new());
        assert_eq!(p.collected, Decimal::ZERO);
        assert_eq!(p.donor_count, 0);
        assert_eq!(p.progress, 0.0);
        assert_eq!(p.remaining, Decimal::from(5_000_000));
    }

    #[test]
    fn test_accept_donation_assigns_receipt_and_pending() {
        let c = campaign(10_000_000, CampaignStatus::Active);
        let accepted = accept_donation(&c, proposal(250_000), "PSN", now()).unwrap();

        assert_eq!(accepted.status, DonationStatus::Pending);
        assert_eq!(accepted.campaign, "beasiswa");
        assert_eq!(accepted.currency, "IDR");
        assert_eq!(accepted.created_at, now());
        assert!(accepted.receipt_number.starts_with("PSN-20250901-"));
    }

    #[test]
    fn test_accept_donation_rejects_non_positive_amounts() {
        let c = campaign(10_000_000, CampaignStatus::Active);
        assert_eq!(
            accept_donation(&c, proposal(0), "PSN", now()),
            Err(DonationError::InvalidAmount)
        );
        assert_eq!(
            accept_donation(&c, proposal(-5_000), "PSN", now()),
            Err(DonationError::InvalidAmount)
        );
    }

    #[test]
    fn test_accept_donation_rejects_amounts_the_ledger_cannot_store() {
        let c = campaign(10_000_000, CampaignStatus::Active);
        for raw in ["0.001", "1.005", "100000000000000", "250000000000000.50"] {
            let mut p = proposal(0);
            p.amount = raw.parse().unwrap();
            assert_eq!(
                accept_donation(&c, p, "PSN", now()),
                Err(DonationError::InvalidAmount),
                "{raw} should be rejected"
            );
        }

        let mut p = proposal(0);
        p.amount = "99999999999999.99".parse().unwrap();
        assert!(accept_donation(&c, p, "PSN", now()).is_ok());
    }

    #[test]
    fn test_is_storable_amount() {
        assert!(is_storable_amount("10.50".parse().unwrap()));
        assert!(is_storable_amount("10.500".parse().unwrap()));
        assert!(is_storable_amount(Decimal::from(1)));
        assert!(!is_storable_amount("0.001".parse().unwrap()));
        assert!(!is_storable_amount(Decimal::ZERO));
        assert!(!is_storable_amount(Decimal::from(AMOUNT_UPPER_BOUND)));
    }

    #[test]
    fn test_accept_donation_requires_active_campaign() {
        for status in [
            CampaignStatus::Draft,
            CampaignStatus::Completed,
            CampaignStatus::Cancelled,
        ] {
            let c = campaign(10_000_000, status);
            let err = accept_donation(&c, proposal(100_000), "PSN", now()).unwrap_err();
            assert_eq!(
                err,
                DonationError::CampaignNotAcceptingDonations {
                    slug: "beasiswa".to_string(),
                    status,
                }
            );
        }
    }

    #[test]
    fn test_accept_donation_rejects_currency_mismatch() {
        let c = campaign(10_000_000, CampaignStatus::Active);
        let mut p = proposal(100_000);
        p.currency = "usd".to_string();

        assert_eq!(
            accept_donation(&c, p, "PSN", now()),
            Err(DonationError::CurrencyMismatch {
                expected: "IDR".to_string(),
                actual: "USD".to_string(),
            })
        );
    }

    #[test]
    fn test_donation_state_machine() {
        let pending = donation(1, 100_000, DonationStatus::Pending);

        let completed = mark_completed(&pending, now()).unwrap();
        assert_eq!(completed.status, DonationStatus::Completed);
        assert_eq!(completed.completed_at, Some(now()));

        let refunded = mark_refunded(&completed, now()).unwrap();
        assert_eq!(refunded.status, DonationStatus::Refunded);

        let failed = mark_failed(&pending, now()).unwrap();
        assert_eq!(failed.status, DonationStatus::Failed);
    }

    #[test]
    fn test_refund_requires_completed() {
        let pending = donation(1, 100_000, DonationStatus::Pending);
        assert_eq!(
            mark_refunded(&pending, now()),
            Err(DonationError::InvalidStateTransition {
                from: "pending".to_string(),
                to: "refunded".to_string(),
            })
        );
    }

    #[test]
    fn test_terminal_donation_states_reject_transitions() {
        let failed = donation(1, 100_000, DonationStatus::Failed);
        assert!(mark_completed(&failed, now()).is_err());
        assert!(mark_refunded(&failed, now()).is_err());

        let refunded = donation(2, 100_000, DonationStatus::Refunded);
        assert!(mark_completed(&refunded, now()).is_err());
        assert!(mark_failed(&refunded, now()).is_err());

        let completed = donation(3, 100_000, DonationStatus::Completed);
        assert!(mark_completed(&completed, now()).is_err());
        assert!(mark_failed(&completed, now()).is_err());
    }

    #[test]
    fn test_campaign_state_machine() {
        let draft = campaign(1_000_000, CampaignStatus::Draft);
        assert_eq!(
            transition_campaign(&draft, CampaignStatus::Active),
            Ok(CampaignStatus::Active)
        );
        assert!(transition_campaign(&draft, CampaignStatus::Completed).is_err());

        let active = campaign(1_000_000, CampaignStatus::Active);
        assert!(transition_campaign(&active, CampaignStatus::Completed).is_ok());
        assert!(transition_campaign(&active, CampaignStatus::Cancelled).is_ok());
        assert!(transition_campaign(&active, CampaignStatus::Draft).is_err());

        for terminal in [CampaignStatus::Completed, CampaignStatus::Cancelled] {
            let c = campaign(1_000_000, terminal);
            assert!(transition_campaign(&c, CampaignStatus::Active).is_err());
        }
    }
}
