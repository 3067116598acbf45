use crate::config::DonationConfig;
use crate::database::DbPool;
use crate::entities::{
    CampaignStatus, DonationStatus, campaign_entity as campaigns, donation_entity as donations,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreateDonationRequest, DonationQuery, DonationReceiptResponse, DonationResponse,
    DonorWallQuery, Page, Pagination, PaginationParams, PublicDonationResponse,
};
use crate::services::campaign_progress::{
    self, DonationError, DonationProposal, accept_donation,
};
use crate::utils::{generate_receipt_number, normalize_id_phone, validate_email};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

const MAX_RECEIPT_ATTEMPTS: u32 = 5;
const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Clone)]
pub struct DonationService {
    pool: DbPool,
    settings: DonationConfig,
}

impl DonationService {
    pub fn new(pool: DbPool, settings: DonationConfig) -> Self {
        Self { pool, settings }
    }

    /// 提交捐款：校验捐款人信息与项目状态，写入一条 pending 记录
    pub async fn submit(&self, request: CreateDonationRequest) -> AppResult<DonationReceiptResponse> {
        let slug = request.campaign.trim();
        if slug.is_empty() {
            return Err(AppError::ValidationError("Campaign is required".to_string()));
        }

        let donor_name = non_empty(request.donor_name);
        if !request.is_anonymous && donor_name.is_none() {
            return Err(AppError::ValidationError(
                "Donor name is required unless the donation is anonymous".to_string(),
            ));
        }

        let donor_email = non_empty(request.donor_email);
        if let Some(email) = donor_email.as_deref() {
            validate_email(email)?;
        }
        let donor_phone = non_empty(request.donor_phone)
            .map(|p| normalize_id_phone(&p))
            .transpose()?;

        let message = non_empty(request.message);
        if let Some(msg) = message.as_deref()
            && msg.chars().count() > MAX_MESSAGE_CHARS
        {
            return Err(AppError::ValidationError(format!(
                "Message must be at most {MAX_MESSAGE_CHARS} characters"
            )));
        }

        let campaign = campaigns::Entity::find()
            .filter(campaigns::Column::Slug.eq(slug))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Campaign '{slug}' not found")))?;

        let proposal = DonationProposal {
            donor_name,
            donor_email,
            donor_phone,
            amount: request.amount,
            currency: request.currency,
            payment_method: request.payment_method,
            is_anonymous: request.is_anonymous,
            message,
        };

        let now = Utc::now();
        let mut accepted = accept_donation(&campaign, proposal, &self.settings.receipt_prefix, now)?;

        // 收据号碰撞时重新生成
        let mut attempts = 1;
        while self.receipt_exists(&accepted.receipt_number).await? {
            if attempts >= MAX_RECEIPT_ATTEMPTS {
                return Err(AppError::InternalError(
                    "Failed to allocate a unique receipt number".to_string(),
                ));
            }
            attempts += 1;
            accepted.receipt_number = generate_receipt_number(&self.settings.receipt_prefix, now);
        }

        let saved = accepted.into_active_model().insert(self.pool.as_ref()).await?;
        log::info!(
            "Donation {} received for {}: {} {} via {}",
            saved.receipt_number,
            saved.campaign,
            saved.amount,
            saved.currency,
            saved.payment_method
        );

        Ok(saved.into())
    }

    /// 按收据号查询（捐款人自查）
    pub async fn find_by_receipt(&self, receipt_number: &str) -> AppResult<DonationReceiptResponse> {
        let donation = donations::Entity::find()
            .filter(donations::Column::ReceiptNumber.eq(receipt_number.trim()))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Receipt {receipt_number} not found"))
            })?;
        Ok(donation.into())
    }

    /// 项目页捐款人名单：只展示已完成的捐款
    pub async fn list_public_for_campaign(
        &self,
        slug: &str,
        query: &DonorWallQuery,
    ) -> AppResult<Page<PublicDonationResponse>> {
        let visible = campaigns::Entity::find()
            .filter(campaigns::Column::Slug.eq(slug))
            .one(self.pool.as_ref())
            .await?
            .is_some_and(|c| c.status != CampaignStatus::Draft);
        if !visible {
            return Err(AppError::NotFound(format!("Campaign '{slug}' not found")));
        }

        let params = PaginationParams::new(query.page, query.limit);
        let limit = params.get_limit(self.settings.default_page_size, self.settings.max_page_size);
        let offset = params
            .get_offset(self.settings.default_page_size, self.settings.max_page_size)
            .ok_or_else(|| AppError::ValidationError("Page is out of range".to_string()))?;

        let base_query = donations::Entity::find()
            .filter(donations::Column::Campaign.eq(slug))
            .filter(donations::Column::Status.eq(DonationStatus::Completed));

        let total = base_query.clone().count(self.pool.as_ref()).await?;
        let list = base_query
            .order_by_desc(donations::Column::CompletedAt)
            .order_by_desc(donations::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.pool.as_ref())
            .await?;

        Ok(Page::new(
            list.into_iter().map(Into::into).collect(),
            Pagination::new(params.get_page(), limit, total),
        ))
    }

    /// 后台捐款列表
    pub async fn list_admin(&self, query: &DonationQuery) -> AppResult<Page<DonationResponse>> {
        let params = PaginationParams::new(query.page, query.limit);
        let limit = params.get_limit(self.settings.default_page_size, self.settings.max_page_size);
        let offset = params
            .get_offset(self.settings.default_page_size, self.settings.max_page_size)
            .ok_or_else(|| AppError::ValidationError("Page is out of range".to_string()))?;

        let mut base_query = donations::Entity::find();
        if let Some(status) = query.status {
            base_query = base_query.filter(donations::Column::Status.eq(status));
        }
        if let Some(campaign) = query
            .campaign
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            base_query = base_query.filter(donations::Column::Campaign.eq(campaign));
        }
        if let Some(search) = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            base_query = base_query.filter(
                Condition::any()
                    .add(donations::Column::DonorName.contains(search))
                    .add(donations::Column::DonorEmail.contains(search))
                    .add(donations::Column::ReceiptNumber.contains(search)),
            );
        }

        let total = base_query.clone().count(self.pool.as_ref()).await?;
        let list = base_query
            .order_by_desc(donations::Column::CreatedAt)
            .order_by_desc(donations::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.pool.as_ref())
            .await?;

        Ok(Page::new(
            list.into_iter().map(Into::into).collect(),
            Pagination::new(params.get_page(), limit, total),
        ))
    }

    pub async fn get(&self, id: i64) -> AppResult<DonationResponse> {
        Ok(self.find_by_id(id).await?.into())
    }

    /// 确认到账
    pub async fn complete(&self, id: i64) -> AppResult<DonationResponse> {
        self.apply_transition(id, campaign_progress::mark_completed).await
    }

    pub async fn fail(&self, id: i64) -> AppResult<DonationResponse> {
        self.apply_transition(id, campaign_progress::mark_failed).await
    }

    pub async fn refund(&self, id: i64) -> AppResult<DonationResponse> {
        self.apply_transition(id, campaign_progress::mark_refunded).await
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let donation = self.find_by_id(id).await?;
        donations::Entity::delete_by_id(donation.id)
            .exec(self.pool.as_ref())
            .await?;
        log::info!(
            "Donation {} ({}) deleted",
            donation.receipt_number,
            donation.status
        );
        Ok(())
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn find_by_id(&self, id: i64) -> AppResult<donations::Model> {
        donations::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Donation {id} not found")))
    }

    async fn receipt_exists(&self, receipt_number: &str) -> AppResult<bool> {
        let existing = donations::Entity::find()
            .filter(donations::Column::ReceiptNumber.eq(receipt_number))
            .one(self.pool.as_ref())
            .await?;
        Ok(existing.is_some())
    }

    /// 行锁内完成状态切换，避免并发确认/退款
    async fn apply_transition<F>(&self, id: i64, transition: F) -> AppResult<DonationResponse>
    where
        F: FnOnce(&donations::Model, DateTime<Utc>) -> Result<donations::Model, DonationError>,
    {
        let txn = self.pool.begin().await?;

        let current = donations::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Donation {id} not found")))?;

        let from = current.status;
        let next = transition(&current, Utc::now())?;

        let mut am = current.into_active_model();
        am.status = Set(next.status);
        am.completed_at = Set(next.completed_at);
        am.updated_at = Set(next.updated_at);
        let updated = am.update(&txn).await?;

        txn.commit().await?;

        log::info!(
            "Donation {} status changed: {from} -> {}",
            updated.receipt_number,
            updated.status
        );
        Ok(updated.into())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::PaymentMethod;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 8, 30, 0).unwrap()
    }

    fn campaign(status: CampaignStatus) -> campaigns::Model {
        campaigns::Model {
            id: 1,
            slug: "beasiswa".to_string(),
            title: "Beasiswa Santri".to_string(),
            description: String::new(),
            goal: Decimal::from(10_000_000),
            currency: "IDR".to_string(),
            category: "pendidikan".to_string(),
            status,
            is_featured: false,
            cover_image: None,
            start_date: ts(),
            end_date: None,
            created_at: Some(ts()),
            updated_at: Some(ts()),
        }
    }

    fn donation(status: DonationStatus) -> donations::Model {
        donations::Model {
            id: 42,
            receipt_number: "PSN-20250901-ABCDEF".to_string(),
            donor_name: Some("Ahmad Fauzi".to_string()),
            donor_email: Some("ahmad@example.com".to_string()),
            donor_phone: Some("+6281234567890".to_string()),
            amount: Decimal::from(500_000),
            currency: "IDR".to_string(),
            campaign: "beasiswa".to_string(),
            payment_method: PaymentMethod::BankTransfer,
            status,
            is_anonymous: false,
            message: Some("Semoga berkah".to_string()),
            created_at: ts(),
            completed_at: None,
            updated_at: Some(ts()),
        }
    }

    fn request() -> CreateDonationRequest {
        CreateDonationRequest {
            donor_name: Some("Ahmad Fauzi".to_string()),
            donor_email: Some("ahmad@example.com".to_string()),
            donor_phone: Some("081234567890".to_string()),
            amount: Decimal::from(500_000),
            is_anonymous: false,
            message: Some("Semoga berkah".to_string()),
            payment_method: PaymentMethod::BankTransfer,
            campaign: "beasiswa".to_string(),
            currency: "IDR".to_string(),
        }
    }

    fn service(db: MockDatabase) -> DonationService {
        DonationService::new(Arc::new(db.into_connection()), DonationConfig::default())
    }

    #[tokio::test]
    async fn test_submit_creates_pending_donation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![campaign(CampaignStatus::Active)]])
            .append_query_results([Vec::<donations::Model>::new()])
            .append_query_results([vec![donation(DonationStatus::Pending)]]);

        let receipt = service(db).submit(request()).await.unwrap();
        assert_eq!(receipt.status, DonationStatus::Pending);
        assert_eq!(receipt.campaign, "beasiswa");
        assert_eq!(receipt.donor_name.as_deref(), Some("Ahmad Fauzi"));
    }

    #[tokio::test]
    async fn test_submit_requires_name_unless_anonymous() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);
        let mut req = request();
        req.donor_name = Some("   ".to_string());

        let err = service(db).submit(req).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_email_before_lookup() {
        let db = MockDatabase::new(DatabaseBackend::Postgres);
        let mut req = request();
        req.donor_email = Some("not-an-email".to_string());

        let err = service(db).submit(req).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_submit_unknown_campaign() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<campaigns::Model>::new()]);

        let err = service(db).submit(request()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_submit_to_completed_campaign_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![campaign(CampaignStatus::Completed)]]);

        let err = service(db).submit(request()).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Donation(DonationError::CampaignNotAcceptingDonations { .. })
        ));
    }

    #[tokio::test]
    async fn test_submit_currency_mismatch() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![campaign(CampaignStatus::Active)]]);
        let mut req = request();
        req.currency = "usd".to_string();

        let err = service(db).submit(req).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Donation currency USD does not match campaign currency IDR"
        );
    }

    #[tokio::test]
    async fn test_complete_pending_donation() {
        let mut completed = donation(DonationStatus::Completed);
        completed.completed_at = Some(ts());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![donation(DonationStatus::Pending)]])
            .append_query_results([vec![completed]]);

        let resp = service(db).complete(42).await.unwrap();
        assert_eq!(resp.status, DonationStatus::Completed);
        assert!(resp.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_refund_requires_completed_donation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![donation(DonationStatus::Pending)]]);

        let err = service(db).refund(42).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Donation(DonationError::InvalidStateTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_by_receipt_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<donations::Model>::new()]);

        let err = service(db)
            .find_by_receipt("PSN-20250901-ZZZZZZ")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_donation() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![donation(DonationStatus::Failed)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }]);

        assert!(service(db).delete(42).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_rejects_sub_cent_amount() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![campaign(CampaignStatus::Active)]]);

        let mut req = request();
        req.amount = "15000.005".parse().unwrap();

        let err = service(db).submit(req).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Donation(DonationError::InvalidAmount)
        ));
    }

    #[tokio::test]
    async fn test_donor_wall_hides_anonymous_names() {
        let mut anonymous = donation(DonationStatus::Completed);
        anonymous.id = 43;
        anonymous.is_anonymous = true;
        anonymous.completed_at = Some(ts());
        let mut named = donation(DonationStatus::Completed);
        named.completed_at = Some(ts());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![campaign(CampaignStatus::Active)]])
            .append_query_results([vec![BTreeMap::from([(
                "num_items".to_string(),
                sea_orm::Value::BigInt(Some(2)),
            )])]])
            .append_query_results([vec![anonymous, named]]);

        let page = service(db)
            .list_public_for_campaign("beasiswa", &DonorWallQuery::default())
            .await
            .unwrap();

        assert_eq!(page.pagination.total, 2);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].donor_name, None);
        assert_eq!(page.items[0].amount, Decimal::from(500_000));
        assert_eq!(page.items[1].donor_name.as_deref(), Some("Ahmad Fauzi"));

        // 公开视图不带联系方式
        let json = serde_json::to_value(&page.items[0]).unwrap();
        assert!(json.get("donorEmail").is_none());
        assert!(json.get("donorPhone").is_none());
    }

    #[tokio::test]
    async fn test_donor_wall_hides_draft_campaign() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![campaign(CampaignStatus::Draft)]]);

        let err = service(db)
            .list_public_for_campaign("beasiswa", &DonorWallQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
