use crate::config::DonationConfig;
use crate::database::DbPool;
use crate::entities::{
    CampaignStatus, DonationStatus, campaign_entity as campaigns, donation_entity as donations,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    CampaignQuery, CampaignResponse, CreateCampaignRequest, Page, Pagination, PaginationParams,
    UpdateCampaignRequest,
};
use crate::services::campaign_progress::{
    compute_progress, is_storable_amount, transition_campaign,
};
use crate::utils::{slug_candidate, slugify};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use std::collections::HashMap;

const MAX_SLUG_ATTEMPTS: u32 = 50;

#[derive(Clone)]
pub struct CampaignService {
    pool: DbPool,
    settings: DonationConfig,
}

impl CampaignService {
    pub fn new(pool: DbPool, settings: DonationConfig) -> Self {
        Self { pool, settings }
    }

    pub async fn find_campaign_by_slug(&self, slug: &str) -> AppResult<Option<campaigns::Model>> {
        let campaign = campaigns::Entity::find()
            .filter(campaigns::Column::Slug.eq(slug))
            .one(self.pool.as_ref())
            .await?;
        Ok(campaign)
    }

    /// 项目下的全部捐款（不区分状态，进度计算时再过滤）
    pub async fn find_donations_by_campaign(&self, slug: &str) -> AppResult<Vec<donations::Model>> {
        let list = donations::Entity::find()
            .filter(donations::Column::Campaign.eq(slug))
            .order_by_desc(donations::Column::CreatedAt)
            .all(self.pool.as_ref())
            .await?;
        Ok(list)
    }

    /// 公开项目列表（默认只看进行中的项目，草稿不对外）
    pub async fn list_public(&self, query: &CampaignQuery) -> AppResult<Page<CampaignResponse>> {
        let status = match query.status {
            Some(CampaignStatus::Draft) => {
                return Err(AppError::ValidationError(
                    "Draft campaigns are not publicly listed".to_string(),
                ));
            }
            Some(status) => status,
            None => CampaignStatus::Active,
        };
        self.list(query, Some(status)).await
    }

    /// 后台项目列表（不限状态）
    pub async fn list_admin(&self, query: &CampaignQuery) -> AppResult<Page<CampaignResponse>> {
        self.list(query, query.status).await
    }

    /// 公开项目详情
    pub async fn get_public(&self, slug: &str) -> AppResult<CampaignResponse> {
        let campaign = self
            .find_campaign_by_slug(slug)
            .await?
            .filter(|c| c.status != CampaignStatus::Draft)
            .ok_or_else(|| AppError::NotFound(format!("Campaign '{slug}' not found")))?;

        let ledger = self.find_donations_by_campaign(&campaign.slug).await?;
        let progress = compute_progress(&campaign, &ledger);
        Ok(CampaignResponse::new(campaign, progress))
    }

    pub async fn get_admin(&self, id: i64) -> AppResult<CampaignResponse> {
        let campaign = self.find_by_id(id).await?;
        let ledger = self.find_donations_by_campaign(&campaign.slug).await?;
        let progress = compute_progress(&campaign, &ledger);
        Ok(CampaignResponse::new(campaign, progress))
    }

    pub async fn create(&self, request: CreateCampaignRequest) -> AppResult<CampaignResponse> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        validate_goal(request.goal)?;

        let currency = normalize_currency(
            request
                .currency
                .as_deref()
                .unwrap_or(&self.settings.default_currency),
        )?;

        let status = match request.status.unwrap_or(CampaignStatus::Draft) {
            s @ (CampaignStatus::Draft | CampaignStatus::Active) => s,
            other => {
                return Err(AppError::ValidationError(format!(
                    "A new campaign cannot start as {other}"
                )));
            }
        };

        let now = Utc::now();
        let start_date = request.start_date.unwrap_or(now);
        validate_dates(start_date, request.end_date)?;

        let base = slugify(request.slug.as_deref().unwrap_or(title));
        let slug = self.unique_slug(&base).await?;

        let category = request
            .category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| "general".to_string());

        let model = campaigns::ActiveModel {
            slug: Set(slug),
            title: Set(title.to_string()),
            description: Set(request.description),
            goal: Set(request.goal),
            currency: Set(currency),
            category: Set(category),
            status: Set(status),
            is_featured: Set(request.is_featured),
            cover_image: Set(non_empty(request.cover_image)),
            start_date: Set(start_date),
            end_date: Set(request.end_date),
            created_at: Set(Some(now)),
            updated_at: Set(Some(now)),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        log::info!("Campaign created: {} (id {})", model.slug, model.id);

        let progress = compute_progress(&model, &Vec::<donations::Model>::new());
        Ok(CampaignResponse::new(model, progress))
    }

    /// 部分更新（不含状态）
    pub async fn update(
        &self,
        id: i64,
        request: UpdateCampaignRequest,
    ) -> AppResult<CampaignResponse> {
        let current = self.find_by_id(id).await?;
        let mut start_date = current.start_date;
        let mut end_date = current.end_date;
        let slug = current.slug.clone();
        let current_currency = current.currency.clone();
        let mut am = current.into_active_model();

        if let Some(title) = request.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppError::ValidationError("Title is required".to_string()));
            }
            am.title = Set(title.to_string());
        }
        if let Some(description) = request.description {
            am.description = Set(description);
        }
        if let Some(goal) = request.goal {
            validate_goal(goal)?;
            am.goal = Set(goal);
        }
        if let Some(currency) = request.currency {
            let currency = normalize_currency(&currency)?;
            if currency != current_currency {
                // 已有捐款时不允许修改币种，否则历史流水与目标金额无法对应
                let has_donations = donations::Entity::find()
                    .filter(donations::Column::Campaign.eq(slug.as_str()))
                    .one(self.pool.as_ref())
                    .await?
                    .is_some();
                if has_donations {
                    return Err(AppError::Conflict(format!(
                        "Campaign '{slug}' already has donations; currency cannot change"
                    )));
                }
                am.currency = Set(currency);
            }
        }
        if let Some(category) = request.category {
            let category = category.trim().to_lowercase();
            if !category.is_empty() {
                am.category = Set(category);
            }
        }
        if let Some(is_featured) = request.is_featured {
            am.is_featured = Set(is_featured);
        }
        if let Some(cover_image) = request.cover_image {
            am.cover_image = Set(non_empty(Some(cover_image)));
        }
        if let Some(start) = request.start_date {
            start_date = start;
            am.start_date = Set(start);
        }
        if let Some(end) = request.end_date {
            end_date = Some(end);
            am.end_date = Set(Some(end));
        }
        validate_dates(start_date, end_date)?;

        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(self.pool.as_ref()).await?;
        log::info!("Campaign updated: {} (id {})", updated.slug, updated.id);

        let ledger = self.find_donations_by_campaign(&updated.slug).await?;
        let progress = compute_progress(&updated, &ledger);
        Ok(CampaignResponse::new(updated, progress))
    }

    /// 切换项目状态（受状态机约束）
    pub async fn change_status(
        &self,
        id: i64,
        target: CampaignStatus,
    ) -> AppResult<CampaignResponse> {
        let current = self.find_by_id(id).await?;
        let from = current.status;
        let next = transition_campaign(&current, target)?;

        let mut am = current.into_active_model();
        am.status = Set(next);
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(self.pool.as_ref()).await?;

        log::info!("Campaign {} status changed: {from} -> {next}", updated.slug);

        let ledger = self.find_donations_by_campaign(&updated.slug).await?;
        let progress = compute_progress(&updated, &ledger);
        Ok(CampaignResponse::new(updated, progress))
    }

    /// 删除项目；捐款流水保留（孤立记录）
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let current = self.find_by_id(id).await?;

        let orphaned = donations::Entity::find()
            .filter(donations::Column::Campaign.eq(current.slug.as_str()))
            .count(self.pool.as_ref())
            .await?;

        campaigns::Entity::delete_by_id(current.id)
            .exec(self.pool.as_ref())
            .await?;

        log::info!(
            "Campaign {} deleted; {orphaned} donation record(s) kept",
            current.slug
        );
        Ok(())
    }

    /// 结束所有已过截止时间的进行中项目，返回处理数量
    pub async fn close_expired(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let expired = campaigns::Entity::find()
            .filter(campaigns::Column::Status.eq(CampaignStatus::Active))
            .filter(campaigns::Column::EndDate.is_not_null())
            .filter(campaigns::Column::EndDate.lte(now))
            .all(self.pool.as_ref())
            .await?;

        let mut closed = 0u64;
        for campaign in expired {
            if !campaign.has_ended(now) {
                continue;
            }
            let next = transition_campaign(&campaign, CampaignStatus::Completed)?;
            let slug = campaign.slug.clone();

            let mut am = campaign.into_active_model();
            am.status = Set(next);
            am.updated_at = Set(Some(now));
            am.update(self.pool.as_ref()).await?;

            log::info!("Campaign {slug} passed its end date and was closed");
            closed += 1;
        }
        Ok(closed)
    }

    // -----------------------------
    // 内部辅助方法
    // -----------------------------

    async fn find_by_id(&self, id: i64) -> AppResult<campaigns::Model> {
        campaigns::Entity::find_by_id(id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Campaign {id} not found")))
    }

    async fn list(
        &self,
        query: &CampaignQuery,
        status: Option<CampaignStatus>,
    ) -> AppResult<Page<CampaignResponse>> {
        let params = PaginationParams::new(query.page, query.limit);
        let limit = params.get_limit(self.settings.default_page_size, self.settings.max_page_size);
        let offset = params
            .get_offset(self.settings.default_page_size, self.settings.max_page_size)
            .ok_or_else(|| AppError::ValidationError("Page is out of range".to_string()))?;

        let base_query = filtered_campaigns(query, status);
        let total = base_query.clone().count(self.pool.as_ref()).await?;

        let models = base_query
            .order_by_desc(campaigns::Column::IsFeatured)
            .order_by_desc(campaigns::Column::StartDate)
            .order_by_desc(campaigns::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.pool.as_ref())
            .await?;

        let items = self.attach_progress(models).await?;
        Ok(Page::new(
            items,
            Pagination::new(params.get_page(), limit, total),
        ))
    }

    /// 一次查询取出本页所有项目的已完成捐款，再逐个计算进度
    async fn attach_progress(
        &self,
        models: Vec<campaigns::Model>,
    ) -> AppResult<Vec<CampaignResponse>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let slugs: Vec<String> = models.iter().map(|m| m.slug.clone()).collect();
        let completed = donations::Entity::find()
            .filter(donations::Column::Campaign.is_in(slugs))
            .filter(donations::Column::Status.eq(DonationStatus::Completed))
            .all(self.pool.as_ref())
            .await?;

        let mut ledger: HashMap<String, Vec<donations::Model>> = HashMap::new();
        for donation in completed {
            ledger
                .entry(donation.campaign.clone())
                .or_default()
                .push(donation);
        }

        Ok(models
            .into_iter()
            .map(|m| {
                let progress = compute_progress(&m, ledger.get(&m.slug).into_iter().flatten());
                CampaignResponse::new(m, progress)
            })
            .collect())
    }

    /// 已删除项目留下的捐款仍占用原 slug，新项目不能复用
    async fn slug_in_use(&self, slug: &str) -> AppResult<bool> {
        if self.find_campaign_by_slug(slug).await?.is_some() {
            return Ok(true);
        }
        let orphan = donations::Entity::find()
            .filter(donations::Column::Campaign.eq(slug))
            .one(self.pool.as_ref())
            .await?;
        Ok(orphan.is_some())
    }

    async fn unique_slug(&self, base: &str) -> AppResult<String> {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = slug_candidate(base, attempt);
            if !self.slug_in_use(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(AppError::Conflict(format!(
            "Could not find a free slug for '{base}'"
        )))
    }
}

fn filtered_campaigns(
    query: &CampaignQuery,
    status: Option<CampaignStatus>,
) -> Select<campaigns::Entity> {
    let mut select = campaigns::Entity::find();

    if let Some(status) = status {
        select = select.filter(campaigns::Column::Status.eq(status));
    }
    if let Some(category) = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
    {
        select = select.filter(campaigns::Column::Category.eq(category.to_lowercase()));
    }
    if let Some(featured) = query.featured {
        select = select.filter(campaigns::Column::IsFeatured.eq(featured));
    }
    if let Some(search) = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        select = select.filter(
            Condition::any()
                .add(campaigns::Column::Title.contains(search))
                .add(campaigns::Column::Description.contains(search)),
        );
    }

    select
}

fn validate_goal(goal: Decimal) -> AppResult<()> {
    if !is_storable_amount(goal) {
        return Err(AppError::ValidationError(
            "Goal must be positive, below 10^14 and have at most two decimal places".to_string(),
        ));
    }
    Ok(())
}

fn validate_dates(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> AppResult<()> {
    if let Some(end) = end
        && end <= start
    {
        return Err(AppError::ValidationError(
            "End date must be after start date".to_string(),
        ));
    }
    Ok(())
}

/// ISO-4217 三位大写字母
fn normalize_currency(currency: &str) -> AppResult<String> {
    let currency = currency.trim().to_ascii_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(AppError::ValidationError(format!(
            "Invalid currency code: {currency}"
        )));
    }
    Ok(currency)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
