use crate::models::*;
use crate::services::{CampaignService, DonationService};
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/campaigns",
    tag = "campaign",
    params(
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量"),
        ("search" = Option<String>, Query, description = "按标题/描述搜索"),
        ("status" = Option<String>, Query, description = "状态: active/completed/cancelled，默认 active"),
        ("category" = Option<String>, Query, description = "分类"),
        ("featured" = Option<bool>, Query, description = "只看精选项目")
    ),
    responses(
        (status = 200, description = "获取项目列表成功", body = [CampaignResponse]),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn list_campaigns(
    campaign_service: web::Data<CampaignService>,
    query: web::Query<CampaignQuery>,
) -> Result<HttpResponse> {
    match campaign_service.list_public(&query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::paginated(page))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/campaigns/{slug}",
    tag = "campaign",
    params(
        ("slug" = String, Path, description = "项目 slug")
    ),
    responses(
        (status = 200, description = "获取项目详情成功", body = CampaignResponse),
        (status = 404, description = "项目不存在")
    )
)]
pub async fn get_campaign(
    campaign_service: web::Data<CampaignService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match campaign_service.get_public(&path).await {
        Ok(campaign) => Ok(HttpResponse::Ok().json(ApiResponse::success(campaign))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/campaigns/{slug}/donations",
    tag = "campaign",
    params(
        ("slug" = String, Path, description = "项目 slug"),
        ("page" = Option<u64>, Query, description = "页码"),
        ("limit" = Option<u64>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取捐款人名单成功", body = [PublicDonationResponse]),
        (status = 404, description = "项目不存在")
    )
)]
pub async fn get_campaign_donations(
    donation_service: web::Data<DonationService>,
    path: web::Path<String>,
    query: web::Query<DonorWallQuery>,
) -> Result<HttpResponse> {
    match donation_service
        .list_public_for_campaign(&path, &query)
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::paginated(page))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn campaign_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/campaigns")
            .route("", web::get().to(list_campaigns))
            .route("/{slug}", web::get().to(get_campaign))
            .route("/{slug}/donations", web::get().to(get_campaign_donations)),
    );
}
