use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{CampaignStatus, DonationStatus, PaymentMethod};
use crate::handlers;
use crate::models::*;
use crate::services::CampaignProgress;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::campaign::list_campaigns,
        handlers::campaign::get_campaign,
        handlers::campaign::get_campaign_donations,
        handlers::donation::submit_donation,
        handlers::donation::get_receipt,
        handlers::admin::list_campaigns,
        handlers::admin::create_campaign,
        handlers::admin::get_campaign,
        handlers::admin::update_campaign,
        handlers::admin::change_campaign_status,
        handlers::admin::delete_campaign,
        handlers::admin::list_donations,
        handlers::admin::get_donation,
        handlers::admin::complete_donation,
        handlers::admin::fail_donation,
        handlers::admin::refund_donation,
        handlers::admin::delete_donation,
        handlers::admin::get_stats,
    ),
    components(
        schemas(
            CampaignStatus,
            DonationStatus,
            PaymentMethod,
            CampaignProgress,
            CampaignResponse,
            CampaignQuery,
            CreateCampaignRequest,
            UpdateCampaignRequest,
            CampaignStatusRequest,
            CreateDonationRequest,
            DonationReceiptResponse,
            PublicDonationResponse,
            DonationResponse,
            DonationQuery,
            DonorWallQuery,
            DashboardStats,
            CampaignStatusCounts,
            CurrencyTotal,
            Pagination,
        )
    ),
    tags(
        (name = "campaign", description = "Public campaign API"),
        (name = "donation", description = "Public donation API"),
        (name = "admin", description = "Campaign and donation administration API"),
    ),
    info(
        title = "Pesantren Donations API",
        version = "1.0.0",
        description = "Donation campaigns and progress tracking for pesantren fundraising"
    ),
    servers(
        (url = "/api", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
