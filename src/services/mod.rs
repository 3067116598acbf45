pub mod campaign_progress;
pub mod campaign_service;
pub mod donation_service;
pub mod stats_service;

pub use campaign_progress::{CampaignProgress, DonationError};
pub use campaign_service::*;
pub use donation_service::*;
pub use stats_service::*;
