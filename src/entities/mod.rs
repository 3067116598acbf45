pub mod campaigns;
pub mod donations;

pub use campaigns as campaign_entity;
pub use donations as donation_entity;

pub use campaigns::CampaignStatus;
pub use donations::{DonationStatus, PaymentMethod};
