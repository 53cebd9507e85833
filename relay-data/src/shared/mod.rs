pub mod de;
pub mod subscription_models;
