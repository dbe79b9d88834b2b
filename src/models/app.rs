//! App (storefront) request/response models.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::entities::apps;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppRequest {
    pub title: String,
    pub slug: String,
    pub company_name: String,
    pub email: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppResponse {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub company_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
    pub owner_id: i32,
    pub created_at: DateTime<FixedOffset>,
}

impl From<apps::Model> for AppResponse {
    fn from(app: apps::Model) -> Self {
        Self {
            id: app.id,
            title: app.title,
            slug: app.slug,
            company_name: app.company_name,
            email: app.email,
            description: app.description,
            logo_path: app.logo_path,
            owner_id: app.owner_id,
            created_at: app.created_at,
        }
    }
}
