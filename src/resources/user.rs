use crate::core::http::{HttpClient, UploadFile};
use crate::core::params::Params;
use crate::domain::model::UserProfile;
use crate::resources::{merge_object, require_id};
use crate::utils::error::{JewelMusicError, Result};
use crate::utils::validation::validate_non_empty_string;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Account, API key and billing management for the authenticated user.
#[derive(Debug, Clone, Copy)]
pub struct User<'a> {
    http: &'a HttpClient,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub social_links: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_info: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub notifications: HashMap<String, bool>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub ui: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Value>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub api: HashMap<String, i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyPermissions {
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_restrictions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKeyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ip_restrictions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStatsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_breakdown: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_invoices: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice_status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingUpdate {
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub payment_method: HashMap<String, String>,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub billing_address: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDataOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_metadata: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_tracks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_analytics: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl<'a> User<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn profile(&self) -> Result<UserProfile> {
        self.http.get("/user/profile", &Params::new()).await
    }

    pub async fn update_profile(&self, updates: &ProfileUpdate) -> Result<UserProfile> {
        self.http.put("/user/profile", updates).await
    }

    pub async fn upload_avatar(&self, avatar: &UploadFile) -> Result<Value> {
        self.http.upload("/user/avatar", avatar, &Params::new()).await
    }

    pub async fn preferences(&self) -> Result<Value> {
        self.http.get("/user/preferences", &Params::new()).await
    }

    pub async fn update_preferences(&self, preferences: &Preferences) -> Result<Value> {
        self.http.put("/user/preferences", preferences).await
    }

    pub async fn api_keys(&self) -> Result<Vec<Value>> {
        self.http.get("/user/api-keys", &Params::new()).await
    }

    /// The full key is only present in this response.
    pub async fn create_api_key(&self, name: &str, permissions: &ApiKeyPermissions) -> Result<Value> {
        validate_non_empty_string("name", name)?;
        if permissions.scopes.is_empty() {
            return Err(JewelMusicError::missing_fields(["scopes"]));
        }
        let mut body = json!({ "name": name });
        merge_object(&mut body, serde_json::to_value(permissions)?);
        self.http.post("/user/api-keys", &body).await
    }

    pub async fn update_api_key(&self, key_id: &str, updates: &ApiKeyUpdate) -> Result<Value> {
        let id = require_id("key_id", key_id)?;
        self.http.put(&format!("/user/api-keys/{}", id), updates).await
    }

    pub async fn revoke_api_key(&self, key_id: &str) -> Result<Value> {
        let id = require_id("key_id", key_id)?;
        self.http.delete(&format!("/user/api-keys/{}", id)).await
    }

    pub async fn usage_stats(&self, options: Option<&UsageStatsOptions>) -> Result<Value> {
        let params = Params::from_serializable(&options)?;
        self.http.get("/user/usage", &params).await
    }

    pub async fn billing(&self, options: Option<&BillingOptions>) -> Result<Value> {
        let params = Params::from_serializable(&options)?;
        self.http.get("/user/billing", &params).await
    }

    pub async fn update_billing(&self, billing: &BillingUpdate) -> Result<Value> {
        self.http.put("/user/billing", billing).await
    }

    pub async fn download_invoice(&self, invoice_id: &str, format: &str) -> Result<Value> {
        let id = require_id("invoice_id", invoice_id)?;
        let mut params = Params::new();
        params.push("format", format);
        self.http
            .get(&format!("/user/billing/invoices/{}", id), &params)
            .await
    }

    pub async fn limits(&self) -> Result<Value> {
        self.http.get("/user/limits", &Params::new()).await
    }

    /// Permanently delete the account. `confirm_email` must match the account email.
    pub async fn delete_account(&self, confirm_email: &str, reason: Option<&str>, delete_data: bool) -> Result<Value> {
        validate_non_empty_string("confirmEmail", confirm_email)?;
        let body = json!({
            "confirmEmail": confirm_email,
            "reason": reason,
            "deleteData": delete_data,
        });
        self.http.delete_with_body("/user/account", &body).await
    }

    pub async fn export_data(&self, options: Option<&ExportDataOptions>) -> Result<Value> {
        let body = match options {
            Some(options) => serde_json::to_value(options)?,
            None => json!({}),
        };
        self.http.post("/user/export", &body).await
    }
}
