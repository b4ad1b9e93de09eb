pub mod airtable;
pub mod formula;
pub mod keyring;
pub mod record;

use thiserror::Error;

use crate::config::Settings;
use crate::core::draft::PayloadError;
use crate::core::user::UserDirectory;
use airtable::AirtableClient;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store is not configured: missing {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid URL: {0}")]
    Url(String),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// A connected client plus the users loaded when it connected.
pub struct Connection {
    pub client: AirtableClient,
    pub users: UserDirectory,
}

/// Build a client from settings and load the users table once.
///
/// A failed users load is logged and leaves the directory empty; task
/// operations still work without it.
pub async fn connect(settings: &Settings, api_key: &str) -> Result<Connection, StoreError> {
    let mut client = AirtableClient::new(
        api_key,
        &settings.base_id,
        &settings.table_name,
        &settings.users_table,
    )?;
    if let Some(url) = settings.api_url.as_deref() {
        client = client.with_api_url(url);
    }

    let users = match client.list_users().await {
        Ok(users) => {
            log::info!("Loaded {} users", users.len());
            users
        }
        Err(e) => {
            log::error!("Failed to load users: {}", e);
            Vec::new()
        }
    };

    Ok(Connection {
        client,
        users: UserDirectory::new(users),
    })
}
