use chrono::NaiveDate;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::StoreError;
use super::formula::{all_of, filter_formula};
use super::record::{
    Record, RecordPage, field, payload_to_fields, record_to_task, record_to_user, update_to_fields,
};
use crate::core::draft::{TaskPayload, TaskUpdate};
use crate::core::task::Task;
use crate::core::user::User;
use crate::core::view::{ListFilter, collect_labels};

pub const DEFAULT_API_URL: &str = "https://api.airtable.com";

/// REST client for one base: a tasks table and a users table.
#[derive(Clone)]
pub struct AirtableClient {
    api_url: String,
    api_key: String,
    base_id: String,
    tasks_table: String,
    users_table: String,
    http: Client,
}

impl AirtableClient {
    pub fn new(
        api_key: &str,
        base_id: &str,
        tasks_table: &str,
        users_table: &str,
    ) -> Result<Self, StoreError> {
        if api_key.trim().is_empty() {
            return Err(StoreError::NotConfigured("API key"));
        }
        if base_id.trim().is_empty() {
            return Err(StoreError::NotConfigured("base id"));
        }
        let http = Client::builder().build()?;
        Ok(Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.trim().to_string(),
            base_id: base_id.trim().to_string(),
            tasks_table: tasks_table.to_string(),
            users_table: users_table.to_string(),
            http,
        })
    }

    /// Point the client at another endpoint (proxy or local stub).
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self
    }

    /// `{api}/v0/{base}/{table}[/{record}]`, segments percent-encoded.
    pub fn table_url(&self, table: &str, record_id: Option<&str>) -> Result<Url, StoreError> {
        let mut url = Url::parse(&self.api_url).map_err(|e| StoreError::Url(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Url(format!("{} cannot be a base URL", self.api_url)))?;
            segments.pop_if_empty().extend(["v0", self.base_id.as_str(), table]);
            if let Some(id) = record_id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.api_key)
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, StoreError> {
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Every record matching `formula`, following the pagination cursor.
    async fn list_records(
        &self,
        table: &str,
        formula: Option<&str>,
        newest_first: bool,
    ) -> Result<Vec<Record>, StoreError> {
        let url = self.table_url(table, None)?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query: Vec<(&str, &str)> = Vec::new();
            if let Some(f) = formula {
                query.push(("filterByFormula", f));
            }
            if newest_first {
                query.push(("sort[0][field]", field::CREATED));
                query.push(("sort[0][direction]", "desc"));
            }
            if let Some(o) = offset.as_deref() {
                query.push(("offset", o));
            }

            let page: RecordPage = self
                .send(self.request(Method::GET, url.clone()).query(&query))
                .await?;
            log::debug!("Fetched {} records from {}", page.records.len(), table);
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    /// All rows of the users table, in table order.
    pub async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let records = self.list_records(&self.users_table, None, false).await?;
        Ok(records.iter().map(record_to_user).collect())
    }

    /// Tasks for a list, newest first. `extra` predicates are AND-ed on.
    pub async fn list_tasks(
        &self,
        filter: ListFilter,
        extra: &[String],
        today: NaiveDate,
    ) -> Result<Vec<Task>, StoreError> {
        let mut parts: Vec<String> = filter_formula(filter, today).into_iter().collect();
        parts.extend(extra.iter().cloned());
        let formula = all_of(&parts);

        let records = self
            .list_records(&self.tasks_table, formula.as_deref(), true)
            .await?;
        Ok(records.iter().map(record_to_task).collect())
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, StoreError> {
        let url = self.table_url(&self.tasks_table, Some(id))?;
        let record: Record = self.send(self.request(Method::GET, url)).await?;
        Ok(record_to_task(&record))
    }

    pub async fn create_task(&self, payload: &TaskPayload) -> Result<Task, StoreError> {
        payload.validate()?;
        let url = self.table_url(&self.tasks_table, None)?;
        let body = json!({ "records": [{ "fields": payload_to_fields(payload) }] });

        let page: RecordPage = self
            .send(self.request(Method::POST, url).json(&body))
            .await?;
        let record = page
            .records
            .first()
            .ok_or_else(|| StoreError::Api {
                status: 200,
                body: "create returned no records".to_string(),
            })?;
        log::info!("Created task {}", record.id);
        Ok(record_to_task(record))
    }

    pub async fn update_task(
        &self,
        id: &str,
        update: &TaskUpdate,
        today: NaiveDate,
    ) -> Result<Task, StoreError> {
        let fields: Map<String, Value> = update_to_fields(update, today);
        let url = self.table_url(&self.tasks_table, Some(id))?;
        let record: Record = self
            .send(self.request(Method::PATCH, url).json(&json!({ "fields": fields })))
            .await?;
        log::info!("Updated task {}", id);
        Ok(record_to_task(&record))
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let url = self.table_url(&self.tasks_table, Some(id))?;
        let _: Value = self.send(self.request(Method::DELETE, url)).await?;
        log::info!("Deleted task {}", id);
        Ok(())
    }

    /// Every label in use across all tasks, sorted.
    pub async fn labels(&self, today: NaiveDate) -> Result<Vec<String>, StoreError> {
        let tasks = self.list_tasks(ListFilter::All, &[], today).await?;
        Ok(collect_labels(&tasks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AirtableClient {
        AirtableClient::new("key", "appBase", "Tasks", "Discord Users").unwrap()
    }

    #[test]
    fn urls_are_encoded() {
        let c = client();
        assert_eq!(
            c.table_url("Discord Users", None).unwrap().as_str(),
            "https://api.airtable.com/v0/appBase/Discord%20Users"
        );
        assert_eq!(
            c.table_url("Tasks", Some("rec123")).unwrap().as_str(),
            "https://api.airtable.com/v0/appBase/Tasks/rec123"
        );
    }

    #[test]
    fn custom_endpoint() {
        let c = client().with_api_url("http://localhost:8080/");
        assert_eq!(
            c.table_url("Tasks", None).unwrap().as_str(),
            "http://localhost:8080/v0/appBase/Tasks"
        );
    }

    #[test]
    fn missing_credentials() {
        assert!(matches!(
            AirtableClient::new("", "appBase", "Tasks", "Users"),
            Err(StoreError::NotConfigured(_))
        ));
        assert!(matches!(
            AirtableClient::new("key", " ", "Tasks", "Users"),
            Err(StoreError::NotConfigured(_))
        ));
    }
}
