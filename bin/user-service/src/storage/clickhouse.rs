use reqwest::header::{HeaderMap, HeaderValue};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;
use user_service_config::storage::ClickHouseConfig;

use crate::messages::User;
use crate::storage::{StorageError, UserStore};

const USER_HEADER: &str = "x-clickhouse-user";
const KEY_HEADER: &str = "x-clickhouse-key";

const FIND_USER_QUERY: &str = "SELECT id, username, email FROM users WHERE id = {id:Int64}";
const LIST_USERS_QUERY: &str = "SELECT id, username, email FROM users ORDER BY id LIMIT {limit:UInt64} OFFSET {offset:UInt64}";
const COUNT_USERS_QUERY: &str = "SELECT count(*) AS cnt FROM users";
const INSERT_USER_QUERY: &str =
    "INSERT INTO users (username, email) SELECT {username:String}, {email:String}";

/// Talks to ClickHouse over its HTTP interface. Values are always bound as
/// typed query parameters, never spliced into the SQL text.
#[derive(Debug)]
pub struct ClickHouseUserStore {
    client: reqwest::blocking::Client,
    endpoint: String,
    database: String,
}

#[derive(Deserialize)]
struct CountRow {
    cnt: u64,
}

impl ClickHouseUserStore {
    /// Must be called outside of an async context.
    pub fn new(config: &ClickHouseConfig) -> Result<Self, StorageError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_HEADER, header_value(&config.user)?);
        if !config.password.is_empty() {
            let mut key = header_value(&config.password)?;
            key.set_sensitive(true);
            headers.insert(KEY_HEADER, key);
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| StorageError::ClientCreation(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/", config.url.trim_end_matches('/')),
            database: config.database.clone(),
        })
    }

    fn execute(&self, query: &str, params: &[(&str, String)]) -> Result<String, StorageError> {
        let mut url_params = vec![
            ("database".to_string(), self.database.clone()),
            (
                "output_format_json_quote_64bit_integers".to_string(),
                "0".to_string(),
            ),
        ];
        url_params.extend(
            params
                .iter()
                .map(|(name, value)| (format!("param_{name}"), value.clone())),
        );

        debug!(query, "executing clickhouse query");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&url_params)
            .body(query.to_string())
            .send()
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        if !status.is_success() {
            return Err(StorageError::UnexpectedStatus {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        Ok(body)
    }

    fn select<T: DeserializeOwned>(
        &self,
        query: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, StorageError> {
        let body = self.execute(&format!("{query} FORMAT JSONEachRow"), params)?;

        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(|err| StorageError::Decode(err.to_string())))
            .collect()
    }
}

fn header_value(value: &str) -> Result<HeaderValue, StorageError> {
    HeaderValue::from_str(value).map_err(|err| StorageError::ClientCreation(err.to_string()))
}

impl UserStore for ClickHouseUserStore {
    fn find_user(&self, id: i64) -> Result<Option<User>, StorageError> {
        let rows = self.select::<User>(FIND_USER_QUERY, &[("id", id.to_string())])?;
        Ok(rows.into_iter().next())
    }

    fn list_users(&self, limit: u64, offset: u64) -> Result<Vec<User>, StorageError> {
        self.select(
            LIST_USERS_QUERY,
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
    }

    fn count_users(&self) -> Result<u64, StorageError> {
        let rows = self.select::<CountRow>(COUNT_USERS_QUERY, &[])?;
        Ok(rows.first().map(|row| row.cnt).unwrap_or(0))
    }

    fn insert_user(&self, username: &str, email: &str) -> Result<(), StorageError> {
        self.execute(
            INSERT_USER_QUERY,
            &[
                ("username", username.to_string()),
                ("email", email.to_string()),
            ],
        )
        .map(|_| ())
    }
}
