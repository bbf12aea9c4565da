use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::errors::{DestinationError, Result};

pub const DEFAULT_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

const QUERY_TIMEOUT_MS: u64 = 10_000;
const POLL_INTERVAL: Duration = Duration::from_millis(500);
const MAX_POLLS: u32 = 240;

/// Minimal BigQuery REST client: `jobs.query` and `tabledata.insertAll`.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    http: reqwest::Client,
    api_base: String,
    project: String,
    access_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    use_legacy_sql: bool,
    timeout_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    query_parameters: Vec<QueryParameter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parameter_mode: Option<&'static str>,
}

/// Named `STRING` query parameter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameter {
    name: String,
    parameter_type: ParameterType,
    parameter_value: ParameterValue,
}

impl QueryParameter {
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter_type: ParameterType { kind: "STRING" },
            parameter_value: ParameterValue {
                value: value.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ParameterType {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ParameterValue {
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResponse {
    #[serde(default)]
    job_complete: bool,
    job_reference: Option<JobReference>,
    #[serde(default)]
    rows: Vec<TableRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    #[serde(default)]
    f: Vec<TableCell>,
}

#[derive(Debug, Deserialize)]
struct TableCell {
    #[serde(default)]
    v: Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllRequest {
    skip_invalid_rows: bool,
    rows: Vec<InsertRow>,
}

#[derive(Serialize)]
struct InsertRow {
    json: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertAllResponse {
    #[serde(default)]
    insert_errors: Vec<InsertError>,
}

#[derive(Debug, Deserialize)]
struct InsertError {
    #[serde(default)]
    index: u64,
    #[serde(default)]
    errors: Vec<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl BigQueryClient {
    pub fn new(
        api_base: impl Into<String>,
        project: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
            project: project.into(),
            access_token: access_token.into(),
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Run a standard-SQL statement and return the first column of each result row.
    pub async fn query_first_column(
        &self,
        sql: &str,
        parameters: Vec<QueryParameter>,
    ) -> Result<Vec<Value>> {
        let parameter_mode = (!parameters.is_empty()).then_some("NAMED");
        let request = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            timeout_ms: QUERY_TIMEOUT_MS,
            query_parameters: parameters,
            parameter_mode,
        };
        let url = format!("{}/projects/{}/queries", self.api_base, self.project);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        let mut result: QueryResponse = decode(response).await?;

        let mut polls = 0;
        while !result.job_complete {
            let job = result
                .job_reference
                .take()
                .ok_or_else(|| DestinationError::Api {
                    status: 200,
                    message: "incomplete query without a job reference".to_string(),
                })?;
            if polls >= MAX_POLLS {
                return Err(DestinationError::Api {
                    status: 200,
                    message: format!("query job {} did not complete", job.job_id),
                });
            }
            polls += 1;
            debug!(event = "query_polling", job_id = %job.job_id, polls);
            tokio::time::sleep(POLL_INTERVAL).await;
            result = self.query_results(&job).await?;
            result.job_reference.get_or_insert(job);
        }

        Ok(result
            .rows
            .into_iter()
            .filter_map(|row| row.f.into_iter().next().map(|cell| cell.v))
            .collect())
    }

    async fn query_results(&self, job: &JobReference) -> Result<QueryResponse> {
        let url = format!(
            "{}/projects/{}/queries/{}",
            self.api_base, self.project, job.job_id
        );
        let mut query = vec![("timeoutMs", QUERY_TIMEOUT_MS.to_string())];
        if let Some(location) = &job.location {
            query.push(("location", location.clone()));
        }
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()
            .await?;
        decode(response).await
    }

    /// Stream rows with `tabledata.insertAll`. Any rejected row fails the call.
    pub async fn insert_all(
        &self,
        dataset: &str,
        table: &str,
        rows: Vec<Map<String, Value>>,
    ) -> Result<u64> {
        let count = rows.len() as u64;
        let request = InsertAllRequest {
            skip_invalid_rows: false,
            rows: rows.into_iter().map(|json| InsertRow { json }).collect(),
        };
        let url = format!(
            "{}/projects/{}/datasets/{}/tables/{}/insertAll",
            self.api_base, self.project, dataset, table
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let result: InsertAllResponse = decode(response).await?;
        if let Some(first) = result.insert_errors.first() {
            let detail = first
                .errors
                .iter()
                .map(|err| format!("{}: {}", err.reason, err.message))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(DestinationError::Api {
                status,
                message: format!(
                    "{} of {count} rows rejected (row {}: {detail})",
                    result.insert_errors.len(),
                    first.index
                ),
            });
        }
        Ok(count)
    }
}

async fn decode<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|envelope| envelope.error.message)
            .unwrap_or(body);
        return Err(DestinationError::Api {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_str(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_request_uses_named_parameters() {
        let request = QueryRequest {
            query: "select 1",
            use_legacy_sql: false,
            timeout_ms: QUERY_TIMEOUT_MS,
            query_parameters: vec![QueryParameter::string("table", "users")],
            parameter_mode: Some("NAMED"),
        };
        let encoded = serde_json::to_value(&request).expect("encode");
        assert_eq!(encoded["useLegacySql"], Value::Bool(false));
        assert_eq!(encoded["parameterMode"], "NAMED");
        assert_eq!(encoded["queryParameters"][0]["parameterType"]["type"], "STRING");
        assert_eq!(encoded["queryParameters"][0]["parameterValue"]["value"], "users");
    }

    #[test]
    fn parses_query_rows() {
        let body = r#"{
            "jobComplete": true,
            "jobReference": {"jobId": "job_1", "location": "US"},
            "rows": [{"f": [{"v": "id"}]}, {"f": [{"v": "user_name"}]}]
        }"#;
        let response: QueryResponse = serde_json::from_str(body).expect("decode");
        assert!(response.job_complete);
        let names: Vec<_> = response
            .rows
            .into_iter()
            .filter_map(|row| row.f.into_iter().next())
            .map(|cell| cell.v)
            .collect();
        assert_eq!(names, vec![Value::from("id"), Value::from("user_name")]);
    }

    #[test]
    fn insert_errors_default_to_empty() {
        let response: InsertAllResponse = serde_json::from_str(r#"{"kind": "x"}"#).expect("decode");
        assert!(response.insert_errors.is_empty());
    }
}
