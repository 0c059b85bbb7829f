use std::time::Duration;

use api_types::{ErrorBody, summary::SummaryResponse, transaction::TransactionRecord};
use ledger::{Summary, Transaction, TransactionId, UserId};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use crate::{
    NewTransaction, RemoteError, RemoteLedger,
    wire::{new_transaction_body, summary_from_response, transaction_from_record},
};

/// Remote ledger over its JSON REST API.
#[derive(Debug, Clone)]
pub struct HttpLedger {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpLedger {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:5001/api`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RemoteError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|err| RemoteError::InvalidEndpoint(format!("{base_url}: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::InvalidEndpoint(base_url.to_string()));
        }
        base_url.set_query(None);
        base_url.set_fragment(None);

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| RemoteError::Network(err.to_string()))?;

        Ok(Self { base_url, http })
    }

    /// Appends path segments to the API root, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::InvalidEndpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let res = request.send().await.map_err(network_error)?;
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }

        let reason = res
            .json::<ErrorBody>()
            .await
            .map(|body| body.error)
            .unwrap_or_else(|_| "unknown error".to_string());
        tracing::debug!(status = status.as_u16(), %reason, "remote ledger rejected request");
        Err(RemoteError::Rejected {
            status: status.as_u16(),
            reason,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, RemoteError> {
        let endpoint = self.endpoint(segments)?;
        tracing::debug!(%endpoint, "GET");
        let res = self.send(self.http.get(endpoint)).await?;
        res.json::<T>().await.map_err(network_error)
    }
}

fn network_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        return RemoteError::Network(format!("request timed out: {err}"));
    }
    if err.is_decode() {
        return RemoteError::Network(format!("unreadable response: {err}"));
    }
    RemoteError::Network(err.to_string())
}

impl RemoteLedger for HttpLedger {
    async fn fetch_transactions(&self, user: &UserId) -> Result<Vec<Transaction>, RemoteError> {
        let records: Vec<TransactionRecord> =
            self.get_json(&["transactions", user.as_str()]).await?;
        Ok(records.into_iter().map(transaction_from_record).collect())
    }

    async fn fetch_summary(&self, user: &UserId) -> Result<Summary, RemoteError> {
        let response: SummaryResponse = self
            .get_json(&["transactions", "summary", user.as_str()])
            .await?;
        Ok(summary_from_response(&response, user))
    }

    async fn create(&self, new: &NewTransaction) -> Result<Transaction, RemoteError> {
        let endpoint = self.endpoint(&["transactions"])?;
        tracing::debug!(%endpoint, "POST");
        let body = new_transaction_body(new);
        let res = self.send(self.http.post(endpoint).json(&body)).await?;
        let record = res
            .json::<TransactionRecord>()
            .await
            .map_err(network_error)?;
        Ok(transaction_from_record(record))
    }

    async fn delete(&self, id: &TransactionId) -> Result<(), RemoteError> {
        let endpoint = self.endpoint(&["transactions", id.as_str()])?;
        tracing::debug!(%endpoint, "DELETE");
        self.send(self.http.delete(endpoint)).await?;
        Ok(())
    }
}
