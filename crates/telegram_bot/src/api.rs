use api_types::{
    platform::Sighting,
    tip::{TipMessage, TipReply},
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
}

impl ApiClient {
    pub(crate) fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn post_json<TReq: serde::Serialize + ?Sized, TResp: for<'de> serde::Deserialize<'de>>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<TResp, ApiError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<TResp>().await?);
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.error,
            Err(_) => "server error".to_string(),
        };
        Err(ApiError::Server { status, message })
    }

    async fn post_json_unit<TReq: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &TReq,
    ) -> Result<(), ApiError> {
        let resp = self.client.post(self.url(path)).json(body).send().await?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }

        let message = match resp.json::<ErrorBody>().await {
            Ok(err) => err.error,
            Err(_) => "server error".to_string(),
        };
        Err(ApiError::Server { status, message })
    }

    /// Forwards a comment to the tip pipeline. `None` means the text was not
    /// a tip command.
    pub(crate) async fn send_tip(
        &self,
        text: &str,
        sender_platform_id: i64,
        sender_username: &str,
    ) -> Result<Option<String>, ApiError> {
        let response: TipReply = self
            .post_json(
                "/tip",
                &TipMessage {
                    text: text.to_string(),
                    sender_platform_id,
                    sender_username: sender_username.to_string(),
                },
            )
            .await?;

        Ok(response.reply)
    }

    /// Reports a message author sighting.
    pub(crate) async fn record_sighting(
        &self,
        platform_id: i64,
        username: &str,
    ) -> Result<(), ApiError> {
        self.post_json_unit(
            "/platform/seen",
            &Sighting {
                platform_id,
                username: username.to_string(),
            },
        )
        .await
    }
}
