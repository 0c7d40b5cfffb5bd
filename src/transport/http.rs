//! `SessionApi` over HTTP with `reqwest`.

use std::time::Duration;

use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::common::{PlayerId, SessionError};
use crate::config::{BEACON_TIMEOUT, REQUEST_TIMEOUT};
use crate::protocol::{
    GameStateResponse, HitRequest, HitResponse, JoinRequest, JoinResponse, PlaceShipsRequest,
    PlayersResponse, ReadyEntry,
};
use crate::transport::SessionApi;

#[derive(Clone)]
pub struct HttpSessionApi {
    client: Client,
    base_url: String,
    beacon_timeout: Duration,
}

impl HttpSessionApi {
    /// Client for the server rooted at `base_url`, e.g. `https://host/api/v1`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, SessionError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(network)?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            beacon_timeout: BEACON_TIMEOUT,
        })
    }

    pub fn with_beacon_timeout(mut self, timeout: Duration) -> Self {
        self.beacon_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(request: RequestBuilder) -> Result<Response, SessionError> {
        let response = request.send().await.map_err(network)?;
        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::UnexpectedServerResponse(format!(
                "HTTP {}",
                status
            )));
        }
        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, SessionError> {
        let response = Self::send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| SessionError::UnexpectedServerResponse(e.to_string()))
    }
}

fn network(err: reqwest::Error) -> SessionError {
    SessionError::NetworkFailure(err.to_string())
}

#[async_trait::async_trait]
impl SessionApi for HttpSessionApi {
    async fn join(&self, player: &PlayerId, request: JoinRequest) -> Result<JoinResponse, SessionError> {
        Self::fetch(
            self.client
                .post(self.url("session/join"))
                .query(&[("player_id", player.as_str())])
                .json(&request),
        )
        .await
    }

    async fn players(&self) -> Result<PlayersResponse, SessionError> {
        Self::fetch(self.client.get(self.url("session/join"))).await
    }

    async fn place_ships(&self, player: &PlayerId, request: PlaceShipsRequest) -> Result<(), SessionError> {
        Self::send(
            self.client
                .post(self.url("session/placeShips"))
                .query(&[("player_id", player.as_str())])
                .json(&request),
        )
        .await
        .map(|_| ())
    }

    async fn ready_states(&self) -> Result<Vec<ReadyEntry>, SessionError> {
        Self::fetch(self.client.get(self.url("session/ready"))).await
    }

    async fn game_state(&self, player: &PlayerId) -> Result<GameStateResponse, SessionError> {
        Self::fetch(
            self.client
                .get(self.url("game/state"))
                .query(&[("player_id", player.as_str())]),
        )
        .await
    }

    async fn hit(&self, player: &PlayerId, request: HitRequest) -> Result<HitResponse, SessionError> {
        Self::fetch(
            self.client
                .post(self.url("game/hit"))
                .query(&[("player_id", player.as_str())])
                .json(&request),
        )
        .await
    }

    async fn leave(&self, player: &PlayerId) -> Result<(), SessionError> {
        Self::send(
            self.client
                .delete(self.url("session/join"))
                .query(&[("player_id", player.as_str())]),
        )
        .await
        .map(|_| ())
    }

    fn send_departure_beacon(&self, player: &PlayerId) {
        let request = self
            .client
            .delete(self.url("session/join"))
            .query(&[("player_id", player.as_str())])
            .timeout(self.beacon_timeout);
        let player = player.clone();

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = request.send().await {
                    debug!("[HttpSessionApi] departure beacon for {} lost: {}", player, e);
                }
            });
            return;
        }

        // No runtime to spawn on: block briefly on a private one.
        match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => {
                if let Err(e) = runtime.block_on(request.send()) {
                    debug!("[HttpSessionApi] departure beacon for {} lost: {}", player, e);
                }
            }
            Err(e) => warn!("[HttpSessionApi] no runtime for departure beacon: {}", e),
        }
    }
}
