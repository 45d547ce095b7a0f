use reqwest::{StatusCode, Url};
use serde::Serialize;

use autosales_inventory::{Vehicle, VehicleId, VehicleStatus};

use super::{InventoryClient, InventoryError};
use crate::config::InventoryConfig;

/// reqwest-backed inventory client.
///
/// Every call is a single attempt bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct HttpInventoryClient {
    http: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

impl HttpInventoryClient {
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| InventoryError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    /// `{base}/vehicles[/segments...]`, with each segment percent-encoded.
    fn vehicles_url(&self, segments: &[&str]) -> Result<Url, InventoryError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| InventoryError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty().push("vehicles");
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, InventoryError> {
        let response = request.send().await.map_err(transport_error)?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(InventoryError::NotFound),
            status if !status.is_success() => Err(InventoryError::Status(status.as_u16())),
            _ => Ok(response),
        }
    }
}

fn transport_error(err: reqwest::Error) -> InventoryError {
    if err.is_timeout() {
        InventoryError::Transport("timed out".to_string())
    } else {
        InventoryError::Transport(err.to_string())
    }
}

#[async_trait::async_trait]
impl InventoryClient for HttpInventoryClient {
    async fn get_vehicle(&self, id: &VehicleId) -> Result<Vehicle, InventoryError> {
        let url = self.vehicles_url(&[id.as_str()])?;
        let response = self.send(self.http.get(url)).await?;
        response
            .json::<Vehicle>()
            .await
            .map_err(|e| InventoryError::Decode(e.to_string()))
    }

    async fn list_available_vehicles(&self) -> Result<Vec<Vehicle>, InventoryError> {
        let url = self.vehicles_url(&[])?;
        let request = self
            .http
            .get(url)
            .query(&[("status", VehicleStatus::Available.as_str())]);
        let response = self.send(request).await?;
        response
            .json::<Vec<Vehicle>>()
            .await
            .map_err(|e| InventoryError::Decode(e.to_string()))
    }

    async fn mark_sold(&self, id: &VehicleId) -> Result<(), InventoryError> {
        let url = self.vehicles_url(&[id.as_str(), "status"])?;
        let body = StatusUpdate {
            status: VehicleStatus::Sold.as_str(),
        };
        self.send(self.http.patch(url).json(&body)).await?;
        Ok(())
    }
}
