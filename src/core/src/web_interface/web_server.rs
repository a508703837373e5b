use std::net::{IpAddr, SocketAddr};

use log::info;

use super::routes::{routes, AppState};
use crate::configuration::ServerConfig;
use crate::error_handling::types::WebError;

/// Web server for the session HTTP API
pub struct WebServer {
    state: AppState,
    address: SocketAddr,
}

impl WebServer {
    /// Create a new WebServer bound to the configured address
    pub fn new(state: AppState, config: &ServerConfig) -> Result<Self, WebError> {
        let ip: IpAddr = config
            .bind_address
            .parse()
            .map_err(|e| WebError::InvalidAddress(format!("{}: {}", config.bind_address, e)))?;
        Ok(Self {
            state,
            address: SocketAddr::new(ip, config.port),
        })
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    /// Serve until the returned future is dropped
    pub async fn start(self) -> Result<(), WebError> {
        info!("HTTP API listening on http://{}", self.address);
        warp::serve(routes(self.state)).run(self.address).await;
        Ok(())
    }
}
