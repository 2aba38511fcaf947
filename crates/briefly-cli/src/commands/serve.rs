use anyhow::Result;

use briefly_core::AppConfig;

pub async fn run(mut config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    briefly_server::serve(&config).await
}
