//! Staff access service
//!
//! Reads configuration from a TOML file
//! (`$STAFF_ACCESS_CONFIG`, else ~/.config/staff-access/config.toml).

use tracing::{error, info};

use staff_access::config::{default_config_path, AppConfig};
use staff_access::server::{init_tracing, run};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = default_config_path();
    let config = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            init_tracing(&cfg);
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            let cfg = AppConfig::default();
            init_tracing(&cfg);
            error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };

    run(config).await
}
