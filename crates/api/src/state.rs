use services::AppServices;

use crate::auth::JwtService;
use crate::config::Config;

/// Shared by every handler behind an `Arc`.
pub struct AppState {
    pub config: Config,
    pub services: AppServices,
    pub jwt: JwtService,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, services: AppServices) -> Self {
        let jwt = JwtService::new(&config.jwt_secret);
        Self {
            config,
            services,
            jwt,
        }
    }
}
