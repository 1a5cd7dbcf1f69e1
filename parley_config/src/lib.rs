mod schema;

pub use schema::{
    Config, DatabaseConfig, ProviderConfig, RateLimitConfig, TelegramConfig, env_keys,
};
