//! Environment configuration.
//!
//! Every setting has a default, so an empty environment yields a working single-node
//! service (in-memory store and cache, log-only broker). `main` loads a `.env` file with
//! `dotenvy` before calling [`AppConfig::from_env`].

use crate::cache::CachePolicy;
use crate::lifecycle::PipelineSettings;
use crate::store::PoolSettings;
use order_pipeline::RetryPolicy;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub pool: PoolSettings,
    pub redis_url: Option<String>,
    pub product_service_url: String,
    pub catalog_timeout: Duration,
    pub broker_url: Option<String>,
    pub pipeline: PipelineSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            database_url: None,
            pool: PoolSettings::default(),
            redis_url: None,
            product_service_url: "http://localhost:3000".to_string(),
            catalog_timeout: Duration::from_millis(2000),
            broker_url: None,
            pipeline: PipelineSettings::default(),
        }
    }
}

impl AppConfig {
    /// Reads the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for unparsable numbers and for a zero queue capacity,
    /// worker count, attempt count or pool size.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`AppConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env { lookup };
        let defaults = Self::default();
        let pipeline_defaults = defaults.pipeline.clone();

        let retry = RetryPolicy::linear(
            env.positive("RETRY_MAX_ATTEMPTS", pipeline_defaults.retry.max_attempts)?,
            Duration::from_millis(env.positive("RETRY_UNIT_MS", 1000u64)?),
        );
        let list_ttl = Duration::from_secs(env.positive("ORDER_LIST_CACHE_TTL_SECS", 600u64)?);
        let cache = CachePolicy {
            product_ttl: Duration::from_secs(env.positive("PRODUCT_CACHE_TTL_SECS", 60u64)?),
            product_list_ttl: list_ttl,
            order_list_ttl: list_ttl,
        };

        Ok(Self {
            port: env.parse("PORT", defaults.port)?,
            database_url: env.optional("DATABASE_URL"),
            pool: PoolSettings {
                max_connections: env
                    .positive("DATABASE_MAX_CONNECTIONS", defaults.pool.max_connections)?,
                min_connections: env
                    .parse("DATABASE_MIN_CONNECTIONS", defaults.pool.min_connections)?,
                max_lifetime: Duration::from_secs(
                    env.positive("DATABASE_MAX_LIFETIME_SECS", 300u64)?,
                ),
            },
            redis_url: env.optional("REDIS_URL"),
            product_service_url: env
                .optional("PRODUCT_SERVICE")
                .unwrap_or(defaults.product_service_url),
            catalog_timeout: Duration::from_millis(env.positive("CATALOG_TIMEOUT_MS", 2000u64)?),
            broker_url: env
                .optional("BROKER_URL")
                .or_else(|| env.optional("RABBITMQ_URL")),
            pipeline: PipelineSettings {
                queue_capacity: env.positive("QUEUE_CAPACITY", pipeline_defaults.queue_capacity)?,
                workers: env.positive("WORKER_COUNT", pipeline_defaults.workers)?,
                retry,
                cache,
                exchange: env
                    .optional("EVENTS_EXCHANGE")
                    .unwrap_or(pipeline_defaults.exchange),
            },
        })
    }
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Unset and blank are the same thing.
    fn optional(&self, var: &str) -> Option<String> {
        (self.lookup)(var)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(var) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        }
    }

    fn positive<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr + Default + PartialEq + std::fmt::Display,
        T::Err: std::fmt::Display,
    {
        let value = self.parse(var, default)?;
        if value == T::default() {
            return Err(ConfigError::Invalid {
                var,
                value: value.to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(value)
    }
}
