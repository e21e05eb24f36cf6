use std::env;
use std::fmt;

use crate::portfolio::CommissionSchedule;

/// Distinguishes runtime behavior for different stages of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub agency: AgencyConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let standard = CommissionSchedule::standard();
        let schedule = CommissionSchedule {
            rental_rate: rate_var("AGENCY_RENTAL_COMMISSION", standard.rental_rate)?,
            sale_rate: rate_var("AGENCY_SALE_COMMISSION", standard.sale_rate)?,
            price_per_area_unit: amount_var("AGENCY_PRICE_PER_AREA", standard.price_per_area_unit)?,
            garage_bonus: amount_var("AGENCY_GARAGE_BONUS", standard.garage_bonus)?,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            agency: AgencyConfig { schedule },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Commission and pricing dials handed to every agency the tool builds.
#[derive(Debug, Clone)]
pub struct AgencyConfig {
    pub schedule: CommissionSchedule,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn number_var(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn rate_var(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    let rate = number_var(key, default)?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidRate { key, value: rate });
    }
    Ok(rate)
}

fn amount_var(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    let amount = number_var(key, default)?;
    if !amount.is_finite() || amount < 0.0 {
        return Err(ConfigError::InvalidAmount { key, value: amount });
    }
    Ok(amount)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { key: &'static str, value: String },
    InvalidRate { key: &'static str, value: f64 },
    InvalidAmount { key: &'static str, value: f64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a number, got '{value}'")
            }
            ConfigError::InvalidRate { key, value } => {
                write!(f, "{key} must be a fraction between 0 and 1, got {value}")
            }
            ConfigError::InvalidAmount { key, value } => {
                write!(f, "{key} must be a finite non-negative amount, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("AGENCY_RENTAL_COMMISSION");
        env::remove_var("AGENCY_SALE_COMMISSION");
        env::remove_var("AGENCY_PRICE_PER_AREA");
        env::remove_var("AGENCY_GARAGE_BONUS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.agency.schedule, CommissionSchedule::standard());
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn overrides_schedule_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("AGENCY_SALE_COMMISSION", "0.15");
        env::set_var("AGENCY_GARAGE_BONUS", " 750 ");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.agency.schedule.sale_rate, 0.15);
        assert_eq!(config.agency.schedule.garage_bonus, 750.0);
        assert_eq!(config.agency.schedule.rental_rate, 0.10);
    }

    #[test]
    fn rejects_out_of_range_rates_and_amounts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("AGENCY_RENTAL_COMMISSION", "1.5");
        let rate = AppConfig::load().expect_err("rate above one rejected");
        assert!(matches!(
            rate,
            ConfigError::InvalidRate {
                key: "AGENCY_RENTAL_COMMISSION",
                ..
            }
        ));

        reset_env();
        env::set_var("AGENCY_PRICE_PER_AREA", "-1");
        let amount = AppConfig::load().expect_err("negative amount rejected");
        assert!(matches!(amount, ConfigError::InvalidAmount { .. }));

        reset_env();
        env::set_var("AGENCY_GARAGE_BONUS", "lots");
        let number = AppConfig::load().expect_err("text rejected");
        reset_env();
        assert!(matches!(number, ConfigError::InvalidNumber { .. }));
    }
}
