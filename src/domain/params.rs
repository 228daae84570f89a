//! Cost model parameters.
//!
//! A `CostParameters` value is validated on construction and never mutated
//! afterwards; changing a rate means building a new value.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::constant::{
    DEFAULT_DRIVER_HOURLY_WAGE, DEFAULT_FUEL_CONSUMPTION, DEFAULT_FUEL_PRICE,
    DEFAULT_INSURANCE_DAILY, DEFAULT_TOLL_RATE, DEFAULT_VEHICLE_DEPRECIATION,
};

#[derive(Debug, Error)]
pub enum ParamsError {
    #[error("failed to access cost parameter file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid cost parameter document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("cost parameter `{key}` must be positive, got {value}")]
    NonPositive { key: ParamKey, value: f64 },

    #[error("cost parameter `{key}` must be a finite number")]
    NonFinite { key: ParamKey },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKey {
    FuelPrice,
    FuelConsumption,
    TollRate,
    DriverHourlyWage,
    VehicleDepreciation,
    InsuranceDaily,
}

impl ParamKey {
    pub const ALL: [ParamKey; 6] = [
        ParamKey::FuelPrice,
        ParamKey::FuelConsumption,
        ParamKey::TollRate,
        ParamKey::DriverHourlyWage,
        ParamKey::VehicleDepreciation,
        ParamKey::InsuranceDaily,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::FuelPrice => "fuel_price",
            ParamKey::FuelConsumption => "fuel_consumption",
            ParamKey::TollRate => "toll_rate",
            ParamKey::DriverHourlyWage => "driver_hourly_wage",
            ParamKey::VehicleDepreciation => "vehicle_depreciation",
            ParamKey::InsuranceDaily => "insurance_daily",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exactly the six recognised keys; anything else in a document is rejected.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCostParameters {
    fuel_price: f64,
    fuel_consumption: f64,
    toll_rate: f64,
    driver_hourly_wage: f64,
    vehicle_depreciation: f64,
    insurance_daily: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostParameters {
    fuel_price: f64,
    fuel_consumption: f64,
    toll_rate: f64,
    driver_hourly_wage: f64,
    vehicle_depreciation: f64,
    insurance_daily: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            fuel_price: DEFAULT_FUEL_PRICE,
            fuel_consumption: DEFAULT_FUEL_CONSUMPTION,
            toll_rate: DEFAULT_TOLL_RATE,
            driver_hourly_wage: DEFAULT_DRIVER_HOURLY_WAGE,
            vehicle_depreciation: DEFAULT_VEHICLE_DEPRECIATION,
            insurance_daily: DEFAULT_INSURANCE_DAILY,
        }
    }
}

impl CostParameters {
    /// Currency per volume, volume per 100 km, currency per km, currency per
    /// hour, currency per day, currency per day.
    pub fn new(
        fuel_price: f64,
        fuel_consumption: f64,
        toll_rate: f64,
        driver_hourly_wage: f64,
        vehicle_depreciation: f64,
        insurance_daily: f64,
    ) -> Result<Self, ParamsError> {
        let params = Self {
            fuel_price,
            fuel_consumption,
            toll_rate,
            driver_hourly_wage,
            vehicle_depreciation,
            insurance_daily,
        };
        params.validate()?;
        Ok(params)
    }

    fn validate(&self) -> Result<(), ParamsError> {
        for key in ParamKey::ALL {
            let value = self.get(key);
            if !value.is_finite() {
                return Err(ParamsError::NonFinite { key });
            }
            if value <= 0.0 {
                return Err(ParamsError::NonPositive { key, value });
            }
        }
        Ok(())
    }

    pub fn get(&self, key: ParamKey) -> f64 {
        match key {
            ParamKey::FuelPrice => self.fuel_price,
            ParamKey::FuelConsumption => self.fuel_consumption,
            ParamKey::TollRate => self.toll_rate,
            ParamKey::DriverHourlyWage => self.driver_hourly_wage,
            ParamKey::VehicleDepreciation => self.vehicle_depreciation,
            ParamKey::InsuranceDaily => self.insurance_daily,
        }
    }

    /// A copy with one value replaced, validated like a fresh load.
    pub fn with(&self, key: ParamKey, value: f64) -> Result<Self, ParamsError> {
        let mut next = *self;
        match key {
            ParamKey::FuelPrice => next.fuel_price = value,
            ParamKey::FuelConsumption => next.fuel_consumption = value,
            ParamKey::TollRate => next.toll_rate = value,
            ParamKey::DriverHourlyWage => next.driver_hourly_wage = value,
            ParamKey::VehicleDepreciation => next.vehicle_depreciation = value,
            ParamKey::InsuranceDaily => next.insurance_daily = value,
        }
        next.validate()?;
        Ok(next)
    }

    pub fn fuel_price(&self) -> f64 {
        self.fuel_price
    }

    pub fn fuel_consumption(&self) -> f64 {
        self.fuel_consumption
    }

    pub fn toll_rate(&self) -> f64 {
        self.toll_rate
    }

    pub fn driver_hourly_wage(&self) -> f64 {
        self.driver_hourly_wage
    }

    pub fn vehicle_depreciation(&self) -> f64 {
        self.vehicle_depreciation
    }

    pub fn insurance_daily(&self) -> f64 {
        self.insurance_daily
    }

    /// Fuel cost per km travelled.
    pub fn fuel_cost_per_km(&self) -> f64 {
        self.fuel_price * self.fuel_consumption / 100.0
    }

    /// Depreciation plus insurance for one vehicle-day.
    pub fn daily_fixed_cost(&self) -> f64 {
        self.vehicle_depreciation + self.insurance_daily
    }

    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let raw: RawCostParameters = serde_json::from_str(json)?;
        Self::new(
            raw.fuel_price,
            raw.fuel_consumption,
            raw.toll_rate,
            raw.driver_hourly_wage,
            raw.vehicle_depreciation,
            raw.insurance_daily,
        )
    }

    pub fn to_json_string(&self) -> Result<String, ParamsError> {
        let raw = RawCostParameters {
            fuel_price: self.fuel_price,
            fuel_consumption: self.fuel_consumption,
            toll_rate: self.toll_rate,
            driver_hourly_wage: self.driver_hourly_wage,
            vehicle_depreciation: self.vehicle_depreciation,
            insurance_daily: self.insurance_daily,
        };
        Ok(serde_json::to_string_pretty(&raw)?)
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let path = path.as_ref();
        debug!("Reading cost parameters from {}", path.display());
        let content = fs::read_to_string(path)?;
        let params = Self::from_json_str(&content)?;
        info!("Loaded cost parameters from {}: {:?}", path.display(), params);
        Ok(params)
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let path = path.as_ref();
        fs::write(path, self.to_json_string()?)?;
        info!("Saved cost parameters to {}", path.display());
        Ok(())
    }
}
