pub mod params;
pub mod types;

pub use params::{CostParameters, ParamKey, ParamsError};
pub use types::{BranchSummary, CheckInEvent, CostBreakdown, DeliveryPoint, DriverTrajectory};
