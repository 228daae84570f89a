pub mod cost;
pub mod overview;
pub mod summary;

pub use cost::compute_cost;
pub use overview::{rank_by_efficiency, rank_by_points, CostOverview};
pub use summary::summarize_branches;
