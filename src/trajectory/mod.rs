pub mod reconstruct;

pub use reconstruct::reconstruct_trajectory;
