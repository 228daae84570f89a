pub mod csv_io;

pub use csv_io::{
    read_checkins, read_checkins_from_path, write_branch_summary, write_driver_costs, IngestReport,
    RawCheckIn,
};
