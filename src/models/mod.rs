pub mod dose_log;
pub mod research;
pub mod supplement;
