pub mod flow;
pub mod iccid;
pub mod parsing_log;
pub mod scenario;
pub mod stats;
