pub mod backup;
pub mod inspect;
pub mod maintenance;
pub mod output;
pub mod snapshots;
pub mod version;
