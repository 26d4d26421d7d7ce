pub mod backoffice_client;
pub mod github_store;
pub mod maintenance;
pub mod report_service;
pub mod sheet_reader;

pub use backoffice_client::*;
pub use github_store::*;
pub use maintenance::*;
pub use report_service::*;
pub use sheet_reader::*;
