// Domain entities

pub mod daily_store;
pub mod member;
pub mod outcomes;
pub mod profile;
pub mod record;
pub mod report;
pub mod requests;
pub mod runtime_config;
pub mod sheet;

pub use daily_store::*;
pub use member::*;
pub use outcomes::*;
pub use profile::*;
pub use record::*;
pub use report::*;
pub use requests::*;
pub use runtime_config::*;
pub use sheet::*;
