pub mod daily_handlers;
pub mod import_handlers;
pub mod member_handlers;
pub mod ops_handlers;
pub mod report_handlers;

pub use daily_handlers::*;
pub use import_handlers::*;
pub use member_handlers::*;
pub use ops_handlers::*;
pub use report_handlers::*;
