// Domain value objects
pub mod activity_level;
pub mod identifiers;
pub mod member_score;
pub mod sheet_format;

pub use activity_level::*;
pub use identifiers::*;
pub use member_score::*;
pub use sheet_format::*;
