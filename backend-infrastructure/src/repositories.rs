pub mod daily_store_file;
pub mod roster_file;

pub use daily_store_file::*;
pub use roster_file::*;
