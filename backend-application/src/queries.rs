pub mod daily_queries;
pub mod report_queries;
pub mod roster_queries;
