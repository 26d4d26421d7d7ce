pub mod credential_commands;
pub mod daily_commands;
pub mod import_commands;
pub mod roster_commands;
pub mod sync_commands;
