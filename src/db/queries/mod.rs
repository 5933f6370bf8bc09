pub mod guild_config;
pub mod punishment;
pub mod role_assignment;
pub mod temp_role;
