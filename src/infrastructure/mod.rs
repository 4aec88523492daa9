pub mod discord_bot;
pub mod repositories;
