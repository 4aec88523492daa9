pub mod bot;
pub mod transport;
