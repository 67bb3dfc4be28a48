pub mod control;
pub mod health;
pub mod ws;
