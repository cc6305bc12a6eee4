pub mod ack;
pub mod health;
pub mod studio;
pub mod videos;
