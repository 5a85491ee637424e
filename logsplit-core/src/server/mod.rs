mod consumer;
mod pid;
pub mod setup;


pub use consumer::{Consumer, Tick};
pub use setup::{build_dispatcher, connect, run, serve};
