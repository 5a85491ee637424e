pub mod cli;
pub mod clock;
pub mod conf;
pub mod dispatch;
pub mod event;
pub mod fanout;
pub mod logging;
pub mod server;
pub mod source;
pub mod store;
