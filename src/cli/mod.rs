pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod env;
pub mod locate;
pub mod output;
pub mod runtime;

pub use app::run;
pub use commands::{Commands, LocateArgs};
pub use env::CliArgs;
pub use locate::{cmd_click, cmd_locate, LocateReport};
