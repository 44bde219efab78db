mod command;
mod http;
mod ytdl;

pub use ytdl::{MediaProvider, Ytdl};
