//! Data model shared by the appctl client and command-line tool.

pub mod api;
pub mod hosting;
pub mod installation;
pub mod manifest;
pub mod organization;
