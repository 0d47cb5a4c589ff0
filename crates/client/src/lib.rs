//! Network client for the image-sequence conversion backend.
//!
//! Provides the REST API wrapper, the reconnecting status channel, the
//! directory browser, the sequence scanner, settings load/save and the
//! job controller that ties them to the session state machine.

pub mod api;
pub mod browser;
pub mod channel;
pub mod client;
pub mod config;
pub mod controller;
pub mod processor;
pub mod reconnect;
pub mod scanner;
pub mod settings;

#[cfg(test)]
mod test_support;
