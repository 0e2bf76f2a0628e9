//! Asterisk Manager Interface client for the autodial workspace
//!
//! This crate provides the narrow action/event interface the dial engine is
//! written against ([`ManagerClient`]) and a TCP implementation of it
//! ([`AmiClient`]) that logs in, keeps the link up and streams events over a
//! channel.
//!
//! ```rust,no_run
//! use autodial_manager_client::{Action, AmiClient, AmiConfig, ManagerClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AmiConfig::new("127.0.0.1", 5038).with_credentials("admin", "secret");
//! let (client, mut events) = AmiClient::connect(config);
//!
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         println!("event: {}", event.name());
//!     }
//! });
//!
//! let response = client.send_action(Action::new("Ping")).await?;
//! println!("ping: {}", response.status());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod message;


pub use client::{AmiClient, ManagerClient};
pub use config::AmiConfig;
pub use error::{ManagerError, Result};
pub use message::{Action, Headers, ManagerEvent, ManagerMessage, ManagerResponse};

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::{
        Action, AmiClient, AmiConfig, ManagerClient, ManagerError, ManagerEvent, ManagerResponse,
        Result,
    };
}
