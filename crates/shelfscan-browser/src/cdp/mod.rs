//! Chrome DevTools Protocol (CDP) client.
//!
//! Connects to Chrome/Chromium started with `--remote-debugging-port` over
//! one browser-level WebSocket and drives pages through flattened target
//! sessions.
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let page = client.new_page().await?;
//! page.navigate("https://example.com", Duration::from_secs(30)).await?;
//! ```

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::*;
pub use session::PageSession;
