//! Core session struct and command dispatch.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cdp::client::Connection;
use crate::cdp::error::CdpError;

/// A flattened session attached to a single page target.
pub struct PageSession {
    pub(super) target_id: String,
    pub(super) session_id: String,
    pub(super) conn: Arc<Connection>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, conn: Arc<Connection>) -> Self {
        Self {
            target_id,
            session_id,
            conn,
        }
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.send(method, params, Some(&self.session_id)).await
    }

    /// Enable the domains the driver relies on.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }
}
