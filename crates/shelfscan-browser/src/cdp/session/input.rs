//! Pointer input for a page session.

use serde_json::json;
use tracing::debug;

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{BoxModel, MouseButton, MouseEventType};

use super::core::PageSession;

impl PageSession {
    /// Scroll the element into view if it is outside the viewport.
    pub async fn scroll_into_view(&self, object_id: &str) -> Result<(), CdpError> {
        self.call(
            "DOM.scrollIntoViewIfNeeded",
            Some(json!({"objectId": object_id})),
        )
        .await?;
        Ok(())
    }

    /// Box model of the element, `None` when it is not rendered.
    pub async fn get_box_model(&self, object_id: &str) -> Result<Option<BoxModel>, CdpError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"objectId": object_id})))
            .await;

        match result {
            Ok(r) => Ok(Some(serde_json::from_value(r["model"].clone())?)),
            Err(CdpError::Protocol { code: -32000, ref message })
                if message.contains("box model") =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Left click at viewport coordinates.
    pub async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        self.dispatch_mouse(MouseEventType::MouseMoved, MouseButton::None, x, y)
            .await?;
        self.dispatch_mouse(MouseEventType::MousePressed, MouseButton::Left, x, y)
            .await?;
        self.dispatch_mouse(MouseEventType::MouseReleased, MouseButton::Left, x, y)
            .await?;

        debug!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    async fn dispatch_mouse(
        &self,
        event: MouseEventType,
        button: MouseButton,
        x: f64,
        y: f64,
    ) -> Result<(), CdpError> {
        self.call(
            "Input.dispatchMouseEvent",
            Some(json!({
                "type": event,
                "x": x,
                "y": y,
                "button": button,
                "clickCount": 1,
            })),
        )
        .await?;
        Ok(())
    }

    /// Center of a content quad (four x/y pairs).
    pub(crate) fn quad_center(quad: &[f64]) -> Option<(f64, f64)> {
        if quad.len() < 8 {
            return None;
        }
        let x = (quad[0] + quad[2] + quad[4] + quad[6]) / 4.0;
        let y = (quad[1] + quad[3] + quad[5] + quad[7]) / 4.0;
        Some((x, y))
    }
}
