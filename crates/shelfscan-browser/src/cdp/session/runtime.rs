//! JavaScript evaluation and remote object handling.

use serde_json::{json, Value};

use crate::cdp::error::CdpError;
use crate::cdp::protocol::{PropertyDescriptor, RemoteObject};

use super::core::PageSession;

fn check_exception(result: &Value) -> Result<(), CdpError> {
    match result.get("exceptionDetails") {
        Some(exception) => {
            let text = exception["exception"]["description"]
                .as_str()
                .or_else(|| exception["text"].as_str())
                .unwrap_or("Unknown error");
            Err(CdpError::JavaScript(text.to_string()))
        }
        None => Ok(()),
    }
}

fn call_arguments(args: &[Value]) -> Value {
    json!(args.iter().map(|v| json!({"value": v})).collect::<Vec<_>>())
}

impl PageSession {
    /// Evaluate an expression and return its JSON value.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Evaluate an expression and keep the result as a remote object in
    /// `object_group`.
    pub async fn evaluate_handle(
        &self,
        expression: &str,
        object_group: &str,
    ) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "returnByValue": false,
                    "objectGroup": object_group,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(serde_json::from_value(result["result"].clone())?)
    }

    /// Call `function` with `this` bound to the remote object and return
    /// its JSON value.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: &[Value],
    ) -> Result<Value, CdpError> {
        let result = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": function,
                    "arguments": call_arguments(args),
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(result["result"]["value"].clone())
    }

    /// Like [`call_function_on`](Self::call_function_on) but returns the
    /// result as a remote object in the caller's object group.
    pub async fn call_function_on_handle(
        &self,
        object_id: &str,
        function: &str,
        args: &[Value],
    ) -> Result<RemoteObject, CdpError> {
        let result = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": function,
                    "arguments": call_arguments(args),
                    "returnByValue": false,
                })),
            )
            .await?;

        check_exception(&result)?;
        Ok(serde_json::from_value(result["result"].clone())?)
    }

    /// Own properties of a remote object (array elements included).
    pub async fn get_properties(&self, object_id: &str) -> Result<Vec<PropertyDescriptor>, CdpError> {
        let result = self
            .call(
                "Runtime.getProperties",
                Some(json!({
                    "objectId": object_id,
                    "ownProperties": true,
                })),
            )
            .await?;

        Ok(serde_json::from_value(result["result"].clone())?)
    }

    /// Release every remote object of a group.
    pub async fn release_object_group(&self, object_group: &str) -> Result<(), CdpError> {
        self.call(
            "Runtime.releaseObjectGroup",
            Some(json!({"objectGroup": object_group})),
        )
        .await?;
        Ok(())
    }
}
