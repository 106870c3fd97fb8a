//! JavaScript execution for a CDP page session.

use serde_json::{json, Value};

use crate::cdp::protocol::RemoteObject;
use crate::error::BrowserError;

use super::core::PageSession;

impl PageSession {
    /// Evaluate a JavaScript expression, awaiting a returned promise.
    pub async fn evaluate(&self, expression: &str) -> Result<Value, BrowserError> {
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

        if let Some(message) = exception_message(&result) {
            return Err(BrowserError::PageScript(message));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Call a function with a remote object as `this`.
    pub async fn call_function_on(
        &self,
        object_id: &str,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, BrowserError> {
        let arguments: Vec<Value> = args.into_iter().map(|v| json!({"value": v})).collect();

        let result = self
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": object_id,
                    "functionDeclaration": function,
                    "arguments": arguments,
                    "returnByValue": true,
                    "awaitPromise": true,
                })),
            )
            .await?;

        if let Some(message) = exception_message(&result) {
            return Err(BrowserError::PageScript(message));
        }

        Ok(result["result"]["value"].clone())
    }

    /// Resolve a backend node to a runtime object id.
    pub async fn resolve_backend_node(&self, backend_node_id: i64) -> Result<String, BrowserError> {
        let result = self
            .call(
                "DOM.resolveNode",
                Some(json!({"backendNodeId": backend_node_id})),
            )
            .await?;

        let object: RemoteObject = serde_json::from_value(result["object"].clone())?;
        object.object_id.ok_or_else(|| {
            BrowserError::InvalidResponse("node did not resolve to an object".to_string())
        })
    }

    /// Run `function` against a backend node, with the node as `this`.
    pub async fn call_on_backend_node(
        &self,
        backend_node_id: i64,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, BrowserError> {
        let object_id = self.resolve_backend_node(backend_node_id).await?;
        self.call_function_on(&object_id, function, args).await
    }
}

/// Extract a useful message from `exceptionDetails`, if present.
fn exception_message(result: &Value) -> Option<String> {
    let details = result.get("exceptionDetails")?;
    let message = details["exception"]["description"]
        .as_str()
        .or_else(|| details["text"].as_str())
        .unwrap_or("unknown page error");
    Some(message.lines().next().unwrap_or(message).to_string())
}
