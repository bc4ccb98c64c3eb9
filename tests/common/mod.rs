//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use beacon_nodes::{Dispatcher, Error, GatewayClient, Result};
use serde_json::Value;

/// A recorded gateway call
#[derive(Debug, Clone)]
pub struct Call {
    pub method: String,
    pub params: Option<Value>,
    pub timeout: Duration,
}

/// Gateway double with scripted per-method responses
#[derive(Default)]
pub struct FakeGateway {
    responses: Mutex<HashMap<String, std::result::Result<Value, String>>>,
    calls: Mutex<Vec<Call>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answer `method` with `value`
    pub fn respond(&self, method: &str, value: Value) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), Ok(value));
    }

    /// Fail `method` with a gateway error
    pub fn fail(&self, method: &str, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(method.to_string(), Err(message.to_string()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.method).collect()
    }
}

#[async_trait]
impl GatewayClient for FakeGateway {
    async fn call(&self, method: &str, params: Option<Value>, timeout: Duration) -> Result<Value> {
        self.calls.lock().unwrap().push(Call {
            method: method.to_string(),
            params,
            timeout,
        });

        let response = self.responses.lock().unwrap().get(method).cloned();
        match response {
            Some(Ok(value)) => Ok(value),
            Some(Err(message)) => Err(Error::Gateway(message)),
            None => Err(Error::Gateway(format!("unknown method: {method}"))),
        }
    }
}

/// Dispatcher for canvas nodes backed by `gateway`
pub fn dispatcher(gateway: &Arc<FakeGateway>) -> Dispatcher {
    Dispatcher::new(gateway.clone(), Duration::from_millis(1500), "canvas")
}

/// Live listing with a connected studio Mac and an offline PC
pub fn studio_fleet() -> Value {
    serde_json::json!({
        "ts": 1,
        "nodes": [
            {
                "nodeId": "mac-123",
                "displayName": "Studio Mac",
                "platform": "macos",
                "remoteIp": "192.168.1.10",
                "caps": ["canvas", "screen"],
                "connected": true
            },
            {
                "nodeId": "pc-7",
                "platform": "windows",
                "caps": ["canvas"],
                "connected": false
            }
        ]
    })
}
