//! Scripted backend for exercising the controller without a network

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{ApiError, ApiResult, ChatBackend, ChatResponse};

pub const GREETING: &str = "Hello! How can I help?";

#[derive(Clone)]
pub enum Reply {
    Answer(serde_json::Value),
    Fail,
}

struct Scripted {
    gate: Option<Arc<Notify>>,
    reply: Reply,
}

/// Backend answering from a script, optionally holding a reply until
/// its gate is opened.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<HashMap<String, Scripted>>,
    pub queries: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn reply(self, query: &str, reply: Reply) -> Self {
        self.script.lock().unwrap().insert(
            query.to_string(),
            Scripted { gate: None, reply },
        );
        self
    }

    pub fn gated_reply(self, query: &str, reply: Reply) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.script.lock().unwrap().insert(
            query.to_string(),
            Scripted { gate: Some(Arc::clone(&gate)), reply },
        );
        (self, gate)
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn ask(&self, query: &str) -> ApiResult<ChatResponse> {
        self.queries.lock().unwrap().push(query.to_string());

        let (gate, reply) = {
            let script = self.script.lock().unwrap();
            match script.get(query) {
                Some(entry) => (entry.gate.clone(), entry.reply.clone()),
                None => (None, Reply::Fail),
            }
        };

        if let Some(gate) = gate {
            gate.notified().await;
        }

        match reply {
            Reply::Answer(body) => Ok(serde_json::from_value(body)?),
            Reply::Fail => Err(ApiError::JsonError(
                serde_json::from_str::<ChatResponse>("not json").unwrap_err(),
            )),
        }
    }

    fn endpoint(&self) -> &str {
        "scripted"
    }
}
