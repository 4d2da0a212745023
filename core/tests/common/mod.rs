#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dynlist_core::{Connection, ConfigRegistry, ConnectionPool, ListError, RegistrySnapshot, Result};
use dynlist_types::{ApplicationConfig, Primitive, Row};
use serde_json::{Value, json};

pub const CRM_APP: &str = r#"{
    "appId": "crm",
    "name": "CRM",
    "entities": [
        {
            "code": "Customer",
            "name": "Customer",
            "fields": [
                { "code": "name", "name": "Name" },
                { "code": "email", "name": "E-mail" },
                { "code": "credit", "name": "Credit", "type": "number" }
            ]
        },
        {
            "code": "Quote",
            "name": "Quote",
            "fields": [
                { "code": "number", "name": "Number" },
                { "code": "lines", "name": "Lines", "type": "grid" }
            ]
        }
    ]
}"#;

pub fn registry() -> Arc<ConfigRegistry> {
    let app = ApplicationConfig::from_json_str(CRM_APP).unwrap();
    let snapshot = RegistrySnapshot::from_applications([app]).unwrap();
    Arc::new(ConfigRegistry::new(snapshot))
}

pub fn customer(id: &str, name: &str, credit: Value) -> Row {
    let Value::Object(row) = json!({
        "id": id,
        "markedForDeletion": false,
        "name": name,
        "email": format!("{}@example.com", id),
        "credit": credit,
        "global_key": id,
    }) else {
        unreachable!()
    };
    row
}

#[derive(Default)]
struct State {
    responses: VecDeque<Result<Vec<Row>>>,
    executed: Vec<(String, Vec<Primitive>)>,
    acquired: usize,
    delay: Option<Duration>,
}

/// Hands out canned result sets in order and records every statement it receives.
#[derive(Clone, Default)]
pub struct MemoryPool {
    state: Arc<Mutex<State>>,
}

impl MemoryPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, rows: Vec<Row>) -> &Self {
        self.state.lock().unwrap().responses.push_back(Ok(rows));
        self
    }

    pub fn fail(&self, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Err(ListError::Execution(message.into())));
        self
    }

    pub fn delay(&self, delay: Duration) -> &Self {
        self.state.lock().unwrap().delay = Some(delay);
        self
    }

    pub fn executed(&self) -> Vec<(String, Vec<Primitive>)> {
        self.state.lock().unwrap().executed.clone()
    }

    pub fn last(&self) -> (String, Vec<Primitive>) {
        self.executed().pop().expect("no statement executed")
    }

    pub fn acquired(&self) -> usize {
        self.state.lock().unwrap().acquired
    }
}

pub struct MemoryConnection {
    state: Arc<Mutex<State>>,
}

impl ConnectionPool for MemoryPool {
    type Connection = MemoryConnection;

    async fn acquire(&self) -> Result<MemoryConnection> {
        self.state.lock().unwrap().acquired += 1;
        Ok(MemoryConnection {
            state: Arc::clone(&self.state),
        })
    }
}

impl Connection for MemoryConnection {
    async fn query(&mut self, sql: &str, params: &[Primitive]) -> Result<Vec<Row>> {
        let (response, delay) = {
            let mut state = self.state.lock().unwrap();
            state.executed.push((sql.to_owned(), params.to_vec()));
            let response = state.responses.pop_front().unwrap_or_else(|| Ok(Vec::new()));
            (response, state.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        response
    }
}
