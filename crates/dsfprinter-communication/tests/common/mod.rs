//! Mock daemon connections shared by the integration tests

#![allow(dead_code)]

use dsfprinter_communication::{
    CodeChannel, CodeResult, CommandConnection, DaemonConnections, DaemonConnector,
    InterceptConnection, RemoteCode, SubscribeConnection,
};
use dsfprinter_core::{ConnectionError, Result};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

type Reply = dyn Fn(&str) -> Result<CodeResult> + Send + Sync;

/// Machine model with one tool on heater 1, bed on heater 0 and no chamber
pub fn sample_model() -> Value {
    json!({
        "heat": {
            "bedHeaters": [0, -1],
            "chamberHeaters": [-1],
            "heaters": [
                { "current": 58.25, "active": 60.0, "standby": 0.0, "state": "active" },
                { "current": 201.5, "active": 210.0, "standby": 150.0, "state": "standby" }
            ]
        },
        "tools": [
            { "number": 0, "heaters": [1] }
        ]
    })
}

#[derive(Default)]
struct InterceptState {
    codes: VecDeque<RemoteCode>,
    closed: bool,
}

/// In-memory daemon recording every call in `events`
#[derive(Clone)]
pub struct MockDaemon {
    pub events: Arc<Mutex<Vec<String>>>,
    pub model: Arc<Mutex<Value>>,
    pub patches: Arc<Mutex<VecDeque<String>>>,
    pub flush_ok: Arc<AtomicBool>,
    pub receive_error: Arc<Mutex<Option<ConnectionError>>>,
    reply: Arc<Reply>,
    intercept: Arc<(Mutex<InterceptState>, Condvar)>,
}

impl MockDaemon {
    pub fn new() -> Self {
        Self::with_model(sample_model())
    }

    pub fn with_model(model: Value) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            model: Arc::new(Mutex::new(model)),
            patches: Arc::new(Mutex::new(VecDeque::new())),
            flush_ok: Arc::new(AtomicBool::new(true)),
            receive_error: Arc::new(Mutex::new(None)),
            reply: Arc::new(|_code: &str| -> Result<CodeResult> { Ok(CodeResult::ok("")) }),
            intercept: Arc::new((Mutex::new(InterceptState::default()), Condvar::new())),
        }
    }

    pub fn with_reply(
        mut self,
        reply: impl Fn(&str) -> Result<CodeResult> + Send + Sync + 'static,
    ) -> Self {
        self.reply = Arc::new(reply);
        self
    }

    pub fn connections(&self) -> DaemonConnections {
        DaemonConnections {
            command: Box::new(MockCommand(self.clone())),
            intercept: Box::new(MockIntercept(self.clone())),
            subscribe: Box::new(MockSubscribe(self.clone())),
        }
    }

    pub fn push_patch(&self, patch: Value) {
        self.patches.lock().unwrap().push_back(patch.to_string());
    }

    pub fn push_code(&self, code: RemoteCode) {
        let (state, ready) = &*self.intercept;
        state.lock().unwrap().codes.push_back(code);
        ready.notify_all();
    }

    /// Drop the intercept connection from the daemon side
    pub fn reset_intercept(&self) {
        let (state, ready) = &*self.intercept;
        state.lock().unwrap().closed = true;
        ready.notify_all();
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.starts_with(prefix))
            .count()
    }

    fn record(&self, event: impl Into<String>) {
        self.events.lock().unwrap().push(event.into());
    }
}

impl DaemonConnector for MockDaemon {
    fn command_connection(&self) -> Result<Box<dyn CommandConnection>> {
        Ok(Box::new(MockCommand(self.clone())))
    }

    fn intercept_connection(&self) -> Result<Box<dyn InterceptConnection>> {
        Ok(Box::new(MockIntercept(self.clone())))
    }

    fn subscribe_connection(&self) -> Result<Box<dyn SubscribeConnection>> {
        Ok(Box::new(MockSubscribe(self.clone())))
    }
}

pub struct MockCommand(MockDaemon);

impl CommandConnection for MockCommand {
    fn connect(&self) -> Result<()> {
        self.0.record("command connect");
        Ok(())
    }

    fn perform_simple_code(&self, code: &str, channel: CodeChannel) -> Result<CodeResult> {
        self.0.record(format!("code {} on {}", code.trim(), channel));
        (self.0.reply)(code)
    }

    fn close(&self) -> Result<()> {
        self.0.record("command close");
        Ok(())
    }
}

pub struct MockSubscribe(MockDaemon);

impl SubscribeConnection for MockSubscribe {
    fn connect(&self) -> Result<()> {
        self.0.record("subscribe connect");
        Ok(())
    }

    fn get_machine_model(&self) -> Result<Value> {
        self.0.record("model");
        Ok(self.0.model.lock().unwrap().clone())
    }

    fn get_machine_model_patch(&self) -> Result<String> {
        self.0.record("patch");
        Ok(self
            .0
            .patches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "{}".to_string()))
    }

    fn close(&self) -> Result<()> {
        self.0.record("subscribe close");
        Ok(())
    }
}

pub struct MockIntercept(MockDaemon);

impl InterceptConnection for MockIntercept {
    fn connect(&self) -> Result<()> {
        self.0.record("intercept connect");
        Ok(())
    }

    fn receive_code(&self) -> Result<RemoteCode> {
        let (state, ready) = &*self.0.intercept;
        let mut state = state.lock().unwrap();
        loop {
            if state.closed {
                return Err(ConnectionError::ConnectionReset.into());
            }
            if let Some(error) = self.0.receive_error.lock().unwrap().clone() {
                drop(state);
                self.0.record("receive failed");
                return Err(error.into());
            }
            if let Some(code) = state.codes.pop_front() {
                drop(state);
                self.0.record(format!("received {}", code));
                return Ok(code);
            }
            state = ready.wait(state).unwrap();
        }
    }

    fn flush(&self, channel: CodeChannel) -> Result<bool> {
        self.0.record(format!("flush {}", channel));
        Ok(self.0.flush_ok.load(Ordering::SeqCst))
    }

    fn cancel_code(&self) -> Result<()> {
        self.0.record("cancel");
        Ok(())
    }

    fn ignore_code(&self) -> Result<()> {
        self.0.record("ignore");
        Ok(())
    }

    fn close(&self) -> Result<()> {
        self.0.record("intercept close");
        let (state, ready) = &*self.0.intercept;
        state.lock().unwrap().closed = true;
        ready.notify_all();
        Ok(())
    }
}
