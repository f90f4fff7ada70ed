use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::thread;

use futures::channel::oneshot;
use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::BridgeError;

type Handler = Arc<dyn Fn(Vec<Value>) -> Result<Value, BridgeError> + Send + Sync>;

/// A native module exposed through the bridge.
pub trait ApiModule {
    /// Name the scripting side addresses this module by.
    fn name(&self) -> &'static str;

    /// Register this module's commands on `bridge`.
    fn register(&self, bridge: &CommandBridge);
}

/// Registry and dispatcher of named commands.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct CommandBridge {
    commands: Arc<RwLock<HashMap<String, Handler>>>,
}

impl fmt::Debug for CommandBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandBridge")
            .field("commands", &self.commands())
            .finish()
    }
}

fn key(module: &str, command: &str) -> String {
    format!("{module}.{command}")
}

impl CommandBridge {
    /// Create an empty bridge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` as `module.command`.
    ///
    /// The handler runs on a dedicated worker thread per invocation. Its `Ok`
    /// value is marshalled to JSON; its `Err` is reported by display text.
    /// Registering the same name twice replaces the earlier handler.
    pub fn register_async<F, T, E>(&self, module: &str, command: &str, handler: F)
    where
        F: Fn(Vec<Value>) -> Result<T, E> + Send + Sync + 'static,
        T: Serialize,
        E: fmt::Display,
    {
        let handler: Handler = Arc::new(move |args| match handler(args) {
            Ok(value) => {
                serde_json::to_value(value).map_err(|err| BridgeError::Marshal(err.to_string()))
            }
            Err(err) => Err(BridgeError::Command {
                message: err.to_string(),
            }),
        });

        self.commands
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key(module, command), handler);
    }

    /// Register every command of `module`.
    pub fn install(&self, module: &dyn ApiModule) {
        debug!("installing bridge module {}", module.name());
        module.register(self);
    }

    /// Names of all registered commands, as `module.command`, sorted.
    #[must_use]
    pub fn commands(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Invoke `module.command` with `args` and wait for its result.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::UnknownCommand`] if nothing is registered under
    /// that name, [`BridgeError::Command`] if the command failed, and
    /// [`BridgeError::WorkerLost`] if the worker panicked.
    pub async fn invoke(
        &self,
        module: &str,
        command: &str,
        args: Vec<Value>,
    ) -> Result<Value, BridgeError> {
        let name = key(module, command);
        let handler = self
            .commands
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name)
            .cloned()
            .ok_or_else(|| BridgeError::UnknownCommand {
                module: module.to_owned(),
                command: command.to_owned(),
            })?;

        let (sender, receiver) = oneshot::channel();
        thread::Builder::new()
            .name(format!("bridge-{name}"))
            .spawn(move || {
                // The caller may have given up waiting; nothing to report then.
                let _ = sender.send(handler(args));
            })
            .map_err(|err| BridgeError::Spawn(err.to_string()))?;

        receiver.await.map_err(|_| BridgeError::WorkerLost(name))?
    }
}
