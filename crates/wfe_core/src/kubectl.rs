//! Collaborators backed by the `kubectl` binary.
//!
//! Each call runs one kubectl process with JSON output. Watches keep a
//! `kubectl get --watch --output-watch-events` child alive; a reader thread
//! decodes its stdout into [`WatchEvent`]s and stopping the session kills the
//! child.

use crate::client::{ResourceApi, WorkflowApi};
use crate::error::{Result, WfeError};
use crate::selector::ListOptions;
use crate::types::{Resource, Workflow};
use crate::watch::{ApiStatus, WatchEvent, WatchObject, WatchSession};
use crossbeam_channel::{unbounded, Receiver};
use serde::Deserialize;
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Location of the kubectl binary and the namespace to operate in.
#[derive(Debug, Clone)]
pub struct Kubectl {
    binary: String,
    namespace: String,
}

impl Kubectl {
    /// Creates a kubectl handle.
    pub fn new(binary: &str, namespace: &str) -> Self {
        Self {
            binary: binary.to_string(),
            namespace: namespace.to_string(),
        }
    }

    /// Typed API for one resource kind.
    pub fn api<T: Resource>(&self) -> KubectlApi<T> {
        KubectlApi {
            kubectl: self.clone(),
            _marker: PhantomData,
        }
    }

    fn scope_args<T: Resource>(&self) -> Vec<String> {
        if T::NAMESPACED {
            vec!["-n".to_string(), self.namespace.clone()]
        } else {
            Vec::new()
        }
    }

    fn command_line(&self, args: &[String]) -> String {
        format!("{} {}", self.binary, args.join(" "))
    }

    /// Runs kubectl to completion and returns stdout.
    fn run<T: Resource>(&self, name: &str, args: &[String], stdin: Option<&[u8]>) -> Result<Vec<u8>> {
        debug!(command = %self.command_line(args), "Running kubectl");

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| WfeError::CommandStartFailed {
                command: self.binary.clone(),
                reason: e.to_string(),
            })?;

        // Stdin is fed from its own thread while stdout drains here, so a large
        // manifest cannot fill both pipes. The writer drops the pipe when done,
        // which gives kubectl EOF.
        let writer = match (stdin, child.stdin.take()) {
            (Some(input), Some(mut pipe)) => {
                let input = input.to_vec();
                Some(thread::spawn(move || pipe.write_all(&input)))
            }
            _ => None,
        };

        let out = child.wait_with_output()?;
        let written = writer.map_or(Ok(()), |w| {
            w.join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")))
        });
        if !out.status.success() {
            return Err(classify_failure::<T>(
                name,
                &String::from_utf8_lossy(&out.stderr),
            ));
        }
        written?;
        Ok(out.stdout)
    }
}

/// Maps kubectl's stderr to an error, recognizing "not found".
fn classify_failure<T: Resource>(name: &str, stderr: &str) -> WfeError {
    if stderr.contains("NotFound") {
        WfeError::NotFound {
            kind: T::KIND.to_string(),
            name: name.to_string(),
        }
    } else {
        WfeError::Api {
            kind: T::KIND.to_string(),
            name: name.to_string(),
            message: stderr.trim().to_string(),
        }
    }
}

/// Serializes an object with the `apiVersion`/`kind` header kubectl needs.
fn manifest<T: Resource>(obj: &T) -> Result<Vec<u8>> {
    let mut value = serde_json::to_value(obj).map_err(|e| WfeError::Serialization(e.to_string()))?;
    if let Value::Object(map) = &mut value {
        map.insert("apiVersion".into(), Value::String(T::API_VERSION.into()));
        map.insert("kind".into(), Value::String(T::KIND.into()));
    }
    serde_json::to_vec(&value).map_err(|e| WfeError::Serialization(e.to_string()))
}

fn decode<T: Resource>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| WfeError::Deserialization(format!("{}: {}", T::KIND, e)))
}

#[derive(Deserialize)]
struct ObjectList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

/// One line of `kubectl get --watch --output-watch-events -o json`.
#[derive(Debug, Deserialize)]
pub(crate) struct RawWatchEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    object: Value,
}

impl RawWatchEvent {
    pub(crate) fn into_event(self) -> WatchEvent {
        match self.event_type.as_str() {
            "ADDED" => WatchEvent::Added(WatchObject::from_value(self.object)),
            "MODIFIED" => WatchEvent::Modified(WatchObject::from_value(self.object)),
            "DELETED" => WatchEvent::Deleted(WatchObject::from_value(self.object)),
            "ERROR" => WatchEvent::Error(serde_json::from_value(self.object).unwrap_or_default()),
            other => WatchEvent::Error(ApiStatus {
                code: None,
                reason: "UnknownEventType".into(),
                message: format!("unknown watch event type '{}'", other),
            }),
        }
    }
}

/// kubectl-backed API for one resource kind.
pub struct KubectlApi<T> {
    kubectl: Kubectl,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Resource> KubectlApi<T> {
    fn selector_args(opts: &ListOptions) -> Vec<String> {
        let mut args = Vec::new();
        if !opts.label_selector.is_empty() {
            args.push("-l".to_string());
            args.push(opts.label_selector.clone());
        }
        if !opts.field_selector.is_empty() {
            args.push("--field-selector".to_string());
            args.push(opts.field_selector.clone());
        }
        args
    }
}

impl<T: Resource> ResourceApi<T> for KubectlApi<T> {
    fn create(&self, obj: &T) -> Result<T> {
        let mut args = self.kubectl.scope_args::<T>();
        args.extend(["create", "-o", "json", "-f", "-"].map(String::from));
        let body = manifest(obj)?;
        let name = if obj.name().is_empty() {
            obj.metadata().generate_name.as_str()
        } else {
            obj.name()
        };
        let out = self.kubectl.run::<T>(name, &args, Some(&body))?;
        decode(&out)
    }

    fn get(&self, name: &str) -> Result<T> {
        let mut args = self.kubectl.scope_args::<T>();
        args.extend(["get", T::PLURAL, name, "-o", "json"].map(String::from));
        let out = self.kubectl.run::<T>(name, &args, None)?;
        decode(&out)
    }

    fn list(&self, opts: &ListOptions) -> Result<Vec<T>> {
        let mut args = self.kubectl.scope_args::<T>();
        args.extend(["get", T::PLURAL, "-o", "json"].map(String::from));
        args.extend(Self::selector_args(opts));
        let out = self.kubectl.run::<T>("", &args, None)?;
        let list: ObjectList<T> = serde_json::from_slice(&out)
            .map_err(|e| WfeError::Deserialization(format!("{} list: {}", T::KIND, e)))?;
        Ok(list.items)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut args = self.kubectl.scope_args::<T>();
        args.extend(["delete", T::PLURAL, name, "--wait=false"].map(String::from));
        self.kubectl.run::<T>(name, &args, None)?;
        Ok(())
    }
}

impl WorkflowApi for KubectlApi<Workflow> {
    fn watch(&self, opts: &ListOptions) -> Result<Box<dyn WatchSession>> {
        let mut args = self.kubectl.scope_args::<Workflow>();
        args.extend(
            ["get", Workflow::PLURAL, "--watch", "--output-watch-events", "-o", "json"]
                .map(String::from),
        );
        args.extend(Self::selector_args(opts));
        debug!(command = %self.kubectl.command_line(&args), "Opening watch");

        let mut child = Command::new(&self.kubectl.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| WfeError::CommandStartFailed {
                command: self.kubectl.binary.clone(),
                reason: e.to_string(),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| WfeError::CommandStartFailed {
            command: self.kubectl.binary.clone(),
            reason: "stdout not captured".into(),
        })?;
        let stderr = child.stderr.take();

        let (tx, rx) = unbounded();
        let reader = thread::spawn(move || {
            let stream = serde_json::Deserializer::from_reader(BufReader::new(stdout))
                .into_iter::<RawWatchEvent>();
            for item in stream {
                match item {
                    Ok(raw) => {
                        if tx.send(raw.into_event()).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        if !e.is_eof() {
                            warn!("Undecodable watch output: {}", e);
                        }
                        break;
                    }
                }
            }
        });

        let stderr_reader = stderr.map(|stderr| {
            thread::spawn(move || {
                for line in BufReader::new(stderr).lines().map_while(std::io::Result::ok) {
                    warn!(target: "kubectl", "{}", line);
                }
            })
        });

        Ok(Box::new(KubectlWatch {
            rx,
            child,
            readers: [Some(reader), stderr_reader],
        }))
    }
}

/// A running `kubectl get --watch` child.
struct KubectlWatch {
    rx: Receiver<WatchEvent>,
    child: Child,
    readers: [Option<JoinHandle<()>>; 2],
}

impl WatchSession for KubectlWatch {
    fn events(&self) -> &Receiver<WatchEvent> {
        &self.rx
    }

    fn stop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("kubectl watch already exited: {}", e);
        }
        let _ = self.child.wait();
        for reader in self.readers.iter_mut().filter_map(Option::take) {
            let _ = reader.join();
        }
    }
}
