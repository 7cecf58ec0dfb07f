use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A setup command that runs before an action's main command.
///
/// Foreground pre-actions must run to completion (nonzero exit aborts the
/// whole action); `background: true` marks a fire-and-forget pre-step that the
/// executor does not wait on.
///
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PreActionSpec {
    args: Vec<String>,

    /// Environment overrides, applied on top of the main action's environment.
    env: BTreeMap<String, String>,

    background: bool,
}

impl PreActionSpec {
    pub fn new(args: Vec<String>, env: BTreeMap<String, String>, background: bool) -> Self {
        Self {
            args,
            env,
            background,
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn background(&self) -> bool {
        self.background
    }
}

/// The executable description of a command: argument vector, environment,
/// working directory relative to the execution root, and ordered pre-actions.
///
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    args: Vec<String>,

    env: BTreeMap<String, String>,

    working_dir: PathBuf,

    pre_actions: Vec<PreActionSpec>,
}

impl ActionSpec {
    pub fn builder() -> ActionSpecBuilder {
        ActionSpecBuilder::default()
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Ordered: pre-actions must be carried out in this order, before the
    /// main command.
    pub fn pre_actions(&self) -> &[PreActionSpec] {
        &self.pre_actions
    }
}

#[derive(Default, Debug)]
pub struct ActionSpecBuilder {
    args: Vec<String>,
    env: BTreeMap<String, String>,
    working_dir: PathBuf,
    pre_actions: Vec<PreActionSpec>,
}

impl ActionSpecBuilder {
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(|a| a.into()).collect();
        self
    }

    pub fn env<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    pub fn working_dir(mut self, working_dir: PathBuf) -> Self {
        self.working_dir = working_dir;
        self
    }

    pub fn pre_action(mut self, pre_action: PreActionSpec) -> Self {
        self.pre_actions.push(pre_action);
        self
    }

    pub fn build(self) -> ActionSpec {
        ActionSpec {
            args: self.args,
            env: self.env,
            working_dir: self.working_dir,
            pre_actions: self.pre_actions,
        }
    }
}
