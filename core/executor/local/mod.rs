mod context;

pub use context::*;

use super::{ActionExecutionRequest, ActionExecutionResponse, Executor, ExecutorError};
use crate::model::{ActionInput, ActionOutput, ActionSpec, Digest, PreActionSpec};
use crate::store::StoreError;
use anyhow::Context;
use async_trait::async_trait;
use futures::future::try_join_all;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tokio::fs;
use tokio::process::Command;
use tracing::debug;

/// The exit code a signal-terminated process collapses to. Signal numbers are
/// not part of the output contract, so any abnormal termination is reported
/// as this sentinel, distinguishable from every valid exit code.
pub const SIGNAL_EXIT_CODE: i32 = -1;

const SUCCESS_EXIT_CODE: i32 = 0;

/// Runs concrete execution requests on the current host: materializes inputs
/// from the store into a fresh execution root, runs the declared pre-actions
/// and the main command, and uploads the declared outputs (plus captured
/// stdout/stderr) back into the store.
///
/// Each request gets its own execution root, so requests are isolated and the
/// store is the only shared resource.
///
pub struct LocalExecutor {
    ctx: LocalExecutorContext,
}

impl LocalExecutor {
    pub fn new(ctx: LocalExecutorContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Executor for LocalExecutor {
    #[tracing::instrument(name = "LocalExecutor::execute", skip(self, request))]
    async fn execute(
        &self,
        request: &ActionExecutionRequest,
    ) -> Result<ActionExecutionResponse, ExecutorError> {
        let exec_root = self.ctx.sandbox_root.join(uuid::Uuid::new_v4().to_string());
        fs::create_dir_all(&exec_root)
            .await
            .with_context(|| format!("could not create execution root {:?}", exec_root))?;

        // Materializations have no mutual order, but every one of them must
        // land before anything runs.
        try_join_all(
            request
                .inputs()
                .iter()
                .map(|input| self.materialize_input(&exec_root, input)),
        )
        .await?;

        self.prepare_outputs(&exec_root, request.outputs()).await?;

        let cwd = exec_root.join(request.spec().working_dir());
        fs::create_dir_all(&cwd)
            .await
            .with_context(|| format!("could not create working directory {:?}", cwd))?;

        for pre_action in request.spec().pre_actions() {
            self.run_pre_action(request.spec(), pre_action, &cwd).await?;
        }

        let output = spawn(request.spec().args(), request.spec().env(), &cwd).await?;
        let exit_code = output.status.code().unwrap_or(SIGNAL_EXIT_CODE);
        debug!("main command exited with code {}", exit_code);

        let output_digests = if exit_code == SUCCESS_EXIT_CODE {
            self.capture_outputs(&exec_root, request.outputs()).await?
        } else {
            vec![]
        };

        let stdout = self.ctx.store.put(&output.stdout).await?;
        let stderr = self.ctx.store.put(&output.stderr).await?;

        Ok(ActionExecutionResponse::new(
            output_digests,
            exit_code,
            stdout,
            stderr,
        ))
    }
}

impl LocalExecutor {
    /// Place one input at its path under the execution root. A path that
    /// already exists under this root is skipped: roots are used for exactly
    /// one execution and paths are unique within one action, so whatever is
    /// there is already this input's content.
    #[tracing::instrument(name = "LocalExecutor::materialize_input", skip(self, exec_root))]
    async fn materialize_input(
        &self,
        exec_root: &Path,
        input: &ActionInput,
    ) -> Result<(), ExecutorError> {
        let dst = exec_root.join(input.path());

        if fs::try_exists(&dst)
            .await
            .with_context(|| format!("could not stat {:?}", dst))?
        {
            return Ok(());
        }

        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("could not create directory {:?}", parent))?;
        }

        let result = if input.kind().is_directory() {
            self.ctx.store.export_tree(input.digest(), &dst).await
        } else {
            self.materialize_file(input, &dst).await
        };

        match result {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound { .. }) => Err(ExecutorError::MissingInput {
                digest: input.digest().clone(),
                path: input.path().to_path_buf(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    async fn materialize_file(&self, input: &ActionInput, dst: &Path) -> Result<(), StoreError> {
        let bytes = self
            .ctx
            .store
            .get(input.digest())
            .await?
            .ok_or_else(|| StoreError::NotFound {
                digest: input.digest().clone(),
            })?;

        fs::write(dst, &bytes)
            .await
            .map_err(|err| StoreError::IoError {
                path: dst.to_path_buf(),
                err,
            })?;

        if input.kind().is_executable() {
            let mut perms = fs::metadata(dst)
                .await
                .map_err(|err| StoreError::IoError {
                    path: dst.to_path_buf(),
                    err,
                })?
                .permissions();
            perms.set_mode(perms.mode() | 0o111);
            fs::set_permissions(dst, perms)
                .await
                .map_err(|err| StoreError::IoError {
                    path: dst.to_path_buf(),
                    err,
                })?;
        }

        Ok(())
    }

    /// The process is expected to, but not required to, create each output
    /// leaf itself. Its parent directory must exist either way.
    async fn prepare_outputs(
        &self,
        exec_root: &Path,
        outputs: &[ActionOutput],
    ) -> Result<(), ExecutorError> {
        for output in outputs {
            if let Some(parent) = exec_root.join(output.path()).parent() {
                fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("could not create directory {:?}", parent))?;
            }
        }
        Ok(())
    }

    #[tracing::instrument(name = "LocalExecutor::run_pre_action", skip_all)]
    async fn run_pre_action(
        &self,
        spec: &ActionSpec,
        pre_action: &PreActionSpec,
        cwd: &Path,
    ) -> Result<(), ExecutorError> {
        if pre_action.background() {
            return Err(ExecutorError::Unimplemented {
                feature: "background pre-actions".to_string(),
            });
        }

        let mut env = spec.env().clone();
        env.extend(
            pre_action
                .env()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );

        let output = spawn(pre_action.args(), &env, cwd).await?;
        if !output.status.success() {
            return Err(ExecutorError::PreActionFailure {
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            });
        }

        Ok(())
    }

    #[tracing::instrument(name = "LocalExecutor::capture_outputs", skip(self, exec_root))]
    async fn capture_outputs(
        &self,
        exec_root: &Path,
        outputs: &[ActionOutput],
    ) -> Result<Vec<Digest>, ExecutorError> {
        let mut digests = Vec::with_capacity(outputs.len());

        for output in outputs {
            let src = exec_root.join(output.path());
            let digest = if output.kind().is_directory() {
                if fs::try_exists(&src)
                    .await
                    .with_context(|| format!("could not stat {:?}", src))?
                {
                    self.ctx.store.import_tree(&src).await?
                } else {
                    // A directory output the command never created is a valid
                    // outcome: it has no entries.
                    self.ctx.store.empty_tree().await?
                }
            } else {
                let bytes = fs::read(&src)
                    .await
                    .with_context(|| format!("could not read declared output {:?}", src))?;
                self.ctx.store.put(&bytes).await?
            };
            digests.push(digest);
        }

        Ok(digests)
    }
}

async fn spawn(
    args: &[String],
    env: &std::collections::BTreeMap<String, String>,
    cwd: &Path,
) -> Result<std::process::Output, ExecutorError> {
    let (program, rest) = args
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("cannot execute an empty argument vector"))?;

    let mut cmd = Command::new(program);
    cmd.args(rest).env_clear().envs(env).current_dir(cwd);

    debug!("spawning {:?} in {:?}", args, cwd);

    let output = cmd
        .output()
        .await
        .with_context(|| format!("could not spawn {:?}", program))?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ActionSpec, ArtifactKind};
    use crate::store::{CasStore, DefaultStore};
    use crate::Config;
    use std::path::PathBuf;
    use std::sync::Arc;

    struct Fixture {
        _root: assert_fs::TempDir,
        store: Arc<DefaultStore>,
        executor: LocalExecutor,
    }

    fn fixture() -> Fixture {
        let root = assert_fs::TempDir::new().unwrap();
        let config = Config::builder()
            .kiln_root(root.path().to_path_buf())
            .build()
            .unwrap();
        let store = Arc::new(DefaultStore::new(&config));
        let ctx = LocalExecutorContext::new(&config, store.clone());
        Fixture {
            _root: root,
            store,
            executor: LocalExecutor::new(ctx),
        }
    }

    fn sh(script: &str) -> ActionSpec {
        ActionSpec::builder()
            .args(["/bin/sh", "-c", script])
            .env("PATH", "/usr/bin:/bin")
            .build()
    }

    fn file_input(digest: Digest, path: &str) -> ActionInput {
        ActionInput::new(digest, PathBuf::from(path), ArtifactKind::File)
    }

    fn file_output(path: &str) -> ActionOutput {
        ActionOutput::new(PathBuf::from(path), ArtifactKind::File)
    }

    #[tokio::test]
    async fn copies_an_input_to_an_output() {
        let f = fixture();
        let d1 = f.store.put(b"the input bytes").await.unwrap();

        let request = ActionExecutionRequest::new(
            sh("cp in.txt out.txt"),
            vec![file_input(d1.clone(), "in.txt")],
            vec![file_output("out.txt")],
        );

        let response = f.executor.execute(&request).await.unwrap();

        assert_eq!(response.exit_code(), 0);
        assert_eq!(response.outputs(), &[d1]);
        // empty streams still get uploaded
        assert_eq!(response.stdout(), &Digest::of_bytes(b""));
        assert_eq!(response.stderr(), &Digest::of_bytes(b""));
    }

    #[tokio::test]
    async fn nonzero_exit_is_a_response_with_no_outputs() {
        let f = fixture();
        let d1 = f.store.put(b"the input bytes").await.unwrap();

        let request = ActionExecutionRequest::new(
            sh("exit 2"),
            vec![file_input(d1, "in.txt")],
            vec![file_output("out.txt")],
        );

        let response = f.executor.execute(&request).await.unwrap();

        assert_eq!(response.exit_code(), 2);
        assert!(response.outputs().is_empty());
        assert!(f.store.get(response.stdout()).await.unwrap().is_some());
        assert!(f.store.get(response.stderr()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let f = fixture();

        let request = ActionExecutionRequest::new(
            sh("echo hello; echo oops >&2"),
            vec![],
            vec![],
        );

        let response = f.executor.execute(&request).await.unwrap();

        assert_eq!(response.exit_code(), 0);
        assert_eq!(response.stdout(), &Digest::of_bytes(b"hello\n"));
        assert_eq!(response.stderr(), &Digest::of_bytes(b"oops\n"));
    }

    #[tokio::test]
    async fn a_directory_output_the_command_never_created_is_the_empty_tree() {
        let f = fixture();

        let request = ActionExecutionRequest::new(
            sh("true"),
            vec![],
            vec![ActionOutput::new(
                PathBuf::from("gen"),
                ArtifactKind::Directory,
            )],
        );

        let response = f.executor.execute(&request).await.unwrap();

        let empty = f.store.empty_tree().await.unwrap();
        assert_eq!(response.outputs(), &[empty]);
    }

    #[tokio::test]
    async fn captures_a_directory_output_the_command_did_create() {
        let f = fixture();

        let request = ActionExecutionRequest::new(
            sh("mkdir -p gen && echo alpha > gen/a.txt"),
            vec![],
            vec![ActionOutput::new(
                PathBuf::from("gen"),
                ArtifactKind::Directory,
            )],
        );

        let response = f.executor.execute(&request).await.unwrap();
        assert_eq!(response.exit_code(), 0);

        let dst = assert_fs::TempDir::new().unwrap();
        let out = dst.path().join("gen");
        f.store
            .export_tree(&response.outputs()[0], &out)
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(out.join("a.txt")).unwrap(), "alpha\n");
    }

    #[tokio::test]
    async fn materializes_a_directory_input() {
        let f = fixture();

        let src = assert_fs::TempDir::new().unwrap();
        std::fs::write(src.path().join("data.txt"), "from a tree").unwrap();
        let tree = f.store.import_tree(src.path()).await.unwrap();

        let request = ActionExecutionRequest::new(
            sh("cp data/data.txt out.txt"),
            vec![ActionInput::new(
                tree,
                PathBuf::from("data"),
                ArtifactKind::Directory,
            )],
            vec![file_output("out.txt")],
        );

        let response = f.executor.execute(&request).await.unwrap();

        assert_eq!(response.exit_code(), 0);
        assert_eq!(response.outputs(), &[Digest::of_bytes(b"from a tree")]);
    }

    #[tokio::test]
    async fn runs_an_executable_input() {
        let f = fixture();
        let tool = f.store.put(b"#!/bin/sh\necho ran-the-tool\n").await.unwrap();

        let request = ActionExecutionRequest::new(
            ActionSpec::builder().args(["./tool.sh"]).build(),
            vec![ActionInput::new(
                tool,
                PathBuf::from("tool.sh"),
                ArtifactKind::ExecutableFile,
            )],
            vec![],
        );

        let response = f.executor.execute(&request).await.unwrap();

        assert_eq!(response.exit_code(), 0);
        assert_eq!(response.stdout(), &Digest::of_bytes(b"ran-the-tool\n"));
    }

    #[tokio::test]
    async fn a_missing_input_fails_before_anything_runs() {
        let f = fixture();
        let marker = assert_fs::TempDir::new().unwrap();
        let marker_file = marker.path().join("ran");

        let request = ActionExecutionRequest::new(
            sh(&format!("touch {}", marker_file.display())),
            vec![file_input(Digest::of_bytes(b"never stored"), "in.txt")],
            vec![],
        );

        let result = f.executor.execute(&request).await;

        assert_matches!(
            result.unwrap_err(),
            ExecutorError::MissingInput { path, .. } if path == PathBuf::from("in.txt")
        );
        assert!(!marker_file.exists());
    }

    #[tokio::test]
    async fn a_failing_foreground_pre_action_aborts_before_the_main_command() {
        let f = fixture();
        let marker = assert_fs::TempDir::new().unwrap();
        let marker_file = marker.path().join("ran");

        let touch = format!("touch {}", marker_file.display());
        let spec = ActionSpec::builder()
            .args(["/bin/sh", "-c", touch.as_str()])
            .env("PATH", "/usr/bin:/bin")
            .pre_action(PreActionSpec::new(
                vec!["/bin/sh".into(), "-c".into(), "echo boom >&2; exit 1".into()],
                Default::default(),
                false,
            ))
            .build();

        let request = ActionExecutionRequest::new(spec, vec![], vec![]);
        let result = f.executor.execute(&request).await;

        assert_matches!(
            result.unwrap_err(),
            ExecutorError::PreActionFailure { stderr } if stderr.contains("boom")
        );
        assert!(!marker_file.exists());
    }

    #[tokio::test]
    async fn pre_action_env_overrides_the_main_env() {
        let f = fixture();

        let mut env = std::collections::BTreeMap::new();
        env.insert("GREETING".to_string(), "override".to_string());

        let spec = ActionSpec::builder()
            .args(["/bin/sh", "-c", "true"])
            .env("GREETING", "main")
            .pre_action(PreActionSpec::new(
                vec![
                    "/bin/sh".into(),
                    "-c".into(),
                    "test \"$GREETING\" = override".into(),
                ],
                env,
                false,
            ))
            .build();

        let request = ActionExecutionRequest::new(spec, vec![], vec![]);
        let response = f.executor.execute(&request).await.unwrap();
        assert_eq!(response.exit_code(), 0);
    }

    #[tokio::test]
    async fn background_pre_actions_are_unimplemented() {
        let f = fixture();

        let spec = ActionSpec::builder()
            .args(["/bin/true"])
            .pre_action(PreActionSpec::new(
                vec!["/bin/true".into()],
                Default::default(),
                true,
            ))
            .build();

        let request = ActionExecutionRequest::new(spec, vec![], vec![]);
        let result = f.executor.execute(&request).await;

        assert_matches!(result.unwrap_err(), ExecutorError::Unimplemented { .. });
    }

    #[tokio::test]
    async fn signal_termination_collapses_to_the_sentinel_code() {
        let f = fixture();

        let request = ActionExecutionRequest::new(sh("kill -9 $$"), vec![], vec![]);
        let response = f.executor.execute(&request).await.unwrap();

        assert_eq!(response.exit_code(), SIGNAL_EXIT_CODE);
        assert!(response.outputs().is_empty());
    }

    #[tokio::test]
    async fn duplicate_input_paths_materialize_once() {
        let f = fixture();
        let d1 = f.store.put(b"same bytes").await.unwrap();

        let request = ActionExecutionRequest::new(
            sh("cp in.txt out.txt"),
            vec![
                file_input(d1.clone(), "in.txt"),
                file_input(d1.clone(), "in.txt"),
            ],
            vec![file_output("out.txt")],
        );

        let response = f.executor.execute(&request).await.unwrap();

        assert_eq!(response.exit_code(), 0);
        assert_eq!(response.outputs(), &[d1]);
    }
}
