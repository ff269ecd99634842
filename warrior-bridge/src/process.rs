//! Run an external tool with an optional deadline.
//!
//! stdout and stderr are drained on helper threads so a chatty child cannot
//! block on a full pipe while we poll it.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use warrior_sync::CollaboratorError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Run `program args…`, returning stdout on success.
///
/// `tool` names the collaborator in errors (e.g. `osascript`, `task`).
/// With `timeout = None` the call waits as long as the tool runs.
pub(crate) fn run_tool(
    tool: &str,
    program: &str,
    args: &[String],
    timeout: Option<Duration>,
) -> Result<String, CollaboratorError> {
    tracing::debug!("running {program} ({} args)", args.len());

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CollaboratorError::Unavailable {
            tool: tool.to_string(),
            detail: if e.kind() == std::io::ErrorKind::NotFound {
                format!("`{program}` not found")
            } else {
                e.to_string()
            },
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match timeout {
        Some(limit) => wait_with_deadline(&mut child, tool, limit)?,
        None => child.wait().map_err(|e| wait_failed(tool, e))?,
    };

    let stdout = join(stdout);
    let stderr = join(stderr);

    if !status.success() {
        let diagnostic = match stderr.trim() {
            "" => format!("exited with {status}"),
            text => text.to_string(),
        };
        return Err(CollaboratorError::Failed {
            tool: tool.to_string(),
            diagnostic,
        });
    }
    Ok(stdout)
}

fn wait_with_deadline(
    child: &mut Child,
    tool: &str,
    limit: Duration,
) -> Result<ExitStatus, CollaboratorError> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().map_err(|e| wait_failed(tool, e))? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            tracing::warn!("{tool} did not finish within {}s; killed", limit.as_secs());
            return Err(CollaboratorError::Timeout {
                tool: tool.to_string(),
                after: limit,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn wait_failed(tool: &str, e: std::io::Error) -> CollaboratorError {
    CollaboratorError::Failed {
        tool: tool.to_string(),
        diagnostic: format!("could not wait for process: {e}"),
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<JoinHandle<String>> {
    pipe.map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[test]
    fn returns_stdout_on_success() {
        let out = run_tool("sh", "sh", &sh("printf 'a\\nb'"), Some(Duration::from_secs(5))).unwrap();
        assert_eq!(out, "a\nb");
    }

    #[test]
    fn missing_program_is_unavailable() {
        let err = run_tool("osascript", "definitely-not-a-real-binary-xyz", &[], None).unwrap_err();
        assert!(matches!(err, CollaboratorError::Unavailable { .. }), "got: {err}");
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn nonzero_exit_carries_stderr() {
        let err = run_tool("task", "sh", &sh("echo 'Unknown date' >&2; exit 2"), None).unwrap_err();
        match err {
            CollaboratorError::Failed { tool, diagnostic } => {
                assert_eq!(tool, "task");
                assert_eq!(diagnostic, "Unknown date");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn slow_tool_times_out() {
        let started = Instant::now();
        let err = run_tool("osascript", "sleep", &["5".to_string()], Some(Duration::from_millis(200)))
            .unwrap_err();
        assert!(err.is_timeout(), "got: {err}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn large_output_does_not_deadlock() {
        let out = run_tool(
            "sh",
            "sh",
            &sh("i=0; while [ $i -lt 20000 ]; do echo line-$i; i=$((i+1)); done"),
            Some(Duration::from_secs(30)),
        )
        .unwrap();
        assert_eq!(out.lines().count(), 20000);
    }
}
