//! Tests for the launch state machine.

use super::*;
use crate::agent::resolve::Platform;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

fn request(driver: Driver, interactive: bool, format: OutputFormat) -> InvocationRequest {
    InvocationRequest {
        document: PathBuf::from("PRPs/feature.md"),
        driver,
        executable: None,
        interactive,
        output_format: format,
    }
}

/// Launcher whose search path is an empty scratch directory, so no real
/// agent CLI installed on the machine can be picked up.
fn launcher(dir: &Path) -> Launcher {
    let resolver = Resolver::new(
        Platform::Unix,
        Some(dir.as_os_str().to_os_string()),
        dir,
    );
    let options = LaunchOptions {
        working_dir: dir.to_path_buf(),
        allowed_tools: "Edit,Bash".to_string(),
        preview_chars: 100,
        executables: BTreeMap::new(),
    };
    Launcher::new(resolver, options, Arc::new(AtomicBool::new(false)))
}

fn run(
    launcher: &Launcher,
    request: InvocationRequest,
    prompt: &str,
) -> (Result<()>, String, String) {
    let mut out = Vec::new();
    let mut err = Vec::new();
    let result = {
        let mut console = Console::new(&mut out, &mut err);
        launcher.run(request, prompt, &mut console)
    };
    (
        result,
        String::from_utf8(out).unwrap(),
        String::from_utf8(err).unwrap(),
    )
}

#[test]
fn unresolved_real_driver_degrades_to_noop() {
    let req = request(Driver::Claude, false, OutputFormat::Json);
    let stage = after_resolution(req.clone(), &Resolution::NotFound, "prompt", "Edit");

    assert_eq!(stage, Stage::Noop(req.as_noop()));
}

#[test]
fn noop_driver_goes_straight_to_noop() {
    let req = request(Driver::Noop, false, OutputFormat::Text);
    let stage = after_resolution(req.clone(), &Resolution::NotFound, "prompt", "Edit");

    assert_eq!(stage, Stage::Noop(req));
}

#[test]
fn resolved_interactive_request_launches_attached() {
    let req = request(Driver::Claude, true, OutputFormat::Text);
    let resolution = Resolution::OnPath(PathBuf::from("/usr/bin/claude"));
    let stage = after_resolution(req.clone(), &resolution, "prompt", "Edit");

    assert_eq!(
        stage,
        Stage::LaunchInteractive {
            request: req,
            command: vec![
                "/usr/bin/claude".to_string(),
                "--allowedTools".to_string(),
                "Edit".to_string(),
            ],
        }
    );
}

#[test]
fn resolved_headless_request_launches_headless() {
    let req = request(Driver::Codex, false, OutputFormat::StreamJson);
    let resolution = Resolution::Explicit("my-codex".to_string());
    let stage = after_resolution(req.clone(), &resolution, "a\nb", "Edit");

    assert_eq!(
        stage,
        Stage::LaunchHeadless {
            request: req,
            command: vec!["my-codex".to_string(), "a b".to_string()],
        }
    );
}

#[test]
fn missing_executable_at_launch_degrades_to_noop() {
    let err = io::Error::from(io::ErrorKind::NotFound);
    assert_eq!(
        classify_launch_error(&err, true),
        Some(Degradation::ExecutableMissingAtLaunch)
    );
    assert_eq!(
        classify_launch_error(&err, false),
        Some(Degradation::ExecutableMissingAtLaunch)
    );
}

#[test]
fn interactive_os_failure_retries_headless_text() {
    let err = io::Error::other("argument list too long");
    let degradation = classify_launch_error(&err, true).unwrap();
    assert_eq!(degradation, Degradation::InteractiveLaunchFailed);

    let req = request(Driver::Codex, true, OutputFormat::Json);
    assert_eq!(
        degradation.apply(&req),
        Stage::Resolving(InvocationRequest {
            interactive: false,
            output_format: OutputFormat::Text,
            ..req
        })
    );
}

#[test]
fn headless_os_failure_is_not_degraded() {
    let err = io::Error::other("argument list too long");
    assert_eq!(classify_launch_error(&err, false), None);
}

#[test]
fn configured_executable_name_wins() {
    let temp = TempDir::new().unwrap();
    let mut launcher = launcher(temp.path());
    assert_eq!(launcher.executable_name(Driver::Codex).as_deref(), Some("codex"));

    launcher
        .options
        .executables
        .insert(Driver::Codex, "codex-nightly".to_string());
    assert_eq!(
        launcher.executable_name(Driver::Codex).as_deref(),
        Some("codex-nightly")
    );
    assert_eq!(launcher.executable_name(Driver::Noop), None);
}

#[test]
fn plan_reports_noop_when_nothing_resolves() {
    let temp = TempDir::new().unwrap();
    let req = request(Driver::Codex, false, OutputFormat::Text);

    assert_eq!(launcher(temp.path()).plan(req.clone(), "p"), Stage::Noop(req.as_noop()));
}

#[test]
fn run_without_agent_installed_completes_via_noop() {
    let temp = TempDir::new().unwrap();
    let (result, out, _) = run(
        &launcher(temp.path()),
        request(Driver::Codex, false, OutputFormat::Json),
        "prompt",
    );

    result.unwrap();
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["type"], "result");
    assert_eq!(doc["result"], noop::MARKER);
}

#[test]
fn stale_override_falls_back_to_noop() {
    let temp = TempDir::new().unwrap();
    let stale = temp.path().join("gone").join("claude");
    let req = InvocationRequest {
        executable: Some(stale.to_string_lossy().into_owned()),
        ..request(Driver::Claude, false, OutputFormat::Text)
    };

    let (result, out, _) = run(&launcher(temp.path()), req, "prompt");
    result.unwrap();
    assert_eq!(out, "PRP TEST OK\n");
}

#[test]
fn stale_override_in_interactive_mode_falls_back_to_noop() {
    let temp = TempDir::new().unwrap();
    let req = InvocationRequest {
        executable: Some(temp.path().join("missing").to_string_lossy().into_owned()),
        ..request(Driver::Codex, true, OutputFormat::Text)
    };

    let (result, out, _) = run(&launcher(temp.path()), req, "Do the thing");
    result.unwrap();
    assert!(out.starts_with("[noop] Interactive session start."));
    assert!(out.contains("Do the thing"));
}

/// The codex driver passes the prompt as its only argument, so with `sh` as
/// the executable the "prompt" is simply the path of the script to run.
#[cfg(unix)]
fn run_script(format: OutputFormat, body: &str) -> (Result<()>, String, String) {
    let temp = TempDir::new().unwrap();
    let script = temp.path().join("agent.sh");
    std::fs::write(&script, body).unwrap();

    let req = InvocationRequest {
        executable: Some("sh".to_string()),
        ..request(Driver::Codex, false, format)
    };
    run(&launcher(temp.path()), req, &script.to_string_lossy())
}

#[cfg(unix)]
#[test]
fn stream_mode_relays_events_and_skips_malformed_lines() {
    let (result, out, err) = run_script(
        OutputFormat::StreamJson,
        r#"echo '{"type":"system","subtype":"init","session_id":"s-1"}'
echo '{not json'
echo '{"type":"result","subtype":"success","result":"done","num_turns":2}'
"#,
    );

    result.unwrap();
    let events: Vec<Value> = out
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["session_id"], "s-1");
    assert_eq!(events[1]["result"], "done");
    assert!(err.contains("Session started: s-1"));
    assert!(err.contains("Turns: 2"));
}

#[cfg(unix)]
#[test]
fn stream_mode_failure_dumps_captured_stderr() {
    let (result, _, err) = run_script(
        OutputFormat::StreamJson,
        "echo '{\"type\":\"assistant\",\"message\":{\"content\":\"hi\"}}'\necho 'rate limited' >&2\nexit 4\n",
    );

    match result {
        Err(RunnerError::ChildFailed { code }) => assert_eq!(code, 4),
        other => panic!("expected ChildFailed, got {:?}", other),
    }
    assert!(err.contains("Runner failed with exit code 4"));
    assert!(err.contains("Error: rate limited"));
}

#[cfg(unix)]
#[test]
fn json_mode_pretty_prints_and_summarizes() {
    let (result, out, err) = run_script(
        OutputFormat::Json,
        "echo '{\"type\":\"result\",\"is_error\":false,\"session_id\":\"abc\",\"duration_ms\":12}'\n",
    );

    result.unwrap();
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["session_id"], "abc");
    assert!(out.contains("\n  \""), "expected pretty-printed JSON: {}", out);
    assert!(err.contains("Session: abc"));
    assert!(err.contains("Duration: 12ms"));
}

#[cfg(unix)]
#[test]
fn json_mode_wraps_unparseable_output() {
    let (result, out, _) = run_script(OutputFormat::Json, "echo 'not json at all'\n");

    result.unwrap();
    let doc: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(doc["error"], "parse failure");
    assert_eq!(doc["raw"], "not json at all\n");
}

#[cfg(unix)]
#[test]
fn json_mode_propagates_exit_code() {
    let (result, out, err) = run_script(OutputFormat::Json, "echo 'boom' >&2\nexit 3\n");

    match result {
        Err(RunnerError::ChildFailed { code }) => assert_eq!(code, 3),
        other => panic!("expected ChildFailed, got {:?}", other),
    }
    assert!(out.is_empty());
    assert!(err.contains("Runner failed with exit code 3"));
    assert!(err.contains("Error: boom"));
}

#[cfg(unix)]
#[test]
fn text_mode_propagates_exit_code() {
    let (result, _, err) = run_script(OutputFormat::Text, "exit 5\n");

    match result {
        Err(RunnerError::ChildFailed { code }) => assert_eq!(code, 5),
        other => panic!("expected ChildFailed, got {:?}", other),
    }
    assert!(err.contains("Runner failed with exit code 5"));
}

#[cfg(unix)]
#[test]
fn text_mode_success() {
    let (result, _, _) = run_script(OutputFormat::Text, "exit 0\n");
    result.unwrap();
}
