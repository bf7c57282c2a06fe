//! Session protocol and macro execution tests

use std::net::SocketAddr;
use std::sync::Arc;

use macrodeck::{
    Action, Arg, ArgKind, Device, Dispatch, Macro, MacroRegistry, MediaCommand, Opcode, Outgoing,
};

mod common;
use common::{Call, RecordingBackend, dispatcher, volume_up_registry};

fn remote() -> SocketAddr {
    "192.168.1.50:52000".parse().unwrap()
}

#[tokio::test]
async fn test_run_macro_without_password() {
    let backend = Arc::new(RecordingBackend::new());
    let d = dispatcher(volume_up_registry(), Arc::clone(&backend), None);

    let (mut session, greeting) = d.on_open(remote()).await;
    assert_eq!(greeting, Outgoing::AuthNotRequired);
    assert!(session.is_authenticated());

    let reply = d.on_message(&mut session, "run-macro:volume_up").await;
    assert_eq!(reply, Dispatch::Ignore);
    assert_eq!(backend.calls(), vec![Call::VolumeInc(Device::Playback, 10)]);
}

#[tokio::test]
async fn test_password_flow() {
    let backend = Arc::new(RecordingBackend::new());
    let d = dispatcher(volume_up_registry(), Arc::clone(&backend), Some("abc"));

    let (mut session, greeting) = d.on_open(remote()).await;
    assert_eq!(greeting, Outgoing::AuthRequired);

    // Commands before auth do nothing
    assert_eq!(
        d.on_message(&mut session, "run-macro:volume_up").await,
        Dispatch::Ignore
    );
    assert!(backend.calls().is_empty());

    assert_eq!(
        d.on_message(&mut session, "auth:abc").await,
        Dispatch::Reply(Outgoing::AuthSuccess)
    );
    assert!(session.is_authenticated());

    d.on_message(&mut session, "run-macro:volume_up").await;
    assert_eq!(backend.calls(), vec![Call::VolumeInc(Device::Playback, 10)]);
}

#[tokio::test]
async fn test_wrong_password_closes_session() {
    let backend = Arc::new(RecordingBackend::new());
    let d = dispatcher(volume_up_registry(), Arc::clone(&backend), Some("abc"));

    let (mut session, _) = d.on_open(remote()).await;
    let reply = d.on_message(&mut session, "auth:abd").await;

    assert_eq!(reply, Dispatch::ReplyAndClose(Outgoing::AuthFail));
    assert!(!session.is_authenticated());
    assert!(session.is_closed());

    d.on_message(&mut session, "run-macro:volume_up").await;
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_reconnect_requires_auth_again() {
    let backend = Arc::new(RecordingBackend::new());
    let d = dispatcher(volume_up_registry(), Arc::clone(&backend), Some("abc"));

    let (mut first, _) = d.on_open(remote()).await;
    d.on_message(&mut first, "auth:abc").await;
    d.on_close(&first).await;

    let (second, greeting) = d.on_open(remote()).await;
    assert_eq!(greeting, Outgoing::AuthRequired);
    assert!(!second.is_authenticated());
    assert_eq!(d.sessions().len().await, 1);
}

#[tokio::test]
async fn test_unknown_macro_makes_no_calls() {
    let backend = Arc::new(RecordingBackend::new());
    let d = dispatcher(volume_up_registry(), Arc::clone(&backend), None);

    let (mut session, _) = d.on_open(remote()).await;
    let reply = d.on_message(&mut session, "run-macro:does_not_exist").await;

    assert_eq!(reply, Dispatch::Ignore);
    assert!(backend.calls().is_empty());
    assert!(!session.is_closed());
}

#[tokio::test]
async fn test_get_config_returns_blob() {
    let backend = Arc::new(RecordingBackend::new());
    let d = dispatcher(volume_up_registry(), backend, None);

    let (mut session, _) = d.on_open(remote()).await;
    let Dispatch::Reply(frame) = d.on_message(&mut session, "get-config").await else {
        panic!("expected a reply");
    };
    assert_eq!(
        frame.to_string(),
        r#"config:{"buttons":[{"label":"Vol+","macro":"volume_up"}]}"#
    );
}

#[tokio::test]
async fn test_wrong_argument_kind_makes_no_call() {
    let mut registry = MacroRegistry::new();
    registry.insert(
        "broken",
        Macro::new(vec![Action::new(Opcode::KeyClick, vec![Arg::Int(5)])]),
    );

    let backend = Arc::new(RecordingBackend::new());
    let d = dispatcher(registry, Arc::clone(&backend), None);
    let (mut session, _) = d.on_open(remote()).await;
    d.on_message(&mut session, "run-macro:broken").await;

    assert!(backend.calls().is_empty());
}

fn sample(kind: ArgKind) -> Arg {
    match kind {
        ArgKind::Int => Arg::Int(10),
        ArgKind::Str => Arg::from("firefox"),
    }
}

const fn other(kind: ArgKind) -> ArgKind {
    match kind {
        ArgKind::Int => ArgKind::Str,
        ArgKind::Str => ArgKind::Int,
    }
}

/// Argument lists that don't fit `op`: too few, too many, wrong kind per slot
fn misfits(op: Opcode) -> Vec<Vec<Arg>> {
    let shape = op.shape();
    let required = shape.required();
    let fitting: Vec<Arg> = required.iter().copied().map(sample).collect();
    let mut cases = Vec::new();

    if !fitting.is_empty() {
        cases.push(fitting[..fitting.len() - 1].to_vec());
    }

    match shape.rest() {
        None => {
            let mut extra = fitting.clone();
            extra.push(Arg::Int(1));
            cases.push(extra.clone());
            extra.pop();
            extra.push(Arg::from("x"));
            cases.push(extra);
        }
        Some(rest) => {
            let mut extra = fitting.clone();
            extra.push(sample(other(rest)));
            cases.push(extra);
        }
    }

    for (slot, kind) in required.iter().enumerate() {
        let mut wrong = fitting.clone();
        wrong[slot] = sample(other(*kind));
        cases.push(wrong);
    }

    cases
}

#[tokio::test]
async fn test_misfit_arguments_never_reach_backend() {
    let mut checked = 0;

    for op in Opcode::ALL.into_iter().filter(|op| *op != Opcode::Nop) {
        for args in misfits(op) {
            let backend = RecordingBackend::with_running(&["firefox"]);
            let step = Macro::new(vec![Action::new(op, args.clone())]);

            let report = step.run(&backend).await;

            assert_eq!(report.failures.len(), 1, "{op} {args:?}");
            assert!(report.failures[0].error.is_validation(), "{op} {args:?}");
            assert!(backend.calls().is_empty(), "{op} {args:?}: {:?}", backend.calls());
            checked += 1;
        }
    }

    assert!(checked > 28 * 2, "only {checked} cases");
}

#[tokio::test]
async fn test_steps_run_in_order_past_failures() {
    let steps = vec![
        Action::new(Opcode::KeyPress, vec![Arg::from("Ctrl")]),
        Action::new(Opcode::KeyClick, vec![Arg::Int(5)]),
        Action::from_name("make_coffee", vec![]),
        Action::new(Opcode::KeyType, vec![Arg::from("hello")]),
        Action::new(Opcode::VolumeMute, vec![Arg::from("extra")]),
        Action::new(Opcode::MediaNext, vec![]),
        Action::new(Opcode::CaptureDec, vec![Arg::Int(20)]),
        Action::new(Opcode::KeyRelease, vec![Arg::from("Ctrl")]),
    ];
    let m = Macro::new(steps);

    let backend = RecordingBackend::new();
    let report = m.run(&backend).await;

    assert_eq!(report.executed, 8);
    let failed: Vec<usize> = report.failures.iter().map(|f| f.index).collect();
    assert_eq!(failed, vec![1, 2, 4]);
    assert_eq!(
        backend.calls(),
        vec![
            Call::KeyPress("Ctrl".into()),
            Call::KeyType("hello".into()),
            Call::Media(MediaCommand::Next),
            Call::VolumeDec(Device::Capture, 20),
            Call::KeyRelease("Ctrl".into()),
        ]
    );
}

#[tokio::test]
async fn test_app_open_passes_extra_args() {
    let m = Macro::new(vec![Action::new(
        Opcode::AppOpen,
        vec![Arg::from("firefox"), Arg::from("--new-window"), Arg::from("https://example.org")],
    )]);

    let backend = RecordingBackend::new();
    assert!(m.run(&backend).await.is_clean());
    assert_eq!(
        backend.calls(),
        vec![Call::AppOpen(
            "firefox".into(),
            vec!["--new-window".into(), "https://example.org".into()]
        )]
    );
}

#[tokio::test]
async fn test_app_open_without_name_is_invalid() {
    let m = Macro::new(vec![Action::new(Opcode::AppOpen, vec![])]);
    let backend = RecordingBackend::new();

    let report = m.run(&backend).await;
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].error.is_validation());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_guarded_app_actions() {
    let m = Macro::new(vec![
        Action::new(Opcode::AppOpenIfClosed, vec![Arg::from("kitty")]),
        Action::new(Opcode::AppOpenIfClosed, vec![Arg::from("slack")]),
        Action::new(Opcode::AppCloseIfOpen, vec![Arg::from("slack")]),
        Action::new(Opcode::AppSwitchOrOpen, vec![Arg::from("kitty")]),
    ]);

    let backend = RecordingBackend::with_running(&["kitty"]);
    assert!(m.run(&backend).await.is_clean());
    assert_eq!(
        backend.calls(),
        vec![
            Call::AppRunning("kitty".into()),
            Call::AppRunning("slack".into()),
            Call::AppOpen("slack".into(), vec![]),
            Call::AppRunning("slack".into()),
            Call::AppRunning("kitty".into()),
            Call::AppSwitch("kitty".into()),
        ]
    );
}
