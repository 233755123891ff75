// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end dispatch behaviour against the recording provider.

use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tracklink_bridge::{
    CommandName, Dispatcher, ParkedCompletion, ProviderCall, RecordingProvider,
    Responder, Settled, StubProvider,
};
use tracklink_core::config::BridgeConfig;
use tracklink_core::protocol::{FailureKind, HostCommand, Outcome};
use tracklink_core::types::{InstallAttribution, Platform};

fn immediate(platform: Platform) -> (Arc<RecordingProvider>, Dispatcher) {
    let provider = Arc::new(RecordingProvider::immediate(platform));
    let dispatcher = Dispatcher::new(provider.clone(), BridgeConfig::default());
    (provider, dispatcher)
}

fn deferred(platform: Platform) -> (Arc<RecordingProvider>, Dispatcher) {
    let provider = Arc::new(RecordingProvider::deferred(platform));
    let dispatcher = Dispatcher::new(provider.clone(), BridgeConfig::default());
    (provider, dispatcher)
}

/// Dispatch through a callback pair and record every firing.
fn dispatch_counting(
    dispatcher: &Dispatcher,
    command: &str,
    args: Vec<Value>,
) -> Arc<Mutex<Vec<Outcome>>> {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let (ok, err) = (Arc::clone(&fired), Arc::clone(&fired));
    let responder = Responder::new(
        move |payload| ok.lock().unwrap().push(Ok(payload)),
        move |failure| err.lock().unwrap().push(Err(failure)),
    );
    dispatcher.dispatch(HostCommand::new(command, args), responder);
    fired
}

async fn resolved(dispatcher: &Dispatcher, command: &str, args: Vec<Value>) -> Outcome {
    match dispatcher.call(command, args).settle().await {
        Settled::Resolved(outcome) => outcome,
        other => panic!("{command} did not resolve: {other:?}"),
    }
}

/// A valid argument list for every command.
fn sample_args(name: CommandName) -> Vec<Value> {
    match name {
        CommandName::ExecuteAdvancedInstruction
        | CommandName::RegisterCustomDeviceIdentifier
        | CommandName::RegisterIdentityLink => vec![json!("key"), json!("value")],
        CommandName::SetLogLevel => vec![json!("debug")],
        CommandName::SetSleep
        | CommandName::SetAppLimitAdTracking
        | CommandName::SetIosAttAuthorizationAutoRequest
        | CommandName::Shutdown
        | CommandName::SetPushEnabled => vec![json!(false)],
        CommandName::EnableAndroidInstantApps
        | CommandName::EnableIosAppClips
        | CommandName::RegisterPushToken
        | CommandName::ProcessDeeplink
        | CommandName::SendEvent => vec![json!("value")],
        CommandName::SetIosAttAuthorizationWaitTime => vec![json!(15)],
        CommandName::RegisterPrivacyProfile => vec![json!("profile"), json!(["email"])],
        CommandName::SetPrivacyProfileEnabled => vec![json!("profile"), json!(true)],
        CommandName::Start => vec![json!("ko-android"), json!("ko-ios"), Value::Null],
        CommandName::ProcessDeeplinkWithOverrideTimeout => vec![json!("value"), json!(3)],
        CommandName::SendEventWithString => vec![json!("Purchase"), json!("data")],
        CommandName::SendEventWithDictionary => vec![json!("Purchase"), json!({ "price": 1 })],
        CommandName::SendEventWithEvent => vec![json!({ "name": "Purchase" })],
        CommandName::EnableIosAtt
        | CommandName::GetStarted
        | CommandName::GetDeviceId
        | CommandName::GetInstallAttribution
        | CommandName::RetrieveInstallAttribution => vec![],
    }
}

#[test]
fn every_command_fires_exactly_one_callback() {
    for platform in [Platform::Android, Platform::Ios] {
        let (_, dispatcher) = immediate(platform);
        for name in CommandName::ALL {
            let fired = dispatch_counting(&dispatcher, name.as_str(), sample_args(name));
            let fired = fired.lock().unwrap();
            assert_eq!(fired.len(), 1, "{name} on {platform}");
            assert!(fired[0].is_ok(), "{name} on {platform}: {:?}", fired[0]);
        }
    }
}

#[test]
fn unknown_command_is_unsupported_and_provider_untouched() {
    let (provider, dispatcher) = immediate(Platform::Android);
    let fired = dispatch_counting(&dispatcher, "launchRocket", vec![json!(1)]);
    let fired = fired.lock().unwrap();
    assert_eq!(fired.len(), 1);
    let failure = fired[0].as_ref().unwrap_err();
    assert_eq!(failure.kind, FailureKind::UnsupportedOperation);
    assert!(failure.message.contains("launchRocket"));
    assert_eq!(provider.call_count(), 0);
}

#[test]
fn malformed_arguments_never_reach_provider() {
    let (provider, dispatcher) = immediate(Platform::Android);
    let cases = [
        ("setSleep", vec![json!("yes")]),
        ("setSleep", vec![]),
        ("registerIdentityLink", vec![json!("email")]),
        ("registerPrivacyProfile", vec![json!("p"), json!(["a", 2])]),
        ("processDeeplinkWithOverrideTimeout", vec![json!("p"), json!(-3)]),
        ("sendEvent", vec![json!(42)]),
        ("sendEvent", vec![json!("Purchase"), json!(7)]),
        ("sendEvent", vec![json!("a"), json!("b"), json!("c")]),
        ("sendEventWithEvent", vec![json!({ "data": {} })]),
        ("getDeviceId", vec![json!("extra")]),
    ];
    for (command, args) in cases {
        let fired = dispatch_counting(&dispatcher, command, args);
        let fired = fired.lock().unwrap();
        assert_eq!(fired.len(), 1, "{command}");
        let failure = fired[0].as_ref().unwrap_err();
        assert_eq!(failure.kind, FailureKind::InvalidArguments, "{command}");
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn send_event_routes_by_shape() {
    let (provider, dispatcher) = immediate(Platform::Ios);

    resolved(&dispatcher, "sendEvent", vec![json!("Level Complete")]).await.unwrap();
    resolved(&dispatcher, "sendEvent", vec![json!("Purchase"), json!("{\"sku\":1}")])
        .await
        .unwrap();
    resolved(&dispatcher, "sendEvent", vec![json!("Purchase"), json!({ "price": 9.99 })])
        .await
        .unwrap();
    resolved(
        &dispatcher,
        "sendEvent",
        vec![json!({ "name": "Purchase", "data": { "price": 9.99 } })],
    )
    .await
    .unwrap();

    let calls = provider.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(calls[0], ProviderCall::SendEvent("Level Complete".into()));
    assert_eq!(
        calls[1],
        ProviderCall::SendEventWithString {
            name: "Purchase".into(),
            data: "{\"sku\":1}".into(),
        }
    );
    assert!(matches!(
        &calls[2],
        ProviderCall::SendEventWithMapping { name, data } if name == "Purchase" && data["price"] == json!(9.99)
    ));
    assert!(matches!(
        &calls[3],
        ProviderCall::SendEventObject(event) if event.name == "Purchase" && event.data["price"] == json!(9.99)
    ));
}

#[tokio::test]
async fn deferred_commands_wait_for_provider() {
    let (provider, dispatcher) = deferred(Platform::Android);

    let mut pending = dispatcher.call("getDeviceId", vec![]);
    assert!(pending.try_outcome().is_none());
    assert_eq!(provider.parked_count(), 1);

    assert_eq!(provider.release_all(), 1);
    match pending.settle().await {
        Settled::Resolved(Ok(payload)) => assert!(payload.as_str().unwrap().starts_with("KA")),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn concurrent_requests_resolve_independently() {
    let provider = Arc::new(
        RecordingProvider::deferred(Platform::Android).with_attribution(InstallAttribution {
            retrieved: true,
            raw: json!({ "network": "organic" }),
            attributed: false,
            first_install: true,
        }),
    );
    let dispatcher = Dispatcher::new(provider.clone(), BridgeConfig::default());

    let started = dispatcher.call("getStarted", vec![]);
    let attribution = dispatcher.call("getInstallAttribution", vec![]);
    let deeplink = dispatcher.call("processDeeplink", vec![json!("https://x.test/promo")]);

    let mut parked = provider.take_parked();
    assert_eq!(parked.len(), 3);

    // Release out of order, failing the middle one.
    let deeplink_done = parked.pop().unwrap();
    let attribution_done = parked.pop().unwrap();
    let started_done = parked.pop().unwrap();
    assert!(matches!(deeplink_done, ParkedCompletion::Deeplink { .. }));

    let deeplink_task = tokio::spawn(deeplink.settle());
    let started_task = tokio::spawn(started.settle());

    std::thread::spawn({
        let provider = provider.clone();
        move || provider.answer(deeplink_done)
    })
    .join()
    .unwrap();
    assert!(attribution_done.fail("network unreachable"));
    assert!(provider.answer(started_done));

    match deeplink_task.await.unwrap() {
        Settled::Resolved(Ok(payload)) => {
            assert_eq!(payload["destination"], json!("https://x.test/promo"))
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(started_task.await.unwrap(), Settled::Resolved(Ok(json!(false))));
    match attribution.settle().await {
        Settled::Resolved(Err(failure)) => {
            assert_eq!(failure.kind, FailureKind::ProviderFailure);
            assert_eq!(failure.message, "network unreachable");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn attribution_payload_is_camel_case() {
    let provider = Arc::new(
        RecordingProvider::immediate(Platform::Ios).with_attribution(InstallAttribution {
            retrieved: true,
            raw: json!({}),
            attributed: true,
            first_install: false,
        }),
    );
    let dispatcher = Dispatcher::new(provider, BridgeConfig::default());
    let payload = resolved(&dispatcher, "getInstallAttribution", vec![]).await.unwrap();
    assert_eq!(payload["attributed"], json!(true));
    assert_eq!(payload["firstInstall"], json!(false));
}

#[test]
fn late_second_completion_is_ignored() {
    let (provider, dispatcher) = deferred(Platform::Ios);
    let fired = dispatch_counting(&dispatcher, "getStarted", vec![]);

    let parked = provider.take_parked();
    let [ParkedCompletion::Started(done)] = parked.as_slice() else {
        panic!("expected one parked getStarted completion");
    };
    let late = done.clone();

    assert!(done.succeed(true));
    assert!(!late.succeed(false));
    assert!(!late.fail("timed out"));

    let fired = fired.lock().unwrap();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0], Ok(json!(true)));
}

#[tokio::test]
async fn dropped_completion_abandons_command() {
    let (provider, dispatcher) = deferred(Platform::Android);
    let pending = dispatcher.call("retrieveInstallAttribution", vec![]);
    drop(provider.take_parked());
    assert_eq!(pending.settle().await, Settled::Abandoned);
}

#[tokio::test]
async fn gated_commands_succeed_without_provider_call() {
    let (provider, dispatcher) = immediate(Platform::Android);
    for (command, args) in [
        ("enableIosAppClips", vec![json!("com.example.clip")]),
        ("enableIosAtt", vec![]),
        ("setIosAttAuthorizationWaitTime", vec![json!(30)]),
        ("setIosAttAuthorizationAutoRequest", vec![json!(true)]),
    ] {
        assert_eq!(resolved(&dispatcher, command, args).await, Ok(Value::Null), "{command}");
    }
    assert_eq!(provider.call_count(), 0);

    resolved(&dispatcher, "enableAndroidInstantApps", vec![json!("ko-instant")])
        .await
        .unwrap();
    assert_eq!(
        provider.calls(),
        vec![ProviderCall::EnableInstantApps("ko-instant".into())]
    );
}

#[tokio::test]
async fn gating_still_validates_arguments() {
    let (provider, dispatcher) = immediate(Platform::Android);
    let failure = resolved(&dispatcher, "enableIosAppClips", vec![json!(3)])
        .await
        .unwrap_err();
    assert_eq!(failure.kind, FailureKind::InvalidArguments);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn start_then_shutdown_lifecycle() {
    let (provider, dispatcher) = immediate(Platform::Android);
    assert_eq!(resolved(&dispatcher, "getStarted", vec![]).await, Ok(json!(false)));

    resolved(
        &dispatcher,
        "start",
        vec![json!("ko-android"), json!("ko-ios"), Value::Null],
    )
    .await
    .unwrap();
    assert!(provider.is_started());
    assert_eq!(resolved(&dispatcher, "getStarted", vec![]).await, Ok(json!(true)));

    resolved(&dispatcher, "shutdown", vec![json!(true)]).await.unwrap();
    assert!(!provider.is_started());
}

#[tokio::test]
async fn stub_provider_reports_provider_failure() {
    let dispatcher = Dispatcher::new(
        Arc::new(StubProvider::new(Platform::Desktop)),
        BridgeConfig::default(),
    );
    for (command, args) in [
        ("setSleep", vec![json!(true)]),
        ("getDeviceId", vec![]),
        ("processDeeplink", vec![json!("https://x.test")]),
    ] {
        let failure = resolved(&dispatcher, command, args).await.unwrap_err();
        assert_eq!(failure.kind, FailureKind::ProviderFailure, "{command}");
    }
}

#[tokio::test]
async fn responses_carry_command_id() {
    let (_, dispatcher) = immediate(Platform::Android);
    let command = HostCommand::new("setPushEnabled", vec![json!(true)]);
    let id = command.id;
    let pending = dispatcher.submit(command);
    assert_eq!(pending.id(), id);
    assert_eq!(pending.settle().await, Settled::Resolved(Ok(json!(true))));
}
