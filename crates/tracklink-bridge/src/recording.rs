// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory provider that records every call.
//
// Used as the test double for the dispatcher and as the backend of the host
// simulator. Asynchronous operations either answer straight away from
// canned state (`CompletionMode::Immediate`) or are parked until the caller
// releases them (`CompletionMode::Deferred`), which lets tests observe the
// pending window and fire completions in any order.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde_json::{Map, Value, json};
use tracing::debug;
use tracklink_core::error::{Result, TracklinkError};
use tracklink_core::types::{Deeplink, Event, InstallAttribution, LogLevel, Platform};

use crate::completion::Completion;
use crate::traits::*;

/// One provider invocation, as seen by the recording provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    StartWithAppGuid(String),
    StartWithPartnerName(String),
    Shutdown { delete_data: bool },
    Started,
    ExecuteAdvancedInstruction { name: String, value: String },
    SetLogLevel(LogLevel),
    SetSleep(bool),
    SetAppLimitAdTracking(bool),
    RegisterCustomDeviceIdentifier { name: String, value: String },
    RegisterIdentityLink { name: String, value: String },
    DeviceId,
    EnableInstantApps(String),
    EnableAppClips(String),
    EnableAtt,
    SetAttAuthorizationWaitTime(Duration),
    SetAttAuthorizationAutoRequest(bool),
    RegisterPrivacyProfile { name: String, keys: Vec<String> },
    SetPrivacyProfileEnabled { name: String, enabled: bool },
    InstallAttribution,
    RetrieveInstallAttribution,
    ProcessDeeplink { path: String, timeout: Duration },
    RegisterPushToken(String),
    SetPushEnabled(bool),
    SendEvent(String),
    SendEventWithString { name: String, data: String },
    SendEventWithMapping { name: String, data: Map<String, Value> },
    SendEventObject(Event),
}

/// How asynchronous operations are answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionMode {
    Immediate,
    Deferred,
}

/// A parked completion waiting to be released.
#[derive(Debug)]
pub enum ParkedCompletion {
    Started(Completion<bool>),
    DeviceId(Completion<String>),
    InstallAttribution(Completion<InstallAttribution>),
    RetrieveInstallAttribution(Completion<InstallAttribution>),
    Deeplink { path: String, done: Completion<Deeplink> },
}

impl ParkedCompletion {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Started(done) => done.operation(),
            Self::DeviceId(done) => done.operation(),
            Self::InstallAttribution(done) | Self::RetrieveInstallAttribution(done) => {
                done.operation()
            }
            Self::Deeplink { done, .. } => done.operation(),
        }
    }

    /// Fire with an error instead of a result.
    pub fn fail(self, message: &str) -> bool {
        match self {
            Self::Started(done) => done.fail(message),
            Self::DeviceId(done) => done.fail(message),
            Self::InstallAttribution(done) | Self::RetrieveInstallAttribution(done) => {
                done.fail(message)
            }
            Self::Deeplink { done, .. } => done.fail(message),
        }
    }
}

#[derive(Debug)]
struct State {
    started: bool,
    sleeping: bool,
    device_id: String,
    attribution: InstallAttribution,
    /// When set, every operation fails with this message.
    failure: Option<String>,
    calls: Vec<ProviderCall>,
    parked: Vec<ParkedCompletion>,
}

/// Recording tracking provider.
#[derive(Debug)]
pub struct RecordingProvider {
    platform: Platform,
    mode: CompletionMode,
    state: Mutex<State>,
}

impl RecordingProvider {
    pub fn new(platform: Platform, mode: CompletionMode) -> Self {
        Self {
            platform,
            mode,
            state: Mutex::new(State {
                started: false,
                sleeping: false,
                device_id: "KA0000000000000000000000000000000".to_string(),
                attribution: InstallAttribution::default(),
                failure: None,
                calls: Vec::new(),
                parked: Vec::new(),
            }),
        }
    }

    /// Immediate-mode provider for the given platform.
    pub fn immediate(platform: Platform) -> Self {
        Self::new(platform, CompletionMode::Immediate)
    }

    /// Deferred-mode provider for the given platform.
    pub fn deferred(platform: Platform) -> Self {
        Self::new(platform, CompletionMode::Deferred)
    }

    pub fn with_device_id(self, device_id: impl Into<String>) -> Self {
        self.state().device_id = device_id.into();
        self
    }

    pub fn with_attribution(self, attribution: InstallAttribution) -> Self {
        self.state().attribution = attribution;
        self
    }

    /// Make every later operation fail with `message`, or clear with `None`.
    pub fn set_failure(&self, message: Option<&str>) {
        self.state().failure = message.map(str::to_string);
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    pub fn is_started(&self) -> bool {
        self.state().started
    }

    pub fn is_sleeping(&self) -> bool {
        self.state().sleeping
    }

    pub fn parked_count(&self) -> usize {
        self.state().parked.len()
    }

    /// Remove and return every parked completion, oldest first.
    pub fn take_parked(&self) -> Vec<ParkedCompletion> {
        std::mem::take(&mut self.state().parked)
    }

    /// Answer every parked completion from current state. Returns how many
    /// fired.
    pub fn release_all(&self) -> usize {
        self.take_parked()
            .into_iter()
            .map(|parked| self.answer(parked))
            .filter(|fired| *fired)
            .count()
    }

    /// Answer one parked completion from current state.
    pub fn answer(&self, parked: ParkedCompletion) -> bool {
        let (started, device_id, attribution, failure) = {
            let state = self.state();
            (
                state.started,
                state.device_id.clone(),
                state.attribution.clone(),
                state.failure.clone(),
            )
        };

        if let Some(message) = failure {
            return parked.fail(&message);
        }

        match parked {
            ParkedCompletion::Started(done) => done.succeed(started),
            ParkedCompletion::DeviceId(done) => done.succeed(device_id),
            ParkedCompletion::InstallAttribution(done) => done.succeed(attribution),
            ParkedCompletion::RetrieveInstallAttribution(done) => {
                let retrieved = InstallAttribution {
                    retrieved: true,
                    ..attribution
                };
                self.state().attribution = retrieved.clone();
                done.succeed(retrieved)
            }
            ParkedCompletion::Deeplink { path, done } => done.succeed(Deeplink {
                destination: path.clone(),
                raw: json!({ "uri": path }),
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Record a synchronous call and apply `effect` unless failing.
    fn record(&self, call: ProviderCall, effect: impl FnOnce(&mut State)) -> Result<()> {
        debug!(?call, "recording provider call");
        let mut state = self.state();
        state.calls.push(call);
        if let Some(message) = &state.failure {
            return Err(TracklinkError::provider(message.clone()));
        }
        effect(&mut state);
        Ok(())
    }

    /// Record an asynchronous call and either answer or park it.
    fn record_async(&self, call: ProviderCall, parked: ParkedCompletion) {
        debug!(?call, "recording provider call");
        self.state().calls.push(call);
        match self.mode {
            CompletionMode::Immediate => {
                self.answer(parked);
            }
            CompletionMode::Deferred => self.state().parked.push(parked),
        }
    }
}

impl TrackingProvider for RecordingProvider {
    fn name(&self) -> &str {
        "recording"
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

impl TrackerLifecycle for RecordingProvider {
    fn start_with_app_guid(&self, app_guid: &str) -> Result<()> {
        self.record(ProviderCall::StartWithAppGuid(app_guid.into()), |s| s.started = true)
    }

    fn start_with_partner_name(&self, partner_name: &str) -> Result<()> {
        self.record(ProviderCall::StartWithPartnerName(partner_name.into()), |s| {
            s.started = true
        })
    }

    fn shutdown(&self, delete_data: bool) -> Result<()> {
        self.record(ProviderCall::Shutdown { delete_data }, |s| {
            s.started = false;
            if delete_data {
                s.attribution = InstallAttribution::default();
            }
        })
    }

    fn started(&self, done: Completion<bool>) {
        self.record_async(ProviderCall::Started, ParkedCompletion::Started(done))
    }

    fn execute_advanced_instruction(&self, name: &str, value: &str) -> Result<()> {
        self.record(
            ProviderCall::ExecuteAdvancedInstruction {
                name: name.into(),
                value: value.into(),
            },
            |_| {},
        )
    }
}

impl TrackerSettings for RecordingProvider {
    fn set_log_level(&self, level: LogLevel) -> Result<()> {
        self.record(ProviderCall::SetLogLevel(level), |_| {})
    }

    fn set_sleep(&self, sleep: bool) -> Result<()> {
        self.record(ProviderCall::SetSleep(sleep), |s| s.sleeping = sleep)
    }

    fn set_app_limit_ad_tracking(&self, limit: bool) -> Result<()> {
        self.record(ProviderCall::SetAppLimitAdTracking(limit), |_| {})
    }
}

impl IdentityRegistry for RecordingProvider {
    fn register_custom_device_identifier(&self, name: &str, value: &str) -> Result<()> {
        self.record(
            ProviderCall::RegisterCustomDeviceIdentifier {
                name: name.into(),
                value: value.into(),
            },
            |_| {},
        )
    }

    fn register_identity_link(&self, name: &str, value: &str) -> Result<()> {
        self.record(
            ProviderCall::RegisterIdentityLink {
                name: name.into(),
                value: value.into(),
            },
            |_| {},
        )
    }

    fn device_id(&self, done: Completion<String>) {
        self.record_async(ProviderCall::DeviceId, ParkedCompletion::DeviceId(done))
    }
}

impl PlatformFeatures for RecordingProvider {
    fn enable_instant_apps(&self, instant_app_guid: &str) -> Result<()> {
        self.record(ProviderCall::EnableInstantApps(instant_app_guid.into()), |_| {})
    }

    fn enable_app_clips(&self, identifier: &str) -> Result<()> {
        self.record(ProviderCall::EnableAppClips(identifier.into()), |_| {})
    }

    fn enable_att(&self) -> Result<()> {
        self.record(ProviderCall::EnableAtt, |_| {})
    }

    fn set_att_authorization_wait_time(&self, wait: Duration) -> Result<()> {
        self.record(ProviderCall::SetAttAuthorizationWaitTime(wait), |_| {})
    }

    fn set_att_authorization_auto_request(&self, auto_request: bool) -> Result<()> {
        self.record(ProviderCall::SetAttAuthorizationAutoRequest(auto_request), |_| {})
    }
}

impl PrivacyProfiles for RecordingProvider {
    fn register_privacy_profile(&self, name: &str, keys: &[String]) -> Result<()> {
        self.record(
            ProviderCall::RegisterPrivacyProfile {
                name: name.into(),
                keys: keys.to_vec(),
            },
            |_| {},
        )
    }

    fn set_privacy_profile_enabled(&self, name: &str, enabled: bool) -> Result<()> {
        self.record(
            ProviderCall::SetPrivacyProfileEnabled {
                name: name.into(),
                enabled,
            },
            |_| {},
        )
    }
}

impl AttributionQueries for RecordingProvider {
    fn install_attribution(&self, done: Completion<InstallAttribution>) {
        self.record_async(
            ProviderCall::InstallAttribution,
            ParkedCompletion::InstallAttribution(done),
        )
    }

    fn retrieve_install_attribution(&self, done: Completion<InstallAttribution>) {
        self.record_async(
            ProviderCall::RetrieveInstallAttribution,
            ParkedCompletion::RetrieveInstallAttribution(done),
        )
    }
}

impl DeeplinkProcessing for RecordingProvider {
    fn process_deeplink(&self, path: &str, timeout: Duration, done: Completion<Deeplink>) {
        self.record_async(
            ProviderCall::ProcessDeeplink {
                path: path.into(),
                timeout,
            },
            ParkedCompletion::Deeplink {
                path: path.into(),
                done,
            },
        )
    }
}

impl PushEngagement for RecordingProvider {
    fn register_push_token(&self, token: &str) -> Result<()> {
        self.record(ProviderCall::RegisterPushToken(token.into()), |_| {})
    }

    fn set_push_enabled(&self, enabled: bool) -> Result<()> {
        self.record(ProviderCall::SetPushEnabled(enabled), |_| {})
    }
}

impl EventSink for RecordingProvider {
    fn send_event(&self, name: &str) -> Result<()> {
        self.record(ProviderCall::SendEvent(name.into()), |_| {})
    }

    fn send_event_with_string(&self, name: &str, data: &str) -> Result<()> {
        self.record(
            ProviderCall::SendEventWithString {
                name: name.into(),
                data: data.into(),
            },
            |_| {},
        )
    }

    fn send_event_with_mapping(&self, name: &str, data: &Map<String, Value>) -> Result<()> {
        self.record(
            ProviderCall::SendEventWithMapping {
                name: name.into(),
                data: data.clone(),
            },
            |_| {},
        )
    }

    fn send_event_object(&self, event: &Event) -> Result<()> {
        self.record(ProviderCall::SendEventObject(event.clone()), |_| {})
    }
}
