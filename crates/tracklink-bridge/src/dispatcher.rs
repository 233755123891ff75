// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command dispatcher: host command -> validated request -> one provider call
// -> exactly one host callback.
//
// Malformed commands fail synchronously without touching the provider.
// Deferred commands hand the provider a `Completion` and return at once; the
// host callback fires only when the provider fires that completion.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, warn};
use tracklink_core::config::BridgeConfig;
use tracklink_core::error::{Result, TracklinkError};
use tracklink_core::protocol::{Failure, FailureKind, HostCommand};
use tracklink_core::types::{CommandId, Platform};

use crate::command::{CommandName, Request};
use crate::completion::Completion;
use crate::event::EventPayload;
use crate::responder::{PendingCommand, Responder};
use crate::traits::*;

/// Instruction name used to identify the host framework to the provider.
pub const WRAPPER_INSTRUCTION: &str = "wrapper";

/// Routes host commands to the shared tracking provider.
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn TrackingProvider>,
    config: BridgeConfig,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("provider", &self.provider.name())
            .field("config", &self.config)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn TrackingProvider>, config: BridgeConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Platform used for gating: the configured override, else the provider's.
    pub fn platform(&self) -> Platform {
        self.config.platform.unwrap_or_else(|| self.provider.platform())
    }

    /// Dispatch `command`; `responder` fires at most once.
    pub fn dispatch(&self, command: HostCommand, responder: Responder) {
        let id = command.id;
        debug!(%id, command = %command.command, args = command.args.len(), "dispatching");

        let (name, request) = match self.prepare(&command) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(%id, command = %command.command, error = %e, "rejected host command");
                responder.fail(Failure::from(e));
                return;
            }
        };

        if let Some(required) = name.required_platform() {
            let platform = self.platform();
            if required != platform {
                warn!(%id, command = %name, %platform, "API is not available on this platform");
                responder.succeed(Value::Null);
                return;
            }
        }

        self.execute(id, name, request, responder);
    }

    /// Dispatch `command` and return a handle that resolves with its outcome.
    pub fn submit(&self, command: HostCommand) -> PendingCommand {
        let (responder, pending) = Responder::pending(command.id);
        self.dispatch(command, responder);
        pending
    }

    /// Convenience for `submit` with a fresh command id.
    pub fn call(&self, command: &str, args: Vec<Value>) -> PendingCommand {
        self.submit(HostCommand::new(command, args))
    }

    fn prepare(&self, command: &HostCommand) -> Result<(CommandName, Request)> {
        let name: CommandName = command.command.parse()?;
        let request = Request::parse(name, &command.args, self.default_deeplink_timeout())?;
        Ok((name, request))
    }

    fn default_deeplink_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.config.default_deeplink_timeout_secs)
            .ok()
            .filter(|d| !d.is_zero())
            .unwrap_or(Duration::from_secs(10))
    }

    fn execute(&self, id: CommandId, command: CommandName, request: Request, responder: Responder) {
        let provider = &self.provider;

        let result = match request {
            Request::ExecuteAdvancedInstruction { name, value } => provider
                .execute_advanced_instruction(&name, &value)
                .map(|()| Value::Null),
            Request::SetLogLevel(level) => provider
                .set_log_level(level)
                .map(|()| json!(level.as_str())),
            Request::SetSleep(sleep) => provider.set_sleep(sleep).map(|()| json!(sleep)),
            Request::SetAppLimitAdTracking(limit) => provider
                .set_app_limit_ad_tracking(limit)
                .map(|()| json!(limit)),
            Request::RegisterCustomDeviceIdentifier { name, value } => provider
                .register_custom_device_identifier(&name, &value)
                .map(|()| Value::Null),
            Request::RegisterIdentityLink { name, value } => provider
                .register_identity_link(&name, &value)
                .map(|()| Value::Null),
            Request::EnableInstantApps { instant_app_guid } => provider
                .enable_instant_apps(&instant_app_guid)
                .map(|()| Value::Null),
            Request::EnableAppClips { identifier } => {
                provider.enable_app_clips(&identifier).map(|()| Value::Null)
            }
            Request::EnableAtt => provider.enable_att().map(|()| Value::Null),
            Request::SetAttAuthorizationWaitTime(wait) => provider
                .set_att_authorization_wait_time(wait)
                .map(|()| json!(wait.as_secs_f64())),
            Request::SetAttAuthorizationAutoRequest(auto) => provider
                .set_att_authorization_auto_request(auto)
                .map(|()| json!(auto)),
            Request::RegisterPrivacyProfile { name, keys } => provider
                .register_privacy_profile(&name, &keys)
                .map(|()| Value::Null),
            Request::SetPrivacyProfileEnabled { name, enabled } => provider
                .set_privacy_profile_enabled(&name, enabled)
                .map(|()| json!(enabled)),
            Request::Start {
                android_app_guid,
                ios_app_guid,
                partner_name,
            } => match self.start_target(command, android_app_guid, ios_app_guid, partner_name) {
                Ok(target) => self.start(target),
                Err(e) => {
                    warn!(%id, %command, error = %e, "rejected host command");
                    responder.fail(Failure::from(e));
                    return;
                }
            },
            Request::Shutdown { delete_data } => {
                provider.shutdown(delete_data).map(|()| Value::Null)
            }
            Request::RegisterPushToken(token) => {
                provider.register_push_token(&token).map(|()| Value::Null)
            }
            Request::SetPushEnabled(enabled) => {
                provider.set_push_enabled(enabled).map(|()| json!(enabled))
            }
            Request::SendEvent(payload) => send_event(&**provider, self.platform(), &payload),

            // Deferred: the completion owns the responder from here on.
            Request::GetStarted => {
                provider.started(relay(id, command, responder));
                return;
            }
            Request::GetDeviceId => {
                provider.device_id(relay(id, command, responder));
                return;
            }
            Request::GetInstallAttribution => {
                provider.install_attribution(relay(id, command, responder));
                return;
            }
            Request::RetrieveInstallAttribution => {
                provider.retrieve_install_attribution(relay(id, command, responder));
                return;
            }
            Request::ProcessDeeplink { path, timeout } => {
                provider.process_deeplink(&path, timeout, relay(id, command, responder));
                return;
            }
        };

        match result {
            Ok(payload) => {
                debug!(%id, %command, "resolved");
                responder.succeed(payload);
            }
            Err(e) => responder.fail(failure_for(id, command, e)),
        }
    }

    /// Pick the app GUID for this platform, else the partner name.
    fn start_target(
        &self,
        name: CommandName,
        android_app_guid: Option<String>,
        ios_app_guid: Option<String>,
        partner_name: Option<String>,
    ) -> Result<StartTarget> {
        let app_guid = match self.platform() {
            Platform::Android => android_app_guid,
            Platform::Ios => ios_app_guid,
            Platform::Desktop => android_app_guid.or(ios_app_guid),
        };

        match (app_guid, partner_name) {
            (Some(guid), _) => Ok(StartTarget::AppGuid(guid)),
            (None, Some(partner)) => Ok(StartTarget::PartnerName(partner)),
            (None, None) => Err(TracklinkError::invalid_args(
                name.as_str(),
                "no app guid or partner name was registered",
            )),
        }
    }

    fn start(&self, target: StartTarget) -> Result<Value> {
        if let Some(wrapper) = &self.config.wrapper {
            if let Err(e) = self
                .provider
                .execute_advanced_instruction(WRAPPER_INSTRUCTION, &wrapper.instruction_value())
            {
                warn!(error = %e, "provider rejected wrapper instruction");
            }
        }

        match target {
            StartTarget::AppGuid(guid) => self.provider.start_with_app_guid(&guid),
            StartTarget::PartnerName(partner) => self.provider.start_with_partner_name(&partner),
        }
        .map(|()| Value::Null)
    }
}

enum StartTarget {
    AppGuid(String),
    PartnerName(String),
}

/// Event objects are trimmed to the receipt that applies on `platform`.
fn send_event(
    provider: &dyn TrackingProvider,
    platform: Platform,
    payload: &EventPayload,
) -> Result<Value> {
    match payload {
        EventPayload::Name(name) => provider.send_event(name),
        EventPayload::NameWithString { name, data } => provider.send_event_with_string(name, data),
        EventPayload::NameWithMapping { name, data } => {
            provider.send_event_with_mapping(name, data)
        }
        EventPayload::Event(event) => provider.send_event_object(&event.for_platform(platform)),
    }
    .map(|()| Value::Null)
}

/// Wrap `responder` in a completion that converts the provider's result into
/// a host outcome.
fn relay<T: Serialize + 'static>(
    id: CommandId,
    name: CommandName,
    responder: Responder,
) -> Completion<T> {
    debug!(%id, command = %name, "awaiting provider completion");
    Completion::new(name.as_str(), move |result: Result<T>| {
        let outcome = result.and_then(|value| serde_json::to_value(value).map_err(Into::into));
        match outcome {
            Ok(payload) => {
                debug!(%id, command = %name, "provider completed");
                responder.succeed(payload);
            }
            Err(e) => responder.fail(failure_for(id, name, e)),
        }
    })
}

/// Anything the provider reports, sync or async, is a provider failure.
fn failure_for(id: CommandId, name: CommandName, err: TracklinkError) -> Failure {
    error!(%id, command = %name, error = %err, "provider failure");
    Failure::new(FailureKind::ProviderFailure, err.to_string())
}
