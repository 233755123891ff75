// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The bridged command vocabulary and the typed requests built from it.
//
// Parsing is total: a host command either becomes exactly one `Request` or
// an `UnsupportedOperation` / `InvalidArguments` error. Nothing here touches
// the provider.

use std::time::Duration;

use serde_json::Value;
use tracklink_core::error::{Result, TracklinkError};
use tracklink_core::types::{LogLevel, Platform};

use crate::args::Args;
use crate::event::EventPayload;

/// Every command name the host may send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    ExecuteAdvancedInstruction,
    SetLogLevel,
    SetSleep,
    SetAppLimitAdTracking,
    RegisterCustomDeviceIdentifier,
    RegisterIdentityLink,
    EnableAndroidInstantApps,
    EnableIosAppClips,
    EnableIosAtt,
    SetIosAttAuthorizationWaitTime,
    SetIosAttAuthorizationAutoRequest,
    RegisterPrivacyProfile,
    SetPrivacyProfileEnabled,
    GetStarted,
    Start,
    Shutdown,
    GetDeviceId,
    GetInstallAttribution,
    RetrieveInstallAttribution,
    ProcessDeeplink,
    ProcessDeeplinkWithOverrideTimeout,
    RegisterPushToken,
    SetPushEnabled,
    SendEvent,
    SendEventWithString,
    SendEventWithDictionary,
    SendEventWithEvent,
}

impl CommandName {
    pub const ALL: [CommandName; 27] = [
        Self::ExecuteAdvancedInstruction,
        Self::SetLogLevel,
        Self::SetSleep,
        Self::SetAppLimitAdTracking,
        Self::RegisterCustomDeviceIdentifier,
        Self::RegisterIdentityLink,
        Self::EnableAndroidInstantApps,
        Self::EnableIosAppClips,
        Self::EnableIosAtt,
        Self::SetIosAttAuthorizationWaitTime,
        Self::SetIosAttAuthorizationAutoRequest,
        Self::RegisterPrivacyProfile,
        Self::SetPrivacyProfileEnabled,
        Self::GetStarted,
        Self::Start,
        Self::Shutdown,
        Self::GetDeviceId,
        Self::GetInstallAttribution,
        Self::RetrieveInstallAttribution,
        Self::ProcessDeeplink,
        Self::ProcessDeeplinkWithOverrideTimeout,
        Self::RegisterPushToken,
        Self::SetPushEnabled,
        Self::SendEvent,
        Self::SendEventWithString,
        Self::SendEventWithDictionary,
        Self::SendEventWithEvent,
    ];

    /// Host-facing command string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExecuteAdvancedInstruction => "executeAdvancedInstruction",
            Self::SetLogLevel => "setLogLevel",
            Self::SetSleep => "setSleep",
            Self::SetAppLimitAdTracking => "setAppLimitAdTracking",
            Self::RegisterCustomDeviceIdentifier => "registerCustomDeviceIdentifier",
            Self::RegisterIdentityLink => "registerIdentityLink",
            Self::EnableAndroidInstantApps => "enableAndroidInstantApps",
            Self::EnableIosAppClips => "enableIosAppClips",
            Self::EnableIosAtt => "enableIosAtt",
            Self::SetIosAttAuthorizationWaitTime => "setIosAttAuthorizationWaitTime",
            Self::SetIosAttAuthorizationAutoRequest => "setIosAttAuthorizationAutoRequest",
            Self::RegisterPrivacyProfile => "registerPrivacyProfile",
            Self::SetPrivacyProfileEnabled => "setPrivacyProfileEnabled",
            Self::GetStarted => "getStarted",
            Self::Start => "start",
            Self::Shutdown => "shutdown",
            Self::GetDeviceId => "getDeviceId",
            Self::GetInstallAttribution => "getInstallAttribution",
            Self::RetrieveInstallAttribution => "retrieveInstallAttribution",
            Self::ProcessDeeplink => "processDeeplink",
            Self::ProcessDeeplinkWithOverrideTimeout => "processDeeplinkWithOverrideTimeout",
            Self::RegisterPushToken => "registerPushToken",
            Self::SetPushEnabled => "setPushEnabled",
            Self::SendEvent => "sendEvent",
            Self::SendEventWithString => "sendEventWithString",
            Self::SendEventWithDictionary => "sendEventWithDictionary",
            Self::SendEventWithEvent => "sendEventWithEvent",
        }
    }

    /// Platform the command is limited to, if any.
    pub fn required_platform(&self) -> Option<Platform> {
        match self {
            Self::EnableAndroidInstantApps => Some(Platform::Android),
            Self::EnableIosAppClips
            | Self::EnableIosAtt
            | Self::SetIosAttAuthorizationWaitTime
            | Self::SetIosAttAuthorizationAutoRequest => Some(Platform::Ios),
            _ => None,
        }
    }
}

impl std::str::FromStr for CommandName {
    type Err = TracklinkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| TracklinkError::UnsupportedOperation(s.to_string()))
    }
}

impl std::fmt::Display for CommandName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated command, ready to forward to the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ExecuteAdvancedInstruction { name: String, value: String },
    SetLogLevel(LogLevel),
    SetSleep(bool),
    SetAppLimitAdTracking(bool),
    RegisterCustomDeviceIdentifier { name: String, value: String },
    RegisterIdentityLink { name: String, value: String },
    EnableInstantApps { instant_app_guid: String },
    EnableAppClips { identifier: String },
    EnableAtt,
    SetAttAuthorizationWaitTime(Duration),
    SetAttAuthorizationAutoRequest(bool),
    RegisterPrivacyProfile { name: String, keys: Vec<String> },
    SetPrivacyProfileEnabled { name: String, enabled: bool },
    GetStarted,
    Start {
        android_app_guid: Option<String>,
        ios_app_guid: Option<String>,
        partner_name: Option<String>,
    },
    Shutdown { delete_data: bool },
    GetDeviceId,
    GetInstallAttribution,
    RetrieveInstallAttribution,
    ProcessDeeplink { path: String, timeout: Duration },
    RegisterPushToken(String),
    SetPushEnabled(bool),
    SendEvent(EventPayload),
}

impl Request {
    /// Validate `values` against the signature of `name`.
    ///
    /// `default_deeplink_timeout` is used by `processDeeplink`, which carries
    /// no timeout of its own.
    pub fn parse(
        name: CommandName,
        values: &[Value],
        default_deeplink_timeout: Duration,
    ) -> Result<Self> {
        let args = Args::new(name.as_str(), values);

        let request = match name {
            CommandName::ExecuteAdvancedInstruction => {
                args.expect_arity(2)?;
                Self::ExecuteAdvancedInstruction {
                    name: args.string(0)?.to_string(),
                    value: args.string(1)?.to_string(),
                }
            }
            CommandName::SetLogLevel => {
                args.expect_arity(1)?;
                let level = args.string(0)?.parse::<LogLevel>().map_err(|e| args.error(e))?;
                Self::SetLogLevel(level)
            }
            CommandName::SetSleep => {
                args.expect_arity(1)?;
                Self::SetSleep(args.bool(0)?)
            }
            CommandName::SetAppLimitAdTracking => {
                args.expect_arity(1)?;
                Self::SetAppLimitAdTracking(args.bool(0)?)
            }
            CommandName::RegisterCustomDeviceIdentifier => {
                args.expect_arity(2)?;
                Self::RegisterCustomDeviceIdentifier {
                    name: args.string(0)?.to_string(),
                    value: args.string(1)?.to_string(),
                }
            }
            CommandName::RegisterIdentityLink => {
                args.expect_arity(2)?;
                Self::RegisterIdentityLink {
                    name: args.string(0)?.to_string(),
                    value: args.string(1)?.to_string(),
                }
            }
            CommandName::EnableAndroidInstantApps => {
                args.expect_arity(1)?;
                Self::EnableInstantApps {
                    instant_app_guid: args.string(0)?.to_string(),
                }
            }
            CommandName::EnableIosAppClips => {
                args.expect_arity(1)?;
                Self::EnableAppClips {
                    identifier: args.string(0)?.to_string(),
                }
            }
            CommandName::EnableIosAtt => {
                args.expect_arity(0)?;
                Self::EnableAtt
            }
            CommandName::SetIosAttAuthorizationWaitTime => {
                args.expect_arity(1)?;
                Self::SetAttAuthorizationWaitTime(seconds(&args, 0)?)
            }
            CommandName::SetIosAttAuthorizationAutoRequest => {
                args.expect_arity(1)?;
                Self::SetAttAuthorizationAutoRequest(args.bool(0)?)
            }
            CommandName::RegisterPrivacyProfile => {
                args.expect_arity(2)?;
                Self::RegisterPrivacyProfile {
                    name: args.string(0)?.to_string(),
                    keys: args.string_array(1)?,
                }
            }
            CommandName::SetPrivacyProfileEnabled => {
                args.expect_arity(2)?;
                Self::SetPrivacyProfileEnabled {
                    name: args.string(0)?.to_string(),
                    enabled: args.bool(1)?,
                }
            }
            CommandName::GetStarted => {
                args.expect_arity(0)?;
                Self::GetStarted
            }
            CommandName::Start => {
                args.expect_arity(3)?;
                Self::Start {
                    android_app_guid: args.optional_string(0)?.map(str::to_string),
                    ios_app_guid: args.optional_string(1)?.map(str::to_string),
                    partner_name: args.optional_string(2)?.map(str::to_string),
                }
            }
            CommandName::Shutdown => {
                args.expect_arity(1)?;
                Self::Shutdown {
                    delete_data: args.bool(0)?,
                }
            }
            CommandName::GetDeviceId => {
                args.expect_arity(0)?;
                Self::GetDeviceId
            }
            CommandName::GetInstallAttribution => {
                args.expect_arity(0)?;
                Self::GetInstallAttribution
            }
            CommandName::RetrieveInstallAttribution => {
                args.expect_arity(0)?;
                Self::RetrieveInstallAttribution
            }
            CommandName::ProcessDeeplink => {
                args.expect_arity(1)?;
                Self::ProcessDeeplink {
                    path: args.string(0)?.to_string(),
                    timeout: default_deeplink_timeout,
                }
            }
            CommandName::ProcessDeeplinkWithOverrideTimeout => {
                args.expect_arity(2)?;
                Self::ProcessDeeplink {
                    path: args.string(0)?.to_string(),
                    timeout: seconds(&args, 1)?,
                }
            }
            CommandName::RegisterPushToken => {
                args.expect_arity(1)?;
                Self::RegisterPushToken(args.string(0)?.to_string())
            }
            CommandName::SetPushEnabled => {
                args.expect_arity(1)?;
                Self::SetPushEnabled(args.bool(0)?)
            }
            CommandName::SendEvent => Self::SendEvent(EventPayload::resolve(&args)?),
            CommandName::SendEventWithString => Self::SendEvent(EventPayload::with_string(&args)?),
            CommandName::SendEventWithDictionary => {
                Self::SendEvent(EventPayload::with_mapping(&args)?)
            }
            CommandName::SendEventWithEvent => Self::SendEvent(EventPayload::event_object(&args)?),
        };

        Ok(request)
    }
}

/// A strictly positive, finite number of seconds.
fn seconds(args: &Args<'_>, index: usize) -> Result<Duration> {
    let secs = args.number(index)?;
    if secs <= 0.0 {
        return Err(args.error(format!("argument {index} must be a positive number of seconds")));
    }
    Duration::try_from_secs_f64(secs)
        .map_err(|e| args.error(format!("argument {index} is not a valid duration: {e}")))
}
