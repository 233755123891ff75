// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub provider for builds where the native tracking SDK is unavailable.
//
// Every operation fails with `PlatformUnavailable`; asynchronous ones fire
// their completion with the same error so host commands never hang. Real
// providers are injected by the host application through
// `Dispatcher::new`.

use std::time::Duration;

use serde_json::{Map, Value};
use tracklink_core::error::{Result, TracklinkError};
use tracklink_core::types::{Deeplink, Event, InstallAttribution, LogLevel, Platform};

use crate::completion::Completion;
use crate::traits::*;

/// No-op provider returned when no native SDK is linked.
pub struct StubProvider {
    platform: Platform,
}

impl StubProvider {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }
}

impl Default for StubProvider {
    fn default() -> Self {
        Self::new(Platform::current())
    }
}

fn unavailable<T>(operation: &str) -> Result<T> {
    tracing::warn!(operation, "called on stub tracking provider");
    Err(TracklinkError::PlatformUnavailable)
}

fn unavailable_async<T>(done: Completion<T>) {
    tracing::warn!(operation = done.operation(), "called on stub tracking provider");
    done.complete(Err(TracklinkError::PlatformUnavailable));
}

impl TrackingProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn platform(&self) -> Platform {
        self.platform
    }
}

impl TrackerLifecycle for StubProvider {
    fn start_with_app_guid(&self, _app_guid: &str) -> Result<()> {
        unavailable("start_with_app_guid")
    }

    fn start_with_partner_name(&self, _partner_name: &str) -> Result<()> {
        unavailable("start_with_partner_name")
    }

    fn shutdown(&self, _delete_data: bool) -> Result<()> {
        unavailable("shutdown")
    }

    fn started(&self, done: Completion<bool>) {
        unavailable_async(done)
    }

    fn execute_advanced_instruction(&self, _name: &str, _value: &str) -> Result<()> {
        unavailable("execute_advanced_instruction")
    }
}

impl TrackerSettings for StubProvider {
    fn set_log_level(&self, _level: LogLevel) -> Result<()> {
        unavailable("set_log_level")
    }

    fn set_sleep(&self, _sleep: bool) -> Result<()> {
        unavailable("set_sleep")
    }

    fn set_app_limit_ad_tracking(&self, _limit: bool) -> Result<()> {
        unavailable("set_app_limit_ad_tracking")
    }
}

impl IdentityRegistry for StubProvider {
    fn register_custom_device_identifier(&self, _name: &str, _value: &str) -> Result<()> {
        unavailable("register_custom_device_identifier")
    }

    fn register_identity_link(&self, _name: &str, _value: &str) -> Result<()> {
        unavailable("register_identity_link")
    }

    fn device_id(&self, done: Completion<String>) {
        unavailable_async(done)
    }
}

impl PlatformFeatures for StubProvider {
    fn enable_instant_apps(&self, _instant_app_guid: &str) -> Result<()> {
        unavailable("enable_instant_apps")
    }

    fn enable_app_clips(&self, _identifier: &str) -> Result<()> {
        unavailable("enable_app_clips")
    }

    fn enable_att(&self) -> Result<()> {
        unavailable("enable_att")
    }

    fn set_att_authorization_wait_time(&self, _wait: Duration) -> Result<()> {
        unavailable("set_att_authorization_wait_time")
    }

    fn set_att_authorization_auto_request(&self, _auto_request: bool) -> Result<()> {
        unavailable("set_att_authorization_auto_request")
    }
}

impl PrivacyProfiles for StubProvider {
    fn register_privacy_profile(&self, _name: &str, _keys: &[String]) -> Result<()> {
        unavailable("register_privacy_profile")
    }

    fn set_privacy_profile_enabled(&self, _name: &str, _enabled: bool) -> Result<()> {
        unavailable("set_privacy_profile_enabled")
    }
}

impl AttributionQueries for StubProvider {
    fn install_attribution(&self, done: Completion<InstallAttribution>) {
        unavailable_async(done)
    }

    fn retrieve_install_attribution(&self, done: Completion<InstallAttribution>) {
        unavailable_async(done)
    }
}

impl DeeplinkProcessing for StubProvider {
    fn process_deeplink(&self, _path: &str, _timeout: Duration, done: Completion<Deeplink>) {
        unavailable_async(done)
    }
}

impl PushEngagement for StubProvider {
    fn register_push_token(&self, _token: &str) -> Result<()> {
        unavailable("register_push_token")
    }

    fn set_push_enabled(&self, _enabled: bool) -> Result<()> {
        unavailable("set_push_enabled")
    }
}

impl EventSink for StubProvider {
    fn send_event(&self, _name: &str) -> Result<()> {
        unavailable("send_event")
    }

    fn send_event_with_string(&self, _name: &str, _data: &str) -> Result<()> {
        unavailable("send_event_with_string")
    }

    fn send_event_with_mapping(&self, _name: &str, _data: &Map<String, Value>) -> Result<()> {
        unavailable("send_event_with_mapping")
    }

    fn send_event_object(&self, _event: &Event) -> Result<()> {
        unavailable("send_event_object")
    }
}
