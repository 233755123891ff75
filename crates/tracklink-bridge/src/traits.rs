// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the native tracking SDK.
//
// The vendor SDK owns attribution, identity resolution, privacy evaluation
// and delivery. These traits only describe its public surface so the
// dispatcher can forward host commands to it.

use std::time::Duration;

use serde_json::{Map, Value};
use tracklink_core::error::Result;
use tracklink_core::types::{Deeplink, Event, InstallAttribution, LogLevel, Platform};

use crate::completion::Completion;

/// Unified provider that groups the whole tracking SDK surface.
///
/// One instance is shared by every command for the lifetime of the process.
/// Implementations do their own internal synchronization; the dispatcher
/// never locks around provider calls.
///
/// Synchronous operations report failure through their `Result`.
/// Asynchronous operations receive a [`Completion`] and must fire it at most
/// once, from any thread. Dropping it without firing leaves the host command
/// pending forever.
pub trait TrackingProvider:
    TrackerLifecycle
    + TrackerSettings
    + IdentityRegistry
    + PlatformFeatures
    + PrivacyProfiles
    + AttributionQueries
    + DeeplinkProcessing
    + PushEngagement
    + EventSink
    + Send
    + Sync
{
    /// Human-readable provider name (e.g. "Android SDK 4.x", "stub").
    fn name(&self) -> &str;

    /// Platform the provider runs on; drives platform-gated commands.
    fn platform(&self) -> Platform;
}

/// Starting, stopping and low-level instructions.
pub trait TrackerLifecycle {
    /// Start the SDK with an app GUID.
    fn start_with_app_guid(&self, app_guid: &str) -> Result<()>;

    /// Start the SDK with a partner name instead of an app GUID.
    fn start_with_partner_name(&self, partner_name: &str) -> Result<()>;

    /// Shut down, optionally deleting all local SDK data.
    fn shutdown(&self, delete_data: bool) -> Result<()>;

    /// Report whether the SDK is currently started.
    fn started(&self, done: Completion<bool>);

    /// Reserved vendor instruction channel.
    fn execute_advanced_instruction(&self, name: &str, value: &str) -> Result<()>;
}

/// Runtime knobs.
pub trait TrackerSettings {
    fn set_log_level(&self, level: LogLevel) -> Result<()>;

    /// Pause or resume all SDK activity.
    fn set_sleep(&self, sleep: bool) -> Result<()>;

    /// Limit ad tracking at the app level.
    fn set_app_limit_ad_tracking(&self, limit: bool) -> Result<()>;
}

/// Device and user identity.
pub trait IdentityRegistry {
    fn register_custom_device_identifier(&self, name: &str, value: &str) -> Result<()>;

    /// Link an external identity (e.g. a login id) to this install.
    fn register_identity_link(&self, name: &str, value: &str) -> Result<()>;

    /// Resolve the SDK device id.
    fn device_id(&self, done: Completion<String>);
}

/// Features that exist on only one platform.
pub trait PlatformFeatures {
    /// Android instant apps.
    fn enable_instant_apps(&self, instant_app_guid: &str) -> Result<()>;

    /// iOS app clips, keyed by the container app group identifier.
    fn enable_app_clips(&self, identifier: &str) -> Result<()>;

    /// iOS App Tracking Transparency.
    fn enable_att(&self) -> Result<()>;

    fn set_att_authorization_wait_time(&self, wait: Duration) -> Result<()>;

    fn set_att_authorization_auto_request(&self, auto_request: bool) -> Result<()>;
}

/// Privacy profile registration.
pub trait PrivacyProfiles {
    /// Create or overwrite a profile listing the data keys it suppresses.
    fn register_privacy_profile(&self, name: &str, keys: &[String]) -> Result<()>;

    fn set_privacy_profile_enabled(&self, name: &str, enabled: bool) -> Result<()>;
}

/// Install attribution.
pub trait AttributionQueries {
    /// Attribution currently cached by the SDK.
    fn install_attribution(&self, done: Completion<InstallAttribution>);

    /// Fetch attribution from the server.
    fn retrieve_install_attribution(&self, done: Completion<InstallAttribution>);
}

/// Launch deeplinks.
pub trait DeeplinkProcessing {
    fn process_deeplink(&self, path: &str, timeout: Duration, done: Completion<Deeplink>);
}

/// Push engagement.
pub trait PushEngagement {
    fn register_push_token(&self, token: &str) -> Result<()>;

    fn set_push_enabled(&self, enabled: bool) -> Result<()>;
}

/// Event logging. Each overload of the host's `sendEvent` maps to one method.
pub trait EventSink {
    fn send_event(&self, name: &str) -> Result<()>;

    /// Event with an opaque string payload (usually JSON text).
    fn send_event_with_string(&self, name: &str, data: &str) -> Result<()>;

    fn send_event_with_mapping(&self, name: &str, data: &Map<String, Value>) -> Result<()>;

    /// Pre-built event, including any store receipts.
    fn send_event_object(&self, event: &Event) -> Result<()>;
}
