// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types shared between the dispatcher and tracking providers.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Unique identifier for a host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandId(pub Uuid);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CommandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Operating system the tracking provider runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    /// Desktop or CI builds, where no native SDK exists.
    Desktop,
}

impl Platform {
    /// Platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "ios") {
            Self::Ios
        } else {
            Self::Desktop
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Android => "android",
            Self::Ios => "ios",
            Self::Desktop => "desktop",
        };
        f.write_str(name)
    }
}

/// Provider log verbosity. Defaults to `Info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    None,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            other => Err(format!("unknown log level '{other}'")),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Standard event names understood by the attribution backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardEventType {
    Achievement,
    AddToCart,
    AddToWishList,
    CheckoutStart,
    LevelComplete,
    Purchase,
    Rating,
    RegistrationComplete,
    Search,
    TutorialComplete,
    View,
    AdView,
    PushReceived,
    PushOpened,
    ConsentGranted,
    Deeplink,
    AdClick,
    StartTrial,
    Subscribe,
}

impl StandardEventType {
    pub const ALL: [StandardEventType; 19] = [
        Self::Achievement,
        Self::AddToCart,
        Self::AddToWishList,
        Self::CheckoutStart,
        Self::LevelComplete,
        Self::Purchase,
        Self::Rating,
        Self::RegistrationComplete,
        Self::Search,
        Self::TutorialComplete,
        Self::View,
        Self::AdView,
        Self::PushReceived,
        Self::PushOpened,
        Self::ConsentGranted,
        Self::Deeplink,
        Self::AdClick,
        Self::StartTrial,
        Self::Subscribe,
    ];

    /// Event name as sent on the wire.
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Achievement => "Achievement",
            Self::AddToCart => "Add to Cart",
            Self::AddToWishList => "Add to Wish List",
            Self::CheckoutStart => "Checkout Start",
            Self::LevelComplete => "Level Complete",
            Self::Purchase => "Purchase",
            Self::Rating => "Rating",
            Self::RegistrationComplete => "Registration Complete",
            Self::Search => "Search",
            Self::TutorialComplete => "Tutorial Complete",
            Self::View => "View",
            Self::AdView => "Ad View",
            Self::PushReceived => "Push Received",
            Self::PushOpened => "Push Opened",
            Self::ConsentGranted => "Consent Granted",
            Self::Deeplink => "_Deeplink",
            Self::AdClick => "Ad Click",
            Self::StartTrial => "Start Trial",
            Self::Subscribe => "Subscribe",
        }
    }

    /// Look up a standard type by its wire name.
    pub fn from_event_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.event_name() == name)
    }
}

/// A fully described event, as built by the host's event builder.
///
/// Field names follow the host-side descriptor (`camelCase`). Only `name` is
/// required; the receipt fields are platform specific and may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub ios_app_store_receipt_base64_string: Option<String>,
    #[serde(default)]
    pub android_google_play_receipt_data: Option<String>,
    #[serde(default)]
    pub android_google_play_receipt_signature: Option<String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Map::new(),
            ios_app_store_receipt_base64_string: None,
            android_google_play_receipt_data: None,
            android_google_play_receipt_signature: None,
        }
    }

    pub fn with_type(event_type: StandardEventType) -> Self {
        Self::new(event_type.event_name())
    }

    /// Google Play receipt as `(data, signature)`, present only when both
    /// halves are non-blank.
    pub fn google_play_receipt(&self) -> Option<(&str, &str)> {
        let data = non_blank(self.android_google_play_receipt_data.as_deref())?;
        let signature = non_blank(self.android_google_play_receipt_signature.as_deref())?;
        Some((data, signature))
    }

    /// App Store receipt, present only when non-blank.
    pub fn app_store_receipt(&self) -> Option<&str> {
        non_blank(self.ios_app_store_receipt_base64_string.as_deref())
    }

    /// Copy carrying only the receipt that applies on `platform`, and only
    /// when it is complete. Desktop keeps whichever receipts are complete.
    pub fn for_platform(&self, platform: Platform) -> Self {
        let google_play = match platform {
            Platform::Android | Platform::Desktop => self.google_play_receipt(),
            Platform::Ios => None,
        };
        let app_store = match platform {
            Platform::Ios | Platform::Desktop => self.app_store_receipt(),
            Platform::Android => None,
        };

        Self {
            name: self.name.clone(),
            data: self.data.clone(),
            ios_app_store_receipt_base64_string: app_store.map(str::to_string),
            android_google_play_receipt_data: google_play.map(|(data, _)| data.to_string()),
            android_google_play_receipt_signature: google_play.map(|(_, sig)| sig.to_string()),
        }
    }
}

/// `data: null` reads as an empty mapping.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.trim().is_empty())
}

/// Install attribution result as reported by the provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallAttribution {
    /// Whether attribution has been retrieved from the server yet.
    pub retrieved: bool,
    /// Raw attribution payload.
    pub raw: Value,
    pub attributed: bool,
    pub first_install: bool,
}

/// Result of processing a launch deeplink.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Deeplink {
    /// Resolved destination, empty when the link could not be resolved.
    pub destination: String,
    pub raw: Value,
}
