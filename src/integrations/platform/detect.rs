// src/integrations/platform/detect.rs
//
// Runtime platform detection

use regex::Regex;
use std::sync::LazyLock;

static ANDROID_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)android").unwrap());
static IOS_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)iphone|ipad|ipod").unwrap());

/// Decides which acquisition backend a scan uses.
///
/// Queried on every `start_scan`, so implementations may change their
/// answer between calls.
#[cfg_attr(test, mockall::automock)]
pub trait EnvironmentProbe: Send + Sync {
    /// Running inside the mobile app shell with the native scanner available
    fn is_native_mobile(&self) -> bool;
}

/// Snapshot of the host environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    /// Hosted by the native app shell (vs. a plain browser / desktop)
    pub in_app_shell: bool,
    pub user_agent: String,
}

impl Platform {
    pub fn new(in_app_shell: bool, user_agent: impl Into<String>) -> Self {
        Self {
            in_app_shell,
            user_agent: user_agent.into(),
        }
    }

    /// Plain desktop environment, browser backend only
    pub fn desktop() -> Self {
        Self::new(
            false,
            format!("scanhub/{} ({})", env!("CARGO_PKG_VERSION"), std::env::consts::OS),
        )
    }

    pub fn is_android(&self) -> bool {
        ANDROID_PATTERN.is_match(&self.user_agent)
    }

    pub fn is_ios(&self) -> bool {
        IOS_PATTERN.is_match(&self.user_agent)
    }

    pub fn is_mobile(&self) -> bool {
        self.is_android() || self.is_ios()
    }
}

impl EnvironmentProbe for Platform {
    fn is_native_mobile(&self) -> bool {
        self.in_app_shell && self.is_mobile()
    }
}
