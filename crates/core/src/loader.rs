//! Splash screen timing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::LoaderConfig;

pub const SPLASH_PAGE: &str = "index";
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_millis(3000);

/// Remembers whether this browser has already seen the splash screen.
pub trait SeenFlag: Send + Sync {
    fn is_seen(&self) -> bool;
    fn mark_seen(&self);
}

#[derive(Debug, Default)]
pub struct InMemorySeenFlag {
    seen: AtomicBool,
}

impl SeenFlag for InMemorySeenFlag {
    fn is_seen(&self) -> bool {
        self.seen.load(Ordering::SeqCst)
    }

    fn mark_seen(&self) {
        self.seen.store(true, Ordering::SeqCst);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplashPlan {
    /// Hide immediately, without a visible flash.
    Skip,
    /// Keep visible for at least this long after page content is ready.
    Show { min_display: Duration },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplashLoader {
    min_display: Duration,
    page: String,
}

impl Default for SplashLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DISPLAY)
    }
}

impl SplashLoader {
    pub fn new(min_display: Duration) -> Self {
        Self { min_display, page: SPLASH_PAGE.to_owned() }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self {
            min_display: Duration::from_millis(config.min_display_ms),
            page: config.page.clone(),
        }
    }

    /// The only page that shows the splash.
    pub fn page(&self) -> &str {
        &self.page
    }

    pub fn min_display(&self) -> Duration {
        self.min_display
    }

    pub fn plan(&self, page: &str, seen: &dyn SeenFlag) -> SplashPlan {
        if page != self.page || seen.is_seen() {
            return SplashPlan::Skip;
        }

        seen.mark_seen();
        SplashPlan::Show { min_display: self.min_display }
    }

    /// How much longer to keep the splash up once the page has fully loaded
    /// after `elapsed`.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.min_display.saturating_sub(elapsed)
    }
}
