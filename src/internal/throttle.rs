//! Scoped rate limiting with lazy window expiry.
//!
//! A window opens on the first increment for a key and closes `duration`
//! later, at which point the key's counter is back to zero. Expiry is
//! computed from the stored start instant on every access, so there are no
//! background timers to keep alive or cancel.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use super::message::Message;

/// Key space a throttler buckets its counters by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThrottleScope {
    /// One counter shared by everyone.
    Global,
    User,
    /// A user within one guild.
    Member,
    Guild,
}

/// What a throttler is asked about: a message, or a raw key.
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Message(&'a Message),
    Key(&'a str),
}

impl<'a> From<&'a Message> for Subject<'a> {
    fn from(message: &'a Message) -> Self {
        Subject::Message(message)
    }
}

impl<'a> From<&'a str> for Subject<'a> {
    fn from(key: &'a str) -> Self {
        Subject::Key(key)
    }
}

impl<'a> From<&'a String> for Subject<'a> {
    fn from(key: &'a String) -> Self {
        Subject::Key(key)
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    current: u32,
    expires_at: Instant,
}

const GLOBAL_KEY: &str = "";

/// Longest window a throttler keeps; longer durations are clamped.
pub const MAX_DURATION: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

#[derive(Debug, Default)]
struct Windows {
    by_key: HashMap<String, Window>,
    /// Expired windows of keys that never come back are dropped by a sweep
    /// that runs at most once per `duration`.
    next_sweep: Option<Instant>,
}

#[derive(Debug)]
pub struct Throttler {
    scope: ThrottleScope,
    count: NonZeroU32,
    duration: Duration,
    windows: Mutex<Windows>,
}

impl Throttler {
    /// Allow `count` triggers per `duration` for each key of `scope`.
    ///
    /// `duration` is clamped to [`MAX_DURATION`].
    pub fn new(scope: ThrottleScope, count: NonZeroU32, duration: Duration) -> Self {
        Self {
            scope,
            count,
            duration: duration.min(MAX_DURATION),
            windows: Mutex::new(Windows::default()),
        }
    }

    /// Shorthand for [`Throttler::new`]; `None` when `count` is zero.
    pub fn from_secs(scope: ThrottleScope, count: u32, secs: u64) -> Option<Self> {
        NonZeroU32::new(count).map(|count| Self::new(scope, count, Duration::from_secs(secs)))
    }

    pub fn scope(&self) -> ThrottleScope {
        self.scope
    }

    pub fn count(&self) -> u32 {
        self.count.get()
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Bucket key for `subject`, `None` when the scope does not apply.
    fn key(&self, subject: Subject<'_>) -> Option<String> {
        match (self.scope, subject) {
            (ThrottleScope::Global, _) => Some(GLOBAL_KEY.to_string()),
            (_, Subject::Key(key)) => Some(key.to_string()),
            (ThrottleScope::User, Subject::Message(m)) => Some(m.author_id.clone()),
            (ThrottleScope::Member, Subject::Message(m)) => m.member_id(),
            (ThrottleScope::Guild, Subject::Message(m)) => m.guild_id.clone(),
        }
    }

    /// Live window for `key`, dropping it if it has expired.
    fn live(windows: &mut HashMap<String, Window>, key: &str, now: Instant) -> Option<Window> {
        match windows.get(key) {
            Some(window) if now >= window.expires_at => {
                windows.remove(key);
                None
            }
            other => other.copied(),
        }
    }

    fn inspect(&self, subject: Subject<'_>) -> Option<Window> {
        let key = self.key(subject)?;
        let mut windows = self.windows.lock();
        Self::live(&mut windows.by_key, &key, Instant::now())
    }

    /// End of a window opened at `now`, saturating when the clock cannot
    /// represent it.
    fn expiry(&self, now: Instant) -> Instant {
        now.checked_add(self.duration)
            .or_else(|| now.checked_add(Duration::from_secs(u32::MAX.into())))
            .unwrap_or(now)
    }

    fn sweep(&self, windows: &mut Windows, now: Instant) {
        if windows.next_sweep.is_some_and(|at| now < at) {
            return;
        }
        windows.by_key.retain(|_, w| now < w.expires_at);
        windows.next_sweep = Some(self.expiry(now));
    }

    /// Number of triggers in the current window.
    pub fn current<'a>(&self, subject: impl Into<Subject<'a>>) -> u32 {
        self.inspect(subject.into()).map_or(0, |w| w.current)
    }

    /// Whether the limit has been reached.
    pub fn is_throttled<'a>(&self, subject: impl Into<Subject<'a>>) -> bool {
        self.current(subject) >= self.count.get()
    }

    /// Time until the current window closes, zero when there is none.
    pub fn cooldown<'a>(&self, subject: impl Into<Subject<'a>>) -> Duration {
        self.inspect(subject.into())
            .map_or(Duration::ZERO, |w| w.expires_at.saturating_duration_since(Instant::now()))
    }

    /// Count one trigger and report whether the limit had already been
    /// reached before it.
    ///
    /// The trigger is counted even when the limit was reached, so callers
    /// gate on the return value. The first trigger for a key opens its window.
    pub fn increment<'a>(&self, subject: impl Into<Subject<'a>>) -> bool {
        let Some(key) = self.key(subject.into()) else {
            return false;
        };
        let now = Instant::now();
        let mut windows = self.windows.lock();
        self.sweep(&mut windows, now);
        let window = match Self::live(&mut windows.by_key, &key, now) {
            Some(window) => window,
            None => Window {
                current: 0,
                expires_at: self.expiry(now),
            },
        };
        let reached = window.current >= self.count.get();
        windows.by_key.insert(
            key,
            Window {
                current: window.current.saturating_add(1),
                ..window
            },
        );
        reached
    }

    /// Clear one subject's window, or every window when `subject` is `None`.
    pub fn reset(&self, subject: Option<Subject<'_>>) {
        match subject {
            Some(subject) => {
                if let Some(key) = self.key(subject) {
                    self.windows.lock().by_key.remove(&key);
                }
            }
            None => self.reset_all(),
        }
    }

    pub fn reset_all(&self) {
        self.windows.lock().by_key.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttler(scope: ThrottleScope, count: u32, secs: u64) -> Throttler {
        Throttler::from_secs(scope, count, secs).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_and_expiry() {
        let t = throttler(ThrottleScope::User, 2, 10);

        assert!(!t.increment("alice"));
        assert!(!t.increment("alice"));
        assert!(t.is_throttled("alice"));
        assert!(t.increment("alice"));
        assert_eq!(t.current("alice"), 3);
        assert_eq!(t.cooldown("alice"), Duration::from_secs(10));

        tokio::time::advance(Duration::from_secs(4)).await;
        assert_eq!(t.cooldown("alice"), Duration::from_secs(6));
        assert!(t.increment("alice"));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(t.current("alice"), 0);
        assert!(!t.is_throttled("alice"));
        assert_eq!(t.cooldown("alice"), Duration::ZERO);
        assert!(!t.increment("alice"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_is_not_extended_by_increments() {
        let t = throttler(ThrottleScope::Global, 5, 10);
        t.increment("x");
        tokio::time::advance(Duration::from_millis(9_999)).await;
        t.increment("x");
        assert_eq!(t.current("x"), 2);
        tokio::time::advance(Duration::from_millis(1)).await;
        assert_eq!(t.current("x"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_is_per_key() {
        let t = throttler(ThrottleScope::User, 1, 60);
        t.increment("a");
        t.increment("b");

        t.reset(Some("a".into()));
        assert_eq!(t.current("a"), 0);
        assert_eq!(t.current("b"), 1);

        t.reset(None);
        assert_eq!(t.current("b"), 0);
    }

    #[test]
    fn test_global_ignores_subject() {
        let t = throttler(ThrottleScope::Global, 1, 60);
        assert!(!t.increment("a"));
        assert!(t.increment(&Message::new("", "b")));
        assert_eq!(t.current("anything"), 2);
    }

    #[test]
    fn test_message_keys_by_scope() {
        let dm = Message::new("", "u1");
        let in_guild = Message::new("", "u1").in_guild("g1");
        let other_guild = Message::new("", "u1").in_guild("g2");

        let user = throttler(ThrottleScope::User, 1, 60);
        user.increment(&in_guild);
        assert!(user.is_throttled(&dm));
        assert!(user.is_throttled("u1"));

        let member = throttler(ThrottleScope::Member, 1, 60);
        member.increment(&in_guild);
        assert!(member.is_throttled(&in_guild));
        assert!(!member.is_throttled(&other_guild));

        let guild = throttler(ThrottleScope::Guild, 1, 60);
        guild.increment(&Message::new("", "u2").in_guild("g1"));
        assert!(guild.is_throttled(&in_guild));
        assert!(guild.is_throttled("g1"));
    }

    #[test]
    fn test_outside_guild_is_neutral() {
        let dm = Message::new("", "u1");
        for scope in [ThrottleScope::Member, ThrottleScope::Guild] {
            let t = throttler(scope, 1, 60);
            assert!(!t.increment(&dm));
            assert!(!t.increment(&dm));
            assert!(!t.is_throttled(&dm));
            assert_eq!(t.current(&dm), 0);
            assert_eq!(t.cooldown(&dm), Duration::ZERO);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_keys_are_swept() {
        let t = throttler(ThrottleScope::User, 1, 1);
        for i in 0..1000 {
            t.increment(format!("user-{i}").as_str());
        }
        assert_eq!(t.windows.lock().by_key.len(), 1000);

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(!t.increment("fresh"));
        assert_eq!(t.windows.lock().by_key.len(), 1);
        assert_eq!(t.current("fresh"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_huge_duration_does_not_overflow() {
        let t = throttler(ThrottleScope::User, 1, u64::MAX);
        assert_eq!(t.duration(), MAX_DURATION);
        assert!(!t.increment("a"));
        assert!(t.increment("a"));
        assert!(t.cooldown("a") > Duration::from_secs(60 * 60 * 24 * 365));
    }

    #[test]
    fn test_zero_count_is_rejected() {
        assert!(Throttler::from_secs(ThrottleScope::User, 0, 10).is_none());
    }

    #[test]
    fn test_scope_serde() {
        let scope: ThrottleScope = serde_json::from_str("\"member\"").unwrap();
        assert_eq!(scope, ThrottleScope::Member);
        assert_eq!(serde_json::to_string(&ThrottleScope::Global).unwrap(), "\"global\"");
    }
}
