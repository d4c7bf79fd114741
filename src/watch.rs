use std::time::{Duration, Instant};

use crate::model::NamespaceScope;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WatchSession {
    pub kind: String,
    pub scope: NamespaceScope,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum WatchToggle {
    Started,
    Retargeted,
    Stopped,
}

/// Recurring refresh of one listing. A fresh session is due immediately.
#[derive(Debug, Clone)]
pub struct WatchTimer {
    session: Option<WatchSession>,
    interval: Duration,
    next_due: Option<Instant>,
}

impl WatchTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            session: None,
            interval,
            next_due: None,
        }
    }

    pub fn session(&self) -> Option<&WatchSession> {
        self.session.as_ref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_watching(&self, kind: &str, scope: &NamespaceScope) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.kind == kind && &session.scope == scope)
    }

    pub fn toggle(&mut self, session: WatchSession) -> WatchToggle {
        match &self.session {
            Some(current) if *current == session => {
                self.stop();
                WatchToggle::Stopped
            }
            Some(_) => {
                self.start(session);
                WatchToggle::Retargeted
            }
            None => {
                self.start(session);
                WatchToggle::Started
            }
        }
    }

    pub fn start(&mut self, session: WatchSession) {
        self.session = Some(session);
        self.next_due = None;
    }

    pub fn stop(&mut self) -> Option<WatchSession> {
        self.next_due = None;
        self.session.take()
    }

    pub fn next_wake(&self, now: Instant) -> Option<Instant> {
        self.session.as_ref()?;
        Some(self.next_due.unwrap_or(now))
    }

    /// Returns the session when a refresh is due and schedules the next one.
    pub fn poll(&mut self, now: Instant) -> Option<WatchSession> {
        let session = self.session.clone()?;
        if self.next_due.is_some_and(|due| now < due) {
            return None;
        }
        self.next_due = Some(now + self.interval);
        Some(session)
    }
}

#[cfg(test)]
mod tests {
    use super::{WatchSession, WatchTimer, WatchToggle};
    use crate::model::NamespaceScope;
    use std::time::{Duration, Instant};

    fn session(kind: &str, namespace: &str) -> WatchSession {
        WatchSession {
            kind: kind.to_string(),
            scope: NamespaceScope::Named(namespace.to_string()),
        }
    }

    #[test]
    fn idle_timer_never_fires() {
        let mut timer = WatchTimer::new(Duration::from_secs(1));
        let now = Instant::now();
        assert_eq!(timer.next_wake(now), None);
        assert_eq!(timer.poll(now), None);
    }

    #[test]
    fn started_session_is_due_immediately_then_every_interval() {
        let mut timer = WatchTimer::new(Duration::from_secs(1));
        let start = Instant::now();
        assert_eq!(timer.toggle(session("pods", "default")), WatchToggle::Started);
        assert_eq!(timer.next_wake(start), Some(start));
        assert_eq!(timer.poll(start), Some(session("pods", "default")));

        assert_eq!(timer.poll(start + Duration::from_millis(500)), None);
        assert_eq!(
            timer.next_wake(start + Duration::from_millis(500)),
            Some(start + Duration::from_secs(1))
        );
        assert!(timer.poll(start + Duration::from_secs(1)).is_some());
    }

    #[test]
    fn same_pair_toggles_off() {
        let mut timer = WatchTimer::new(Duration::from_secs(1));
        timer.toggle(session("pods", "default"));
        assert_eq!(timer.toggle(session("pods", "default")), WatchToggle::Stopped);
        assert!(timer.session().is_none());
        assert_eq!(timer.poll(Instant::now()), None);
    }

    #[test]
    fn different_pair_retargets_and_fires_again() {
        let mut timer = WatchTimer::new(Duration::from_secs(1));
        let now = Instant::now();
        timer.toggle(session("pods", "default"));
        timer.poll(now);
        assert_eq!(
            timer.toggle(session("services", "default")),
            WatchToggle::Retargeted
        );
        assert!(timer.is_watching("services", &NamespaceScope::Named("default".to_string())));
        assert_eq!(timer.poll(now), Some(session("services", "default")));
    }
}
