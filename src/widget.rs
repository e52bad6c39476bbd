use crate::probe::HealthProbe;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

pub const WELCOME_HEADING: &str = "Welcome to FastAPI";
pub const CHECK_LABEL: &str = "Check Status";
pub const CHECKING_LABEL: &str = "Checking…";
pub const BACK_LABEL: &str = "Back";
pub const ONLINE_HEADING: &str = "API Status: Online";
pub const ONLINE_MESSAGE: &str = "✓ Connection successful";
pub const OFFLINE_HEADING: &str = "API Status: Offline";
pub const OFFLINE_MESSAGE: &str = "✗ Connection failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Idle,
    Checking,
    Online,
    Offline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Check,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Success,
    Failure,
}

/// What is on screen for one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub heading: &'static str,
    pub message: Option<&'static str>,
    pub button_label: &'static str,
    pub button_enabled: bool,
    pub action: Action,
    pub tone: Tone,
}

impl CheckState {
    pub fn view(self) -> View {
        match self {
            CheckState::Idle => View {
                heading: WELCOME_HEADING,
                message: None,
                button_label: CHECK_LABEL,
                button_enabled: true,
                action: Action::Check,
                tone: Tone::Neutral,
            },
            CheckState::Checking => View {
                heading: WELCOME_HEADING,
                message: None,
                button_label: CHECKING_LABEL,
                button_enabled: false,
                action: Action::Check,
                tone: Tone::Neutral,
            },
            CheckState::Online => View {
                heading: ONLINE_HEADING,
                message: Some(ONLINE_MESSAGE),
                button_label: BACK_LABEL,
                button_enabled: true,
                action: Action::Back,
                tone: Tone::Success,
            },
            CheckState::Offline => View {
                heading: OFFLINE_HEADING,
                message: Some(OFFLINE_MESSAGE),
                button_label: BACK_LABEL,
                button_enabled: true,
                action: Action::Back,
                tone: Tone::Failure,
            },
        }
    }

    fn from_outcome(online: bool) -> Self {
        if online {
            CheckState::Online
        } else {
            CheckState::Offline
        }
    }
}

/// The whole widget: one check at a time, results discarded on `back`.
pub struct StatusWidget {
    probe: Arc<dyn HealthProbe>,
    runtime: Handle,
    state: CheckState,
    pending: Option<oneshot::Receiver<bool>>,
}

impl StatusWidget {
    pub fn new(probe: Arc<dyn HealthProbe>, runtime: Handle) -> Self {
        StatusWidget {
            probe,
            runtime,
            state: CheckState::Idle,
            pending: None,
        }
    }

    pub fn state(&self) -> CheckState {
        self.state
    }

    pub fn view(&self) -> View {
        self.state.view()
    }

    /// Start a check. Ignored unless the widget is idle.
    pub fn check(&mut self) {
        if self.state != CheckState::Idle {
            return;
        }
        self.state = CheckState::Checking;

        let (tx, rx) = oneshot::channel();
        let probe = self.probe.clone();
        self.runtime.spawn(async move {
            // Non-success status and transport errors both mean offline.
            let online = matches!(probe.ping().await, Ok(true));
            let _ = tx.send(online);
        });
        self.pending = Some(rx);
    }

    /// Non-blocking: apply the outcome if the request has finished.
    pub fn poll(&mut self) -> CheckState {
        if let Some(rx) = self.pending.as_mut() {
            match rx.try_recv() {
                Ok(online) => self.finish(online),
                Err(TryRecvError::Closed) => self.finish(false),
                Err(TryRecvError::Empty) => {}
            }
        }
        self.state
    }

    /// Wait for the outstanding request, if any.
    pub async fn settle(&mut self) -> CheckState {
        if let Some(rx) = self.pending.as_mut() {
            let online = rx.await.unwrap_or(false);
            self.finish(online);
        }
        self.state
    }

    /// Return to the welcome view. No-op while a check is in flight.
    pub fn back(&mut self) {
        if matches!(self.state, CheckState::Online | CheckState::Offline) {
            self.state = CheckState::Idle;
        }
    }

    /// Dispatch the view's button.
    pub fn activate(&mut self) {
        match self.view().action {
            Action::Check => self.check(),
            Action::Back => self.back(),
        }
    }

    fn finish(&mut self, online: bool) {
        self.pending = None;
        self.state = CheckState::from_outcome(online);
        tracing::info!("api status check finished: {:?}", self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Clone, Copy)]
    enum Reply {
        Status(u16),
        NetworkError,
    }

    /// Replays scripted replies in order and counts requests.
    struct ScriptedProbe {
        replies: Mutex<VecDeque<Reply>>,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    impl ScriptedProbe {
        fn new(replies: &[Reply]) -> Arc<Self> {
            Arc::new(ScriptedProbe {
                replies: Mutex::new(replies.iter().copied().collect()),
                calls: AtomicUsize::new(0),
                gate: None,
            })
        }

        fn gated(reply: Reply, gate: Arc<Notify>) -> Arc<Self> {
            Arc::new(ScriptedProbe {
                replies: Mutex::new(VecDeque::from([reply])),
                calls: AtomicUsize::new(0),
                gate: Some(gate),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HealthProbe for ScriptedProbe {
        fn ping(&self) -> BoxFuture<'_, Result<bool>> {
            async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if let Some(gate) = &self.gate {
                    gate.notified().await;
                }
                let reply = self.replies.lock().unwrap().pop_front();
                match reply {
                    Some(Reply::Status(code)) => Ok((200..300).contains(&code)),
                    Some(Reply::NetworkError) | None => Err(anyhow!("Network Error")),
                }
            }
            .boxed()
        }
    }

    fn widget(probe: Arc<ScriptedProbe>) -> StatusWidget {
        StatusWidget::new(probe, Handle::current())
    }

    #[tokio::test]
    async fn test_initial_view_is_welcome() {
        let probe = ScriptedProbe::new(&[]);
        let w = widget(probe.clone());

        assert_eq!(w.state(), CheckState::Idle);
        let view = w.view();
        assert_eq!(view.heading, WELCOME_HEADING);
        assert_eq!(view.button_label, "Check Status");
        assert!(view.button_enabled);
        assert_eq!(view.action, Action::Check);
        assert_eq!(probe.calls(), 0);
    }

    #[tokio::test]
    async fn test_checking_disables_and_relabels_button() {
        let gate = Arc::new(Notify::new());
        let probe = ScriptedProbe::gated(Reply::Status(200), gate.clone());
        let mut w = widget(probe.clone());

        w.check();
        assert_eq!(w.state(), CheckState::Checking);
        let view = w.view();
        assert!(!view.button_enabled);
        assert_ne!(view.button_label, CHECK_LABEL);
        assert_eq!(w.poll(), CheckState::Checking);

        gate.notify_one();
        assert_eq!(w.settle().await, CheckState::Online);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_status_200_shows_online() {
        let probe = ScriptedProbe::new(&[Reply::Status(200)]);
        let mut w = widget(probe.clone());

        w.check();
        w.settle().await;

        let view = w.view();
        assert_eq!(view.heading, "API Status: Online");
        assert_eq!(view.message, Some("✓ Connection successful"));
        assert_eq!(view.tone, Tone::Success);
        assert_eq!(probe.calls(), 1);
    }

    #[tokio::test]
    async fn test_error_statuses_show_offline() {
        for code in [404, 500] {
            let probe = ScriptedProbe::new(&[Reply::Status(code)]);
            let mut w = widget(probe);

            w.check();
            assert_eq!(w.settle().await, CheckState::Offline);
            let view = w.view();
            assert_eq!(view.heading, "API Status: Offline");
            assert_eq!(view.message, Some("✗ Connection failed"));
            assert_eq!(view.tone, Tone::Failure);
        }
    }

    #[tokio::test]
    async fn test_network_error_shows_offline() {
        let probe = ScriptedProbe::new(&[Reply::NetworkError]);
        let mut w = widget(probe);

        w.check();
        w.settle().await;
        assert_eq!(w.view().heading, "API Status: Offline");
    }

    #[tokio::test]
    async fn test_back_returns_to_initial_view() {
        let initial = CheckState::Idle.view();
        for reply in [Reply::Status(200), Reply::Status(500)] {
            let probe = ScriptedProbe::new(&[reply]);
            let mut w = widget(probe);

            w.check();
            w.settle().await;
            assert_eq!(w.view().button_label, BACK_LABEL);

            w.activate();
            assert_eq!(w.state(), CheckState::Idle);
            assert_eq!(w.view(), initial);
        }
    }

    #[tokio::test]
    async fn test_cycles_are_independent() {
        let probe = ScriptedProbe::new(&[
            Reply::Status(500),
            Reply::Status(200),
            Reply::NetworkError,
        ]);
        let mut w = widget(probe.clone());

        let mut seen = Vec::new();
        for cycle in 1..=3 {
            w.activate();
            seen.push(w.settle().await);
            assert_eq!(probe.calls(), cycle);
            w.back();
        }
        assert_eq!(
            seen,
            [CheckState::Offline, CheckState::Online, CheckState::Offline]
        );
    }

    #[tokio::test]
    async fn test_check_while_checking_is_ignored() {
        let gate = Arc::new(Notify::new());
        let probe = ScriptedProbe::gated(Reply::Status(200), gate.clone());
        let mut w = widget(probe.clone());

        w.check();
        w.check();
        w.activate();
        w.back();
        assert_eq!(w.state(), CheckState::Checking);

        gate.notify_one();
        w.settle().await;
        assert_eq!(probe.calls(), 1);
        assert_eq!(w.state(), CheckState::Online);
    }

    #[tokio::test]
    async fn test_poll_applies_finished_result() {
        let probe = ScriptedProbe::new(&[Reply::Status(200)]);
        let mut w = widget(probe);

        w.check();
        for _ in 0..100 {
            if w.poll() != CheckState::Checking {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert_eq!(w.state(), CheckState::Online);
    }

    #[tokio::test]
    async fn test_back_from_idle_is_noop() {
        let mut w = widget(ScriptedProbe::new(&[]));
        w.back();
        assert_eq!(w.state(), CheckState::Idle);
        assert_eq!(w.settle().await, CheckState::Idle);
    }
}
