use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tracing::{debug, info};

use crate::input::{Action, motion};
use crate::model::{NamespaceScope, ResourceInfo, ResourceRef, normalize_kind};
use crate::overlay::{Dialog, DialogKind, TextViewer};
use crate::panels::{
    ContentMode, ContentPanel, KindPanel, KindState, NamespacePanel, Panel, PanelId, PanelRequest,
};
use crate::ui;
use crate::watch::{WatchSession, WatchTimer, WatchToggle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    None,
    LoadNamespaces,
    LoadResourceKinds,
    LoadResources { kind: String, scope: NamespaceScope },
    LoadLogs { namespace: String, pod: String },
    Describe(ResourceRef),
    EditResource(ResourceRef),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct AppOptions {
    pub watch_interval: Duration,
    pub log_tail_lines: i64,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            watch_interval: Duration::from_secs(1),
            log_tail_lines: 1_000,
        }
    }
}

pub struct App {
    running: bool,
    namespace: NamespacePanel,
    kinds: KindPanel,
    content: ContentPanel,
    focus: PanelId,
    dialog: Option<Dialog>,
    viewer: Option<TextViewer>,
    watch: WatchTimer,
    listing: Option<WatchSession>,
    screen: Rect,
    status: String,
    options: AppOptions,
}

impl App {
    pub fn new(scope: NamespaceScope, options: AppOptions) -> Self {
        let mut app = Self {
            running: true,
            namespace: NamespacePanel::new(scope),
            kinds: KindPanel::default(),
            content: ContentPanel::default(),
            focus: PanelId::Namespace,
            dialog: None,
            viewer: None,
            watch: WatchTimer::new(options.watch_interval),
            listing: None,
            screen: Rect::new(0, 0, 80, 24),
            status: "Ready".to_string(),
            options,
        };
        app.namespace.set_focused(true);
        app.resize(80, 24);
        app
    }

    pub fn running(&self) -> bool {
        self.running
    }

    #[cfg(test)]
    pub fn focus(&self) -> PanelId {
        self.focus
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn options(&self) -> AppOptions {
        self.options
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn viewer(&self) -> Option<&TextViewer> {
        self.viewer.as_ref()
    }

    pub fn namespace_scope(&self) -> &NamespaceScope {
        self.namespace.scope()
    }

    #[cfg(test)]
    pub fn kind_panel(&self) -> &KindPanel {
        &self.kinds
    }

    #[cfg(test)]
    pub fn content_panel(&self) -> &ContentPanel {
        &self.content
    }

    pub fn watch_session(&self) -> Option<&WatchSession> {
        self.watch.session()
    }

    pub fn panel(&self, id: PanelId) -> &dyn Panel {
        match id {
            PanelId::Namespace => &self.namespace,
            PanelId::Kinds => &self.kinds,
            PanelId::Content => &self.content,
        }
    }

    fn panel_mut(&mut self, id: PanelId) -> &mut dyn Panel {
        match id {
            PanelId::Namespace => &mut self.namespace,
            PanelId::Kinds => &mut self.kinds,
            PanelId::Content => &mut self.content,
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        let layout = ui::body_layout(self.screen);
        for (id, area) in [
            (PanelId::Namespace, layout.namespace),
            (PanelId::Kinds, layout.kinds),
            (PanelId::Content, layout.content),
        ] {
            self.panel_mut(id).set_dimensions(area.width, area.height);
        }
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.set_dimensions(width, height);
        }
    }

    pub fn apply_action(&mut self, action: Action) -> AppCommand {
        if let Some(dialog) = self.dialog.as_mut() {
            match action {
                Action::Left | Action::Char('h') => dialog.prev_button(),
                Action::Right | Action::Char('l') => dialog.next_button(),
                Action::Enter => {
                    let command = dialog.activate();
                    self.dialog = None;
                    return command;
                }
                Action::Escape | Action::Char('q') => self.dialog = None,
                Action::Quit => {
                    self.dialog = None;
                    self.quit();
                }
                _ => {}
            }
            return AppCommand::None;
        }

        if let Some(viewer) = self.viewer.as_mut() {
            match action {
                Action::Escape | Action::Char('q') => self.viewer = None,
                Action::Quit => {
                    self.viewer = None;
                    self.quit();
                }
                Action::Edit => {
                    if let Some(target) = viewer.describe_target().cloned() {
                        self.dialog = Some(Dialog::confirm(
                            "Edit Resource",
                            format!("Open {target} with kubectl edit?"),
                            "Edit",
                            AppCommand::EditResource(target),
                        ));
                    }
                }
                other => {
                    if let Some(motion) = motion(other) {
                        viewer.apply(motion);
                    }
                }
            }
            return AppCommand::None;
        }

        if action == Action::Quit {
            self.quit();
            return AppCommand::None;
        }

        let focused = self.panel(self.focus);
        if action == Action::Char('q') && !focused.captures_text() {
            self.quit();
            return AppCommand::None;
        }
        if !focused.captures_navigation() {
            match action {
                Action::Char('j') => {
                    self.set_focus(self.focus.next());
                    return AppCommand::None;
                }
                Action::Char('k') => {
                    self.set_focus(self.focus.prev());
                    return AppCommand::None;
                }
                _ => {}
            }
        }

        let request = self.panel_mut(self.focus).handle(action);
        if request != PanelRequest::None {
            debug!("panel={:?} request={request:?}", self.focus);
        }
        self.handle_request(request)
    }

    fn quit(&mut self) {
        self.running = false;
        self.status = "Exit requested".to_string();
    }

    fn set_focus(&mut self, target: PanelId) {
        let current = self.focus;
        self.panel_mut(current).set_focused(false);
        self.focus = target;
        self.panel_mut(target).set_focused(true);
    }

    fn handle_request(&mut self, request: PanelRequest) -> AppCommand {
        match request {
            PanelRequest::None => AppCommand::None,
            PanelRequest::EnterNamespaceSelection => {
                self.status = "Loading namespaces…".to_string();
                AppCommand::LoadNamespaces
            }
            PanelRequest::CommitNamespace(scope) => self.commit_namespace(scope),
            PanelRequest::CancelNamespaceSelection => {
                self.content.leave_namespace_selection();
                self.set_focus(PanelId::Namespace);
                AppCommand::None
            }
            PanelRequest::KindSelected(kind) => {
                self.status = format!("Loading {kind}…");
                AppCommand::LoadResources {
                    kind,
                    scope: self.namespace.scope().clone(),
                }
            }
            PanelRequest::ShowLogs(Some(resource)) if resource.is_pod() => AppCommand::LoadLogs {
                namespace: resource.namespace,
                pod: resource.name,
            },
            PanelRequest::ShowLogs(_) => {
                self.show_dialog(Dialog::new(
                    DialogKind::Info,
                    "No Pod Selected",
                    "Please select a pod to view logs",
                ));
                AppCommand::None
            }
            PanelRequest::Describe(Some(resource)) => AppCommand::Describe(resource.reference()),
            PanelRequest::Describe(None) => {
                self.show_dialog(Dialog::new(
                    DialogKind::Info,
                    "No Resource Selected",
                    "Please select a resource to describe",
                ));
                AppCommand::None
            }
            PanelRequest::ToggleWatch => {
                self.toggle_watch();
                AppCommand::None
            }
        }
    }

    fn commit_namespace(&mut self, scope: NamespaceScope) -> AppCommand {
        self.namespace.set_scope(scope.clone());
        self.content.leave_namespace_selection();
        self.set_focus(PanelId::Namespace);
        if self
            .watch
            .session()
            .is_some_and(|session| session.scope != scope)
        {
            self.stop_watch();
        }
        self.status = format!("Namespace set to {scope}");
        AppCommand::LoadResourceKinds
    }

    fn toggle_watch(&mut self) {
        let Some(listing) = self.listing.clone() else {
            self.status = "Nothing to watch yet".to_string();
            return;
        };

        match self.watch.toggle(listing.clone()) {
            WatchToggle::Started | WatchToggle::Retargeted => {
                info!(kind = %listing.kind, scope = %listing.scope, "watch started");
                self.content.table_mut().set_watching(true);
                self.status = format!(
                    "Watching {} in {} every {}ms",
                    listing.kind,
                    listing.scope,
                    self.watch.interval().as_millis()
                );
            }
            WatchToggle::Stopped => {
                info!(kind = %listing.kind, scope = %listing.scope, "watch stopped");
                self.content.table_mut().set_watching(false);
                self.status = format!("Stopped watching {}", listing.kind);
            }
        }
    }

    fn stop_watch(&mut self) {
        if let Some(session) = self.watch.stop() {
            info!(kind = %session.kind, scope = %session.scope, "watch stopped");
            self.content.table_mut().set_watching(false);
        }
    }

    pub fn next_watch_wake(&self, now: Instant) -> Option<Instant> {
        self.watch.next_wake(now)
    }

    pub fn poll_watch(&mut self, now: Instant) -> Option<WatchSession> {
        self.watch.poll(now)
    }

    pub fn show_dialog(&mut self, dialog: Dialog) {
        self.dialog = Some(dialog);
    }

    pub fn show_error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        let title = title.into();
        self.status = title.clone();
        self.dialog = Some(Dialog::error(title, message));
    }

    pub fn show_namespace_selection(&mut self, namespaces: Vec<String>) {
        let scope = self.namespace.scope().clone();
        self.status = format!("Loaded {} namespaces", namespaces.len());
        self.content.enter_namespace_selection(namespaces, &scope);
        self.set_focus(PanelId::Content);
    }

    pub fn set_resource_kinds(&mut self, kinds: Vec<String>) {
        self.status = format!("Loaded {} resource kinds", kinds.len());
        self.kinds.set_kinds(kinds);
    }

    pub fn set_resources(&mut self, kind: &str, scope: NamespaceScope, items: Vec<ResourceInfo>) {
        let session = WatchSession {
            kind: normalize_kind(kind),
            scope,
        };
        if self
            .watch
            .session()
            .is_some_and(|active| *active != session)
        {
            self.stop_watch();
        }

        self.status = format!("Loaded {} {kind}", items.len());
        self.content
            .set_resources(listing_title(kind, &session.scope), items);
        let watching = self.watch.is_watching(&session.kind, &session.scope);
        self.content.table_mut().set_watching(watching);
        self.listing = Some(session);
    }

    /// Applies a watch refresh. Returns false when the session is no longer the
    /// active watch on the displayed listing.
    pub fn apply_watch_refresh(&mut self, session: &WatchSession, items: Vec<ResourceInfo>) -> bool {
        if self.watch.session() != Some(session) || self.listing.as_ref() != Some(session) {
            debug!(kind = %session.kind, "discarding stale watch result");
            return false;
        }
        self.content
            .update_resources_only(listing_title(&session.kind, &session.scope), items);
        true
    }

    pub fn watch_failed(&mut self, message: String) {
        self.stop_watch();
        self.show_error("Watch Stopped", message);
    }

    pub fn show_logs(&mut self, namespace: &str, pod: &str, body: &str) {
        let title = format!(
            "Pod Logs: {pod} (namespace: {namespace}) - {} lines",
            body.lines().count()
        );
        self.status = format!("Loaded logs for {namespace}/{pod}");
        self.viewer = Some(TextViewer::logs(title, body, self.screen));
    }

    pub fn show_description(&mut self, target: ResourceRef, body: &str) {
        let title = format!(
            "Describe: {}/{} (namespace: {})",
            target.kind,
            target.name,
            target.namespace.as_deref().unwrap_or("-")
        );
        self.status = format!("Described {target}");
        self.viewer = Some(TextViewer::describe(target, title, body, self.screen));
    }

    pub fn key_hints(&self) -> &'static str {
        if self.dialog.is_some() {
            return "←/→ choose  Enter confirm  Esc close  ctrl+q quit";
        }
        if let Some(viewer) = &self.viewer {
            return if viewer.describe_target().is_some() {
                "j/k scroll  ctrl+e edit  Esc close  ctrl+q quit"
            } else {
                "j/k scroll  g/G top/bottom  Esc close  ctrl+q quit"
            };
        }

        match self.focus {
            PanelId::Namespace => "Enter select namespace  j/k switch panel  q quit",
            PanelId::Kinds => match self.kinds.state() {
                KindState::Browsing => "Enter browse kinds  j/k switch panel  q quit",
                KindState::ListActive => "j/k move  Enter list  / search  Esc back",
                KindState::Searching => "type to filter  Enter list  Esc clear",
            },
            PanelId::Content => match self.content.mode() {
                ContentMode::Welcome => "j/k switch panel  q quit",
                ContentMode::NamespaceSelection => "j/k move  Enter choose  Esc cancel",
                ContentMode::Resources if self.content.table().is_active() => {
                    "j/k move  ctrl+l logs  ctrl+d describe  ctrl+w watch  Esc back"
                }
                ContentMode::Resources => "Enter select rows  ctrl+w watch  j/k switch panel",
            },
        }
    }
}

pub fn listing_title(kind: &str, scope: &NamespaceScope) -> String {
    format!("{kind} in {}", scope.label())
}
