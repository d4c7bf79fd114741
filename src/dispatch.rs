use std::future::Future;
use std::time::Instant;

use anyhow::{Result, anyhow};
use tokio::time::{Duration, timeout};
use tracing::{debug, info, warn};

use crate::app::{App, AppCommand};
use crate::source::ClusterSource;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(4);

const NO_CONNECTION: &str = "Not connected to Kubernetes cluster";

pub async fn with_timeout<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    match timeout(FETCH_TIMEOUT, future).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!(
            "request timed out after {}s",
            FETCH_TIMEOUT.as_secs()
        )),
    }
}

/// Probes the cluster and loads the kind list. A failed probe leaves the app usable.
pub async fn bootstrap<S: ClusterSource + ?Sized>(app: &mut App, source: Option<&S>) {
    let Some(source) = source else {
        return;
    };
    app.set_status("Connecting to Kubernetes…");
    match with_timeout(source.test_connectivity()).await {
        Ok(()) => {
            info!("cluster connectivity verified");
            execute_command(app, Some(source), AppCommand::LoadResourceKinds).await;
        }
        Err(error) => {
            warn!("connectivity probe failed: {error:#}");
            app.show_error("Kubernetes Connection Failed", compact_error(&error));
        }
    }
}

/// Runs a fetch command and hands the result to the app. Edits are not handled here
/// because they need the terminal.
pub async fn execute_command<S: ClusterSource + ?Sized>(
    app: &mut App,
    source: Option<&S>,
    command: AppCommand,
) {
    if matches!(command, AppCommand::None | AppCommand::EditResource(_)) {
        return;
    }
    let Some(source) = source else {
        app.show_error("No Connection", NO_CONNECTION);
        return;
    };
    debug!("command={command:?}");

    match command {
        AppCommand::None | AppCommand::EditResource(_) => {}
        AppCommand::LoadNamespaces => match with_timeout(source.list_namespaces()).await {
            Ok(namespaces) => app.show_namespace_selection(namespaces),
            Err(error) => fail(app, "Failed to Load Namespaces", &error),
        },
        AppCommand::LoadResourceKinds => match with_timeout(source.list_resource_kinds()).await {
            Ok(kinds) => app.set_resource_kinds(kinds),
            Err(error) => fail(app, "Failed to Load Resource Kinds", &error),
        },
        AppCommand::LoadResources { kind, scope } => {
            match with_timeout(source.list_resources(&kind, &scope)).await {
                Ok(items) => app.set_resources(&kind, scope, items),
                Err(error) => fail(app, "Failed to Load Resources", &error),
            }
        }
        AppCommand::LoadLogs { namespace, pod } => {
            let tail_lines = app.options().log_tail_lines;
            match with_timeout(source.fetch_logs(&namespace, &pod, tail_lines)).await {
                Ok(body) => app.show_logs(&namespace, &pod, &body),
                Err(error) => fail(app, "Failed to Load Logs", &error),
            }
        }
        AppCommand::Describe(target) => {
            match with_timeout(source.describe_resource(&target)).await {
                Ok(body) => app.show_description(target, &body),
                Err(error) => fail(app, "Failed to Describe Resource", &error),
            }
        }
    }
}

/// Refreshes the watched listing if a tick is due. Returns true when a tick ran.
pub async fn watch_tick<S: ClusterSource + ?Sized>(
    app: &mut App,
    source: Option<&S>,
    now: Instant,
) -> bool {
    let Some(session) = app.poll_watch(now) else {
        return false;
    };
    let Some(source) = source else {
        app.watch_failed(NO_CONNECTION.to_string());
        return true;
    };

    match with_timeout(source.list_resources(&session.kind, &session.scope)).await {
        Ok(items) => {
            app.apply_watch_refresh(&session, items);
        }
        Err(error) => {
            warn!(kind = %session.kind, scope = %session.scope, "watch refresh failed: {error:#}");
            app.watch_failed(compact_error(&error));
        }
    }
    true
}

fn fail(app: &mut App, title: &str, error: &anyhow::Error) {
    warn!("{title}: {error:#}");
    app.show_error(title, compact_error(error));
}

pub fn compact_error(error: &anyhow::Error) -> String {
    let mut out = Vec::new();
    for (index, cause) in error.chain().enumerate() {
        if index == 0 {
            out.push(cause.to_string());
        } else if index <= 2 {
            out.push(format!("caused by: {cause}"));
        } else {
            break;
        }
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{bootstrap, compact_error, execute_command, watch_tick};
    use crate::app::{App, AppCommand, AppOptions};
    use crate::input::Action;
    use crate::model::{NamespaceScope, ResourceInfo, ResourceRef};
    use crate::panels::{ContentMode, PanelId};
    use crate::source::ClusterSource;
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Instant;

    #[derive(Default)]
    struct FakeSource {
        namespaces: Vec<String>,
        kinds: Vec<String>,
        listings: Mutex<VecDeque<std::result::Result<Vec<ResourceInfo>, String>>>,
        calls: Mutex<Vec<String>>,
        offline: bool,
    }

    impl FakeSource {
        fn queue(&self, listing: std::result::Result<Vec<ResourceInfo>, String>) {
            self.listings.lock().expect("listings").push_back(listing);
        }

        fn record(&self, call: String) {
            self.calls.lock().expect("calls").push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().expect("calls").clone()
        }
    }

    #[async_trait]
    impl ClusterSource for FakeSource {
        async fn list_namespaces(&self) -> Result<Vec<String>> {
            self.record("namespaces".to_string());
            Ok(self.namespaces.clone())
        }

        async fn list_resource_kinds(&self) -> Result<Vec<String>> {
            self.record("kinds".to_string());
            Ok(self.kinds.clone())
        }

        async fn list_resources(
            &self,
            kind: &str,
            scope: &NamespaceScope,
        ) -> Result<Vec<ResourceInfo>> {
            self.record(format!("resources {kind} {scope}"));
            match self.listings.lock().expect("listings").pop_front() {
                Some(Ok(items)) => Ok(items),
                Some(Err(message)) => Err(anyhow!(message)),
                None => Ok(Vec::new()),
            }
        }

        async fn fetch_logs(&self, namespace: &str, pod: &str, tail_lines: i64) -> Result<String> {
            self.record(format!("logs {namespace}/{pod} {tail_lines}"));
            Ok("line one\nline two\n".to_string())
        }

        async fn describe_resource(&self, target: &ResourceRef) -> Result<String> {
            self.record(format!("describe {target}"));
            Ok(format!("kind: {}\nname: {}\n", target.kind, target.name))
        }

        async fn test_connectivity(&self) -> Result<()> {
            if self.offline {
                return Err(anyhow!("connection refused").context("failed to list namespaces"));
            }
            Ok(())
        }
    }

    fn app() -> App {
        let mut app = App::new(
            NamespaceScope::Named("default".to_string()),
            AppOptions::default(),
        );
        app.resize(120, 40);
        app
    }

    fn source() -> FakeSource {
        FakeSource {
            namespaces: vec!["default".to_string(), "kube-system".to_string()],
            kinds: vec!["pods".to_string(), "services".to_string()],
            ..FakeSource::default()
        }
    }

    fn pod(name: &str) -> ResourceInfo {
        ResourceInfo {
            name: name.to_string(),
            namespace: "default".to_string(),
            kind: "Pod".to_string(),
            ready: "1/1".to_string(),
            status: "Running".to_string(),
            ..ResourceInfo::default()
        }
    }

    async fn press(app: &mut App, source: &FakeSource, action: Action) {
        let command = app.apply_action(action);
        execute_command(app, Some(source), command).await;
    }

    async fn list_pods(app: &mut App, source: &FakeSource, pods: Vec<ResourceInfo>) {
        source.queue(Ok(pods));
        bootstrap(app, Some(source)).await;
        press(app, source, Action::Char('j')).await;
        press(app, source, Action::Enter).await;
        press(app, source, Action::Enter).await;
        press(app, source, Action::Escape).await;
        press(app, source, Action::Char('j')).await;
        assert_eq!(app.focus(), PanelId::Content);
    }

    #[tokio::test]
    async fn namespace_selection_commits_and_refreshes_kinds() {
        let mut app = app();
        let source = source();

        press(&mut app, &source, Action::Enter).await;
        assert_eq!(app.focus(), PanelId::Content);
        assert_eq!(app.content_panel().mode(), ContentMode::NamespaceSelection);
        assert_eq!(
            app.content_panel().namespace_choices(),
            ["all namespaces", "default", "kube-system"]
        );

        press(&mut app, &source, Action::Char('j')).await;
        press(&mut app, &source, Action::Enter).await;
        assert_eq!(
            app.namespace_scope(),
            &NamespaceScope::Named("kube-system".to_string())
        );
        assert_eq!(app.focus(), PanelId::Namespace);
        assert_eq!(app.kind_panel().visible_kinds(), ["pods", "services"]);
        assert_eq!(source.calls(), ["namespaces", "kinds"]);
    }

    #[tokio::test]
    async fn selecting_a_kind_lists_it_for_the_current_scope() {
        let mut app = app();
        let source = source();
        source.queue(Ok(vec![pod("api-0"), pod("api-1")]));
        bootstrap(&mut app, Some(&source)).await;

        press(&mut app, &source, Action::Char('j')).await;
        press(&mut app, &source, Action::Enter).await;
        press(&mut app, &source, Action::Enter).await;

        let table = app.content_panel().table();
        assert_eq!(app.content_panel().mode(), ContentMode::Resources);
        assert_eq!(table.title(), "pods in default");
        assert_eq!(table.items().len(), 2);
        assert_eq!(source.calls(), ["kinds", "resources pods default"]);
    }

    #[tokio::test]
    async fn failed_listing_keeps_previous_table() {
        let mut app = app();
        let source = source();
        list_pods(&mut app, &source, vec![pod("api-0")]).await;

        source.queue(Err("timeout".to_string()));
        press(&mut app, &source, Action::Char('k')).await;
        press(&mut app, &source, Action::Enter).await;
        press(&mut app, &source, Action::Down).await;
        press(&mut app, &source, Action::Enter).await;

        let dialog = app.dialog().expect("error dialog");
        assert_eq!(dialog.title(), "Failed to Load Resources");
        assert!(dialog.message().contains("timeout"));
        assert_eq!(app.content_panel().table().title(), "pods in default");
        assert_eq!(app.content_panel().table().items(), [pod("api-0")]);
    }

    #[tokio::test]
    async fn watch_refresh_grows_table_and_keeps_selection() {
        let mut app = app();
        let source = source();
        list_pods(&mut app, &source, vec![pod("api-0"), pod("api-1")]).await;

        press(&mut app, &source, Action::Enter).await;
        press(&mut app, &source, Action::Down).await;
        press(&mut app, &source, Action::ToggleWatch).await;
        assert!(app.watch_session().is_some());

        source.queue(Ok(vec![pod("api-0"), pod("api-1"), pod("api-2")]));
        let now = Instant::now();
        assert!(watch_tick(&mut app, Some(&source), now).await);

        let table = app.content_panel().table();
        assert_eq!(table.items().len(), 3);
        assert_eq!(table.selected_index(), 1);
        assert_eq!(table.selected_resource().map(|r| r.name.as_str()), Some("api-1"));
        assert!(table.is_active());

        assert!(!watch_tick(&mut app, Some(&source), now).await);
    }

    #[tokio::test]
    async fn watch_failure_stops_with_one_dialog() {
        let mut app = app();
        let source = source();
        list_pods(&mut app, &source, vec![pod("api-0")]).await;
        press(&mut app, &source, Action::ToggleWatch).await;

        source.queue(Err("connection reset".to_string()));
        assert!(watch_tick(&mut app, Some(&source), Instant::now()).await);
        assert!(app.watch_session().is_none());
        assert_eq!(app.dialog().map(|dialog| dialog.title()), Some("Watch Stopped"));
        assert!(!watch_tick(&mut app, Some(&source), Instant::now()).await);
    }

    #[tokio::test]
    async fn logs_use_configured_tail() {
        let mut app = app();
        let source = source();
        list_pods(&mut app, &source, vec![pod("api-0")]).await;

        press(&mut app, &source, Action::Enter).await;
        press(&mut app, &source, Action::ShowLogs).await;
        assert_eq!(
            app.viewer().map(|viewer| viewer.title()),
            Some("Pod Logs: api-0 (namespace: default) - 2 lines")
        );
        assert!(source.calls().contains(&"logs default/api-0 1000".to_string()));
    }

    #[tokio::test]
    async fn describe_opens_viewer() {
        let mut app = app();
        let source = source();
        list_pods(&mut app, &source, vec![pod("api-0")]).await;

        press(&mut app, &source, Action::Enter).await;
        press(&mut app, &source, Action::Describe).await;
        let viewer = app.viewer().expect("viewer");
        assert_eq!(viewer.title(), "Describe: pods/api-0 (namespace: default)");
        assert_eq!(viewer.offset(), 0);
    }

    #[tokio::test]
    async fn disconnected_fetches_show_no_connection() {
        let mut app = app();
        execute_command(&mut app, None::<&FakeSource>, AppCommand::LoadNamespaces).await;
        let dialog = app.dialog().expect("dialog");
        assert_eq!(dialog.title(), "No Connection");
        assert_eq!(dialog.message(), "Not connected to Kubernetes cluster");
    }

    #[tokio::test]
    async fn failed_connectivity_check_shows_connection_dialog() {
        let mut app = app();
        let source = FakeSource {
            offline: true,
            ..source()
        };
        bootstrap(&mut app, Some(&source)).await;
        let dialog = app.dialog().expect("dialog");
        assert_eq!(dialog.title(), "Kubernetes Connection Failed");
        assert!(dialog.message().contains("connection refused"));
        assert!(app.kind_panel().visible_kinds().is_empty());
    }

    #[test]
    fn compact_error_keeps_two_causes() {
        let error = anyhow!("root")
            .context("middle")
            .context("outer")
            .context("top");
        assert_eq!(
            compact_error(&error),
            "top\ncaused by: outer\ncaused by: middle"
        );
    }
}
