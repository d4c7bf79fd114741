mod app;
mod cli;
mod config;
mod dispatch;
mod input;
mod k8s;
mod list;
mod model;
mod overlay;
mod panels;
mod source;
mod table;
mod ui;
mod viewport;
mod watch;

use anyhow::{Context, Result};
use app::{App, AppCommand};
use clap::Parser;
use cli::CliArgs;
use config::Settings;
use crossterm::event::{
    Event, EventStream, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    supports_keyboard_enhancement,
};
use dispatch::compact_error;
use futures::StreamExt;
use k8s::KubeGateway;
use model::NamespaceScope;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command as TokioCommand;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_filter, args.log_file.as_deref())?;
    let settings = Settings::resolve(&args)?;
    if let Some(source) = &settings.source {
        info!("loaded config from {}", source.display());
    }

    if args.all_namespaces && args.namespace.is_some() {
        warn!("both --all-namespaces and --namespace were provided, using all namespaces");
    }

    let (gateway, connect_error) = match KubeGateway::new().await {
        Ok(gateway) => (Some(gateway), None),
        Err(error) => {
            warn!("running without a cluster connection: {error:#}");
            (None, Some(error))
        }
    };
    let namespace_scope = resolve_namespace_scope(&args, &settings, gateway.as_ref());

    let mut app = App::new(namespace_scope, settings.app_options());
    if let Some(error) = connect_error {
        app.show_error("Kubernetes Connection Failed", compact_error(&error));
    }

    run(&mut app, gateway.as_ref()).await
}

fn init_tracing(level_filter: &str, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_new(level_filter)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact();

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            let _ = builder.with_ansi(false).with_writer(file).try_init();
        }
        None => {
            let _ = builder.with_writer(std::io::sink).try_init();
        }
    }

    Ok(())
}

fn resolve_namespace_scope(
    args: &CliArgs,
    settings: &Settings,
    gateway: Option<&KubeGateway>,
) -> NamespaceScope {
    if args.all_namespaces {
        NamespaceScope::All
    } else if let Some(namespace) = &args.namespace {
        NamespaceScope::Named(namespace.clone())
    } else if let Some(namespace) = &settings.default_namespace {
        NamespaceScope::Named(namespace.clone())
    } else {
        let namespace = gateway
            .map(KubeGateway::default_namespace)
            .unwrap_or("default");
        NamespaceScope::Named(namespace.to_string())
    }
}

async fn run(app: &mut App, gateway: Option<&KubeGateway>) -> Result<()> {
    let (mut terminal, keyboard_enhanced) = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, gateway).await;
    let restore_result = restore_terminal(&mut terminal, keyboard_enhanced);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<(TuiTerminal, bool)> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    let keyboard_enhanced = matches!(supports_keyboard_enhancement(), Ok(true));
    if keyboard_enhanced {
        execute!(
            stdout,
            EnterAlternateScreen,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )
        .context("failed to enter alternate screen with keyboard enhancement")?;
    } else {
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok((terminal, keyboard_enhanced))
}

fn restore_terminal(terminal: &mut TuiTerminal, keyboard_enhanced: bool) -> Result<()> {
    if keyboard_enhanced {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)
            .context("failed to pop keyboard enhancement flags")?;
    }
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(
    terminal: &mut TuiTerminal,
    app: &mut App,
    gateway: Option<&KubeGateway>,
) -> Result<()> {
    let size = terminal.size().context("failed to read terminal size")?;
    app.resize(size.width, size.height);
    terminal
        .draw(|frame| ui::render(frame, app))
        .context("failed to render terminal frame")?;
    dispatch::bootstrap(app, gateway).await;

    let mut reader = EventStream::new();

    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        let wake = app.next_watch_wake(Instant::now());
        tokio::select! {
            maybe_event = reader.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        if let Some(action) = input::map_key(key) {
                            debug!("action={action:?}");
                            let command = app.apply_action(action);
                            if command != AppCommand::None {
                                terminal
                                    .draw(|frame| ui::render(frame, app))
                                    .context("failed to render terminal frame")?;
                                execute_app_command(terminal, app, gateway, command).await;
                            }
                        }
                    }
                    Some(Ok(Event::Resize(width, height))) => app.resize(width, height),
                    Some(Ok(_)) => {}
                    Some(Err(error)) => {
                        app.set_status(format!("terminal event error: {error}"));
                    }
                    None => {
                        app.set_status("terminal event stream closed");
                        break;
                    }
                }
            }
            _ = watch_deadline(wake) => {
                dispatch::watch_tick(app, gateway, Instant::now()).await;
            }
        }
    }

    Ok(())
}

async fn watch_deadline(wake: Option<Instant>) {
    match wake {
        Some(wake) => tokio::time::sleep_until(tokio::time::Instant::from_std(wake)).await,
        None => std::future::pending().await,
    }
}

async fn execute_app_command(
    terminal: &mut TuiTerminal,
    app: &mut App,
    gateway: Option<&KubeGateway>,
    command: AppCommand,
) {
    match command {
        AppCommand::EditResource(target) => {
            match run_kubectl_edit(
                terminal,
                &target.kind,
                target.namespace.as_deref(),
                &target.name,
            )
            .await
            {
                Ok(()) => {
                    info!("edited {target}");
                    app.set_status(format!("Edited {target}"));
                    dispatch::execute_command(app, gateway, AppCommand::Describe(target)).await;
                }
                Err(error) => {
                    warn!("kubectl edit failed: {error:#}");
                    app.show_error("Edit Failed", compact_error(&error));
                }
            }
        }
        command => dispatch::execute_command(app, gateway, command).await,
    }
}

async fn run_kubectl_edit(
    terminal: &mut TuiTerminal,
    resource: &str,
    namespace: Option<&str>,
    name: &str,
) -> Result<()> {
    suspend_terminal_for_subprocess(terminal)?;

    let mut cmd = TokioCommand::new("kubectl");
    cmd.arg("edit").arg(resource).arg(name);
    if let Some(namespace) = namespace {
        cmd.arg("-n").arg(namespace);
    }
    if std::env::var_os("KUBE_EDITOR").is_none()
        && let Some(editor) = std::env::var_os("EDITOR")
    {
        cmd.env("KUBE_EDITOR", editor);
    }
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let run_result = cmd
        .status()
        .await
        .with_context(|| format!("failed to run kubectl edit for {resource} {name}"));
    let restore_result = resume_terminal_after_subprocess(terminal);

    let status = match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => {
            return Err(anyhow::anyhow!(
                "{run_error:#}\nterminal resume error: {restore_error:#}"
            ));
        }
        (Err(error), _) => return Err(error),
        (_, Err(error)) => return Err(error),
        (Ok(status), Ok(())) => status,
    };

    if status.success() {
        Ok(())
    } else {
        Err(anyhow::anyhow!("kubectl edit exited with {status}"))
    }
}

fn suspend_terminal_for_subprocess(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode for subprocess")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen for subprocess")?;
    terminal
        .show_cursor()
        .context("failed to show cursor for subprocess")?;
    Ok(())
}

fn resume_terminal_after_subprocess(terminal: &mut TuiTerminal) -> Result<()> {
    enable_raw_mode().context("failed to re-enable raw mode after subprocess")?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)
        .context("failed to re-enter alternate screen after subprocess")?;
    terminal
        .clear()
        .context("failed to clear terminal after subprocess")?;
    Ok(())
}
