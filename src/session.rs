use futures::{ Stream, StreamExt };
use log::{ debug, error, info };
use std::io;
use std::io::Write;
use tokio::sync::mpsc;

use crate::client::{ ReplyOutcome, TransportError };
use crate::theme::ThemeToggle;
use crate::view::{ ChatView, TerminalView };
use crate::widget::{ ChatWidget, PendingReply, UiAction };

const HELP: &str = "/new  start a new conversation\n/theme  toggle light/dark\n/more N  expand or collapse bubble N\n/quit  leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Action(UiAction),
    ToggleTheme,
    ToggleExpand(usize),
    Help,
    Quit,
    Unknown(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Command::Action(UiAction::Submit(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("new"), None) => Command::Action(UiAction::Reset),
        (Some("theme"), None) => Command::ToggleTheme,
        (Some("more"), Some(n)) => match n.parse() {
            Ok(index) => Command::ToggleExpand(index),
            Err(_) => Command::Unknown(trimmed.to_string()),
        },
        (Some("help"), None) => Command::Help,
        (Some("quit" | "exit"), None) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

type Completed = (PendingReply, Result<ReplyOutcome, TransportError>);

/// Drives the widget from input lines until the input ends or the user quits.
/// Requests run on their own tasks so input keeps flowing while a reply is
/// outstanding. Replies still in flight when input ends are awaited; `/quit`
/// leaves them behind.
pub async fn run_session<W, S>(
    widget: &mut ChatWidget<TerminalView<W>>,
    theme: &mut ThemeToggle,
    mut lines: S
) where
    W: Write + Send,
    S: Stream<Item = io::Result<String>> + Unpin,
{
    let (tx, mut rx) = mpsc::channel::<Completed>(32);
    let mut in_flight = 0usize;
    let mut quit = false;

    widget.dispatch(UiAction::Load).await;
    widget.view_mut().focus_input();

    loop {
        tokio::select! {
            line = lines.next() => {
                let line = match line {
                    Some(Ok(line)) => line,
                    Some(Err(e)) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                    None => break,
                };

                match parse_command(&line) {
                    Command::Action(UiAction::Submit(raw)) => {
                        match widget.begin_submit(&raw).await {
                            Some(pending) => {
                                in_flight += 1;
                                let client = widget.client();
                                let tx = tx.clone();
                                tokio::spawn(async move {
                                    let result = client.send(&pending.text).await;
                                    let _ = tx.send((pending, result)).await;
                                });
                            }
                            None => widget.view_mut().focus_input(),
                        }
                    }
                    Command::Action(action) => widget.dispatch(action).await,
                    Command::ToggleTheme => {
                        let current = theme.toggle().await;
                        let view = widget.view_mut();
                        view.set_theme(current);
                        view.focus_input();
                    }
                    Command::ToggleExpand(index) => {
                        let view = widget.view_mut();
                        if view.toggle_expand(index).is_none() {
                            view.notice(&format!("no bubble {}", index));
                        }
                        view.focus_input();
                    }
                    Command::Help => {
                        let view = widget.view_mut();
                        view.notice(HELP);
                        view.focus_input();
                    }
                    Command::Quit => {
                        quit = true;
                        break;
                    }
                    Command::Unknown(cmd) => {
                        let view = widget.view_mut();
                        view.notice(&format!("unknown command {} (try /help)", cmd));
                        view.focus_input();
                    }
                }
            }
            Some((pending, result)) = rx.recv() => {
                in_flight -= 1;
                if widget.complete_submit(pending, result).await {
                    widget.view_mut().focus_input();
                }
            }
        }
    }

    if quit {
        if in_flight > 0 {
            info!("Dropping {} outstanding reply(ies)", in_flight);
        }
        debug!("Session ended");
        return;
    }

    if in_flight > 0 {
        info!("Waiting for {} outstanding reply(ies)", in_flight);
    }
    drop(tx);
    while in_flight > 0 {
        let Some((pending, result)) = rx.recv().await else {
            break;
        };
        in_flight -= 1;
        widget.complete_submit(pending, result).await;
    }
    debug!("Session ended");
}
