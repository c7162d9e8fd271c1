use std::str::FromStr;

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_stream::{
    StreamExt,
    wrappers::{LinesStream, UnboundedReceiverStream},
};
use tracing::{debug, info, instrument, warn};

use crate::{
    cli::CommandResult,
    config::Config,
    panel::{PanelState, Placement},
    services::now_playing::{
        ConnectionState, ControlFacade, DbusMediaPlayerClient, NowPlayingService,
        PlaybackStatus, Track,
    },
};

/// Something the user can do with the panel from the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelAction {
    /// Play/pause button
    Toggle,
    /// Next button
    Next,
    /// Previous button
    Previous,
    /// Left click on the song label
    Raise,
    /// "Close" entry of the context menu
    Quit,
}

impl FromStr for PanelAction {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "t" | "toggle" => Ok(Self::Toggle),
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" | "previous" => Ok(Self::Previous),
            "r" | "raise" => Ok(Self::Raise),
            "q" | "quit" => Ok(Self::Quit),
            other => Err(format!("unknown action '{other}'")),
        }
    }
}

enum PanelEvent {
    Connection(ConnectionState),
    Status(PlaybackStatus),
    Song(Track),
}

/// Follow the player until Ctrl-C, printing the panel line whenever it changes.
///
/// Lines typed on stdin act as button presses (see [`PanelAction`]).
///
/// # Errors
///
/// Returns CliError if the service cannot be created
#[instrument(skip(config), fields(service = %config.player.service_name))]
pub async fn watch(config: &Config) -> CommandResult {
    let mut service = NowPlayingService::new((&config.player).into()).await?;

    let (tx, rx) = mpsc::unbounded_channel();
    let tracker = service.tracker();
    let events = tx.clone();
    tracker.on_connection_changed(move |state| {
        let _ = events.send(PanelEvent::Connection(*state));
    });
    let events = tx.clone();
    tracker.on_playback_status_changed(move |status| {
        let _ = events.send(PanelEvent::Status(*status));
    });
    let events = tx;
    tracker.on_song_changed(move |track| {
        let _ = events.send(PanelEvent::Song(track.clone()));
    });

    if let Err(e) = service.start().await {
        warn!("Player present but not followed yet: {e}");
    }

    let mut panel = PanelState::new(config.panel.clone());
    let mut printed = None;
    let mut placed = None;
    print_if_changed(&panel, &mut printed);
    log_if_moved(&panel, &mut placed);

    let mut events = UnboundedReceiverStream::new(rx);
    let mut actions = Some(LinesStream::new(BufReader::new(tokio::io::stdin()).lines()));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Interrupted");
                break;
            }
            event = events.next() => {
                let Some(event) = event else { break };
                apply(&mut panel, event);
            }
            line = next_line(&mut actions) => {
                match line {
                    Some(line) => match line.parse::<PanelAction>() {
                        Ok(action) => perform(&mut panel, service.controls(), action).await,
                        Err(e) => debug!("{e}"),
                    },
                    None => actions = None,
                }
            }
        }
        print_if_changed(&panel, &mut printed);
        log_if_moved(&panel, &mut placed);
    }

    service.shutdown().await;
    Ok(String::new())
}

async fn next_line<S>(actions: &mut Option<S>) -> Option<String>
where
    S: tokio_stream::Stream<Item = std::io::Result<String>> + Unpin,
{
    match actions {
        Some(stream) => match stream.next().await {
            Some(Ok(line)) => Some(line),
            Some(Err(e)) => {
                warn!("Stopped reading stdin: {e}");
                None
            }
            None => None,
        },
        None => std::future::pending().await,
    }
}

fn apply(panel: &mut PanelState, event: PanelEvent) {
    match event {
        PanelEvent::Connection(state) => panel.on_connection_changed(state),
        PanelEvent::Status(status) => panel.on_playback_status_changed(status),
        PanelEvent::Song(track) => panel.on_song_changed(track),
    }
}

async fn perform(
    panel: &mut PanelState,
    controls: &ControlFacade<DbusMediaPlayerClient>,
    action: PanelAction,
) {
    if !controls.is_enabled() {
        debug!(?action, "Controls disabled");
        return;
    }

    match action {
        PanelAction::Toggle => {
            panel.on_toggle_requested();
            controls.toggle().await;
        }
        PanelAction::Next => {
            panel.on_skip_requested();
            controls.next().await;
        }
        PanelAction::Previous => {
            panel.on_skip_requested();
            controls.previous().await;
        }
        PanelAction::Raise => controls.raise().await,
        PanelAction::Quit => controls.quit().await,
    }
}

fn print_if_changed(panel: &PanelState, printed: &mut Option<String>) {
    let line = panel.render().unwrap_or_default();
    if printed.as_deref() != Some(line.as_str()) {
        println!("{line}");
        *printed = Some(line);
    }
}

fn log_if_moved(panel: &PanelState, placed: &mut Option<Placement>) {
    let placement = panel.placement();
    if placement != *placed {
        match placement {
            Some(Placement { place, index }) => debug!(?place, index, "Widget placed"),
            None => debug!("Widget removed from panel"),
        }
        *placed = placement;
    }
}
