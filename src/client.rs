// src/client.rs
// Shared runtime for the caller and viewer binaries: one cooperative event
// loop per process over the WebSocket, the keyboard and voice playback
// completions. All game logic lives in the view/queue state machines; this
// module executes their effects.

use std::error::Error;

use crossterm::event::{Event, EventStream};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::announcer::{AnnouncerQueue, CancelOutcome, ClipLibrary, CommandPlayer, VoicePlayer};
use crate::announcement::Overlay;
use crate::config::ClientConfig;
use crate::defs::{FIRST_NUMBER, LAST_NUMBER, Number};
use crate::logging::{log_error_stderr, log_warning};
use crate::protocol::{AnnouncementPayload, ClientEvent, ServerEvent};
use crate::reconcile::{ClientView, Effect};
use crate::role::Role;
use crate::terminal::{self, KeyAction};

pub struct ClientOptions {
    pub config: ClientConfig,
    pub role: Role,
    pub line_prize: Option<String>,
    pub bingo_prize: Option<String>,
    pub reset_on_start: bool,
}

/// Execute the effects produced by the view. Outbound events are collected
/// into `outbox` so the caller can flush them to the socket.
pub fn apply_effects(
    effects: Vec<Effect>,
    view: &ClientView,
    queue: &mut AnnouncerQueue,
    player: &mut dyn VoicePlayer,
    outbox: &mut Vec<ClientEvent>,
) {
    for effect in effects {
        match effect {
            // The full-screen redraw picks up board changes.
            Effect::Mark(_) | Effect::Unmark(_) => {}
            Effect::Speak(number) => {
                if let Some(start) = queue.enqueue(number, |n| view.is_called(n)) {
                    player.start(start);
                }
            }
            Effect::CancelVoice(number) => {
                if queue.cancel(number) == CancelOutcome::StoppedPlaying {
                    player.stop();
                    if let Some(next) = queue.advance(|n| view.is_called(n)) {
                        player.start(next);
                    }
                }
            }
            Effect::Send(event) => outbox.push(event),
            Effect::ClearAll => {
                player.stop();
                queue.clear();
            }
        }
    }
}

async fn probe_server(base_url: &str) -> Result<(), Box<dyn Error>> {
    let url = format!("{base_url}/status");
    let response = reqwest::get(&url).await?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("Server returned status: {}", response.status()).into())
    }
}

pub async fn run_client(options: ClientOptions) -> Result<(), Box<dyn Error>> {
    let server_url = options.config.server_url();
    print!("Connecting to server at {server_url}...");

    match probe_server(&server_url).await {
        Ok(_) => println!("Ok. ✓"),
        Err(e) => {
            eprintln!("Error. ✗ Failed to connect to server: {e}");
            eprintln!("Make sure the bingocast server is running on {server_url}");
            return Err(e);
        }
    }

    let (socket, _) = connect_async(options.config.ws_url()).await?;

    enable_raw_mode()?;
    let result = event_loop(socket, &options).await;
    disable_raw_mode()?;
    print!("\x1Bc");
    result
}

async fn event_loop(
    socket: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    options: &ClientOptions,
) -> Result<(), Box<dyn Error>> {
    let (mut sink, mut stream) = socket.split();

    let mut view = ClientView::new(options.role);
    let mut overlay = Overlay::new();
    let mut queue = AnnouncerQueue::new();
    let mut input = String::new();

    let (done_tx, mut done_rx) = mpsc::channel::<Number>(16);
    let library = ClipLibrary::new(options.config.voices_dir.clone());
    let mut player = CommandPlayer::new(options.config.player_command.clone(), library, done_tx);

    let mut keys = EventStream::new();
    let mut outbox: Vec<ClientEvent> = Vec::new();

    if options.role.is_admin() {
        if options.reset_on_start {
            outbox.push(ClientEvent::ResetGame);
        }
        // Prizes go after a reset: the reset replaces the server state,
        // placeholders included.
        if let (Some(line), Some(bingo)) = (&options.line_prize, &options.bingo_prize) {
            outbox.push(ClientEvent::SetPrizes {
                line: line.clone(),
                bingo: bingo.clone(),
            });
        }
    }
    flush(&mut sink, &mut outbox).await?;

    terminal::render_screen(&view, &overlay, queue.playing(), &input);

    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    match ServerEvent::from_json(text.as_str()) {
                        Ok(event) => {
                            let effects = match event {
                                ServerEvent::InitState(state) => view.apply_snapshot(&state),
                                ServerEvent::NumberDrawn(number) => view.on_number_drawn(number),
                                ServerEvent::GameReset => {
                                    overlay.hide();
                                    view.on_reset()
                                }
                                ServerEvent::ShowAnnouncement(payload) => {
                                    overlay.show(payload);
                                    Vec::new()
                                }
                                ServerEvent::HideAnnouncement => {
                                    overlay.hide();
                                    Vec::new()
                                }
                            };
                            apply_effects(effects, &view, &mut queue, &mut player, &mut outbox);
                            flush(&mut sink, &mut outbox).await?;
                            terminal::render_screen(&view, &overlay, queue.playing(), &input);
                        }
                        Err(e) => log_warning(&format!("Malformed server frame dropped: {e}")),
                    }
                }
                Some(Ok(Message::Close(_))) | None => {
                    log_warning("Server closed the connection");
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log_error_stderr(&format!("Socket error: {e}"));
                    break;
                }
            },
            completed = done_rx.recv() => {
                if let Some(number) = completed {
                    // A clip cancelled moments before its natural end may
                    // still report in; only the current clip advances.
                    if queue.playing() == Some(number) {
                        if let Some(next) = queue.complete(|n| view.is_called(n)) {
                            player.start(next);
                        }
                        terminal::render_screen(&view, &overlay, queue.playing(), &input);
                    }
                }
            },
            key = keys.next() => match key {
                Some(Ok(Event::Key(event))) => {
                    let Some(action) = terminal::map_key(&event) else { continue };
                    if action == KeyAction::Quit {
                        break;
                    }
                    if !options.role.is_admin() {
                        continue; // guests are silent observers
                    }
                    let effects = admin_action(action, &mut view, &mut overlay, &mut input, &mut outbox, options);
                    apply_effects(effects, &view, &mut queue, &mut player, &mut outbox);
                    flush(&mut sink, &mut outbox).await?;
                    terminal::render_screen(&view, &overlay, queue.playing(), &input);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    log_error_stderr(&format!("Keyboard error: {e}"));
                    break;
                }
                None => break,
            },
        }
    }

    Ok(())
}

/// Admin keyboard handling. Returns view effects; events that do not touch
/// the view (announcements, reset) are pushed straight into the outbox.
fn admin_action(
    action: KeyAction,
    view: &mut ClientView,
    overlay: &mut Overlay,
    input: &mut String,
    outbox: &mut Vec<ClientEvent>,
    options: &ClientOptions,
) -> Vec<Effect> {
    match action {
        KeyAction::Draw => {
            if input.is_empty() {
                match view.pick_random() {
                    Some(number) => view.local_draw(number),
                    None => Vec::new(), // all 90 called
                }
            } else {
                let typed = input.parse::<Number>().ok();
                input.clear();
                match typed {
                    Some(n) if (FIRST_NUMBER..=LAST_NUMBER).contains(&n) => view.toggle(n),
                    _ => Vec::new(),
                }
            }
        }
        KeyAction::Digit(c) => {
            if input.len() < 2 {
                input.push(c);
            }
            Vec::new()
        }
        KeyAction::Backspace => {
            input.pop();
            Vec::new()
        }
        KeyAction::AnnounceLine => {
            announce(overlay, outbox, "LINE WINNER!", "LINE VERIFIED", view.line_prize.clone());
            Vec::new()
        }
        KeyAction::AnnounceBingo => {
            announce(overlay, outbox, "BINGO WINNER!", "BINGO VERIFIED", view.bingo_prize.clone());
            Vec::new()
        }
        KeyAction::HideOverlay => {
            overlay.hide();
            outbox.push(ClientEvent::HideAnnouncement);
            Vec::new()
        }
        KeyAction::Reset => {
            outbox.push(ClientEvent::ResetGame);
            if let (Some(line), Some(bingo)) = (&options.line_prize, &options.bingo_prize) {
                outbox.push(ClientEvent::SetPrizes {
                    line: line.clone(),
                    bingo: bingo.clone(),
                });
            }
            // Local state clears when the game-reset broadcast echoes back.
            Vec::new()
        }
        KeyAction::Quit => Vec::new(),
    }
}

/// Show locally and broadcast to peers; the hub excludes us from the echo.
fn announce(
    overlay: &mut Overlay,
    outbox: &mut Vec<ClientEvent>,
    title: &str,
    status: &str,
    amount: String,
) {
    let payload = AnnouncementPayload {
        title: title.to_string(),
        status: status.to_string(),
        amount,
    };
    overlay.show(payload.clone());
    outbox.push(ClientEvent::ShowAnnouncement(payload));
}

async fn flush<S>(sink: &mut S, outbox: &mut Vec<ClientEvent>) -> Result<(), Box<dyn Error>>
where
    S: SinkExt<Message> + Unpin,
    S::Error: Error + 'static,
{
    for event in outbox.drain(..) {
        let json = serde_json::to_string(&event)?;
        sink.send(Message::text(json)).await?;
    }
    Ok(())
}
