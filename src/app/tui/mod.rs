mod render;

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use super::cards::{Card, CardKind};
use super::clipboard::copy_to_clipboard;
use super::player::{AudioPlayer, PlayerEvent};
use super::records::{RecordRow, generate_summary, pop_digit, push_digit};
use super::sequencer::{Effect, Sequencer, SequencerState, SessionEvent};
use super::wake::WakeLock;

use self::render::draw_session;

/// Puts the terminal into raw mode on the alternate screen and restores it
/// on drop. The session never suspends mid-run; the audio player is a
/// background child, so a single activate/restore pair is enough.
struct ScreenGuard {
    raw: bool,
}

impl ScreenGuard {
    fn activate() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen).context("failed to enter alternate screen")?;
        Ok(Self { raw: true })
    }

    fn restore(&mut self) -> Result<()> {
        if self.raw {
            self.raw = false;
            execute!(io::stdout(), LeaveAlternateScreen)
                .context("failed to leave alternate screen")?;
            disable_raw_mode().context("failed to disable raw mode")?;
        }
        Ok(())
    }
}

impl Drop for ScreenGuard {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RecordField {
    Weight,
    Reps,
}

impl RecordField {
    fn toggled(self) -> Self {
        match self {
            Self::Weight => Self::Reps,
            Self::Reps => Self::Weight,
        }
    }
}

pub(crate) fn run_session(mut cards: Vec<Card>) -> Result<()> {
    let wake = WakeLock::acquire();
    let mut screen = ScreenGuard::activate()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let (player_tx, player_rx) = mpsc::channel::<PlayerEvent>();
    let mut player = AudioPlayer::new(player_tx);
    let mut sequencer = Sequencer::new(cards.iter().map(|card| card.kind).collect());

    let total = sequencer.total_training();
    let mut active_card = None::<usize>;
    let mut row_cursor = 0_usize;
    let mut field = RecordField::Weight;
    let mut progress = (0.0_f64, format!("0/{total}"));
    let mut results = None::<String>;
    let mut pending_end = false;
    let mut status = status_info("Press Enter to start the session.");
    if let Some(warning) = wake.warning() {
        status = status_info(&format!("Press Enter to start. ({warning})"));
    }

    let begin_effects = sequencer.begin();
    apply_effects(
        begin_effects,
        &cards,
        &mut player,
        &mut active_card,
        &mut row_cursor,
        &mut progress,
        &mut results,
        &mut status,
    );

    loop {
        while let Ok(player_event) = player_rx.try_recv() {
            if player_event.completed {
                let effects = sequencer.handle(SessionEvent::MediaEnded(player_event.card_index));
                apply_effects(
                    effects,
                    &cards,
                    &mut player,
                    &mut active_card,
                    &mut row_cursor,
                    &mut progress,
                    &mut results,
                    &mut status,
                );
            } else {
                status = status_error("Audio playback failed; press n to skip ahead.");
            }
        }

        terminal.draw(|frame| {
            draw_session(
                frame,
                &cards,
                &sequencer,
                active_card,
                row_cursor,
                field,
                &progress,
                results.as_deref(),
                &status,
                pending_end,
            )
        })?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if pending_end {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    pending_end = false;
                    status = status_info("Session ended. Press c to copy the summary, q to quit.");
                    let effects = sequencer.handle(SessionEvent::Terminate);
                    apply_effects(
                        effects,
                        &cards,
                        &mut player,
                        &mut active_card,
                        &mut row_cursor,
                        &mut progress,
                        &mut results,
                        &mut status,
                    );
                }
                KeyCode::Esc | KeyCode::Char('n') => {
                    pending_end = false;
                    status = status_info("End canceled.");
                }
                _ => {}
            }
            continue;
        }

        match sequencer.state() {
            SequencerState::NotStarted => match key.code {
                KeyCode::Enter => {
                    status = status_info("Session started.");
                    let effects = sequencer.handle(SessionEvent::Start);
                    apply_effects(
                        effects,
                        &cards,
                        &mut player,
                        &mut active_card,
                        &mut row_cursor,
                        &mut progress,
                        &mut results,
                        &mut status,
                    );
                }
                KeyCode::Char('e') => {
                    pending_end = true;
                    status = status_info("Confirm end: y/Enter to end, n/Esc to cancel.");
                }
                KeyCode::Char('q') => break,
                _ => {}
            },
            SequencerState::Playing(index) => match key.code {
                KeyCode::Char(' ') => {
                    let effects = sequencer.handle(SessionEvent::TogglePause);
                    apply_effects(
                        effects,
                        &cards,
                        &mut player,
                        &mut active_card,
                        &mut row_cursor,
                        &mut progress,
                        &mut results,
                        &mut status,
                    );
                    if sequencer.is_paused() {
                        status = status_info("Paused.");
                    } else {
                        status = status_info("Resumed.");
                    }
                }
                KeyCode::Char('n') => {
                    let effects = sequencer.handle(SessionEvent::Skip);
                    apply_effects(
                        effects,
                        &cards,
                        &mut player,
                        &mut active_card,
                        &mut row_cursor,
                        &mut progress,
                        &mut results,
                        &mut status,
                    );
                }
                KeyCode::Char('e') => {
                    pending_end = true;
                    status = status_info("Confirm end: y/Enter to end, n/Esc to cancel.");
                }
                KeyCode::Char('q') => break,
                code => {
                    if cards[index].kind == CardKind::Training {
                        handle_record_key(
                            code,
                            &mut cards[index].records,
                            &mut row_cursor,
                            &mut field,
                            &mut status,
                        );
                    }
                }
            },
            SequencerState::Ended => match key.code {
                KeyCode::Char('c') => {
                    let summary = results
                        .clone()
                        .unwrap_or_else(|| generate_summary(&cards));
                    match copy_to_clipboard(&summary) {
                        Ok(tool) => status = status_info(&format!("Summary copied via {tool}.")),
                        Err(err) => status = status_error(&format!("Copy failed: {err}")),
                    }
                }
                KeyCode::Char('q') => break,
                _ => {}
            },
        }
    }

    player.stop();
    terminal.show_cursor()?;
    screen.restore()?;
    drop(wake);

    if let Some(summary) = results {
        println!("{summary}");
        println!();
    }
    println!("Run `gymcard select <id,id,...>` to change the lineup for next time.");
    Ok(())
}

fn handle_record_key(
    code: KeyCode,
    records: &mut Vec<RecordRow>,
    row_cursor: &mut usize,
    field: &mut RecordField,
    status: &mut String,
) {
    if records.is_empty() {
        return;
    }
    *row_cursor = (*row_cursor).min(records.len() - 1);

    match code {
        KeyCode::Up => *row_cursor = row_cursor.saturating_sub(1),
        KeyCode::Down => *row_cursor = (*row_cursor + 1).min(records.len() - 1),
        KeyCode::Left | KeyCode::Right | KeyCode::Tab => *field = field.toggled(),
        KeyCode::Char('b') => {
            records[*row_cursor].toggle_bodyweight();
            if records[*row_cursor].bodyweight {
                *field = RecordField::Reps;
            }
        }
        KeyCode::Char('a') => {
            records.push(RecordRow::empty());
            *row_cursor = records.len() - 1;
        }
        KeyCode::Char('c') => {
            if *row_cursor == 0 {
                *status = status_info("The first set has nothing to copy from.");
            } else {
                let previous = records[*row_cursor - 1];
                records[*row_cursor].copy_previous(&previous);
            }
        }
        KeyCode::Char(ch) if ch.is_ascii_digit() => {
            let digit = ch.to_digit(10).unwrap_or(0);
            let row = &mut records[*row_cursor];
            match field {
                RecordField::Weight if !row.bodyweight => row.weight = push_digit(row.weight, digit),
                RecordField::Weight => {}
                RecordField::Reps => row.reps = push_digit(row.reps, digit),
            }
        }
        KeyCode::Backspace => {
            let row = &mut records[*row_cursor];
            match field {
                RecordField::Weight if !row.bodyweight => row.weight = pop_digit(row.weight),
                RecordField::Weight => {}
                RecordField::Reps => row.reps = pop_digit(row.reps),
            }
        }
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn apply_effects(
    effects: Vec<Effect>,
    cards: &[Card],
    player: &mut AudioPlayer,
    active_card: &mut Option<usize>,
    row_cursor: &mut usize,
    progress: &mut (f64, String),
    results: &mut Option<String>,
    status: &mut String,
) {
    for effect in effects {
        match effect {
            Effect::Activate(index) => {
                *active_card = Some(index);
                *row_cursor = 0;
                match cards[index].audio.as_deref() {
                    Some(source) => {
                        if let Err(err) = player.play(index, source) {
                            // Autoplay-blocked analog: stay on the card,
                            // paused, until the user acts.
                            *status = status_error(&format!(
                                "Audio unavailable ({err:#}); press n to continue."
                            ));
                        }
                    }
                    None => {
                        *status = status_info("This card has no audio; press n to continue.");
                    }
                }
            }
            Effect::PauseAudio => {
                if !player.pause() {
                    *status = status_error("Pause is not supported on this platform.");
                }
            }
            Effect::ResumeAudio => {
                if !player.resume() {
                    *status = status_error("Resume failed; press n to continue.");
                }
            }
            Effect::StopAll => player.stop(),
            Effect::Progress { done, total } => {
                let ratio = if total > 0 {
                    (f64::from(done) / f64::from(total)).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                *progress = (ratio, format!("{done}/{total}"));
            }
            Effect::ShowResults => {
                *results = Some(generate_summary(cards));
            }
        }
    }
}

pub(super) fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

pub(super) fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}
