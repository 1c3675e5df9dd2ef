use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command as ProcessCommand, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};

/// Posted by the watcher thread when a clip's player process exits on its
/// own. Cancelled clips (stopped or replaced) never produce an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PlayerEvent {
    pub(crate) card_index: usize,
    pub(crate) completed: bool,
}

struct ActiveClip {
    child: Arc<Mutex<Child>>,
    pid: u32,
    cancelled: Arc<AtomicBool>,
    paused: bool,
}

/// Owns the single playing clip. Starting a new clip always stops the
/// previous one first, so at most one player process runs at a time.
pub(crate) struct AudioPlayer {
    tx: mpsc::Sender<PlayerEvent>,
    active: Option<ActiveClip>,
}

impl AudioPlayer {
    pub(crate) fn new(tx: mpsc::Sender<PlayerEvent>) -> Self {
        Self { tx, active: None }
    }

    pub(crate) fn play(&mut self, card_index: usize, source: &str) -> Result<()> {
        self.stop();

        let bin = resolve_player_bin();
        let mut cmd = ProcessCommand::new(&bin);
        for arg in player_args(&bin) {
            cmd.arg(arg);
        }
        let child = cmd
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to launch {}", bin.display()))?;

        let pid = child.id();
        let child = Arc::new(Mutex::new(child));
        let cancelled = Arc::new(AtomicBool::new(false));
        spawn_exit_watcher(
            Arc::clone(&child),
            Arc::clone(&cancelled),
            self.tx.clone(),
            card_index,
        );

        self.active = Some(ActiveClip {
            child,
            pid,
            cancelled,
            paused: false,
        });
        Ok(())
    }

    /// Suspends the player process. Returns false when pausing is not
    /// supported on this platform or nothing is playing.
    pub(crate) fn pause(&mut self) -> bool {
        let Some(clip) = self.active.as_mut() else {
            return false;
        };
        if clip.paused {
            return true;
        }
        if signal_process(clip.pid, PauseSignal::Stop) {
            clip.paused = true;
            true
        } else {
            false
        }
    }

    pub(crate) fn resume(&mut self) -> bool {
        let Some(clip) = self.active.as_mut() else {
            return false;
        };
        if !clip.paused {
            return true;
        }
        if signal_process(clip.pid, PauseSignal::Continue) {
            clip.paused = false;
            true
        } else {
            false
        }
    }

    /// Kills the current clip, if any. Safe to call from any state; the
    /// watcher sees the cancellation flag and swallows the exit.
    pub(crate) fn stop(&mut self) {
        let Some(clip) = self.active.take() else {
            return;
        };
        clip.cancelled.store(true, Ordering::SeqCst);
        if clip.paused {
            // A stopped process cannot handle SIGKILL's reaping cleanly
            // while suspended; wake it first.
            signal_process(clip.pid, PauseSignal::Continue);
        }
        if let Ok(mut child) = clip.child.lock() {
            let _ = child.kill();
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn spawn_exit_watcher(
    child: Arc<Mutex<Child>>,
    cancelled: Arc<AtomicBool>,
    tx: mpsc::Sender<PlayerEvent>,
    card_index: usize,
) {
    thread::spawn(move || {
        loop {
            let status = {
                let Ok(mut guard) = child.lock() else {
                    return;
                };
                match guard.try_wait() {
                    Ok(Some(status)) => Some(status.success()),
                    Ok(None) => None,
                    Err(_) => Some(false),
                }
            };
            match status {
                Some(completed) => {
                    if !cancelled.load(Ordering::SeqCst) {
                        let _ = tx.send(PlayerEvent {
                            card_index,
                            completed,
                        });
                    }
                    return;
                }
                None => thread::sleep(Duration::from_millis(100)),
            }
        }
    });
}

pub(crate) fn resolve_player_bin() -> PathBuf {
    resolve_player_bin_from_env(env::var_os("GYMCARD_PLAYER_BIN"))
}

pub(crate) fn resolve_player_bin_from_env(env_value: Option<OsString>) -> PathBuf {
    match env_value {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => PathBuf::from("mpv"),
    }
}

fn player_args(bin: &Path) -> &'static [&'static str] {
    let is_mpv = bin
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem == "mpv");
    if is_mpv {
        &["--really-quiet", "--no-video"]
    } else {
        &[]
    }
}

enum PauseSignal {
    Stop,
    Continue,
}

#[cfg(unix)]
fn signal_process(pid: u32, signal: PauseSignal) -> bool {
    let signum = match signal {
        PauseSignal::Stop => libc::SIGSTOP,
        PauseSignal::Continue => libc::SIGCONT,
    };
    unsafe { libc::kill(pid as libc::pid_t, signum) == 0 }
}

#[cfg(not(unix))]
fn signal_process(_pid: u32, _signal: PauseSignal) -> bool {
    false
}
