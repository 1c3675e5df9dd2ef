use std::process::{Child, Command as ProcessCommand, Stdio};

/// Best-effort keep-awake for the duration of a session, held open by a
/// helper process and released on drop. Failure is reported once and never
/// interrupts the session.
pub(crate) struct WakeLock {
    child: Option<Child>,
    warning: Option<String>,
}

impl WakeLock {
    pub(crate) fn acquire() -> Self {
        let Some((bin, args)) = inhibit_command() else {
            return Self {
                child: None,
                warning: Some("wake lock not supported on this platform".to_string()),
            };
        };

        match ProcessCommand::new(bin)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(child) => Self {
                child: Some(child),
                warning: None,
            },
            Err(err) => Self {
                child: None,
                warning: Some(format!("wake lock unavailable ({bin}: {err})")),
            },
        }
    }

    pub(crate) fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }
}

impl Drop for WakeLock {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

#[cfg(target_os = "linux")]
fn inhibit_command() -> Option<(&'static str, &'static [&'static str])> {
    Some((
        "systemd-inhibit",
        &[
            "--what=idle",
            "--who=gymcard",
            "--why=training session in progress",
            "sleep",
            "infinity",
        ],
    ))
}

#[cfg(target_os = "macos")]
fn inhibit_command() -> Option<(&'static str, &'static [&'static str])> {
    Some(("caffeinate", &["-dims"]))
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn inhibit_command() -> Option<(&'static str, &'static [&'static str])> {
    None
}
