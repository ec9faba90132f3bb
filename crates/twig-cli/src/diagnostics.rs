use std::backtrace::Backtrace;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, Once, OnceLock, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, anyhow};

#[derive(Default)]
struct LogState {
    path: Option<PathBuf>,
    file: Option<File>,
}

static HOOK_ONCE: Once = Once::new();
static STATE: OnceLock<Mutex<LogState>> = OnceLock::new();

fn log_state() -> MutexGuard<'static, LogState> {
    STATE
        .get_or_init(|| Mutex::new(LogState::default()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn epoch_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

/// Process-wide diagnostics log. Recording is a no-op unless the session was
/// initialized with logging enabled.
pub struct DiagnosticsSession {
    path: Option<PathBuf>,
}

impl DiagnosticsSession {
    pub fn initialize(enabled: bool) -> Result<Self> {
        install_panic_hook();
        if !enabled {
            *log_state() = LogState::default();
            return Ok(Self { path: None });
        }

        let path = create_log_path()?;
        let file = open_log(&path)?;

        let mut state = log_state();
        state.path = Some(path.clone());
        state.file = Some(file);

        Ok(Self { path: Some(path) })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn record<S: AsRef<str>>(&self, entry: S) {
        append_line(entry.as_ref());
    }
}

fn open_log(path: &Path) -> Result<File> {
    let mut file = OpenOptions::new()
        .create_new(true)
        .write(true)
        .open(path)
        .with_context(|| format!("failed to create diagnostics log at {}", path.display()))?;

    writeln!(
        file,
        "twig diagnostics start\nversion={}\nstart_epoch_ms={}\npid={}\nargv={:?}",
        env!("CARGO_PKG_VERSION"),
        epoch_ms(),
        std::process::id(),
        std::env::args().collect::<Vec<String>>()
    )
    .and_then(|()| file.flush())
    .with_context(|| format!("failed to write diagnostics header to {}", path.display()))?;

    Ok(file)
}

fn install_panic_hook() {
    HOOK_ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|panic_info| {
            let location = panic_info
                .location()
                .map(|value| format!("{}:{}:{}", value.file(), value.line(), value.column()))
                .unwrap_or_else(|| "unknown".to_string());

            append_line("panic captured");
            append_line(format!("panic_message={}", panic_payload(panic_info)));
            append_line(format!("panic_location={location}"));
            append_line(format!("panic_backtrace={:?}", Backtrace::force_capture()));

            eprintln!("Fatal internal error in twig.");
            match log_state().path.clone() {
                Some(path) => eprintln!("Diagnostics written to {}", path.display()),
                None => eprintln!("Rerun with `twig --diagnostics` to capture a diagnostics log."),
            }
        }));
    });
}

fn panic_payload(panic_info: &std::panic::PanicHookInfo<'_>) -> String {
    if let Some(payload) = panic_info.payload().downcast_ref::<&str>() {
        return (*payload).to_string();
    }
    if let Some(payload) = panic_info.payload().downcast_ref::<String>() {
        return payload.clone();
    }
    "unknown panic payload".to_string()
}

fn append_line<S: AsRef<str>>(line: S) {
    let mut state = log_state();
    let Some(file) = state.file.as_mut() else {
        return;
    };

    let _ = writeln!(file, "[{}] {}", epoch_ms(), line.as_ref());
    let _ = file.flush();
}

fn create_log_path() -> Result<PathBuf> {
    let config_path = twig_core::config::resolve_config_path()
        .context("failed to resolve twig config path for diagnostics")?;
    let config_dir = config_path.parent().ok_or_else(|| {
        anyhow!(
            "failed to resolve diagnostics directory from config path {}",
            config_path.display()
        )
    })?;

    let diagnostics_dir = config_dir.join("diagnostics");
    fs::create_dir_all(&diagnostics_dir).with_context(|| {
        format!(
            "failed to create diagnostics directory {}",
            diagnostics_dir.display()
        )
    })?;

    Ok(diagnostics_dir.join(format!("{}.log", epoch_ms())))
}
