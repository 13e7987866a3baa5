use crate::listener::start_listener;
use crate::process::{terminate_process, verify_process_running};
use snapkey_core::config::{
    ensure_config_dir, get_config_dir, get_pid_file_path, get_store_file_path, store_file_exists,
};
use snapkey_core::{
    is_daemon_running, EnigoOutput, ExpansionRequest, FocusWatcher, NullProbe, Pipeline, Result,
    Settings, SnapkeyError, SnippetLookup, SnippetStore,
};
use std::fs;
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;
use tracing::info;

/// Start the daemon as a detached background process.
pub fn start_daemon() -> Result<()> {
    if let Some(pid) = is_daemon_running()? {
        if verify_process_running(pid) {
            return Err(SnapkeyError::DaemonAlreadyRunning(pid));
        }
        // PID file exists but the process is gone; clean up and restart.
        println!("Found stale PID file. Cleaning up and starting new daemon...");
        let _ = fs::remove_file(get_pid_file_path());
    }

    println!("Starting snapkey daemon...");
    ensure_config_dir()?;

    if !store_file_exists() {
        return Err(SnapkeyError::StoreNotFound(
            get_store_file_path().to_string_lossy().to_string(),
        ));
    }

    let current_exe = std::env::current_exe()?;
    let log_file = get_config_dir().join("daemon_log.txt");

    #[cfg(unix)]
    {
        use std::process::Command;

        let cmd = format!(
            "nohup {} daemon-worker > {} 2>&1 &",
            current_exe.to_string_lossy(),
            log_file.to_string_lossy()
        );
        Command::new("sh").arg("-c").arg(&cmd).status()?;
    }

    #[cfg(windows)]
    {
        use std::process::Command;

        let cmd = format!(
            "START /B \"snapkey Daemon\" \"{}\" daemon-worker > \"{}\" 2>&1",
            current_exe.to_string_lossy(),
            log_file.to_string_lossy()
        );
        Command::new("cmd").arg("/C").arg(&cmd).status()?;
    }

    // Wait for the worker to come up and write its PID file.
    for _ in 0..20 {
        thread::sleep(Duration::from_millis(100));
        if is_daemon_running()?.is_some() {
            break;
        }
    }

    match is_daemon_running()? {
        Some(pid) if verify_process_running(pid) => {
            println!("Daemon started successfully with PID {}.", pid);
            Ok(())
        }
        _ => Err(SnapkeyError::Other(format!(
            "Daemon failed to start. Check logs at {}",
            log_file.to_string_lossy()
        ))),
    }
}

/// Stop the daemon if it's running.
pub fn stop_daemon() -> Result<()> {
    let pid_file = get_pid_file_path();
    if !pid_file.exists() {
        return Err(SnapkeyError::DaemonNotRunning);
    }

    let pid_str = fs::read_to_string(&pid_file)?;
    let pid = match pid_str.trim().parse::<u32>() {
        Ok(pid) => pid,
        Err(_) => {
            let _ = fs::remove_file(&pid_file);
            return Err(SnapkeyError::InvalidPid);
        }
    };

    if verify_process_running(pid) && !terminate_process(pid) {
        return Err(SnapkeyError::Other(format!(
            "Failed to terminate daemon process {}",
            pid
        )));
    }

    let _ = fs::remove_file(&pid_file);
    println!("Daemon stopped.");
    Ok(())
}

/// Print whether the daemon is running.
pub fn daemon_status() -> Result<()> {
    match is_daemon_running()? {
        Some(pid) if verify_process_running(pid) => {
            println!("snapkey daemon is running with PID {}.", pid);
        }
        Some(pid) => {
            println!("Stale PID file found (PID {}); daemon is not running.", pid);
        }
        None => {
            println!("snapkey daemon is not running.");
        }
    }
    Ok(())
}

/// The daemon worker body: builds the pipeline, attaches the hook, and
/// parks until the PID file disappears or is taken over.
pub fn run_worker() -> Result<()> {
    // Worker stdout is redirected to the daemon log file by `start_daemon`.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    ensure_config_dir()?;

    let pid = std::process::id();
    let pid_file = get_pid_file_path();
    fs::write(&pid_file, pid.to_string())?;

    let store = SnippetStore::load()?;
    info!(snippets = store.snippets.len(), "snippet store loaded");
    let lookup: Arc<dyn SnippetLookup> = Arc::new(RwLock::new(store));

    let settings = Settings::load()?;
    let output = EnigoOutput::new()?;

    let pipeline = Pipeline::spawn(
        lookup,
        settings,
        output,
        Some(Box::new(|request: &ExpansionRequest| {
            info!(keyword = %request.keyword, "expanded");
        })),
    );

    // A failed hook attach leaves the whole feature inoperable; bail out
    // instead of idling uselessly.
    let _listener = start_listener(pipeline.handle(), pipeline.suppression())?;

    let focus_handle = pipeline.handle();
    let _focus_watcher = FocusWatcher::spawn(NullProbe, move || focus_handle.reset());

    info!(pid, "snapkey daemon running");

    // `stop_daemon` kills us or removes the PID file; either way this loop
    // is how we notice a takeover by a newer worker.
    loop {
        thread::sleep(Duration::from_millis(500));
        match fs::read_to_string(&pid_file) {
            Ok(contents) if contents.trim() == pid.to_string() => {}
            _ => break,
        }
    }

    info!("snapkey daemon shutting down");
    pipeline.shutdown();
    Ok(())
}
