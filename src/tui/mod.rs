//! # Render Loop
//!
//! Drives a [`CellGroup`] on a fixed interval until the process is asked to
//! stop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       RENDER LOOP                        │
//! │                                                          │
//! │   interval tick ──► update ──► draw (borders) ──► flush  │
//! │                                   │                      │
//! │                                   ▼                      │
//! │                      spawn one task per DrawJob          │
//! │                      (widgets finish in any order)       │
//! │                                                          │
//! │   Ctrl-C / SIGTERM ──► abort draws ──► guard drops       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The loop never waits on widgets. A widget that hangs keeps its own cell's
//! draw claim and that cell is skipped until it finishes; the rest of the
//! screen keeps ticking.

use std::future::Future;
use std::io;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;

use crate::core::cell::DrawJob;
use crate::core::geometry::TermSize;
use crate::core::group::CellGroup;
use crate::surface::Surface;

/// Puts the terminal into dashboard mode for as long as it lives.
///
/// Restores the primary screen and the cursor on drop, so every exit path
/// out of [`run`] (including `?` on a sink error) leaves the terminal usable.
pub struct TerminalGuard {
    surface: Surface,
}

impl TerminalGuard {
    pub fn new(surface: Surface) -> io::Result<Self> {
        surface.enter_alternate_screen()?;
        surface.clear()?;
        surface.hide_cursor()?;
        surface.flush()?;
        info!("Terminal modes enabled (alternate screen, hidden cursor)");
        Ok(Self { surface })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = self.surface.reset();
        let _ = self.surface.leave_alternate_screen();
        let _ = self.surface.show_cursor();
        let _ = self.surface.flush();
    }
}

/// Current terminal size, or [`TermSize::FALLBACK`] when stdout is not a tty.
pub fn terminal_size() -> TermSize {
    match crossterm::terminal::size() {
        Ok((cols, rows)) if cols > 0 && rows > 0 => TermSize::new(cols, rows),
        Ok(_) => TermSize::FALLBACK,
        Err(e) => {
            debug!("Could not query terminal size: {}", e);
            TermSize::FALLBACK
        }
    }
}

/// Run each job as its own task in `tasks`. Failures are logged, never
/// retried. Returns how many tasks were started.
pub fn spawn_jobs(jobs: Vec<DrawJob>, surface: &Surface, tasks: &mut JoinSet<()>) -> usize {
    let count = jobs.len();
    for job in jobs {
        let surface = surface.clone();
        tasks.spawn(async move {
            let name = job.widget_name().to_string();
            let area = job.area();
            if let Err(e) = job.run(surface).await {
                warn!("Widget '{}' failed drawing {}: {}", name, area, e);
            }
        });
    }
    count
}

/// One frame: advance the group, draw borders synchronously, then hand the
/// widget draws off to background tasks.
pub fn tick(
    group: &mut CellGroup,
    surface: &Surface,
    size: TermSize,
    tasks: &mut JoinSet<()>,
) -> io::Result<usize> {
    // Reap finished draws so the set only holds what is still running.
    while tasks.try_join_next().is_some() {}
    group.update();
    let jobs = group.draw(surface, size)?;
    surface.flush()?;
    Ok(spawn_jobs(jobs, surface, tasks))
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Could not listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Could not listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Run the dashboard until Ctrl-C or SIGTERM.
pub async fn run(group: CellGroup, surface: Surface, interval: Duration) -> io::Result<()> {
    run_until(group, surface, interval, shutdown_signal()).await
}

/// Run the dashboard until `shutdown` resolves.
///
/// Widget tasks still running at that point are aborted and awaited before
/// the terminal is restored, so none of them can write after it.
pub async fn run_until<F>(
    mut group: CellGroup,
    surface: Surface,
    interval: Duration,
    shutdown: F,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let _guard = TerminalGuard::new(surface.clone())?;
    let mut tasks = JoinSet::new();
    let outcome = render(&mut group, &surface, interval, shutdown, &mut tasks).await;

    if !tasks.is_empty() {
        debug!("Aborting {} widget draws still in flight", tasks.len());
    }
    tasks.shutdown().await;
    outcome
}

async fn render<F>(
    group: &mut CellGroup,
    surface: &Surface,
    interval: Duration,
    shutdown: F,
    tasks: &mut JoinSet<()>,
) -> io::Result<()>
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!("Render loop started: {} cells every {:?}", group.len(), interval);
    let mut last_size = None;

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, leaving render loop");
                return Ok(());
            }
            _ = ticker.tick() => {
                let size = terminal_size();
                if last_size != Some(size) {
                    // Stale borders from the old geometry would otherwise stay on screen.
                    info!("Terminal size now {}x{}", size.cols, size.rows);
                    surface.clear()?;
                    last_size = Some(size);
                }
                tick(group, surface, size, tasks)?;
            }
        }
    }
}
