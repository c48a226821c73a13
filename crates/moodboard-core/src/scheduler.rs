//! Timed and manual board cycling on a background worker.
//!
//! The worker owns the cycle state and is driven only through
//! [`SchedulerCommand`]s; composed boards come back as [`SchedulerEvent`]s.
//! The running flag and the current index are mirrored into atomics so the
//! foreground can read them without a round trip.
//!
//! The event queue holds at most [`EVENT_CAPACITY`] events. When the
//! foreground falls behind, the oldest pending events are discarded so the
//! queue always carries the most recent boards.

use crate::catalog::ImageCatalog;
use crate::config::BoardConfig;
use crate::error::{MoodBoardError, Result};
use crate::pipeline::{Board, compose_board};
use crate::selector::{advance, next_window, retreat};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Maximum number of undelivered events kept for the foreground.
pub const EVENT_CAPACITY: usize = 4;

/// Commands understood by the scheduler worker.
#[derive(Debug)]
pub enum SchedulerCommand {
    Start,
    Stop,
    Next,
    Previous,
    SetInterval(Duration),
    SetBatchSize(usize),
    SetCanvas { width: u32, height: u32 },
    SetCatalog(ImageCatalog),
    /// Re-render the current window without moving.
    Refresh,
    Shutdown,
}

/// What caused a board to be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Tick,
    Next,
    Previous,
    Catalog,
    Refresh,
}

/// A rendered board and the index it was rendered for.
#[derive(Debug, Clone)]
pub struct BoardFrame {
    pub trigger: Trigger,
    pub index: usize,
    pub board: Board,
}

/// Events sent from the worker to the foreground.
#[derive(Debug, Clone)]
pub enum SchedulerEvent {
    Board(BoardFrame),
    /// The catalog is empty; the display should show a blank canvas.
    Cleared { trigger: Trigger },
    Running(bool),
}

impl SchedulerEvent {
    fn kind(&self) -> &'static str {
        match self {
            SchedulerEvent::Board(_) => "board",
            SchedulerEvent::Cleared { .. } => "cleared",
            SchedulerEvent::Running(_) => "running",
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    running: AtomicBool,
    current_index: AtomicUsize,
    ticks: AtomicU64,
}

/// State owned by the worker thread.
#[derive(Debug)]
struct CycleState {
    interval: Duration,
    running: bool,
    current_index: usize,
    next_tick: Option<Instant>,
    config: BoardConfig,
    catalog: ImageCatalog,
}

/// Handle to the cycle worker. Dropping it shuts the worker down.
pub struct CycleScheduler {
    command_tx: Sender<SchedulerCommand>,
    event_rx: Receiver<SchedulerEvent>,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl CycleScheduler {
    /// Spawn a stopped scheduler over `catalog` using `cfg` for interval,
    /// batch size and canvas capacity.
    pub fn spawn(cfg: &BoardConfig, catalog: ImageCatalog) -> Result<Self> {
        cfg.validate()?;
        let (command_tx, command_rx) = unbounded::<SchedulerCommand>();
        let (event_tx, event_rx) = bounded::<SchedulerEvent>(EVENT_CAPACITY);
        let backlog = event_rx.clone();
        let shared = Arc::new(Shared::default());
        let state = CycleState {
            interval: cfg.interval(),
            running: false,
            current_index: 0,
            next_tick: None,
            config: cfg.clone(),
            catalog,
        };
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("moodboard-cycle".into())
            .spawn(move || {
                let mut worker = Worker {
                    state,
                    shared: worker_shared,
                    events: event_tx,
                    backlog,
                };
                worker.run(command_rx);
            })?;
        Ok(Self {
            command_tx,
            event_rx,
            shared,
            worker: Some(worker),
        })
    }

    pub fn send(&self, cmd: SchedulerCommand) -> Result<()> {
        self.command_tx
            .send(cmd)
            .map_err(|_| MoodBoardError::SchedulerClosed)
    }

    pub fn start(&self) -> Result<()> {
        self.send(SchedulerCommand::Start)
    }

    pub fn stop(&self) -> Result<()> {
        self.send(SchedulerCommand::Stop)
    }

    pub fn next(&self) -> Result<()> {
        self.send(SchedulerCommand::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.send(SchedulerCommand::Previous)
    }

    pub fn set_interval(&self, interval: Duration) -> Result<()> {
        self.send(SchedulerCommand::SetInterval(interval))
    }

    pub fn set_batch_size(&self, batch_size: usize) -> Result<()> {
        self.send(SchedulerCommand::SetBatchSize(batch_size))
    }

    pub fn set_canvas(&self, width: u32, height: u32) -> Result<()> {
        self.send(SchedulerCommand::SetCanvas { width, height })
    }

    pub fn set_catalog(&self, catalog: ImageCatalog) -> Result<()> {
        self.send(SchedulerCommand::SetCatalog(catalog))
    }

    pub fn refresh(&self) -> Result<()> {
        self.send(SchedulerCommand::Refresh)
    }

    /// Rendered boards and state changes, in the order the worker produced them.
    /// Older events are dropped once [`EVENT_CAPACITY`] are pending.
    pub fn events(&self) -> &Receiver<SchedulerEvent> {
        &self.event_rx
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn current_index(&self) -> usize {
        self.shared.current_index.load(Ordering::Acquire)
    }

    /// Number of timer ticks that advanced the board so far.
    pub fn ticks(&self) -> u64 {
        self.shared.ticks.load(Ordering::Acquire)
    }

    /// Stop the worker and wait for it to exit.
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        let _ = self.command_tx.send(SchedulerCommand::Shutdown);
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                warn!("cycle worker panicked");
            }
        }
    }
}

impl Drop for CycleScheduler {
    fn drop(&mut self) {
        self.join();
    }
}

struct Worker {
    state: CycleState,
    shared: Arc<Shared>,
    events: Sender<SchedulerEvent>,
    /// Worker-side handle on the event queue, used to evict stale events.
    backlog: Receiver<SchedulerEvent>,
}

impl Worker {
    fn run(&mut self, commands: Receiver<SchedulerCommand>) {
        info!("cycle worker started");
        loop {
            // Pending commands win over an elapsed deadline, so a Stop queued
            // before the tick is always honored first.
            let received = match self.state.next_tick {
                Some(deadline) => commands.recv_deadline(deadline),
                None => commands.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(SchedulerCommand::Shutdown) => break,
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.shared.running.store(false, Ordering::Release);
        info!("cycle worker stopped");
    }

    fn handle(&mut self, cmd: SchedulerCommand) {
        match cmd {
            SchedulerCommand::Start => {
                if !self.state.running {
                    self.state.running = true;
                    self.state.next_tick = Some(Instant::now() + self.state.interval);
                    self.shared.running.store(true, Ordering::Release);
                    info!(interval_ms = self.state.interval.as_millis() as u64, "cycling started");
                    self.emit(SchedulerEvent::Running(true));
                }
            }
            SchedulerCommand::Stop => {
                if self.state.running {
                    self.state.running = false;
                    self.state.next_tick = None;
                    self.shared.running.store(false, Ordering::Release);
                    info!("cycling stopped");
                    self.emit(SchedulerEvent::Running(false));
                }
            }
            SchedulerCommand::Next => {
                self.move_index(advance);
                self.render(Trigger::Next);
            }
            SchedulerCommand::Previous => {
                self.move_index(retreat);
                self.render(Trigger::Previous);
            }
            SchedulerCommand::SetInterval(interval) => {
                if interval.is_zero() {
                    warn!("ignoring zero cycle interval");
                } else {
                    self.state.interval = interval;
                }
            }
            SchedulerCommand::SetBatchSize(n) => {
                if n == 0 {
                    warn!("ignoring zero batch size");
                } else {
                    self.state.config.images_per_board = n;
                }
            }
            SchedulerCommand::SetCanvas { width, height } => {
                if width == 0 || height == 0 {
                    warn!(width, height, "ignoring empty canvas size");
                } else {
                    self.state.config.canvas_width = width;
                    self.state.config.canvas_height = height;
                }
            }
            SchedulerCommand::SetCatalog(catalog) => {
                debug!(len = catalog.len(), "catalog replaced");
                self.state.catalog = catalog;
                self.set_index(0);
                self.render(Trigger::Catalog);
            }
            SchedulerCommand::Refresh => self.render(Trigger::Refresh),
            SchedulerCommand::Shutdown => {}
        }
    }

    fn tick(&mut self) {
        if !self.state.running {
            self.state.next_tick = None;
            return;
        }
        self.move_index(advance);
        self.shared.ticks.fetch_add(1, Ordering::AcqRel);
        self.render(Trigger::Tick);
        // The next sleep starts after the render, with the interval in force now.
        self.state.next_tick = Some(Instant::now() + self.state.interval);
    }

    fn move_index(&mut self, step: fn(usize, usize, usize) -> usize) {
        let next = step(
            self.state.current_index,
            self.state.config.images_per_board,
            self.state.catalog.len(),
        );
        self.set_index(next);
    }

    fn set_index(&mut self, index: usize) {
        self.state.current_index = index;
        self.shared.current_index.store(index, Ordering::Release);
    }

    fn render(&mut self, trigger: Trigger) {
        if self.state.catalog.is_empty() {
            self.emit(SchedulerEvent::Cleared { trigger });
            return;
        }
        let window = next_window(
            self.state.current_index,
            self.state.config.images_per_board,
            self.state.catalog.len(),
        );
        let board = compose_board(&self.state.catalog, window, &self.state.config);
        if !board.warnings.is_empty() {
            warn!(
                index = self.state.current_index,
                warnings = board.warnings.len(),
                "board composed with warnings"
            );
        }
        self.emit(SchedulerEvent::Board(BoardFrame {
            trigger,
            index: self.state.current_index,
            board,
        }));
    }

    fn emit(&self, mut event: SchedulerEvent) {
        // Only the worker sends, so one eviction always makes room.
        loop {
            match self.events.try_send(event) {
                Ok(()) => return,
                Err(TrySendError::Full(back)) => {
                    if let Ok(stale) = self.backlog.try_recv() {
                        debug!(kind = stale.kind(), "event queue full, dropped oldest event");
                    }
                    event = back;
                }
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}
