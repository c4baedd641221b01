//! Game Loop Host
//!
//! Fixed-rate tick/render driver on top of macroquad's frame loop.
//!
//! State machine: NotRunning -> Running -> Stopped. Stopped is terminal:
//! `run` returns, which closes the window and ends the process when called
//! from `#[macroquad::main]`.
//!
//! Cadence is purely timer driven. Each frame runs exactly one tick, then the
//! host sleeps out the rest of the period. There is no catch-up or frame
//! skipping, so a game that overruns its period just runs slow.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::config::period_ms;
use crate::error::{Result, StandardsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Lifecycle of a `GameLoop`
pub enum LoopState {
    NotRunning,
    Running,
    Stopped,
}

/// Cloneable stop request flag, checked once per tick
#[derive(Debug, Clone, Default)]
pub struct StopHandle(Arc<AtomicBool>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether anyone has asked the loop to stop
    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Tick period derived from a target FPS
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    fps: u32,
    period_ms: u32,
}

impl FrameClock {
    /// Zero fps is rejected
    pub fn new(fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(StandardsError::InvalidConfig("fps must be greater than 0".into()));
        }
        Ok(Self { fps, period_ms: period_ms(fps) })
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Period in seconds
    pub fn period(&self) -> f64 {
        self.period_ms as f64 / 1000.0
    }

    /// Time left in this period after `elapsed` seconds of work (never negative)
    pub fn remaining(&self, elapsed: f64) -> f64 {
        (self.period() - elapsed).max(0.0)
    }
}

/// What the hooks see of the host
pub struct HostContext {
    stop: StopHandle,
    tick: u64,
    clock: FrameClock,
}

impl HostContext {
    /// Ask the host to stop before the next tick
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Handle that can request a stop later, from anywhere
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Ticks completed before the current one
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn fps(&self) -> u32 {
        self.clock.fps()
    }
}

/// A game driven by the host
pub trait Game {
    /// Per-frame update
    fn tick(&mut self, ctx: &mut HostContext);

    /// Draw the frame. The host presents it afterwards.
    fn render(&mut self, ctx: &mut HostContext);

    /// Called once when the loop stops
    fn on_stop(&mut self) {}
}

/// Platform-independent core of the host: state and tick sequencing
pub struct GameLoop {
    state: LoopState,
    ctx: HostContext,
}

impl GameLoop {
    /// A loop in the NotRunning state
    pub fn new(fps: u32) -> Result<Self> {
        Ok(Self {
            state: LoopState::NotRunning,
            ctx: HostContext {
                stop: StopHandle::default(),
                tick: 0,
                clock: FrameClock::new(fps)?,
            },
        })
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn clock(&self) -> FrameClock {
        self.ctx.clock
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.ctx.stop.clone()
    }

    pub fn tick_count(&self) -> u64 {
        self.ctx.tick
    }

    /// Enter Running. No-op when already running or stopped.
    pub fn start(&mut self) -> bool {
        if self.state != LoopState::NotRunning {
            return false;
        }
        self.state = LoopState::Running;
        log::info!("Game loop started at {} fps ({}ms period)", self.ctx.clock.fps(), self.ctx.clock.period_ms());
        true
    }

    /// Same as `StopHandle::request_stop`
    pub fn request_stop(&self) {
        self.ctx.stop.request_stop();
    }

    /// Run one tick: tear down if a stop was requested, otherwise update then render.
    pub fn step<G: Game + ?Sized>(&mut self, game: &mut G) -> LoopState {
        if self.state != LoopState::Running {
            return self.state;
        }
        if self.ctx.stop.is_stop_requested() {
            self.state = LoopState::Stopped;
            log::info!("Game loop stopped after {} ticks", self.ctx.tick);
            game.on_stop();
            return self.state;
        }

        game.tick(&mut self.ctx);
        game.render(&mut self.ctx);
        self.ctx.tick += 1;
        self.state
    }
}

/// Sleep for the bulk of the remaining period, then spin for precision
#[cfg(not(target_arch = "wasm32"))]
fn wait_out_period(clock: &FrameClock, frame_start: f64) {
    use macroquad::time::get_time;

    let target = clock.period();
    let spin_margin = 0.002;
    while get_time() - frame_start + spin_margin < target {
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
    while get_time() - frame_start < target {
        std::hint::spin_loop();
    }
}

// The browser paces frames itself
#[cfg(target_arch = "wasm32")]
fn wait_out_period(_clock: &FrameClock, _frame_start: f64) {}

/// Drive `game` until a stop is requested. Call from `#[macroquad::main]`.
pub async fn run<G: Game + ?Sized>(game: &mut G, fps: u32) -> Result<()> {
    let mut host = GameLoop::new(fps)?;
    host.start();

    loop {
        let frame_start = macroquad::time::get_time();
        if host.step(game) == LoopState::Stopped {
            break;
        }
        wait_out_period(&host.clock(), frame_start);
        macroquad::window::next_frame().await;
    }
    Ok(())
}
