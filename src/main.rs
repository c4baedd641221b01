//! Follow the Mouse
//!
//! Standards demo: a triangle ship eases toward the cursor, clicking fires
//! bullets, bullets chip away at a column of bricks. Touching a brick hurts
//! the ship. Escape quits.
//!
//! Sounds are read from `assets/audio/sfx/`; missing files just mean silence.

use std::path::Path;

use macroquad::prelude::*;
use standards::audio::{AudioSlot, Mixer, WavLoader};
use standards::game::{
    Body, Camera, CollisionHandler, DeathListener, DeathWatch, EntityId, Game, GameObject,
    HostContext, ObjectKind,
};
use standards::{GameConfig, Result};

const LASER_SFX: &str = "assets/audio/sfx/laser_sfx.wav";
const DAMAGE_SFX: [&str; 3] = [
    "assets/audio/sfx/damage_0.wav",
    "assets/audio/sfx/damage_1.wav",
    "assets/audio/sfx/damage_2.wav",
];
/// Overlapping copies kept per sound
const CLIPS_PER_SOUND: usize = 10;

const BULLET_SPEED: f32 = 12.0;
const BULLET_LIFETIME: u32 = 90;
const BRICK_SIZE: f32 = 64.0;
const BRICK_COUNT: usize = 10;

fn load_config() -> GameConfig {
    GameConfig::load(Path::new("game.ron"))
        .unwrap_or_else(|_| GameConfig::new(1280, 720, 60, "Game Test"))
}

fn window_conf() -> Conf {
    load_config().window_conf()
}

// =============================================================================
// Actors
// =============================================================================

struct Player {
    body: Body,
    target: Vec2,
    angle: f32,
}

impl Player {
    fn tick(&mut self) {
        let to_target = self.target - self.body.center();
        self.body.velocity = to_target * 0.1;
        if to_target.length_squared() > 1.0 {
            self.angle = to_target.y.atan2(to_target.x);
        }
        self.body.integrate();
    }

    fn render(&self) {
        let c = self.body.center();
        let r = self.body.size.x * 0.5;
        let point = |offset: f32| c + Vec2::from_angle(self.angle + offset) * r;
        draw_triangle(point(0.0), point(2.5), point(-2.5), SKYBLUE);
    }
}

struct Brick {
    body: Body,
    color: Color,
}

impl Brick {
    fn render(&self) {
        let b = self.body.bounds();
        let fade = self.body.health / self.body.max_health;
        let color = Color::new(self.color.r, self.color.g, self.color.b, 0.3 + 0.7 * fade);
        draw_rectangle(b.x, b.y, b.w, b.h, color);
        draw_rectangle_lines(b.x, b.y, b.w, b.h, 2.0, self.color);
    }
}

struct Bullet {
    body: Body,
    ttl: u32,
}

impl Bullet {
    fn tick(&mut self) {
        self.body.integrate();
        self.ttl = self.ttl.saturating_sub(1);
        if self.ttl == 0 {
            self.body.kill();
        }
    }
}

enum Actor {
    Player(Player),
    Brick(Brick),
    Bullet(Bullet),
}

impl GameObject for Actor {
    fn kind(&self) -> ObjectKind {
        match self {
            Actor::Player(_) => ObjectKind::Player,
            Actor::Brick(_) => ObjectKind::Block,
            Actor::Bullet(_) => ObjectKind::Bullet,
        }
    }

    fn body(&self) -> &Body {
        match self {
            Actor::Player(p) => &p.body,
            Actor::Brick(b) => &b.body,
            Actor::Bullet(b) => &b.body,
        }
    }

    fn body_mut(&mut self) -> &mut Body {
        match self {
            Actor::Player(p) => &mut p.body,
            Actor::Brick(b) => &mut b.body,
            Actor::Bullet(b) => &mut b.body,
        }
    }

    fn tick(&mut self) {
        match self {
            Actor::Player(p) => p.tick(),
            Actor::Brick(_) => {}
            Actor::Bullet(b) => b.tick(),
        }
    }

    fn render(&self) {
        match self {
            Actor::Player(p) => p.render(),
            Actor::Brick(b) => b.render(),
            Actor::Bullet(b) => {
                let c = b.body.center();
                draw_circle(c.x, c.y, b.body.size.x * 0.5, YELLOW);
            }
        }
    }

    fn on_collision(&mut self, other: ObjectKind, _other_bounds: Rect) {
        match (self, other) {
            (Actor::Bullet(b), ObjectKind::Block) => b.body.kill(),
            (Actor::Brick(b), ObjectKind::Bullet) => {
                b.body.damage(25.0);
            }
            (Actor::Player(p), ObjectKind::Block) => {
                p.body.damage(0.5);
            }
            _ => {}
        }
    }

    // Bullets count down their lifetime off-screen too
    fn always_active(&self) -> bool {
        matches!(self, Actor::Bullet(_))
    }
}

// =============================================================================
// Sounds
// =============================================================================

type Sfx = AudioSlot<WavLoader>;

fn play(audio: &mut Sfx, id: &str) {
    if let Some(pool) = audio.get_mut() {
        if let Err(e) = pool.play(id) {
            log::debug!("Skipping sound: {}", e);
        }
    }
}

/// Plays a random damage sound when a brick breaks
struct BrickBreak<'a> {
    audio: &'a mut Sfx,
}

impl DeathListener for BrickBreak<'_> {
    fn upon_death(&mut self) {
        let idx = macroquad::rand::gen_range(0, DAMAGE_SFX.len());
        play(self.audio, DAMAGE_SFX[idx]);
    }
}

// =============================================================================
// Game
// =============================================================================

struct FollowTheMouse {
    sch: CollisionHandler<Actor>,
    player: EntityId,
    player_watch: DeathWatch,
    audio: Sfx,
    // Keeps the output stream alive
    _mixer: Mixer,
    stars: Vec<Vec2>,
    bricks_broken: u32,
}

impl FollowTheMouse {
    fn new(config: &GameConfig) -> Result<Self> {
        let mixer = Mixer::new();
        let mut audio = Sfx::new();
        let pool = audio.init(config.audio_buffers, mixer.wav_loader())?;
        for path in std::iter::once(LASER_SFX).chain(DAMAGE_SFX) {
            for _ in 0..CLIPS_PER_SOUND {
                if let Err(e) = pool.load(path) {
                    log::warn!("Could not load {}: {}", path, e);
                    break;
                }
            }
        }

        let camera = Camera::new(config.width as f32, config.height as f32, 1.0)?;
        let mut sch = CollisionHandler::new(Some(camera));

        let player = sch.add_entity(Actor::Player(Player {
            body: Body::new(200.0, 200.0, 32.0, 32.0),
            target: vec2(216.0, 216.0),
            angle: 0.0,
        }));

        for i in 0..BRICK_COUNT {
            let y = BRICK_SIZE + i as f32 * BRICK_SIZE;
            sch.add_entity(Actor::Brick(Brick {
                body: Body::new(100.0, y, BRICK_SIZE, BRICK_SIZE),
                color: ORANGE,
            }));
        }

        let stars = (0..200)
            .map(|_| {
                vec2(
                    macroquad::rand::gen_range(-2000.0, 2000.0),
                    macroquad::rand::gen_range(-2000.0, 2000.0),
                )
            })
            .collect();

        Ok(Self {
            sch,
            player,
            player_watch: DeathWatch::new(),
            audio,
            _mixer: mixer,
            stars,
            bricks_broken: 0,
        })
    }

    fn fire(&mut self, from: Vec2, toward: Vec2) {
        let dir = (toward - from).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let mut body = Body::new(0.0, 0.0, 6.0, 6.0).with_velocity(dir * BULLET_SPEED);
        body.set_center(from);
        self.sch.add_entity(Actor::Bullet(Bullet { body, ttl: BULLET_LIFETIME }));
        play(&mut self.audio, LASER_SFX);
    }
}

impl Game for FollowTheMouse {
    fn tick(&mut self, ctx: &mut HostContext) {
        if is_key_pressed(KeyCode::Escape) {
            ctx.request_stop();
        }

        let mouse = self
            .sch
            .camera()
            .map_or(Vec2::from(mouse_position()), |cam| cam.to_world(mouse_position().into()));

        let mut shot_from = None;
        if let Some(Actor::Player(p)) = self.sch.handler_mut().get_mut(self.player) {
            p.target = mouse;
            if is_mouse_button_pressed(MouseButton::Left) {
                shot_from = Some(p.body.center());
            }
        }
        if let Some(from) = shot_from {
            self.fire(from, mouse);
        }

        self.sch.update();

        let mut listener = BrickBreak { audio: &mut self.audio };
        for death in self.sch.deaths.drain() {
            if death.kind == ObjectKind::Block {
                self.bricks_broken += 1;
                listener.upon_death();
            }
        }

        let alive = self.sch.handler().get(self.player).map_or(false, |p| p.is_alive());
        let mut on_player_death = || {
            log::info!("Ship destroyed");
            ctx.request_stop();
        };
        self.player_watch.check(alive, &mut on_player_death);

        let center = self.sch.handler().get(self.player).map(|p| p.body().center());
        if let (Some(center), Some(cam)) = (center, self.sch.camera_mut()) {
            cam.follow(center);
        }
    }

    fn render(&mut self, ctx: &mut HostContext) {
        clear_background(BLACK);

        if let Some(cam) = self.sch.camera() {
            set_camera(&cam.to_camera2d());
        }
        for star in &self.stars {
            draw_circle(star.x, star.y, 1.0, GRAY);
        }
        self.sch.render();
        set_default_camera();

        let health = self.sch.handler().get(self.player).map_or(0.0, |p| p.body().health);
        draw_text(
            &format!(
                "tick {}  fps {}  hull {:.0}  bricks broken {}",
                ctx.tick_count(),
                ctx.fps(),
                health,
                self.bricks_broken
            ),
            10.0,
            24.0,
            24.0,
            WHITE,
        );
    }

    fn on_stop(&mut self) {
        if let Some(pool) = self.audio.get_mut() {
            pool.stop_all();
        }
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    #[cfg(not(target_arch = "wasm32"))]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Standards v{}", standards::VERSION);

    let config = load_config();
    let mut game = match FollowTheMouse::new(&config) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Failed to start: {}", e);
            return;
        }
    };

    if let Err(e) = standards::game::run(&mut game, config.fps).await {
        log::error!("Game loop failed: {}", e);
    }
}
