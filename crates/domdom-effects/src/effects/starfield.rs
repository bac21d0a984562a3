//! 3D parallax starfield.
//!
//! Stars live in three depth layers. Each carries a pseudo-depth `z` that
//! shrinks every frame; perspective projection pulls the star outward from
//! the center as it approaches, and at `z <= 0` it is re-seeded at the far
//! plane. The pointer's offset from center adds a per-layer parallax drift.
//! Shooting stars streak through on a randomized timer.

use domdom_core::{InputEvent, InputKind, Rgb, Viewport};
use rand::Rng;

use crate::{Effect, EffectContext, InputHub, Surface, SurfaceHandle};

/// Per-layer tuning: spawn density divisor, depth speed, dot size, parallax.
struct Layer {
    divisor: f32,
    min: usize,
    max: usize,
    speed: f32,
    size: f32,
    parallax: f32,
}

const LAYERS: [Layer; 3] = [
    Layer {
        divisor: 120.0,
        min: 30,
        max: 120,
        speed: 0.05,
        size: 0.4,
        parallax: 0.01,
    },
    Layer {
        divisor: 240.0,
        min: 18,
        max: 70,
        speed: 0.12,
        size: 0.7,
        parallax: 0.03,
    },
    Layer {
        divisor: 480.0,
        min: 8,
        max: 35,
        speed: 0.25,
        size: 1.1,
        parallax: 0.06,
    },
];

const TWINKLE_FLOOR: f32 = 0.2;
const SHOOTING_FADE: f32 = 0.02;
const RESPAWN_MIN_MS: u64 = 3000;
const RESPAWN_MAX_MS: u64 = 7000;

#[derive(Debug, Clone, Copy)]
struct Star {
    x: f32,
    y: f32,
    z: f32,
    alpha: f32,
    twinkle: f32,
    layer: usize,
}

impl Star {
    fn seed(vp: Viewport, layer: usize) -> Self {
        let mut rng = rand::rng();
        Self {
            x: rng.random_range(0.0..vp.width),
            y: rng.random_range(0.0..vp.height),
            z: rng.random_range(1.0..vp.width.max(2.0)),
            alpha: rng.random_range(TWINKLE_FLOOR..1.0),
            twinkle: rng.random_range(0.005..0.02),
            layer,
        }
    }

    fn step(&mut self, vp: Viewport) {
        self.z -= LAYERS[self.layer].speed;
        if self.z <= 0.0 {
            let mut rng = rand::rng();
            self.x = rng.random_range(0.0..vp.width);
            self.y = rng.random_range(0.0..vp.height);
            self.z = vp.width;
        }
        // Ping-pong the twinkle between the floor and full brightness.
        self.alpha += self.twinkle;
        if self.alpha >= 1.0 || self.alpha <= TWINKLE_FLOOR {
            self.alpha = self.alpha.clamp(TWINKLE_FLOOR, 1.0);
            self.twinkle = -self.twinkle;
        }
    }

    /// Perspective projection toward the viewport center.
    fn project(&self, vp: Viewport) -> (f32, f32) {
        let (cx, cy) = vp.center();
        let k = vp.width / 2.0 / self.z.max(0.1);
        ((self.x - cx) * k + cx, (self.y - cy) * k + cy)
    }
}

#[derive(Debug, Clone, Copy)]
struct ShootingStar {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    alpha: f32,
}

impl ShootingStar {
    fn spawn(vp: Viewport) -> Self {
        let mut rng = rand::rng();
        let vx = rng.random_range(1.2..2.4);
        Self {
            x: rng.random_range(0.0..vp.width * 0.7),
            y: rng.random_range(0.0..vp.height * 0.4),
            vx,
            vy: vx / 3.0,
            alpha: 1.0,
        }
    }
}

pub struct Starfield {
    running: bool,
    surface: SurfaceHandle,
    input: InputHub,
    viewport: Viewport,
    stars: Vec<Star>,
    shooting: Vec<ShootingStar>,
    /// Deadline for the next shooting-star spawn; cleared on stop.
    next_shot_ms: Option<u64>,
    pointer: Option<(f32, f32)>,
}

impl Starfield {
    pub fn new() -> Self {
        Self {
            running: false,
            surface: SurfaceHandle::detached(),
            input: InputHub::default(),
            viewport: Viewport::default(),
            stars: Vec::new(),
            shooting: Vec::new(),
            next_shot_ms: None,
            pointer: None,
        }
    }

    fn populate(&mut self) {
        self.stars.clear();
        for (idx, layer) in LAYERS.iter().enumerate() {
            let count =
                ((self.viewport.area() / layer.divisor) as usize).clamp(layer.min, layer.max);
            self.stars
                .extend((0..count).map(|_| Star::seed(self.viewport, idx)));
        }
    }

    fn arm_shot_timer(&mut self, now_ms: u64) {
        let delay = rand::rng().random_range(RESPAWN_MIN_MS..=RESPAWN_MAX_MS);
        self.next_shot_ms = Some(now_ms + delay);
    }
}

impl Default for Starfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Starfield {
    fn name(&self) -> &'static str {
        "starfield"
    }

    fn icon(&self) -> char {
        '✦'
    }

    fn start(&mut self, ctx: &EffectContext) {
        if self.running {
            return;
        }
        let Some(viewport) = ctx.surface.viewport() else {
            return;
        };
        self.surface = ctx.surface.clone();
        self.input = ctx.input.clone();
        self.viewport = viewport;
        self.populate();
        self.input.attach(
            self.name(),
            &[
                InputKind::PointerMove,
                InputKind::PointerLeave,
                InputKind::Resize,
            ],
        );
        self.running = true;
    }

    fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.input.detach(self.name());
        self.surface.with(Surface::clear);
        self.stars.clear();
        self.shooting.clear();
        self.next_shot_ms = None;
        self.pointer = None;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn on_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved { x, y } => self.pointer = Some((x, y)),
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::Resized(vp) => {
                self.viewport = vp;
                self.populate();
            }
            InputEvent::Clicked { .. } => {}
        }
    }

    fn tick(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        let vp = self.viewport;
        for star in &mut self.stars {
            star.step(vp);
        }

        match self.next_shot_ms {
            None => self.arm_shot_timer(now_ms),
            Some(deadline) if now_ms >= deadline => {
                self.shooting.push(ShootingStar::spawn(vp));
                self.arm_shot_timer(now_ms);
            }
            Some(_) => {}
        }
        for shot in &mut self.shooting {
            shot.x += shot.vx;
            shot.y += shot.vy;
            shot.alpha -= SHOOTING_FADE;
        }
        self.shooting.retain(|s| s.alpha > 0.0);

        let (cx, cy) = vp.center();
        let drift = self
            .pointer
            .map(|(px, py)| (px - cx, py - cy))
            .unwrap_or((0.0, 0.0));

        let stars = &self.stars;
        let shooting = &self.shooting;
        self.surface.with(|s| {
            s.clear();
            let white = Rgb::new(235, 240, 255);
            for star in stars {
                let layer = &LAYERS[star.layer];
                let (mut x, mut y) = star.project(vp);
                x += drift.0 * layer.parallax;
                y += drift.1 * layer.parallax;
                s.fill_circle(x, y, layer.size, white, star.alpha);
            }
            let warm = Rgb::new(255, 240, 200);
            for shot in shooting {
                let tail = 8.0;
                s.line(
                    shot.x,
                    shot.y,
                    shot.x - shot.vx * tail,
                    shot.y - shot.vy * tail,
                    warm,
                    shot.alpha * 0.6,
                );
                s.point(shot.x, shot.y, warm, shot.alpha);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> EffectContext {
        EffectContext::new(SurfaceHandle::sized(120, 40), InputHub::new())
    }

    #[test]
    fn depleted_depth_reseeds_at_far_plane() {
        let vp = Viewport::new(100.0, 50.0);
        let mut star = Star {
            x: 10.0,
            y: 10.0,
            z: 0.01,
            alpha: 0.5,
            twinkle: 0.01,
            layer: 2,
        };
        star.step(vp);
        assert_eq!(star.z, vp.width);
        assert!(star.x >= 0.0 && star.x < vp.width);
    }

    #[test]
    fn twinkle_ping_pongs_within_bounds() {
        let vp = Viewport::new(100.0, 50.0);
        let mut star = Star {
            x: 10.0,
            y: 10.0,
            z: 50.0,
            alpha: 0.99,
            twinkle: 0.02,
            layer: 0,
        };
        for _ in 0..500 {
            star.step(vp);
            assert!(star.alpha >= TWINKLE_FLOOR && star.alpha <= 1.0);
        }
    }

    #[test]
    fn projection_is_identity_at_half_width_depth() {
        let vp = Viewport::new(100.0, 50.0);
        let star = Star {
            x: 70.0,
            y: 20.0,
            z: 50.0,
            alpha: 1.0,
            twinkle: 0.01,
            layer: 0,
        };
        let (x, y) = star.project(vp);
        assert!((x - 70.0).abs() < 1e-4);
        assert!((y - 20.0).abs() < 1e-4);
    }

    #[test]
    fn shooting_star_fades_and_is_removed() {
        let ctx = ctx();
        let mut fx = Starfield::new();
        fx.start(&ctx);
        // Force a due spawn timer, then let the streak burn out.
        fx.next_shot_ms = Some(0);
        fx.tick(10);
        assert_eq!(fx.shooting.len(), 1);
        assert!(fx.shooting[0].alpha <= 1.0);

        fx.next_shot_ms = Some(u64::MAX);
        for t in 0..60 {
            fx.tick(20 + t);
        }
        assert!(fx.shooting.is_empty());
    }

    #[test]
    fn stop_discards_stars_and_timer() {
        let ctx = ctx();
        let mut fx = Starfield::new();
        fx.start(&ctx);
        fx.tick(0);
        assert!(!fx.stars.is_empty());
        assert!(fx.next_shot_ms.is_some());

        fx.stop();
        assert!(fx.stars.is_empty());
        assert_eq!(fx.next_shot_ms, None);
        assert_eq!(ctx.input.attached_count(), 0);
        assert!(ctx.surface.with(|s| s.is_blank()).unwrap());

        fx.tick(99_999);
        assert!(ctx.surface.with(|s| s.is_blank()).unwrap());
    }
}
