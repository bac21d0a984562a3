//! Fireworks.
//!
//! Rockets launch from the bottom center and are aimed so that, under
//! constant gravity, the apex of their arc lands on the target point. At the
//! apex (`vy >= 0`) the rocket detonates into one of nine fixed burst
//! patterns. Clicks always fire first; a pointer-follow shot and a random
//! shot run on their own throttles.

use std::collections::VecDeque;
use std::f32::consts::TAU;

use domdom_core::{InputEvent, InputKind, Viewport, hsl_to_rgb};
use rand::Rng;

use crate::{Effect, EffectContext, InputHub, Surface, SurfaceHandle};

const GRAVITY: f32 = 0.012;
const LAUNCH_JITTER: f32 = 24.0;
const MAX_ROCKETS: usize = 80;
const MAX_SPARKS: usize = 2000;
const FOLLOW_INTERVAL_MS: u64 = 2000;
const RANDOM_INTERVAL_MS: u64 = 900;
const CLICK_SUPPRESS_MS: u64 = 400;
const POINTER_FRESH_MS: u64 = 3000;
const SPLIT_ALPHA: f32 = 0.55;
const SPLIT_RAYS: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pattern {
    Uniform,
    Mono,
    Ring,
    WavyRing,
    Rays,
    Spiral,
    Glow,
    Split,
    Heart,
}

const PATTERNS: [Pattern; 9] = [
    Pattern::Uniform,
    Pattern::Mono,
    Pattern::Ring,
    Pattern::WavyRing,
    Pattern::Rays,
    Pattern::Spiral,
    Pattern::Glow,
    Pattern::Split,
    Pattern::Heart,
];

#[derive(Debug, Clone, Copy)]
struct Rocket {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    /// Cosmetic horizontal wobble, small enough not to move the apex.
    curve: f32,
    hue: f32,
}

impl Rocket {
    /// Aim so the ballistic apex lands on `(tx, ty)`.
    ///
    /// `vy0 = -sqrt(2 g dy)` puts the vertical turnaround at the target
    /// height; the time to reach it is `-vy0 / g`, which fixes `vx`.
    fn launch(vp: Viewport, tx: f32, ty: f32) -> Self {
        let mut rng = rand::rng();
        let x = vp.width / 2.0 + rng.random_range(-LAUNCH_JITTER..LAUNCH_JITTER);
        let y = vp.height;
        let dy = (y - ty).max(1.0);
        let vy = -(2.0 * GRAVITY * dy).sqrt();
        let time_to_apex = -vy / GRAVITY;
        Self {
            x,
            y,
            vx: (tx - x) / time_to_apex,
            vy,
            curve: rng.random_range(-0.002..0.002),
            hue: rng.random_range(0.0..360.0),
        }
    }

    /// One frame of flight. Returns true at the apex.
    fn step(&mut self) -> bool {
        self.vx += self.curve;
        self.x += self.vx;
        self.y += self.vy;
        self.vy += GRAVITY;
        self.vy >= 0.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Spark {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    alpha: f32,
    decay: f32,
    hue: f32,
    size: f32,
    /// Set on secondary-split sparks that have not burst yet.
    split_armed: bool,
}

impl Spark {
    fn step(&mut self) {
        self.vy += GRAVITY;
        self.x += self.vx;
        self.y += self.vy;
        self.alpha -= self.decay;
    }
}

fn push_spark(out: &mut Vec<Spark>, spark: Spark) {
    if out.len() < MAX_SPARKS {
        out.push(spark);
    }
}

fn radial(out: &mut Vec<Spark>, x: f32, y: f32, angle: f32, speed: f32, hue: f32, decay: f32) {
    push_spark(
        out,
        Spark {
            x,
            y,
            vx: angle.cos() * speed,
            vy: angle.sin() * speed,
            alpha: 1.0,
            decay,
            hue,
            size: 0.0,
            split_armed: false,
        },
    );
}

/// Emit one burst pattern at `(x, y)`. Counts are fixed per pattern.
fn explode(pattern: Pattern, x: f32, y: f32, hue: f32, out: &mut Vec<Spark>) {
    let mut rng = rand::rng();
    match pattern {
        Pattern::Uniform => {
            for _ in 0..100 {
                let angle = rng.random_range(0.0..TAU);
                let speed = rng.random_range(0.2..1.4);
                let h = hue + rng.random_range(-30.0..30.0);
                radial(out, x, y, angle, speed, h, rng.random_range(0.008..0.02));
            }
        }
        Pattern::Mono => {
            for _ in 0..120 {
                let angle = rng.random_range(0.0..TAU);
                let speed = rng.random_range(0.15..1.2);
                radial(out, x, y, angle, speed, hue, rng.random_range(0.008..0.018));
            }
        }
        Pattern::Ring => {
            for i in 0..100 {
                let angle = i as f32 / 100.0 * TAU;
                radial(out, x, y, angle, 1.0, hue, 0.012);
            }
        }
        Pattern::WavyRing => {
            for i in 0..120 {
                let angle = i as f32 / 120.0 * TAU;
                let speed = 0.9 + (angle * 6.0).sin() * 0.3;
                radial(out, x, y, angle, speed, hue, 0.012);
            }
        }
        Pattern::Rays => {
            for arm in 0..6 {
                let base = arm as f32 / 6.0 * TAU;
                for i in 0..30 {
                    let angle = base + rng.random_range(-0.04..0.04);
                    let speed = 0.2 + i as f32 / 30.0 * 1.4;
                    radial(out, x, y, angle, speed, hue, rng.random_range(0.01..0.02));
                }
            }
        }
        Pattern::Spiral => {
            for i in 0..150 {
                let angle = i as f32 * 0.35;
                let speed = 0.3 + i as f32 / 150.0 * 1.2;
                radial(out, x, y, angle, speed, hue, 0.01);
            }
        }
        Pattern::Glow => {
            for _ in 0..140 {
                let angle = rng.random_range(0.0..TAU);
                let speed = rng.random_range(0.1..0.5);
                push_spark(
                    out,
                    Spark {
                        x,
                        y,
                        vx: angle.cos() * speed,
                        vy: angle.sin() * speed,
                        alpha: 1.0,
                        decay: rng.random_range(0.006..0.01),
                        hue,
                        size: 1.2,
                        split_armed: false,
                    },
                );
            }
        }
        Pattern::Split => {
            for _ in 0..60 {
                let angle = rng.random_range(0.0..TAU);
                let speed = rng.random_range(0.3..1.0);
                push_spark(
                    out,
                    Spark {
                        x,
                        y,
                        vx: angle.cos() * speed,
                        vy: angle.sin() * speed,
                        alpha: 1.0,
                        decay: rng.random_range(0.008..0.014),
                        hue,
                        size: 0.0,
                        split_armed: true,
                    },
                );
            }
        }
        Pattern::Heart => {
            for i in 0..100 {
                let t = i as f32 / 100.0 * TAU;
                // Classic parametric heart, scaled to unit speed and flipped
                // for screen coordinates.
                let hx = 16.0 * t.sin().powi(3);
                let hy = -(13.0 * t.cos()
                    - 5.0 * (2.0 * t).cos()
                    - 2.0 * (3.0 * t).cos()
                    - (4.0 * t).cos());
                push_spark(
                    out,
                    Spark {
                        x,
                        y,
                        vx: hx * 0.06,
                        vy: hy * 0.06,
                        alpha: 1.0,
                        decay: 0.01,
                        hue,
                        size: 0.0,
                        split_armed: false,
                    },
                );
            }
        }
    }
}

pub struct Fireworks {
    running: bool,
    surface: SurfaceHandle,
    input: InputHub,
    viewport: Viewport,
    rockets: Vec<Rocket>,
    sparks: Vec<Spark>,
    pending_clicks: VecDeque<(f32, f32)>,
    pointer: Option<(f32, f32)>,
    /// Pointer moved since the last tick; stamped with the frame clock there.
    pointer_dirty: bool,
    pointer_moved_ms: Option<u64>,
    last_click_ms: Option<u64>,
    next_follow_ms: Option<u64>,
    next_random_ms: Option<u64>,
}

impl Fireworks {
    pub fn new() -> Self {
        Self {
            running: false,
            surface: SurfaceHandle::detached(),
            input: InputHub::default(),
            viewport: Viewport::default(),
            rockets: Vec::new(),
            sparks: Vec::new(),
            pending_clicks: VecDeque::new(),
            pointer: None,
            pointer_dirty: false,
            pointer_moved_ms: None,
            last_click_ms: None,
            next_follow_ms: None,
            next_random_ms: None,
        }
    }

    fn spawn_toward(&mut self, tx: f32, ty: f32) {
        if self.rockets.len() < MAX_ROCKETS {
            self.rockets.push(Rocket::launch(self.viewport, tx, ty));
        }
    }

    fn spawn_random(&mut self) {
        let mut rng = rand::rng();
        let tx = rng.random_range(self.viewport.width * 0.2..self.viewport.width * 0.8);
        let ty = rng.random_range(self.viewport.height * 0.15..self.viewport.height * 0.55);
        self.spawn_toward(tx, ty);
    }

    /// Run the spawn schedule. Click shots drain first, then the throttled
    /// pointer-follow and random shots.
    fn spawn_due(&mut self, now_ms: u64) {
        while let Some((x, y)) = self.pending_clicks.pop_front() {
            self.spawn_toward(x, y);
        }

        match self.next_follow_ms {
            None => self.next_follow_ms = Some(now_ms + FOLLOW_INTERVAL_MS),
            Some(deadline) if now_ms >= deadline => {
                let pointer_fresh = self
                    .pointer_moved_ms
                    .is_some_and(|t| now_ms.saturating_sub(t) <= POINTER_FRESH_MS);
                if pointer_fresh && let Some((px, py)) = self.pointer {
                    self.spawn_toward(px, py);
                }
                self.next_follow_ms = Some(now_ms + FOLLOW_INTERVAL_MS);
            }
            Some(_) => {}
        }

        match self.next_random_ms {
            None => self.next_random_ms = Some(now_ms + RANDOM_INTERVAL_MS),
            Some(deadline) if now_ms >= deadline => {
                let click_spam = self
                    .last_click_ms
                    .is_some_and(|t| now_ms.saturating_sub(t) <= CLICK_SUPPRESS_MS);
                if !click_spam {
                    self.spawn_random();
                }
                self.next_random_ms = Some(now_ms + RANDOM_INTERVAL_MS);
            }
            Some(_) => {}
        }
    }
}

impl Default for Fireworks {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Fireworks {
    fn name(&self) -> &'static str {
        "fireworks"
    }

    fn icon(&self) -> char {
        '✸'
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
        self.input.attach(
            self.name(),
            &[
                InputKind::PointerMove,
                InputKind::PointerLeave,
                InputKind::Click,
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
        self.rockets.clear();
        self.sparks.clear();
        self.pending_clicks.clear();
        self.pointer = None;
        self.pointer_dirty = false;
        self.pointer_moved_ms = None;
        self.last_click_ms = None;
        self.next_follow_ms = None;
        self.next_random_ms = None;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn on_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved { x, y } => {
                self.pointer = Some((x, y));
                self.pointer_dirty = true;
            }
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::Clicked { x, y } => {
                self.pending_clicks.push_back((x, y));
            }
            InputEvent::Resized(vp) => self.viewport = vp,
        }
    }

    fn tick(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        // Stamp input recency with the frame clock.
        if self.pointer_dirty {
            self.pointer_dirty = false;
            self.pointer_moved_ms = Some(now_ms);
        }
        if !self.pending_clicks.is_empty() {
            self.last_click_ms = Some(now_ms);
        }

        self.spawn_due(now_ms);

        let mut bursts = Vec::new();
        self.rockets.retain_mut(|rocket| {
            if rocket.step() {
                bursts.push((rocket.x, rocket.y, rocket.hue));
                false
            } else {
                true
            }
        });
        for (x, y, hue) in bursts {
            let pattern = PATTERNS[rand::rng().random_range(0..PATTERNS.len())];
            explode(pattern, x, y, hue, &mut self.sparks);
        }

        let mut splits = Vec::new();
        for spark in &mut self.sparks {
            spark.step();
            if spark.split_armed && spark.alpha < SPLIT_ALPHA {
                spark.split_armed = false;
                splits.push((spark.x, spark.y, spark.hue));
            }
        }
        for (x, y, hue) in splits {
            let mut rng = rand::rng();
            for i in 0..SPLIT_RAYS {
                let angle = i as f32 / SPLIT_RAYS as f32 * TAU;
                radial(
                    &mut self.sparks,
                    x,
                    y,
                    angle,
                    rng.random_range(0.4..0.8),
                    hue,
                    0.015,
                );
            }
        }
        self.sparks.retain(|s| s.alpha > 0.0);

        let rockets = &self.rockets;
        let sparks = &self.sparks;
        self.surface.with(|s| {
            s.fade(0.82);
            for rocket in rockets {
                s.point(rocket.x, rocket.y, hsl_to_rgb(rocket.hue, 0.4, 0.85), 0.9);
            }
            for spark in sparks {
                let color = hsl_to_rgb(spark.hue, 1.0, 0.6);
                if spark.size > 0.0 {
                    s.fill_circle(spark.x, spark.y, spark.size, color, spark.alpha * 0.6);
                } else {
                    s.point(spark.x, spark.y, color, spark.alpha);
                }
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

    fn fly_to_apex(mut rocket: Rocket) -> (f32, f32) {
        for _ in 0..10_000 {
            if rocket.step() {
                return (rocket.x, rocket.y);
            }
        }
        panic!("rocket never reached apex");
    }

    #[test]
    fn apex_lands_on_target_height_regardless_of_dx() {
        let vp = Viewport::new(200.0, 100.0);
        for tx in [20.0, 100.0, 190.0] {
            let rocket = Rocket {
                curve: 0.0,
                ..Rocket::launch(vp, tx, 30.0)
            };
            let (_, apex_y) = fly_to_apex(rocket);
            assert!(
                (apex_y - 30.0).abs() < 1.0,
                "apex {apex_y} off target for tx={tx}"
            );
        }
    }

    #[test]
    fn ring_count_is_exact_and_sparks_start_full() {
        let mut sparks = Vec::new();
        explode(Pattern::Ring, 50.0, 50.0, 120.0, &mut sparks);
        assert_eq!(sparks.len(), 100);
        assert!(sparks.iter().all(|s| s.alpha == 1.0 && s.decay > 0.0));
    }

    #[test]
    fn pattern_counts_match_their_shapes() {
        for (pattern, count) in [
            (Pattern::Uniform, 100),
            (Pattern::Mono, 120),
            (Pattern::WavyRing, 120),
            (Pattern::Rays, 180),
            (Pattern::Spiral, 150),
            (Pattern::Glow, 140),
            (Pattern::Split, 60),
            (Pattern::Heart, 100),
        ] {
            let mut sparks = Vec::new();
            explode(pattern, 50.0, 50.0, 0.0, &mut sparks);
            assert_eq!(sparks.len(), count, "{pattern:?}");
        }
    }

    #[test]
    fn sparks_decay_monotonically_until_removed() {
        let mut spark = Spark {
            x: 0.0,
            y: 0.0,
            vx: 0.1,
            vy: 0.0,
            alpha: 1.0,
            decay: 0.02,
            hue: 0.0,
            size: 0.0,
            split_armed: false,
        };
        let mut prev = spark.alpha;
        while spark.alpha > 0.0 {
            spark.step();
            assert!(spark.alpha < prev);
            prev = spark.alpha;
        }
    }

    #[test]
    fn spark_cap_drops_excess() {
        let mut sparks = Vec::new();
        while sparks.len() < MAX_SPARKS {
            explode(Pattern::Ring, 10.0, 10.0, 0.0, &mut sparks);
        }
        explode(Pattern::Mono, 10.0, 10.0, 0.0, &mut sparks);
        assert_eq!(sparks.len(), MAX_SPARKS);
    }

    #[test]
    fn clicks_fire_before_throttled_shots() {
        let ctx = ctx();
        let mut fx = Fireworks::new();
        fx.start(&ctx);
        fx.on_input(&InputEvent::Clicked { x: 40.0, y: 20.0 });
        fx.on_input(&InputEvent::Clicked { x: 70.0, y: 25.0 });
        fx.tick(0);
        assert_eq!(fx.rockets.len(), 2);
        assert!(fx.pending_clicks.is_empty());
    }

    #[test]
    fn random_shot_is_suppressed_right_after_a_click() {
        let ctx = ctx();
        let mut fx = Fireworks::new();
        fx.start(&ctx);
        fx.tick(0); // arms the throttles
        fx.on_input(&InputEvent::Clicked { x: 40.0, y: 20.0 });
        fx.tick(RANDOM_INTERVAL_MS); // click rocket fires, random suppressed
        assert_eq!(fx.rockets.len(), 1);
    }

    #[test]
    fn stop_discards_rockets_sparks_and_timers() {
        let ctx = ctx();
        let mut fx = Fireworks::new();
        fx.start(&ctx);
        fx.on_input(&InputEvent::Clicked { x: 40.0, y: 20.0 });
        fx.tick(0);
        fx.tick(16);
        assert!(!ctx.surface.with(|s| s.is_blank()).unwrap());

        fx.stop();
        assert!(fx.rockets.is_empty());
        assert!(fx.sparks.is_empty());
        assert_eq!(fx.next_follow_ms, None);
        assert_eq!(fx.next_random_ms, None);
        assert_eq!(ctx.input.attached_count(), 0);
        assert!(ctx.surface.with(|s| s.is_blank()).unwrap());

        fx.tick(50_000);
        assert!(ctx.surface.with(|s| s.is_blank()).unwrap());
    }
}
