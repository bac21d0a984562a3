//! Falling blossom petals.
//!
//! Petals drift down with a sinusoidal sway and slow rotation; most are
//! loose single petals, a few are full five-petal blooms. Population is
//! governed by a feedback controller: interaction raises a target count,
//! idle time decays it back to the floor, and a ramped spawn accumulator
//! closes the deficit from the top edge. Clicking a bloom shatters it.

use std::f32::consts::TAU;

use domdom_core::{InputEvent, InputKind, Viewport, hsl_to_rgb};
use rand::Rng;

use crate::{Effect, EffectContext, InputHub, Surface, SurfaceHandle};

const MIN_COUNT: f32 = 12.0;
const MAX_COUNT: f32 = 90.0;
/// Spawn-rate ramp, petals per second per second.
const RAMP: f32 = 6.0;
/// Idle decay of the target count, petals per second.
const DECAY: f32 = 4.0;
const IDLE_MS: u64 = 1500;
const INTRO_MS: u64 = 3000;
const CLICK_BUMP: f32 = 6.0;
const BLOOM_RATIO: f64 = 0.2;
const SHATTER_RADIUS: f32 = 6.0;
const FALL_SPEED: f32 = 0.25;

#[derive(Debug, Clone, Copy)]
struct Petal {
    x: f32,
    y: f32,
    depth: f32,
    sway_phase: f32,
    sway_amp: f32,
    sway_rate: f32,
    rot: f32,
    rot_rate: f32,
    hue: f32,
    light: f32,
    bloom: bool,
    alpha: f32,
    /// Zero for ordinary petals; shatter fragments fade out.
    fade: f32,
}

impl Petal {
    fn seed(vp: Viewport, at_top: bool) -> Self {
        let mut rng = rand::rng();
        // Weighted palette: pink, coral, white-pink.
        let (hue, light) = match rng.random_range(0..10) {
            0..=4 => (rng.random_range(335.0..350.0), 0.72),
            5..=7 => (rng.random_range(8.0..20.0), 0.68),
            _ => (rng.random_range(345.0..355.0), 0.85),
        };
        Self {
            x: rng.random_range(0.0..vp.width),
            y: if at_top {
                rng.random_range(-4.0..0.0)
            } else {
                rng.random_range(0.0..vp.height)
            },
            depth: rng.random_range(0.4..1.0),
            sway_phase: rng.random_range(0.0..TAU),
            sway_amp: rng.random_range(0.08..0.28),
            sway_rate: rng.random_range(0.02..0.06),
            rot: rng.random_range(0.0..TAU),
            rot_rate: rng.random_range(-0.03..0.03),
            hue,
            light,
            bloom: rng.random_bool(BLOOM_RATIO),
            alpha: 1.0,
            fade: 0.0,
        }
    }

    fn step(&mut self) {
        self.sway_phase += self.sway_rate;
        self.x += self.sway_phase.sin() * self.sway_amp * self.depth;
        self.y += FALL_SPEED * self.depth;
        self.rot += self.rot_rate;
        self.alpha -= self.fade;
    }

    fn off_bottom(&self, vp: Viewport) -> bool {
        self.y > vp.height + 2.0
    }
}

pub struct Petals {
    running: bool,
    surface: SurfaceHandle,
    input: InputHub,
    viewport: Viewport,
    petals: Vec<Petal>,
    target: f32,
    spawn_rate: f32,
    spawn_accum: f32,
    started_ms: Option<u64>,
    last_tick_ms: Option<u64>,
    last_interaction_ms: u64,
}

impl Petals {
    pub fn new() -> Self {
        Self {
            running: false,
            surface: SurfaceHandle::detached(),
            input: InputHub::default(),
            viewport: Viewport::default(),
            petals: Vec::new(),
            target: MIN_COUNT,
            spawn_rate: 0.0,
            spawn_accum: 0.0,
            started_ms: None,
            last_tick_ms: None,
            last_interaction_ms: 0,
        }
    }

    /// Close the gap between the live population and the target count.
    fn control(&mut self, now_ms: u64, dt: f32) {
        if now_ms.saturating_sub(self.last_interaction_ms) >= IDLE_MS {
            self.target = (self.target - DECAY * dt).max(MIN_COUNT);
        }

        let deficit = self.target - self.petals.len() as f32;
        if deficit <= 0.0 {
            self.spawn_rate = 0.0;
            return;
        }
        self.spawn_rate = (self.spawn_rate + RAMP * dt).min(deficit * 0.8);

        let started = self.started_ms.unwrap_or(now_ms);
        let intro = (now_ms.saturating_sub(started) as f32 / INTRO_MS as f32).min(1.0);

        self.spawn_accum += self.spawn_rate * intro * dt;
        while self.spawn_accum >= 1.0 {
            self.spawn_accum -= 1.0;
            self.petals.push(Petal::seed(self.viewport, true));
        }
    }

    /// Blooms near the click burst into loose fast fragments and regrow.
    fn shatter_near(&mut self, cx: f32, cy: f32) {
        let mut fragments = Vec::new();
        let mut rng = rand::rng();
        for petal in &mut self.petals {
            if !petal.bloom {
                continue;
            }
            let dx = petal.x - cx;
            let dy = petal.y - cy;
            if dx * dx + dy * dy > SHATTER_RADIUS * SHATTER_RADIUS {
                continue;
            }
            for _ in 0..rng.random_range(4..=8) {
                let mut frag = Petal::seed(self.viewport, false);
                frag.x = petal.x;
                frag.y = petal.y;
                frag.bloom = false;
                frag.depth = rng.random_range(1.2..2.0);
                frag.sway_amp = rng.random_range(0.4..0.9);
                frag.fade = rng.random_range(0.008..0.02);
                fragments.push(frag);
            }
            // The bloom itself regrows in place with a fresh face.
            petal.rot = rng.random_range(0.0..TAU);
            self.target = (self.target + CLICK_BUMP).min(MAX_COUNT);
        }
        self.petals.extend(fragments);
    }
}

impl Default for Petals {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Petals {
    fn name(&self) -> &'static str {
        "petals"
    }

    fn icon(&self) -> char {
        '❀'
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
        self.target = MIN_COUNT;
        self.petals = (0..MIN_COUNT as usize)
            .map(|_| Petal::seed(viewport, false))
            .collect();
        self.input.attach(
            self.name(),
            &[
                InputKind::PointerMove,
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
        self.petals.clear();
        self.target = MIN_COUNT;
        self.spawn_rate = 0.0;
        self.spawn_accum = 0.0;
        self.started_ms = None;
        self.last_tick_ms = None;
        self.last_interaction_ms = 0;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn on_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved { .. } => {
                self.last_interaction_ms = self.last_tick_ms.unwrap_or(0);
            }
            InputEvent::Clicked { x, y } => {
                self.last_interaction_ms = self.last_tick_ms.unwrap_or(0);
                self.target = (self.target + CLICK_BUMP).min(MAX_COUNT);
                self.shatter_near(x, y);
            }
            InputEvent::Resized(vp) => self.viewport = vp,
            InputEvent::PointerLeft => {}
        }
    }

    fn tick(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        if self.started_ms.is_none() {
            self.started_ms = Some(now_ms);
            self.last_interaction_ms = now_ms;
        }
        let dt = self
            .last_tick_ms
            .map(|t| (now_ms.saturating_sub(t) as f32 / 1000.0).min(0.1))
            .unwrap_or(1.0 / 60.0);
        self.last_tick_ms = Some(now_ms);

        for petal in &mut self.petals {
            petal.step();
        }
        let vp = self.viewport;
        self.petals.retain(|p| !p.off_bottom(vp) && p.alpha > 0.0);

        self.control(now_ms, dt);

        let petals = &self.petals;
        self.surface.with(|s| {
            s.clear();
            for petal in petals {
                let color = hsl_to_rgb(petal.hue, 0.75, petal.light);
                if petal.bloom {
                    s.fill_circle(petal.x, petal.y, 1.4, color, petal.alpha * 0.7);
                    for i in 0..5 {
                        let a = petal.rot + i as f32 / 5.0 * TAU;
                        s.point(
                            petal.x + a.cos() * 1.8,
                            petal.y + a.sin() * 1.8,
                            color,
                            petal.alpha * 0.5,
                        );
                    }
                } else {
                    s.point(petal.x, petal.y, color, petal.alpha * 0.8);
                    s.point(
                        petal.x + petal.rot.cos() * 0.9,
                        petal.y + petal.rot.sin() * 0.9,
                        color,
                        petal.alpha * 0.4,
                    );
                }
            }
        });
    }
}
