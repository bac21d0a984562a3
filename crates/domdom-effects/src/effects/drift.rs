//! Wandering firefly dust.
//!
//! Motes do a slow random walk, scaled by a per-mote depth, and wrap around
//! the viewport edges. The pointer gently repels them. A click plants a
//! vortex well that draws nearby motes in for a few seconds and then bursts,
//! shattering whatever it caught into short-lived fragments; the population
//! is refilled from the edges.

use domdom_core::{InputEvent, InputKind, Viewport, hsl_to_rgb};
use rand::Rng;

use crate::{Effect, EffectContext, InputHub, Surface, SurfaceHandle};

const DENSITY: f32 = 1.0 / 48.0;
const MIN_COUNT: usize = 60;
const MAX_COUNT: usize = 900;
const WALK: f32 = 0.025;
const MAX_SPEED: f32 = 0.6;
const POINTER_RADIUS: f32 = 22.0;
const POINTER_PUSH: f32 = 0.04;
const WELL_LIFE: u32 = 320;
const WELL_RADIUS: f32 = 26.0;
const WELL_PULL: f32 = 0.08;
const FRAGMENT_FADE: f32 = 0.03;

#[derive(Debug, Clone, Copy)]
struct Mote {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    depth: f32,
    hue_shift: f32,
}

impl Mote {
    fn seed(vp: Viewport) -> Self {
        let mut rng = rand::rng();
        Self {
            x: rng.random_range(0.0..vp.width),
            y: rng.random_range(0.0..vp.height),
            vx: rng.random_range(-0.2..0.2),
            vy: rng.random_range(-0.2..0.2),
            depth: rng.random_range(0.3..1.0),
            hue_shift: rng.random_range(-18.0..18.0),
        }
    }

    /// Re-enter from a random viewport edge after a well burst.
    fn seed_at_edge(vp: Viewport) -> Self {
        let mut rng = rand::rng();
        let mut mote = Self::seed(vp);
        match rng.random_range(0..4) {
            0 => mote.x = 0.0,
            1 => mote.x = vp.width,
            2 => mote.y = 0.0,
            _ => mote.y = vp.height,
        }
        mote
    }

    fn step(&mut self, vp: Viewport, pointer: Option<(f32, f32)>, wells: &[Well]) {
        let mut rng = rand::rng();
        self.vx = (self.vx + rng.random_range(-WALK..WALK)).clamp(-MAX_SPEED, MAX_SPEED);
        self.vy = (self.vy + rng.random_range(-WALK..WALK)).clamp(-MAX_SPEED, MAX_SPEED);

        let mut in_well = false;
        for well in wells {
            let dx = well.x - self.x;
            let dy = well.y - self.y;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < WELL_RADIUS && dist > 0.0 {
                let pull = (1.0 - dist / WELL_RADIUS) * WELL_PULL;
                self.vx += dx / dist * pull;
                self.vy += dy / dist * pull;
                in_well = true;
            }
        }

        // The well's grip overrides pointer avoidance.
        if !in_well && let Some((px, py)) = pointer {
            let dx = self.x - px;
            let dy = self.y - py;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < POINTER_RADIUS && dist > 0.0 {
                let push = (POINTER_RADIUS - dist) / POINTER_RADIUS * POINTER_PUSH;
                self.vx += dx / dist * push;
                self.vy += dy / dist * push;
            }
        }

        self.x += self.vx * self.depth;
        self.y += self.vy * self.depth;

        if self.x > vp.width {
            self.x = 0.0;
        } else if self.x < 0.0 {
            self.x = vp.width;
        }
        if self.y > vp.height {
            self.y = 0.0;
        } else if self.y < 0.0 {
            self.y = vp.height;
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Well {
    x: f32,
    y: f32,
    life: u32,
}

#[derive(Debug, Clone, Copy)]
struct Fragment {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    alpha: f32,
    hue_shift: f32,
}

pub struct Drift {
    running: bool,
    surface: SurfaceHandle,
    input: InputHub,
    viewport: Viewport,
    motes: Vec<Mote>,
    wells: Vec<Well>,
    fragments: Vec<Fragment>,
    target_count: usize,
    pointer: Option<(f32, f32)>,
}

impl Drift {
    pub fn new() -> Self {
        Self {
            running: false,
            surface: SurfaceHandle::detached(),
            input: InputHub::default(),
            viewport: Viewport::default(),
            motes: Vec::new(),
            wells: Vec::new(),
            fragments: Vec::new(),
            target_count: 0,
            pointer: None,
        }
    }

    fn populate(&mut self) {
        self.target_count = ((self.viewport.area() * DENSITY) as usize).clamp(MIN_COUNT, MAX_COUNT);
        self.motes = (0..self.target_count)
            .map(|_| Mote::seed(self.viewport))
            .collect();
    }

    /// Shatter every mote caught in the dying well, then refill from the
    /// edges so the population returns to its initial count.
    fn burst_well(&mut self, well: Well) {
        let mut rng = rand::rng();
        let radius2 = WELL_RADIUS * WELL_RADIUS;
        let mut kept = Vec::with_capacity(self.motes.len());
        for mote in self.motes.drain(..) {
            let dx = mote.x - well.x;
            let dy = mote.y - well.y;
            if dx * dx + dy * dy > radius2 {
                kept.push(mote);
                continue;
            }
            for _ in 0..rng.random_range(3..=5) {
                let angle = rng.random_range(0.0..std::f32::consts::TAU);
                let speed = rng.random_range(0.6..1.6);
                self.fragments.push(Fragment {
                    x: mote.x,
                    y: mote.y,
                    vx: angle.cos() * speed,
                    vy: angle.sin() * speed,
                    alpha: 1.0,
                    hue_shift: mote.hue_shift,
                });
            }
        }
        self.motes = kept;
        while self.motes.len() < self.target_count {
            self.motes.push(Mote::seed_at_edge(self.viewport));
        }
    }
}

impl Default for Drift {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Drift {
    fn name(&self) -> &'static str {
        "drift"
    }

    fn icon(&self) -> char {
        '·'
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
        self.motes.clear();
        self.wells.clear();
        self.fragments.clear();
        self.pointer = None;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn on_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved { x, y } => self.pointer = Some((x, y)),
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::Clicked { x, y } => self.wells.push(Well {
                x,
                y,
                life: WELL_LIFE,
            }),
            InputEvent::Resized(vp) => {
                self.viewport = vp;
                self.populate();
                self.wells.clear();
                self.fragments.clear();
            }
        }
    }

    fn tick(&mut self, _now_ms: u64) {
        if !self.running {
            return;
        }
        let vp = self.viewport;
        let pointer = self.pointer;
        let wells = self.wells.clone();
        for mote in &mut self.motes {
            mote.step(vp, pointer, &wells);
        }

        for well in &mut self.wells {
            well.life = well.life.saturating_sub(1);
        }
        let expired: Vec<Well> = self.wells.iter().copied().filter(|w| w.life == 0).collect();
        self.wells.retain(|w| w.life > 0);
        for well in expired {
            self.burst_well(well);
        }

        for frag in &mut self.fragments {
            frag.x += frag.vx;
            frag.y += frag.vy;
            frag.vx *= 0.96;
            frag.vy *= 0.96;
            frag.alpha -= FRAGMENT_FADE;
        }
        self.fragments.retain(|f| f.alpha > 0.0);

        let motes = &self.motes;
        let fragments = &self.fragments;
        let live_wells = &self.wells;
        self.surface.with(|s| {
            s.clear();
            for mote in motes {
                let color = hsl_to_rgb(58.0 + mote.hue_shift, 0.9, 0.6);
                s.point(mote.x, mote.y, color, 0.25 + mote.depth * 0.5);
            }
            for frag in fragments {
                let color = hsl_to_rgb(58.0 + frag.hue_shift, 0.9, 0.7);
                s.point(frag.x, frag.y, color, frag.alpha);
            }
            for well in live_wells {
                let fade = well.life as f32 / WELL_LIFE as f32;
                s.fill_circle(well.x, well.y, 2.0, hsl_to_rgb(190.0, 0.8, 0.6), 0.4 * fade);
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
    fn wraps_to_the_opposite_edge() {
        let vp = Viewport::new(100.0, 50.0);
        let mut mote = Mote {
            x: 99.9,
            y: 25.0,
            vx: MAX_SPEED,
            vy: 0.0,
            depth: 1.0,
            hue_shift: 0.0,
        };
        mote.step(vp, None, &[]);
        assert_eq!(mote.x, 0.0);
    }

    #[test]
    fn random_walk_respects_speed_clamp() {
        let vp = Viewport::new(100.0, 50.0);
        let mut mote = Mote::seed(vp);
        for _ in 0..2_000 {
            mote.step(vp, None, &[]);
            assert!(mote.vx.abs() <= MAX_SPEED);
            assert!(mote.vy.abs() <= MAX_SPEED);
        }
    }

    #[test]
    fn click_plants_a_well_that_expires_and_refills() {
        let ctx = ctx();
        let mut fx = Drift::new();
        fx.start(&ctx);
        let initial = fx.motes.len();

        fx.on_input(&InputEvent::Clicked { x: 60.0, y: 40.0 });
        assert_eq!(fx.wells.len(), 1);
        // Pin one mote onto the well so the burst provably catches it.
        fx.motes[0].x = 60.0;
        fx.motes[0].y = 40.0;
        fx.motes[0].vx = 0.0;
        fx.motes[0].vy = 0.0;

        for t in 0..WELL_LIFE as u64 + 1 {
            fx.tick(t);
        }
        assert!(fx.wells.is_empty());
        assert!(!fx.fragments.is_empty());
        assert_eq!(fx.motes.len(), initial);
    }

    #[test]
    fn fragments_burn_out() {
        let ctx = ctx();
        let mut fx = Drift::new();
        fx.start(&ctx);
        fx.fragments.push(Fragment {
            x: 10.0,
            y: 10.0,
            vx: 1.0,
            vy: 0.0,
            alpha: 1.0,
            hue_shift: 0.0,
        });
        for t in 0..40 {
            fx.tick(t);
        }
        assert!(fx.fragments.is_empty());
    }

    #[test]
    fn stop_discards_all_state() {
        let ctx = ctx();
        let mut fx = Drift::new();
        fx.start(&ctx);
        fx.on_input(&InputEvent::Clicked { x: 10.0, y: 10.0 });
        fx.tick(0);

        fx.stop();
        assert!(fx.motes.is_empty());
        assert!(fx.wells.is_empty());
        assert!(fx.fragments.is_empty());
        assert_eq!(ctx.input.attached_count(), 0);
        assert!(ctx.surface.with(|s| s.is_blank()).unwrap());

        fx.tick(10_000);
        assert!(ctx.surface.with(|s| s.is_blank()).unwrap());
    }

    #[test]
    fn attaches_click_listener() {
        let ctx = ctx();
        let mut fx = Drift::new();
        fx.start(&ctx);
        assert!(ctx.input.wants("drift", InputKind::Click));
    }
}
