//! Gravity-well particle field.
//!
//! The same connected field as `network`, but the pointer is a well:
//! particles inside the pull radius are drawn in, and inside the capture
//! radius they are absorbed into a glowing core that grows with the square
//! root of its load. A click, or the core reaching its capacity, bursts the
//! core; captured particles are flung back out on staggered deadlines with
//! a re-capture immunity, decelerating back to their cruising speed.

use std::f32::consts::TAU;

use domdom_core::{InputEvent, InputKind, Viewport, hsl_to_rgb};
use rand::Rng;

use super::cycle_hue;
use crate::{Effect, EffectContext, InputHub, Surface, SurfaceHandle};

const DENSITY: f32 = 1.0 / 160.0;
const MIN_COUNT: usize = 40;
const MAX_COUNT: usize = 190;
const PULL_RADIUS: f32 = 24.0;
const CAPTURE_RADIUS: f32 = 4.0;
const BURST_THRESHOLD: usize = 80;
const RELEASE_WINDOW_MS: u64 = 800;
const IMMUNE_MS: u64 = 5000;
const LEAVE_IMMUNE_MS: u64 = 1500;
const COOLDOWN_MS: u64 = 1200;
const DECEL: f32 = 0.986;
const RELEASE_SPEED_MIN: f32 = 1.4;
const RELEASE_SPEED_MAX: f32 = 2.4;
const LINK_ALPHA: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    Free,
    /// Pinned to the pointer, folded into the core.
    Captured,
    /// Burst triggered; still pinned until the staggered deadline.
    Pending { release_at_ms: u64 },
    /// Flying back out, immune to re-capture.
    Released { immune_until_ms: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    base_speed: f32,
    state: State,
}

impl Particle {
    fn seed(vp: Viewport) -> Self {
        let mut rng = rand::rng();
        let vx = rng.random_range(-0.175..0.175);
        let vy = rng.random_range(-0.175..0.175);
        Self {
            x: rng.random_range(0.0..vp.width),
            y: rng.random_range(0.0..vp.height),
            vx,
            vy,
            base_speed: (vx * vx + vy * vy).sqrt().max(0.05),
            state: State::Free,
        }
    }

    fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }

    fn integrate_and_bounce(&mut self, vp: Viewport) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x <= 0.0 || self.x >= vp.width {
            self.vx = -self.vx;
            self.x = self.x.clamp(0.0, vp.width);
        }
        if self.y <= 0.0 || self.y >= vp.height {
            self.vy = -self.vy;
            self.y = self.y.clamp(0.0, vp.height);
        }
    }
}

pub struct Singularity {
    running: bool,
    surface: SurfaceHandle,
    input: InputHub,
    viewport: Viewport,
    particles: Vec<Particle>,
    pointer: Option<(f32, f32)>,
    burst_requested: bool,
    cooldown_until_ms: u64,
}

impl Singularity {
    pub fn new() -> Self {
        Self {
            running: false,
            surface: SurfaceHandle::detached(),
            input: InputHub::default(),
            viewport: Viewport::default(),
            particles: Vec::new(),
            pointer: None,
            burst_requested: false,
            cooldown_until_ms: 0,
        }
    }

    fn populate(&mut self) {
        let count = ((self.viewport.area() * DENSITY) as usize).clamp(MIN_COUNT, MAX_COUNT);
        self.particles = (0..count).map(|_| Particle::seed(self.viewport)).collect();
    }

    fn captured_count(&self) -> usize {
        self.particles
            .iter()
            .filter(|p| matches!(p.state, State::Captured | State::Pending { .. }))
            .count()
    }

    /// Stagger every captured particle onto a release deadline.
    fn trigger_burst(&mut self, now_ms: u64) {
        let mut rng = rand::rng();
        for particle in &mut self.particles {
            if particle.state == State::Captured {
                particle.state = State::Pending {
                    release_at_ms: now_ms + rng.random_range(0..=RELEASE_WINDOW_MS),
                };
            }
        }
        self.cooldown_until_ms = now_ms + COOLDOWN_MS;
    }

    fn release(particle: &mut Particle, immune_until_ms: u64) {
        let mut rng = rand::rng();
        let angle = rng.random_range(0.0..TAU);
        let speed = rng.random_range(RELEASE_SPEED_MIN..RELEASE_SPEED_MAX);
        particle.vx = angle.cos() * speed;
        particle.vy = angle.sin() * speed;
        particle.state = State::Released { immune_until_ms };
    }

    fn link_distance(&self) -> f32 {
        if self.viewport.is_narrow() { 14.0 } else { 22.0 }
    }
}

impl Default for Singularity {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Singularity {
    fn name(&self) -> &'static str {
        "singularity"
    }

    fn icon(&self) -> char {
        '◉'
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
        self.particles.clear();
        self.pointer = None;
        self.burst_requested = false;
        self.cooldown_until_ms = 0;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn on_input(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::PointerMoved { x, y } => self.pointer = Some((x, y)),
            InputEvent::PointerLeft => self.pointer = None,
            InputEvent::Clicked { x, y } => {
                self.pointer = Some((x, y));
                self.burst_requested = true;
            }
            InputEvent::Resized(vp) => {
                self.viewport = vp;
                self.populate();
            }
        }
    }

    fn tick(&mut self, now_ms: u64) {
        if !self.running {
            return;
        }
        let vp = self.viewport;
        let pointer = self.pointer;

        // The well vanished with the pointer; let the core go gently.
        if pointer.is_none() {
            for particle in &mut self.particles {
                if matches!(particle.state, State::Captured | State::Pending { .. }) {
                    Self::release(particle, now_ms + LEAVE_IMMUNE_MS);
                }
            }
        }

        let burst_due = self.burst_requested || self.captured_count() >= BURST_THRESHOLD;
        self.burst_requested = false;
        if burst_due && now_ms >= self.cooldown_until_ms && pointer.is_some() {
            self.trigger_burst(now_ms);
        }

        for particle in &mut self.particles {
            match particle.state {
                State::Free => {
                    if let Some((px, py)) = pointer {
                        let dx = px - particle.x;
                        let dy = py - particle.y;
                        let dist = (dx * dx + dy * dy).sqrt();
                        if dist < CAPTURE_RADIUS {
                            particle.state = State::Captured;
                            particle.x = px;
                            particle.y = py;
                            continue;
                        }
                        if dist < PULL_RADIUS && dist > 0.0 {
                            let pull = 1.0 - dist / PULL_RADIUS;
                            let force = 0.001 + pull * pull * pull * 0.009;
                            particle.vx += dx * force;
                            particle.vy += dy * force;
                        }
                    }
                    particle.integrate_and_bounce(vp);
                }
                State::Captured => {
                    if let Some((px, py)) = pointer {
                        particle.x = px;
                        particle.y = py;
                    }
                }
                State::Pending { release_at_ms } => {
                    if let Some((px, py)) = pointer {
                        particle.x = px;
                        particle.y = py;
                    }
                    if now_ms >= release_at_ms {
                        Self::release(particle, now_ms + IMMUNE_MS);
                    }
                }
                State::Released { immune_until_ms } => {
                    if particle.speed() > particle.base_speed {
                        particle.vx *= DECEL;
                        particle.vy *= DECEL;
                    } else if now_ms >= immune_until_ms {
                        particle.state = State::Free;
                    }
                    particle.integrate_and_bounce(vp);
                }
            }
        }

        let hue = cycle_hue(now_ms, 50);
        let color = hsl_to_rgb(hue, 0.8, 0.7);
        let max_link = self.link_distance();
        let core_load = self.captured_count();
        let particles = &self.particles;
        self.surface.with(|s| {
            s.clear();
            let loose: Vec<&Particle> = particles
                .iter()
                .filter(|p| !matches!(p.state, State::Captured | State::Pending { .. }))
                .collect();
            for p in &loose {
                s.point(p.x, p.y, color, 0.6);
            }
            for (i, a) in loose.iter().enumerate() {
                for b in &loose[i + 1..] {
                    let dx = a.x - b.x;
                    let dy = a.y - b.y;
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist < max_link {
                        s.line(a.x, a.y, b.x, b.y, color, (1.0 - dist / max_link) * LINK_ALPHA);
                    }
                }
            }
            if let Some((px, py)) = pointer
                && core_load > 0
            {
                let radius = 1.2 + (core_load as f32).sqrt() * 0.4;
                s.fill_circle(px, py, radius, hsl_to_rgb(hue, 0.9, 0.75), 0.9);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Large enough that the population (area / 160) exceeds the burst
    // threshold.
    fn ctx() -> EffectContext {
        EffectContext::new(SurfaceHandle::sized(200, 60), InputHub::new())
    }

    fn started() -> (EffectContext, Singularity) {
        let ctx = ctx();
        let mut fx = Singularity::new();
        fx.start(&ctx);
        (ctx, fx)
    }

    #[test]
    fn close_particles_are_captured_and_pinned() {
        let (_ctx, mut fx) = started();
        fx.on_input(&InputEvent::PointerMoved { x: 60.0, y: 40.0 });
        fx.particles[0].x = 61.0;
        fx.particles[0].y = 40.0;
        fx.tick(0);
        assert_eq!(fx.particles[0].state, State::Captured);
        assert_eq!((fx.particles[0].x, fx.particles[0].y), (60.0, 40.0));
    }

    #[test]
    fn reaching_capacity_bursts_the_core() {
        let (_ctx, mut fx) = started();
        fx.on_input(&InputEvent::PointerMoved { x: 60.0, y: 40.0 });
        for particle in fx.particles.iter_mut().take(BURST_THRESHOLD) {
            particle.state = State::Captured;
        }
        fx.tick(1000);
        let pending = fx
            .particles
            .iter()
            .filter(|p| matches!(p.state, State::Pending { .. }))
            .count();
        let released = fx
            .particles
            .iter()
            .filter(|p| matches!(p.state, State::Released { .. }))
            .count();
        assert_eq!(pending + released, BURST_THRESHOLD);
        assert_eq!(fx.cooldown_until_ms, 1000 + COOLDOWN_MS);
    }

    #[test]
    fn staggered_releases_complete_within_the_window() {
        let (_ctx, mut fx) = started();
        fx.on_input(&InputEvent::PointerMoved { x: 60.0, y: 40.0 });
        for particle in fx.particles.iter_mut().take(10) {
            particle.state = State::Captured;
        }
        fx.on_input(&InputEvent::Clicked { x: 60.0, y: 40.0 });
        fx.tick(0);
        fx.tick(RELEASE_WINDOW_MS + 1);
        let flying = fx
            .particles
            .iter()
            .filter(|p| matches!(p.state, State::Released { .. }))
            .count();
        assert_eq!(flying, 10);
        for p in fx.particles.iter().take(10) {
            assert!(p.speed() >= RELEASE_SPEED_MIN * DECEL);
        }
    }

    #[test]
    fn released_particles_decelerate_back_to_free() {
        let (_ctx, mut fx) = started();
        fx.particles[0].state = State::Released {
            immune_until_ms: 100,
        };
        fx.particles[0].vx = 2.0;
        fx.particles[0].vy = 0.0;
        for t in 0..2_000 {
            fx.tick(t);
        }
        assert_eq!(fx.particles[0].state, State::Free);
        assert!(fx.particles[0].speed() <= fx.particles[0].base_speed + 0.01);
    }

    #[test]
    fn cooldown_blocks_an_immediate_second_burst() {
        let (_ctx, mut fx) = started();
        fx.on_input(&InputEvent::PointerMoved { x: 60.0, y: 40.0 });
        fx.particles[0].state = State::Captured;
        fx.on_input(&InputEvent::Clicked { x: 60.0, y: 40.0 });
        fx.tick(0);

        // Re-capture and click again inside the cooldown window.
        fx.particles[1].state = State::Captured;
        fx.on_input(&InputEvent::Clicked { x: 60.0, y: 40.0 });
        fx.tick(COOLDOWN_MS / 2);
        assert_eq!(fx.particles[1].state, State::Captured);
    }

    #[test]
    fn stop_discards_particles_and_cooldown() {
        let (ctx, mut fx) = started();
        fx.tick(0);
        assert!(!ctx.surface.with(|s| s.is_blank()).unwrap());

        fx.stop();
        assert!(fx.particles.is_empty());
        assert_eq!(fx.cooldown_until_ms, 0);
        assert_eq!(ctx.input.attached_count(), 0);
        assert!(ctx.surface.with(|s| s.is_blank()).unwrap());

        fx.tick(60_000);
        assert!(ctx.surface.with(|s| s.is_blank()).unwrap());
    }
}
