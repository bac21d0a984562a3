//! Connected particle field.
//!
//! Dots drift and bounce off the edges; every pair closer than a threshold is
//! joined by a line whose opacity grows as they approach. The pointer repels
//! nearby dots. A single hue, cycled from wall-clock time, colors the whole
//! frame.

use domdom_core::{InputEvent, InputKind, Viewport, hsl_to_rgb};
use rand::Rng;

use super::cycle_hue;
use crate::{Effect, EffectContext, InputHub, Surface, SurfaceHandle};

const DENSITY: f32 = 1.0 / 160.0;
const MIN_COUNT: usize = 40;
const MAX_COUNT: usize = 190;
const POINTER_RADIUS: f32 = 28.0;
const POINTER_PUSH: f32 = 0.05;
const LINK_ALPHA: f32 = 0.3;

#[derive(Debug, Clone, Copy)]
struct Dot {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    radius: f32,
}

impl Dot {
    fn seed(vp: Viewport) -> Self {
        let mut rng = rand::rng();
        Self {
            x: rng.random_range(0.0..vp.width),
            y: rng.random_range(0.0..vp.height),
            vx: rng.random_range(-0.175..0.175),
            vy: rng.random_range(-0.175..0.175),
            radius: rng.random_range(0.3..1.1),
        }
    }

    /// Integrate one frame: move, bounce off edges, take the pointer push.
    fn step(&mut self, vp: Viewport, pointer: Option<(f32, f32)>) {
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

        if let Some((px, py)) = pointer {
            let dx = self.x - px;
            let dy = self.y - py;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < POINTER_RADIUS && dist > 0.0 {
                let push = (POINTER_RADIUS - dist) / POINTER_RADIUS * POINTER_PUSH;
                self.vx += dx / dist * push;
                self.vy += dy / dist * push;
            }
        }
    }
}

pub struct Network {
    running: bool,
    surface: SurfaceHandle,
    input: InputHub,
    viewport: Viewport,
    dots: Vec<Dot>,
    pointer: Option<(f32, f32)>,
}

impl Network {
    pub fn new() -> Self {
        Self {
            running: false,
            surface: SurfaceHandle::detached(),
            input: InputHub::default(),
            viewport: Viewport::default(),
            dots: Vec::new(),
            pointer: None,
        }
    }

    fn populate(&mut self) {
        let count = ((self.viewport.area() * DENSITY) as usize).clamp(MIN_COUNT, MAX_COUNT);
        self.dots = (0..count).map(|_| Dot::seed(self.viewport)).collect();
    }

    fn link_distance(&self) -> f32 {
        if self.viewport.is_narrow() { 14.0 } else { 22.0 }
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Effect for Network {
    fn name(&self) -> &'static str {
        "network"
    }

    fn icon(&self) -> char {
        '❉'
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
        self.dots.clear();
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
        let pointer = self.pointer;
        for dot in &mut self.dots {
            dot.step(vp, pointer);
        }

        let color = hsl_to_rgb(cycle_hue(now_ms, 50), 0.8, 0.7);
        let max_link = self.link_distance();
        let dots = &self.dots;
        self.surface.with(|s| {
            s.clear();
            for dot in dots {
                s.fill_circle(dot.x, dot.y, dot.radius, color, 0.55);
            }
            for (i, a) in dots.iter().enumerate() {
                for b in &dots[i + 1..] {
                    let dx = a.x - b.x;
                    let dy = a.y - b.y;
                    let dist = (dx * dx + dy * dy).sqrt();
                    if dist < max_link {
                        let alpha = (1.0 - dist / max_link) * LINK_ALPHA;
                        s.line(a.x, a.y, b.x, b.y, color, alpha);
                    }
                }
            }
        });
    }
}
