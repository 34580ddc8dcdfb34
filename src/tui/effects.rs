//! Confetti burst drawn over the board after a round win

use super::ui::NEON;
use rand::prelude::*;
use ratatui::prelude::*;

/// Particles per spray
const PARTICLES_PER_SPRAY: usize = 40;

/// Frames a particle lives for
const PARTICLE_TTL: u16 = 24;

/// Downward pull per frame, in cells
const GRAVITY: f32 = 0.12;

/// Horizontal spray origins as fractions of the width
const ORIGINS: [f32; 3] = [0.02, 0.5, 0.98];

const GLYPHS: [char; 4] = ['*', '+', '.', 'o'];

#[derive(Debug, Clone, PartialEq)]
struct Particle {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    color: usize,
    glyph: char,
    ttl: u16,
}

/// A set of falling particles in board-relative cell coordinates.
#[derive(Debug, Clone, Default)]
pub struct Confetti {
    particles: Vec<Particle>,
}

impl Confetti {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch three upward sprays from the bottom of a `width` x `height` area.
    pub fn burst(&mut self, width: u16, height: u16) {
        self.burst_with_rng(&mut rand::rng(), width, height);
    }

    /// Same as `burst`, with a caller-supplied RNG (for testing/seeding).
    pub fn burst_with_rng<R: Rng>(&mut self, rng: &mut R, width: u16, height: u16) {
        if width == 0 || height == 0 {
            return;
        }
        let base_y = f32::from(height) * 0.95;
        for origin in ORIGINS {
            let x = f32::from(width.saturating_sub(1)) * origin;
            for _ in 0..PARTICLES_PER_SPRAY {
                self.particles.push(Particle {
                    x,
                    y: base_y,
                    vx: rng.random_range(-1.2..1.2),
                    vy: rng.random_range(-2.2..-0.8),
                    color: rng.random_range(0..NEON.len()),
                    glyph: GLYPHS[rng.random_range(0..GLYPHS.len())],
                    ttl: rng.random_range(PARTICLE_TTL / 2..=PARTICLE_TTL),
                });
            }
        }
    }

    /// Advance one frame; dead particles are dropped.
    pub fn step(&mut self) {
        for p in &mut self.particles {
            p.x += p.vx;
            p.y += p.vy;
            p.vy += GRAVITY;
            p.ttl = p.ttl.saturating_sub(1);
        }
        self.particles.retain(|p| p.ttl > 0);
    }

    pub fn is_active(&self) -> bool {
        !self.particles.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Paint the visible particles into `area`.
    pub fn render(&self, buf: &mut Buffer, area: Rect) {
        for p in &self.particles {
            if p.x < 0.0 || p.y < 0.0 {
                continue;
            }
            let (col, row) = (p.x as u16, p.y as u16);
            if col >= area.width || row >= area.height {
                continue;
            }
            if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                cell.set_char(p.glyph).set_fg(NEON[p.color]);
            }
        }
    }
}
