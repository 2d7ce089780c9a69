//! Background starfield: a fixed shell of points around the scene.

use eframe::egui;
use nalgebra::Vector3;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub struct Star {
    pub position: Vector3<f64>,
    pub brightness: u8,
}

pub struct Starfield {
    stars: Vec<Star>,
}

impl Starfield {
    /// `count` stars between `radius` and `radius + depth` from the origin.
    pub fn generate(count: usize, radius: f64, depth: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let stars = (0..count)
            .map(|_| {
                // Uniform on the sphere via z and azimuth.
                let z: f64 = rng.gen_range(-1.0..=1.0);
                let phi: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
                let r = radius + rng.gen_range(0.0..=depth);
                let ring = (1.0 - z * z).sqrt();
                Star {
                    position: Vector3::new(ring * phi.cos(), z, ring * phi.sin()) * r,
                    brightness: rng.gen_range(90..=255),
                }
            })
            .collect();
        Self { stars }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn color(star: &Star) -> egui::Color32 {
        egui::Color32::from_gray(star.brightness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stars_live_in_the_shell() {
        let field = Starfield::generate(5000, 100.0, 50.0, 7);
        assert_eq!(field.len(), 5000);
        for s in field.stars() {
            let r = s.position.norm();
            assert!((100.0 - 1e-9..=150.0 + 1e-9).contains(&r));
        }
    }

    #[test]
    fn same_seed_same_sky() {
        let a = Starfield::generate(64, 100.0, 50.0, 42);
        let b = Starfield::generate(64, 100.0, 50.0, 42);
        for (x, y) in a.stars().iter().zip(b.stars()) {
            assert_eq!(x.position, y.position);
            assert_eq!(x.brightness, y.brightness);
        }
    }
}
