use crate::Points;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// Source of zero-mean payoff perturbations.
pub trait Noise {
    fn draw(&mut self) -> Points;
}

/// Zero-mean Gaussian noise via the Box–Muller transform.
/// Generic over the random source so tests and audits can fix the seed.
#[derive(Debug, Clone)]
pub struct Gaussian<R> {
    rng: R,
    sd: Points,
    spare: Option<Points>,
}

impl<R> Gaussian<R>
where
    R: Rng,
{
    pub fn new(rng: R, sd: Points) -> Self {
        Self {
            rng,
            sd: sd.max(0.0),
            spare: None,
        }
    }
    pub fn sd(&self) -> Points {
        self.sd
    }
    /// One standard normal deviate. Box–Muller yields two; the second is kept.
    fn standard(&mut self) -> Points {
        if let Some(z) = self.spare.take() {
            return z;
        }
        // u1 in (0, 1] keeps ln(u1) finite
        let u1 = 1.0 - self.rng.random::<f64>();
        let u2 = self.rng.random::<f64>();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        self.spare = Some(radius * theta.sin());
        radius * theta.cos()
    }
}

impl Gaussian<SmallRng> {
    /// Seeded small RNG, the configuration used by live rooms.
    pub fn seeded(seed: u64, sd: Points) -> Self {
        Self::new(SmallRng::seed_from_u64(seed), sd)
    }
}

impl<R> Noise for Gaussian<R>
where
    R: Rng,
{
    fn draw(&mut self) -> Points {
        match self.sd > 0.0 {
            true => self.standard() * self.sd,
            false => 0.0,
        }
    }
}

/// No perturbation at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Noise for Silent {
    fn draw(&mut self) -> Points {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn same_seed_same_draws() {
        let mut a = Gaussian::seeded(7, 5.0);
        let mut b = Gaussian::seeded(7, 5.0);
        let xs = (0..32).map(|_| a.draw()).collect::<Vec<_>>();
        let ys = (0..32).map(|_| b.draw()).collect::<Vec<_>>();
        assert_eq!(xs, ys);
    }
    #[test]
    fn different_seed_different_draws() {
        let mut a = Gaussian::seeded(1, 5.0);
        let mut b = Gaussian::seeded(2, 5.0);
        let xs = (0..8).map(|_| a.draw()).collect::<Vec<_>>();
        let ys = (0..8).map(|_| b.draw()).collect::<Vec<_>>();
        assert_ne!(xs, ys);
    }
    #[test]
    fn zero_sd_is_silent() {
        let mut g = Gaussian::seeded(3, 0.0);
        assert!((0..16).all(|_| g.draw() == 0.0));
    }
    #[test]
    fn moments_are_plausible() {
        let n = 20_000;
        let mut g = Gaussian::seeded(42, 2.0);
        let xs = (0..n).map(|_| g.draw()).collect::<Vec<_>>();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.1, "mean {}", mean);
        assert!((var.sqrt() - 2.0).abs() < 0.1, "sd {}", var.sqrt());
        assert!(xs.iter().all(|x| x.is_finite()));
    }
}
