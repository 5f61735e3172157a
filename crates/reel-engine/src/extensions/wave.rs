// extensions/wave.rs
//
// Sinusoidal motion: single oscillators and multi-band fields that deform
// vertex buffers in place.

use glam::{Vec2, Vec3};

/// Which planar coordinate a band reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveAxis {
    X,
    Y,
}

/// `amplitude * sin(time * phase_speed + coord * frequency)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveBand {
    pub amplitude: f32,
    pub frequency: f32,
    pub phase_speed: f32,
    pub axis: WaveAxis,
}

impl WaveBand {
    pub fn new(amplitude: f32, frequency: f32, phase_speed: f32, axis: WaveAxis) -> Self {
        Self { amplitude, frequency, phase_speed, axis }
    }

    #[inline]
    pub fn sample(&self, coord: Vec2, time: f32) -> f32 {
        let c = match self.axis {
            WaveAxis::X => coord.x,
            WaveAxis::Y => coord.y,
        };
        self.amplitude * (time * self.phase_speed + c * self.frequency).sin()
    }
}

/// Sum of wave bands.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WaveField {
    pub bands: Vec<WaveBand>,
}

impl WaveField {
    pub fn new(bands: Vec<WaveBand>) -> Self {
        Self { bands }
    }

    pub fn sample(&self, coord: Vec2, time: f32) -> f32 {
        self.bands.iter().map(|b| b.sample(coord, time)).sum()
    }

    /// Write `rest` displaced along Z by the field into `out`.
    /// Only the common prefix of the two buffers is touched.
    pub fn deform(&self, rest: &[Vec3], out: &mut [Vec3], time: f32) {
        for (dst, src) in out.iter_mut().zip(rest) {
            *dst = Vec3::new(src.x, src.y, src.z + self.sample(Vec2::new(src.x, src.y), time));
        }
    }
}

/// `center + amplitude * sin(time * speed + phase)`.
#[inline]
pub fn oscillate(center: f32, amplitude: f32, speed: f32, phase: f32, time: f32) -> f32 {
    center + amplitude * (time * speed + phase).sin()
}

/// Scale factor pulsing around 1.
#[inline]
pub fn pulse(amount: f32, speed: f32, time: f32) -> f32 {
    1.0 + amount * (time * speed).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_sums_bands() {
        let field = WaveField::new(vec![
            WaveBand::new(0.5, 0.5, 0.5, WaveAxis::X),
            WaveBand::new(0.25, 1.0, 1.0, WaveAxis::X),
            WaveBand::new(0.1, 2.0, 0.7, WaveAxis::Y),
        ]);
        let (x, y, t) = (1.5_f32, -0.5_f32, 2.0_f32);
        let expected = 0.5 * (t * 0.5 + x * 0.5).sin()
            + 0.25 * (t + x).sin()
            + 0.1 * (t * 0.7 + y * 2.0).sin();
        assert!((field.sample(Vec2::new(x, y), t) - expected).abs() < 1e-5);
    }

    #[test]
    fn deform_keeps_planar_coords() {
        let field = WaveField::new(vec![WaveBand::new(1.0, 1.0, 1.0, WaveAxis::X)]);
        let rest = vec![Vec3::new(1.0, 2.0, 0.0), Vec3::new(-1.0, 0.5, 0.0)];
        let mut out = rest.clone();
        field.deform(&rest, &mut out, 0.3);
        for (a, b) in rest.iter().zip(&out) {
            assert_eq!((a.x, a.y), (b.x, b.y));
        }
        assert!((out[0].z - (0.3_f32 + 1.0).sin()).abs() < 1e-6);
    }

    #[test]
    fn deform_is_stateless() {
        let field = WaveField::new(vec![WaveBand::new(1.0, 1.0, 1.0, WaveAxis::Y)]);
        let rest = vec![Vec3::new(0.0, 1.0, 0.0)];
        let mut a = rest.clone();
        let mut b = rest.clone();
        field.deform(&rest, &mut a, 5.0);
        field.deform(&rest, &mut b, 1.0);
        field.deform(&rest, &mut b, 5.0);
        assert_eq!(a, b);
    }
}
