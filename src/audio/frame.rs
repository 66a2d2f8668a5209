use std::ops::{AddAssign, Mul};

// the smallest unit of audio; one stereo frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StereoFrame {
    pub left: f32,
    pub right: f32,
}

impl StereoFrame {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn mono(s: f32) -> Self {
        Self { left: s, right: s }
    }

    /// Place a mono sample using constant power panning. `pan` is 0.0 hard
    /// left to 1.0 hard right.
    pub fn panned(s: f32, pan: f32) -> Self {
        let angle = pan.clamp(0.0, 1.0) * std::f32::consts::FRAC_PI_2;
        Self { left: s * angle.cos(), right: s * angle.sin() }
    }

    pub fn clamp(self) -> Self {
        Self { left: self.left.clamp(-1.0, 1.0), right: self.right.clamp(-1.0, 1.0) }
    }
}

impl AddAssign for StereoFrame {
    fn add_assign(&mut self, rhs: Self) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl Mul<f32> for StereoFrame {
    type Output = Self;

    fn mul(self, gain: f32) -> Self {
        Self { left: self.left * gain, right: self.right * gain }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_extremes() {
        let l = StereoFrame::panned(1.0, 0.0);
        assert!((l.left - 1.0).abs() < 1e-6 && l.right.abs() < 1e-6);
        let r = StereoFrame::panned(1.0, 1.0);
        assert!(r.left.abs() < 1e-6 && (r.right - 1.0).abs() < 1e-6);
        let c = StereoFrame::panned(1.0, 0.5);
        assert!((c.left - c.right).abs() < 1e-6);
    }

    #[test]
    fn accumulate_and_clamp() {
        let mut f = StereoFrame::mono(0.75);
        f += StereoFrame::mono(0.5) * 1.0;
        assert_eq!(f.clamp(), StereoFrame::mono(1.0));
    }
}
