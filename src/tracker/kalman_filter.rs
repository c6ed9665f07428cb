//! Constant-velocity Kalman filter for bounding boxes.
//!
//! The state is `[cx, cy, ln(a), ln(h), vcx, vcy, vln(a), vln(h)]` where `a` is
//! the aspect ratio `w / h` and `h` the box height. Keeping aspect ratio and
//! height in log-space means any state maps back to a box with strictly
//! positive size. Conversions to and from [`Rect`] happen only in
//! [`KalmanFilter::measure`] and [`KalmanFilter::to_rect`].

use nalgebra::{SMatrix, SVector};

use crate::tracker::rect::Rect;

pub type StateMean = SVector<f64, 8>;
pub type StateCovariance = SMatrix<f64, 8, 8>;
pub type Measurement = SVector<f64, 4>;

type MeasurementCovariance = SMatrix<f64, 4, 4>;
type ObservationMatrix = SMatrix<f64, 4, 8>;

#[derive(Debug, Clone)]
pub struct KalmanFilter {
    motion_mat: StateCovariance,
    update_mat: ObservationMatrix,
    std_weight_position: f64,
    std_weight_velocity: f64,
}

impl Default for KalmanFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KalmanFilter {
    pub fn new() -> Self {
        let ndim = 4;
        let mut motion_mat = StateCovariance::identity();
        for i in 0..ndim {
            motion_mat[(i, ndim + i)] = 1.0;
        }

        let mut update_mat = ObservationMatrix::zeros();
        for i in 0..ndim {
            update_mat[(i, i)] = 1.0;
        }

        Self {
            motion_mat,
            update_mat,
            std_weight_position: 1.0 / 20.0,
            std_weight_velocity: 1.0 / 160.0,
        }
    }

    /// Box to measurement space `[cx, cy, ln(w / h), ln(h)]`.
    pub fn measure(rect: &Rect) -> Measurement {
        let (cx, cy) = rect.center();
        let w = rect.width as f64;
        let h = rect.height as f64;
        Measurement::new(cx as f64, cy as f64, (w / h).ln(), h.ln())
    }

    /// Position part of a state back to a box.
    pub fn to_rect(mean: &StateMean) -> Rect {
        let h = mean[3].exp();
        let w = mean[2].exp() * h;
        Rect::from_center(mean[0] as f32, mean[1] as f32, w as f32, h as f32)
    }

    /// Create a track state from an unassociated box. Velocities start at zero
    /// and the covariance is a wide prior scaled by the box height.
    pub fn initiate(&self, rect: &Rect) -> (StateMean, StateCovariance) {
        let measurement = Self::measure(rect);
        let mut mean = StateMean::zeros();
        mean.fixed_rows_mut::<4>(0).copy_from(&measurement);

        let h = rect.height as f64;
        let pos = self.std_weight_position;
        let vel = self.std_weight_velocity;
        let std = StateMean::from([
            2.0 * pos * h,
            2.0 * pos * h,
            1e-2,
            2.0 * pos,
            10.0 * vel * h,
            10.0 * vel * h,
            1e-5,
            10.0 * vel,
        ]);

        (mean, diagonal_covariance(&std))
    }

    /// Advance a state by one frame.
    pub fn predict(
        &self,
        mean: &StateMean,
        covariance: &StateCovariance,
    ) -> (StateMean, StateCovariance) {
        let h = mean[3].exp();
        let pos = self.std_weight_position;
        let vel = self.std_weight_velocity;
        let std = StateMean::from([
            pos * h,
            pos * h,
            1e-2,
            pos,
            vel * h,
            vel * h,
            1e-5,
            vel,
        ]);
        let motion_cov = diagonal_covariance(&std);

        let new_mean = self.motion_mat * mean;
        let new_covariance = self.motion_mat * covariance * self.motion_mat.transpose() + motion_cov;

        (new_mean, new_covariance)
    }

    /// Project a state into measurement space, adding measurement noise.
    pub fn project(
        &self,
        mean: &StateMean,
        covariance: &StateCovariance,
    ) -> (Measurement, MeasurementCovariance) {
        let h = mean[3].exp();
        let pos = self.std_weight_position;
        let std = Measurement::new(pos * h, pos * h, 1e-1, pos);
        let innovation_cov = MeasurementCovariance::from_diagonal(&std.component_mul(&std));

        let mean_proj = self.update_mat * mean;
        let covariance_proj =
            self.update_mat * covariance * self.update_mat.transpose() + innovation_cov;

        (mean_proj, covariance_proj)
    }

    /// Correct a predicted state with an observed box.
    ///
    /// Returns `None` when the innovation covariance is not positive definite;
    /// callers keep the prediction in that case.
    pub fn update(
        &self,
        mean: &StateMean,
        covariance: &StateCovariance,
        observed: &Rect,
    ) -> Option<(StateMean, StateCovariance)> {
        let (projected_mean, projected_cov) = self.project(mean, covariance);
        let innovation = Self::measure(observed) - projected_mean;

        // K = P Hᵀ S⁻¹, solved as Kᵀ = S⁻¹ H P since P and S are symmetric.
        let chol = projected_cov.cholesky()?;
        let kalman_gain = chol.solve(&(self.update_mat * covariance)).transpose();

        let new_mean = mean + kalman_gain * innovation;
        let new_covariance = covariance - kalman_gain * projected_cov * kalman_gain.transpose();
        let new_covariance = (new_covariance + new_covariance.transpose()) * 0.5;

        if new_mean.iter().all(|v| v.is_finite()) {
            Some((new_mean, new_covariance))
        } else {
            None
        }
    }
}

fn diagonal_covariance(std: &StateMean) -> StateCovariance {
    StateCovariance::from_diagonal(&std.component_mul(std))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initiate() {
        let kf = KalmanFilter::new();
        let rect = Rect::from_tlbr(10.0, 10.0, 50.0, 90.0);
        let (mean, cov) = kf.initiate(&rect);

        assert!((mean[0] - 30.0).abs() < 1e-9);
        assert!((mean[1] - 50.0).abs() < 1e-9);
        assert!((mean[2] - 0.5f64.ln()).abs() < 1e-9);
        assert!((mean[3] - 80.0f64.ln()).abs() < 1e-9);
        for i in 4..8 {
            assert_eq!(mean[i], 0.0);
        }
        for i in 0..8 {
            assert!(cov[(i, i)] > 0.0);
        }
    }

    #[test]
    fn test_state_rect_roundtrip() {
        let kf = KalmanFilter::new();
        let rect = Rect::from_tlbr(12.0, 7.0, 40.0, 99.0);
        let (mean, _) = kf.initiate(&rect);
        let back = KalmanFilter::to_rect(&mean);
        assert!((back.x - rect.x).abs() < 1e-3);
        assert!((back.y - rect.y).abs() < 1e-3);
        assert!((back.width - rect.width).abs() < 1e-3);
        assert!((back.height - rect.height).abs() < 1e-3);
    }

    #[test]
    fn test_predict_inflates_uncertainty() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate(&Rect::from_tlbr(0.0, 0.0, 20.0, 40.0));
        let (pred_mean, pred_cov) = kf.predict(&mean, &cov);

        // Zero velocity: the box stays put.
        assert!((pred_mean - mean).norm() < 1e-9);
        for i in 0..8 {
            assert!(pred_cov[(i, i)] > cov[(i, i)]);
        }
    }

    #[test]
    fn test_update_pulls_towards_measurement_and_shrinks() {
        let kf = KalmanFilter::new();
        let (mean, cov) = kf.initiate(&Rect::from_tlbr(0.0, 0.0, 20.0, 40.0));
        let (mean, cov) = kf.predict(&mean, &cov);

        let observed = Rect::from_tlbr(4.0, 0.0, 24.0, 40.0);
        let (new_mean, new_cov) = kf.update(&mean, &cov, &observed).unwrap();

        assert!(new_mean[0] > mean[0]);
        assert!(new_mean[0] < 14.0 + 1e-9);
        assert!(new_mean[4] > 0.0, "velocity should follow the shift");
        for i in 0..4 {
            assert!(new_cov[(i, i)] < cov[(i, i)]);
        }
    }

    #[test]
    fn test_constant_motion_is_learned() {
        let kf = KalmanFilter::new();
        let (mut mean, mut cov) = kf.initiate(&Rect::from_tlbr(0.0, 0.0, 20.0, 40.0));
        for step in 1..=20 {
            let (m, c) = kf.predict(&mean, &cov);
            let dx = 3.0 * step as f32;
            let observed = Rect::from_tlbr(dx, 0.0, 20.0 + dx, 40.0);
            let (m, c) = kf.update(&m, &c, &observed).unwrap();
            mean = m;
            cov = c;
        }
        assert!((mean[4] - 3.0).abs() < 0.5, "vx = {}", mean[4]);

        let (pred, _) = kf.predict(&mean, &cov);
        let rect = KalmanFilter::to_rect(&pred);
        assert!((rect.x - 63.0).abs() < 2.0, "x = {}", rect.x);
        assert!(rect.width > 0.0 && rect.height > 0.0);
    }
}
