/*!
Two-component circular-Gaussian visibility-amplitude model.

The parameter vector has a fixed layout of [`N_PARAMS`] values:

| index | parameter | unit |
|-------|-----------|------|
| 0     | flux of component 1 (phase-centered) | Jy |
| 1     | width of component 1 | micro-arcsec |
| 2     | x-displacement of component 2 | micro-arcsec |
| 3     | y-displacement of component 2 | micro-arcsec |
| 4     | flux of component 2 | Jy |
| 5     | width of component 2 | micro-arcsec |

Baseline coordinates (u, v) are in wavelengths, so that `u * MUAS_TO_RAD`
is the dimensionless spatial frequency conjugate to an angle in
micro-arcseconds.
*/

use std::f64::consts::PI;

/// Number of model parameters.
pub const N_PARAMS: usize = 6;

/// Micro-arcseconds to radians.
pub const MUAS_TO_RAD: f64 = 4.8481368110954e-12;

/// Visibility amplitude of the two-component model at baseline (u, v).
///
/// Component 1 sits at the phase center and contributes a purely real
/// Gaussian visibility; component 2 is displaced by (`theta[2]`, `theta[3]`)
/// and picks up a phase proportional to the baseline. The returned value is
/// the modulus of the complex sum.
///
/// Pure function of finite inputs; at zero baseline the Gaussians collapse
/// to their peak fluxes and the amplitude is exactly `theta[0] + theta[4]`.
pub fn visibility_amplitude(u: f64, v: f64, theta: &[f64]) -> f64 {
    debug_assert!(theta.len() >= N_PARAMS);

    let aux = 2.0 * PI * PI;
    let b2 = (u * u + v * v) * MUAS_TO_RAD * MUAS_TO_RAD;

    // component 1: zero-centered, no imaginary part
    let vr1 = theta[0] * (-aux * theta[1] * theta[1] * b2).exp();

    // component 2: same Gaussian envelope, phase set by the displacement
    let v2 = theta[4] * (-aux * theta[5] * theta[5] * b2).exp();
    let phase2 = -2.0 * PI * (u * theta[2] + v * theta[3]) * MUAS_TO_RAD;
    let vr2 = v2 * phase2.cos();
    let vi2 = v2 * phase2.sin();

    ((vr1 + vr2) * (vr1 + vr2) + vi2 * vi2).sqrt()
}
