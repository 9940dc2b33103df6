use crate::PfError;

/// Floating point type used throughout system
pub type Real = f64;

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PfError::NonFinite { what, value: v })
    }
}

/// Relative change between two successive iterates, safe around zero.
pub fn relative_change(previous: Real, current: Real) -> Real {
    let scale = previous.abs().max(current.abs());
    if scale <= f64::MIN_POSITIVE {
        0.0
    } else {
        (current - previous).abs() / scale
    }
}

/// Stopping rules for [`bisect`].
#[derive(Clone, Copy, Debug)]
pub struct BisectConfig {
    pub max_iterations: usize,
    /// Stop once the bracket is narrower than this.
    pub x_tol: Real,
    /// Stop once |f(x)| drops below this.
    pub f_tol: Real,
}

impl Default for BisectConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            x_tol: 1e-12,
            f_tol: 1e-12,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BisectOutcome {
    pub root: Real,
    pub residual: Real,
    pub iterations: usize,
    pub converged: bool,
}

/// Bounded bisection on `[lo, hi]`.
///
/// The bracket must contain a sign change; otherwise `PfError::NoBracket` is
/// returned with both end values so callers can report why. When the
/// iteration cap is reached the midpoint of the final bracket is returned
/// with `converged = false`.
pub fn bisect<F>(
    what: &'static str,
    mut lo: Real,
    mut hi: Real,
    config: BisectConfig,
    mut f: F,
) -> Result<BisectOutcome, PfError>
where
    F: FnMut(Real) -> Real,
{
    let mut f_lo = ensure_finite(f(lo), what)?;
    let f_hi = ensure_finite(f(hi), what)?;

    if f_lo.abs() <= config.f_tol {
        return Ok(BisectOutcome {
            root: lo,
            residual: f_lo,
            iterations: 0,
            converged: true,
        });
    }
    if f_hi.abs() <= config.f_tol {
        return Ok(BisectOutcome {
            root: hi,
            residual: f_hi,
            iterations: 0,
            converged: true,
        });
    }
    if f_lo.signum() == f_hi.signum() {
        return Err(PfError::NoBracket {
            what,
            lo,
            hi,
            f_lo,
            f_hi,
        });
    }

    let mut mid = 0.5 * (lo + hi);
    let mut f_mid = f_lo;
    for iteration in 1..=config.max_iterations {
        mid = 0.5 * (lo + hi);
        f_mid = ensure_finite(f(mid), what)?;

        if f_mid.abs() <= config.f_tol || (hi - lo).abs() <= config.x_tol {
            return Ok(BisectOutcome {
                root: mid,
                residual: f_mid,
                iterations: iteration,
                converged: true,
            });
        }

        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }

    Ok(BisectOutcome {
        root: mid,
        residual: f_mid,
        iterations: config.max_iterations,
        converged: false,
    })
}
