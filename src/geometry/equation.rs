//! Closed-form polynomial root solvers.

// Above this |b/a| ratio the cubic term is numerically negligible.
const CUBIC_RATIO_LIMIT: f64 = 1.0e6;
// Above this |b/a| ratio the quadratic term is treated as zero.
const QUADRATIC_RATIO_LIMIT: f64 = 1.0e12;
// Relative tolerance under which the discriminant or the Cardano terms mark a double root.
const REPEATED_ROOT_TOLERANCE: f64 = 1.0e-12;

/// Solves `a*x^2 + b*x + c = 0`, writing real roots into `roots`.
///
/// Returns the number of roots written. Degenerate equations with no unknown
/// (`a == b == 0`) report zero roots.
pub(crate) fn solve_quadratic(a: f64, b: f64, c: f64, roots: &mut [f64; 2]) -> usize {
    if a == 0.0 || b.abs() > QUADRATIC_RATIO_LIMIT * a.abs() {
        if b == 0.0 {
            return 0;
        }
        roots[0] = -c / b;
        return 1;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant > 0.0 {
        let root = discriminant.sqrt();
        roots[0] = (-b + root) / (2.0 * a);
        roots[1] = (-b - root) / (2.0 * a);
        2
    } else if discriminant == 0.0 {
        roots[0] = -b / (2.0 * a);
        1
    } else {
        0
    }
}

/// Solves the monic cubic `x^3 + a*x^2 + b*x + c = 0`.
fn solve_cubic_normed(a: f64, b: f64, c: f64, roots: &mut [f64; 3]) -> usize {
    let a2 = a * a;
    let mut q = (a2 - 3.0 * b) / 9.0;
    let r = (a * (2.0 * a2 - 9.0 * b) + 27.0 * c) / 54.0;
    let r2 = r * r;
    let q3 = q * q * q;
    let a = a / 3.0;
    // A discriminant lost in rounding is a near-repeated pair of real roots.
    if r2 < q3 || (q3 > 0.0 && r2 - q3 <= REPEATED_ROOT_TOLERANCE * q3) {
        let t = (r / q3.sqrt()).clamp(-1.0, 1.0).acos();
        q = -2.0 * q.sqrt();
        roots[0] = q * (t / 3.0).cos() - a;
        roots[1] = q * ((t + 2.0 * core::f64::consts::PI) / 3.0).cos() - a;
        roots[2] = q * ((t - 2.0 * core::f64::consts::PI) / 3.0).cos() - a;
        return 3;
    }
    let u = if r < 0.0 { 1.0 } else { -1.0 } * (r.abs() + (r2 - q3).sqrt()).cbrt();
    let v = if u == 0.0 { 0.0 } else { q / u };
    roots[0] = (u + v) - a;
    if u == v || (u - v).abs() < REPEATED_ROOT_TOLERANCE * (u + v).abs() {
        roots[1] = -0.5 * (u + v) - a;
        return 2;
    }
    1
}

/// Solves `a*x^3 + b*x^2 + c*x + d = 0`, writing real roots into `roots`.
///
/// Falls back to the quadratic solver when the leading coefficient is zero or
/// negligible relative to `b`.
pub(crate) fn solve_cubic(a: f64, b: f64, c: f64, d: f64, roots: &mut [f64; 3]) -> usize {
    if a != 0.0 {
        let bn = b / a;
        if bn.abs() < CUBIC_RATIO_LIMIT {
            return solve_cubic_normed(bn, c / a, d / a, roots);
        }
    }
    let mut quadratic = [0.0f64; 2];
    let count = solve_quadratic(b, c, d, &mut quadratic);
    roots[..count].copy_from_slice(&quadratic[..count]);
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(roots: &[f64]) -> Vec<f64> {
        let mut out = roots.to_vec();
        out.sort_by(|a, b| a.total_cmp(b));
        out
    }

    #[test]
    fn cubic_with_three_distinct_roots() {
        // (x - 1)(x - 2)(x - 3)
        let mut roots = [0.0; 3];
        let n = solve_cubic(1.0, -6.0, 11.0, -6.0, &mut roots);
        assert_eq!(n, 3);
        let roots = sorted(&roots[..n]);
        for (root, expected) in roots.iter().zip([1.0, 2.0, 3.0]) {
            assert!((root - expected).abs() < 1.0e-9, "{root} vs {expected}");
        }
    }

    #[test]
    fn cubic_with_repeated_root() {
        // (x - 1)^2 (x + 2)
        let mut roots = [0.0; 3];
        let n = solve_cubic(1.0, 0.0, -3.0, 2.0, &mut roots);
        assert!(n >= 2);
        let roots = sorted(&roots[..n]);
        assert!((roots[0] + 2.0).abs() < 1.0e-6);
        assert!((roots[n - 1] - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn cubic_with_near_repeated_roots() {
        // (x - 1)(x - 1 - 1e-9)(x + 2), expanded from its roots.
        let (r0, r1, r2) = (1.0, 1.0 + 1.0e-9, -2.0);
        let b = -(r0 + r1 + r2);
        let c = r0 * r1 + r0 * r2 + r1 * r2;
        let d = -(r0 * r1 * r2);
        let mut roots = [0.0; 3];
        let n = solve_cubic(1.0, b, c, d, &mut roots);
        assert!(n >= 2);
        let roots = sorted(&roots[..n]);
        assert!((roots[0] + 2.0).abs() < 1.0e-6, "{roots:?}");
        let near_one = roots.iter().filter(|root| (*root - 1.0).abs() < 1.0e-6).count();
        assert!(near_one >= 2, "{roots:?}");
    }

    #[test]
    fn cubic_with_single_real_root() {
        // x^3 + x + 2 has a single real root at -1.
        let mut roots = [0.0; 3];
        let n = solve_cubic(1.0, 0.0, 1.0, 2.0, &mut roots);
        assert_eq!(n, 1);
        assert!((roots[0] + 1.0).abs() < 1.0e-9);
    }

    #[test]
    fn degenerate_cubic_falls_back_to_quadratic() {
        let mut roots = [0.0; 3];
        let n = solve_cubic(0.0, 1.0, -3.0, 2.0, &mut roots);
        assert_eq!(n, 2);
        assert_eq!(sorted(&roots[..n]), vec![1.0, 2.0]);
    }

    #[test]
    fn quadratic_without_unknown_has_no_roots() {
        let mut roots = [0.0; 2];
        assert_eq!(solve_quadratic(0.0, 0.0, 1.0, &mut roots), 0);
        assert_eq!(solve_quadratic(0.0, 2.0, -1.0, &mut roots), 1);
        assert_eq!(roots[0], 0.5);
        assert_eq!(solve_quadratic(1.0, 0.0, 1.0, &mut roots), 0);
    }
}
