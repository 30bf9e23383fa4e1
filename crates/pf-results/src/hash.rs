//! Content-based hashing for run IDs and field digests.

use pf_mesh::Grid;
use pf_project::RunParams;
use sha2::{Digest, Sha256};

/// Identifier derived from the parameters and solver version: the same
/// inputs always map to the same run.
pub fn compute_run_id(params: &RunParams, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let params_json = serde_json::to_string(params).unwrap_or_default();
    hasher.update(params_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

/// Digest of the exact bit patterns of a sequence of fields.
pub fn field_digest(frames: &[Grid<f64>]) -> String {
    let mut hasher = Sha256::new();
    for frame in frames {
        let (nr, ntheta, nz) = frame.dims();
        for n in [nr, ntheta, nz] {
            hasher.update((n as u64).to_le_bytes());
        }
        for value in frame.iter() {
            hasher.update(value.to_le_bytes());
        }
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> RunParams {
        pf_project::params_from_yaml_str(include_str!("../../../demos/scenario_a.yaml")).unwrap()
    }

    #[test]
    fn hash_stability() {
        let p = params();
        assert_eq!(compute_run_id(&p, "v1"), compute_run_id(&p, "v1"));
        assert_eq!(compute_run_id(&p, "v1").len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let p = params();
        let mut q = params();
        q.torches[0].power_w = 2e5;
        assert_ne!(compute_run_id(&p, "v1"), compute_run_id(&q, "v1"));
        assert_ne!(compute_run_id(&p, "v1"), compute_run_id(&p, "v2"));
    }

    #[test]
    fn digest_sees_single_bit_changes() {
        let a = Grid::filled(2, 2, 2, 300.0);
        let mut b = a.clone();
        b.as_mut_slice()[5] = f64::from_bits(300.0f64.to_bits() + 1);
        assert_eq!(field_digest(&[a.clone()]), field_digest(&[a.clone()]));
        assert_ne!(field_digest(&[a]), field_digest(&[b]));
    }

    #[test]
    fn digest_depends_on_frame_shape() {
        let flat = Grid::filled(1, 1, 4, 1.0);
        let tall = Grid::filled(4, 1, 1, 1.0);
        assert_ne!(field_digest(&[flat]), field_digest(&[tall]));
    }
}
