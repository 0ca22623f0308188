#![no_main]

use libfuzzer_sys::fuzz_target;
use pixel_oracle::{ChromaSampling, compute_planar_layout, planar_mismatches};

fuzz_target!(|data: &[u8]| {
    let Some((&[w, h, s], planes)) = data.split_first_chunk::<3>() else {
        return;
    };
    let sampling = ChromaSampling::ALL[usize::from(s) % ChromaSampling::ALL.len()];
    let (w, h) = (usize::from(w) + 1, usize::from(h) + 1);
    let layout = compute_planar_layout(w, h, sampling);
    match planar_mismatches(planes, w, h, sampling) {
        Ok(mismatches) => {
            assert_eq!(planes.len(), layout.total_size);
            for m in mismatches {
                assert!(m.expected.abs_diff(m.actual) > 1);
            }
        }
        Err(_) => assert_ne!(planes.len(), layout.total_size),
    }
});
