//! Forward Discrete Cosine Transform for 8x8 sample blocks.
//!
//! Uses the floating-point Arai, Agui and Nakajima factorization (5 multiplies
//! per 1-D pass), applied to rows and then to columns. The AAN outputs are
//! scaled by `8 * s[u] * s[v]`, with `s[0] = 1` and `s[k] = sqrt(2) cos(k pi/16)`;
//! [`forward_dct`] removes that scale so the result is the JPEG DCT-II:
//!
//! ```text
//! F(u,v) = 1/4 C(u) C(v) sum_x sum_y f(x,y) cos((2x+1) u pi/16) cos((2y+1) v pi/16)
//! ```

use crate::constants::{BLOCK_DIM, BLOCK_SIZE};
use crate::jpeg1::block::Block;

/// Frequency coefficients in natural order, `F(u, v)` at index `v * 8 + u`.
pub type Coefficients = [f32; BLOCK_DIM];

const AAN_SCALE_FACTOR: [f32; BLOCK_SIZE] = [
    1.0,
    1.387_039_8,
    1.306_563,
    1.175_875_6,
    1.0,
    0.785_694_96,
    0.541_196_1,
    0.275_899_38,
];

const LEVEL_SHIFT: f32 = 128.0;

/// Level-shifts the samples and applies the 2-D forward DCT.
pub fn forward_dct(block: &Block) -> Coefficients {
    let mut data = [0.0f32; BLOCK_DIM];
    for (out, &sample) in data.iter_mut().zip(block.iter()) {
        *out = sample - LEVEL_SHIFT;
    }

    for row in 0..BLOCK_SIZE {
        aan_pass(&mut data, row * BLOCK_SIZE, 1);
    }
    for col in 0..BLOCK_SIZE {
        aan_pass(&mut data, col, BLOCK_SIZE);
    }

    for v in 0..BLOCK_SIZE {
        for u in 0..BLOCK_SIZE {
            let idx = v * BLOCK_SIZE + u;
            data[idx] /= 8.0 * AAN_SCALE_FACTOR[u] * AAN_SCALE_FACTOR[v];
        }
    }
    data
}

/// One 1-D AAN butterfly over eight elements starting at `base`.
#[inline]
fn aan_pass(data: &mut [f32; BLOCK_DIM], base: usize, stride: usize) {
    let at = |k: usize| base + k * stride;

    let tmp0 = data[at(0)] + data[at(7)];
    let tmp7 = data[at(0)] - data[at(7)];
    let tmp1 = data[at(1)] + data[at(6)];
    let tmp6 = data[at(1)] - data[at(6)];
    let tmp2 = data[at(2)] + data[at(5)];
    let tmp5 = data[at(2)] - data[at(5)];
    let tmp3 = data[at(3)] + data[at(4)];
    let tmp4 = data[at(3)] - data[at(4)];

    // Even part
    let tmp10 = tmp0 + tmp3;
    let tmp13 = tmp0 - tmp3;
    let tmp11 = tmp1 + tmp2;
    let tmp12 = tmp1 - tmp2;

    data[at(0)] = tmp10 + tmp11;
    data[at(4)] = tmp10 - tmp11;

    let z1 = (tmp12 + tmp13) * 0.707_106_77;
    data[at(2)] = tmp13 + z1;
    data[at(6)] = tmp13 - z1;

    // Odd part
    let tmp10 = tmp4 + tmp5;
    let tmp11 = tmp5 + tmp6;
    let tmp12 = tmp6 + tmp7;

    let z5 = (tmp10 - tmp12) * 0.382_683_43;
    let z2 = 0.541_196_1 * tmp10 + z5;
    let z4 = 1.306_563 * tmp12 + z5;
    let z3 = tmp11 * 0.707_106_77;

    let z11 = tmp7 + z3;
    let z13 = tmp7 - z3;

    data[at(5)] = z13 + z2;
    data[at(3)] = z13 - z2;
    data[at(1)] = z11 + z4;
    data[at(7)] = z11 - z4;
}
