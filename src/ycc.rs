//! JFIF YCbCr <-> RGB conversion
//!
//! Full-range BT.601, 16-bit fixed point:
//!
//! ```text
//! Y  =  0.29900 * R + 0.58700 * G + 0.11400 * B
//! Cb = -0.16874 * R - 0.33126 * G + 0.50000 * B + 128
//! Cr =  0.50000 * R - 0.41869 * G - 0.08131 * B + 128
//!
//! R = Y                + 1.40200 * (Cr - 128)
//! G = Y - 0.34414 * (Cb - 128) - 0.71414 * (Cr - 128)
//! B = Y + 1.77200 * (Cb - 128)
//! ```

use rgb::Rgb;

const SCALEBITS: i32 = 16;
const ONE_HALF: i32 = 1 << (SCALEBITS - 1);
const CENTER: i32 = 128;

const fn fix(x: f64) -> i32 {
    (x * ((1i64 << SCALEBITS) as f64) + 0.5) as i32
}

const FIX_0_29900: i32 = fix(0.29900);
const FIX_0_58700: i32 = fix(0.58700);
const FIX_0_11400: i32 = fix(0.11400);
const FIX_0_16874: i32 = fix(0.16874);
const FIX_0_33126: i32 = fix(0.33126);
const FIX_0_50000: i32 = fix(0.50000);
const FIX_0_41869: i32 = fix(0.41869);
const FIX_0_08131: i32 = fix(0.08131);

const FIX_1_40200: i32 = fix(1.40200);
const FIX_0_34414: i32 = fix(0.34414);
const FIX_0_71414: i32 = fix(0.71414);
const FIX_1_77200: i32 = fix(1.77200);

#[inline]
fn clamp(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

/// Luma of an RGB pixel
#[inline]
pub fn rgb_to_y(px: Rgb<u8>) -> u8 {
    let (r, g, b) = (px.r as i32, px.g as i32, px.b as i32);
    clamp((FIX_0_29900 * r + FIX_0_58700 * g + FIX_0_11400 * b + ONE_HALF) >> SCALEBITS)
}

/// Convert an RGB pixel to `(Y, Cb, Cr)`
#[inline]
pub fn rgb_to_ycbcr(px: Rgb<u8>) -> (u8, u8, u8) {
    let (r, g, b) = (px.r as i32, px.g as i32, px.b as i32);
    let cb = ((-FIX_0_16874 * r - FIX_0_33126 * g + FIX_0_50000 * b + ONE_HALF) >> SCALEBITS)
        + CENTER;
    let cr = ((FIX_0_50000 * r - FIX_0_41869 * g - FIX_0_08131 * b + ONE_HALF) >> SCALEBITS)
        + CENTER;
    (rgb_to_y(px), clamp(cb), clamp(cr))
}

/// Convert `(Y, Cb, Cr)` to RGB
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> Rgb<u8> {
    let y = y as i32;
    let cb = cb as i32 - CENTER;
    let cr = cr as i32 - CENTER;
    let r = y + ((FIX_1_40200 * cr + ONE_HALF) >> SCALEBITS);
    let g = y + ((-FIX_0_34414 * cb - FIX_0_71414 * cr + ONE_HALF) >> SCALEBITS);
    let b = y + ((FIX_1_77200 * cb + ONE_HALF) >> SCALEBITS);
    Rgb {
        r: clamp(r),
        g: clamp(g),
        b: clamp(b),
    }
}
