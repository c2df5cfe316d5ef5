/// Random number generator (xorshift32)
///
/// State must never be zero, a zero state stays zero forever.
#[inline]
pub fn xorshift32(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Uniform float in [0, 1)
#[inline]
pub fn next_unit(state: &mut u32) -> f32 {
    // 24 high bits fit exactly in an f32 mantissa
    (xorshift32(state) >> 8) as f32 / (1u32 << 24) as f32
}

/// Uniform float in [-1, 1)
#[inline]
pub fn next_signed(state: &mut u32) -> f32 {
    next_unit(state) * 2.0 - 1.0
}

/// Turn an arbitrary seed into a usable (non-zero) state
#[inline]
pub fn seed_state(seed: u32) -> u32 {
    if seed == 0 { 0x9E37_79B9 } else { seed }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_range() {
        let mut s = seed_state(7);
        for _ in 0..10_000 {
            let v = next_unit(&mut s);
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn zero_seed_is_replaced() {
        let mut s = seed_state(0);
        assert_ne!(xorshift32(&mut s), 0);
    }
}
