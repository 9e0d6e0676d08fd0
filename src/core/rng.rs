use super::pbrt::Float;
use hexf::*;

#[cfg(feature = "float_as_double")]
pub const ONE_MINUS_EPSILON: f64 = hexf64!("0x1.fffffffffffffp-1");
#[cfg(not(feature = "float_as_double"))]
pub const ONE_MINUS_EPSILON: f32 = hexf32!("0x1.fffffep-1");

pub const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
pub const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
pub const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// PCG pseudo-random number generator
#[derive(Debug, Copy, Clone)]
pub struct Rng {
    state: u64,
    inc: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Rng {
        let mut rng = Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        };
        rng.set_sequence(seed);
        rng
    }

    pub fn set_sequence(&mut self, initseq: u64) {
        self.state = 0;
        self.inc = initseq.wrapping_shl(1) | 1;
        self.uniform_uint32();
        self.state = self.state.wrapping_add(PCG32_DEFAULT_STATE);
        self.uniform_uint32();
    }

    pub fn uniform_uint32(&mut self) -> u32 {
        let oldstate: u64 = self.state;
        self.state = oldstate.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);
        let xorshifted: u32 = (oldstate.wrapping_shr(18) ^ oldstate).wrapping_shr(27) as u32;
        let rot: u32 = oldstate.wrapping_shr(59) as u32;
        xorshifted.wrapping_shr(rot) | xorshifted.wrapping_shl(rot.wrapping_neg() & 31)
    }

    pub fn uniform_float(&mut self) -> Float {
        (self.uniform_uint32() as Float * hexf32!("0x1.0p-32") as Float).min(ONE_MINUS_EPSILON)
    }
}

impl Default for Rng {
    fn default() -> Rng {
        Rng {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}
