//! Arithmetic in the prime field Fp.
//!
//! Residues are `u64` in `[0, p)`. Products go through `u128`, so any prime
//! below 2^64 is safe; the refuter only uses the small primes in [`PRIMES`].

use num_integer::Integer;

/// Primes used by the finite-field refuter.
pub const PRIMES: [u64; 9] = [1181, 1187, 1193, 1201, 1213, 1217, 1223, 1229, 1231];

/// Residue of a signed integer: `n mod p` in `[0, p)`
#[inline]
pub fn residue(n: i64, p: u64) -> u64 {
    (n as i128).rem_euclid(p as i128) as u64
}

/// (a + b) mod p
#[inline(always)]
pub fn add_mod(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 + b as u128) % p as u128) as u64
}

/// (a * b) mod p
#[inline(always)]
pub fn mul_mod(a: u64, b: u64, p: u64) -> u64 {
    ((a as u128 * b as u128) % p as u128) as u64
}

/// (-a) mod p
#[inline(always)]
pub fn neg_mod(a: u64, p: u64) -> u64 {
    match a % p {
        0 => 0,
        r => p - r,
    }
}

/// a^(-1) mod p; `None` when `a ≡ 0`
pub fn inv_mod(a: u64, p: u64) -> Option<u64> {
    let a = a % p;
    if a == 0 {
        return None;
    }
    let egcd = (a as i128).extended_gcd(&(p as i128));
    if egcd.gcd != 1 {
        return None;
    }
    Some(egcd.x.rem_euclid(p as i128) as u64)
}

/// (a / b) mod p; `None` when `b ≡ 0`
#[inline]
pub fn div_mod(a: u64, b: u64, p: u64) -> Option<u64> {
    inv_mod(b, p).map(|b_inv| mul_mod(a, b_inv, p))
}

/// a^e mod p by binary exponentiation (`0^0 = 1`)
pub fn pow_mod(mut base: u64, mut exp: u64, p: u64) -> u64 {
    if p == 1 {
        return 0;
    }
    let mut result: u64 = 1;
    base %= p;
    while exp > 0 {
        if exp & 1 == 1 {
            result = mul_mod(result, base, p);
        }
        exp >>= 1;
        base = mul_mod(base, base, p);
    }
    result
}

/// a^e mod p for a signed exponent.
///
/// Nonzero bases reduce the exponent modulo `p - 1` (Fermat). A zero base
/// with a negative exponent has no value: `None`.
pub fn pow_mod_signed(base: u64, exp: i64, p: u64) -> Option<u64> {
    let base = base % p;
    if base == 0 {
        return match exp.signum() {
            0 => Some(1),
            1 => Some(0),
            _ => None,
        };
    }
    let order = p - 1;
    let reduced = residue(exp, order);
    Some(pow_mod(base, reduced, p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_residue() {
        assert_eq!(residue(-5, 17), 12);
        assert_eq!(residue(40, 17), 6);
    }

    #[test]
    fn test_add_neg_mod() {
        let p = 17u64;
        assert_eq!(add_mod(10, 10, p), 3); // 20 mod 17 = 3
        assert_eq!(add_mod(5, neg_mod(10, p), p), 12); // -5 mod 17 = 12
        assert_eq!(neg_mod(0, p), 0);
        assert_eq!(neg_mod(3, p), 14);
    }

    #[test]
    fn test_inv_mod() {
        let p = 17u64;
        // 3 * 6 = 18 = 1 mod 17
        assert_eq!(inv_mod(3, p), Some(6));
        for a in 1..p {
            let a_inv = inv_mod(a, p).unwrap();
            assert_eq!(mul_mod(a, a_inv, p), 1, "Failed for a={}", a);
        }
        assert_eq!(inv_mod(0, p), None);
        assert_eq!(inv_mod(17, p), None);
    }

    #[test]
    fn test_div_mod() {
        // 10 / 3 = 10 * 6 = 60 = 9 mod 17
        assert_eq!(div_mod(10, 3, 17), Some(9));
        assert_eq!(div_mod(10, 0, 17), None);
    }

    #[test]
    fn test_pow_mod_signed() {
        let p = 17u64;
        assert_eq!(pow_mod_signed(2, 5, p), Some(15)); // 32 mod 17
        // 2^-1 = 9 since 2*9 = 18
        assert_eq!(pow_mod_signed(2, -1, p), Some(9));
        assert_eq!(pow_mod_signed(0, 3, p), Some(0));
        assert_eq!(pow_mod_signed(0, -1, p), None);
        assert_eq!(pow_mod_signed(5, 0, p), Some(1));
    }

    #[test]
    fn test_primes_are_prime() {
        for p in PRIMES {
            assert!((2..p).take_while(|d| d * d <= p).all(|d| p % d != 0), "{}", p);
        }
    }
}
