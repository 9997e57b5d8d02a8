//! Additive masking: multiply by a secret scalar, add ciphertexts, divide back out.
//!
//! SECURITY NOTE: this is not encryption. Any single (plaintext, ciphertext) pair reveals the key
//! as `ciphertext / plaintext`. It only exists to give the circuit a masked-sum relation to prove.

use crate::constants::{KEY_MAX, KEY_MIN};
use crate::error::ZkError;
use crate::types::{Ciphertext, FieldElement};
use num_bigint::BigUint;
use num_traits::Zero;
use rand::Rng;

/// A masking key drawn from `[KEY_MIN, KEY_MAX)`.
///
/// The key doubles as a private circuit witness, so it stays small.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaskingKey(u64);

impl MaskingKey {
    /// Wrap a known key. Zero is rejected since nothing could be unmasked with it.
    pub fn new(key: u64) -> Option<Self> {
        (key > 0).then_some(Self(key))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Draw a fresh key uniformly from `[KEY_MIN, KEY_MAX)`.
pub fn generate_key<R: Rng + ?Sized>(rng: &mut R) -> MaskingKey {
    MaskingKey(rng.gen_range(KEY_MIN..KEY_MAX))
}

/// An additively homomorphic masking scheme.
pub trait AdditiveMasking {
    fn key(&self) -> MaskingKey;

    fn encrypt(&self, plaintext: &FieldElement) -> Ciphertext;

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<FieldElement, ZkError>;

    fn add_encrypted(&self, c1: &Ciphertext, c2: &Ciphertext) -> Ciphertext {
        c1 + c2
    }
}

/// Multiplicative masking with a single key held for the lifetime of a run.
#[derive(Clone, Debug)]
pub struct HomomorphicCipher {
    key: MaskingKey,
}

impl HomomorphicCipher {
    pub fn new(key: MaskingKey) -> Self {
        Self { key }
    }
}

impl AdditiveMasking for HomomorphicCipher {
    fn key(&self) -> MaskingKey {
        self.key
    }

    fn encrypt(&self, plaintext: &FieldElement) -> Ciphertext {
        plaintext * self.key.0
    }

    fn decrypt(&self, ciphertext: &Ciphertext) -> Result<FieldElement, ZkError> {
        let key = BigUint::from(self.key.0);
        if !(ciphertext % &key).is_zero() {
            return Err(ZkError::InvalidCiphertext {
                ciphertext: ciphertext.clone(),
                key: self.key.0,
            });
        }
        Ok(ciphertext / key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::field_modulus;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn cipher(key: u64) -> HomomorphicCipher {
        HomomorphicCipher::new(MaskingKey::new(key).unwrap())
    }

    #[test]
    fn generated_keys_stay_in_range() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        for _ in 0..1000 {
            let k = generate_key(&mut rng).value();
            assert!((KEY_MIN..KEY_MAX).contains(&k));
        }
    }

    #[test]
    fn zero_key_is_rejected() {
        assert!(MaskingKey::new(0).is_none());
    }

    #[test]
    fn non_multiple_fails_instead_of_truncating() {
        let he = cipher(12345);
        let err = he.decrypt(&BigUint::from(12346u32)).unwrap_err();
        assert!(matches!(err, ZkError::InvalidCiphertext { key: 12345, .. }));
    }

    #[test]
    fn ciphertext_is_not_reduced_mod_p() {
        let he = cipher(12345);
        let f = field_modulus() - 1u32;
        let c = he.encrypt(&f);
        assert!(c > field_modulus());
        assert_eq!(he.decrypt(&c).unwrap(), f);
    }

    #[test]
    fn key_is_recoverable_from_one_pair() {
        let he = cipher(424_242);
        let c = he.encrypt(&BigUint::from(17u32));
        assert_eq!(c / 17u32, BigUint::from(424_242u32));
    }

    fn field_element() -> impl Strategy<Value = BigUint> {
        prop::collection::vec(any::<u8>(), 0..32)
            .prop_map(|bytes| BigUint::from_bytes_be(&bytes) % field_modulus())
    }

    proptest! {
        #[test]
        fn decrypt_inverts_encrypt(f in field_element(), k in 1u64..KEY_MAX) {
            let he = cipher(k);
            prop_assert_eq!(he.decrypt(&he.encrypt(&f)).unwrap(), f);
        }

        #[test]
        fn addition_is_homomorphic(f1 in field_element(), f2 in field_element(), k in KEY_MIN..KEY_MAX) {
            let he = cipher(k);
            let sum = he.add_encrypted(&he.encrypt(&f1), &he.encrypt(&f2));
            prop_assert_eq!(he.decrypt(&sum).unwrap(), &f1 + &f2);
        }
    }
}
