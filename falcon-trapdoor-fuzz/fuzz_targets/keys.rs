#![no_main]

use falcon_trapdoor::{
    Falcon512, Falcon1024, FalconFelt, FalconParameters, PublicKey, SecretKey, keys::codec,
};
use libfuzzer_sys::fuzz_target;
use winter_utils::Deserializable;

fn decode_all<P: FalconParameters>(data: &[u8]) {
    // every decoder must return Err on malformed input and leave zeroed outputs behind
    let mut h = vec![FalconFelt::new(1); P::N];
    if codec::decode_pkey::<P>(data, &mut h).is_err() {
        assert!(h.iter().all(|c| c.value() == 0));
    }

    let mut f = vec![1i8; P::N];
    let mut g = vec![1i8; P::N];
    let mut big_f = vec![1i8; P::N];
    if codec::decode_skey::<P>(data, &mut f, &mut g, &mut big_f).is_err() {
        assert!(f.iter().chain(&g).chain(&big_f).all(|&c| c == 0));
    }

    if let Ok(pk) = PublicKey::<P>::read_from_bytes(data) {
        assert_eq!(pk.to_bytes(), data);
    }
    if let Ok(sk) = SecretKey::<P>::read_from_bytes(data) {
        // a decoded secret key re-encodes to the same bytes
        assert_eq!(sk.to_bytes(), data);
        let _ = sk.public_key();
    }
}

fuzz_target!(|data: &[u8]| {
    decode_all::<Falcon512>(data);
    decode_all::<Falcon1024>(data);
});
