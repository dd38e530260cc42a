//! End-to-end pipeline tests: seal with one identity's coder, open
//! with another's, and check the error taxonomy a caller branches on.

use sealchat_coder::coder::{Coder, SealedCoder};
use sealchat_coder::compress::compress;
use sealchat_coder::literal::verify_literal_signature;
use sealchat_coder::seal::seal_for_recipients;
use sealchat_crypto::ecdh::X25519StaticSecret;
use sealchat_crypto::keys::{PersonalKey, RecipientKey};
use sealchat_crypto::signing::Keypair;
use sealchat_types::{Address, Result, SealchatError};

const NETWORK: &str = "example.net";

fn personal(seed: u8, local: &str) -> PersonalKey {
    PersonalKey::new(
        Keypair::from_seed(&[seed; 32]),
        X25519StaticSecret::from_bytes([seed.wrapping_add(0x80); 32]),
        local,
    )
}

fn recipient_of(key: &PersonalKey, local: &str) -> RecipientKey {
    RecipientKey::new(
        key.decryption_public(),
        Address::new(format!("{local}@{NETWORK}")),
    )
}

#[test]
fn alice_to_bob_roundtrip_recovers_envelope() -> Result<()> {
    let alice = personal(0x01, "alice");
    let bob = personal(0x02, "bob");
    let to_bob = [recipient_of(&bob, "bob")];

    let packet = SealedCoder::new(&alice, &to_bob, NETWORK).encrypt_text("hello")?;

    let bobs_contacts = [recipient_of(&alice, "alice")];
    let envelope = SealedCoder::new(&bob, &bobs_contacts, NETWORK).decrypt(&packet)?;

    let text = String::from_utf8(envelope).expect("envelope is valid UTF-8");
    assert!(text.starts_with("From: alice@example.net\nTo: bob@example.net\nDate: "));
    assert!(text.ends_with("\n\nhello"));
    Ok(())
}

#[test]
fn arbitrary_envelope_bytes_roundtrip() -> Result<()> {
    let alice = personal(0x03, "alice");
    let bob = personal(0x04, "bob");
    let to_bob = [recipient_of(&bob, "bob")];

    // encrypt/decrypt operate on raw bytes; nothing requires UTF-8.
    let plaintext: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();

    let packet = SealedCoder::new(&alice, &to_bob, NETWORK).encrypt(&plaintext)?;
    let recovered = SealedCoder::new(&bob, &[], NETWORK).decrypt(&packet)?;
    assert_eq!(recovered, plaintext);
    Ok(())
}

#[test]
fn both_recipients_decrypt_to_identical_plaintext() -> Result<()> {
    let alice = personal(0x05, "alice");
    let bob = personal(0x06, "bob");
    let carol = personal(0x07, "carol");
    let recipients = [recipient_of(&bob, "bob"), recipient_of(&carol, "carol")];

    let packet = SealedCoder::new(&alice, &recipients, NETWORK).encrypt_text("group message")?;

    let via_bob = SealedCoder::new(&bob, &[], NETWORK).decrypt(&packet)?;
    let via_carol = SealedCoder::new(&carol, &[], NETWORK).decrypt(&packet)?;
    assert_eq!(via_bob, via_carol);

    let text = String::from_utf8(via_bob).expect("utf-8");
    assert!(text.contains("To: bob@example.net; carol@example.net"));
    Ok(())
}

#[test]
fn wrong_key_yields_recipient_not_found() -> Result<()> {
    let alice = personal(0x08, "alice");
    let bob = personal(0x09, "bob");
    let mallory = personal(0x0A, "mallory");
    let to_bob = [recipient_of(&bob, "bob")];

    let packet = SealedCoder::new(&alice, &to_bob, NETWORK).encrypt_text("for bob only")?;

    let result = SealedCoder::new(&mallory, &[], NETWORK).decrypt(&packet);
    assert!(matches!(
        result,
        Err(SealchatError::RecipientNotFound { .. })
    ));
    Ok(())
}

#[test]
fn any_flipped_body_byte_fails_integrity() -> Result<()> {
    let alice = personal(0x0B, "alice");
    let bob = personal(0x0C, "bob");
    let to_bob = [recipient_of(&bob, "bob")];

    let packet = SealedCoder::new(&alice, &to_bob, NETWORK).encrypt_text("tamper me")?;
    let bob_coder = SealedCoder::new(&bob, &[], NETWORK);

    // The body packet sits after the single 117-byte record frame and
    // its own 5-byte header + 24-byte nonce; flip a spread of
    // ciphertext bytes, one at a time.
    let body_ciphertext_start = 5 + 112 + 5 + 24;
    for offset in [body_ciphertext_start, packet.len() - 1, (body_ciphertext_start + packet.len()) / 2] {
        let mut tampered = packet.clone();
        tampered[offset] ^= 0x01;
        assert!(
            matches!(
                bob_coder.decrypt(&tampered),
                Err(SealchatError::IntegrityFailure { .. })
            ),
            "flip at offset {offset} must fail the integrity check"
        );
    }
    Ok(())
}

#[test]
fn encrypting_twice_is_never_byte_identical() -> Result<()> {
    let alice = personal(0x0D, "alice");
    let bob = personal(0x0E, "bob");
    let to_bob = [recipient_of(&bob, "bob")];
    let coder = SealedCoder::new(&alice, &to_bob, NETWORK);

    let plaintext = b"same input".to_vec();
    let a = coder.encrypt(&plaintext)?;
    let b = coder.encrypt(&plaintext)?;
    assert_ne!(a, b);

    let bob_coder = SealedCoder::new(&bob, &[], NETWORK);
    assert_eq!(bob_coder.decrypt(&a)?, plaintext);
    assert_eq!(bob_coder.decrypt(&b)?, plaintext);
    Ok(())
}

#[test]
fn empty_recipient_list_fails_encrypt() {
    let alice = personal(0x0F, "alice");
    let coder = SealedCoder::new(&alice, &[], NETWORK);
    assert!(matches!(
        coder.encrypt_text("to nobody"),
        Err(SealchatError::InvalidEnvelope { .. })
    ));
}

#[test]
fn sender_signature_is_verifiable_but_not_enforced() -> Result<()> {
    let alice = personal(0x10, "alice");
    let bob = personal(0x11, "bob");
    let eve = personal(0x12, "eve");

    // The decrypt path never checks the signature; the capability is
    // exercised on the signed literal stream directly.
    let stream = sealchat_coder::literal::write_signed_literal(
        b"From: alice@example.net\n\nhi",
        alice.signing_keypair(),
    )?;
    verify_literal_signature(&stream, &alice.signing_keypair().public_key())?;
    assert!(verify_literal_signature(&stream, &eve.signing_keypair().public_key()).is_err());

    // And a packet sealed over that stream still opens without any
    // signature check involving alice's public key.
    let packet = seal_for_recipients(&compress(&stream)?, &[recipient_of(&bob, "bob")])?;
    let envelope = SealedCoder::new(&bob, &[], NETWORK).decrypt(&packet)?;
    assert_eq!(envelope, b"From: alice@example.net\n\nhi");
    Ok(())
}

#[test]
fn garbage_packet_is_malformed_not_a_panic() {
    let bob = personal(0x13, "bob");
    let coder = SealedCoder::new(&bob, &[], NETWORK);

    for garbage in [&b""[..], &[0xFFu8; 3][..], &[0x01u8; 64][..]] {
        let result = coder.decrypt(garbage);
        assert!(matches!(
            result,
            Err(SealchatError::MalformedPacket { .. })
        ));
    }
}
