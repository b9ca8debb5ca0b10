mod common;

use common::HANDSHAKE;
use ppk_rs::{Handshake, PpkError};

#[test]
fn test_parse_production_handshake() {
    let handshake = Handshake::parse(HANDSHAKE).unwrap();
    assert_eq!(handshake.production_resistors.lo, 10.0);
    assert_eq!(handshake.production_resistors.mid, 1.0);
    assert_eq!(handshake.production_resistors.hi, 0.1);
    assert_eq!(handshake.board_id, "PCA123");
    assert_eq!(handshake.vref_hi, 1000);
    assert_eq!(handshake.vref_lo, 500);
    assert_eq!(handshake.vdd_mv, 3000);
    assert!(handshake.user_resistors.is_none());
    assert_eq!(handshake.effective_resistors().lo, 10.0);
}

#[test]
fn test_user_set_section_overrides_production() {
    let blob = "R1:10.0 R2:1.0 R3:0.1 Board ID PCA123 \
                USER SET R1:11.5 R2:1.2 R3:0.09 \
                Refs HI: 900 LO: 400 VDD: 3300";
    let handshake = Handshake::parse(blob).unwrap();
    assert_eq!(handshake.production_resistors.lo, 10.0);
    let user = handshake.user_resistors.unwrap();
    assert_eq!(user.lo, 11.5);
    assert_eq!(user.mid, 1.2);
    assert_eq!(user.hi, 0.09);
    assert_eq!(handshake.effective_resistors(), user);
    assert_eq!(handshake.vdd_mv, 3300);
}

#[test]
fn test_nul_padded_fixed_size_read() {
    let mut blob = String::from(HANDSHAKE);
    blob.push_str("\0\0\0\0\0\0");
    let handshake = Handshake::parse(&blob).unwrap();
    assert_eq!(handshake.vdd_mv, 3000);
}

#[test]
fn test_missing_refs_section_is_fatal() {
    let blob = "R1:10.0 R2:1.0 R3:0.1 Board ID PCA123";
    assert!(matches!(
        Handshake::parse(blob),
        Err(PpkError::Handshake(_))
    ));
}

#[test]
fn test_unparsable_resistance_is_fatal() {
    let blob = "R1:abc R2:1.0 R3:0.1 Board ID PCA123 Refs HI: 1000 LO: 500 VDD: 3000";
    assert!(matches!(
        Handshake::parse(blob),
        Err(PpkError::Handshake(_))
    ));
}

#[test]
fn test_missing_board_id_is_fatal() {
    let blob = "R1:10.0 R2:1.0 R3:0.1 Refs HI: 1000 LO: 500 VDD: 3000";
    assert!(matches!(
        Handshake::parse(blob),
        Err(PpkError::Handshake(_))
    ));
}
