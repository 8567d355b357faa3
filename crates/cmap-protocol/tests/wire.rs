//! Byte-exact checks of the envelopes a remote replica will see

use cmap_core::Primitive;
use cmap_protocol::{MapOperation, MapResponse, OperationCodec, OperationType, ResponseCodec};

#[test]
fn contains_key_envelope_bytes() {
    let codec = OperationCodec::new();
    let bytes = codec.encode(&MapOperation::contains_key("id")).unwrap();

    // tag, string kind, length, UTF-8
    assert_eq!(&bytes[..], &[3u8, 9, 0, 0, 0, 2, b'i', b'd'][..]);
}

#[test]
fn contains_key_decodes_from_hand_written_bytes() {
    let codec = OperationCodec::new();
    let bytes = [3u8, 6, 0, 0, 0, 0, 0, 0, 0, 42];

    let op = codec.decode_slice(&bytes).unwrap();
    assert_eq!(op.operation_type(), OperationType::ContainsKey);
    assert_eq!(op.key(), Some(&Primitive::Long(42)));
}

#[test]
fn conditional_replace_envelope_bytes() {
    let codec = OperationCodec::new();
    let op = MapOperation::conditional_replace(1i32, true, Primitive::Null);

    assert_eq!(
        &codec.encode(&op).unwrap()[..],
        &[14u8, 5, 0, 0, 0, 1, 1, 1, 0][..]
    );
}

#[test]
fn put_all_envelope_bytes() {
    let codec = OperationCodec::new();
    let op = MapOperation::put_all(vec![(1i8, 2i16)]);

    assert_eq!(
        &codec.encode(&op).unwrap()[..],
        &[6u8, 0, 0, 0, 1, 2, 1, 3, 0, 2][..]
    );
}

#[test]
fn empty_payload_operations_are_one_byte() {
    let codec = OperationCodec::new();
    for op in [
        MapOperation::Clear,
        MapOperation::KeySet,
        MapOperation::Values,
        MapOperation::EntrySet,
        MapOperation::Size,
    ] {
        let bytes = codec.encode(&op).unwrap();
        assert_eq!(&bytes[..], &[op.operation_type().as_u8()][..]);
    }
}

#[test]
fn request_and_reply_share_a_stream() {
    let ops = OperationCodec::new();
    let responses = ResponseCodec::new();

    let mut wire = Vec::new();
    ops.write_to(&MapOperation::contains_key("k"), &mut wire).unwrap();
    responses.write_to(&MapResponse::boolean(true), &mut wire).unwrap();

    let mut reader = &wire[..];
    let op = ops.decode(&mut reader).unwrap();
    let reply = responses.decode(&mut reader).unwrap();
    assert!(reader.is_empty());
    assert!(reply.answers(&op));
}
