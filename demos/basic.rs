//! Basic cmap Example
//!
//! Encodes a few map operations as a sending replica would, decodes them on
//! the "remote" side, and stamps each with an ordering sequence.
//!
//! Run with: cargo run --example basic

use cmap_core::{Primitive, PrimitiveCodec};
use cmap_protocol::{
    MapOperation, MapResponse, OperationCodec, ProtocolError, ResponseCodec, ResponseType,
};
use cmap_sequence::{CyclicRangeCounter, FlakeSequenceGenerator};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("cmap Basic Example\n");

    println!("=== Operation Envelopes ===\n");
    envelope_example()?;

    println!("\n=== Sequence Stamps ===\n");
    sequence_example()?;

    Ok(())
}

fn envelope_example() -> anyhow::Result<()> {
    let ops = OperationCodec::new();
    let responses = ResponseCodec::new();
    let stamps = FlakeSequenceGenerator::new(1)?;

    let outgoing = vec![
        MapOperation::put("user:alice", "Alice"),
        MapOperation::contains_key("user:alice"),
        MapOperation::conditional_replace("user:alice", "Alice", "Alice B."),
        MapOperation::Size,
    ];

    // Sending side: everything goes onto one byte stream
    let mut wire = Vec::new();
    for op in &outgoing {
        let stamp = stamps.next_sequence();
        ops.write_to(op, &mut wire)?;
        info!(op = %op.operation_type(), %stamp, "sent operation");
    }
    println!("Encoded {} operations into {} bytes", outgoing.len(), wire.len());

    // Receiving side
    let mut reader = &wire[..];
    while !reader.is_empty() {
        let op = ops.decode(&mut reader)?;
        println!("Decoded: {:?}", op);

        let reply = match op.operation_type().response_type() {
            Some(ResponseType::Value) => MapResponse::absent(),
            Some(ResponseType::Boolean) => MapResponse::boolean(true),
            Some(ResponseType::Size) => MapResponse::size(1),
            Some(_) | None => continue,
        };
        let bytes = responses.encode(&reply)?;
        println!("  reply {:?} -> {} bytes", reply, bytes.len());
    }

    // A tag the receiver does not know is refused, not guessed at
    match ops.decode_slice(&[0x7F, 0, 0]) {
        Err(ProtocolError::UnknownOperationType(tag)) => {
            warn!(tag, "refused unknown operation tag");
        }
        other => anyhow::bail!("unexpected decode result: {:?}", other),
    }

    // Opaque values outside the primitive kinds never reach the wire
    let mut out = Vec::new();
    let unsupported: Vec<String> = vec!["nested".into()];
    if let Err(e) = PrimitiveCodec::new().encode_any(&unsupported, &mut out) {
        println!("Rejected value: {} ({} bytes written)", e, out.len());
    }
    println!("Key kind: {}", Primitive::from("user:alice").kind());

    Ok(())
}

fn sequence_example() -> anyhow::Result<()> {
    let counter = CyclicRangeCounter::new(0, 3)?;
    let values: Vec<i64> = (0..10).map(|_| counter.get_and_increment()).collect();
    println!("Counter [0, 3]: {:?}", values);

    if let Err(e) = CyclicRangeCounter::new(5, 3) {
        println!("Rejected range: {}", e);
    }

    Ok(())
}
