// SPDX-License-Identifier: MIT

//! Binary append/parse of [`Determinant`]s within a `VertexCausalLog`
//! segment. Determinants are appended back-to-back; decoding walks the
//! concatenated byte string one tagged record at a time.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use causalrt_core::{Determinant, TimerId};

use crate::error::WireError;

const TAG_ORDER: u8 = 0;
const TAG_TIMER: u8 = 1;
const TAG_RNG: u8 = 2;
const TAG_SERIALIZABLE: u8 = 3;

/// Stateless append/parse codec for the determinant byte stream.
pub struct DeterminantEncoder;

impl DeterminantEncoder {
    /// Append the wire encoding of `d` to `out`.
    pub fn encode(out: &mut BytesMut, d: &Determinant) {
        match d {
            Determinant::OrderDeterminant { channel_index } => {
                out.put_u8(TAG_ORDER);
                out.put_u8(*channel_index);
            }
            Determinant::TimerDeterminant { timer_id } => {
                out.put_u8(TAG_TIMER);
                out.put_u64(timer_id.0);
            }
            Determinant::RngDeterminant { value } => {
                out.put_u8(TAG_RNG);
                out.put_u64(*value);
            }
            Determinant::SerializableDeterminant { payload } => {
                out.put_u8(TAG_SERIALIZABLE);
                out.put_u32(payload.len() as u32);
                out.put_slice(payload);
            }
        }
    }

    /// Decode a single determinant from the front of `buf`, advancing it
    /// past the consumed bytes.
    pub fn decode_one(buf: &mut Bytes) -> Result<Determinant, WireError> {
        if buf.is_empty() {
            return Err(WireError::UnexpectedEof("determinant tag"));
        }
        let tag = buf.get_u8();
        match tag {
            TAG_ORDER => {
                if buf.is_empty() {
                    return Err(WireError::UnexpectedEof("order channel_index"));
                }
                Ok(Determinant::OrderDeterminant { channel_index: buf.get_u8() })
            }
            TAG_TIMER => {
                if buf.remaining() < 8 {
                    return Err(WireError::UnexpectedEof("timer id"));
                }
                Ok(Determinant::TimerDeterminant { timer_id: TimerId(buf.get_u64()) })
            }
            TAG_RNG => {
                if buf.remaining() < 8 {
                    return Err(WireError::UnexpectedEof("rng value"));
                }
                Ok(Determinant::RngDeterminant { value: buf.get_u64() })
            }
            TAG_SERIALIZABLE => {
                if buf.remaining() < 4 {
                    return Err(WireError::UnexpectedEof("serializable length"));
                }
                let len = buf.get_u32();
                if (len as usize) > buf.remaining() {
                    return Err(WireError::PayloadTooLong(len));
                }
                let payload = buf.copy_to_bytes(len as usize).to_vec();
                Ok(Determinant::SerializableDeterminant { payload })
            }
            other => Err(WireError::UnknownDeterminantTag(other)),
        }
    }

    /// Decode every determinant in `bytes`, in append order.
    pub fn decode_all(bytes: &[u8]) -> Result<Vec<Determinant>, WireError> {
        let mut buf = Bytes::copy_from_slice(bytes);
        let mut out = Vec::new();
        while !buf.is_empty() {
            out.push(Self::decode_one(&mut buf)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
#[path = "encoder_tests.rs"]
mod tests;
