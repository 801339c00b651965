use bytes::{BufMut, Bytes, BytesMut};

/// Deterministic binary encoding used to derive transaction ids and block hashes.
/// All integers are written little endian.
pub trait Encodable {
    fn encode(&self, buf: &mut BytesMut);

    /// Encoded size in bytes, used to reserve the buffer up front
    fn encoded_len(&self) -> usize;

    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}

impl Encodable for u8 {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(*self);
    }

    fn encoded_len(&self) -> usize {
        1
    }
}

impl Encodable for u32 {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u32_le(*self);
    }

    fn encoded_len(&self) -> usize {
        4
    }
}

impl Encodable for u64 {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64_le(*self);
    }

    fn encoded_len(&self) -> usize {
        8
    }
}

impl<T: Encodable> Encodable for Option<T> {
    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Some(value) => {
                buf.put_u8(1);
                value.encode(buf);
            }
            None => buf.put_u8(0),
        }
    }

    fn encoded_len(&self) -> usize {
        1 + self.as_ref().map_or(0, |value| value.encoded_len())
    }
}
