use std::str;

use crate::error::BufferError;
use crate::types::{DnsReadBuffer, DnsWriteBuffer};

/// Longest label allowed on the wire.
pub const MAX_LABEL_LEN: usize = 63;
/// Longest encoded name allowed on the wire, length bytes included.
pub const MAX_NAME_LEN: usize = 255;
/// How many compression pointers a single name may chain through.
pub const MAX_POINTER_DEPTH: usize = 16;

const POINTER_TAG: u8 = 0b1100_0000;

impl<'a> DnsReadBuffer<'a> {
    /// Creates a new `DnsReadBuffer` to read from the given byte slice.
    ///
    /// # Arguments
    /// * `data` - The byte slice containing DNS message data.
    ///
    /// # Returns
    /// A new `DnsReadBuffer` instance with read index set to 0.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, index: 0 }
    }

    /// Returns the current read index.
    pub fn get_index(&self) -> usize {
        self.index
    }

    /// Sets the read index to the specified offset.
    ///
    /// The offset may equal the buffer length (nothing left to read) but
    /// not exceed it.
    ///
    /// # Errors
    /// Returns `BufferError::EndOfBuffer` if the offset is past the end.
    pub fn set_index(&mut self, off: usize) -> Result<&mut Self, BufferError> {
        if off > self.data.len() {
            return Err(BufferError::EndOfBuffer(off));
        }
        self.index = off;
        Ok(self)
    }

    /// Reads a single byte (`u8`) from the buffer.
    ///
    /// # Errors
    /// Returns `BufferError::EndOfBuffer` if reading beyond available data.
    pub fn read_u8(&mut self) -> Result<u8, BufferError> {
        self.data
            .get(self.index)
            .copied()
            .ok_or(BufferError::EndOfBuffer(self.index))
            .map(|b| {
                self.index += 1;
                b
            })
    }

    /// Reads a big-endian `u16` from the buffer.
    ///
    /// # Errors
    /// Returns `BufferError::EndOfBuffer` if reading beyond available data.
    pub fn read_u16(&mut self) -> Result<u16, BufferError> {
        self.data
            .get(self.index..self.index + 2)
            .ok_or(BufferError::EndOfBuffer(self.index))
            .map(|b| {
                self.index += 2;
                u16::from_be_bytes([b[0], b[1]])
            })
    }

    /// Reads a big-endian `u32` from the buffer.
    ///
    /// # Errors
    /// Returns `BufferError::EndOfBuffer` if reading beyond available data.
    pub fn read_u32(&mut self) -> Result<u32, BufferError> {
        self.data
            .get(self.index..self.index + 4)
            .ok_or(BufferError::EndOfBuffer(self.index))
            .map(|b| {
                self.index += 4;
                u32::from_be_bytes([b[0], b[1], b[2], b[3]])
            })
    }

    /// Reads `n` bytes from the buffer as a slice.
    ///
    /// # Errors
    /// Returns `BufferError::EndOfBuffer` if fewer than `n` bytes remain.
    pub fn read_n_bytes(&mut self, n: usize) -> Result<&'a [u8], BufferError> {
        self.data
            .get(self.index..self.index + n)
            .ok_or(BufferError::EndOfBuffer(self.index))
            .map(|b| {
                self.index += n;
                b
            })
    }

    /// Reads a DNS domain name from the buffer, supporting pointer compression.
    ///
    /// On return the read index sits right after the name as it appears at
    /// the current position: after its terminating zero byte, or after the
    /// two pointer bytes if the name ends in a pointer.
    ///
    /// # Errors
    /// Returns `BufferError::EndOfBuffer` if buffer ends unexpectedly,
    /// `InvalidPointer`/`PointerLoop` for bad compression pointers and
    /// `InvalidLabel` for labels that are not UTF-8.
    pub fn read_str(&mut self) -> Result<String, BufferError> {
        let (name, next) = read_name_at(self.data, self.index)?;
        self.index = next;
        Ok(name)
    }
}

/// Decodes the name starting at `idx` in `data`.
///
/// Returns `(decoded_name, next_index_after_name)`. The root name decodes
/// as `"."`.
pub fn read_name_at(data: &[u8], idx: usize) -> Result<(String, usize), BufferError> {
    let mut labels = Vec::new();
    let next = collect_labels(data, idx, 0, &mut labels)?;

    let name = if labels.is_empty() {
        ".".to_string()
    } else {
        labels.join(".")
    };
    Ok((name, next))
}

/// Pushes the labels found at `idx` onto `labels`, following at most one
/// pointer at this level, and returns the index just past the name.
fn collect_labels(
    data:   &[u8],
    mut idx: usize,
    depth:  usize,
    labels: &mut Vec<String>,
) -> Result<usize, BufferError> {
    loop {
        let len = *data.get(idx).ok_or(BufferError::EndOfBuffer(idx))?;
        idx += 1;

        // Pointer: the low 14 bits of this byte pair are an offset
        if (len & POINTER_TAG) == POINTER_TAG {
            let b2 = *data.get(idx).ok_or(BufferError::EndOfBuffer(idx))?;
            idx += 1;

            let pointer = (((len & !POINTER_TAG) as usize) << 8) | (b2 as usize);
            if pointer >= data.len() {
                return Err(BufferError::InvalidPointer(pointer));
            }
            if depth >= MAX_POINTER_DEPTH {
                return Err(BufferError::PointerLoop(MAX_POINTER_DEPTH));
            }

            // The pointed-to name finishes this one; where it ends does not
            // matter to the caller, only where the pointer ends.
            collect_labels(data, pointer, depth + 1, labels)?;
            return Ok(idx);
        }

        if len == 0 {
            return Ok(idx);
        }

        let end = idx + len as usize;
        let label_bytes = data.get(idx..end).ok_or(BufferError::EndOfBuffer(idx))?;
        let label = str::from_utf8(label_bytes).map_err(|_| BufferError::InvalidLabel(idx))?;
        labels.push(label.to_string());
        idx = end;
    }
}

/// Splits a text-form name into its labels, validating them for the wire.
///
/// A single trailing dot is ignored; `""` and `"."` are the root name and
/// yield no labels.
pub fn split_labels(name: &str) -> Result<Vec<&str>, BufferError> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    if !trimmed.is_ascii() {
        return Err(BufferError::NonAsciiName(name.to_string()));
    }

    let labels: Vec<&str> = trimmed.split('.').collect();
    let mut wire_len = 1;
    for label in &labels {
        if label.is_empty() {
            return Err(BufferError::EmptyLabel(name.to_string()));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(BufferError::LabelTooLong(label.to_string()));
        }
        wire_len += 1 + label.len();
    }
    if wire_len > MAX_NAME_LEN {
        return Err(BufferError::NameTooLong(name.to_string()));
    }
    Ok(labels)
}

impl DnsWriteBuffer {
    /// Creates a new empty `DnsWriteBuffer`.
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Writes a single byte to the buffer.
    pub fn write_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    /// Writes a 16-bit unsigned integer in big-endian order to the buffer.
    pub fn write_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a 32-bit unsigned integer in big-endian order to the buffer.
    pub fn write_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes raw bytes to the buffer.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Consumes the buffer and returns the inner byte vector.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    /// Writes a DNS domain name to the buffer, without compression.
    ///
    /// Each label is written preceded by its length, followed by a
    /// zero-length byte to terminate the name. The whole name is validated
    /// first, so nothing is written when it is rejected.
    ///
    /// # Errors
    /// Returns `BufferError::LabelTooLong` if any label exceeds 63 bytes,
    /// and `EmptyLabel`, `NonAsciiName` or `NameTooLong` for the other
    /// malformed names.
    pub fn write_str(&mut self, name: &str) -> Result<(), BufferError> {
        for label in split_labels(name)? {
            self.write_u8(label.len() as u8);
            self.write_bytes(label.as_bytes());
        }
        self.write_u8(0);
        Ok(())
    }
}
