//! Wire protocol between the coordinator and its agents.
//!
//! Two messages, fixed layout, no length prefix, no type tag. Which message
//! is on the wire is implied by direction and turn: the coordinator sends a
//! [`WorldView`], the agent answers with exactly one [`MoveRequest`], and
//! only then does the coordinator send the next view.
//!
//! Every field is a 32-bit signed little-endian integer:
//!
//! ```text
//! WorldView   (52 bytes)  pos.x pos.y adv.x adv.y count obj[0..4].{x,y}
//! MoveRequest ( 8 bytes)  dest.x dest.y
//! ```
//!
//! Object slots at or after `count` are written as zero and ignored on read.

use crate::error::ProtocolError;
use crate::types::Coordinate;
use std::io::{self, Read, Write};

/// Capacity of the blocked-neighbor list in a [`WorldView`].
pub const MAX_OBJECTS: usize = 4;

/// Encoded size of a [`WorldView`].
pub const WORLD_VIEW_LEN: usize = 4 * (5 + 2 * MAX_OBJECTS);

/// Encoded size of a [`MoveRequest`].
pub const MOVE_REQUEST_LEN: usize = 8;

/// Coordinator → agent snapshot of what one unit can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldView {
    /// The receiving unit's current cell.
    pub position: Coordinate,
    /// Closest live adversary.
    pub adversary: Coordinate,
    objects: [Coordinate; MAX_OBJECTS],
    count: usize,
}

impl WorldView {
    /// Build a view. Objects beyond [`MAX_OBJECTS`] are dropped.
    pub fn new(position: Coordinate, adversary: Coordinate, objects: &[Coordinate]) -> Self {
        let count = objects.len().min(MAX_OBJECTS);
        let mut slots = [Coordinate::default(); MAX_OBJECTS];
        slots[..count].copy_from_slice(&objects[..count]);
        Self {
            position,
            adversary,
            objects: slots,
            count,
        }
    }

    /// Blocked neighbor cells (obstacles and allies).
    pub fn objects(&self) -> &[Coordinate] {
        &self.objects[..self.count]
    }

    pub fn is_blocked(&self, cell: Coordinate) -> bool {
        self.objects().contains(&cell)
    }

    pub fn encode(&self) -> [u8; WORLD_VIEW_LEN] {
        let mut buf = [0u8; WORLD_VIEW_LEN];
        let mut w = FieldWriter::new(&mut buf);
        w.coordinate(self.position);
        w.coordinate(self.adversary);
        // count <= MAX_OBJECTS, always fits
        w.int(self.count as i32);
        for slot in &self.objects {
            w.coordinate(*slot);
        }
        buf
    }

    pub fn decode(buf: &[u8; WORLD_VIEW_LEN]) -> Result<Self, ProtocolError> {
        let mut r = FieldReader::new(buf);
        let position = r.coordinate();
        let adversary = r.coordinate();
        let raw_count = r.int();
        let count = usize::try_from(raw_count)
            .ok()
            .filter(|c| *c <= MAX_OBJECTS)
            .ok_or(ProtocolError::InvalidObjectCount(raw_count))?;

        let mut objects = [Coordinate::default(); MAX_OBJECTS];
        for (i, slot) in objects.iter_mut().enumerate() {
            let c = r.coordinate();
            if i < count {
                *slot = c;
            }
        }

        Ok(Self {
            position,
            adversary,
            objects,
            count,
        })
    }

    /// Read one view from a blocking stream.
    ///
    /// Returns `Ok(None)` if the stream ends cleanly before the first byte.
    pub fn read_from<R: Read>(reader: &mut R) -> crate::error::Result<Option<Self>> {
        let mut buf = [0u8; WORLD_VIEW_LEN];
        if !read_message(reader, &mut buf)? {
            return Ok(None);
        }
        Ok(Some(Self::decode(&buf)?))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encode())?;
        writer.flush()
    }
}

/// Agent → coordinator: the single cell the agent wants to occupy next.
///
/// A destination equal to the agent's own cell means "stay".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveRequest {
    pub destination: Coordinate,
}

impl MoveRequest {
    pub fn new(destination: Coordinate) -> Self {
        Self { destination }
    }

    pub fn encode(&self) -> [u8; MOVE_REQUEST_LEN] {
        let mut buf = [0u8; MOVE_REQUEST_LEN];
        FieldWriter::new(&mut buf).coordinate(self.destination);
        buf
    }

    pub fn decode(buf: &[u8; MOVE_REQUEST_LEN]) -> Self {
        Self {
            destination: FieldReader::new(buf).coordinate(),
        }
    }

    /// Read one request from a blocking stream.
    ///
    /// Returns `Ok(None)` if the stream ends cleanly before the first byte.
    pub fn read_from<R: Read>(reader: &mut R) -> crate::error::Result<Option<Self>> {
        let mut buf = [0u8; MOVE_REQUEST_LEN];
        if !read_message(reader, &mut buf)? {
            return Ok(None);
        }
        Ok(Some(Self::decode(&buf)))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.encode())?;
        writer.flush()
    }
}

/// Fill `buf` completely. `Ok(false)` on EOF before any byte was read.
fn read_message<R: Read>(reader: &mut R, buf: &mut [u8]) -> crate::error::Result<bool> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(false),
            Ok(0) => {
                return Err(ProtocolError::Truncated {
                    read: filled,
                    expected: buf.len(),
                }
                .into())
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(true)
}

struct FieldWriter<'a> {
    buf: &'a mut [u8],
    at: usize,
}

impl<'a> FieldWriter<'a> {
    fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, at: 0 }
    }

    fn int(&mut self, v: i32) {
        self.buf[self.at..self.at + 4].copy_from_slice(&v.to_le_bytes());
        self.at += 4;
    }

    fn coordinate(&mut self, c: Coordinate) {
        self.int(c.x);
        self.int(c.y);
    }
}

struct FieldReader<'a> {
    buf: &'a [u8],
    at: usize,
}

impl<'a> FieldReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, at: 0 }
    }

    fn int(&mut self) -> i32 {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.buf[self.at..self.at + 4]);
        self.at += 4;
        i32::from_le_bytes(bytes)
    }

    fn coordinate(&mut self) -> Coordinate {
        let x = self.int();
        let y = self.int();
        Coordinate::new(x, y)
    }
}
