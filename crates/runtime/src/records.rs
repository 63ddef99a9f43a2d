// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-size bookkeeping records stored in the arena tail.
//!
//! After allocation the engine keeps no per-tensor heap state. Everything
//! it needs to run the graph lives in three tables carved from the arena:
//!
//! ```text
//! tensor table: one 32-byte record per tensor
//!   0      dtype code
//!   1      storage (0 = arena, 1 = descriptor constant)
//!   2      rank
//!   3      flags (bit 0 graph input, bit 1 graph output)
//!   4..8   offset (u32, arena offset or blob offset)
//!   8..12  byte length (u32)
//!   12..28 dims (4 × u32)
//!   28..32 reserved
//!
//! node table: one 16-byte record per op
//!   0      opcode
//!   1      fused activation code
//!   2      input count
//!   3      output count
//!   4..10  input tensor indices (3 × u16)
//!   10..12 output tensor index (u16)
//!   12..16 reserved
//!
//! io table: graph input indices then graph output indices (u16 each)
//! ```
//!
//! All integers are little-endian.

use memory_manager::{Arena, ArenaRegion};
use model_ir::{OpKind, MAX_TENSORS, MAX_TENSOR_BYTES};
use tensor_core::{DType, Dims, MAX_RANK};

pub(crate) const TENSOR_RECORD_BYTES: usize = 32;
pub(crate) const NODE_RECORD_BYTES: usize = 16;
pub(crate) const IO_ENTRY_BYTES: usize = 2;

/// Maximum operands per op.
pub const MAX_NODE_INPUTS: usize = 3;

const FLAG_INPUT: u8 = 0b01;
const FLAG_OUTPUT: u8 = 0b10;

// Validated graphs never exceed these, so tensor indices always fit the
// u16 node and io fields and tensor lengths the u32 length field.
const _: () = assert!(MAX_TENSORS <= u16::MAX as usize + 1);
const _: () = assert!(MAX_TENSOR_BYTES <= u32::MAX as usize);

/// A bookkeeping record could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("{table} index {index} out of range ({count} entries)")]
    OutOfRange {
        table: &'static str,
        index: usize,
        count: usize,
    },

    #[error("corrupt {table} record #{index}")]
    Corrupt { table: &'static str, index: usize },

    #[error("{table} record #{index}: {field} {value} does not fit its field")]
    FieldOverflow {
        table: &'static str,
        index: usize,
        field: &'static str,
        value: usize,
    },
}

/// Narrows `value` to a record field, reporting which field overflowed.
fn narrow<T: TryFrom<usize>>(
    value: usize,
    table: &'static str,
    index: usize,
    field: &'static str,
) -> Result<T, RecordError> {
    T::try_from(value).map_err(|_| RecordError::FieldOverflow {
        table,
        index,
        field,
        value,
    })
}

/// Encodes one io table entry.
pub(crate) fn encode_io_entry(
    tensor: usize,
    index: usize,
    out: &mut [u8],
) -> Result<(), RecordError> {
    let tensor: u16 = narrow(tensor, "io", index, "tensor index")?;
    out.copy_from_slice(&tensor.to_le_bytes());
    Ok(())
}

/// Where a tensor's bytes live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Storage {
    Arena,
    Constant,
}

/// Decoded tensor record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct TensorRecord {
    pub dtype: DType,
    pub storage: Storage,
    pub dims: Dims,
    pub is_input: bool,
    pub is_output: bool,
    pub offset: usize,
    pub len: usize,
}

impl TensorRecord {
    pub fn region(&self) -> ArenaRegion {
        ArenaRegion::new(self.offset, self.len)
    }

    /// Writes the record for tensor `index`. Fails without touching `out`
    /// if the offset, length or a dim does not fit in a `u32`.
    pub fn encode(&self, out: &mut [u8], index: usize) -> Result<(), RecordError> {
        let offset: u32 = narrow(self.offset, "tensor", index, "offset")?;
        let len: u32 = narrow(self.len, "tensor", index, "length")?;
        let mut dims = [0u32; MAX_RANK];
        for (slot, &d) in dims.iter_mut().zip(self.dims.as_slice()) {
            *slot = narrow(d, "tensor", index, "dim")?;
        }

        out.fill(0);
        out[0] = self.dtype.code();
        out[1] = match self.storage {
            Storage::Arena => 0,
            Storage::Constant => 1,
        };
        out[2] = self.dims.rank() as u8;
        out[3] = (if self.is_input { FLAG_INPUT } else { 0 })
            | (if self.is_output { FLAG_OUTPUT } else { 0 });
        out[4..8].copy_from_slice(&offset.to_le_bytes());
        out[8..12].copy_from_slice(&len.to_le_bytes());
        for (i, d) in dims.iter().take(self.dims.rank()).enumerate() {
            let at = 12 + i * 4;
            out[at..at + 4].copy_from_slice(&d.to_le_bytes());
        }
        Ok(())
    }

    pub fn decode(bytes: &[u8], index: usize) -> Result<Self, RecordError> {
        let corrupt = RecordError::Corrupt {
            table: "tensor",
            index,
        };
        if bytes.len() != TENSOR_RECORD_BYTES {
            return Err(corrupt);
        }
        let dtype = DType::from_code(bytes[0]).ok_or(corrupt)?;
        let storage = match bytes[1] {
            0 => Storage::Arena,
            1 => Storage::Constant,
            _ => return Err(corrupt),
        };
        let rank = bytes[2] as usize;
        if rank > MAX_RANK {
            return Err(corrupt);
        }
        let mut dims = [0usize; MAX_RANK];
        for (i, d) in dims.iter_mut().enumerate().take(rank) {
            *d = read_u32(bytes, 12 + i * 4) as usize;
        }
        let dims = Dims::new(&dims[..rank]).map_err(|_| corrupt)?;

        Ok(Self {
            dtype,
            storage,
            dims,
            is_input: bytes[3] & FLAG_INPUT != 0,
            is_output: bytes[3] & FLAG_OUTPUT != 0,
            offset: read_u32(bytes, 4) as usize,
            len: read_u32(bytes, 8) as usize,
        })
    }
}

/// Decoded node record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub kind: OpKind,
    inputs: [u16; MAX_NODE_INPUTS],
    num_inputs: usize,
    output: u16,
}

impl Node {
    /// Builds the record for node `index`.
    pub(crate) fn new(
        index: usize,
        kind: OpKind,
        inputs: &[usize],
        output: usize,
    ) -> Result<Self, RecordError> {
        let mut slots = [0u16; MAX_NODE_INPUTS];
        for (slot, &t) in slots.iter_mut().zip(inputs) {
            *slot = narrow(t, "node", index, "input tensor")?;
        }
        Ok(Self {
            kind,
            inputs: slots,
            num_inputs: inputs.len().min(MAX_NODE_INPUTS),
            output: narrow(output, "node", index, "output tensor")?,
        })
    }

    /// Operand tensor indices.
    pub fn inputs(&self) -> [usize; MAX_NODE_INPUTS] {
        self.inputs.map(usize::from)
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    /// Result tensor index.
    pub fn output(&self) -> usize {
        self.output as usize
    }

    pub(crate) fn encode(&self, out: &mut [u8]) {
        out.fill(0);
        out[0] = self.kind.code();
        out[1] = self.kind.activation().code();
        out[2] = self.num_inputs as u8;
        out[3] = 1;
        for (i, &t) in self.inputs.iter().enumerate() {
            let at = 4 + i * 2;
            out[at..at + 2].copy_from_slice(&t.to_le_bytes());
        }
        out[10..12].copy_from_slice(&self.output.to_le_bytes());
    }

    pub(crate) fn decode(bytes: &[u8], index: usize) -> Result<Self, RecordError> {
        let corrupt = RecordError::Corrupt {
            table: "node",
            index,
        };
        if bytes.len() != NODE_RECORD_BYTES {
            return Err(corrupt);
        }
        let kind = OpKind::from_code(bytes[0], bytes[1]).ok_or(corrupt)?;
        let num_inputs = bytes[2] as usize;
        if num_inputs > MAX_NODE_INPUTS || bytes[3] != 1 {
            return Err(corrupt);
        }
        let mut inputs = [0u16; MAX_NODE_INPUTS];
        for (i, slot) in inputs.iter_mut().enumerate() {
            *slot = read_u16(bytes, 4 + i * 2);
        }
        Ok(Self {
            kind,
            inputs,
            num_inputs,
            output: read_u16(bytes, 10),
        })
    }
}

/// Locations and sizes of the three bookkeeping tables.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tables {
    pub tensors: ArenaRegion,
    pub nodes: ArenaRegion,
    pub io: ArenaRegion,
    pub num_tensors: usize,
    pub num_nodes: usize,
    pub num_inputs: usize,
    pub num_outputs: usize,
}

impl Tables {
    pub fn tensor(&self, arena: &Arena, index: usize) -> Result<TensorRecord, RecordError> {
        let bytes = entry(arena, self.tensors, "tensor", index, self.num_tensors, TENSOR_RECORD_BYTES)?;
        TensorRecord::decode(bytes, index)
    }

    pub fn node(&self, arena: &Arena, index: usize) -> Result<Node, RecordError> {
        let bytes = entry(arena, self.nodes, "node", index, self.num_nodes, NODE_RECORD_BYTES)?;
        Node::decode(bytes, index)
    }

    pub fn input(&self, arena: &Arena, index: usize) -> Result<usize, RecordError> {
        let bytes = entry(arena, self.io, "input", index, self.num_inputs, IO_ENTRY_BYTES)?;
        Ok(read_u16(bytes, 0) as usize)
    }

    pub fn output(&self, arena: &Arena, index: usize) -> Result<usize, RecordError> {
        if index >= self.num_outputs {
            return Err(RecordError::OutOfRange {
                table: "output",
                index,
                count: self.num_outputs,
            });
        }
        let bytes = entry(
            arena,
            self.io,
            "output",
            self.num_inputs + index,
            self.num_inputs + self.num_outputs,
            IO_ENTRY_BYTES,
        )?;
        Ok(read_u16(bytes, 0) as usize)
    }
}

fn entry<'b>(
    arena: &'b Arena,
    table: ArenaRegion,
    name: &'static str,
    index: usize,
    count: usize,
    size: usize,
) -> Result<&'b [u8], RecordError> {
    if index >= count {
        return Err(RecordError::OutOfRange {
            table: name,
            index,
            count,
        });
    }
    table
        .subregion(index * size, size)
        .and_then(|r| arena.bytes(r).ok())
        .ok_or(RecordError::Corrupt { table: name, index })
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
mod tests {
    use super::*;
    use memory_manager::ArenaCapacity;
    use tensor_core::Activation;

    fn record() -> TensorRecord {
        TensorRecord {
            dtype: DType::F32,
            storage: Storage::Arena,
            dims: Dims::new(&[1, 16]).unwrap(),
            is_input: false,
            is_output: true,
            offset: 64,
            len: 64,
        }
    }

    #[test]
    fn test_tensor_record_layout() {
        let mut bytes = [0xffu8; TENSOR_RECORD_BYTES];
        record().encode(&mut bytes, 0).unwrap();
        assert_eq!(bytes[0], DType::F32.code());
        assert_eq!(bytes[1], 0);
        assert_eq!(bytes[2], 2);
        assert_eq!(bytes[3], FLAG_OUTPUT);
        assert_eq!(&bytes[4..8], &64u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &16u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &[0, 0, 0, 0]);
        assert_eq!(TensorRecord::decode(&bytes, 0).unwrap(), record());
    }

    #[test]
    fn test_tensor_record_corrupt() {
        let mut bytes = [0u8; TENSOR_RECORD_BYTES];
        record().encode(&mut bytes, 0).unwrap();
        bytes[1] = 7;
        assert_eq!(
            TensorRecord::decode(&bytes, 3),
            Err(RecordError::Corrupt {
                table: "tensor",
                index: 3
            })
        );
        record().encode(&mut bytes, 0).unwrap();
        bytes[2] = 9;
        assert!(TensorRecord::decode(&bytes, 3).is_err());
        assert!(TensorRecord::decode(&bytes[..16], 3).is_err());
    }

    #[test]
    fn test_tensor_record_field_overflow() {
        let mut bytes = [0xaau8; TENSOR_RECORD_BYTES];
        let far = TensorRecord {
            storage: Storage::Constant,
            offset: u32::MAX as usize + 1,
            ..record()
        };
        assert_eq!(
            far.encode(&mut bytes, 5),
            Err(RecordError::FieldOverflow {
                table: "tensor",
                index: 5,
                field: "offset",
                value: u32::MAX as usize + 1,
            })
        );
        assert_eq!(bytes, [0xaau8; TENSOR_RECORD_BYTES]);

        let long = TensorRecord {
            len: usize::MAX,
            ..record()
        };
        assert!(matches!(
            long.encode(&mut bytes, 0),
            Err(RecordError::FieldOverflow { field: "length", .. })
        ));

        let edge = TensorRecord {
            offset: u32::MAX as usize,
            ..record()
        };
        edge.encode(&mut bytes, 0).unwrap();
        assert_eq!(TensorRecord::decode(&bytes, 0).unwrap().offset, u32::MAX as usize);
    }

    #[test]
    fn test_node_tensor_index_overflow() {
        let err = Node::new(2, OpKind::Relu, &[70_000], 1).unwrap_err();
        assert_eq!(
            err,
            RecordError::FieldOverflow {
                table: "node",
                index: 2,
                field: "input tensor",
                value: 70_000,
            }
        );
        assert!(Node::new(0, OpKind::Relu, &[1], 1 << 16).is_err());
        assert!(Node::new(0, OpKind::Relu, &[1], u16::MAX as usize).is_ok());

        let mut slot = [0u8; IO_ENTRY_BYTES];
        assert!(matches!(
            encode_io_entry(1 << 16, 0, &mut slot),
            Err(RecordError::FieldOverflow { table: "io", .. })
        ));
    }

    #[test]
    fn test_node_record_layout() {
        let node = Node::new(
            0,
            OpKind::FullyConnected {
                activation: Activation::Relu,
            },
            &[3, 4, 5],
            6,
        )
        .unwrap();
        let mut bytes = [0u8; NODE_RECORD_BYTES];
        node.encode(&mut bytes);
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], Activation::Relu.code());
        assert_eq!(bytes[2], 3);
        assert_eq!(&bytes[4..6], &3u16.to_le_bytes());
        assert_eq!(&bytes[10..12], &6u16.to_le_bytes());

        let back = Node::decode(&bytes, 0).unwrap();
        assert_eq!(back, node);
        assert_eq!(back.inputs(), [3, 4, 5]);
        assert_eq!(back.output(), 6);
    }

    #[test]
    fn test_node_with_two_inputs() {
        let node = Node::new(0, OpKind::Relu, &[2], 9).unwrap();
        let mut bytes = [0u8; NODE_RECORD_BYTES];
        node.encode(&mut bytes);
        let back = Node::decode(&bytes, 0).unwrap();
        assert_eq!(back.num_inputs(), 1);
        assert_eq!(back.inputs()[0], 2);
    }

    #[test]
    fn test_tables_lookup() {
        let mut arena = Arena::new(ArenaCapacity::from_bytes(256));
        let tensors = arena.allocate_tail(2 * TENSOR_RECORD_BYTES).unwrap();
        let io = arena.allocate_tail(2 * IO_ENTRY_BYTES).unwrap();
        let tables = Tables {
            tensors,
            nodes: ArenaRegion::new(0, 0),
            io,
            num_tensors: 2,
            num_nodes: 0,
            num_inputs: 1,
            num_outputs: 1,
        };

        let slot = tensors.subregion(TENSOR_RECORD_BYTES, TENSOR_RECORD_BYTES).unwrap();
        record().encode(arena.bytes_mut(slot).unwrap(), 1).unwrap();
        let io_bytes = arena.bytes_mut(io).unwrap();
        encode_io_entry(0, 0, &mut io_bytes[..2]).unwrap();
        encode_io_entry(1, 1, &mut io_bytes[2..4]).unwrap();

        assert_eq!(tables.tensor(&arena, 1).unwrap(), record());
        assert_eq!(tables.input(&arena, 0).unwrap(), 0);
        assert_eq!(tables.output(&arena, 0).unwrap(), 1);
        assert!(matches!(
            tables.output(&arena, 1),
            Err(RecordError::OutOfRange { table: "output", .. })
        ));
        assert!(matches!(
            tables.node(&arena, 0),
            Err(RecordError::OutOfRange { table: "node", .. })
        ));
    }
}
