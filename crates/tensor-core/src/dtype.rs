// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Supported tensor element data types.

/// Enumerates the numeric types a tensor can hold.
///
/// The runtime uses `DType` to size buffers and to reject kernels that
/// cannot handle a given element type. Each variant has a stable one-byte
/// code used in the arena's tensor records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DType {
    /// 32-bit IEEE 754 floating point.
    F32,
    /// 32-bit signed integer.
    I32,
    /// 8-bit unsigned integer.
    U8,
    /// 8-bit signed integer (for quantised weights).
    I8,
}

impl DType {
    /// Returns the size of a single element in bytes.
    pub fn size_bytes(self) -> usize {
        match self {
            DType::F32 | DType::I32 => 4,
            DType::U8 | DType::I8 => 1,
        }
    }

    /// Returns a human-readable label for this data type.
    pub fn as_str(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::I32 => "i32",
            DType::U8 => "u8",
            DType::I8 => "i8",
        }
    }

    /// Stable code stored in serialized tensor records.
    pub fn code(self) -> u8 {
        match self {
            DType::F32 => 1,
            DType::I32 => 2,
            DType::U8 => 3,
            DType::I8 => 9,
        }
    }

    /// Inverse of [`code`](DType::code).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(DType::F32),
            2 => Some(DType::I32),
            3 => Some(DType::U8),
            9 => Some(DType::I8),
            _ => None,
        }
    }
}

impl std::fmt::Display for DType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_bytes() {
        assert_eq!(DType::F32.size_bytes(), 4);
        assert_eq!(DType::I32.size_bytes(), 4);
        assert_eq!(DType::U8.size_bytes(), 1);
        assert_eq!(DType::I8.size_bytes(), 1);
    }

    #[test]
    fn test_code_roundtrip() {
        for dt in [DType::F32, DType::I32, DType::U8, DType::I8] {
            assert_eq!(DType::from_code(dt.code()), Some(dt));
        }
        assert_eq!(DType::from_code(0), None);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&DType::F32).unwrap(), "\"f32\"");
        let back: DType = serde_json::from_str("\"i8\"").unwrap();
        assert_eq!(back, DType::I8);
    }
}
