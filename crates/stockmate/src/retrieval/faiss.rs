//! Reader for FAISS flat index files
//!
//! Only `IndexFlatL2` (`IxF2`) and `IndexFlatIP` (`IxFI`) are understood.
//! Search is exact, so results match what FAISS itself returns for these
//! index types.

use bytes::{Buf, BufMut};
use std::cmp::Ordering;
use std::path::Path;

use crate::error::{Error, Result};

const FOURCC_L2: &[u8; 4] = b"IxF2";
const FOURCC_IP: &[u8; 4] = b"IxFI";
const METRIC_INNER_PRODUCT: i32 = 0;
const METRIC_L2: i32 = 1;

/// Distance metric of a flat index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Squared euclidean distance, lower is closer
    L2,
    /// Inner product, higher is closer
    InnerProduct,
}

/// A search hit: vector id and its distance (L2) or score (inner product)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub id: usize,
    pub distance: f32,
}

/// In-memory flat vector index
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimensions: usize,
    metric: Metric,
    /// Row-major `len() * dimensions` values
    vectors: Vec<f32>,
}

fn ensure(buf: &[u8], needed: usize, what: &str) -> Result<()> {
    if buf.remaining() < needed {
        return Err(Error::index(format!(
            "Truncated index file while reading {} ({} bytes left, {} needed)",
            what,
            buf.remaining(),
            needed
        )));
    }
    Ok(())
}

impl FlatIndex {
    /// Create an empty index
    pub fn new(dimensions: usize, metric: Metric) -> Self {
        Self {
            dimensions,
            metric,
            vectors: Vec::new(),
        }
    }

    /// Read an index file written by `faiss.write_index`
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|e| Error::index(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_bytes(&data)
    }

    /// Parse the serialized form of a flat index
    pub fn from_bytes(mut buf: &[u8]) -> Result<Self> {
        ensure(buf, 4, "index type")?;
        let mut fourcc = [0u8; 4];
        buf.copy_to_slice(&mut fourcc);
        if &fourcc != FOURCC_L2 && &fourcc != FOURCC_IP {
            return Err(Error::index(format!(
                "Unsupported index type {:?}; only flat L2/IP indexes are supported",
                String::from_utf8_lossy(&fourcc)
            )));
        }

        ensure(buf, 4 + 8 + 8 + 8 + 1 + 4, "index header")?;
        let d = buf.get_i32_le();
        let ntotal = buf.get_i64_le();
        buf.advance(16); // two unused header fields
        let _is_trained = buf.get_u8();
        let metric_type = buf.get_i32_le();
        if metric_type > 1 {
            ensure(buf, 4, "metric argument")?;
            buf.advance(4);
        }

        let metric = match metric_type {
            METRIC_L2 => Metric::L2,
            METRIC_INNER_PRODUCT => Metric::InnerProduct,
            other => {
                return Err(Error::index(format!("Unsupported metric type {}", other)));
            }
        };
        if d <= 0 || ntotal < 0 {
            return Err(Error::index(format!(
                "Invalid index header: d={}, ntotal={}",
                d, ntotal
            )));
        }
        let dimensions = d as usize;
        let expected = (ntotal as usize)
            .checked_mul(dimensions)
            .ok_or_else(|| Error::index("Index size overflows"))?;

        ensure(buf, 8, "vector count")?;
        let count = buf.get_u64_le() as usize;
        if count != expected {
            return Err(Error::index(format!(
                "Index holds {} floats, header promises {}",
                count, expected
            )));
        }

        let byte_len = count
            .checked_mul(4)
            .ok_or_else(|| Error::index("Index size overflows"))?;
        ensure(buf, byte_len, "vectors")?;
        let vectors = (0..count).map(|_| buf.get_f32_le()).collect();

        Ok(Self {
            dimensions,
            metric,
            vectors,
        })
    }

    /// Serialize in the layout `faiss.write_index` uses for flat indexes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(45 + self.vectors.len() * 4);
        let (fourcc, metric_type) = match self.metric {
            Metric::L2 => (FOURCC_L2, METRIC_L2),
            Metric::InnerProduct => (FOURCC_IP, METRIC_INNER_PRODUCT),
        };
        out.put_slice(fourcc);
        out.put_i32_le(self.dimensions as i32);
        out.put_i64_le(self.len() as i64);
        out.put_i64_le(1 << 20);
        out.put_i64_le(1 << 20);
        out.put_u8(1);
        out.put_i32_le(metric_type);
        out.put_u64_le(self.vectors.len() as u64);
        for v in &self.vectors {
            out.put_f32_le(*v);
        }
        out
    }

    /// Append a vector; its id is the previous `len()`
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        self.check_dimensions(vector)?;
        self.vectors.extend_from_slice(vector);
        Ok(self.len() - 1)
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Number of stored vectors
    pub fn len(&self) -> usize {
        self.vectors.len() / self.dimensions.max(1)
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    fn check_dimensions(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimensions {
            return Err(Error::embedding(format!(
                "Vector has {} dimensions, index expects {}",
                vector.len(),
                self.dimensions
            )));
        }
        Ok(())
    }

    /// The `k` nearest vectors, closest first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.check_dimensions(query)?;

        let mut neighbors: Vec<Neighbor> = self
            .vectors
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(id, v)| Neighbor {
                id,
                distance: match self.metric {
                    Metric::L2 => v.iter().zip(query).map(|(a, b)| (a - b) * (a - b)).sum(),
                    Metric::InnerProduct => v.iter().zip(query).map(|(a, b)| a * b).sum(),
                },
            })
            .collect();

        // Stable sort: ties keep ascending ids
        match self.metric {
            Metric::L2 => neighbors.sort_by(|a, b| {
                a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
            }),
            Metric::InnerProduct => neighbors.sort_by(|a, b| {
                b.distance.partial_cmp(&a.distance).unwrap_or(Ordering::Equal)
            }),
        }
        neighbors.truncate(k);

        Ok(neighbors)
    }
}
