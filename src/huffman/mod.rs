use std::{collections::{BTreeMap, BinaryHeap}, cmp::{Ordering, Reverse}};

use crate::{bitstreams::{BinaryWriterBuilder, BinaryReader}, Error, Result};

pub const K_NUM_SYMBOLS: usize = 256;
pub const LEAF_MARKER: u8 = 0x01;
pub const INTERNAL_MARKER: u8 = 0x00;

/// A valid tree over 256 symbols is at most 256 levels deep.
const K_MAX_TREE_DEPTH: usize = K_NUM_SYMBOLS;

/// Occurrences of every byte value in one input buffer.
pub type FrequencyTable = [u64; K_NUM_SYMBOLS];

/// Root-to-leaf path, `false` for a left edge and `true` for a right one.
pub type Code = Vec<bool>;

pub type CodeTable = BTreeMap<u8, Code>;

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum HuffmanNode {
    Leaf {
        symbol: u8,
        freq: u64,
    },
    Internal {
        freq: u64,
        left: Box<HuffmanNode>,
        right: Box<HuffmanNode>,
    },
}

impl HuffmanNode {
    fn combine(left: HuffmanNode, right: HuffmanNode) -> Self {
        HuffmanNode::Internal {
            freq: left.freq() + right.freq(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn freq(&self) -> u64 {
        match self {
            HuffmanNode::Leaf { freq, .. } | HuffmanNode::Internal { freq, .. } => *freq,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffmanNode::Leaf { .. })
    }

    /// The child reached by following `bit`, or `None` on a leaf.
    #[inline(always)]
    pub fn child(&self, bit: bool) -> Option<&HuffmanNode> {
        match self {
            HuffmanNode::Leaf { .. } => None,
            HuffmanNode::Internal { left, right, .. } => Some(if bit { right } else { left }),
        }
    }
}

/// Priority queue entry. Equal frequencies are ordered by `key`: leaves use
/// their byte value, merged nodes a counter starting past the last symbol,
/// so the same input always yields the same tree.
#[derive(Debug)]
struct HeapNode {
    key: usize,
    node: HuffmanNode,
}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.node.freq().cmp(&other.node.freq()).then(self.key.cmp(&other.key))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for HeapNode {}

impl PartialEq for HeapNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

#[derive(Clone, Default, Debug)]
pub struct HuffmanTree {
    root: Option<HuffmanNode>,
    code_table: CodeTable,
}

impl HuffmanTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frequencies_of(data: &[u8]) -> FrequencyTable {
        let mut freqs = [0; K_NUM_SYMBOLS];

        for &byte in data {
            freqs[byte as usize] += 1;
        }

        freqs
    }

    pub fn from_data(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyInput);
        }

        Self::from_frequencies(&Self::frequencies_of(data))
    }

    /// Builds the tree by repeatedly merging the two least frequent nodes.
    pub fn from_frequencies(freqs: &FrequencyTable) -> Result<Self> {
        let mut freq_tree: BinaryHeap<Reverse<HeapNode>> = freqs
            .iter()
            .enumerate()
            .filter(|&(_, &freq)| freq > 0)
            .map(|(symbol, &freq)| Reverse(HeapNode {
                key: symbol,
                node: HuffmanNode::Leaf { symbol: symbol as u8, freq },
            }))
            .collect();

        let mut next_key = K_NUM_SYMBOLS;

        while freq_tree.len() > 1 {
            let (Some(Reverse(node1)), Some(Reverse(node2))) = (freq_tree.pop(), freq_tree.pop()) else {
                break;
            };

            freq_tree.push(Reverse(HeapNode {
                key: next_key,
                node: HuffmanNode::combine(node1.node, node2.node),
            }));
            next_key += 1;
        }

        let root = freq_tree.pop().ok_or(Error::EmptyInput)?.0.node;

        let tree = Self::with_root(root);
        log::debug!("built Huffman tree: {} symbols, depth {}", tree.symbol_count(), tree.depth());

        Ok(tree)
    }

    fn with_root(root: HuffmanNode) -> Self {
        let mut code_table = CodeTable::new();
        Self::generate_codes(&root, &mut Vec::new(), &mut code_table);

        Self { root: Some(root), code_table }
    }

    fn generate_codes(node: &HuffmanNode, current: &mut Code, code_table: &mut CodeTable) {
        match node {
            HuffmanNode::Leaf { symbol, .. } => {
                // A lone leaf has no path; it is coded as a single 0 bit.
                let code = if current.is_empty() { vec![false] } else { current.clone() };
                code_table.insert(*symbol, code);
            }
            HuffmanNode::Internal { left, right, .. } => {
                current.push(false);
                Self::generate_codes(left, current, code_table);
                current.pop();

                current.push(true);
                Self::generate_codes(right, current, code_table);
                current.pop();
            }
        }
    }

    pub fn root(&self) -> Option<&HuffmanNode> {
        self.root.as_ref()
    }

    pub fn code(&self, byte: u8) -> Option<&[bool]> {
        self.code_table.get(&byte).map(Vec::as_slice)
    }

    pub fn code_table(&self) -> &CodeTable {
        &self.code_table
    }

    pub fn symbol_count(&self) -> usize {
        self.code_table.len()
    }

    pub fn depth(&self) -> usize {
        fn depth_of(node: &HuffmanNode) -> usize {
            match node {
                HuffmanNode::Leaf { .. } => 1,
                HuffmanNode::Internal { left, right, .. } => 1 + depth_of(left).max(depth_of(right)),
            }
        }

        self.root.as_ref().map_or(0, depth_of)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.code_table.clear();
    }

    /// Pre-order byte serialization: a leaf is `LEAF_MARKER` followed by its
    /// symbol, an internal node is `INTERNAL_MARKER` followed by its left and
    /// right subtrees.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        fn serialize_node(node: &HuffmanNode, output: &mut Vec<u8>) {
            match node {
                HuffmanNode::Leaf { symbol, .. } => {
                    output.push(LEAF_MARKER);
                    output.push(*symbol);
                }
                HuffmanNode::Internal { left, right, .. } => {
                    output.push(INTERNAL_MARKER);
                    serialize_node(left, output);
                    serialize_node(right, output);
                }
            }
        }

        let root = self.root.as_ref().ok_or(Error::EmptyInput)?;

        let mut output = Vec::with_capacity(4 * self.symbol_count());
        serialize_node(root, &mut output);

        Ok(output)
    }

    pub fn deserialize(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::InvalidArchive("empty Huffman tree".into()));
        }

        let mut index = 0;
        let root = Self::deserialize_node(data, &mut index, 0)?;

        if index != data.len() {
            return Err(Error::InvalidArchive(format!(
                "{} trailing bytes after the Huffman tree", data.len() - index
            )));
        }

        Ok(Self::with_root(root))
    }

    fn deserialize_node(data: &[u8], index: &mut usize, depth: usize) -> Result<HuffmanNode> {
        if depth >= K_MAX_TREE_DEPTH {
            return Err(Error::InvalidArchive("Huffman tree nested too deeply".into()));
        }

        match Self::take_byte(data, index)? {
            LEAF_MARKER => Ok(HuffmanNode::Leaf { symbol: Self::take_byte(data, index)?, freq: 0 }),
            INTERNAL_MARKER => {
                let left = Self::deserialize_node(data, index, depth + 1)?;
                let right = Self::deserialize_node(data, index, depth + 1)?;
                Ok(HuffmanNode::combine(left, right))
            }
            marker => Err(Error::InvalidArchive(format!("unknown tree marker {:#04x}", marker))),
        }
    }

    fn take_byte(data: &[u8], index: &mut usize) -> Result<u8> {
        let byte = data.get(*index).copied()
            .ok_or_else(|| Error::InvalidArchive("truncated Huffman tree".into()))?;
        *index += 1;
        Ok(byte)
    }

    /// Writes the code of every byte of `data`.
    ///
    /// Panics if `data` holds a byte the tree has no code for.
    pub fn encode(&self, data: &[u8], writer: &mut BinaryWriterBuilder) {
        let mut lookup: Vec<Option<&[bool]>> = vec![None; K_NUM_SYMBOLS];
        for (&symbol, code) in self.code_table.iter() {
            lookup[symbol as usize] = Some(code.as_slice());
        }

        for &byte in data {
            let code = lookup[byte as usize].unwrap_or_else(|| panic!("Unknown symbol {:#04x}", byte));
            writer.write_bits(code);
        }
    }

    /// Decodes exactly `len` symbols from `reader`.
    ///
    /// A single-leaf tree consumes no bits per symbol, but the payload is
    /// still expected to carry the one bit per symbol the encoder wrote.
    pub fn decode(&self, reader: &mut BinaryReader, len: u64) -> Result<Vec<u8>> {
        let root = self.root.as_ref()
            .ok_or_else(|| Error::InvalidArchive("empty Huffman tree".into()))?;

        let available = reader.remaining_bits() as u64;
        let n = usize::try_from(len)
            .map_err(|_| Error::InvalidArchive(format!("original size {} is not addressable", len)))?;

        if let HuffmanNode::Leaf { symbol, .. } = root {
            if available < len {
                return Err(Error::TruncatedPayload { expected: len, decoded: available });
            }
            return Ok(vec![*symbol; n]);
        }

        let mut output_vec = Vec::with_capacity(n.min(available as usize));
        let mut curr_node = root;

        while output_vec.len() < n {
            let bit = match reader.read_bit() {
                Ok(bit) => bit,
                Err(Error::OutOfRange) => return Err(Error::TruncatedPayload {
                    expected: len,
                    decoded: output_vec.len() as u64,
                }),
                Err(e) => return Err(e),
            };

            curr_node = curr_node.child(bit)
                .ok_or_else(|| Error::InvalidArchive("descended past a Huffman leaf".into()))?;

            if let HuffmanNode::Leaf { symbol, .. } = curr_node {
                output_vec.push(*symbol);
                curr_node = root;
            }
        }

        Ok(output_vec)
    }
}
