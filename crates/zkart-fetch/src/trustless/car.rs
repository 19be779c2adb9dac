//! CARv1 block sets and UnixFS path resolution over them.

use std::collections::HashMap;

use super::CarError;
use super::cid::{Cid, DAG_PB, RAW};
use super::pb::{self, read_slice, read_varint};

/// Files are rarely more than a couple of levels deep; a bound stops cycles.
const MAX_DEPTH: usize = 64;

/// Verified blocks of one CAR response, keyed by multihash.
pub(crate) struct BlockSet<'a> {
    blocks: HashMap<(u64, Vec<u8>), &'a [u8]>,
}

impl<'a> BlockSet<'a> {
    /// Parse a CARv1 stream, checking every block against its CID.
    pub(crate) fn parse(car: &'a [u8]) -> Result<Self, CarError> {
        let mut pos = 0;
        let header_len = read_varint(car, &mut pos)?;
        if header_len == 0 {
            return Err(CarError::Malformed("empty CAR header"));
        }
        read_slice(car, &mut pos, header_len)?;

        let mut blocks = HashMap::new();
        while pos < car.len() {
            let section_len = read_varint(car, &mut pos)?;
            let section = read_slice(car, &mut pos, section_len)?;
            let (cid, used) = Cid::read_bytes(section)?;
            let data = &section[used..];
            cid.verify(data)?;

            let (code, digest) = cid.multihash_key();
            blocks.insert((code, digest.to_vec()), data);
        }
        Ok(Self { blocks })
    }

    fn get(&self, cid: &Cid) -> Result<&'a [u8], CarError> {
        let (code, digest) = cid.multihash_key();
        self.blocks
            .get(&(code, digest.to_vec()))
            .copied()
            .ok_or_else(|| CarError::MissingBlock(cid.to_string()))
    }

    #[cfg(test)]
    fn len(&self) -> usize { self.blocks.len() }
}

/// Resolve `path` below `root` inside `car` and reassemble the file it names.
pub fn extract_path(root: &Cid, path: &str, car: &[u8]) -> Result<Vec<u8>, CarError> {
    let blocks = BlockSet::parse(car)?;
    let mut current = root.clone();

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if current.codec != DAG_PB {
            return Err(CarError::NotADirectory(segment.to_string()));
        }
        let node = pb::decode_node(blocks.get(&current)?)?;
        let unixfs = pb::decode_unixfs(node.data.unwrap_or_default())?;
        match unixfs.kind {
            pb::UNIXFS_DIRECTORY => {}
            pb::UNIXFS_HAMT_SHARD => return Err(CarError::Sharded(segment.to_string())),
            _ => return Err(CarError::NotADirectory(segment.to_string())),
        }

        current = node
            .links
            .into_iter()
            .find(|link| link.name.as_deref() == Some(segment))
            .map(|link| link.cid)
            .ok_or_else(|| CarError::MissingLink(segment.to_string()))?;
    }

    let mut out = Vec::new();
    read_file(&blocks, &current, &mut out, 0)?;
    Ok(out)
}

fn read_file(blocks: &BlockSet<'_>, cid: &Cid, out: &mut Vec<u8>, depth: usize) -> Result<(), CarError> {
    if depth > MAX_DEPTH {
        return Err(CarError::TooDeep);
    }
    let block = blocks.get(cid)?;

    match cid.codec {
        RAW => {
            out.extend_from_slice(block);
            Ok(())
        }
        DAG_PB => {
            let node = pb::decode_node(block)?;
            let unixfs = pb::decode_unixfs(node.data.unwrap_or_default())?;
            if !matches!(unixfs.kind, pb::UNIXFS_FILE | pb::UNIXFS_RAW) {
                return Err(CarError::NotAFile(cid.to_string()));
            }
            if let Some(data) = unixfs.data {
                out.extend_from_slice(data);
            }
            for link in &node.links {
                read_file(blocks, &link.cid, out, depth + 1)?;
            }
            Ok(())
        }
        other => Err(CarError::UnsupportedCid(format!("codec 0x{other:x}"))),
    }
}
