//! Just enough protobuf to walk dag-pb nodes and their UnixFS payloads.

use super::CarError;
use super::cid::Cid;

pub(crate) fn read_varint(buf: &[u8], pos: &mut usize) -> Result<u64, CarError> {
    let mut value = 0u64;
    for shift in (0..64).step_by(7) {
        let byte = *buf.get(*pos).ok_or(CarError::Truncated)?;
        *pos += 1;
        value |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
    Err(CarError::Malformed("varint longer than 64 bits"))
}

pub(crate) fn read_slice<'a>(buf: &'a [u8], pos: &mut usize, len: u64) -> Result<&'a [u8], CarError> {
    let len = usize::try_from(len).map_err(|_| CarError::Truncated)?;
    let end = pos.checked_add(len).ok_or(CarError::Truncated)?;
    let slice = buf.get(*pos..end).ok_or(CarError::Truncated)?;
    *pos = end;
    Ok(slice)
}

enum Field<'a> {
    Varint(u64),
    Bytes(&'a [u8]),
    Fixed,
}

struct Fields<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Fields<'a> {
    fn new(buf: &'a [u8]) -> Self { Self { buf, pos: 0 } }

    fn next_field(&mut self) -> Result<Option<(u64, Field<'a>)>, CarError> {
        if self.pos >= self.buf.len() {
            return Ok(None);
        }
        let key = read_varint(self.buf, &mut self.pos)?;
        let field = match key & 0x7 {
            0 => Field::Varint(read_varint(self.buf, &mut self.pos)?),
            1 => {
                read_slice(self.buf, &mut self.pos, 8)?;
                Field::Fixed
            }
            2 => {
                let len = read_varint(self.buf, &mut self.pos)?;
                Field::Bytes(read_slice(self.buf, &mut self.pos, len)?)
            }
            5 => {
                read_slice(self.buf, &mut self.pos, 4)?;
                Field::Fixed
            }
            _ => return Err(CarError::Malformed("unsupported protobuf wire type")),
        };
        Ok(Some((key >> 3, field)))
    }
}

pub(crate) struct PbLink {
    pub cid:  Cid,
    pub name: Option<String>,
}

pub(crate) struct PbNode<'a> {
    pub links: Vec<PbLink>,
    pub data:  Option<&'a [u8]>,
}

pub(crate) fn decode_node(block: &[u8]) -> Result<PbNode<'_>, CarError> {
    let mut node = PbNode {
        links: Vec::new(),
        data:  None,
    };
    let mut fields = Fields::new(block);
    while let Some((number, field)) = fields.next_field()? {
        match (number, field) {
            (1, Field::Bytes(data)) => node.data = Some(data),
            (2, Field::Bytes(link)) => node.links.push(decode_link(link)?),
            (1 | 2, _) => return Err(CarError::Malformed("dag-pb field has wrong wire type")),
            _ => {}
        }
    }
    Ok(node)
}

fn decode_link(buf: &[u8]) -> Result<PbLink, CarError> {
    let mut cid = None;
    let mut name = None;
    let mut fields = Fields::new(buf);
    while let Some((number, field)) = fields.next_field()? {
        match (number, field) {
            (1, Field::Bytes(hash)) => {
                let (parsed, used) = Cid::read_bytes(hash)?;
                if used != hash.len() {
                    return Err(CarError::Malformed("trailing bytes after link CID"));
                }
                cid = Some(parsed);
            }
            (2, Field::Bytes(raw)) => {
                let text = std::str::from_utf8(raw).map_err(|_| CarError::Malformed("link name is not UTF-8"))?;
                name = Some(text.to_string());
            }
            _ => {}
        }
    }
    Ok(PbLink {
        cid: cid.ok_or(CarError::Malformed("link without hash"))?,
        name,
    })
}

pub(crate) const UNIXFS_RAW: u64 = 0;
pub(crate) const UNIXFS_DIRECTORY: u64 = 1;
pub(crate) const UNIXFS_FILE: u64 = 2;
pub(crate) const UNIXFS_HAMT_SHARD: u64 = 5;

pub(crate) struct UnixFs<'a> {
    pub kind: u64,
    pub data: Option<&'a [u8]>,
}

pub(crate) fn decode_unixfs(buf: &[u8]) -> Result<UnixFs<'_>, CarError> {
    let mut kind = None;
    let mut data = None;
    let mut fields = Fields::new(buf);
    while let Some((number, field)) = fields.next_field()? {
        match (number, field) {
            (1, Field::Varint(value)) => kind = Some(value),
            (2, Field::Bytes(bytes)) => data = Some(bytes),
            _ => {}
        }
    }
    Ok(UnixFs {
        kind: kind.ok_or(CarError::Malformed("UnixFS node without type"))?,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_roundtrip_values() {
        let cases: [(&[u8], u64); 4] = [(&[0x00], 0), (&[0x7f], 127), (&[0x80, 0x01], 128), (&[0xac, 0x02], 300)];
        for (bytes, expected) in cases {
            let mut pos = 0;
            assert_eq!(read_varint(bytes, &mut pos).unwrap(), expected);
            assert_eq!(pos, bytes.len());
        }
    }

    #[test]
    fn truncated_varint() {
        let mut pos = 0;
        assert!(matches!(read_varint(&[0x80], &mut pos), Err(CarError::Truncated)));
    }

    #[test]
    fn read_slice_bounds() {
        let mut pos = 1;
        assert_eq!(read_slice(b"abcd", &mut pos, 2).unwrap(), b"bc");
        assert!(matches!(read_slice(b"abcd", &mut pos, 5), Err(CarError::Truncated)));
    }

    #[test]
    fn unixfs_type_is_required() {
        // field 2 (Data), length 1, byte 'x'
        assert!(decode_unixfs(&[0x12, 0x01, b'x']).is_err());
        let fs = decode_unixfs(&[0x08, 0x02]).unwrap();
        assert_eq!(fs.kind, UNIXFS_FILE);
        assert!(fs.data.is_none());
    }
}
